//! HTTP front end for the prediction service.
//!
//! Every handler shares one [`PredictionService`] through axum state. The service is
//! immutable, so requests run concurrently without locking.

use crate::features::PredictionInput;
use crate::service::{PredictionError, PredictionService};
use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;

pub const ROOT_MESSAGE: &str = "Health insurance premium prediction service is running";

pub fn router(service: Arc<PredictionService>) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/predict", post(predict_handler))
        .with_state(service)
}

/// Binds `addr` and serves until Ctrl-C.
pub async fn run(service: Arc<PredictionService>, addr: SocketAddr) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    log::info!("Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router(service))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    log::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => log::info!("Shutdown signal received, draining connections"),
        Err(e) => log::warn!("Could not listen for Ctrl-C ({e}); shutting down"),
    }
}

async fn root_handler() -> Response {
    (StatusCode::OK, axum::Json(json!({ "message": ROOT_MESSAGE }))).into_response()
}

/// Artifacts load before the listener binds, so a running server always has them.
async fn health_handler() -> Response {
    let payload = json!({
        "status": "ok",
        "models_loaded": true,
    });
    (StatusCode::OK, axum::Json(payload)).into_response()
}

async fn predict_handler(
    State(service): State<Arc<PredictionService>>,
    axum::Json(input): axum::Json<PredictionInput>,
) -> Response {
    match service.handle(&input) {
        Ok(output) => (StatusCode::OK, axum::Json(output)).into_response(),
        Err(error) => {
            let status = status_for(&error);
            if status.is_server_error() {
                log::error!("Prediction failed: {error}");
            }
            let payload = json!({
                "error": error.to_string(),
            });
            (status, axum::Json(payload)).into_response()
        }
    }
}

fn status_for(error: &PredictionError) -> StatusCode {
    if error.is_client_error() {
        StatusCode::UNPROCESSABLE_ENTITY
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}
