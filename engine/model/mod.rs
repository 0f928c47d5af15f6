//! # Model Artifacts
//!
//! The service treats fitted models and scalers as opaque capabilities:
//!
//! - [`Transform`] maps the named sub-vector a scaler was fitted on to its scaled values.
//! - [`Regressor`] maps one full model row to a scalar prediction.
//!
//! Routing and orchestration only ever see these two traits, so tests can drive the
//! pipeline with deterministic fakes. The concrete fitted types in [`scaler`] and
//! [`regressor`] are what the [`artifact`] loader builds from TOML files on disk.

use ndarray::{Array1, ArrayView1};
use thiserror::Error;

pub mod artifact;
pub mod regressor;
pub mod scaler;

pub use artifact::{ArtifactBundle, ArtifactError, BundleFile, Segment};
pub use regressor::FittedRegressor;
pub use scaler::FittedScaler;

/// A fitted column transform, applied to exactly the columns it was fitted on.
pub trait Transform: Send + Sync {
    fn transform(&self, subset: ArrayView1<f64>) -> Result<Array1<f64>, ModelError>;
}

/// A fitted regressor over the full model row.
pub trait Regressor: Send + Sync {
    fn predict(&self, row: ArrayView1<f64>) -> Result<f64, ModelError>;
}

/// Failures raised while applying a fitted scaler or model.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("Input has {found} columns, but the {component} was fitted on {expected}.")]
    WidthMismatch {
        component: &'static str,
        found: usize,
        expected: usize,
    },
    #[error("The model produced a non-finite prediction ({0}).")]
    NonFinitePrediction(f64),
    #[error("Malformed {component}: {reason}")]
    Malformed {
        component: &'static str,
        reason: String,
    },
}

pub(crate) fn check_width(
    component: &'static str,
    found: usize,
    expected: usize,
) -> Result<(), ModelError> {
    if found == expected {
        Ok(())
    } else {
        Err(ModelError::WidthMismatch {
            component,
            found,
            expected,
        })
    }
}
