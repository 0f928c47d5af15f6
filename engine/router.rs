//! # Segment Routing
//!
//! Applicants younger than [`YOUNG_AGE_LIMIT`] are priced by the "young" bundle and
//! everyone else by the "rest" bundle. Routing looks at age alone.
//!
//! For the chosen bundle the router scales exactly the columns the bundle names, in the
//! order its scaler was fitted on, writes the results back into a copy of the encoded
//! vector, drops the scaling-only `income_level` slot, and hands the remaining columns
//! to the model in schema order.

use crate::features::FeatureVector;
use crate::features::schema::{FEATURE_COLUMNS, encoded_index};
use crate::model::{ArtifactBundle, ArtifactError, ModelError, Segment};
use ndarray::{Array1, ArrayView1};
use std::path::Path;
use thiserror::Error;

/// Ages strictly below this are routed to the young segment.
pub const YOUNG_AGE_LIMIT: i64 = 25;

impl Segment {
    pub fn for_age(age: i64) -> Self {
        if age < YOUNG_AGE_LIMIT {
            Segment::Young
        } else {
            Segment::Rest
        }
    }
}

/// Failures inside routing and inference. All are server-side faults.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RouteError {
    #[error(
        "The {segment} bundle scales column '{column}', which the feature vector does not contain. The artifacts do not match the feature schema."
    )]
    SchemaMismatch { segment: Segment, column: String },
    #[error("The {segment} bundle failed during inference: {source}")]
    Model {
        segment: Segment,
        #[source]
        source: ModelError,
    },
}

/// Raw model output together with the segment that produced it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoutedPrediction {
    pub segment: Segment,
    pub value: f64,
}

/// Holds both segment bundles for the lifetime of the process.
#[derive(Debug, Clone)]
pub struct ModelRouter {
    young: ArtifactBundle,
    rest: ArtifactBundle,
}

impl ModelRouter {
    pub fn new(young: ArtifactBundle, rest: ArtifactBundle) -> Self {
        Self { young, rest }
    }

    /// Loads `young.toml` and `rest.toml` from `dir`. Either failing is fatal.
    pub fn from_dir(dir: &Path) -> Result<Self, ArtifactError> {
        let young = ArtifactBundle::load(dir, Segment::Young)?;
        let rest = ArtifactBundle::load(dir, Segment::Rest)?;
        Ok(Self::new(young, rest))
    }

    /// The bundle responsible for an applicant of this age.
    pub fn route(&self, age: i64) -> &ArtifactBundle {
        match Segment::for_age(age) {
            Segment::Young => &self.young,
            Segment::Rest => &self.rest,
        }
    }

    /// Scales, trims and scores one encoded applicant.
    pub fn predict(&self, features: &FeatureVector) -> Result<RoutedPrediction, RouteError> {
        let bundle = self.route(features.age());
        let segment = bundle.segment();
        log::debug!("Routing age {} to the {} bundle", features.age(), segment);

        let scaled = scale_columns(bundle, features.values())?;
        let row = drop_scaling_only(scaled.view());
        let value = bundle
            .model()
            .predict(row.view())
            .map_err(|source| RouteError::Model { segment, source })?;

        Ok(RoutedPrediction { segment, value })
    }
}

/// Copies the encoded vector and replaces the bundle's scaled columns in place.
fn scale_columns(
    bundle: &ArtifactBundle,
    encoded: ArrayView1<f64>,
) -> Result<Array1<f64>, RouteError> {
    let segment = bundle.segment();
    let indices = bundle
        .columns_to_scale()
        .iter()
        .map(|column| {
            encoded_index(column).ok_or_else(|| {
                log::error!(
                    "Configuration defect: {segment} bundle scales unknown column '{column}'"
                );
                RouteError::SchemaMismatch {
                    segment,
                    column: column.clone(),
                }
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let subset: Array1<f64> = indices.iter().map(|&i| encoded[i]).collect();
    let transformed = bundle
        .scaler()
        .transform(subset.view())
        .map_err(|source| RouteError::Model { segment, source })?;
    if transformed.len() != indices.len() {
        return Err(RouteError::Model {
            segment,
            source: ModelError::WidthMismatch {
                component: "scaler output",
                found: transformed.len(),
                expected: indices.len(),
            },
        });
    }

    let mut row = encoded.to_owned();
    for (&i, &value) in indices.iter().zip(transformed.iter()) {
        row[i] = value;
    }
    Ok(row)
}

/// Removes the scaling-only slot and returns the model columns in schema order.
pub fn drop_scaling_only(encoded: ArrayView1<f64>) -> Array1<f64> {
    FEATURE_COLUMNS
        .iter()
        .filter_map(|column| encoded_index(column))
        .map(|i| encoded[i])
        .collect()
}
