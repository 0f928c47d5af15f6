//! # Feature Engineering
//!
//! Turns a loosely typed [`PredictionInput`] into the fixed, ordered numeric layout the
//! pricing models were trained on. Nothing in here performs I/O or holds state; the
//! whole module is a set of pure functions over the input.

use thiserror::Error;

pub mod categories;
pub mod encoder;
pub mod input;
pub mod risk;
pub mod schema;

pub use encoder::{FeatureVector, encode};
pub use input::PredictionInput;

/// An input field failed a type, range or category constraint.
///
/// These are caller errors: the request is rejected before any model is invoked.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Smoker code {0} is not recognised. Expected 0 (none), 1 (occasional) or 2 (regular).")]
    SmokerCode(i64),
    #[error("Age must be non-negative, got {0}.")]
    NegativeAge(i64),
    #[error("Field '{0}' must be a finite number.")]
    NonFinite(&'static str),
}
