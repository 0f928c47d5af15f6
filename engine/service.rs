//! # Prediction Service
//!
//! The request-level orchestrator: encode, route, round, clamp. A [`PredictionService`]
//! owns the loaded artifacts for the life of the process and is shared across request
//! handlers behind an `Arc`. It holds no mutable state.

use crate::features::{PredictionInput, ValidationError, encode};
use crate::model::{ArtifactError, Segment};
use crate::router::{ModelRouter, RouteError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use thiserror::Error;

/// Premiums below this are [`PremiumTier::Low`].
pub const MEDIUM_TIER_FLOOR: f64 = 5000.0;
/// Premiums above this are [`PremiumTier::High`].
pub const HIGH_TIER_FLOOR: f64 = 10000.0;

/// Response body of a successful prediction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionOutput {
    pub predicted_premium: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PremiumTier {
    Low,
    Medium,
    High,
}

impl PremiumTier {
    pub fn for_premium(premium: f64) -> Self {
        if premium < MEDIUM_TIER_FLOOR {
            PremiumTier::Low
        } else if premium <= HIGH_TIER_FLOOR {
            PremiumTier::Medium
        } else {
            PremiumTier::High
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PremiumTier::Low => "Low",
            PremiumTier::Medium => "Medium",
            PremiumTier::High => "High",
        }
    }
}

impl fmt::Display for PremiumTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A priced applicant with the details behind the number.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quote {
    pub predicted_premium: f64,
    pub segment: Segment,
    pub normalized_risk_score: i64,
    pub premium_tier: PremiumTier,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PredictionError {
    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationError),
    #[error("Prediction failed: {0}")]
    Route(#[from] RouteError),
}

impl PredictionError {
    /// True when the caller sent bad input, false for server-side faults.
    pub fn is_client_error(&self) -> bool {
        matches!(self, PredictionError::Validation(_))
    }
}

#[derive(Debug, Clone)]
pub struct PredictionService {
    router: ModelRouter,
}

impl PredictionService {
    pub fn new(router: ModelRouter) -> Self {
        Self { router }
    }

    /// Loads both segment bundles from `models_dir`.
    pub fn load(models_dir: &Path) -> Result<Self, ArtifactError> {
        ModelRouter::from_dir(models_dir).map(Self::new)
    }

    /// Prices one applicant.
    pub fn handle(&self, input: &PredictionInput) -> Result<PredictionOutput, PredictionError> {
        let quote = self.quote(input)?;
        Ok(PredictionOutput {
            predicted_premium: quote.predicted_premium,
        })
    }

    /// Prices one applicant and reports the segment, risk score and tier as well.
    pub fn quote(&self, input: &PredictionInput) -> Result<Quote, PredictionError> {
        let features = encode(input)?;
        let routed = self.router.predict(&features)?;
        let premium = finalize_premium(routed.value);

        log::debug!(
            "Quoted age {} in the {} segment: raw {}, premium {}",
            input.age,
            routed.segment,
            routed.value,
            premium
        );

        Ok(Quote {
            predicted_premium: premium,
            segment: routed.segment,
            normalized_risk_score: features.risk_score(),
            premium_tier: PremiumTier::for_premium(premium),
        })
    }
}

/// Rounds a raw model output to 2 decimals, then floors it at zero.
///
/// Rounding goes through the exact decimal expansion of `raw`, so ties go to the
/// even cent and values stored just below a tie round down. The floor also folds
/// `-0.0` and NaN into `0.0`.
pub fn finalize_premium(raw: f64) -> f64 {
    let rounded = format!("{raw:.2}").parse::<f64>().unwrap_or(raw);
    if rounded > 0.0 { rounded } else { 0.0 }
}
