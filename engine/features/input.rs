use serde::{Deserialize, Serialize};

/// One applicant as submitted by a caller.
///
/// Only `age` is required. Every other field falls back to the default the pricing
/// models were built around. Unknown fields (including the legacy `features` array)
/// are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionInput {
    pub age: i64,
    #[serde(default = "defaults::gender")]
    pub gender: String,
    #[serde(default = "defaults::bmi")]
    pub bmi: f64,
    /// 0 = no smoking, 1 = occasional, 2 = regular.
    #[serde(default)]
    pub smoker: i64,
    #[serde(default)]
    pub num_dependents: i64,
    #[serde(default = "defaults::region")]
    pub region: String,
    /// Free text; scanned for known conditions by substring.
    #[serde(default)]
    pub existing_conditions: String,
    #[serde(default = "defaults::income_lakhs")]
    pub income_lakhs: f64,
    #[serde(default = "defaults::income_level")]
    pub income_level: i64,
    #[serde(default = "defaults::insurance_plan")]
    pub insurance_plan: i64,
    #[serde(default)]
    pub genetical_risk: i64,
    #[serde(default = "defaults::marital_status")]
    pub marital_status: String,
    #[serde(default = "defaults::employment_status")]
    pub employment_status: String,
}

impl PredictionInput {
    /// An applicant of the given age with every optional field at its default.
    pub fn with_age(age: i64) -> Self {
        Self {
            age,
            gender: defaults::gender(),
            bmi: defaults::bmi(),
            smoker: 0,
            num_dependents: 0,
            region: defaults::region(),
            existing_conditions: String::new(),
            income_lakhs: defaults::income_lakhs(),
            income_level: defaults::income_level(),
            insurance_plan: defaults::insurance_plan(),
            genetical_risk: 0,
            marital_status: defaults::marital_status(),
            employment_status: defaults::employment_status(),
        }
    }
}

mod defaults {
    pub(super) fn gender() -> String {
        "male".to_string()
    }

    pub(super) fn bmi() -> f64 {
        25.0
    }

    pub(super) fn region() -> String {
        "northeast".to_string()
    }

    pub(super) fn income_lakhs() -> f64 {
        5.0
    }

    pub(super) fn income_level() -> i64 {
        2
    }

    pub(super) fn insurance_plan() -> i64 {
        1
    }

    pub(super) fn marital_status() -> String {
        "married".to_string()
    }

    pub(super) fn employment_status() -> String {
        "salaried".to_string()
    }
}
