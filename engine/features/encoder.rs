use super::ValidationError;
use super::categories::{
    BmiCategory, Categorical, EmploymentStatus, Gender, MaritalStatus, Region, SmokingStatus,
};
use super::input::PredictionInput;
use super::risk::normalized_risk_score;
use super::schema::{ENCODED_COLUMNS, ENCODED_WIDTH, encoded_index};
use ndarray::{Array1, ArrayView1};

/// An encoded applicant: [`ENCODED_WIDTH`] slots laid out as [`ENCODED_COLUMNS`].
///
/// Built only by [`encode`] and never mutated afterwards. Routing and scaling work on
/// copies of [`FeatureVector::values`].
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    age: i64,
    risk_score: i64,
    values: Array1<f64>,
}

impl FeatureVector {
    /// The applicant's age, used for routing.
    pub fn age(&self) -> i64 {
        self.age
    }

    /// The normalized risk score written into the `normalized_risk_score` slot.
    pub fn risk_score(&self) -> i64 {
        self.risk_score
    }

    pub fn values(&self) -> ArrayView1<'_, f64> {
        self.values.view()
    }

    /// Value of a named slot. Names are exact and case-sensitive.
    pub fn get(&self, name: &str) -> Option<f64> {
        encoded_index(name).map(|i| self.values[i])
    }

    /// Slots paired with their column names, in layout order.
    pub fn named(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        ENCODED_COLUMNS.iter().copied().zip(self.values.iter().copied())
    }
}

/// Encodes one applicant into the fixed feature layout.
///
/// Pure and stateless. Fails only when a field is invalid: an unknown smoker code, a
/// negative age, or a non-finite BMI or income. Unrecognised categorical strings are
/// not failures; they encode as their group's base level.
pub fn encode(input: &PredictionInput) -> Result<FeatureVector, ValidationError> {
    validate(input)?;

    let smoking = SmokingStatus::from_code(input.smoker)?;
    let bmi_category = BmiCategory::from_bmi(input.bmi);
    let risk = normalized_risk_score(
        input.bmi,
        smoking,
        &input.existing_conditions,
        input.genetical_risk,
    );

    let mut values = Array1::zeros(ENCODED_WIDTH);
    let mut set = |name: &str, value: f64| {
        let index = encoded_index(name);
        debug_assert!(index.is_some(), "column {name} missing from the encoded layout");
        if let Some(i) = index {
            values[i] = value;
        }
    };

    set("income_level", input.income_level as f64);
    set("age", input.age as f64);
    set("number_of_dependants", input.num_dependents as f64);
    set("income_lakhs", input.income_lakhs);
    set("insurance_plan", input.insurance_plan as f64);
    set("genetical_risk", input.genetical_risk as f64);
    set("normalized_risk_score", risk as f64);

    one_hot(&mut set, Gender::from_token(&input.gender));
    one_hot(&mut set, Region::from_token(&input.region));
    one_hot(&mut set, MaritalStatus::from_token(&input.marital_status));
    one_hot(&mut set, bmi_category);
    one_hot(&mut set, smoking);
    one_hot(&mut set, EmploymentStatus::from_token(&input.employment_status));

    Ok(FeatureVector {
        age: input.age,
        risk_score: risk,
        values,
    })
}

fn one_hot<C: Categorical>(set: &mut impl FnMut(&str, f64), level: C) {
    for (column, value) in C::COLUMNS.iter().zip(level.indicators()) {
        set(*column, value);
    }
}

fn validate(input: &PredictionInput) -> Result<(), ValidationError> {
    if input.age < 0 {
        return Err(ValidationError::NegativeAge(input.age));
    }
    if !input.bmi.is_finite() {
        return Err(ValidationError::NonFinite("bmi"));
    }
    if !input.income_lakhs.is_finite() {
        return Err(ValidationError::NonFinite("income_lakhs"));
    }
    Ok(())
}
