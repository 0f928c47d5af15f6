// ========================================================================================
//                              The Feature Schema Contract
// ========================================================================================

// Both fitted models index their input by position. The order below is the order the
// models were trained on; any drift here corrupts predictions without a runtime error.

/// The 18 model input columns, in training order.
pub const FEATURE_COLUMNS: [&str; 18] = [
    "age",
    "number_of_dependants",
    "income_lakhs",
    "insurance_plan",
    "genetical_risk",
    "normalized_risk_score",
    "gender_Male",
    "region_Northwest",
    "region_Southeast",
    "region_Southwest",
    "marital_status_Unmarried",
    "bmi_category_Obesity",
    "bmi_category_Overweight",
    "bmi_category_Underweight",
    "smoking_status_Occasional",
    "smoking_status_Regular",
    "employment_status_Salaried",
    "employment_status_Self-Employed",
];

/// Present in the encoded vector so scalers fitted on it can see it; never a model input.
pub const INCOME_LEVEL: &str = "income_level";

/// Number of model input columns.
pub const MODEL_WIDTH: usize = FEATURE_COLUMNS.len();

/// Number of slots in an encoded vector: `income_level` followed by the model columns.
pub const ENCODED_WIDTH: usize = MODEL_WIDTH + 1;

/// Full encoded layout: `income_level` first, then [`FEATURE_COLUMNS`].
pub const ENCODED_COLUMNS: [&str; ENCODED_WIDTH] = {
    let mut columns = [INCOME_LEVEL; ENCODED_WIDTH];
    let mut i = 0;
    while i < MODEL_WIDTH {
        columns[i + 1] = FEATURE_COLUMNS[i];
        i += 1;
    }
    columns
};

/// Position of a column in the encoded layout. Lookups are exact and case-sensitive.
pub fn encoded_index(name: &str) -> Option<usize> {
    ENCODED_COLUMNS.iter().position(|&column| column == name)
}
