//! Categorical levels behind the one-hot columns.
//!
//! Every group has a base level that is encoded as all zeros. String-valued groups map
//! tokens case-insensitively, and any token they do not recognise resolves to the base
//! level. Numeric smoker codes are the exception and are validated strictly.

use super::ValidationError;

/// A group of one-hot columns, one per non-base level.
pub trait Categorical: Copy {
    /// Column names for the non-base levels, in schema order.
    const COLUMNS: &'static [&'static str];

    /// Index into [`Self::COLUMNS`] of the active level, or `None` for the base level.
    fn active_column(&self) -> Option<usize>;

    /// The indicator values for this group, in [`Self::COLUMNS`] order.
    fn indicators(&self) -> Vec<f64> {
        let active = self.active_column();
        (0..Self::COLUMNS.len())
            .map(|i| if active == Some(i) { 1.0 } else { 0.0 })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BmiCategory {
    Underweight,
    /// Base level.
    Normal,
    Overweight,
    Obesity,
}

impl BmiCategory {
    /// Boundaries are inclusive-low: exactly 25.0 is `Overweight`, exactly 30.0 is `Obesity`.
    pub fn from_bmi(bmi: f64) -> Self {
        if bmi < 18.5 {
            BmiCategory::Underweight
        } else if bmi < 25.0 {
            BmiCategory::Normal
        } else if bmi < 30.0 {
            BmiCategory::Overweight
        } else {
            BmiCategory::Obesity
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            BmiCategory::Underweight => "Underweight",
            BmiCategory::Normal => "Normal",
            BmiCategory::Overweight => "Overweight",
            BmiCategory::Obesity => "Obesity",
        }
    }
}

impl Categorical for BmiCategory {
    const COLUMNS: &'static [&'static str] = &[
        "bmi_category_Obesity",
        "bmi_category_Overweight",
        "bmi_category_Underweight",
    ];

    fn active_column(&self) -> Option<usize> {
        match self {
            BmiCategory::Obesity => Some(0),
            BmiCategory::Overweight => Some(1),
            BmiCategory::Underweight => Some(2),
            BmiCategory::Normal => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmokingStatus {
    /// Base level.
    NoSmoking,
    Occasional,
    Regular,
}

impl SmokingStatus {
    /// Codes outside `{0, 1, 2}` are rejected rather than guessed at.
    pub fn from_code(code: i64) -> Result<Self, ValidationError> {
        match code {
            0 => Ok(SmokingStatus::NoSmoking),
            1 => Ok(SmokingStatus::Occasional),
            2 => Ok(SmokingStatus::Regular),
            other => Err(ValidationError::SmokerCode(other)),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SmokingStatus::NoSmoking => "No Smoking",
            SmokingStatus::Occasional => "Occasional",
            SmokingStatus::Regular => "Regular",
        }
    }
}

impl Categorical for SmokingStatus {
    const COLUMNS: &'static [&'static str] =
        &["smoking_status_Occasional", "smoking_status_Regular"];

    fn active_column(&self) -> Option<usize> {
        match self {
            SmokingStatus::Occasional => Some(0),
            SmokingStatus::Regular => Some(1),
            SmokingStatus::NoSmoking => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gender {
    Male,
    /// Base level; also absorbs unrecognised tokens.
    Female,
}

impl Gender {
    pub fn from_token(token: &str) -> Self {
        if token.eq_ignore_ascii_case("male") {
            Gender::Male
        } else {
            Gender::Female
        }
    }
}

impl Categorical for Gender {
    const COLUMNS: &'static [&'static str] = &["gender_Male"];

    fn active_column(&self) -> Option<usize> {
        match self {
            Gender::Male => Some(0),
            Gender::Female => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    /// Base level; also absorbs unrecognised tokens.
    Northeast,
    Northwest,
    Southeast,
    Southwest,
}

impl Region {
    pub fn from_token(token: &str) -> Self {
        if token.eq_ignore_ascii_case("northwest") {
            Region::Northwest
        } else if token.eq_ignore_ascii_case("southeast") {
            Region::Southeast
        } else if token.eq_ignore_ascii_case("southwest") {
            Region::Southwest
        } else {
            Region::Northeast
        }
    }
}

impl Categorical for Region {
    const COLUMNS: &'static [&'static str] =
        &["region_Northwest", "region_Southeast", "region_Southwest"];

    fn active_column(&self) -> Option<usize> {
        match self {
            Region::Northwest => Some(0),
            Region::Southeast => Some(1),
            Region::Southwest => Some(2),
            Region::Northeast => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaritalStatus {
    /// Base level; also absorbs unrecognised tokens.
    Married,
    Unmarried,
}

impl MaritalStatus {
    pub fn from_token(token: &str) -> Self {
        if token.eq_ignore_ascii_case("unmarried") {
            MaritalStatus::Unmarried
        } else {
            MaritalStatus::Married
        }
    }
}

impl Categorical for MaritalStatus {
    const COLUMNS: &'static [&'static str] = &["marital_status_Unmarried"];

    fn active_column(&self) -> Option<usize> {
        match self {
            MaritalStatus::Unmarried => Some(0),
            MaritalStatus::Married => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmploymentStatus {
    /// Base level; also absorbs unrecognised tokens.
    Freelancer,
    Salaried,
    SelfEmployed,
}

impl EmploymentStatus {
    pub fn from_token(token: &str) -> Self {
        if token.eq_ignore_ascii_case("salaried") {
            EmploymentStatus::Salaried
        } else if token.eq_ignore_ascii_case("self-employed") {
            EmploymentStatus::SelfEmployed
        } else {
            EmploymentStatus::Freelancer
        }
    }
}

impl Categorical for EmploymentStatus {
    const COLUMNS: &'static [&'static str] = &[
        "employment_status_Salaried",
        "employment_status_Self-Employed",
    ];

    fn active_column(&self) -> Option<usize> {
        match self {
            EmploymentStatus::Salaried => Some(0),
            EmploymentStatus::SelfEmployed => Some(1),
            EmploymentStatus::Freelancer => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::schema::FEATURE_COLUMNS;

    #[test]
    fn bmi_category_boundaries_are_inclusive_low() {
        assert_eq!(BmiCategory::from_bmi(18.49), BmiCategory::Underweight);
        assert_eq!(BmiCategory::from_bmi(18.5), BmiCategory::Normal);
        assert_eq!(BmiCategory::from_bmi(24.99), BmiCategory::Normal);
        assert_eq!(BmiCategory::from_bmi(25.0), BmiCategory::Overweight);
        assert_eq!(BmiCategory::from_bmi(29.99), BmiCategory::Overweight);
        assert_eq!(BmiCategory::from_bmi(30.0), BmiCategory::Obesity);
    }

    #[test]
    fn bmi_categories_map_to_labels() {
        assert_eq!(BmiCategory::from_bmi(17.0).label(), "Underweight");
        assert_eq!(BmiCategory::from_bmi(18.5).label(), "Normal");
        assert_eq!(BmiCategory::from_bmi(25.0).label(), "Overweight");
        assert_eq!(BmiCategory::from_bmi(30.0).label(), "Obesity");
    }

    #[test]
    fn smoking_codes_map_to_labels() {
        assert_eq!(SmokingStatus::from_code(0).unwrap().label(), "No Smoking");
        assert_eq!(SmokingStatus::from_code(1).unwrap().label(), "Occasional");
        assert_eq!(SmokingStatus::from_code(2).unwrap().label(), "Regular");
    }

    #[test]
    fn out_of_range_smoker_codes_are_rejected() {
        for code in [-1, 3, 99] {
            match SmokingStatus::from_code(code) {
                Err(ValidationError::SmokerCode(found)) => assert_eq!(found, code),
                other => panic!("expected SmokerCode error for {code}, got {other:?}"),
            }
        }
    }

    #[test]
    fn string_tokens_match_case_insensitively() {
        assert_eq!(Gender::from_token("MALE"), Gender::Male);
        assert_eq!(Region::from_token("SouthEast"), Region::Southeast);
        assert_eq!(MaritalStatus::from_token("Unmarried"), MaritalStatus::Unmarried);
        assert_eq!(
            EmploymentStatus::from_token("Self-Employed"),
            EmploymentStatus::SelfEmployed
        );
    }

    #[test]
    fn unknown_tokens_fall_back_to_the_base_level() {
        assert_eq!(Gender::from_token("nonbinary"), Gender::Female);
        assert_eq!(Region::from_token("central"), Region::Northeast);
        assert_eq!(MaritalStatus::from_token("divorced"), MaritalStatus::Married);
        assert_eq!(
            EmploymentStatus::from_token("self employed"),
            EmploymentStatus::Freelancer
        );
        assert_eq!(Region::from_token("").indicators(), vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn group_columns_are_schema_columns() {
        let groups: [&[&str]; 6] = [
            Gender::COLUMNS,
            Region::COLUMNS,
            MaritalStatus::COLUMNS,
            BmiCategory::COLUMNS,
            SmokingStatus::COLUMNS,
            EmploymentStatus::COLUMNS,
        ];
        for column in groups.iter().flat_map(|group| group.iter()) {
            assert!(FEATURE_COLUMNS.contains(column), "{column} not in schema");
        }
    }

    #[test]
    fn indicators_set_at_most_one_slot() {
        let all = [
            EmploymentStatus::Freelancer,
            EmploymentStatus::Salaried,
            EmploymentStatus::SelfEmployed,
        ];
        for level in all {
            let ones = level.indicators().iter().filter(|&&v| v == 1.0).count();
            let expected = usize::from(level.active_column().is_some());
            assert_eq!(ones, expected);
        }
    }
}
