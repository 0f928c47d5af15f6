use super::categories::SmokingStatus;

/// Upper bound of the normalized risk score.
pub const MAX_RISK_SCORE: i64 = 10;

/// Conditions worth 3 points each when found anywhere in the free text.
const HIGH_RISK_CONDITIONS: [&str; 3] = ["diabetes", "heart disease", "high blood pressure"];

/// Conditions worth 1 point each.
const MEDIUM_RISK_CONDITIONS: [&str; 2] = ["asthma", "thyroid"];

/// Composite health risk on a 0-10 scale.
///
/// Points are additive and the total is clamped, so the score is non-decreasing in every
/// factor and saturates instead of overflowing. Condition matching is a case-insensitive
/// substring search: "prediabetes" counts as diabetes. Each listed condition is counted
/// at most once however often it appears.
pub fn normalized_risk_score(
    bmi: f64,
    smoking: SmokingStatus,
    existing_conditions: &str,
    genetical_risk: i64,
) -> i64 {
    let risk = genetical_risk
        .saturating_add(bmi_points(bmi))
        .saturating_add(smoking_points(smoking))
        .saturating_add(condition_points(existing_conditions));
    risk.clamp(0, MAX_RISK_SCORE)
}

fn bmi_points(bmi: f64) -> i64 {
    if bmi < 18.5 || bmi > 30.0 {
        3
    } else if bmi > 25.0 {
        1
    } else {
        0
    }
}

fn smoking_points(smoking: SmokingStatus) -> i64 {
    match smoking {
        SmokingStatus::Regular => 4,
        SmokingStatus::Occasional => 2,
        SmokingStatus::NoSmoking => 0,
    }
}

fn condition_points(existing_conditions: &str) -> i64 {
    let text = existing_conditions.to_lowercase();
    let count = |conditions: &[&str]| -> i64 {
        conditions.iter().filter(|&&c| text.contains(c)).count() as i64
    };
    3 * count(&HIGH_RISK_CONDITIONS) + count(&MEDIUM_RISK_CONDITIONS)
}
