use ndarray::{Array1, ArrayView1};
use premia::features::schema::{ENCODED_COLUMNS, FEATURE_COLUMNS, MODEL_WIDTH};
use premia::features::{PredictionInput, encode};
use premia::model::{ArtifactBundle, ModelError, Regressor, Segment, Transform};
use premia::router::ModelRouter;
use premia::service::{PredictionService, PremiumTier, finalize_premium};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::{Arc, Mutex};

const ONE_HOT_GROUPS: [&[&str]; 6] = [
    &["gender_Male"],
    &["region_Northwest", "region_Southeast", "region_Southwest"],
    &["marital_status_Unmarried"],
    &[
        "bmi_category_Obesity",
        "bmi_category_Overweight",
        "bmi_category_Underweight",
    ],
    &["smoking_status_Occasional", "smoking_status_Regular"],
    &[
        "employment_status_Salaried",
        "employment_status_Self-Employed",
    ],
];

/// Records every row it scores and returns `intercept + Σ row`.
struct SummingModel {
    intercept: f64,
    rows: Mutex<Vec<Vec<f64>>>,
}

impl SummingModel {
    fn new(intercept: f64) -> Arc<Self> {
        Arc::new(Self {
            intercept,
            rows: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> usize {
        self.rows.lock().unwrap().len()
    }
}

impl Regressor for SummingModel {
    fn predict(&self, row: ArrayView1<f64>) -> Result<f64, ModelError> {
        self.rows.lock().unwrap().push(row.to_vec());
        Ok(self.intercept + row.sum())
    }
}

/// Divides by a fixed width, like a min-max scaler fitted on `[0, width]`.
struct DivideBy(f64);

impl Transform for DivideBy {
    fn transform(&self, subset: ArrayView1<f64>) -> Result<Array1<f64>, ModelError> {
        Ok(subset.mapv(|v| v / self.0))
    }
}

fn bundle(segment: Segment, model: Arc<SummingModel>) -> ArtifactBundle {
    ArtifactBundle::new(
        segment,
        model,
        Arc::new(DivideBy(100.0)),
        ["age", "income_level", "income_lakhs"]
            .iter()
            .map(|c| c.to_string())
            .collect(),
    )
}

fn reference_applicant() -> PredictionInput {
    serde_json::from_value(serde_json::json!({
        "age": 30,
        "gender": "Female",
        "bmi": 27,
        "smoker": 0,
        "num_dependents": 2,
        "region": "Southeast",
        "existing_conditions": "",
        "income_lakhs": 10,
        "income_level": 2,
        "insurance_plan": 2,
        "genetical_risk": 1,
        "marital_status": "Married",
        "employment_status": "Salaried"
    }))
    .unwrap()
}

fn random_applicant(rng: &mut StdRng) -> PredictionInput {
    const GENDERS: [&str; 3] = ["Male", "female", "other"];
    const REGIONS: [&str; 5] = ["northeast", "Northwest", "SOUTHEAST", "southwest", "mars"];
    const MARITAL: [&str; 3] = ["Married", "unmarried", "divorced"];
    const EMPLOYMENT: [&str; 4] = ["Salaried", "self-employed", "Freelancer", "retired"];
    const CONDITIONS: [&str; 5] = ["", "Diabetes", "asthma & thyroid", "heart disease", "none"];

    let mut input = PredictionInput::with_age(rng.gen_range(0..100));
    input.gender = GENDERS[rng.gen_range(0..GENDERS.len())].to_string();
    input.region = REGIONS[rng.gen_range(0..REGIONS.len())].to_string();
    input.marital_status = MARITAL[rng.gen_range(0..MARITAL.len())].to_string();
    input.employment_status = EMPLOYMENT[rng.gen_range(0..EMPLOYMENT.len())].to_string();
    input.existing_conditions = CONDITIONS[rng.gen_range(0..CONDITIONS.len())].to_string();
    input.bmi = rng.gen_range(10.0..60.0);
    input.smoker = rng.gen_range(0..3);
    input.num_dependents = rng.gen_range(0..6);
    input.income_lakhs = rng.gen_range(0.0..200.0);
    input.income_level = rng.gen_range(1..5);
    input.insurance_plan = rng.gen_range(1..4);
    input.genetical_risk = rng.gen_range(0..6);
    input
}

#[test]
fn reference_applicant_is_encoded_and_routed_to_rest() {
    let features = encode(&reference_applicant()).unwrap();
    assert_eq!(features.get("gender_Male"), Some(0.0));
    assert_eq!(features.get("region_Southeast"), Some(1.0));
    assert_eq!(features.get("region_Northwest"), Some(0.0));
    assert_eq!(features.get("region_Southwest"), Some(0.0));
    assert_eq!(features.get("bmi_category_Overweight"), Some(1.0));
    assert_eq!(features.get("normalized_risk_score"), Some(2.0));

    let young = SummingModel::new(0.0);
    let rest = SummingModel::new(5000.0);
    let service = PredictionService::new(ModelRouter::new(
        bundle(Segment::Young, young.clone()),
        bundle(Segment::Rest, rest.clone()),
    ));

    let quote = service.quote(&reference_applicant()).unwrap();
    assert_eq!(quote.segment, Segment::Rest);
    assert_eq!(quote.normalized_risk_score, 2);
    assert_eq!(young.calls(), 0);
    assert_eq!(rest.calls(), 1);

    // age 0.30 + dependants 2 + income 0.10 + plan 2 + genetic 1 + risk 2
    // + region_Southeast + Overweight + Salaried
    let expected = 5000.0 + 0.30 + 2.0 + 0.10 + 2.0 + 1.0 + 2.0 + 3.0;
    assert_eq!(quote.predicted_premium, finalize_premium(expected));
    assert_eq!(quote.predicted_premium, 5010.4);
    assert_eq!(quote.premium_tier, PremiumTier::Medium);

    let row = rest.rows.lock().unwrap()[0].clone();
    assert_eq!(row.len(), MODEL_WIDTH);
}

#[test]
fn model_rows_follow_the_feature_schema() {
    let model = SummingModel::new(0.0);
    let router = ModelRouter::new(
        bundle(Segment::Young, model.clone()),
        bundle(Segment::Rest, model.clone()),
    );
    let features = encode(&reference_applicant()).unwrap();
    router.predict(&features).unwrap();

    let row = model.rows.lock().unwrap()[0].clone();
    for (i, column) in FEATURE_COLUMNS.iter().enumerate() {
        let raw = features.get(column).unwrap();
        let expected = match *column {
            "age" | "income_lakhs" => raw / 100.0,
            _ => raw,
        };
        assert_eq!(row[i], expected, "column {column}");
    }
}

#[test]
fn age_24_is_young_and_age_25_is_rest() {
    let young = SummingModel::new(1000.0);
    let rest = SummingModel::new(2000.0);
    let service = PredictionService::new(ModelRouter::new(
        bundle(Segment::Young, young.clone()),
        bundle(Segment::Rest, rest.clone()),
    ));

    let mut input = reference_applicant();
    input.age = 24;
    assert_eq!(service.quote(&input).unwrap().segment, Segment::Young);
    input.age = 25;
    assert_eq!(service.quote(&input).unwrap().segment, Segment::Rest);

    assert_eq!(young.calls(), 1);
    assert_eq!(rest.calls(), 1);
}

#[test]
fn negative_model_output_never_reaches_the_caller() {
    let model = SummingModel::new(-1.0e6);
    let service = PredictionService::new(ModelRouter::new(
        bundle(Segment::Young, model.clone()),
        bundle(Segment::Rest, model),
    ));
    let out = service.handle(&reference_applicant()).unwrap();
    assert_eq!(out.predicted_premium.to_bits(), 0.0f64.to_bits());
}

#[test]
fn identical_input_gives_bit_identical_output() {
    let model = SummingModel::new(1234.5678);
    let service = PredictionService::new(ModelRouter::new(
        bundle(Segment::Young, model.clone()),
        bundle(Segment::Rest, model),
    ));
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..50 {
        let input = random_applicant(&mut rng);
        let first = service.handle(&input).unwrap();
        let second = service.handle(&input.clone()).unwrap();
        assert_eq!(
            first.predicted_premium.to_bits(),
            second.predicted_premium.to_bits()
        );
    }
}

#[test]
fn random_applicants_respect_encoding_invariants() {
    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..500 {
        let input = random_applicant(&mut rng);
        let features = encode(&input).unwrap();

        assert_eq!(features.values().len(), ENCODED_COLUMNS.len());
        let names: Vec<&str> = features.named().map(|(name, _)| name).collect();
        assert_eq!(names, ENCODED_COLUMNS);

        for group in ONE_HOT_GROUPS {
            let active: f64 = group.iter().map(|c| features.get(c).unwrap()).sum();
            assert!(
                active == 0.0 || active == 1.0,
                "group {group:?} has {active} active slots for {input:?}"
            );
        }

        let risk = features.get("normalized_risk_score").unwrap();
        assert!((0.0..=10.0).contains(&risk));
    }
}

#[test]
fn concurrent_requests_share_one_service() {
    let model = SummingModel::new(100.0);
    let service = Arc::new(PredictionService::new(ModelRouter::new(
        bundle(Segment::Young, model.clone()),
        bundle(Segment::Rest, model.clone()),
    )));
    let expected = service.handle(&reference_applicant()).unwrap();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let service = Arc::clone(&service);
            std::thread::spawn(move || service.handle(&reference_applicant()).unwrap())
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), expected);
    }
    assert_eq!(model.calls(), 9);
}
