use super::{ModelError, Transform, check_width};
use ndarray::{Array1, ArrayView1, Zip};
use serde::{Deserialize, Serialize};

/// A fitted per-column scaler, stored in the artifact's `[scaler]` table.
///
/// Semantics follow the scikit-learn estimators the parameters were exported from,
/// including the treatment of zero-width columns as unit width.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FittedScaler {
    Standard(StandardScaler),
    MinMax(MinMaxScaler),
}

/// `(x - mean) / scale`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Array1<f64>,
    pub scale: Array1<f64>,
}

/// `(x - data_min) / (data_max - data_min)`, mapped onto `feature_range`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MinMaxScaler {
    pub data_min: Array1<f64>,
    pub data_max: Array1<f64>,
    #[serde(default = "unit_range")]
    pub feature_range: (f64, f64),
}

fn unit_range() -> (f64, f64) {
    (0.0, 1.0)
}

fn nonzero(width: f64) -> f64 {
    if width == 0.0 { 1.0 } else { width }
}

impl FittedScaler {
    /// Number of columns the scaler was fitted on.
    pub fn width(&self) -> usize {
        match self {
            FittedScaler::Standard(s) => s.mean.len(),
            FittedScaler::MinMax(s) => s.data_min.len(),
        }
    }

    /// Structural checks run once at load time.
    pub fn validate(&self) -> Result<(), ModelError> {
        let (a, b) = match self {
            FittedScaler::Standard(s) => (&s.mean, &s.scale),
            FittedScaler::MinMax(s) => (&s.data_min, &s.data_max),
        };
        if a.len() != b.len() {
            return Err(ModelError::Malformed {
                component: "scaler",
                reason: format!("parameter vectors have lengths {} and {}", a.len(), b.len()),
            });
        }
        if a.iter().chain(b.iter()).any(|v| !v.is_finite()) {
            return Err(ModelError::Malformed {
                component: "scaler",
                reason: "parameters must be finite".to_string(),
            });
        }
        Ok(())
    }
}

impl Transform for FittedScaler {
    fn transform(&self, subset: ArrayView1<f64>) -> Result<Array1<f64>, ModelError> {
        check_width("scaler", subset.len(), self.width())?;
        let scaled = match self {
            FittedScaler::Standard(s) => {
                Zip::from(&subset)
                    .and(&s.mean)
                    .and(&s.scale)
                    .map_collect(|&x, &mean, &scale| (x - mean) / nonzero(scale))
            }
            FittedScaler::MinMax(s) => {
                let (lo, hi) = s.feature_range;
                Zip::from(&subset)
                    .and(&s.data_min)
                    .and(&s.data_max)
                    .map_collect(|&x, &min, &max| {
                        let factor = (hi - lo) / nonzero(max - min);
                        x * factor + (lo - min * factor)
                    })
            }
        };
        Ok(scaled)
    }
}
