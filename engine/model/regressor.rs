use super::{ModelError, Regressor, check_width};
use ndarray::{Array1, ArrayView1};
use serde::{Deserialize, Serialize};

/// A fitted regressor, stored in the artifact's `[model]` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FittedRegressor {
    Linear(LinearRegressor),
    TreeEnsemble(TreeEnsemble),
}

/// `intercept + coefficients · row`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearRegressor {
    pub intercept: f64,
    pub coefficients: Array1<f64>,
}

/// Additive ensemble of regression trees: `base_score + Σ tree(row)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeEnsemble {
    pub base_score: f64,
    pub trees: Vec<RegressionTree>,
}

/// A tree stored as a flat node list with the root at index 0.
///
/// Child indices always point forward, which rules out cycles and bounds every walk
/// by the node count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegressionTree {
    pub nodes: Vec<TreeNode>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum TreeNode {
    /// `row[feature] < threshold` descends into `left`, everything else into `right`.
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf { value: f64 },
}

impl FittedRegressor {
    /// Short human-readable description for logs.
    pub fn describe(&self) -> String {
        match self {
            FittedRegressor::Linear(_) => "linear".to_string(),
            FittedRegressor::TreeEnsemble(e) => format!("tree ensemble ({} trees)", e.trees.len()),
        }
    }

    /// Structural checks run once at load time against the model row width.
    pub fn validate(&self, width: usize) -> Result<(), ModelError> {
        match self {
            FittedRegressor::Linear(m) => {
                check_width("linear model", width, m.coefficients.len())?;
                if !m.intercept.is_finite() || m.coefficients.iter().any(|c| !c.is_finite()) {
                    return Err(malformed("linear model", "coefficients must be finite"));
                }
                Ok(())
            }
            FittedRegressor::TreeEnsemble(e) => {
                if e.trees.is_empty() {
                    return Err(malformed("tree ensemble", "no trees"));
                }
                for (t, tree) in e.trees.iter().enumerate() {
                    tree.validate(width)
                        .map_err(|reason| malformed("tree ensemble", format!("tree {t}: {reason}")))?;
                }
                Ok(())
            }
        }
    }
}

impl Regressor for FittedRegressor {
    fn predict(&self, row: ArrayView1<f64>) -> Result<f64, ModelError> {
        let prediction = match self {
            FittedRegressor::Linear(m) => {
                check_width("linear model", row.len(), m.coefficients.len())?;
                m.intercept + m.coefficients.dot(&row)
            }
            FittedRegressor::TreeEnsemble(e) => {
                let mut total = e.base_score;
                for tree in &e.trees {
                    total += tree.evaluate(row)?;
                }
                total
            }
        };
        if prediction.is_finite() {
            Ok(prediction)
        } else {
            Err(ModelError::NonFinitePrediction(prediction))
        }
    }
}

impl RegressionTree {
    fn evaluate(&self, row: ArrayView1<f64>) -> Result<f64, ModelError> {
        let mut index = 0;
        loop {
            match self.nodes.get(index) {
                Some(TreeNode::Leaf { value }) => return Ok(*value),
                Some(TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    let value = row.get(*feature).ok_or_else(|| {
                        malformed("tree ensemble", format!("feature {feature} out of range"))
                    })?;
                    let next = if *value < *threshold { *left } else { *right };
                    if next <= index {
                        return Err(malformed(
                            "tree ensemble",
                            format!("node {index} points backwards to {next}"),
                        ));
                    }
                    index = next;
                }
                None => {
                    return Err(malformed(
                        "tree ensemble",
                        format!("node {index} does not exist"),
                    ));
                }
            }
        }
    }

    fn validate(&self, width: usize) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("no nodes".to_string());
        }
        for (index, node) in self.nodes.iter().enumerate() {
            match node {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if *feature >= width {
                        return Err(format!(
                            "node {index} splits on feature {feature}, row has {width}"
                        ));
                    }
                    if !threshold.is_finite() {
                        return Err(format!("node {index} has a non-finite threshold"));
                    }
                    for child in [*left, *right] {
                        if child <= index || child >= self.nodes.len() {
                            return Err(format!("node {index} has invalid child {child}"));
                        }
                    }
                }
                TreeNode::Leaf { value } => {
                    if !value.is_finite() {
                        return Err(format!("leaf {index} has a non-finite value"));
                    }
                }
            }
        }
        Ok(())
    }
}

fn malformed(component: &'static str, reason: impl Into<String>) -> ModelError {
    ModelError::Malformed {
        component,
        reason: reason.into(),
    }
}
