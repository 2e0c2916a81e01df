//! Trained probabilistic classifiers.
//!
//! The pipeline only relies on [`RiskModel::predict_probability`] returning a valid probability
//! of the positive class (disease present). The adapters below evaluate fitted parameters
//! exported from training; none of them learn anything.

use crate::error::{CollaboratorError, CoreError, CoreResult};
use crate::schema::FeatureVector;
use heartcare_types::Probability;

/// A trained classifier exposing a positive-class probability estimate.
pub trait RiskModel: Send + Sync + std::fmt::Debug {
    /// Estimate the probability of the positive class for a normalised vector.
    fn predict_probability(&self, vector: &FeatureVector)
        -> Result<Probability, CollaboratorError>;

    /// Number of features the model expects.
    fn input_width(&self) -> usize;

    /// Short identifier for logs.
    fn kind(&self) -> &'static str;
}

fn check_width(
    component: &'static str,
    expected: usize,
    vector: &FeatureVector,
) -> Result<(), CollaboratorError> {
    if vector.len() != expected {
        return Err(CollaboratorError::DimensionMismatch {
            component,
            expected,
            actual: vector.len(),
        });
    }
    Ok(())
}

fn to_probability(component: &'static str, value: f64) -> Result<Probability, CollaboratorError> {
    Probability::new(value).map_err(|source| CollaboratorError::InvalidScore { component, source })
}

/// Numerically stable logistic function.
fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

// ============================================================================
// Logistic regression
// ============================================================================

/// Binary logistic regression: `sigmoid(w · x + b)`.
#[derive(Clone, Debug, PartialEq)]
pub struct LogisticModel {
    coefficients: Vec<f64>,
    intercept: f64,
}

impl LogisticModel {
    pub fn new(coefficients: Vec<f64>, intercept: f64) -> CoreResult<Self> {
        if coefficients.is_empty() {
            return Err(CoreError::Artifact(
                "logistic model has no coefficients".into(),
            ));
        }
        if !intercept.is_finite() || coefficients.iter().any(|c| !c.is_finite()) {
            return Err(CoreError::Artifact(
                "logistic model parameters must be finite".into(),
            ));
        }
        Ok(Self {
            coefficients,
            intercept,
        })
    }

    fn decision(&self, x: &[f64]) -> f64 {
        self.coefficients
            .iter()
            .zip(x)
            .map(|(w, x)| w * x)
            .sum::<f64>()
            + self.intercept
    }
}

impl RiskModel for LogisticModel {
    fn predict_probability(
        &self,
        vector: &FeatureVector,
    ) -> Result<Probability, CollaboratorError> {
        check_width("logistic model", self.coefficients.len(), vector)?;
        to_probability("logistic model", sigmoid(self.decision(vector.as_slice())))
    }

    fn input_width(&self) -> usize {
        self.coefficients.len()
    }

    fn kind(&self) -> &'static str {
        "logistic"
    }
}

// ============================================================================
// Decision trees and forests
// ============================================================================

/// One node of a flattened decision tree.
#[derive(Clone, Debug, PartialEq)]
pub enum TreeNode {
    /// Samples with `x[feature] <= threshold` continue at `left`, others at `right`.
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    /// Terminal node holding the positive-class probability.
    Leaf { value: f64 },
}

/// A binary decision tree stored as a flat node array rooted at index 0.
///
/// Child indices always point past their parent, so traversal is guaranteed to terminate.
#[derive(Clone, Debug, PartialEq)]
pub struct DecisionTree {
    nodes: Vec<TreeNode>,
    input_width: usize,
}

impl DecisionTree {
    /// Build a tree, checking node references and leaf values against `input_width`.
    pub fn new(nodes: Vec<TreeNode>, input_width: usize) -> CoreResult<Self> {
        if nodes.is_empty() {
            return Err(CoreError::Artifact("decision tree has no nodes".into()));
        }
        for (i, node) in nodes.iter().enumerate() {
            match *node {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if feature >= input_width {
                        return Err(CoreError::SchemaMismatch(format!(
                            "tree node {i} splits on feature {feature} of {input_width}"
                        )));
                    }
                    if !threshold.is_finite() {
                        return Err(CoreError::Artifact(format!(
                            "tree node {i} has a non-finite threshold"
                        )));
                    }
                    for child in [left, right] {
                        if child <= i || child >= nodes.len() {
                            return Err(CoreError::Artifact(format!(
                                "tree node {i} has invalid child index {child}"
                            )));
                        }
                    }
                }
                TreeNode::Leaf { value } => {
                    if Probability::new(value).is_err() {
                        return Err(CoreError::Artifact(format!(
                            "tree leaf {i} value {value} is not a probability"
                        )));
                    }
                }
            }
        }
        Ok(Self { nodes, input_width })
    }

    /// Number of features the tree was validated against.
    pub fn input_width(&self) -> usize {
        self.input_width
    }

    fn leaf_value(&self, x: &[f64]) -> f64 {
        let mut i = 0;
        loop {
            match self.nodes[i] {
                TreeNode::Leaf { value } => return value,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    i = if x[feature] <= threshold { left } else { right };
                }
            }
        }
    }
}

/// Bagged decision trees; the probability is the mean of the tree leaf values.
#[derive(Clone, Debug, PartialEq)]
pub struct ForestModel {
    trees: Vec<DecisionTree>,
    input_width: usize,
}

impl ForestModel {
    pub fn new(trees: Vec<DecisionTree>, input_width: usize) -> CoreResult<Self> {
        if trees.is_empty() {
            return Err(CoreError::Artifact("forest model has no trees".into()));
        }
        if let Some((i, tree)) = trees
            .iter()
            .enumerate()
            .find(|(_, t)| t.input_width() != input_width)
        {
            return Err(CoreError::SchemaMismatch(format!(
                "tree {i} was built for {} features but the forest expects {input_width}",
                tree.input_width()
            )));
        }
        Ok(Self { trees, input_width })
    }
}

impl RiskModel for ForestModel {
    fn predict_probability(
        &self,
        vector: &FeatureVector,
    ) -> Result<Probability, CollaboratorError> {
        check_width("forest model", self.input_width, vector)?;
        let x = vector.as_slice();
        let total: f64 = self.trees.iter().map(|t| t.leaf_value(x)).sum();
        to_probability("forest model", total / self.trees.len() as f64)
    }

    fn input_width(&self) -> usize {
        self.input_width
    }

    fn kind(&self) -> &'static str {
        "forest"
    }
}

// ============================================================================
// Stacking ensemble
// ============================================================================

/// Stacking ensemble: base estimator probabilities feed a logistic meta-estimator.
///
/// With `passthrough`, the meta-estimator sees the base probabilities followed by the input
/// features.
#[derive(Debug)]
pub struct StackingModel {
    estimators: Vec<Box<dyn RiskModel>>,
    final_estimator: LogisticModel,
    passthrough: bool,
}

impl StackingModel {
    pub fn new(
        estimators: Vec<Box<dyn RiskModel>>,
        final_estimator: LogisticModel,
        passthrough: bool,
    ) -> CoreResult<Self> {
        let Some(first) = estimators.first() else {
            return Err(CoreError::Artifact(
                "stacking model has no base estimators".into(),
            ));
        };
        let width = first.input_width();
        if let Some(odd) = estimators.iter().find(|e| e.input_width() != width) {
            return Err(CoreError::SchemaMismatch(format!(
                "stacking base estimator '{}' expects {} features, others expect {width}",
                odd.kind(),
                odd.input_width()
            )));
        }

        let meta_width = estimators.len() + if passthrough { width } else { 0 };
        if final_estimator.input_width() != meta_width {
            return Err(CoreError::SchemaMismatch(format!(
                "stacking final estimator expects {} inputs, ensemble provides {meta_width}",
                final_estimator.input_width()
            )));
        }

        Ok(Self {
            estimators,
            final_estimator,
            passthrough,
        })
    }
}

impl RiskModel for StackingModel {
    fn predict_probability(
        &self,
        vector: &FeatureVector,
    ) -> Result<Probability, CollaboratorError> {
        check_width("stacking model", self.input_width(), vector)?;

        let mut meta = Vec::with_capacity(self.final_estimator.input_width());
        for estimator in &self.estimators {
            meta.push(estimator.predict_probability(vector)?.value());
        }
        if self.passthrough {
            meta.extend_from_slice(vector.as_slice());
        }

        self.final_estimator
            .predict_probability(&FeatureVector::new(meta))
    }

    fn input_width(&self) -> usize {
        self.estimators[0].input_width()
    }

    fn kind(&self) -> &'static str {
        "stacking"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stump(feature: usize, threshold: f64, low: f64, high: f64) -> DecisionTree {
        DecisionTree::new(
            vec![
                TreeNode::Split {
                    feature,
                    threshold,
                    left: 1,
                    right: 2,
                },
                TreeNode::Leaf { value: low },
                TreeNode::Leaf { value: high },
            ],
            2,
        )
        .expect("stump")
    }

    #[test]
    fn sigmoid_is_stable_at_extremes() {
        assert_eq!(sigmoid(0.0), 0.5);
        assert!(sigmoid(800.0) <= 1.0);
        assert!(sigmoid(-800.0) >= 0.0);
        assert!((sigmoid(2.0) + sigmoid(-2.0) - 1.0).abs() < 1e-15);
    }

    #[test]
    fn logistic_model_scores_linear_predictor() {
        let model = LogisticModel::new(vec![1.0, -2.0], 0.5).expect("model");
        let p = model
            .predict_probability(&FeatureVector::new(vec![1.0, 0.75]))
            .expect("predict");
        // 1.0 - 1.5 + 0.5 = 0
        assert!((p.value() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn logistic_model_rejects_wrong_width() {
        let model = LogisticModel::new(vec![1.0, 1.0, 1.0], 0.0).expect("model");
        let err = model
            .predict_probability(&FeatureVector::new(vec![1.0]))
            .expect_err("should reject");
        assert!(matches!(
            err,
            CollaboratorError::DimensionMismatch { expected: 3, actual: 1, .. }
        ));
    }

    #[test]
    fn tree_traversal_goes_left_on_equal() {
        let tree = stump(0, 1.0, 0.2, 0.9);
        assert_eq!(tree.leaf_value(&[1.0, 0.0]), 0.2);
        assert_eq!(tree.leaf_value(&[1.0001, 0.0]), 0.9);
    }

    #[test]
    fn tree_rejects_backward_child_reference() {
        let err = DecisionTree::new(
            vec![
                TreeNode::Split {
                    feature: 0,
                    threshold: 0.0,
                    left: 0,
                    right: 1,
                },
                TreeNode::Leaf { value: 0.5 },
            ],
            1,
        )
        .expect_err("should reject cycle");
        assert!(matches!(err, CoreError::Artifact(msg) if msg.contains("child index 0")));
    }

    #[test]
    fn tree_rejects_feature_outside_schema() {
        let err = DecisionTree::new(
            vec![
                TreeNode::Split {
                    feature: 4,
                    threshold: 0.0,
                    left: 1,
                    right: 2,
                },
                TreeNode::Leaf { value: 0.1 },
                TreeNode::Leaf { value: 0.2 },
            ],
            3,
        )
        .expect_err("should reject");
        assert!(matches!(err, CoreError::SchemaMismatch(_)));
    }

    #[test]
    fn tree_rejects_leaf_outside_unit_interval() {
        let err = DecisionTree::new(vec![TreeNode::Leaf { value: 1.2 }], 1)
            .expect_err("should reject");
        assert!(matches!(err, CoreError::Artifact(msg) if msg.contains("not a probability")));
    }

    #[test]
    fn forest_averages_tree_leaves() {
        let forest = ForestModel::new(
            vec![stump(0, 0.0, 0.1, 0.9), stump(1, 0.0, 0.3, 0.7)],
            2,
        )
        .expect("forest");
        let p = forest
            .predict_probability(&FeatureVector::new(vec![1.0, -1.0]))
            .expect("predict");
        // (0.9 + 0.3) / 2
        assert!((p.value() - 0.6).abs() < 1e-12);
    }

    #[test]
    fn forest_rejects_tree_built_for_other_width() {
        let wide = DecisionTree::new(
            vec![
                TreeNode::Split {
                    feature: 4,
                    threshold: 0.0,
                    left: 1,
                    right: 2,
                },
                TreeNode::Leaf { value: 0.1 },
                TreeNode::Leaf { value: 0.9 },
            ],
            5,
        )
        .expect("tree");
        let err = ForestModel::new(vec![wide], 2).expect_err("should reject");
        assert!(matches!(err, CoreError::SchemaMismatch(msg) if msg.contains("tree 0")));
    }

    #[test]
    fn stacking_feeds_base_probabilities_to_final_estimator() {
        let forest = ForestModel::new(vec![stump(0, 0.0, 0.2, 0.8)], 2).expect("forest");
        let logistic = LogisticModel::new(vec![0.0, 0.0], 0.0).expect("logistic");
        let meta = LogisticModel::new(vec![2.0, 2.0], -2.0).expect("meta");
        let stack = StackingModel::new(vec![Box::new(forest), Box::new(logistic)], meta, false)
            .expect("stack");

        let p = stack
            .predict_probability(&FeatureVector::new(vec![1.0, 0.0]))
            .expect("predict");
        // meta input [0.8, 0.5] -> 1.6 + 1.0 - 2.0 = 0.6
        assert!((p.value() - sigmoid(0.6)).abs() < 1e-12);
        assert_eq!(stack.input_width(), 2);
    }

    #[test]
    fn stacking_passthrough_appends_features() {
        let base = LogisticModel::new(vec![0.0], 0.0).expect("base");
        let meta = LogisticModel::new(vec![0.0, 1.0], 0.0).expect("meta");
        let stack = StackingModel::new(vec![Box::new(base)], meta, true).expect("stack");
        let p = stack
            .predict_probability(&FeatureVector::new(vec![3.0]))
            .expect("predict");
        assert!((p.value() - sigmoid(3.0)).abs() < 1e-12);
    }

    #[test]
    fn stacking_rejects_final_estimator_width_mismatch() {
        let base = LogisticModel::new(vec![1.0, 1.0], 0.0).expect("base");
        let meta = LogisticModel::new(vec![1.0, 1.0], 0.0).expect("meta");
        let err = StackingModel::new(vec![Box::new(base)], meta, false).expect_err("should reject");
        assert!(matches!(err, CoreError::SchemaMismatch(msg) if msg.contains("final estimator")));
    }
}
