//! Fitted artifact loading.
//!
//! An artifact directory holds three files, each as `.yaml`, `.yml` or `.json`:
//!
//! ```text
//! artifacts/
//! ├── columns.yaml   # ordered feature names
//! ├── scaler.yaml    # kind: standard | min_max | identity
//! └── model.yaml     # kind: logistic | forest | stacking
//! ```
//!
//! Parsing is strict: unknown keys are rejected and errors name the path to the failing field
//! as far as it can be tracked. Once parsed, every artifact is checked against the schema
//! width, so a bundle that loads is a bundle the pipeline can score with.

use crate::config::CoreConfig;
use crate::constants::{
    ARTIFACT_EXTENSIONS, MODEL_ARTIFACT_STEM, NORMALIZER_ARTIFACT_STEM, SCHEMA_ARTIFACT_STEM,
};
use crate::error::{CoreError, CoreResult};
use crate::model::{DecisionTree, ForestModel, LogisticModel, RiskModel, StackingModel, TreeNode};
use crate::normalizer::{IdentityNormalizer, MinMaxScaler, Normalizer, StandardScaler};
use crate::pipeline::InferenceContext;
use crate::schema::FeatureSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// On-disk encoding of an artifact file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArtifactFormat {
    Yaml,
    Json,
}

impl ArtifactFormat {
    fn from_path(path: &Path) -> CoreResult<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml" | "yml") => Ok(ArtifactFormat::Yaml),
            Some("json") => Ok(ArtifactFormat::Json),
            _ => Err(CoreError::Artifact(format!(
                "unsupported artifact file extension: {}",
                path.display()
            ))),
        }
    }
}

/// Load the schema, normaliser and model from the configured directory and assemble them.
///
/// # Errors
///
/// Returns [`CoreError::FileRead`] if a file is missing or unreadable, [`CoreError::Artifact`]
/// for malformed content, and [`CoreError::SchemaMismatch`] when artifacts disagree on width.
pub fn load_context(config: &CoreConfig) -> CoreResult<InferenceContext> {
    let dir = config.artifact_dir();

    let schema = load_schema(&find_artifact(dir, SCHEMA_ARTIFACT_STEM)?)?;
    let normalizer = load_normalizer(&find_artifact(dir, NORMALIZER_ARTIFACT_STEM)?)?;
    let model = load_model(&find_artifact(dir, MODEL_ARTIFACT_STEM)?, schema.len())?;

    tracing::info!(dir = %dir.display(), "loaded artifacts");
    InferenceContext::new(schema, Arc::from(normalizer), Arc::from(model))
}

/// Locate `<stem>.<ext>` in `dir`, trying each supported extension in order.
pub fn find_artifact(dir: &Path, stem: &str) -> CoreResult<PathBuf> {
    ARTIFACT_EXTENSIONS
        .iter()
        .map(|ext| dir.join(format!("{stem}.{ext}")))
        .find(|p| p.is_file())
        .ok_or_else(|| CoreError::FileRead {
            path: dir.join(format!("{stem}.{}", ARTIFACT_EXTENSIONS[0])),
            source: std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("no {stem} artifact ({})", ARTIFACT_EXTENSIONS.join(", ")),
            ),
        })
}

pub fn load_schema(path: &Path) -> CoreResult<FeatureSchema> {
    let names: Vec<String> = read_artifact(path)?;
    FeatureSchema::new(names)
}

pub fn load_normalizer(path: &Path) -> CoreResult<Box<dyn Normalizer>> {
    let wire: NormalizerWire = read_artifact(path)?;
    wire.into_normalizer()
}

/// Load a model, building it for `input_width` features.
pub fn load_model(path: &Path, input_width: usize) -> CoreResult<Box<dyn RiskModel>> {
    let wire: ModelWire = read_artifact(path)?;
    wire.into_model(input_width)
}

fn read_artifact<T: DeserializeOwned>(path: &Path) -> CoreResult<T> {
    let format = ArtifactFormat::from_path(path)?;
    let text = std::fs::read_to_string(path).map_err(|source| CoreError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    parse_with_origin(&text, format, &path.display().to_string())
}

/// Parse artifact text, reporting the path of the first mismatching field.
///
/// # Errors
///
/// Returns [`CoreError::Artifact`] when the text does not match the wire type.
pub fn parse_artifact<T: DeserializeOwned>(text: &str, format: ArtifactFormat) -> CoreResult<T> {
    parse_with_origin(text, format, "artifact")
}

fn parse_with_origin<T: DeserializeOwned>(
    text: &str,
    format: ArtifactFormat,
    origin: &str,
) -> CoreResult<T> {
    let result = match format {
        ArtifactFormat::Yaml => {
            let deserializer = serde_yaml::Deserializer::from_str(text);
            serde_path_to_error::deserialize(deserializer)
                .map_err(|err| (err.path().to_string(), err.into_inner().to_string()))
        }
        ArtifactFormat::Json => {
            let mut deserializer = serde_json::Deserializer::from_str(text);
            serde_path_to_error::deserialize(&mut deserializer)
                .map_err(|err| (err.path().to_string(), err.into_inner().to_string()))
        }
    };

    result.map_err(|(path, source)| {
        let path = if path.is_empty() || path == "." {
            "<root>".to_string()
        } else {
            path
        };
        CoreError::Artifact(format!("{origin}: schema mismatch at {path}: {source}"))
    })
}

// ============================================================================
// Wire types
// ============================================================================

/// Wire representation of a fitted normaliser.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case", deny_unknown_fields)]
pub enum NormalizerWire {
    Standard { mean: Vec<f64>, scale: Vec<f64> },
    MinMax { min: Vec<f64>, scale: Vec<f64> },
    // Struct form: unit variants ignore deny_unknown_fields.
    Identity {},
}

impl NormalizerWire {
    pub fn into_normalizer(self) -> CoreResult<Box<dyn Normalizer>> {
        Ok(match self {
            NormalizerWire::Standard { mean, scale } => Box::new(StandardScaler::new(mean, scale)?),
            NormalizerWire::MinMax { min, scale } => Box::new(MinMaxScaler::new(min, scale)?),
            NormalizerWire::Identity {} => Box::new(IdentityNormalizer),
        })
    }
}

/// Wire representation of logistic regression parameters.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct LogisticWire {
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

impl LogisticWire {
    fn into_model(self) -> CoreResult<LogisticModel> {
        LogisticModel::new(self.coefficients, self.intercept)
    }
}

/// Wire representation of a decision tree.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct TreeWire {
    pub nodes: Vec<NodeWire>,
}

/// A split node carries `feature`/`threshold`/`left`/`right`; a leaf carries only `value`.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(untagged)]
pub enum NodeWire {
    Split(SplitWire),
    Leaf(LeafWire),
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SplitWire {
    pub feature: usize,
    pub threshold: f64,
    pub left: usize,
    pub right: usize,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct LeafWire {
    pub value: f64,
}

impl From<NodeWire> for TreeNode {
    fn from(node: NodeWire) -> Self {
        match node {
            NodeWire::Split(s) => TreeNode::Split {
                feature: s.feature,
                threshold: s.threshold,
                left: s.left,
                right: s.right,
            },
            NodeWire::Leaf(l) => TreeNode::Leaf { value: l.value },
        }
    }
}

/// Wire representation of a trained model.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case", deny_unknown_fields)]
pub enum ModelWire {
    Logistic {
        coefficients: Vec<f64>,
        intercept: f64,
    },
    Forest {
        trees: Vec<TreeWire>,
    },
    Stacking {
        estimators: Vec<ModelWire>,
        final_estimator: LogisticWire,
        #[serde(default)]
        passthrough: bool,
    },
}

impl ModelWire {
    /// Build the model for `input_width` schema features.
    pub fn into_model(self, input_width: usize) -> CoreResult<Box<dyn RiskModel>> {
        let model: Box<dyn RiskModel> = match self {
            ModelWire::Logistic {
                coefficients,
                intercept,
            } => Box::new(LogisticModel::new(coefficients, intercept)?),
            ModelWire::Forest { trees } => {
                let trees = trees
                    .into_iter()
                    .enumerate()
                    .map(|(i, t)| {
                        let nodes = t.nodes.into_iter().map(TreeNode::from).collect();
                        DecisionTree::new(nodes, input_width).map_err(|e| match e {
                            CoreError::Artifact(msg) => {
                                CoreError::Artifact(format!("tree {i}: {msg}"))
                            }
                            CoreError::SchemaMismatch(msg) => {
                                CoreError::SchemaMismatch(format!("tree {i}: {msg}"))
                            }
                            other => other,
                        })
                    })
                    .collect::<CoreResult<Vec<_>>>()?;
                Box::new(ForestModel::new(trees, input_width)?)
            }
            ModelWire::Stacking {
                estimators,
                final_estimator,
                passthrough,
            } => {
                let estimators = estimators
                    .into_iter()
                    .map(|e| e.into_model(input_width))
                    .collect::<CoreResult<Vec<_>>>()?;
                Box::new(StackingModel::new(
                    estimators,
                    final_estimator.into_model()?,
                    passthrough,
                )?)
            }
        };
        Ok(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::RiskTier;
    use crate::encoder::ENCODED_COLUMNS;
    use crate::input::{ExerciseAngina, FastingBloodSugar, RawClinicalInput, Sex};
    use crate::pipeline::PredictionService;
    use crate::schema::FeatureVector;
    use std::fs;

    const COLUMNS_YAML: &str = r#"- Age
- RestingBP
- Cholesterol
- FastingBS
- MaxHR
- Oldpeak
- Sex_M
- ExerciseAngina_Y
"#;

    const SCALER_YAML: &str = r#"kind: standard
mean: [53.5, 132.4, 198.8, 0.23, 136.8, 0.89, 0.79, 0.40]
scale: [9.4, 18.5, 109.3, 0.42, 25.5, 1.07, 0.41, 0.49]
"#;

    const STACKING_YAML: &str = r#"kind: stacking
estimators:
  - kind: logistic
    coefficients: [0.3, 0.1, -0.2, 0.3, -0.4, 0.5, 0.6, 0.5]
    intercept: 0.1
  - kind: forest
    trees:
      - nodes:
          - { feature: 7, threshold: 0.2, left: 1, right: 2 }
          - { value: 0.25 }
          - { value: 0.8 }
final_estimator:
  coefficients: [2.5, 2.5]
  intercept: -2.5
"#;

    fn write_bundle(dir: &Path, model: &str) {
        fs::write(dir.join("columns.yaml"), COLUMNS_YAML).expect("write columns");
        fs::write(dir.join("scaler.yaml"), SCALER_YAML).expect("write scaler");
        fs::write(dir.join("model.yaml"), model).expect("write model");
    }

    #[test]
    fn loads_stacking_bundle() {
        let tmp = tempfile::tempdir().expect("tempdir");
        write_bundle(tmp.path(), STACKING_YAML);

        let config = CoreConfig::new(tmp.path().to_path_buf()).expect("config");
        let context = load_context(&config).expect("load context");

        assert_eq!(context.schema().len(), ENCODED_COLUMNS.len());
        assert_eq!(context.normalizer().kind(), "standard");
        assert_eq!(context.model().kind(), "stacking");

        // All-zero input: the logistic base gives sigmoid(0.1) and the stump goes left (0.25).
        let p = context
            .model()
            .predict_probability(&FeatureVector::new(vec![0.0; 8]))
            .expect("predict");
        let base = 1.0 / (1.0 + (-0.1f64).exp());
        let z = 2.5 * base + 2.5 * 0.25 - 2.5;
        assert!((p.value() - 1.0 / (1.0 + (-z).exp())).abs() < 1e-12);
    }

    #[test]
    fn loaded_bundle_scores_through_prediction_service() {
        let tmp = tempfile::tempdir().expect("tempdir");
        write_bundle(tmp.path(), STACKING_YAML);
        let config = CoreConfig::new(tmp.path().to_path_buf()).expect("config");
        let service = PredictionService::new(load_context(&config).expect("load context"));

        let input = RawClinicalInput {
            age: Some(55),
            resting_bp: Some(140.0),
            cholesterol: Some(250.0),
            max_heart_rate: Some(120.0),
            oldpeak: Some(1.5),
            sex: Some(Sex::Male),
            fasting_blood_sugar: Some(FastingBloodSugar::Normal),
            exercise_angina: Some(ExerciseAngina::Yes),
        };
        let result = service.run(&input).expect("prediction");

        // Scaled ExerciseAngina_Y is above the stump threshold, so the forest contributes 0.8.
        assert!((result.probability.value() - 0.818_335_380_114_532).abs() < 1e-9);
        assert_eq!(result.risk_tier, RiskTier::High);
        assert!((result.confidence - 0.636_670_760_229_064).abs() < 1e-9);
    }

    #[test]
    fn identity_scaler_rejects_stray_parameters() {
        let yaml = "kind: identity\nmean: [1.0, 2.0]\nscale: [1.0, 1.0]\n";
        let err = parse_artifact::<NormalizerWire>(yaml, ArtifactFormat::Yaml)
            .expect_err("should reject unknown keys");
        assert!(matches!(err, CoreError::Artifact(msg) if msg.contains("mean")));

        let wire = parse_artifact::<NormalizerWire>("kind: identity\n", ArtifactFormat::Yaml)
            .expect("bare identity");
        assert_eq!(wire, NormalizerWire::Identity {});
    }

    #[test]
    fn loads_json_artifacts() {
        let tmp = tempfile::tempdir().expect("tempdir");
        fs::write(tmp.path().join("columns.json"), r#"["Age", "Sex_M"]"#).expect("write");
        fs::write(tmp.path().join("scaler.json"), r#"{"kind": "identity"}"#).expect("write");
        fs::write(
            tmp.path().join("model.json"),
            r#"{"kind": "logistic", "coefficients": [0.05, 1.0], "intercept": -3.0}"#,
        )
        .expect("write");

        let config = CoreConfig::new(tmp.path().to_path_buf()).expect("config");
        let context = load_context(&config).expect("load context");
        assert_eq!(context.schema().names().collect::<Vec<_>>(), vec!["Age", "Sex_M"]);
        assert_eq!(context.normalizer().kind(), "identity");
    }

    #[test]
    fn missing_artifact_is_file_read_error() {
        let tmp = tempfile::tempdir().expect("tempdir");
        fs::write(tmp.path().join("columns.yaml"), COLUMNS_YAML).expect("write");

        let config = CoreConfig::new(tmp.path().to_path_buf()).expect("config");
        let err = load_context(&config).expect_err("should fail");
        assert!(matches!(err, CoreError::FileRead { path, .. } if path.ends_with("scaler.yaml")));
    }

    #[test]
    fn empty_schema_is_schema_mismatch() {
        let tmp = tempfile::tempdir().expect("tempdir");
        write_bundle(tmp.path(), STACKING_YAML);
        fs::write(tmp.path().join("columns.yaml"), "[]\n").expect("write");

        let config = CoreConfig::new(tmp.path().to_path_buf()).expect("config");
        let err = load_context(&config).expect_err("should fail");
        assert!(matches!(err, CoreError::SchemaMismatch(msg) if msg.contains("empty")));
    }

    #[test]
    fn scaler_width_must_match_schema() {
        let tmp = tempfile::tempdir().expect("tempdir");
        write_bundle(tmp.path(), STACKING_YAML);
        fs::write(
            tmp.path().join("scaler.yaml"),
            "kind: standard\nmean: [1.0, 2.0]\nscale: [1.0, 1.0]\n",
        )
        .expect("write");

        let config = CoreConfig::new(tmp.path().to_path_buf()).expect("config");
        let err = load_context(&config).expect_err("should fail");
        assert!(matches!(err, CoreError::SchemaMismatch(msg) if msg.contains("fitted on 2")));
    }

    #[test]
    fn strict_parsing_rejects_unknown_keys_with_path() {
        let yaml = r#"kind: stacking
estimators:
  - kind: logistic
    coefficients: [1.0]
    intercept: 0.0
    penalty: l2
final_estimator:
  coefficients: [1.0]
  intercept: 0.0
"#;
        let err = parse_artifact::<ModelWire>(yaml, ArtifactFormat::Yaml)
            .expect_err("should reject unknown key");
        assert!(matches!(err, CoreError::Artifact(msg) if msg.contains("penalty")));
    }

    #[test]
    fn forest_node_errors_name_the_tree() {
        let yaml = r#"kind: forest
trees:
  - nodes:
      - { value: 0.5 }
  - nodes:
      - { feature: 0, threshold: 0.0, left: 1, right: 5 }
      - { value: 0.1 }
"#;
        let wire = parse_artifact::<ModelWire>(yaml, ArtifactFormat::Yaml).expect("parse");
        let err = wire.into_model(1).expect_err("should reject");
        assert!(matches!(err, CoreError::Artifact(msg) if msg.starts_with("tree 1:")));
    }

    #[test]
    fn forest_split_outside_schema_is_schema_mismatch() {
        let yaml = r#"kind: forest
trees:
  - nodes:
      - { feature: 8, threshold: 0.0, left: 1, right: 2 }
      - { value: 0.1 }
      - { value: 0.9 }
"#;
        let wire = parse_artifact::<ModelWire>(yaml, ArtifactFormat::Yaml).expect("parse");
        let err = wire.into_model(8).expect_err("should reject");
        assert!(matches!(err, CoreError::SchemaMismatch(_)));
    }

    #[test]
    fn leaf_with_split_keys_is_rejected() {
        let yaml = r#"kind: forest
trees:
  - nodes:
      - { feature: 0, value: 0.5 }
"#;
        assert!(parse_artifact::<ModelWire>(yaml, ArtifactFormat::Yaml).is_err());
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        let err = load_schema(Path::new("columns.pkl")).expect_err("should reject");
        assert!(matches!(err, CoreError::Artifact(msg) if msg.contains("unsupported")));
    }
}
