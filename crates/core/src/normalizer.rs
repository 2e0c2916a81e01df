//! Fitted normalisation transforms.
//!
//! The pipeline treats a normaliser as an opaque, deterministic function over a schema-ordered
//! vector. Statistics are never recomputed here; each adapter applies parameters fitted at
//! training time.

use crate::error::{CollaboratorError, CoreError, CoreResult};
use crate::schema::FeatureVector;

/// A pre-fitted transform applied to every feature vector before scoring.
pub trait Normalizer: Send + Sync + std::fmt::Debug {
    /// Transform a vector, returning one of identical length.
    fn transform(&self, vector: &FeatureVector) -> Result<FeatureVector, CollaboratorError>;

    /// Number of features the transform was fitted on, if fixed.
    fn width(&self) -> Option<usize>;

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

fn check_parameters(kind: &str, a: &[f64], b: &[f64]) -> CoreResult<()> {
    if a.is_empty() {
        return Err(CoreError::Artifact(format!("{kind} scaler has no features")));
    }
    if a.len() != b.len() {
        return Err(CoreError::Artifact(format!(
            "{kind} scaler parameter lengths differ ({} vs {})",
            a.len(),
            b.len()
        )));
    }
    if a.iter().chain(b).any(|v| !v.is_finite()) {
        return Err(CoreError::Artifact(format!(
            "{kind} scaler parameters must be finite"
        )));
    }
    Ok(())
}

/// Standardisation: `(x - mean) / scale` per feature.
#[derive(Clone, Debug, PartialEq)]
pub struct StandardScaler {
    mean: Vec<f64>,
    scale: Vec<f64>,
}

impl StandardScaler {
    /// A stored scale of exactly zero (a constant feature at fit time) is treated as one.
    pub fn new(mean: Vec<f64>, scale: Vec<f64>) -> CoreResult<Self> {
        check_parameters("standard", &mean, &scale)?;
        let scale = scale
            .into_iter()
            .map(|s| if s == 0.0 { 1.0 } else { s })
            .collect();
        Ok(Self { mean, scale })
    }
}

impl Normalizer for StandardScaler {
    fn transform(&self, vector: &FeatureVector) -> Result<FeatureVector, CollaboratorError> {
        check_width("standard scaler", self.mean.len(), vector)?;
        Ok(vector
            .as_slice()
            .iter()
            .zip(self.mean.iter().zip(&self.scale))
            .map(|(x, (m, s))| (x - m) / s)
            .collect::<Vec<_>>()
            .into())
    }

    fn width(&self) -> Option<usize> {
        Some(self.mean.len())
    }

    fn kind(&self) -> &'static str {
        "standard"
    }
}

/// Min-max scaling in fitted form: `x * scale + min` per feature.
#[derive(Clone, Debug, PartialEq)]
pub struct MinMaxScaler {
    min: Vec<f64>,
    scale: Vec<f64>,
}

impl MinMaxScaler {
    pub fn new(min: Vec<f64>, scale: Vec<f64>) -> CoreResult<Self> {
        check_parameters("min_max", &min, &scale)?;
        Ok(Self { min, scale })
    }
}

impl Normalizer for MinMaxScaler {
    fn transform(&self, vector: &FeatureVector) -> Result<FeatureVector, CollaboratorError> {
        check_width("min-max scaler", self.min.len(), vector)?;
        Ok(vector
            .as_slice()
            .iter()
            .zip(self.min.iter().zip(&self.scale))
            .map(|(x, (m, s))| x * s + m)
            .collect::<Vec<_>>()
            .into())
    }

    fn width(&self) -> Option<usize> {
        Some(self.min.len())
    }

    fn kind(&self) -> &'static str {
        "min_max"
    }
}

/// Pass-through for models trained on raw features.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IdentityNormalizer;

impl Normalizer for IdentityNormalizer {
    fn transform(&self, vector: &FeatureVector) -> Result<FeatureVector, CollaboratorError> {
        Ok(vector.clone())
    }

    fn width(&self) -> Option<usize> {
        None
    }

    fn kind(&self) -> &'static str {
        "identity"
    }
}
