//! # HeartCare Core
//!
//! Single-inference heart disease risk prediction.
//!
//! This crate turns one patient's raw clinical measurements into a probability of heart
//! disease, a risk tier and a confidence score using previously fitted artifacts:
//! - [`RawClinicalInput`] validation into a [`CompleteClinicalInput`]
//! - [`FeatureEncoder`] and [`FeatureSchema`] reindexing into a schema-ordered vector
//! - [`Normalizer`] and [`RiskModel`] capabilities with concrete adapters
//! - [`RiskClassifier`] tiering
//! - [`PredictionService`] composing the steps above over an immutable [`InferenceContext`]
//!
//! **No presentation concerns**: formatting, interpretation copy and input collection belong in
//! `heartcare-cli`. Predictions are neither persisted nor logged.

pub mod artifacts;
pub mod classifier;
pub mod config;
pub mod constants;
pub mod encoder;
pub mod error;
pub mod input;
pub mod model;
pub mod normalizer;
pub mod pipeline;
pub mod schema;
pub mod validation;

pub use artifacts::load_context;
pub use classifier::{Classification, RiskClassifier, RiskTier};
pub use config::{resolve_artifact_dir, CoreConfig};
pub use encoder::{EncodedFeatures, FeatureEncoder};
pub use error::{CollaboratorError, CoreError, CoreResult, FieldIssue, IssueKind, ValidationError};
pub use input::{
    ClinicalField, CompleteClinicalInput, ExerciseAngina, FastingBloodSugar, RawClinicalInput, Sex,
    UnrecognisedChoice,
};
pub use model::{ForestModel, LogisticModel, RiskModel, StackingModel};
pub use normalizer::{IdentityNormalizer, MinMaxScaler, Normalizer, StandardScaler};
pub use pipeline::{InferenceContext, PredictionResult, PredictionService};
pub use schema::{FeatureSchema, FeatureVector};

pub use heartcare_types::{NonEmptyText, Probability};
