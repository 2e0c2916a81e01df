//! The single-inference prediction pipeline.
//!
//! `run` performs, in order: validate → encode → reindex → normalise → score → classify. The
//! validation gate runs first and nothing downstream is touched when it fails.
//!
//! Logging here records stage progress only. Input values, probabilities and tiers are never
//! logged.

use crate::classifier::{RiskClassifier, RiskTier};
use crate::encoder::FeatureEncoder;
use crate::error::{CoreError, CoreResult};
use crate::input::{CompleteClinicalInput, RawClinicalInput};
use crate::model::RiskModel;
use crate::normalizer::Normalizer;
use crate::schema::FeatureSchema;
use heartcare_types::Probability;
use serde::Serialize;
use std::sync::Arc;

/// Immutable artifacts shared by every prediction: schema, normaliser and model.
///
/// Built once at startup and cheap to clone; safe to share across threads.
#[derive(Clone, Debug)]
pub struct InferenceContext {
    schema: Arc<FeatureSchema>,
    normalizer: Arc<dyn Normalizer>,
    model: Arc<dyn RiskModel>,
}

impl InferenceContext {
    /// Assemble a context, checking that every component agrees on the feature width.
    ///
    /// Also warns about schema names the encoder never produces. Those slots are always zero,
    /// which usually means the encoder's reference categories no longer match training.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::SchemaMismatch`] if the normaliser or model width differs from the
    /// schema length.
    pub fn new(
        schema: FeatureSchema,
        normalizer: Arc<dyn Normalizer>,
        model: Arc<dyn RiskModel>,
    ) -> CoreResult<Self> {
        if let Some(width) = normalizer.width() {
            if width != schema.len() {
                return Err(CoreError::SchemaMismatch(format!(
                    "{} normaliser was fitted on {width} features but the schema has {}",
                    normalizer.kind(),
                    schema.len()
                )));
            }
        }
        if model.input_width() != schema.len() {
            return Err(CoreError::SchemaMismatch(format!(
                "{} model expects {} features but the schema has {}",
                model.kind(),
                model.input_width(),
                schema.len()
            )));
        }

        let coverage = schema.coverage(FeatureEncoder::produced_columns());
        for name in &coverage.unfilled {
            tracing::warn!(
                feature = %name,
                "schema feature is never produced by the encoder and will always be 0"
            );
        }
        if !coverage.dropped.is_empty() {
            tracing::debug!(
                columns = ?coverage.dropped,
                "encoded columns not in schema are dropped"
            );
        }

        tracing::info!(
            features = schema.len(),
            normalizer = normalizer.kind(),
            model = model.kind(),
            "inference context ready"
        );

        Ok(Self {
            schema: Arc::new(schema),
            normalizer,
            model,
        })
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn normalizer(&self) -> &dyn Normalizer {
        self.normalizer.as_ref()
    }

    pub fn model(&self) -> &dyn RiskModel {
        self.model.as_ref()
    }
}

/// Output of one prediction.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct PredictionResult {
    /// Probability of heart disease.
    pub probability: Probability,
    pub risk_tier: RiskTier,
    /// Distance from the decision boundary, in `[0, 1]`.
    pub confidence: f64,
}

/// Runs the prediction pipeline against a loaded [`InferenceContext`].
#[derive(Clone, Debug)]
pub struct PredictionService {
    context: InferenceContext,
}

impl PredictionService {
    pub fn new(context: InferenceContext) -> Self {
        Self { context }
    }

    pub fn context(&self) -> &InferenceContext {
        &self.context
    }

    /// Validate and score one patient's raw input.
    ///
    /// # Errors
    ///
    /// - [`CoreError::Validation`] if the input is incomplete or out of range; the normaliser
    ///   and model are not called.
    /// - [`CoreError::Collaborator`] if the normaliser or model fails. The error is passed
    ///   through unchanged.
    pub fn run(&self, input: &RawClinicalInput) -> CoreResult<PredictionResult> {
        let complete = input.validate().map_err(|err| {
            tracing::warn!(fields = ?err.fields(), "rejected invalid clinical input");
            err
        })?;
        self.run_complete(&complete)
    }

    /// Score an already validated input.
    pub fn run_complete(&self, input: &CompleteClinicalInput) -> CoreResult<PredictionResult> {
        let encoded = FeatureEncoder::encode(input);
        let vector = self.context.schema.reindex(&encoded);
        tracing::trace!(features = vector.len(), "encoded and reindexed input");

        let normalized = self.context.normalizer.transform(&vector)?;
        let probability = self.context.model.predict_probability(&normalized)?;
        let classification = RiskClassifier::classify(probability);
        tracing::debug!("prediction complete");

        Ok(PredictionResult {
            probability,
            risk_tier: classification.tier,
            confidence: classification.confidence,
        })
    }
}
