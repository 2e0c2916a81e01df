//! Risk tiering.
//!
//! Thresholds are inclusive lower bounds evaluated from the top: `>= 0.70` is high,
//! `>= 0.40` is moderate, anything else is low. Confidence is the distance from the 0.5
//! decision boundary scaled to `[0, 1]`; it is not a statistical confidence interval.

use crate::constants::{DECISION_BOUNDARY, HIGH_RISK_THRESHOLD, MODERATE_RISK_THRESHOLD};
use heartcare_types::Probability;
use serde::Serialize;

/// Discrete risk bucket.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskTier {
    Low,
    Moderate,
    High,
}

impl std::fmt::Display for RiskTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskTier::Low => write!(f, "low"),
            RiskTier::Moderate => write!(f, "moderate"),
            RiskTier::High => write!(f, "high"),
        }
    }
}

/// Tier and confidence derived from one probability.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Classification {
    pub tier: RiskTier,
    pub confidence: f64,
}

pub struct RiskClassifier;

impl RiskClassifier {
    pub fn classify(probability: Probability) -> Classification {
        Classification {
            tier: Self::tier(probability),
            confidence: Self::confidence(probability),
        }
    }

    pub fn tier(probability: Probability) -> RiskTier {
        let p = probability.value();
        if p >= HIGH_RISK_THRESHOLD {
            RiskTier::High
        } else if p >= MODERATE_RISK_THRESHOLD {
            RiskTier::Moderate
        } else {
            RiskTier::Low
        }
    }

    pub fn confidence(probability: Probability) -> f64 {
        (probability.value() - DECISION_BOUNDARY).abs() * 2.0
    }
}
