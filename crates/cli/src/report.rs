//! Human-readable rendering of a prediction.

use heartcare_core::{PredictionResult, RiskTier};

pub const DISCLAIMER: &str = "This system is a clinical decision support tool and does not \
                              replace professional medical diagnosis.";

pub fn tier_label(tier: RiskTier) -> &'static str {
    match tier {
        RiskTier::High => "HIGH RISK",
        RiskTier::Moderate => "MODERATE RISK",
        RiskTier::Low => "LOW RISK",
    }
}

pub fn interpretation(tier: RiskTier) -> &'static str {
    match tier {
        RiskTier::High => {
            "The model indicates a high risk of heart disease. \
             Immediate medical evaluation is strongly recommended."
        }
        RiskTier::Moderate => {
            "The model indicates a moderate risk of heart disease. \
             Lifestyle improvements and further clinical checks are advised."
        }
        RiskTier::Low => {
            "The model indicates a low risk of heart disease. \
             Maintain a healthy lifestyle and regular medical check-ups."
        }
    }
}

/// Format a fraction in `[0, 1]` as a percentage with two decimals.
pub fn percent(fraction: f64) -> String {
    format!("{:.2}%", fraction * 100.0)
}

pub fn render(result: &PredictionResult) -> String {
    format!(
        "Prediction result: {label}\n\
         Risk probability:  {probability}\n\
         Confidence score:  {confidence}\n\
         \n\
         {interpretation}\n\
         \n\
         {DISCLAIMER}\n",
        label = tier_label(result.risk_tier),
        probability = percent(result.probability.value()),
        confidence = percent(result.confidence),
        interpretation = interpretation(result.risk_tier),
    )
}
