//! Constants used throughout the HeartCare core crate.
//!
//! Column names must match the names the model was trained with exactly; thresholds are
//! inclusive lower bounds.

/// Patient age in years.
pub const COL_AGE: &str = "Age";

/// Resting blood pressure.
pub const COL_RESTING_BP: &str = "RestingBP";

/// Serum cholesterol (mg/dl).
pub const COL_CHOLESTEROL: &str = "Cholesterol";

/// Fasting blood sugar > 120 mg/dl indicator (0/1).
pub const COL_FASTING_BS: &str = "FastingBS";

/// Maximum heart rate achieved.
pub const COL_MAX_HR: &str = "MaxHR";

/// ST depression induced by exercise relative to rest.
pub const COL_OLDPEAK: &str = "Oldpeak";

/// One-hot indicator for male sex. Female is the reference category and has no column.
pub const COL_SEX_MALE: &str = "Sex_M";

/// One-hot indicator for exercise-induced angina. "No" is the reference category.
pub const COL_EXERCISE_ANGINA_YES: &str = "ExerciseAngina_Y";

/// Probability at or above which a patient is classed as high risk.
pub const HIGH_RISK_THRESHOLD: f64 = 0.70;

/// Probability at or above which a patient is classed as moderate risk.
pub const MODERATE_RISK_THRESHOLD: f64 = 0.40;

/// Decision boundary used for the confidence score.
pub const DECISION_BOUNDARY: f64 = 0.5;

/// Default artifact directory name searched for when no explicit directory is configured.
pub const DEFAULT_ARTIFACT_DIR: &str = "artifacts";

/// File stem of the feature schema artifact.
pub const SCHEMA_ARTIFACT_STEM: &str = "columns";

/// File stem of the fitted normaliser artifact.
pub const NORMALIZER_ARTIFACT_STEM: &str = "scaler";

/// File stem of the trained model artifact.
pub const MODEL_ARTIFACT_STEM: &str = "model";

/// Accepted artifact file extensions, in lookup order.
pub const ARTIFACT_EXTENSIONS: [&str; 3] = ["yaml", "yml", "json"];
