//! Raw clinical input for a single patient.
//!
//! Responsibilities:
//! - Define the domain-level input record, where every field may still be unselected
//! - Define the categorical choices and their accepted wire spellings
//! - Parse input files (YAML or JSON) through a strict wire model
//!
//! Validation into a [`CompleteClinicalInput`] lives in [`crate::validation`].

use crate::error::{CoreError, CoreResult, FieldIssue, IssueKind, ValidationError};
use serde::{Deserialize, Serialize};

// ============================================================================
// Public domain-level types
// ============================================================================

/// The eight clinical input fields, in collection order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClinicalField {
    Age,
    RestingBp,
    Cholesterol,
    MaxHeartRate,
    Oldpeak,
    Sex,
    FastingBloodSugar,
    ExerciseAngina,
}

impl ClinicalField {
    /// All fields in collection order.
    pub const ALL: [ClinicalField; 8] = [
        ClinicalField::Age,
        ClinicalField::RestingBp,
        ClinicalField::Cholesterol,
        ClinicalField::MaxHeartRate,
        ClinicalField::Oldpeak,
        ClinicalField::Sex,
        ClinicalField::FastingBloodSugar,
        ClinicalField::ExerciseAngina,
    ];

    /// Key used for this field in input files.
    pub fn wire_name(self) -> &'static str {
        match self {
            ClinicalField::Age => "age",
            ClinicalField::RestingBp => "resting_bp",
            ClinicalField::Cholesterol => "cholesterol",
            ClinicalField::MaxHeartRate => "max_heart_rate",
            ClinicalField::Oldpeak => "oldpeak",
            ClinicalField::Sex => "sex",
            ClinicalField::FastingBloodSugar => "fasting_blood_sugar",
            ClinicalField::ExerciseAngina => "exercise_angina",
        }
    }
}

impl std::fmt::Display for ClinicalField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.wire_name())
    }
}

/// A categorical value that matched none of the field's choices.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognised {field} value '{value}'")]
pub struct UnrecognisedChoice {
    pub field: ClinicalField,
    pub value: String,
}

/// Patient sex.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Sex {
    Male,
    Female,
}

impl Sex {
    fn from_wire(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "m" | "male" => Some(Sex::Male),
            "f" | "female" => Some(Sex::Female),
            _ => None,
        }
    }
}

impl std::str::FromStr for Sex {
    type Err = UnrecognisedChoice;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Sex::from_wire(s).ok_or_else(|| UnrecognisedChoice {
            field: ClinicalField::Sex,
            value: s.to_owned(),
        })
    }
}

/// Fasting blood sugar above 120 mg/dl.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum FastingBloodSugar {
    /// At or below 120 mg/dl (wire value `0`).
    Normal,
    /// Above 120 mg/dl (wire value `1`).
    High,
}

impl FastingBloodSugar {
    /// The 0/1 indicator the model was trained on.
    pub fn indicator(self) -> u8 {
        match self {
            FastingBloodSugar::Normal => 0,
            FastingBloodSugar::High => 1,
        }
    }

    fn from_wire(s: &str) -> Option<Self> {
        match s.trim() {
            "0" => Some(FastingBloodSugar::Normal),
            "1" => Some(FastingBloodSugar::High),
            _ => None,
        }
    }
}

impl std::str::FromStr for FastingBloodSugar {
    type Err = UnrecognisedChoice;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FastingBloodSugar::from_wire(s).ok_or_else(|| UnrecognisedChoice {
            field: ClinicalField::FastingBloodSugar,
            value: s.to_owned(),
        })
    }
}

/// Exercise-induced angina.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum ExerciseAngina {
    Yes,
    No,
}

impl ExerciseAngina {
    fn from_wire(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "y" | "yes" => Some(ExerciseAngina::Yes),
            "n" | "no" => Some(ExerciseAngina::No),
            _ => None,
        }
    }
}

impl std::str::FromStr for ExerciseAngina {
    type Err = UnrecognisedChoice;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ExerciseAngina::from_wire(s).ok_or_else(|| UnrecognisedChoice {
            field: ClinicalField::ExerciseAngina,
            value: s.to_owned(),
        })
    }
}

/// One patient's raw observations. `None` means absent or unselected.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct RawClinicalInput {
    /// Age in years.
    pub age: Option<u32>,
    /// Resting blood pressure.
    pub resting_bp: Option<f64>,
    /// Serum cholesterol (mg/dl).
    pub cholesterol: Option<f64>,
    /// Maximum heart rate achieved.
    pub max_heart_rate: Option<f64>,
    /// ST depression; may be negative.
    pub oldpeak: Option<f64>,
    pub sex: Option<Sex>,
    pub fasting_blood_sugar: Option<FastingBloodSugar>,
    pub exercise_angina: Option<ExerciseAngina>,
}

/// A validated input record: every field present and within range.
///
/// Only [`RawClinicalInput::validate`] constructs this type, so holding one is proof that the
/// completeness check has passed.
#[derive(Clone, Debug, PartialEq)]
pub struct CompleteClinicalInput {
    pub(crate) age: u32,
    pub(crate) resting_bp: f64,
    pub(crate) cholesterol: f64,
    pub(crate) max_heart_rate: f64,
    pub(crate) oldpeak: f64,
    pub(crate) sex: Sex,
    pub(crate) fasting_blood_sugar: FastingBloodSugar,
    pub(crate) exercise_angina: ExerciseAngina,
}

impl CompleteClinicalInput {
    pub fn age(&self) -> u32 {
        self.age
    }

    pub fn resting_bp(&self) -> f64 {
        self.resting_bp
    }

    pub fn cholesterol(&self) -> f64 {
        self.cholesterol
    }

    pub fn max_heart_rate(&self) -> f64 {
        self.max_heart_rate
    }

    pub fn oldpeak(&self) -> f64 {
        self.oldpeak
    }

    pub fn sex(&self) -> Sex {
        self.sex
    }

    pub fn fasting_blood_sugar(&self) -> FastingBloodSugar {
        self.fasting_blood_sugar
    }

    pub fn exercise_angina(&self) -> ExerciseAngina {
        self.exercise_angina
    }
}

// ============================================================================
// Input file parsing
// ============================================================================

impl RawClinicalInput {
    /// Parse an input record from YAML text.
    ///
    /// Keys not listed in [`ClinicalField`] are rejected. Structural mismatches become
    /// [`CoreError::InvalidInput`] naming the failing key. An unrecognised categorical value or a
    /// negative age becomes a [`ValidationError`] that also lists every other field
    /// [`RawClinicalInput::validate`] would reject. A record with no such value parses even when
    /// incomplete.
    pub fn from_yaml(text: &str) -> CoreResult<Self> {
        let deserializer = serde_yaml::Deserializer::from_str(text);
        let wire = serde_path_to_error::deserialize::<_, RawClinicalInputWire>(deserializer)
            .map_err(|err| input_mismatch(err.path().to_string(), err.into_inner()))?;
        wire_to_domain(wire)
    }

    /// Parse an input record from JSON text. See [`RawClinicalInput::from_yaml`].
    pub fn from_json(text: &str) -> CoreResult<Self> {
        let mut deserializer = serde_json::Deserializer::from_str(text);
        let wire = serde_path_to_error::deserialize::<_, RawClinicalInputWire>(&mut deserializer)
            .map_err(|err| input_mismatch(err.path().to_string(), err.into_inner()))?;
        wire_to_domain(wire)
    }

    /// Fields that are still absent or unselected.
    pub fn missing_fields(&self) -> Vec<ClinicalField> {
        let present = [
            self.age.is_some(),
            self.resting_bp.is_some(),
            self.cholesterol.is_some(),
            self.max_heart_rate.is_some(),
            self.oldpeak.is_some(),
            self.sex.is_some(),
            self.fasting_blood_sugar.is_some(),
            self.exercise_angina.is_some(),
        ];
        ClinicalField::ALL
            .into_iter()
            .zip(present)
            .filter(|(_, p)| !p)
            .map(|(f, _)| f)
            .collect()
    }

    /// True when every field holds a value.
    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }
}

fn input_mismatch(path: String, source: impl std::fmt::Display) -> CoreError {
    let path = if path.is_empty() || path == "." {
        "<root>".to_string()
    } else {
        path
    };
    CoreError::InvalidInput(format!("clinical input mismatch at {path}: {source}"))
}

// ============================================================================
// Wire types (internal)
// ============================================================================

/// Wire representation of an input record.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawClinicalInputWire {
    #[serde(default)]
    age: Option<i64>,
    #[serde(default)]
    resting_bp: Option<f64>,
    #[serde(default)]
    cholesterol: Option<f64>,
    #[serde(default)]
    max_heart_rate: Option<f64>,
    #[serde(default)]
    oldpeak: Option<f64>,
    #[serde(default)]
    sex: Option<ChoiceWire>,
    #[serde(default)]
    fasting_blood_sugar: Option<ChoiceWire>,
    #[serde(default)]
    exercise_angina: Option<ChoiceWire>,
}

/// Categorical values may be written as strings or, for 0/1 fields, as integers.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ChoiceWire {
    Int(i64),
    Text(String),
}

impl ChoiceWire {
    fn into_text(self) -> String {
        match self {
            ChoiceWire::Int(i) => i.to_string(),
            ChoiceWire::Text(s) => s,
        }
    }
}

/// Placeholder spellings that mean "not chosen yet".
fn is_unselected(s: &str) -> bool {
    let s = s.trim();
    s.is_empty() || s.eq_ignore_ascii_case("select") || s.eq_ignore_ascii_case("unselected")
}

fn parse_choice<T>(
    field: ClinicalField,
    raw: Option<ChoiceWire>,
    parse: fn(&str) -> Option<T>,
    issues: &mut Vec<FieldIssue>,
) -> Option<T> {
    let text = raw?.into_text();
    if is_unselected(&text) {
        return None;
    }
    let parsed = parse(&text);
    if parsed.is_none() {
        issues.push(FieldIssue {
            field,
            kind: IssueKind::Unrecognised(text),
        });
    }
    parsed
}

fn wire_to_domain(wire: RawClinicalInputWire) -> CoreResult<RawClinicalInput> {
    let mut issues = Vec::new();

    let age = match wire.age {
        None => None,
        Some(a) if a < 0 => {
            issues.push(FieldIssue {
                field: ClinicalField::Age,
                kind: IssueKind::Negative,
            });
            None
        }
        Some(a) => match u32::try_from(a) {
            Ok(a) => Some(a),
            Err(_) => {
                issues.push(FieldIssue {
                    field: ClinicalField::Age,
                    kind: IssueKind::OutOfRange,
                });
                None
            }
        },
    };

    let sex = parse_choice(ClinicalField::Sex, wire.sex, Sex::from_wire, &mut issues);
    let fasting_blood_sugar = parse_choice(
        ClinicalField::FastingBloodSugar,
        wire.fasting_blood_sugar,
        FastingBloodSugar::from_wire,
        &mut issues,
    );
    let exercise_angina = parse_choice(
        ClinicalField::ExerciseAngina,
        wire.exercise_angina,
        ExerciseAngina::from_wire,
        &mut issues,
    );

    let raw = RawClinicalInput {
        age,
        resting_bp: wire.resting_bp,
        cholesterol: wire.cholesterol,
        max_heart_rate: wire.max_heart_rate,
        oldpeak: wire.oldpeak,
        sex,
        fasting_blood_sugar,
        exercise_angina,
    };

    if issues.is_empty() {
        return Ok(raw);
    }

    // Fields already rejected here read as missing to the validator; keep the original issue.
    let flagged: Vec<ClinicalField> = issues.iter().map(|i| i.field).collect();
    let mut remaining = Vec::new();
    raw.check(&mut remaining);
    issues.extend(
        remaining
            .into_iter()
            .filter(|issue| !flagged.contains(&issue.field)),
    );
    issues.sort_by_key(|issue| issue.field);
    Err(ValidationError { issues }.into())
}
