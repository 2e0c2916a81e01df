//! Input validation utilities.
//!
//! Turns a [`RawClinicalInput`] into a [`CompleteClinicalInput`], collecting every problem
//! instead of stopping at the first one.

use crate::error::{FieldIssue, IssueKind, ValidationError};
use crate::input::{ClinicalField, CompleteClinicalInput, RawClinicalInput};

impl RawClinicalInput {
    /// Validates completeness and numeric ranges.
    ///
    /// A record is complete when all eight fields hold a value. Numeric values must also be
    /// finite, and resting blood pressure, cholesterol and maximum heart rate must not be
    /// negative. Oldpeak is signed.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] listing every offending field.
    pub fn validate(&self) -> Result<CompleteClinicalInput, ValidationError> {
        let mut issues = Vec::new();
        match self.check(&mut issues) {
            Some(complete) => Ok(complete),
            None => Err(ValidationError { issues }),
        }
    }

    /// Run every field check, appending problems to `issues`.
    ///
    /// Returns `Some` exactly when no issue was appended.
    pub(crate) fn check(&self, issues: &mut Vec<FieldIssue>) -> Option<CompleteClinicalInput> {
        let age = require(ClinicalField::Age, self.age, issues);
        let resting_bp = require_measure(ClinicalField::RestingBp, self.resting_bp, false, issues);
        let cholesterol =
            require_measure(ClinicalField::Cholesterol, self.cholesterol, false, issues);
        let max_heart_rate =
            require_measure(ClinicalField::MaxHeartRate, self.max_heart_rate, false, issues);
        let oldpeak = require_measure(ClinicalField::Oldpeak, self.oldpeak, true, issues);
        let sex = require(ClinicalField::Sex, self.sex, issues);
        let fasting_blood_sugar = require(
            ClinicalField::FastingBloodSugar,
            self.fasting_blood_sugar,
            issues,
        );
        let exercise_angina = require(ClinicalField::ExerciseAngina, self.exercise_angina, issues);

        match (
            age,
            resting_bp,
            cholesterol,
            max_heart_rate,
            oldpeak,
            sex,
            fasting_blood_sugar,
            exercise_angina,
        ) {
            (
                Some(age),
                Some(resting_bp),
                Some(cholesterol),
                Some(max_heart_rate),
                Some(oldpeak),
                Some(sex),
                Some(fasting_blood_sugar),
                Some(exercise_angina),
            ) => Some(CompleteClinicalInput {
                age,
                resting_bp,
                cholesterol,
                max_heart_rate,
                oldpeak,
                sex,
                fasting_blood_sugar,
                exercise_angina,
            }),
            _ => None,
        }
    }
}

fn require<T>(field: ClinicalField, value: Option<T>, issues: &mut Vec<FieldIssue>) -> Option<T> {
    if value.is_none() {
        issues.push(FieldIssue {
            field,
            kind: IssueKind::Missing,
        });
    }
    value
}

fn require_measure(
    field: ClinicalField,
    value: Option<f64>,
    signed: bool,
    issues: &mut Vec<FieldIssue>,
) -> Option<f64> {
    let value = require(field, value, issues)?;
    let kind = if !value.is_finite() {
        IssueKind::NotFinite
    } else if !signed && value < 0.0 {
        IssueKind::Negative
    } else {
        return Some(value);
    };
    issues.push(FieldIssue { field, kind });
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{ExerciseAngina, FastingBloodSugar, Sex};

    fn complete_raw() -> RawClinicalInput {
        RawClinicalInput {
            age: Some(55),
            resting_bp: Some(140.0),
            cholesterol: Some(250.0),
            max_heart_rate: Some(120.0),
            oldpeak: Some(1.5),
            sex: Some(Sex::Male),
            fasting_blood_sugar: Some(FastingBloodSugar::Normal),
            exercise_angina: Some(ExerciseAngina::Yes),
        }
    }

    #[test]
    fn validate_accepts_complete_input() {
        let complete = complete_raw().validate().expect("complete input");
        assert_eq!(complete.age(), 55);
        assert_eq!(complete.oldpeak(), 1.5);
        assert_eq!(complete.sex(), Sex::Male);
    }

    #[test]
    fn validate_accepts_negative_oldpeak() {
        let mut raw = complete_raw();
        raw.oldpeak = Some(-0.8);
        assert_eq!(raw.validate().expect("signed oldpeak").oldpeak(), -0.8);
    }

    #[test]
    fn validate_rejects_each_missing_field() {
        for field in ClinicalField::ALL {
            let mut raw = complete_raw();
            match field {
                ClinicalField::Age => raw.age = None,
                ClinicalField::RestingBp => raw.resting_bp = None,
                ClinicalField::Cholesterol => raw.cholesterol = None,
                ClinicalField::MaxHeartRate => raw.max_heart_rate = None,
                ClinicalField::Oldpeak => raw.oldpeak = None,
                ClinicalField::Sex => raw.sex = None,
                ClinicalField::FastingBloodSugar => raw.fasting_blood_sugar = None,
                ClinicalField::ExerciseAngina => raw.exercise_angina = None,
            }
            let err = raw.validate().expect_err("should reject incomplete input");
            assert_eq!(err.missing_fields(), vec![field]);
        }
    }

    #[test]
    fn validate_reports_every_issue() {
        let raw = RawClinicalInput {
            cholesterol: Some(-1.0),
            max_heart_rate: Some(f64::NAN),
            ..complete_raw()
        };
        let raw = RawClinicalInput { sex: None, ..raw };
        let err = raw.validate().expect_err("should reject");
        assert_eq!(
            err.issues,
            vec![
                FieldIssue {
                    field: ClinicalField::Cholesterol,
                    kind: IssueKind::Negative,
                },
                FieldIssue {
                    field: ClinicalField::MaxHeartRate,
                    kind: IssueKind::NotFinite,
                },
                FieldIssue {
                    field: ClinicalField::Sex,
                    kind: IssueKind::Missing,
                },
            ]
        );
    }

    #[test]
    fn validate_rejects_empty_record() {
        let err = RawClinicalInput::default()
            .validate()
            .expect_err("should reject empty record");
        assert_eq!(err.missing_fields(), ClinicalField::ALL.to_vec());
    }
}
