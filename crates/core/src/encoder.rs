//! Feature encoding.
//!
//! Maps a validated input record onto the named numeric columns the model was trained with.
//! Categorical fields are reduced to a single one-hot indicator each: female sex and "no
//! angina" are the reference categories and produce no column of their own. If the trained
//! schema ever gains a `Sex_F` or `ExerciseAngina_N` column, this module must change with it;
//! [`crate::InferenceContext::new`] warns about schema names this encoder never produces.

use crate::constants::{
    COL_AGE, COL_CHOLESTEROL, COL_EXERCISE_ANGINA_YES, COL_FASTING_BS, COL_MAX_HR, COL_OLDPEAK,
    COL_RESTING_BP, COL_SEX_MALE,
};
use crate::input::{CompleteClinicalInput, ExerciseAngina, Sex};
use std::collections::BTreeMap;

/// Every column name the encoder produces.
pub const ENCODED_COLUMNS: [&str; 8] = [
    COL_AGE,
    COL_RESTING_BP,
    COL_CHOLESTEROL,
    COL_FASTING_BS,
    COL_MAX_HR,
    COL_OLDPEAK,
    COL_SEX_MALE,
    COL_EXERCISE_ANGINA_YES,
];

/// Unordered name→value mapping produced by the encoder, before schema alignment.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EncodedFeatures(BTreeMap<&'static str, f64>);

impl EncodedFeatures {
    pub fn get(&self, name: &str) -> Option<f64> {
        self.0.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.0.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        self.0.iter().map(|(k, v)| (*k, *v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub(crate) fn insert(&mut self, name: &'static str, value: f64) {
        self.0.insert(name, value);
    }
}

impl FromIterator<(&'static str, f64)> for EncodedFeatures {
    fn from_iter<I: IntoIterator<Item = (&'static str, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Feature encoding operations.
///
/// Zero-sized namespace; the encoding rules are static.
pub struct FeatureEncoder;

impl FeatureEncoder {
    /// Encode a validated record into named feature values.
    pub fn encode(input: &CompleteClinicalInput) -> EncodedFeatures {
        let mut features = EncodedFeatures::default();
        features.insert(COL_AGE, f64::from(input.age()));
        features.insert(COL_RESTING_BP, input.resting_bp());
        features.insert(COL_CHOLESTEROL, input.cholesterol());
        features.insert(COL_MAX_HR, input.max_heart_rate());
        features.insert(COL_OLDPEAK, input.oldpeak());
        features.insert(
            COL_FASTING_BS,
            f64::from(input.fasting_blood_sugar().indicator()),
        );
        features.insert(COL_SEX_MALE, indicator(input.sex() == Sex::Male));
        features.insert(
            COL_EXERCISE_ANGINA_YES,
            indicator(input.exercise_angina() == ExerciseAngina::Yes),
        );
        features
    }

    /// Column names this encoder can produce.
    pub fn produced_columns() -> &'static [&'static str] {
        &ENCODED_COLUMNS
    }
}

fn indicator(flag: bool) -> f64 {
    if flag {
        1.0
    } else {
        0.0
    }
}
