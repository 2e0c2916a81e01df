//! Validated primitive types shared across the HeartCare crates.
//!
//! Each type here upholds its invariant at construction time, so downstream code can rely on it
//! without re-checking.

/// Errors that can occur when creating validated text types.
#[derive(Debug, thiserror::Error)]
pub enum TextError {
    /// The input text was empty or contained only whitespace
    #[error("Text cannot be empty")]
    Empty,
}

/// A string type that guarantees non-empty content.
///
/// This type wraps a `String` and ensures it contains at least one non-whitespace character.
/// The input is automatically trimmed of leading and trailing whitespace during construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NonEmptyText(String);

impl NonEmptyText {
    /// Creates a new `NonEmptyText` from the given input.
    ///
    /// The input is trimmed of leading and trailing whitespace. If the trimmed
    /// result is empty, an error is returned.
    ///
    /// # Errors
    ///
    /// Returns `Err(TextError::Empty)` if the input is empty or contains only whitespace.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TextError::Empty);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the inner string as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NonEmptyText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for NonEmptyText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl serde::Serialize for NonEmptyText {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for NonEmptyText {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NonEmptyText::new(&s).map_err(serde::de::Error::custom)
    }
}

/// Errors that can occur when creating a [`Probability`].
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum ProbabilityError {
    /// The value was NaN or infinite
    #[error("probability must be a finite number")]
    NotFinite,
    /// The value was finite but outside `[0, 1]`
    #[error("probability {0} is outside the range [0, 1]")]
    OutOfRange(f64),
}

/// A real number guaranteed to lie in the closed interval `[0, 1]`.
///
/// Model outputs are wrapped in this type before any thresholding happens, which turns an
/// out-of-range score into an error at the model boundary instead of a silent misclassification.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Probability(f64);

impl Probability {
    /// Probability of zero.
    pub const ZERO: Probability = Probability(0.0);

    /// Probability of one.
    pub const ONE: Probability = Probability(1.0);

    /// Creates a new `Probability`.
    ///
    /// # Errors
    ///
    /// Returns [`ProbabilityError::NotFinite`] for NaN or infinite input and
    /// [`ProbabilityError::OutOfRange`] for finite values outside `[0, 1]`.
    pub fn new(value: f64) -> Result<Self, ProbabilityError> {
        if !value.is_finite() {
            return Err(ProbabilityError::NotFinite);
        }
        if !(0.0..=1.0).contains(&value) {
            return Err(ProbabilityError::OutOfRange(value));
        }
        Ok(Self(value))
    }

    /// Returns the wrapped value.
    pub fn value(self) -> f64 {
        self.0
    }
}

impl std::fmt::Display for Probability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<f64> for Probability {
    type Error = ProbabilityError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Probability::new(value)
    }
}

impl From<Probability> for f64 {
    fn from(p: Probability) -> Self {
        p.0
    }
}

impl serde::Serialize for Probability {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_f64(self.0)
    }
}

impl<'de> serde::Deserialize<'de> for Probability {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let v = f64::deserialize(deserializer)?;
        Probability::new(v).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_empty_text_trims_input() {
        let text = NonEmptyText::new("  Age ").expect("valid text");
        assert_eq!(text.as_str(), "Age");
    }

    #[test]
    fn non_empty_text_rejects_whitespace() {
        let err = NonEmptyText::new("   ").expect_err("should reject whitespace");
        assert!(matches!(err, TextError::Empty));
    }

    #[test]
    fn non_empty_text_deserialize_rejects_empty() {
        let err = serde_json::from_str::<NonEmptyText>(r#""""#).expect_err("should reject");
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn probability_accepts_closed_interval() {
        assert_eq!(Probability::new(0.0).expect("zero").value(), 0.0);
        assert_eq!(Probability::new(1.0).expect("one").value(), 1.0);
        assert_eq!(Probability::new(0.82).expect("mid").value(), 0.82);
    }

    #[test]
    fn probability_rejects_out_of_range() {
        assert!(matches!(
            Probability::new(1.0001),
            Err(ProbabilityError::OutOfRange(_))
        ));
        assert!(matches!(
            Probability::new(-0.1),
            Err(ProbabilityError::OutOfRange(_))
        ));
    }

    #[test]
    fn probability_rejects_non_finite() {
        assert!(matches!(
            Probability::new(f64::NAN),
            Err(ProbabilityError::NotFinite)
        ));
        assert!(matches!(
            Probability::new(f64::INFINITY),
            Err(ProbabilityError::NotFinite)
        ));
    }

    #[test]
    fn probability_deserialize_validates_range() {
        let p: Probability = serde_json::from_str("0.25").expect("in range");
        assert_eq!(p.value(), 0.25);
        assert!(serde_json::from_str::<Probability>("1.5").is_err());
    }
}
