//! Feature schema and schema-ordered feature vectors.
//!
//! The schema is the ordered list of column names the model was trained with. It is the single
//! source of truth for vector length and order: reindexing looks every schema name up in the
//! encoded features, fills names the encoder did not produce with `0.0`, and drops encoded
//! columns the schema does not list.

use crate::encoder::EncodedFeatures;
use crate::error::{CoreError, CoreResult};
use heartcare_types::NonEmptyText;
use std::collections::HashSet;

/// Ordered feature names supplied by the model artifact.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FeatureSchema {
    names: Vec<NonEmptyText>,
}

impl FeatureSchema {
    /// Build a schema from ordered column names.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::SchemaMismatch`] if the list is empty, a name is blank, or a name
    /// appears more than once.
    pub fn new<I, S>(names: I) -> CoreResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for (i, name) in names.into_iter().enumerate() {
            let name = NonEmptyText::new(name.as_ref()).map_err(|_| {
                CoreError::SchemaMismatch(format!("feature name at position {i} is blank"))
            })?;
            if !seen.insert(name.clone()) {
                return Err(CoreError::SchemaMismatch(format!(
                    "duplicate feature name '{name}'"
                )));
            }
            out.push(name);
        }

        if out.is_empty() {
            return Err(CoreError::SchemaMismatch(
                "feature schema cannot be empty".into(),
            ));
        }

        Ok(Self { names: out })
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Always false; an empty schema cannot be constructed.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.names.iter().map(NonEmptyText::as_str)
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n.as_str() == name)
    }

    /// Align encoded features to schema order, filling absent names with zero.
    pub fn reindex(&self, features: &EncodedFeatures) -> FeatureVector {
        FeatureVector(
            self.names
                .iter()
                .map(|name| features.get(name.as_str()).unwrap_or(0.0))
                .collect(),
        )
    }

    /// Compare the schema against a set of producible column names.
    pub fn coverage<'a>(&self, produced: &[&'a str]) -> SchemaCoverage<'a> {
        let unfilled = self
            .names()
            .filter(|n| !produced.iter().any(|p| p == n))
            .map(str::to_owned)
            .collect();
        let dropped = produced
            .iter()
            .copied()
            .filter(|p| self.position(p).is_none())
            .collect();
        SchemaCoverage { unfilled, dropped }
    }
}

/// How a schema lines up with the columns an encoder produces.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SchemaCoverage<'a> {
    /// Schema names no produced column fills; always zero after reindexing.
    pub unfilled: Vec<String>,
    /// Produced columns the schema does not list; discarded by reindexing.
    pub dropped: Vec<&'a str>,
}

/// Numeric feature values in schema order.
#[derive(Clone, Debug, PartialEq)]
pub struct FeatureVector(Vec<f64>);

impl FeatureVector {
    pub fn new(values: Vec<f64>) -> Self {
        Self(values)
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> Vec<f64> {
        self.0
    }
}

impl From<Vec<f64>> for FeatureVector {
    fn from(values: Vec<f64>) -> Self {
        Self(values)
    }
}
