use crate::input::ClinicalField;
use heartcare_types::ProbabilityError;

/// What is wrong with a single clinical input field.
#[derive(Debug, Clone, PartialEq)]
pub enum IssueKind {
    /// The field is absent or still "unselected".
    Missing,
    /// A non-negative field holds a negative value.
    Negative,
    /// The value is NaN or infinite.
    NotFinite,
    /// The value does not fit the field's numeric range.
    OutOfRange,
    /// A categorical field holds a value outside its choices.
    Unrecognised(String),
}

/// A single problem found while validating clinical input.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldIssue {
    pub field: ClinicalField,
    pub kind: IssueKind,
}

impl std::fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = self.field.wire_name();
        match &self.kind {
            IssueKind::Missing => write!(f, "{name} is missing"),
            IssueKind::Negative => write!(f, "{name} must not be negative"),
            IssueKind::NotFinite => write!(f, "{name} must be a finite number"),
            IssueKind::OutOfRange => write!(f, "{name} is out of range"),
            IssueKind::Unrecognised(value) => write!(f, "{name} has unrecognised value '{value}'"),
        }
    }
}

/// Clinical input was incomplete or invalid. No encoding or scoring was attempted.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("invalid clinical input: {}", describe_issues(.issues))]
pub struct ValidationError {
    pub issues: Vec<FieldIssue>,
}

impl ValidationError {
    /// Fields that were absent or unselected.
    pub fn missing_fields(&self) -> Vec<ClinicalField> {
        self.issues
            .iter()
            .filter(|i| i.kind == IssueKind::Missing)
            .map(|i| i.field)
            .collect()
    }

    /// Every field with at least one issue, in input order.
    pub fn fields(&self) -> Vec<ClinicalField> {
        let mut out: Vec<ClinicalField> = self.issues.iter().map(|i| i.field).collect();
        out.sort();
        out.dedup();
        out
    }
}

fn describe_issues(issues: &[FieldIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Failure raised by a normaliser or model adapter.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CollaboratorError {
    #[error("{component} expected {expected} features, got {actual}")]
    DimensionMismatch {
        component: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("{component} produced an invalid probability: {source}")]
    InvalidScore {
        component: &'static str,
        #[source]
        source: ProbabilityError,
    },
    #[error("{component} failed: {message}")]
    Failed {
        component: &'static str,
        message: String,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("feature schema mismatch: {0}")]
    SchemaMismatch(String),
    #[error(transparent)]
    Collaborator(#[from] CollaboratorError),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("invalid artifact: {0}")]
    Artifact(String),
    #[error("failed to read {path}: {source}", path = path.display())]
    FileRead {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type CoreResult<T> = std::result::Result<T, CoreError>;
