//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent violations found while assembling or rolling up a forest.
/// These are independent of where the records came from.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("malformed {kind} record{}: {reason}", .id.as_deref().map(|i| format!(" '{i}'")).unwrap_or_default())]
    MalformedRecord {
        kind: RecordKind,
        id: Option<String>,
        reason: String,
    },

    #[error("cycle detected in company hierarchy at '{unit_id}': {}", .path.join(" -> "))]
    CyclicHierarchy { unit_id: String, path: Vec<String> },

    #[error("cost overflow while aggregating company '{unit_id}'")]
    CostOverflow { unit_id: String },

    #[error("company hierarchy deeper than {max_depth} levels at '{unit_id}'")]
    HierarchyTooDeep { unit_id: String, max_depth: usize },

    #[error("unknown arena index for company hierarchy")]
    UnknownNode,
}

/// Which collection a record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Company,
    Travel,
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordKind::Company => write!(f, "company"),
            RecordKind::Travel => write!(f, "travel"),
        }
    }
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
