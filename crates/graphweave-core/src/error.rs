//! Error types for GraphWeave
//!
//! Provides the error hierarchy shared by every compilation stage.

use thiserror::Error;

/// The main error type for GraphWeave compilation
#[derive(Error, Debug)]
pub enum Error {
    // ========== Schema Resolution Errors ==========
    #[error("Entity not found: {0}")]
    UnknownEntity(String),

    #[error("Attribute `{field}` not found on `{entity}`")]
    UnknownAttribute { entity: String, field: String },

    #[error("Relationship `{field}` not found on `{entity}`")]
    UnknownRelationship { entity: String, field: String },

    #[error("Field `{field}` cannot be selected on `{entity}`")]
    UnknownField { entity: String, field: String },

    #[error("Relationship target `{0}` is a composite entity; filters require a concrete target")]
    CompositeTarget(String),

    // ========== Filter Errors ==========
    #[error("Malformed filter key: {0}")]
    MalformedWhereKey(String),

    #[error("Invalid operator `{operator}` for field `{field}`")]
    InvalidOperator { operator: String, field: String },

    #[error("Invalid comparison value for `{field}`: {detail}")]
    InvalidComparisonValue { field: String, detail: String },

    // ========== Argument Errors ==========
    #[error("Invalid sort argument: {0}")]
    InvalidSort(String),

    #[error("Invalid pagination argument: {0}")]
    InvalidPagination(String),

    #[error("Invalid cursor: {0}")]
    InvalidCursor(String),

    // ========== Internal Errors ==========
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for GraphWeave operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Returns true if this error was caused by client input or an
    /// unresolvable schema reference, as opposed to an internal defect.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, Error::Internal(_))
    }
}
