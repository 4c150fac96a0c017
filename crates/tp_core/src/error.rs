//! Error types for template construction, verification and export.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using [`TemplateError`].
pub type Result<T> = std::result::Result<T, TemplateError>;

/// Top-level error type for all template errors.
///
/// Every variant carries the location of the failure, usually
/// `<resource-id>.field[index]`, so authors can fix the source data directly.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// A field failed a type, range or format check during construction.
    #[error("{location}: {message}")]
    Field {
        /// Where the bad value was found.
        location: String,
        /// Violated constraint.
        message: String,
    },

    /// A cross-resource invariant failed during verification.
    #[error("{location}: {message}")]
    Integrity {
        /// Where the broken reference was found.
        location: String,
        /// Violated invariant.
        message: String,
    },

    /// A resource id has the wrong prefix or does not match the id grammar.
    #[error("{location}: {message}")]
    InvalidId {
        /// Where the id was supplied.
        location: String,
        /// Violated rule.
        message: String,
    },

    /// Two resources were registered under the same id.
    #[error("<{id}>.id: id cannot repeat")]
    DuplicateId {
        /// The repeated id.
        id: String,
    },

    /// A referenced resource is not registered.
    #[error("{location}: Resource \"{id}\" not found")]
    NotFound {
        /// Where the reference was made.
        location: String,
        /// The missing id.
        id: String,
    },

    /// A referenced resource exists but is of another kind.
    #[error("{location}: Resource type miss match")]
    TypeMismatch {
        /// Where the reference was made.
        location: String,
        /// The referenced id.
        id: String,
        /// Kind the caller asked for.
        expected: &'static str,
    },

    /// Malformed, gapped or overlapping timeline input.
    #[error("{location}: {message}")]
    Timeline {
        /// Where the timeline was declared.
        location: String,
        /// Violated rule.
        message: String,
    },

    /// Undefined variable, ownership violation, bad cardinality or redefinition.
    #[error("{location}: {message}")]
    Var {
        /// Where the variable was used or defined.
        location: String,
        /// Violated rule.
        message: String,
    },

    /// Filesystem failure while reading input or writing export artifacts.
    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        /// Path being read or written.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to render a resource as JSON.
    #[error("Failed to serialize: {0}")]
    Json(#[from] serde_json::Error),

    /// A roster file could not be parsed.
    #[error("Failed to parse roster '{path}': {message}")]
    Load {
        /// Roster path (or `<inline>` for in-memory sources).
        path: String,
        /// Parser message.
        message: String,
    },
}

impl TemplateError {
    /// Build a [`TemplateError::Field`].
    pub fn field(location: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Field {
            location: location.into(),
            message: message.into(),
        }
    }

    /// Build a [`TemplateError::Integrity`].
    pub fn integrity(location: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Integrity {
            location: location.into(),
            message: message.into(),
        }
    }

    /// Build a [`TemplateError::InvalidId`].
    pub fn invalid_id(location: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidId {
            location: location.into(),
            message: message.into(),
        }
    }

    /// Build a [`TemplateError::Timeline`].
    pub fn timeline(location: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Timeline {
            location: location.into(),
            message: message.into(),
        }
    }

    /// Build a [`TemplateError::Var`].
    pub fn var(location: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Var {
            location: location.into(),
            message: message.into(),
        }
    }

    /// Location label of the failure, when the variant carries one.
    #[must_use]
    pub fn location(&self) -> Option<&str> {
        match self {
            Self::Field { location, .. }
            | Self::Integrity { location, .. }
            | Self::InvalidId { location, .. }
            | Self::NotFound { location, .. }
            | Self::TypeMismatch { location, .. }
            | Self::Timeline { location, .. }
            | Self::Var { location, .. } => Some(location),
            Self::DuplicateId { .. } | Self::Io { .. } | Self::Json(_) | Self::Load { .. } => None,
        }
    }
}
