//! Error types for keel
//!
//! Errors are structured with fields to aid debugging. Each variant carries
//! the context needed to find the offending piece of configuration: the
//! cluster name, the field path, or the task key involved.

use thiserror::Error;

/// Default context value when no specific context is available
pub const UNKNOWN_CONTEXT: &str = "unknown";

/// Main error type for keel operations
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error in a cluster or instance group spec
    #[error("validation error for {cluster}: {message}")]
    Validation {
        /// Name of the cluster with invalid configuration
        cluster: String,
        /// Description of what's invalid
        message: String,
        /// The invalid field path (e.g., "spec.subnets[2].type")
        field: Option<String>,
    },

    /// Two different tasks were inserted under the same key
    #[error("duplicate task {key}: an existing task with this key differs")]
    DuplicateTask {
        /// Task key in `<Kind>/<name>` form
        key: String,
    },

    /// Links that name no task in the graph
    #[error("unresolved links: {}", .links.join(", "))]
    UnresolvedLink {
        /// One entry per dangling link, `<from> -> <Kind>/<target>`
        links: Vec<String>,
    },

    /// Serialization/deserialization error
    #[error("serialization error: {message}")]
    Serialization {
        /// Description of what failed
        message: String,
        /// The document kind being decoded (if known)
        kind: Option<String>,
    },
}

impl Error {
    /// Create a validation error with the given message
    ///
    /// For simple validation errors without cluster context.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            cluster: UNKNOWN_CONTEXT.to_string(),
            message: msg.into(),
            field: None,
        }
    }

    /// Create a validation error with cluster context
    pub fn validation_for(cluster: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Validation {
            cluster: cluster.into(),
            message: msg.into(),
            field: None,
        }
    }

    /// Create a validation error with cluster context and field path
    pub fn validation_for_field(
        cluster: impl Into<String>,
        field: impl Into<String>,
        msg: impl Into<String>,
    ) -> Self {
        Self::Validation {
            cluster: cluster.into(),
            message: msg.into(),
            field: Some(field.into()),
        }
    }

    /// Create a duplicate task error
    pub fn duplicate_task(key: impl Into<String>) -> Self {
        Self::DuplicateTask { key: key.into() }
    }

    /// Create a serialization error with the given message
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization {
            message: msg.into(),
            kind: None,
        }
    }

    /// Create a serialization error with document kind context
    pub fn serialization_for_kind(kind: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Serialization {
            message: msg.into(),
            kind: Some(kind.into()),
        }
    }

    /// Check if this error is retryable
    ///
    /// Everything keel does is pure computation over in-memory specs, so
    /// retrying cannot change the outcome.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Validation { .. }
            | Error::DuplicateTask { .. }
            | Error::UnresolvedLink { .. }
            | Error::Serialization { .. } => false,
        }
    }

    /// Get the cluster name if this error is associated with a specific cluster
    pub fn cluster(&self) -> Option<&str> {
        match self {
            Error::Validation { cluster, .. } if cluster != UNKNOWN_CONTEXT => Some(cluster),
            _ => None,
        }
    }

    /// Get the field path for validation errors
    pub fn field(&self) -> Option<&str> {
        match self {
            Error::Validation { field, .. } => field.as_deref(),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::serialization(err.to_string())
    }
}
