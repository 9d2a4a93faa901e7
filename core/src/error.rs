use std::fmt;

use thiserror::Error;
use uuid::Uuid;

use crate::fields::EntityType;

/// Result type alias for tracker operations
pub type Result<T> = std::result::Result<T, TrackerError>;

/// User-facing message for every failure that is not a request error.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// Error categories the boundary dispatches on.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Conflict,
    NotFound,
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Validation => write!(f, "ValidationError"),
            ErrorKind::Conflict => write!(f, "ConflictError"),
            ErrorKind::NotFound => write!(f, "NotFoundError"),
            ErrorKind::Internal => write!(f, "InternalError"),
        }
    }
}

/// Error taxonomy for the tracker core.
///
/// Request errors (`Validation`, `Conflict`, `NotFound`) carry a message that is
/// safe to show to the caller. Everything else is an unexpected failure: the
/// detail is kept for server-side logging and the caller only ever sees
/// [`INTERNAL_ERROR_MESSAGE`].
///
/// # Examples
///
/// ```rust
/// use tracker_core::error::{ErrorKind, TrackerError};
///
/// let missing = TrackerError::project_not_found_id(uuid::Uuid::nil());
/// assert!(missing.is_not_found());
/// assert_eq!(missing.status_code(), 404);
///
/// let db = TrackerError::Database("disk I/O error".to_string());
/// assert_eq!(db.kind(), ErrorKind::Internal);
/// assert_eq!(db.user_message(), "Internal server error");
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TrackerError {
    /// Malformed, unknown or disallowed input
    #[error("Validation error: {0}")]
    Validation(String),

    /// Uniqueness violation
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Resource absent, foreign-owned or already deleted
    #[error("Not found: {0}")]
    NotFound(String),

    /// Database operation error
    #[error("Database error: {0}")]
    Database(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Internal system error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl TrackerError {
    /// Create a not found error for a project id
    pub fn project_not_found_id(id: Uuid) -> Self {
        Self::NotFound(format!("Project with id {id} not found"))
    }

    /// Create a not found error for a task id
    pub fn task_not_found_id(id: Uuid) -> Self {
        Self::NotFound(format!("Task with id {id} not found"))
    }

    /// Create a not found error for any entity type
    pub fn not_found(entity: EntityType, id: Uuid) -> Self {
        match entity {
            EntityType::Project => Self::project_not_found_id(id),
            EntityType::Task => Self::task_not_found_id(id),
        }
    }

    /// Create a conflict error for a duplicate project name
    pub fn duplicate_project_name(name: &str) -> Self {
        Self::Conflict(format!("Project with the name {name} already exists"))
    }

    /// Create a validation error for an empty field
    pub fn empty_field(field: &str) -> Self {
        Self::Validation(format!("Field '{field}' cannot be empty"))
    }

    /// Create a validation error listing offending field or parameter names
    pub fn invalid_keys(what: &str, keys: &[String]) -> Self {
        Self::Validation(format!("{what}: {}", keys.join(", ")))
    }

    /// Create a validation error for a malformed identifier
    pub fn invalid_id(field: &str, value: &str) -> Self {
        Self::Validation(format!("Invalid id for '{field}': '{value}'"))
    }

    /// The category the error belongs to
    pub fn kind(&self) -> ErrorKind {
        match self {
            TrackerError::Validation(_) => ErrorKind::Validation,
            TrackerError::Conflict(_) => ErrorKind::Conflict,
            TrackerError::NotFound(_) => ErrorKind::NotFound,
            TrackerError::Database(_)
            | TrackerError::Configuration(_)
            | TrackerError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Check if this error indicates a not found condition
    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }

    /// Check if this error indicates a validation problem
    pub fn is_validation(&self) -> bool {
        self.kind() == ErrorKind::Validation
    }

    /// Check if this error indicates a uniqueness conflict
    pub fn is_conflict(&self) -> bool {
        self.kind() == ErrorKind::Conflict
    }

    /// Check if this error indicates a database problem
    pub fn is_database(&self) -> bool {
        matches!(self, TrackerError::Database(_))
    }

    /// Convert to appropriate HTTP status code equivalent
    pub fn status_code(&self) -> u16 {
        match self.kind() {
            ErrorKind::Validation => 400,
            ErrorKind::NotFound => 404,
            ErrorKind::Conflict => 409,
            ErrorKind::Internal => 500,
        }
    }

    /// Detail kept for server-side logs
    pub fn internal_message(&self) -> &str {
        match self {
            TrackerError::Validation(msg)
            | TrackerError::Conflict(msg)
            | TrackerError::NotFound(msg)
            | TrackerError::Database(msg)
            | TrackerError::Configuration(msg)
            | TrackerError::Internal(msg) => msg,
        }
    }

    /// Message safe to return to the caller
    pub fn user_message(&self) -> &str {
        match self.kind() {
            ErrorKind::Internal => INTERNAL_ERROR_MESSAGE,
            _ => self.internal_message(),
        }
    }
}
