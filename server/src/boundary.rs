//! The single place where a `TrackerError` becomes caller-facing output.

use serde::{Deserialize, Serialize};
use tracker_core::{error::INTERNAL_ERROR_MESSAGE, ErrorKind, TrackerError};

/// Body written for a failed command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub success: bool,
    pub status: u16,
    pub message: String,
}

/// Process exit code for a request error (4xx)
pub const EXIT_REQUEST_ERROR: i32 = 1;

/// Process exit code for an internal failure (5xx)
pub const EXIT_INTERNAL_ERROR: i32 = 3;

impl ErrorBody {
    /// Body for a failure that happened before any request ran
    pub fn internal() -> Self {
        Self {
            success: false,
            status: 500,
            message: INTERNAL_ERROR_MESSAGE.to_string(),
        }
    }

    pub fn exit_code(&self) -> i32 {
        if self.status >= 500 {
            EXIT_INTERNAL_ERROR
        } else {
            EXIT_REQUEST_ERROR
        }
    }
}

/// Log the error and produce the body the caller sees.
///
/// Internal detail is logged and never leaves the process.
pub fn handle_error(error: &TrackerError) -> ErrorBody {
    let status = error.status_code();
    match error.kind() {
        ErrorKind::Internal => {
            tracing::error!(status, error = %error, "Request failed");
        }
        _ => {
            tracing::warn!(
                status,
                kind = %error.kind(),
                message = error.user_message(),
                "Request rejected"
            );
        }
    }

    ErrorBody {
        success: false,
        status,
        message: error.user_message().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_errors_keep_their_message() {
        let body = handle_error(&TrackerError::duplicate_project_name("Alpha"));
        assert_eq!(
            body,
            ErrorBody {
                success: false,
                status: 409,
                message: "Project with the name Alpha already exists".to_string(),
            }
        );
        assert_eq!(body.exit_code(), EXIT_REQUEST_ERROR);

        let body = handle_error(&TrackerError::NotFound("Task with id x not found".into()));
        assert_eq!(body.status, 404);
        assert_eq!(body.message, "Task with id x not found");
    }

    #[test]
    fn test_internal_detail_is_hidden() {
        for error in [
            TrackerError::Database("disk I/O error at /var/lib/tracker".to_string()),
            TrackerError::Configuration("bad pool".to_string()),
            TrackerError::Internal("No column for Task field 'x'".to_string()),
        ] {
            let body = handle_error(&error);
            assert_eq!(body.status, 500);
            assert_eq!(body.message, "Internal server error");
            assert_eq!(body.exit_code(), EXIT_INTERNAL_ERROR);
        }
    }

    #[test]
    fn test_body_serializes_flat() {
        let body = handle_error(&TrackerError::Validation(
            "Invalid query parameters: foo".into(),
        ));
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({
                "success": false,
                "status": 400,
                "message": "Invalid query parameters: foo"
            })
        );
    }
}
