use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde_json::json;
use thiserror::Error;

use crate::model::leave::{LeaveCategory, LeaveStatus};

/// Error taxonomy for the HR core. Every variant is recovered at the API
/// boundary and rendered as a structured JSON body; none crashes the process.
#[derive(Debug, Error)]
pub enum HrError {
    #[error("{0}")]
    Validation(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("cannot {action} a {current} leave request")]
    InvalidState {
        action: &'static str,
        current: LeaveStatus,
    },

    #[error(
        "insufficient {category} balance: requested {requested} days, available {available}"
    )]
    InsufficientBalance {
        category: LeaveCategory,
        requested: u32,
        available: u32,
    },

    #[error("{0}")]
    Forbidden(String),

    #[error("storage failure")]
    Storage(#[from] sqlx::Error),
}

impl HrError {
    pub fn kind(&self) -> &'static str {
        match self {
            HrError::Validation(_) => "validation_error",
            HrError::NotFound(_) => "not_found",
            HrError::InvalidState { .. } => "invalid_state",
            HrError::InsufficientBalance { .. } => "insufficient_balance",
            HrError::Forbidden(_) => "forbidden",
            HrError::Storage(_) => "storage_error",
        }
    }
}

impl ResponseError for HrError {
    fn status_code(&self) -> StatusCode {
        match self {
            HrError::Validation(_) => StatusCode::BAD_REQUEST,
            HrError::NotFound(_) => StatusCode::NOT_FOUND,
            HrError::InvalidState { .. } => StatusCode::CONFLICT,
            HrError::InsufficientBalance { .. } => StatusCode::CONFLICT,
            HrError::Forbidden(_) => StatusCode::FORBIDDEN,
            HrError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let mut body = json!({
            "error": self.kind(),
            "message": self.to_string(),
        });

        match self {
            HrError::InsufficientBalance {
                requested,
                available,
                ..
            } => {
                body["requested"] = (*requested).into();
                body["available"] = (*available).into();
            }
            HrError::Storage(e) => {
                // details stay in the logs, not in the response
                tracing::error!(error = %e, "storage failure");
                body["message"] = "Internal Server Error".into();
            }
            _ => {}
        }

        HttpResponse::build(self.status_code()).json(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_match_taxonomy() {
        assert_eq!(
            HrError::Validation("bad".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            HrError::NotFound("leave request").status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            HrError::InvalidState {
                action: "approve",
                current: LeaveStatus::Rejected
            }
            .status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            HrError::Forbidden("nope".into()).status_code(),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn insufficient_balance_body_carries_counts() {
        let err = HrError::InsufficientBalance {
            category: LeaveCategory::Casual,
            requested: 10,
            available: 9,
        };
        assert_eq!(err.kind(), "insufficient_balance");
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
        assert!(err.to_string().contains("requested 10"));
        assert!(err.to_string().contains("available 9"));
    }
}
