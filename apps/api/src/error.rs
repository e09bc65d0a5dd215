//! API error types with HTTP response mapping.
//!
//! Every error leaves the server as `{"error": {"code", "message"}}` where
//! `code` is the stable reason code from shop-core (or an infrastructure
//! code); clients branch on the code, never on the message text.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use shop_core::CoreError;
use shop_db::{DbError, WorkflowError};

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Bad request from the client (malformed path/query input).
    BadRequest(String),
    /// Resource not found (route-level, before any workflow runs).
    NotFound(String),
    /// Business rule violation from the workflow engine.
    Business(CoreError),
    /// Database operation failure.
    Db(DbError),
    /// External collaborator (gateway, printer) failure.
    Collaborator(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            ApiError::Business(err) => {
                let status = business_status(&err);
                (status, err.code(), err.to_string())
            }
            ApiError::Db(err) => {
                tracing::error!(error = %err, "database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL",
                    "internal server error".to_string(),
                )
            }
            ApiError::Collaborator(msg) => {
                tracing::error!(error = %msg, "collaborator error");
                (StatusCode::BAD_GATEWAY, "UPSTREAM_FAILED", msg)
            }
        };

        let body = serde_json::json!({
            "error": { "code": code, "message": message }
        });
        (status, axum::Json(body)).into_response()
    }
}

fn business_status(err: &CoreError) -> StatusCode {
    match err {
        CoreError::Validation(_) => StatusCode::BAD_REQUEST,

        CoreError::EmployeeNotFound(_)
        | CoreError::CustomerNotFound(_)
        | CoreError::ProductNotFound(_)
        | CoreError::InvoiceNotFound(_)
        | CoreError::InvalidPaymentMethod(_) => StatusCode::NOT_FOUND,

        CoreError::DuplicateCode(_)
        | CoreError::InsufficientStock { .. }
        | CoreError::AlreadyPaid(_)
        | CoreError::CannotModifyPaidInvoice(_)
        | CoreError::CannotDeletePaidInvoice(_)
        | CoreError::SettlementAmountMismatch { .. } => StatusCode::CONFLICT,

        CoreError::Integrity(_) => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

impl From<WorkflowError> for ApiError {
    fn from(err: WorkflowError) -> Self {
        match err {
            WorkflowError::Business(e) => ApiError::Business(e),
            WorkflowError::Db(e) => ApiError::Db(e),
        }
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        ApiError::Db(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_statuses() {
        assert_eq!(
            business_status(&CoreError::DuplicateCode("HD1".into())),
            StatusCode::CONFLICT
        );
        assert_eq!(
            business_status(&CoreError::AlreadyPaid("i".into())),
            StatusCode::CONFLICT
        );
        assert_eq!(
            business_status(&CoreError::InsufficientStock {
                code: "COLA".into(),
                available: 1,
                requested: 2,
            }),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_not_found_statuses() {
        assert_eq!(
            business_status(&CoreError::InvoiceNotFound("i".into())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            business_status(&CoreError::ProductNotFound("p".into())),
            StatusCode::NOT_FOUND
        );
    }
}
