//! # Error Types
//!
//! Business error taxonomy for the shop backend.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  shop-core errors (this file)                                       │
//! │  ├── CoreError        - Business rule violations, with reason codes │
//! │  └── ValidationError  - Input validation failures                   │
//! │                                                                     │
//! │  shop-db errors (separate crate)                                    │
//! │  └── DbError          - Database operation failures                 │
//! │                                                                     │
//! │  API errors (apps/api)                                              │
//! │  └── ApiError         - HTTP status + structured JSON body          │
//! │                                                                     │
//! │  Flow: ValidationError → CoreError → ApiError → client              │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Business rule violations are return values, never panics or thrown
//!    faults; thrown faults are reserved for infrastructure failures.
//! 2. Include context in error messages (code, id, remaining stock).
//! 3. Every variant carries a stable machine-checkable reason code so the
//!    client can branch without parsing messages.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Business rule violations raised by the invoice workflow engine.
///
/// Any of these returned mid-transaction aborts the whole unit of work; no
/// stock, customer or invoice mutation is ever partially visible.
#[derive(Debug, Error)]
pub enum CoreError {
    /// An invoice with this code already exists.
    #[error("Invoice code '{0}' already exists")]
    DuplicateCode(String),

    /// The mandatory employee reference does not resolve.
    #[error("Employee not found: {0}")]
    EmployeeNotFound(String),

    /// The optional customer reference does not resolve.
    #[error("Customer not found: {0}")]
    CustomerNotFound(String),

    /// A referenced product does not exist.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// The targeted invoice does not exist.
    #[error("Invoice not found: {0}")]
    InvoiceNotFound(String),

    /// Payment method missing or inactive.
    #[error("Invalid payment method: {0}")]
    InvalidPaymentMethod(String),

    /// A line item asks for more units than are on hand.
    ///
    /// Names the offending product and the stock remaining so the POS can
    /// show "only N left" to the cashier.
    #[error("Insufficient stock for {code}: available {available}, requested {requested}")]
    InsufficientStock {
        code: String,
        available: i64,
        requested: i64,
    },

    /// Settlement targeted an invoice that is already paid. Settlement is
    /// not idempotent: a second call is an error, not a no-op.
    #[error("Invoice {0} is already paid")]
    AlreadyPaid(String),

    /// Update targeted a paid (finalized) invoice.
    #[error("Invoice {0} is paid and can no longer be modified")]
    CannotModifyPaidInvoice(String),

    /// Delete targeted a paid (finalized) invoice.
    #[error("Invoice {0} is paid and cannot be deleted")]
    CannotDeletePaidInvoice(String),

    /// Only full settlement of the entire final amount is supported.
    #[error("Settlement amount {offered} does not match invoice total {expected}")]
    SettlementAmountMismatch { expected: i64, offered: i64 },

    /// Defensive check failed (negative final amount, sum mismatch).
    /// Should not occur with validated inputs; aborts the transaction if it does.
    #[error("Integrity error: {0}")]
    Integrity(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Stable machine-checkable reason code for the API layer.
    pub fn code(&self) -> &'static str {
        match self {
            CoreError::DuplicateCode(_) => "DUPLICATE_CODE",
            CoreError::EmployeeNotFound(_) => "EMPLOYEE_NOT_FOUND",
            CoreError::CustomerNotFound(_) => "CUSTOMER_NOT_FOUND",
            CoreError::ProductNotFound(_) => "PRODUCT_NOT_FOUND",
            CoreError::InvoiceNotFound(_) => "INVOICE_NOT_FOUND",
            CoreError::InvalidPaymentMethod(_) => "INVALID_PAYMENT_METHOD",
            CoreError::InsufficientStock { .. } => "INSUFFICIENT_STOCK",
            CoreError::AlreadyPaid(_) => "ALREADY_PAID",
            CoreError::CannotModifyPaidInvoice(_) => "CANNOT_MODIFY_PAID_INVOICE",
            CoreError::CannotDeletePaidInvoice(_) => "CANNOT_DELETE_PAID_INVOICE",
            CoreError::SettlementAmountMismatch { .. } => "SETTLEMENT_AMOUNT_MISMATCH",
            CoreError::Integrity(_) => "INTEGRITY_ERROR",
            CoreError::Validation(_) => "VALIDATION_ERROR",
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors, raised before any store access.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must be strictly positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Invalid format (bad characters, unknown status, ...).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InsufficientStock {
            code: "SP002".to_string(),
            available: 2,
            requested: 5,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for SP002: available 2, requested 5"
        );
        assert_eq!(err.code(), "INSUFFICIENT_STOCK");
    }

    #[test]
    fn test_settlement_mismatch_message() {
        let err = CoreError::SettlementAmountMismatch {
            expected: 15_000,
            offered: 5_000,
        };
        assert_eq!(
            err.to_string(),
            "Settlement amount 5000 does not match invoice total 15000"
        );
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "code".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
        assert_eq!(core_err.code(), "VALIDATION_ERROR");
    }
}
