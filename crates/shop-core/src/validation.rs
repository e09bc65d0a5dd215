//! # Validation Module
//!
//! Input validation for requests entering the workflow engine.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  Layer 1: Angular client          - format checks, user feedback    │
//! │  Layer 2: THIS MODULE             - business rule validation        │
//! │  Layer 3: SQLite constraints      - NOT NULL, UNIQUE, FK, CHECK     │
//! │                                                                     │
//! │  Multiple layers catch different classes of bad input.              │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Everything here runs before any store access; a failure is surfaced to
//! the caller verbatim and nothing is read or written.

use crate::error::ValidationError;
use crate::invoice::LineRequest;
use crate::{MAX_AMOUNT_CENTS, MAX_LINE_QUANTITY, MAX_LINES_PER_INVOICE};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validates a business code (invoice, product, customer, ...).
///
/// ## Rules
/// - Must not be empty
/// - At most 50 characters
/// - Alphanumeric plus hyphen/underscore
///
/// ```rust
/// use shop_core::validation::validate_code;
///
/// assert!(validate_code("invoice code", "HD0001").is_ok());
/// assert!(validate_code("invoice code", "").is_err());
/// assert!(validate_code("invoice code", "HD 0001").is_err());
/// ```
pub fn validate_code(field: &str, code: &str) -> ValidationResult<()> {
    let code = code.trim();

    if code.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if code.len() > 50 {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: 50,
        });
    }

    if !code
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

/// Validates a display name (product, customer, employee).
pub fn validate_name(field: &str, name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if name.len() > 200 {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: 200,
        });
    }

    Ok(())
}

/// Validates a line item quantity: strictly positive, sane upper bound.
pub fn validate_quantity(quantity: i64) -> ValidationResult<()> {
    if quantity <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if quantity > MAX_LINE_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_LINE_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a money amount (discount, amount paid, unit price): not
/// negative, and at most [`MAX_AMOUNT_CENTS`] so downstream multiplication
/// and summation stay within `i64`.
pub fn validate_non_negative(field: &str, cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: field.to_string(),
        });
    }

    if cents > MAX_AMOUNT_CENTS {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: MAX_AMOUNT_CENTS,
        });
    }

    Ok(())
}

/// Validates the shape of a create-invoice request before any lookup runs.
///
/// Checks the invoice code, that at least one line is present (and not an
/// absurd number of them), and every line's quantity and unit price.
pub fn validate_invoice_request(
    code: &str,
    discount_cents: i64,
    amount_paid_cents: i64,
    lines: &[LineRequest],
) -> ValidationResult<()> {
    validate_code("invoice code", code)?;
    validate_non_negative("discount", discount_cents)?;
    validate_non_negative("amount paid", amount_paid_cents)?;

    if lines.is_empty() {
        return Err(ValidationError::Required {
            field: "line items".to_string(),
        });
    }

    if lines.len() > MAX_LINES_PER_INVOICE {
        return Err(ValidationError::OutOfRange {
            field: "line items".to_string(),
            min: 1,
            max: MAX_LINES_PER_INVOICE as i64,
        });
    }

    for line in lines {
        validate_quantity(line.quantity)?;
        validate_non_negative("unit price", line.unit_price.cents())?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;

    fn line(qty: i64, price: i64) -> LineRequest {
        LineRequest {
            product_id: "p1".to_string(),
            quantity: qty,
            unit_price: Money::from_cents(price),
        }
    }

    #[test]
    fn test_validate_code() {
        assert!(validate_code("code", "HD0001").is_ok());
        assert!(validate_code("code", "HD_0001-A").is_ok());
        assert!(validate_code("code", "").is_err());
        assert!(validate_code("code", "   ").is_err());
        assert!(validate_code("code", "has space").is_err());
        assert!(validate_code("code", &"X".repeat(51)).is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-3).is_err());
        assert!(validate_quantity(MAX_LINE_QUANTITY + 1).is_err());
    }

    #[test]
    fn test_amounts_are_capped() {
        assert!(validate_non_negative("amount", MAX_AMOUNT_CENTS).is_ok());

        let err = validate_non_negative("amount", MAX_AMOUNT_CENTS + 1).unwrap_err();
        assert!(matches!(err, ValidationError::OutOfRange { .. }));

        // An absurd unit price cannot reach the line arithmetic.
        let err =
            validate_invoice_request("HD0001", 0, 0, &[line(999, i64::MAX / 2)]).unwrap_err();
        assert!(matches!(err, ValidationError::OutOfRange { .. }));
    }

    #[test]
    fn test_request_needs_lines() {
        let err = validate_invoice_request("HD0001", 0, 0, &[]).unwrap_err();
        assert!(matches!(err, ValidationError::Required { .. }));
    }

    #[test]
    fn test_request_rejects_negative_discount() {
        let err = validate_invoice_request("HD0001", -100, 0, &[line(1, 500)]).unwrap_err();
        assert!(matches!(err, ValidationError::MustNotBeNegative { .. }));
    }

    #[test]
    fn test_request_rejects_bad_line() {
        assert!(validate_invoice_request("HD0001", 0, 0, &[line(0, 500)]).is_err());
        assert!(validate_invoice_request("HD0001", 0, 0, &[line(1, -500)]).is_err());
        assert!(validate_invoice_request("HD0001", 0, 0, &[line(2, 500)]).is_ok());
    }
}
