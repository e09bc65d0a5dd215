//! # Invoice Workflow Engine
//!
//! The one transactional write path of the system. Each operation
//! (create, settle, update, delete) runs inside a single SQLite
//! transaction and either commits every effect (invoice rows, stock
//! movement, customer statistics) or none of them.
//!
//! ## Invoice Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                      Invoice Lifecycle                              │
//! │                                                                     │
//! │  1. CREATE                                                          │
//! │     └── validate refs → check stock → decrement stock               │
//! │         → compute totals → determine paid/unpaid                    │
//! │         → bump customer stats → insert invoice + details            │
//! │                                                                     │
//! │  2. UPDATE (while unpaid)                                           │
//! │     └── notes / discount only; final amount recomputed              │
//! │                                                                     │
//! │  3. SETTLE (exactly once)                                           │
//! │     └── full amount only → status=paid → reduce customer debt      │
//! │                                                                     │
//! │  4. DELETE (while unpaid)                                           │
//! │     └── restore stock → reverse customer stats → remove rows        │
//! │                                                                     │
//! │  Once paid the aggregate is immutable and non-deletable.            │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Concurrency
//! Stock correctness does not rely on the pre-check alone: the decrement is
//! guarded (`WHERE stock >= qty`) and SQLite allows a single writer, so two
//! concurrent invoices can never both decrement the same product past zero.
//! The pre-check exists to report the offending product and its remaining
//! stock before anything is written.
//!
//! Any early `return Err(...)` drops the transaction, which rolls it back;
//! nothing is ever partially visible.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use thiserror::Error;
use tracing::{debug, info};

use crate::error::DbError;
use crate::repository::generate_id;
use crate::repository::invoice::{HydratedInvoice, InvoiceRepository};
use shop_core::{
    compute_totals, determine_payment, validation, CoreError, Invoice, LineRequest, Money,
    PaymentStatus, Product,
};

// =============================================================================
// Errors
// =============================================================================

/// Errors from workflow operations: either a business rule violation (the
/// interesting taxonomy, see [`CoreError`]) or an infrastructure failure.
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Business(#[from] CoreError),

    #[error(transparent)]
    Db(#[from] DbError),
}

impl From<sqlx::Error> for WorkflowError {
    fn from(err: sqlx::Error) -> Self {
        WorkflowError::Db(err.into())
    }
}

impl From<shop_core::ValidationError> for WorkflowError {
    fn from(err: shop_core::ValidationError) -> Self {
        WorkflowError::Business(err.into())
    }
}

pub type WorkflowResult<T> = Result<T, WorkflowError>;

// =============================================================================
// Requests
// =============================================================================

/// Input for invoice creation, as assembled by the API layer.
#[derive(Debug, Clone)]
pub struct CreateInvoiceRequest {
    pub code: String,
    pub customer_id: Option<String>,
    pub employee_id: String,
    pub discount_cents: i64,
    pub amount_paid_cents: i64,
    pub payment_method_id: Option<String>,
    pub notes: Option<String>,
    pub lines: Vec<LineRequest>,
}

/// Input for the non-settlement update: only notes and discount are mutable.
///
/// Merge semantics: a `None` field keeps the stored value. Notes can be
/// replaced but not cleared through this request; there is no way to
/// distinguish "omitted" from "clear it" on the wire.
#[derive(Debug, Clone, Default)]
pub struct UpdateInvoiceRequest {
    pub notes: Option<String>,
    pub discount_cents: Option<i64>,
}

// =============================================================================
// Engine
// =============================================================================

/// Orchestrates invoice create / settle / update / delete, each as one
/// atomic unit of work against the store.
#[derive(Debug, Clone)]
pub struct InvoiceWorkflow {
    pool: SqlitePool,
}

impl InvoiceWorkflow {
    pub fn new(pool: SqlitePool) -> Self {
        InvoiceWorkflow { pool }
    }

    // -------------------------------------------------------------------------
    // Create
    // -------------------------------------------------------------------------

    /// Creates an invoice with all its detail lines, decrements stock and
    /// updates customer statistics, atomically.
    ///
    /// Step order follows the validation-before-mutation rule: every
    /// reference is resolved and every stock level checked before the first
    /// write. Any failure aborts with no partial effect.
    pub async fn create(&self, req: CreateInvoiceRequest) -> WorkflowResult<HydratedInvoice> {
        debug!(code = %req.code, lines = req.lines.len(), "Creating invoice");

        validation::validate_invoice_request(
            &req.code,
            req.discount_cents,
            req.amount_paid_cents,
            &req.lines,
        )?;

        let mut tx = self.pool.begin().await?;

        // 1. Invoice code must be new.
        let existing: Option<String> = sqlx::query_scalar("SELECT id FROM invoices WHERE code = ?1")
            .bind(&req.code)
            .fetch_optional(&mut *tx)
            .await?;
        if existing.is_some() {
            return Err(CoreError::DuplicateCode(req.code).into());
        }

        // 2. Employee is mandatory and must be active.
        let employee_active: Option<bool> =
            sqlx::query_scalar("SELECT is_active FROM employees WHERE id = ?1")
                .bind(&req.employee_id)
                .fetch_optional(&mut *tx)
                .await?;
        if employee_active != Some(true) {
            return Err(CoreError::EmployeeNotFound(req.employee_id).into());
        }

        // 3. Customer is optional (walk-in) but must resolve when given.
        if let Some(customer_id) = &req.customer_id {
            let found: Option<String> = sqlx::query_scalar("SELECT id FROM customers WHERE id = ?1")
                .bind(customer_id)
                .fetch_optional(&mut *tx)
                .await?;
            if found.is_none() {
                return Err(CoreError::CustomerNotFound(customer_id.clone()).into());
            }
        }

        // 4. Payment method, when given, must resolve to an active method.
        if let Some(method_id) = &req.payment_method_id {
            check_payment_method_active(&mut tx, method_id).await?;
        }

        // 5 + 6. Every product must resolve and cover its requested quantity.
        for line in &req.lines {
            let product = fetch_product(&mut tx, &line.product_id)
                .await?
                .ok_or_else(|| CoreError::ProductNotFound(line.product_id.clone()))?;

            if product.stock < line.quantity {
                return Err(CoreError::InsufficientStock {
                    code: product.code,
                    available: product.stock,
                    requested: line.quantity,
                }
                .into());
            }
        }

        // 7. Line totals, invoice total, final amount (negative final is an
        //    integrity error raised in shop-core).
        let totals = compute_totals(&req.lines, Money::from_cents(req.discount_cents))?;

        let now = Utc::now();

        // 8. Stock ledger: guarded decrement per line. The guard re-checks
        //    stock so lines that share a product cannot oversubscribe it.
        for line in &req.lines {
            decrement_stock(&mut tx, &line.product_id, line.quantity).await?;
        }

        // 9. Payment status; amount paid is clamped to the final amount when
        //    the invoice is settled on the spot.
        let outcome = determine_payment(totals.final_amount, Money::from_cents(req.amount_paid_cents));

        // 10. Customer statistics: purchase amount/count always; debt only
        //     for the unpaid remainder.
        if let Some(customer_id) = &req.customer_id {
            let debt_delta = match outcome.status {
                PaymentStatus::Paid => Money::zero(),
                PaymentStatus::Unpaid => totals.final_amount - outcome.amount_paid,
            };

            sqlx::query(
                r#"
                UPDATE customers SET
                    total_purchase_cents = total_purchase_cents + ?2,
                    total_purchase_count = total_purchase_count + 1,
                    total_debt_cents = total_debt_cents + ?3,
                    updated_at = ?4
                WHERE id = ?1
                "#,
            )
            .bind(customer_id)
            .bind(totals.final_amount.cents())
            .bind(debt_delta.cents())
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        // 11. Persist the aggregate.
        let invoice_id = generate_id();

        sqlx::query(
            r#"
            INSERT INTO invoices (
                id, code, customer_id, employee_id, invoice_date,
                total_cents, discount_cents, final_cents, amount_paid_cents,
                payment_method_id, payment_status, notes,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
            "#,
        )
        .bind(&invoice_id)
        .bind(&req.code)
        .bind(&req.customer_id)
        .bind(&req.employee_id)
        .bind(now)
        .bind(totals.total.cents())
        .bind(req.discount_cents)
        .bind(totals.final_amount.cents())
        .bind(outcome.amount_paid.cents())
        .bind(&req.payment_method_id)
        .bind(outcome.status.as_str())
        .bind(&req.notes)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        for line in &totals.lines {
            sqlx::query(
                r#"
                INSERT INTO invoice_details (
                    id, invoice_id, product_id, quantity, unit_price_cents,
                    line_total_cents, created_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
            )
            .bind(generate_id())
            .bind(&invoice_id)
            .bind(&line.product_id)
            .bind(line.quantity)
            .bind(line.unit_price.cents())
            .bind(line.line_total.cents())
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        info!(
            invoice_id = %invoice_id,
            code = %req.code,
            total = totals.total.cents(),
            status = outcome.status.as_str(),
            "Invoice created"
        );

        // 12. Return the hydrated aggregate for the caller to render.
        self.hydrate(&invoice_id).await
    }

    // -------------------------------------------------------------------------
    // Settle
    // -------------------------------------------------------------------------

    /// Settles an invoice: the one-time transition from unpaid to paid.
    ///
    /// Only full settlement is supported: `amount_cents` must equal the
    /// invoice's final amount exactly, not the outstanding balance. Repeated
    /// settlement is an error, never a silent no-op. No stock moves here;
    /// stock already moved at creation time.
    pub async fn settle(
        &self,
        invoice_id: &str,
        amount_cents: i64,
        payment_type_code: &str,
    ) -> WorkflowResult<HydratedInvoice> {
        debug!(invoice_id = %invoice_id, amount = amount_cents, "Settling invoice");

        let mut tx = self.pool.begin().await?;

        let invoice = fetch_invoice(&mut tx, invoice_id)
            .await?
            .ok_or_else(|| CoreError::InvoiceNotFound(invoice_id.to_string()))?;

        if invoice.is_paid() {
            return Err(CoreError::AlreadyPaid(invoice_id.to_string()).into());
        }

        if amount_cents != invoice.final_cents {
            return Err(CoreError::SettlementAmountMismatch {
                expected: invoice.final_cents,
                offered: amount_cents,
            }
            .into());
        }

        let method_id: Option<(String, bool)> =
            sqlx::query_as("SELECT id, is_active FROM payment_methods WHERE code = ?1")
                .bind(payment_type_code)
                .fetch_optional(&mut *tx)
                .await?;
        let method_id = match method_id {
            Some((id, true)) => id,
            _ => {
                return Err(
                    CoreError::InvalidPaymentMethod(payment_type_code.to_string()).into(),
                )
            }
        };

        let now = Utc::now();

        sqlx::query(
            r#"
            UPDATE invoices SET
                payment_method_id = ?2,
                amount_paid_cents = final_cents,
                payment_status = 'paid',
                updated_at = ?3
            WHERE id = ?1
            "#,
        )
        .bind(invoice_id)
        .bind(&method_id)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        // Pay down the customer's tracked debt, floored at zero.
        if let Some(customer_id) = &invoice.customer_id {
            sqlx::query(
                r#"
                UPDATE customers SET
                    total_debt_cents = MAX(total_debt_cents - ?2, 0),
                    updated_at = ?3
                WHERE id = ?1
                "#,
            )
            .bind(customer_id)
            .bind(invoice.final_cents)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        info!(invoice_id = %invoice_id, amount = amount_cents, "Invoice settled");

        self.hydrate(invoice_id).await
    }

    // -------------------------------------------------------------------------
    // Update
    // -------------------------------------------------------------------------

    /// Updates notes and/or discount on an unpaid invoice.
    ///
    /// Line items, stock and customer aggregates are untouched. The final
    /// amount is recomputed from the new discount, but the paid/unpaid
    /// determination is NOT re-run and customer debt is NOT adjusted; this
    /// mirrors the shipped behavior and is documented as a known gap.
    pub async fn update(
        &self,
        invoice_id: &str,
        req: UpdateInvoiceRequest,
    ) -> WorkflowResult<HydratedInvoice> {
        debug!(invoice_id = %invoice_id, "Updating invoice");

        let mut tx = self.pool.begin().await?;

        let invoice = fetch_invoice(&mut tx, invoice_id)
            .await?
            .ok_or_else(|| CoreError::InvoiceNotFound(invoice_id.to_string()))?;

        if invoice.is_paid() {
            return Err(CoreError::CannotModifyPaidInvoice(invoice_id.to_string()).into());
        }

        let discount_cents = req.discount_cents.unwrap_or(invoice.discount_cents);
        validation::validate_non_negative("discount", discount_cents)
            .map_err(CoreError::from)?;

        let final_cents = invoice.total_cents - discount_cents;
        if final_cents < 0 {
            return Err(CoreError::Integrity(format!(
                "final amount is negative: total {} - discount {}",
                invoice.total_cents, discount_cents
            ))
            .into());
        }

        let notes = req.notes.or(invoice.notes);
        let now = Utc::now();

        sqlx::query(
            r#"
            UPDATE invoices SET
                notes = ?2,
                discount_cents = ?3,
                final_cents = ?4,
                updated_at = ?5
            WHERE id = ?1
            "#,
        )
        .bind(invoice_id)
        .bind(&notes)
        .bind(discount_cents)
        .bind(final_cents)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(invoice_id = %invoice_id, "Invoice updated");

        self.hydrate(invoice_id).await
    }

    // -------------------------------------------------------------------------
    // Delete
    // -------------------------------------------------------------------------

    /// Deletes an unpaid invoice, reversing its side effects: stock is
    /// restored per line and the customer's statistics are decremented by
    /// the exact amounts creation added.
    ///
    /// The reversal mirrors creation blindly; if the statistics were altered
    /// elsewhere this can drive them negative. Kept as-is (known weakness of
    /// the source system).
    pub async fn delete(&self, invoice_id: &str) -> WorkflowResult<()> {
        debug!(invoice_id = %invoice_id, "Deleting invoice");

        let mut tx = self.pool.begin().await?;

        let invoice = fetch_invoice(&mut tx, invoice_id)
            .await?
            .ok_or_else(|| CoreError::InvoiceNotFound(invoice_id.to_string()))?;

        if invoice.is_paid() {
            return Err(CoreError::CannotDeletePaidInvoice(invoice_id.to_string()).into());
        }

        let now = Utc::now();

        // Stock ledger restore: unconditional add-back per detail line.
        let details: Vec<(String, i64)> =
            sqlx::query_as("SELECT product_id, quantity FROM invoice_details WHERE invoice_id = ?1")
                .bind(invoice_id)
                .fetch_all(&mut *tx)
                .await?;

        for (product_id, quantity) in details {
            sqlx::query("UPDATE products SET stock = stock + ?2, updated_at = ?3 WHERE id = ?1")
                .bind(product_id)
                .bind(quantity)
                .bind(now)
                .execute(&mut *tx)
                .await?;
        }

        // Reverse the customer statistics creation added.
        if let Some(customer_id) = &invoice.customer_id {
            let debt_delta = invoice.final_cents - invoice.amount_paid_cents;

            sqlx::query(
                r#"
                UPDATE customers SET
                    total_purchase_cents = total_purchase_cents - ?2,
                    total_purchase_count = total_purchase_count - 1,
                    total_debt_cents = total_debt_cents - ?3,
                    updated_at = ?4
                WHERE id = ?1
                "#,
            )
            .bind(customer_id)
            .bind(invoice.final_cents)
            .bind(debt_delta)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query("DELETE FROM invoice_details WHERE invoice_id = ?1")
            .bind(invoice_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM invoices WHERE id = ?1")
            .bind(invoice_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(invoice_id = %invoice_id, "Invoice deleted");

        Ok(())
    }

    // -------------------------------------------------------------------------
    // Helpers
    // -------------------------------------------------------------------------

    async fn hydrate(&self, invoice_id: &str) -> WorkflowResult<HydratedInvoice> {
        InvoiceRepository::new(self.pool.clone())
            .get_hydrated(invoice_id)
            .await?
            .ok_or_else(|| CoreError::InvoiceNotFound(invoice_id.to_string()).into())
    }
}

// =============================================================================
// Transaction-scoped queries
// =============================================================================
// These take &mut SqliteConnection so they can only run inside the caller's
// transaction; no statement here can escape its scope.

async fn fetch_product(
    conn: &mut SqliteConnection,
    product_id: &str,
) -> Result<Option<Product>, sqlx::Error> {
    sqlx::query_as::<_, Product>(
        "SELECT id, code, name, price_cents, stock, min_stock, created_at, updated_at \
         FROM products WHERE id = ?1",
    )
    .bind(product_id)
    .fetch_optional(conn)
    .await
}

async fn fetch_invoice(
    conn: &mut SqliteConnection,
    invoice_id: &str,
) -> Result<Option<Invoice>, sqlx::Error> {
    sqlx::query_as::<_, Invoice>(
        "SELECT id, code, customer_id, employee_id, invoice_date, total_cents, discount_cents, \
         final_cents, amount_paid_cents, payment_method_id, payment_status, notes, created_at, \
         updated_at FROM invoices WHERE id = ?1",
    )
    .bind(invoice_id)
    .fetch_optional(conn)
    .await
}

async fn check_payment_method_active(
    conn: &mut SqliteConnection,
    method_id: &str,
) -> WorkflowResult<()> {
    let active: Option<bool> =
        sqlx::query_scalar("SELECT is_active FROM payment_methods WHERE id = ?1")
            .bind(method_id)
            .fetch_optional(conn)
            .await?;

    if active != Some(true) {
        return Err(CoreError::InvalidPaymentMethod(method_id.to_string()).into());
    }

    Ok(())
}

/// Guarded stock decrement. Zero rows affected means the stock no longer
/// covers the quantity; the remaining stock is re-read for the error detail.
async fn decrement_stock(
    conn: &mut SqliteConnection,
    product_id: &str,
    quantity: i64,
) -> WorkflowResult<()> {
    let result = sqlx::query(
        "UPDATE products SET stock = stock - ?2, updated_at = ?3 \
         WHERE id = ?1 AND stock >= ?2",
    )
    .bind(product_id)
    .bind(quantity)
    .bind(Utc::now())
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        let remaining = fetch_product(conn, product_id).await?;
        let (code, available) = match remaining {
            Some(p) => (p.code, p.stock),
            None => (product_id.to_string(), 0),
        };
        return Err(CoreError::InsufficientStock {
            code,
            available,
            requested: quantity,
        }
        .into());
    }

    Ok(())
}
