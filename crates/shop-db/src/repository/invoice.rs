//! # Invoice Repository (read side)
//!
//! Read-only projections over the invoice aggregate: list, search,
//! by-status, by-customer, and full hydration (customer / employee /
//! payment-method / product names resolved onto the rows). No invariants
//! are enforced here beyond filtering; all writes go through the workflow
//! engine.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::SqlitePool;

use crate::error::DbResult;
use shop_core::{Invoice, PaymentStatus};

/// Joined SELECT shared by every projection query.
const HYDRATED_SELECT: &str = r#"
    SELECT
        i.id, i.code,
        i.customer_id, c.name AS customer_name,
        i.employee_id, e.name AS employee_name,
        i.invoice_date,
        i.total_cents, i.discount_cents, i.final_cents, i.amount_paid_cents,
        i.payment_method_id, pm.name AS payment_method_name,
        i.payment_status, i.notes,
        i.created_at, i.updated_at
    FROM invoices i
    LEFT JOIN customers c ON c.id = i.customer_id
    INNER JOIN employees e ON e.id = i.employee_id
    LEFT JOIN payment_methods pm ON pm.id = i.payment_method_id
"#;

const INVOICE_COLUMNS: &str = "id, code, customer_id, employee_id, invoice_date, total_cents, \
     discount_cents, final_cents, amount_paid_cents, payment_method_id, payment_status, notes, \
     created_at, updated_at";

// =============================================================================
// Projections
// =============================================================================

/// An invoice row with referenced names resolved, ready to render.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceSummary {
    pub id: String,
    pub code: String,
    pub customer_id: Option<String>,
    pub customer_name: Option<String>,
    pub employee_id: String,
    pub employee_name: String,
    pub invoice_date: DateTime<Utc>,
    pub total_cents: i64,
    pub discount_cents: i64,
    pub final_cents: i64,
    pub amount_paid_cents: i64,
    pub payment_method_id: Option<String>,
    pub payment_method_name: Option<String>,
    pub payment_status: PaymentStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A detail line with its product code and name resolved.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct HydratedLine {
    pub id: String,
    pub product_id: String,
    pub product_code: String,
    pub product_name: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
    pub line_total_cents: i64,
}

/// The full aggregate view: summary plus ordered detail lines.
/// This is what `POST /invoices` returns and what the PDF renderer consumes.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HydratedInvoice {
    #[serde(flatten)]
    pub summary: InvoiceSummary,
    pub lines: Vec<HydratedLine>,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for invoice read operations.
#[derive(Debug, Clone)]
pub struct InvoiceRepository {
    pool: SqlitePool,
}

impl InvoiceRepository {
    pub fn new(pool: SqlitePool) -> Self {
        InvoiceRepository { pool }
    }

    /// Gets a raw invoice row by ID (no hydration).
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Invoice>> {
        let invoice = sqlx::query_as::<_, Invoice>(&format!(
            "SELECT {INVOICE_COLUMNS} FROM invoices WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(invoice)
    }

    /// Gets a raw invoice row by business code.
    pub async fn get_by_code(&self, code: &str) -> DbResult<Option<Invoice>> {
        let invoice = sqlx::query_as::<_, Invoice>(&format!(
            "SELECT {INVOICE_COLUMNS} FROM invoices WHERE code = ?1"
        ))
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(invoice)
    }

    /// Gets the fully hydrated invoice (summary + detail lines).
    pub async fn get_hydrated(&self, id: &str) -> DbResult<Option<HydratedInvoice>> {
        let summary = sqlx::query_as::<_, InvoiceSummary>(&format!(
            "{HYDRATED_SELECT} WHERE i.id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(summary) = summary else {
            return Ok(None);
        };

        let lines = self.lines(id).await?;

        Ok(Some(HydratedInvoice { summary, lines }))
    }

    /// Detail lines in insertion order, with product names resolved.
    pub async fn lines(&self, invoice_id: &str) -> DbResult<Vec<HydratedLine>> {
        let lines = sqlx::query_as::<_, HydratedLine>(
            r#"
            SELECT
                d.id, d.product_id,
                p.code AS product_code, p.name AS product_name,
                d.quantity, d.unit_price_cents, d.line_total_cents
            FROM invoice_details d
            INNER JOIN products p ON p.id = d.product_id
            WHERE d.invoice_id = ?1
            ORDER BY d.rowid
            "#,
        )
        .bind(invoice_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(lines)
    }

    /// Lists invoices, newest first.
    pub async fn list(&self, limit: u32) -> DbResult<Vec<InvoiceSummary>> {
        let invoices = sqlx::query_as::<_, InvoiceSummary>(&format!(
            "{HYDRATED_SELECT} ORDER BY i.created_at DESC LIMIT ?1"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(invoices)
    }

    /// Searches by keyword over invoice code and customer name.
    pub async fn search(&self, keyword: &str, limit: u32) -> DbResult<Vec<InvoiceSummary>> {
        let pattern = format!("%{}%", keyword.trim());

        let invoices = sqlx::query_as::<_, InvoiceSummary>(&format!(
            "{HYDRATED_SELECT} WHERE i.code LIKE ?1 OR c.name LIKE ?1 \
             ORDER BY i.created_at DESC LIMIT ?2"
        ))
        .bind(&pattern)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(invoices)
    }

    /// Lists invoices in a given payment status, newest first.
    pub async fn list_by_status(
        &self,
        status: PaymentStatus,
        limit: u32,
    ) -> DbResult<Vec<InvoiceSummary>> {
        let invoices = sqlx::query_as::<_, InvoiceSummary>(&format!(
            "{HYDRATED_SELECT} WHERE i.payment_status = ?1 \
             ORDER BY i.created_at DESC LIMIT ?2"
        ))
        .bind(status.as_str())
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(invoices)
    }

    /// Lists a customer's invoices, newest first.
    pub async fn list_by_customer(
        &self,
        customer_id: &str,
        limit: u32,
    ) -> DbResult<Vec<InvoiceSummary>> {
        let invoices = sqlx::query_as::<_, InvoiceSummary>(&format!(
            "{HYDRATED_SELECT} WHERE i.customer_id = ?1 \
             ORDER BY i.created_at DESC LIMIT ?2"
        ))
        .bind(customer_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(invoices)
    }
}
