//! # Domain Types
//!
//! Core domain types for the shop backend.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                │
//! │                                                                     │
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────────┐          │
//! │  │   Product    │  │   Customer   │  │     Invoice      │          │
//! │  │ ──────────── │  │ ──────────── │  │ ──────────────── │          │
//! │  │ id (UUID)    │  │ id (UUID)    │  │ id (UUID)        │          │
//! │  │ code (biz)   │  │ code (biz)   │  │ code (biz)       │          │
//! │  │ price_cents  │  │ total_debt   │  │ final_cents      │          │
//! │  │ stock        │  │ loyalty pts  │  │ payment_status   │          │
//! │  └──────────────┘  └──────────────┘  └───────┬──────────┘          │
//! │                                              │ owns                │
//! │  ┌──────────────┐  ┌──────────────┐  ┌───────▼──────────┐          │
//! │  │   Employee   │  │PaymentMethod │  │  InvoiceDetail   │          │
//! │  └──────────────┘  └──────────────┘  └──────────────────┘          │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every entity has:
//! - `id`: UUID v4 - immutable, used for database relations
//! - `code`: human-readable business identifier, unique per entity type
//!
//! ## No navigation references
//! Entities reference each other by id only; hydration (resolving customer,
//! employee and product names onto an invoice) happens at query time in the
//! repository layer. This keeps the object graph acyclic.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Product
// =============================================================================

/// A product in the catalog.
///
/// `stock` is mutated exclusively by the invoice workflow engine (decrement
/// on creation, restore on deletion). It is never written directly by a
/// caller, and never goes negative in a committed state.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Business identifier, unique (e.g., "SP001").
    pub code: String,

    /// Display name shown on the storefront and on invoices.
    pub name: String,

    /// Selling price in cents.
    pub price_cents: i64,

    /// Units on hand.
    pub stock: i64,

    /// Reorder threshold; `stock <= min_stock` flags the product as low.
    pub min_stock: i64,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Whether the product needs reordering.
    #[inline]
    pub fn is_low_stock(&self) -> bool {
        self.stock <= self.min_stock
    }
}

// =============================================================================
// Customer
// =============================================================================

/// A registered customer.
///
/// The four aggregate fields (`total_debt_cents`, `total_purchase_cents`,
/// `total_purchase_count`, `loyalty_points`) are derived solely from
/// committed invoices and are only ever written inside the invoice workflow
/// engine's create / settle / delete transactions.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Customer {
    pub id: String,

    /// Business identifier, unique (e.g., "KH001").
    pub code: String,

    pub name: String,

    pub phone: Option<String>,

    pub email: Option<String>,

    /// Outstanding debt from partially paid invoices.
    pub total_debt_cents: i64,

    /// Lifetime purchase amount across committed invoices.
    pub total_purchase_cents: i64,

    /// Number of committed invoices.
    pub total_purchase_count: i64,

    /// Accumulated loyalty points.
    pub loyalty_points: i64,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Customer {
    #[inline]
    pub fn total_debt(&self) -> Money {
        Money::from_cents(self.total_debt_cents)
    }
}

// =============================================================================
// Employee
// =============================================================================

/// An employee; every invoice records who rang it up.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Employee {
    pub id: String,
    pub code: String,
    pub name: String,
    /// Soft-delete flag; invoices may only reference active employees.
    pub is_active: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Payment Method
// =============================================================================

/// A named payment method (cash, bank transfer, e-wallet, ...).
/// Referenced by invoices, never mutated by the invoice workflow.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct PaymentMethod {
    pub id: String,
    pub code: String,
    pub name: String,
    pub is_active: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Payment Status
// =============================================================================

/// The settlement state of an invoice.
///
/// `Paid` holds if and only if `amount_paid >= final_amount`; once paid an
/// invoice is immutable and non-deletable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Unpaid,
    Paid,
}

impl PaymentStatus {
    /// Parses the wire representation used in routes and the database.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "unpaid" => Some(PaymentStatus::Unpaid),
            "paid" => Some(PaymentStatus::Paid),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Unpaid => "unpaid",
            PaymentStatus::Paid => "paid",
        }
    }
}

impl Default for PaymentStatus {
    fn default() -> Self {
        PaymentStatus::Unpaid
    }
}

// =============================================================================
// Invoice
// =============================================================================

/// The invoice aggregate root.
///
/// Created atomically with its detail lines and the matching stock
/// decrement. `customer_id` is `None` for walk-in sales, in which case no
/// customer statistics are touched anywhere in the lifecycle.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Invoice {
    pub id: String,
    /// Business identifier, unique (e.g., "HD0001").
    pub code: String,
    pub customer_id: Option<String>,
    pub employee_id: String,
    #[ts(as = "String")]
    pub invoice_date: DateTime<Utc>,
    /// Sum of detail line totals.
    pub total_cents: i64,
    pub discount_cents: i64,
    /// `total_cents - discount_cents`, never negative.
    pub final_cents: i64,
    pub amount_paid_cents: i64,
    pub payment_method_id: Option<String>,
    pub payment_status: PaymentStatus,
    pub notes: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Invoice {
    #[inline]
    pub fn final_amount(&self) -> Money {
        Money::from_cents(self.final_cents)
    }

    #[inline]
    pub fn amount_paid(&self) -> Money {
        Money::from_cents(self.amount_paid_cents)
    }

    /// Amount still owed on an unpaid invoice.
    #[inline]
    pub fn outstanding(&self) -> Money {
        self.final_amount().saturating_sub_floor(self.amount_paid())
    }

    #[inline]
    pub fn is_paid(&self) -> bool {
        self.payment_status == PaymentStatus::Paid
    }
}

// =============================================================================
// Invoice Detail
// =============================================================================

/// A line item on an invoice.
///
/// `unit_price_cents` is frozen at creation time so the invoice stays
/// faithful to what was charged even if the catalog price changes later.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct InvoiceDetail {
    pub id: String,
    pub invoice_id: String,
    pub product_id: String,
    /// Units sold; always positive.
    pub quantity: i64,
    /// Unit price at time of sale (frozen).
    pub unit_price_cents: i64,
    /// `quantity * unit_price_cents`.
    pub line_total_cents: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl InvoiceDetail {
    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.line_total_cents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn invoice(final_cents: i64, paid_cents: i64, status: PaymentStatus) -> Invoice {
        let now = Utc::now();
        Invoice {
            id: "inv-1".into(),
            code: "HD0001".into(),
            customer_id: None,
            employee_id: "emp-1".into(),
            invoice_date: now,
            total_cents: final_cents,
            discount_cents: 0,
            final_cents,
            amount_paid_cents: paid_cents,
            payment_method_id: None,
            payment_status: status,
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_outstanding_never_negative() {
        let inv = invoice(15_000, 20_000, PaymentStatus::Paid);
        assert_eq!(inv.outstanding(), Money::zero());

        let inv = invoice(15_000, 10_000, PaymentStatus::Unpaid);
        assert_eq!(inv.outstanding().cents(), 5_000);
    }

    #[test]
    fn test_payment_status_parse() {
        assert_eq!(PaymentStatus::parse("paid"), Some(PaymentStatus::Paid));
        assert_eq!(PaymentStatus::parse("unpaid"), Some(PaymentStatus::Unpaid));
        assert_eq!(PaymentStatus::parse("partial"), None);
        assert_eq!(PaymentStatus::Paid.as_str(), "paid");
    }

    #[test]
    fn test_low_stock_flag() {
        let now = Utc::now();
        let p = Product {
            id: "p1".into(),
            code: "SP001".into(),
            name: "Instant noodles".into(),
            price_cents: 500,
            stock: 3,
            min_stock: 5,
            created_at: now,
            updated_at: now,
        };
        assert!(p.is_low_stock());
    }
}
