//! # shop-core: Pure Business Logic for the Shop Backend
//!
//! This crate is the heart of the shop backend. It contains the invoice
//! business rules as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                     Shop Backend Architecture                       │
//! │                                                                     │
//! │  ┌───────────────────────────────────────────────────────────────┐ │
//! │  │                Angular storefront / POS UI                    │ │
//! │  └─────────────────────────────┬─────────────────────────────────┘ │
//! │                                │ REST                              │
//! │  ┌─────────────────────────────▼─────────────────────────────────┐ │
//! │  │                    apps/api (axum)                            │ │
//! │  └─────────────────────────────┬─────────────────────────────────┘ │
//! │                                │                                   │
//! │  ┌─────────────────────────────▼─────────────────────────────────┐ │
//! │  │              ★ shop-core (THIS CRATE) ★                       │ │
//! │  │                                                               │ │
//! │  │   ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌────────────┐          │ │
//! │  │   │  types  │ │  money  │ │ invoice │ │ validation │          │ │
//! │  │   └─────────┘ └─────────┘ └─────────┘ └────────────┘          │ │
//! │  │                                                               │ │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS          │ │
//! │  └─────────────────────────────┬─────────────────────────────────┘ │
//! │                                │                                   │
//! │  ┌─────────────────────────────▼─────────────────────────────────┐ │
//! │  │            shop-db (SQLite, workflow engine)                  │ │
//! │  └───────────────────────────────────────────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Customer, Invoice, ...)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`invoice`] - Invoice totals and payment-status determination
//! - [`error`] - Business error taxonomy with reason codes
//! - [`validation`] - Input validation

pub mod error;
pub mod invoice;
pub mod money;
pub mod types;
pub mod validation;

pub use error::{CoreError, CoreResult, ValidationError};
pub use invoice::{
    compute_totals, determine_payment, ComputedLine, InvoiceTotals, LineRequest, PaymentOutcome,
};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum line items allowed on a single invoice.
///
/// Prevents runaway requests and keeps transactions reasonably sized.
pub const MAX_LINES_PER_INVOICE: usize = 100;

/// Maximum quantity of a single line item.
///
/// Prevents accidental over-ordering (typing 1000 instead of 10).
pub const MAX_LINE_QUANTITY: i64 = 999;

/// Maximum accepted amount, in cents, for any single money input
/// (unit price, discount, amount paid).
///
/// Keeps every computed total far below `i64::MAX`:
/// `MAX_AMOUNT_CENTS * MAX_LINE_QUANTITY * MAX_LINES_PER_INVOICE` still
/// fits with orders of magnitude to spare, so line and invoice arithmetic
/// cannot overflow.
pub const MAX_AMOUNT_CENTS: i64 = 1_000_000_000_000;
