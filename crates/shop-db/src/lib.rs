//! # Shop Database Layer
//!
//! SQLite persistence for the shop backend, built on SQLx.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       shop-db                               │
//! │                                                             │
//! │  pool        - connection pool, WAL configuration           │
//! │  migrations  - embedded schema migrations                   │
//! │  repository  - per-entity read/write access                 │
//! │  workflow    - the transactional invoice engine             │
//! │  error       - DbError taxonomy                             │
//! │                                                             │
//! │  All writes that touch more than one table go through the   │
//! │  workflow engine; repositories never mutate aggregates.     │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod workflow;

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use repository::customer::CustomerRepository;
pub use repository::employee::EmployeeRepository;
pub use repository::invoice::{HydratedInvoice, HydratedLine, InvoiceRepository, InvoiceSummary};
pub use repository::payment_method::PaymentMethodRepository;
pub use repository::product::ProductRepository;
pub use workflow::{
    CreateInvoiceRequest, InvoiceWorkflow, UpdateInvoiceRequest, WorkflowError, WorkflowResult,
};
