//! Repository implementations.
//!
//! One repository per aggregate, all pool-based and read/CRUD only. The
//! single transactional write path (invoice create / settle / update /
//! delete) lives in [`crate::workflow`], not here: repositories never mutate
//! product stock or customer statistics.

pub mod customer;
pub mod employee;
pub mod invoice;
pub mod payment_method;
pub mod product;

use uuid::Uuid;

/// Generates a new entity ID (UUID v4 string).
pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}
