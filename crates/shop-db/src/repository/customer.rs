//! # Customer Repository
//!
//! Customer CRUD and lookups. The aggregate fields (debt, purchase amount,
//! purchase count, loyalty points) are read here but only ever written from
//! the invoice workflow engine.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use shop_core::Customer;

const CUSTOMER_COLUMNS: &str = "id, code, name, phone, email, total_debt_cents, \
     total_purchase_cents, total_purchase_count, loyalty_points, created_at, updated_at";

/// Repository for customer database operations.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

impl CustomerRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(customer)
    }

    pub async fn get_by_code(&self, code: &str) -> DbResult<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE code = ?1"
        ))
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(customer)
    }

    pub async fn list(&self, limit: u32) -> DbResult<Vec<Customer>> {
        let customers = sqlx::query_as::<_, Customer>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers ORDER BY name LIMIT ?1"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(customers)
    }

    pub async fn insert(&self, customer: &Customer) -> DbResult<()> {
        debug!(code = %customer.code, "Inserting customer");

        sqlx::query(
            r#"
            INSERT INTO customers (
                id, code, name, phone, email,
                total_debt_cents, total_purchase_cents, total_purchase_count, loyalty_points,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(&customer.id)
        .bind(&customer.code)
        .bind(&customer.name)
        .bind(&customer.phone)
        .bind(&customer.email)
        .bind(customer.total_debt_cents)
        .bind(customer.total_purchase_cents)
        .bind(customer.total_purchase_count)
        .bind(customer.loyalty_points)
        .bind(customer.created_at)
        .bind(customer.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Updates contact details only. The aggregate fields are off limits
    /// outside the workflow engine.
    pub async fn update_contact(
        &self,
        id: &str,
        name: &str,
        phone: Option<&str>,
        email: Option<&str>,
    ) -> DbResult<()> {
        let now = chrono::Utc::now();

        let result = sqlx::query(
            "UPDATE customers SET name = ?2, phone = ?3, email = ?4, updated_at = ?5 WHERE id = ?1",
        )
        .bind(id)
        .bind(name)
        .bind(phone)
        .bind(email)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", id));
        }

        Ok(())
    }
}
