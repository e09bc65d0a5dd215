//! # Payment Method Repository
//!
//! The payment method registry: active/inactive named methods, referenced
//! by invoices and never mutated by the invoice workflow.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use shop_core::PaymentMethod;

const METHOD_COLUMNS: &str = "id, code, name, is_active, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct PaymentMethodRepository {
    pool: SqlitePool,
}

impl PaymentMethodRepository {
    pub fn new(pool: SqlitePool) -> Self {
        PaymentMethodRepository { pool }
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<PaymentMethod>> {
        let method = sqlx::query_as::<_, PaymentMethod>(&format!(
            "SELECT {METHOD_COLUMNS} FROM payment_methods WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(method)
    }

    /// Resolves a method by its wire code (e.g., "cash", "momo").
    pub async fn get_by_code(&self, code: &str) -> DbResult<Option<PaymentMethod>> {
        let method = sqlx::query_as::<_, PaymentMethod>(&format!(
            "SELECT {METHOD_COLUMNS} FROM payment_methods WHERE code = ?1"
        ))
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(method)
    }

    pub async fn list_active(&self) -> DbResult<Vec<PaymentMethod>> {
        let methods = sqlx::query_as::<_, PaymentMethod>(&format!(
            "SELECT {METHOD_COLUMNS} FROM payment_methods WHERE is_active = 1 ORDER BY name"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(methods)
    }

    pub async fn insert(&self, method: &PaymentMethod) -> DbResult<()> {
        debug!(code = %method.code, "Inserting payment method");

        sqlx::query(
            r#"
            INSERT INTO payment_methods (id, code, name, is_active, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&method.id)
        .bind(&method.code)
        .bind(&method.name)
        .bind(method.is_active)
        .bind(method.created_at)
        .bind(method.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
