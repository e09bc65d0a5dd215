//! # Product Repository
//!
//! Catalog CRUD and low-stock reporting. Stock itself is only ever written
//! by the invoice workflow engine (and purchase-order receipt, which lives
//! outside this service).

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use shop_core::Product;

const PRODUCT_COLUMNS: &str = "id, code, name, price_cents, stock, min_stock, created_at, updated_at";

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Gets a product by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Gets a product by its business code.
    pub async fn get_by_code(&self, code: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE code = ?1"
        ))
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Lists products ordered by name.
    pub async fn list(&self, limit: u32) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY name LIMIT ?1"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Lists products at or below their reorder threshold.
    pub async fn list_low_stock(&self) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE stock <= min_stock ORDER BY stock"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Inserts a new product.
    ///
    /// Returns `DbError::UniqueViolation` if the code already exists.
    pub async fn insert(&self, product: &Product) -> DbResult<()> {
        debug!(code = %product.code, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (id, code, name, price_cents, stock, min_stock, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&product.id)
        .bind(&product.code)
        .bind(&product.name)
        .bind(product.price_cents)
        .bind(product.stock)
        .bind(product.min_stock)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Updates catalog fields (name, price, reorder threshold).
    ///
    /// Deliberately does NOT touch `stock`; stock moves only inside invoice
    /// workflow transactions.
    pub async fn update(&self, product: &Product) -> DbResult<()> {
        debug!(id = %product.id, "Updating product");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE products SET
                code = ?2,
                name = ?3,
                price_cents = ?4,
                min_stock = ?5,
                updated_at = ?6
            WHERE id = ?1
            "#,
        )
        .bind(&product.id)
        .bind(&product.code)
        .bind(&product.name)
        .bind(product.price_cents)
        .bind(product.min_stock)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", &product.id));
        }

        Ok(())
    }

    /// Counts products (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
