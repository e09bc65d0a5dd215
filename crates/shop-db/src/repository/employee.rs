//! # Employee Repository
//!
//! Employee lookups; every invoice must reference an active employee.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use shop_core::Employee;

const EMPLOYEE_COLUMNS: &str = "id, code, name, is_active, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct EmployeeRepository {
    pool: SqlitePool,
}

impl EmployeeRepository {
    pub fn new(pool: SqlitePool) -> Self {
        EmployeeRepository { pool }
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Employee>> {
        let employee = sqlx::query_as::<_, Employee>(&format!(
            "SELECT {EMPLOYEE_COLUMNS} FROM employees WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(employee)
    }

    pub async fn list_active(&self) -> DbResult<Vec<Employee>> {
        let employees = sqlx::query_as::<_, Employee>(&format!(
            "SELECT {EMPLOYEE_COLUMNS} FROM employees WHERE is_active = 1 ORDER BY name"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(employees)
    }

    pub async fn insert(&self, employee: &Employee) -> DbResult<()> {
        debug!(code = %employee.code, "Inserting employee");

        sqlx::query(
            r#"
            INSERT INTO employees (id, code, name, is_active, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&employee.id)
        .bind(&employee.code)
        .bind(&employee.name)
        .bind(employee.is_active)
        .bind(employee.created_at)
        .bind(employee.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
