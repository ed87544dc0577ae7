//! Employee repository.
//!
//! Ids are SQLite rowids handed out in insertion order and exposed as strings.

use sqlx::{Row, SqlitePool};

use crate::errors::AppError;
use crate::models::{Employee, EmployeeRequest};

/// Database repository for employee records.
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// List all employees in creation order.
    pub async fn list_employees(&self) -> Result<Vec<Employee>, AppError> {
        let rows = sqlx::query("SELECT id, name, email, department FROM employees ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.iter().map(employee_from_row).collect())
    }

    /// Get an employee by ID.
    pub async fn get_employee(&self, id: &str) -> Result<Option<Employee>, AppError> {
        let Some(rowid) = parse_id(id) else {
            return Ok(None);
        };

        let row = sqlx::query("SELECT id, name, email, department FROM employees WHERE id = ?")
            .bind(rowid)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(employee_from_row))
    }

    /// Create a new employee and return it with its assigned id.
    pub async fn create_employee(&self, request: &EmployeeRequest) -> Result<Employee, AppError> {
        let result = sqlx::query("INSERT INTO employees (name, email, department) VALUES (?, ?, ?)")
            .bind(&request.name)
            .bind(&request.email)
            .bind(&request.department)
            .execute(&self.pool)
            .await?;

        let id = result.last_insert_rowid().to_string();
        tracing::debug!("Created employee {}", id);

        Ok(Employee {
            id,
            name: request.name.clone(),
            email: request.email.clone(),
            department: request.department.clone(),
        })
    }

    /// Replace all fields of an existing employee.
    pub async fn update_employee(
        &self,
        id: &str,
        request: &EmployeeRequest,
    ) -> Result<Employee, AppError> {
        let rowid = parse_id(id).ok_or_else(|| not_found(id))?;

        let result =
            sqlx::query("UPDATE employees SET name = ?, email = ?, department = ? WHERE id = ?")
                .bind(&request.name)
                .bind(&request.email)
                .bind(&request.department)
                .bind(rowid)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(not_found(id));
        }

        Ok(Employee {
            id: rowid.to_string(),
            name: request.name.clone(),
            email: request.email.clone(),
            department: request.department.clone(),
        })
    }

    /// Delete an employee.
    pub async fn delete_employee(&self, id: &str) -> Result<(), AppError> {
        let rowid = parse_id(id).ok_or_else(|| not_found(id))?;

        let result = sqlx::query("DELETE FROM employees WHERE id = ?")
            .bind(rowid)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(not_found(id));
        }

        tracing::debug!("Deleted employee {}", id);
        Ok(())
    }
}

fn employee_from_row(row: &sqlx::sqlite::SqliteRow) -> Employee {
    let id: i64 = row.get("id");
    Employee {
        id: id.to_string(),
        name: row.get("name"),
        email: row.get("email"),
        department: row.get("department"),
    }
}

// Anything that is not a rowid cannot name a stored employee.
fn parse_id(id: &str) -> Option<i64> {
    id.trim().parse().ok()
}

fn not_found(id: &str) -> AppError {
    AppError::NotFound(format!("Employee {} not found", id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_database;
    use tempfile::TempDir;

    async fn repository() -> (Repository, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let pool = init_database(&temp_dir.path().join("repo.sqlite"))
            .await
            .expect("Failed to init DB");
        (Repository::new(pool), temp_dir)
    }

    fn request(name: &str, email: &str, department: &str) -> EmployeeRequest {
        EmployeeRequest {
            name: name.to_string(),
            email: email.to_string(),
            department: department.to_string(),
        }
    }

    #[tokio::test]
    async fn test_ids_follow_insertion_order() {
        let (repo, _dir) = repository().await;

        let first = repo
            .create_employee(&request("A", "a@x.com", "Eng"))
            .await
            .unwrap();
        let second = repo
            .create_employee(&request("B", "b@x.com", "Ops"))
            .await
            .unwrap();

        assert_eq!(first.id, "1");
        assert_eq!(second.id, "2");

        let listed = repo.list_employees().await.unwrap();
        let ids: Vec<&str> = listed.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2"]);
    }

    #[tokio::test]
    async fn test_update_replaces_fields() {
        let (repo, _dir) = repository().await;
        let created = repo
            .create_employee(&request("A", "a@x.com", "Eng"))
            .await
            .unwrap();

        let updated = repo
            .update_employee(&created.id, &request("A", "a@x.com", "Sales"))
            .await
            .unwrap();
        assert_eq!(updated.department, "Sales");

        let fetched = repo.get_employee(&created.id).await.unwrap().unwrap();
        assert_eq!(fetched, updated);
    }

    #[tokio::test]
    async fn test_missing_and_malformed_ids_are_not_found() {
        let (repo, _dir) = repository().await;

        assert!(repo.get_employee("99").await.unwrap().is_none());
        assert!(repo.get_employee("abc").await.unwrap().is_none());
        assert!(matches!(
            repo.update_employee("99", &request("A", "a@x.com", "Eng"))
                .await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            repo.delete_employee("abc").await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_deleted_ids_are_not_reused() {
        let (repo, _dir) = repository().await;
        let first = repo
            .create_employee(&request("A", "a@x.com", "Eng"))
            .await
            .unwrap();
        repo.delete_employee(&first.id).await.unwrap();

        let next = repo
            .create_employee(&request("B", "b@x.com", "Eng"))
            .await
            .unwrap();
        assert_ne!(next.id, first.id);
    }
}
