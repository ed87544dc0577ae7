//! Employee API endpoints.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};

use super::ApiResult;
use crate::errors::AppError;
use crate::models::{is_well_formed_email, Employee, EmployeeRequest};
use crate::AppState;

/// GET /api/employees - List all employees.
pub async fn list_employees(State(state): State<AppState>) -> ApiResult<Vec<Employee>> {
    let employees = state.repo.list_employees().await?;
    Ok(Json(employees))
}

/// GET /api/employees/:id - Get a single employee.
pub async fn get_employee(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Employee> {
    match state.repo.get_employee(&id).await? {
        Some(employee) => Ok(Json(employee)),
        None => Err(AppError::NotFound(format!("Employee {} not found", id))),
    }
}

/// POST /api/employees - Create a new employee.
pub async fn create_employee(
    State(state): State<AppState>,
    payload: Result<Json<EmployeeRequest>, JsonRejection>,
) -> ApiResult<Employee> {
    let Json(request) = payload?;
    let request = validate(request)?;

    let employee = state.repo.create_employee(&request).await?;
    tracing::info!("Employee {} created", employee.id);
    Ok(Json(employee))
}

/// PUT /api/employees/:id - Replace an employee.
pub async fn update_employee(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<EmployeeRequest>, JsonRejection>,
) -> ApiResult<Employee> {
    let Json(request) = payload?;
    let request = validate(request)?;

    let employee = state.repo.update_employee(&id, &request).await?;
    tracing::info!("Employee {} updated", employee.id);
    Ok(Json(employee))
}

/// DELETE /api/employees/:id - Delete an employee.
pub async fn delete_employee(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.repo.delete_employee(&id).await?;
    tracing::info!("Employee {} deleted", id);
    Ok(StatusCode::NO_CONTENT)
}

/// Trim every field and reject blanks and malformed email addresses.
fn validate(request: EmployeeRequest) -> Result<EmployeeRequest, AppError> {
    let request = EmployeeRequest {
        name: request.name.trim().to_string(),
        email: request.email.trim().to_string(),
        department: request.department.trim().to_string(),
    };

    if request.name.is_empty() {
        return Err(AppError::Validation("Name is required".to_string()));
    }
    if request.email.is_empty() {
        return Err(AppError::Validation("Email is required".to_string()));
    }
    if !is_well_formed_email(&request.email) {
        return Err(AppError::Validation(format!(
            "Email '{}' is not a valid address",
            request.email
        )));
    }
    if request.department.is_empty() {
        return Err(AppError::Validation("Department is required".to_string()));
    }

    Ok(request)
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tempfile::TempDir;
    use tower::ServiceExt;

    use crate::db::{init_database, Repository};
    use crate::create_router;

    async fn router() -> (axum::Router, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let pool = init_database(&temp_dir.path().join("api.sqlite"))
            .await
            .expect("Failed to init DB");
        let state = AppState {
            repo: Arc::new(Repository::new(pool)),
        };
        (create_router(state), temp_dir)
    }

    fn request(name: &str, email: &str, department: &str) -> EmployeeRequest {
        EmployeeRequest {
            name: name.to_string(),
            email: email.to_string(),
            department: department.to_string(),
        }
    }

    #[test]
    fn test_validate_trims_fields() {
        let validated = validate(request("  Ada ", " ada@example.com", "Eng  ")).unwrap();
        assert_eq!(validated.name, "Ada");
        assert_eq!(validated.email, "ada@example.com");
        assert_eq!(validated.department, "Eng");
    }

    #[test]
    fn test_validate_rejects_blank_fields() {
        assert!(matches!(
            validate(request("   ", "a@x.com", "Eng")),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            validate(request("A", "a@x.com", "")),
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_empty_list_is_bare_array() {
        let (app, _dir) = router().await;

        let resp = app
            .oneshot(
                Request::builder()
                    .uri("/api/employees")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        let body = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"[]");
    }

    #[tokio::test]
    async fn test_non_numeric_id_is_not_found() {
        let (app, _dir) = router().await;

        let resp = app
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri("/api/employees/abc")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
