//! REST API module.
//!
//! Successful responses are the bare JSON resource, matching what the
//! employee console expects. Failures go through `AppError`'s envelope.

mod employees;

pub use employees::*;

use axum::Json;

use crate::errors::AppError;

/// Response type that can be either success or error.
pub type ApiResult<T> = Result<Json<T>, AppError>;
