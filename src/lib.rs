//! Employee Manager
//!
//! A terminal employee-records page that keeps its table in sync with a REST
//! collection by re-fetching after every write, plus a SQLite-backed reference
//! implementation of that collection.

pub mod api;
pub mod client;
pub mod config;
pub mod console;
pub mod controller;
pub mod db;
pub mod errors;
pub mod models;
pub mod view;

use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use db::Repository;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // The page may be served from any origin
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route(
            "/employees",
            get(api::list_employees).post(api::create_employee),
        )
        .route(
            "/employees/{id}",
            get(api::get_employee)
                .put(api::update_employee)
                .delete(api::delete_employee),
        );

    Router::new()
        .nest("/api", api_routes)
        .route("/health", get(health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}
