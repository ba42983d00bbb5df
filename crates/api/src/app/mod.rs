//! HTTP API application wiring (Axum router + service wiring).
//!
//! This folder is structured like:
//! - `services.rs`: per-process state shared by handlers (store, list deadline)
//! - `routes/`: HTTP routes + handlers (one file per resource)
//! - `dto.rs`: request DTOs and their mapping to entities
//! - `errors.rs`: error taxonomy and consistent error responses

use std::sync::Arc;

use axum::{routing::get, Extension, Router};
use tower::ServiceBuilder;

use stockroom_infra::{AppConfig, StoreProvider};

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs` and tests).
pub fn build_app(store: Arc<dyn StoreProvider>, config: &AppConfig) -> Router {
    let services = Arc::new(services::AppServices::new(store, config.list_timeout));

    Router::new()
        .route("/health", get(routes::system::health))
        .nest(routes::API_BASE, routes::router())
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn(middleware::request_context))
                .layer(Extension(services)),
        )
}
