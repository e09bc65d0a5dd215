//! HTTP API server for the shop management backend.
//!
//! Thin layer over shop-db: handlers translate wire requests into workflow
//! and repository calls, and business errors into stable-coded JSON error
//! responses. No business rule lives here.

pub mod collaborators;
pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::routing::{delete, get, post, put};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use shop_db::Database;

use collaborators::{InvoicePrinter, LocalPaymentGateway, PaymentGateway, PlainTextPrinter};
use routes::invoices::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(routes::health::check))
        .route("/invoices", post(routes::invoices::create))
        .route("/invoices", get(routes::invoices::list))
        .route("/invoices/search", get(routes::invoices::search))
        .route("/invoices/by-status/{status}", get(routes::invoices::by_status))
        .route(
            "/invoices/by-customer/{id}",
            get(routes::invoices::by_customer),
        )
        .route("/invoices/{id}", get(routes::invoices::get))
        .route("/invoices/{id}", put(routes::invoices::update))
        .route("/invoices/{id}", delete(routes::invoices::delete))
        .route("/invoices/{id}/payment", post(routes::invoices::settle))
        .route(
            "/invoices/{id}/payment-link",
            post(routes::invoices::payment_link),
        )
        .route("/invoices/{id}/print", get(routes::invoices::print))
        .route("/payments/callback", post(routes::payments::callback))
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates application state with the local collaborator stubs.
pub fn create_default_state(db: Database) -> Arc<AppState> {
    Arc::new(AppState {
        db,
        gateway: Arc::new(LocalPaymentGateway) as Arc<dyn PaymentGateway>,
        printer: Arc::new(PlainTextPrinter) as Arc<dyn InvoicePrinter>,
    })
}
