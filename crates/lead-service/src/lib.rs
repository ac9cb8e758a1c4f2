//! Lead Service
//!
//! Receives capacity booking requests from the site, stores them, and
//! notifies the operator by email and Telegram.
//!
//! ## Endpoints
//!
//! - `POST /api/lead` - Submit a booking request
//! - `GET /api/quote?share=N` - Hours and cost for a share of capacity
//! - `GET /health` - Health check

pub mod client;
pub mod config;
pub mod handlers;
pub mod models;
pub mod normalizer;
pub mod notify;
pub mod storage;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use client::{Feedback, LeadClient};
pub use config::Config;
pub use handlers::AppState;
pub use models::{LeadRecord, LeadResponse, NotificationOutcome};
pub use notify::{FanOut, Notifier, NotifyError};
pub use storage::{LeadStore, MemoryLeadStore, RedisLeadStore, StoreError};

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    let shared_state = Arc::new(state);

    Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/api/lead", post(handlers::submit_lead_handler))
        .route("/api/quote", get(handlers::quote_handler))
        .with_state(shared_state)
        .layer(CatchPanicLayer::custom(handlers::panic_response))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
