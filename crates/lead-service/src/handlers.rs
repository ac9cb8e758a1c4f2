//! API request handlers for the Lead Service

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use quota_common::{capacity::DEFAULT_SHARE, CapacityConfig, Error as DomainError, LeadSubmission};
use std::any::Any;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::{
    models::{LeadRecord, LeadResponse, NotificationOutcome, QuoteQuery, QuoteResponse},
    normalizer,
    notify::FanOut,
    storage::LeadStore,
};

/// Error code returned when the lead could not be stored
pub const DB_INSERT_FAILED: &str = "DB_INSERT_FAILED";

/// Error code returned for anything not otherwise classified
pub const UNEXPECTED: &str = "UNEXPECTED";

/// Shared application state
pub struct AppState {
    pub store: Arc<dyn LeadStore>,
    pub fan_out: FanOut,
    pub capacity: CapacityConfig,
}

/// API Error type
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn internal(code: &str) -> Self {
        ApiError {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: code.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "error": self.message
        });

        (self.status, Json(body)).into_response()
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::InvalidSubmission(violations) => match violations.first() {
                Some(first) => ApiError::bad_request(first.to_string()),
                None => ApiError::bad_request("Invalid submission"),
            },
            DomainError::ShareOutOfRange(_) => ApiError::bad_request(err.to_string()),
            DomainError::JsonSerialization(e) => {
                error!("Unreadable request body: {}", e);
                ApiError::internal(UNEXPECTED)
            }
        }
    }
}

/// Health check endpoint
pub async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "lead-service"
    }))
}

/// Accept a booking request.
///
/// The lead is validated, stored, then sent to every notification channel.
/// Once stored the request succeeds; channel failures only show up in the
/// per-channel breakdown.
pub async fn submit_lead_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<LeadResponse>, ApiError> {
    let meta = normalizer::client_meta(&headers);
    let submission = LeadSubmission::parse_json(&body)?;

    let record = LeadRecord::new(submission, meta);

    if let Err(e) = state.store.insert(&record).await {
        error!("Lead insert failed: {}", e);
        return Err(ApiError::internal(DB_INSERT_FAILED));
    }

    info!(
        "Stored lead {} (share {}%, ip {})",
        record.id, record.share_percent, record.ip
    );

    let outcomes = state.fan_out.dispatch(&record).await;
    for (channel, outcome) in &outcomes {
        if let NotificationOutcome::Failed { reason } = outcome {
            warn!("Lead {} channel {} failed: {}", record.id, channel, reason);
        }
    }
    let delivered = outcomes.iter().filter(|(_, o)| o.is_sent()).count();
    info!("Lead {} delivered on {}/{} channels", record.id, delivered, outcomes.len());

    Ok(Json(LeadResponse::accepted(outcomes)))
}

/// Quote a share of annual capacity
pub async fn quote_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<QuoteQuery>,
) -> Result<Json<QuoteResponse>, ApiError> {
    let capacity = &state.capacity;
    let quote = capacity.quote(query.share.unwrap_or(DEFAULT_SHARE))?;

    Ok(Json(QuoteResponse {
        share: quote.share,
        client_hours: quote.client_hours,
        client_cost: quote.client_cost,
        total_hours: capacity.total_hours(),
        implied_rate: capacity.implied_rate(),
        target: capacity.target,
        weeks: capacity.weeks,
        days_per_week: capacity.days_per_week,
        hours_per_day: capacity.hours_per_day,
    }))
}

/// Turn a handler panic into the generic error body
pub fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    error!("Handler panicked: {}", detail);

    ApiError::internal(UNEXPECTED).into_response()
}
