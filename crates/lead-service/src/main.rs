//! Lead Service
//!
//! REST API for capacity booking requests

use anyhow::{Context, Result};
use lead_service::{create_router, AppState, Config, FanOut, RedisLeadStore};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lead_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Lead Service");

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    info!("Redis URL: {}", config.redis_url);
    info!(
        "Capacity: {} weeks × {} days × {} h, target {}",
        config.capacity.weeks,
        config.capacity.days_per_week,
        config.capacity.hours_per_day,
        config.capacity.target
    );

    if config.email.is_none() {
        warn!("Email channel disabled (RESEND_API_KEY, RESEND_FROM_EMAIL or CONTACT_EMAIL missing)");
    }
    if config.telegram.is_none() {
        info!("Telegram channel disabled");
    }

    // Initialize storage
    let store = RedisLeadStore::new(&config.redis_url)
        .await
        .context("Failed to initialize storage")?;

    // Create application state
    let state = AppState {
        store: Arc::new(store),
        fan_out: FanOut::from_config(&config),
        capacity: config.capacity,
    };

    // Create router
    let app = create_router(state);

    // Bind and serve
    let addr = config.api_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("Lead Service running on http://{}", addr);

    axum::serve(listener, app)
        .await
        .context("Server error")?;

    Ok(())
}
