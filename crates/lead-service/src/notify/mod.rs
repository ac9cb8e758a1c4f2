//! Operator notification channels
//!
//! A lead is delivered on every configured channel. Channels run
//! independently: an error or panic in one becomes a `Failed` outcome for
//! that channel only.

pub mod email;
pub mod render;
pub mod telegram;

use async_trait::async_trait;
use futures::future::join_all;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::Config;
use crate::models::{LeadRecord, NotificationOutcome};

pub use email::EmailNotifier;
pub use telegram::TelegramNotifier;

/// Channel names as they appear in the response body
pub const EMAIL_CHANNEL: &str = "email";
pub const TELEGRAM_CHANNEL: &str = "telegram";

#[derive(Error, Debug)]
pub enum NotifyError {
    /// The wrapped error never carries the request URL, which may hold a
    /// provider credential
    #[error("Request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("Provider rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Unexpected provider response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for NotifyError {
    fn from(err: reqwest::Error) -> Self {
        NotifyError::Transport(err.without_url())
    }
}

/// A delivery channel for new leads
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver the lead; returns the provider's acknowledgment id
    async fn send(&self, lead: &LeadRecord) -> Result<String, NotifyError>;
}

struct Channel {
    name: &'static str,
    notifier: Option<Arc<dyn Notifier>>,
}

/// Delivers a lead to all channels and collects one outcome per channel
#[derive(Default)]
pub struct FanOut {
    channels: Vec<Channel>,
}

impl FanOut {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a channel; `None` registers it as disabled
    pub fn with_channel(mut self, name: &'static str, notifier: Option<Arc<dyn Notifier>>) -> Self {
        self.channels.push(Channel { name, notifier });
        self
    }

    /// Build the email and Telegram channels from configuration
    pub fn from_config(config: &Config) -> Self {
        let email = config.email.clone().map(|c| {
            Arc::new(EmailNotifier::new(c, config.campaign.clone())) as Arc<dyn Notifier>
        });
        let telegram = config
            .telegram
            .clone()
            .map(|c| Arc::new(TelegramNotifier::new(c)) as Arc<dyn Notifier>);

        Self::new()
            .with_channel(EMAIL_CHANNEL, email)
            .with_channel(TELEGRAM_CHANNEL, telegram)
    }

    /// Names of the registered channels
    pub fn channel_names(&self) -> Vec<&'static str> {
        self.channels.iter().map(|c| c.name).collect()
    }

    /// Deliver `lead` on every channel concurrently
    pub async fn dispatch(&self, lead: &LeadRecord) -> Vec<(&'static str, NotificationOutcome)> {
        let sends = self.channels.iter().map(|channel| async move {
            let outcome = match &channel.notifier {
                None => NotificationOutcome::Disabled,
                Some(notifier) => deliver(channel.name, notifier.as_ref(), lead).await,
            };
            (channel.name, outcome)
        });

        join_all(sends).await
    }
}

async fn deliver(name: &str, notifier: &dyn Notifier, lead: &LeadRecord) -> NotificationOutcome {
    match AssertUnwindSafe(notifier.send(lead)).catch_unwind().await {
        Ok(Ok(id)) => {
            debug!("Lead {} delivered via {}: {}", lead.id, name, id);
            NotificationOutcome::Sent { id }
        }
        Ok(Err(e)) => {
            warn!("Lead {} not delivered via {}: {}", lead.id, name, e);
            NotificationOutcome::Failed {
                reason: e.to_string(),
            }
        }
        Err(_) => {
            warn!("Lead {} not delivered via {}: channel panicked", lead.id, name);
            NotificationOutcome::Failed {
                reason: "channel panicked".to_string(),
            }
        }
    }
}
