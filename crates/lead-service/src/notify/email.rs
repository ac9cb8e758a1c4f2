//! Email channel over the Resend HTTP API

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{render, Notifier, NotifyError};
use crate::config::EmailConfig;
use crate::models::LeadRecord;

/// Outgoing email as accepted by the provider
#[derive(Debug, Serialize)]
pub struct EmailMessage {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub html: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SendResponse {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    message: String,
}

/// Sends lead notifications to the operator inbox
pub struct EmailNotifier {
    config: EmailConfig,
    campaign: String,
    client: reqwest::Client,
}

impl EmailNotifier {
    pub fn new(config: EmailConfig, campaign: String) -> Self {
        Self {
            config,
            campaign,
            client: reqwest::Client::new(),
        }
    }

    /// Build the message for a lead. The submitter becomes the reply-to.
    pub fn compose(&self, lead: &LeadRecord) -> EmailMessage {
        let reply_to = Some(lead.email.trim())
            .filter(|e| !e.is_empty())
            .map(str::to_string);

        EmailMessage {
            from: self.config.from.clone(),
            to: vec![self.config.to.clone()],
            subject: render::email_subject(lead, &self.campaign),
            html: render::email_html(lead, &self.campaign),
            reply_to,
        }
    }
}

#[async_trait]
impl Notifier for EmailNotifier {
    async fn send(&self, lead: &LeadRecord) -> Result<String, NotifyError> {
        let url = format!("{}/emails", self.config.api_url.trim_end_matches('/'));
        let message = self.compose(lead);

        debug!("Sending lead {} email via {}", lead.id, url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&message)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.message)
                .unwrap_or(body);
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let sent: SendResponse = response
            .json()
            .await
            .map_err(|e| NotifyError::InvalidResponse(e.without_url().to_string()))?;

        Ok(sent.id)
    }
}
