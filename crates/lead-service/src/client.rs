//! Client for the lead endpoint, as used by the booking form

use quota_common::LeadSubmission;
use tracing::{debug, warn};

/// What the visitor is shown once a submission settles
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Feedback {
    /// The request was received
    Success,

    /// Anything else: the visitor is pointed at a manual contact address
    Failure { contact_email: String },
}

impl Feedback {
    pub fn is_success(&self) -> bool {
        matches!(self, Feedback::Success)
    }

    /// Toast text for the visitor
    pub fn message(&self) -> String {
        match self {
            Feedback::Success => "Request sent. You'll hear back soon.".to_string(),
            Feedback::Failure { contact_email } => {
                format!("Something went wrong. Please write to {}", contact_email)
            }
        }
    }
}

/// Client for submitting leads to the Lead Service
pub struct LeadClient {
    base_url: String,
    contact_email: String,
    client: reqwest::Client,
}

impl LeadClient {
    /// Create a new client; `contact_email` is the fallback shown on failure
    pub fn new(base_url: String, contact_email: String) -> Self {
        Self {
            base_url,
            contact_email,
            client: reqwest::Client::new(),
        }
    }

    /// Submit a lead.
    ///
    /// Any 2xx counts as success regardless of per-channel outcomes in the
    /// body. Non-2xx responses and transport errors are failures.
    pub async fn submit(&self, submission: &LeadSubmission) -> Feedback {
        let url = format!("{}/api/lead", self.base_url.trim_end_matches('/'));
        debug!("Submitting lead to {}", url);

        match self.client.post(&url).json(submission).send().await {
            Ok(response) if response.status().is_success() => Feedback::Success,
            Ok(response) => {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                warn!("Lead submission rejected ({}): {}", status, body);
                self.failure()
            }
            Err(e) => {
                warn!("Lead submission failed: {}", e);
                self.failure()
            }
        }
    }

    fn failure(&self) -> Feedback {
        Feedback::Failure {
            contact_email: self.contact_email.clone(),
        }
    }
}
