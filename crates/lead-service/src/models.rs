//! Data models for the Lead Service

use chrono::{DateTime, Utc};
use quota_common::LeadSubmission;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Request metadata captured alongside a submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientMeta {
    pub ip: String,
    pub user_agent: String,
}

/// Persisted lead row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeadRecord {
    /// Generated row identifier
    pub id: Uuid,

    /// When the lead was accepted
    pub created_at: DateTime<Utc>,

    pub name: String,
    pub email: String,
    pub company: String,
    pub message: String,

    pub share_percent: f64,

    /// Rounded to whole hours before storage
    pub client_hours: i64,
    pub client_cost: f64,

    pub target: f64,
    pub weeks: f64,
    pub days_per_week: f64,
    pub hours_per_day: f64,

    pub user_agent: String,
    pub ip: String,
}

impl LeadRecord {
    /// Create a new record from a validated submission
    pub fn new(submission: LeadSubmission, meta: ClientMeta) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            name: submission.name,
            email: submission.email,
            company: submission.company,
            message: submission.message,
            share_percent: submission.share,
            client_hours: submission.client_hours.round() as i64,
            client_cost: submission.client_cost,
            target: submission.target,
            weeks: submission.weeks,
            days_per_week: submission.days_per_week,
            hours_per_day: submission.hours_per_day,
            user_agent: meta.user_agent,
            ip: meta.ip,
        }
    }
}

/// Result of delivering a lead on one channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationOutcome {
    /// Accepted by the provider, with its acknowledgment id
    Sent { id: String },

    /// Delivery attempted and failed
    Failed { reason: String },

    /// Channel not configured; nothing attempted
    Disabled,
}

impl NotificationOutcome {
    pub fn is_sent(&self) -> bool {
        matches!(self, NotificationOutcome::Sent { .. })
    }
}

#[derive(Serialize)]
struct OutcomeBody<'a> {
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<&'a str>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    disabled: bool,
}

impl Serialize for NotificationOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let body = match self {
            NotificationOutcome::Sent { id } => OutcomeBody {
                ok: true,
                id: Some(id.as_str()),
                reason: None,
                disabled: false,
            },
            NotificationOutcome::Failed { reason } => OutcomeBody {
                ok: false,
                id: None,
                reason: Some(reason.as_str()),
                disabled: false,
            },
            NotificationOutcome::Disabled => OutcomeBody {
                ok: false,
                id: None,
                reason: None,
                disabled: true,
            },
        };

        body.serialize(serializer)
    }
}

/// Body returned for an accepted lead
#[derive(Debug, Serialize)]
pub struct LeadResponse {
    /// Always true: the lead is stored
    pub ok: bool,

    /// One entry per channel, keyed by channel name
    #[serde(flatten)]
    pub channels: BTreeMap<&'static str, NotificationOutcome>,
}

impl LeadResponse {
    pub fn accepted(outcomes: Vec<(&'static str, NotificationOutcome)>) -> Self {
        Self {
            ok: true,
            channels: outcomes.into_iter().collect(),
        }
    }
}

/// Query for a capacity quote
#[derive(Debug, Deserialize)]
pub struct QuoteQuery {
    pub share: Option<f64>,
}

/// Capacity quote with the figures it was derived from
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteResponse {
    pub share: f64,
    pub client_hours: i64,
    pub client_cost: f64,
    pub total_hours: f64,
    pub implied_rate: f64,
    pub target: f64,
    pub weeks: f64,
    pub days_per_week: f64,
    pub hours_per_day: f64,
}
