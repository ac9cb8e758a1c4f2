//! Annual capacity parameters and the share → hours → cost quote.
//!
//! The parameters are fixed for a deployment and are not editable by
//! visitors. They are loaded once and passed around as an immutable value.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::form::LeadForm;
use crate::lead::LeadSubmission;

/// Smallest share of annual capacity a visitor can reserve (percent)
pub const MIN_SHARE: f64 = 1.0;

/// Largest share of annual capacity a visitor can reserve (percent)
pub const MAX_SHARE: f64 = 80.0;

/// Initial slider position (percent)
pub const DEFAULT_SHARE: f64 = 20.0;

pub const DEFAULT_TARGET: f64 = 80_000.0;
pub const DEFAULT_WEEKS: f64 = 46.0;
pub const DEFAULT_DAYS_PER_WEEK: f64 = 5.0;
pub const DEFAULT_HOURS_PER_DAY: f64 = 8.0;

/// Fixed annual capacity configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapacityConfig {
    /// Annual revenue target (EUR)
    pub target: f64,

    /// Working weeks per year
    pub weeks: f64,

    /// Working days per week
    pub days_per_week: f64,

    /// Billable hours per day
    pub hours_per_day: f64,
}

impl Default for CapacityConfig {
    fn default() -> Self {
        Self {
            target: DEFAULT_TARGET,
            weeks: DEFAULT_WEEKS,
            days_per_week: DEFAULT_DAYS_PER_WEEK,
            hours_per_day: DEFAULT_HOURS_PER_DAY,
        }
    }
}

/// Derived figures for one share of capacity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub share: f64,
    pub client_hours: i64,
    pub client_cost: f64,
}

impl CapacityConfig {
    /// Build a config from raw (possibly missing) values.
    ///
    /// Each value that is missing, not a number, not finite or not positive
    /// falls back to its default.
    pub fn from_raw(
        target: Option<&str>,
        weeks: Option<&str>,
        days_per_week: Option<&str>,
        hours_per_day: Option<&str>,
    ) -> Self {
        Self {
            target: positive_or(target, DEFAULT_TARGET),
            weeks: positive_or(weeks, DEFAULT_WEEKS),
            days_per_week: positive_or(days_per_week, DEFAULT_DAYS_PER_WEEK),
            hours_per_day: positive_or(hours_per_day, DEFAULT_HOURS_PER_DAY),
        }
    }

    /// Total billable hours in a year
    pub fn total_hours(&self) -> f64 {
        self.weeks.max(0.0) * self.days_per_week.max(0.0) * self.hours_per_day.max(0.0)
    }

    /// Hourly rate implied by the revenue target
    pub fn implied_rate(&self) -> f64 {
        let total = self.total_hours();
        if total > 0.0 {
            self.target / total
        } else {
            0.0
        }
    }

    /// Quote a share of annual capacity.
    ///
    /// Rejects shares outside `MIN_SHARE..=MAX_SHARE`.
    pub fn quote(&self, share: f64) -> Result<Quote> {
        if !share.is_finite() || !(MIN_SHARE..=MAX_SHARE).contains(&share) {
            return Err(Error::ShareOutOfRange(share));
        }

        Ok(Quote {
            share,
            client_hours: (self.total_hours() * share / 100.0).round() as i64,
            client_cost: self.target * share / 100.0,
        })
    }

    /// Assemble the payload the booking form sends for `share`
    pub fn submission(&self, form: &LeadForm, share: f64) -> Result<LeadSubmission> {
        let quote = self.quote(share)?;

        Ok(LeadSubmission {
            name: form.name.clone(),
            email: form.email.clone(),
            company: form.company.clone(),
            message: form.message.clone(),
            share: quote.share,
            client_hours: quote.client_hours as f64,
            client_cost: quote.client_cost,
            target: self.target,
            weeks: self.weeks,
            days_per_week: self.days_per_week,
            hours_per_day: self.hours_per_day,
        })
    }
}

fn positive_or(raw: Option<&str>, fallback: f64) -> f64 {
    raw.and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|n| n.is_finite() && *n > 0.0)
        .unwrap_or(fallback)
}
