//! Configuration management for the Lead Service
//!
//! Loads configuration from environment variables with sensible defaults.
//! Notification channels are optional: a channel whose settings are missing
//! is disabled rather than rejected.

use anyhow::{Context, Result};
use quota_common::CapacityConfig;
use std::env;

pub const DEFAULT_RESEND_API_URL: &str = "https://api.resend.com";
pub const DEFAULT_TELEGRAM_API_URL: &str = "https://api.telegram.org";

/// Email channel settings
#[derive(Debug, Clone)]
pub struct EmailConfig {
    /// Provider API key
    pub api_key: String,

    /// Sender address
    pub from: String,

    /// Operator inbox
    pub to: String,

    /// Provider base URL
    pub api_url: String,
}

/// Telegram channel settings
#[derive(Debug, Clone)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub chat_id: String,
    pub api_url: String,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// API server host
    pub api_host: String,

    /// API server port
    pub api_port: u16,

    /// Redis connection URL
    pub redis_url: String,

    /// Address shown to visitors when a submission fails
    pub contact_email: Option<String>,

    /// Label used in notification subjects
    pub campaign: String,

    /// Fixed annual capacity parameters
    pub capacity: CapacityConfig,

    /// Email channel, if configured
    pub email: Option<EmailConfig>,

    /// Telegram channel, if configured
    pub telegram: Option<TelegramConfig>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if it exists (for local development)
        dotenvy::dotenv().ok();

        let contact_email = non_empty("CONTACT_EMAIL");

        let email = match (
            non_empty("RESEND_API_KEY"),
            non_empty("RESEND_FROM_EMAIL"),
            contact_email.clone(),
        ) {
            (Some(api_key), Some(from), Some(to)) => Some(EmailConfig {
                api_key,
                from,
                to,
                api_url: non_empty("RESEND_API_URL")
                    .unwrap_or_else(|| DEFAULT_RESEND_API_URL.to_string()),
            }),
            _ => None,
        };

        let telegram = match (non_empty("TELEGRAM_BOT_TOKEN"), non_empty("TELEGRAM_CHAT_ID")) {
            (Some(bot_token), Some(chat_id)) => Some(TelegramConfig {
                bot_token,
                chat_id,
                api_url: non_empty("TELEGRAM_API_URL")
                    .unwrap_or_else(|| DEFAULT_TELEGRAM_API_URL.to_string()),
            }),
            _ => None,
        };

        let config = Config {
            api_host: env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),

            api_port: env::var("API_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("Invalid API_PORT")?,

            redis_url: env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string()),

            contact_email,

            campaign: env::var("LEAD_CAMPAIGN").unwrap_or_else(|_| "2026".to_string()),

            capacity: CapacityConfig::from_raw(
                env::var("CAPACITY_TARGET").ok().as_deref(),
                env::var("CAPACITY_WEEKS").ok().as_deref(),
                env::var("CAPACITY_DAYS_PER_WEEK").ok().as_deref(),
                env::var("CAPACITY_HOURS_PER_DAY").ok().as_deref(),
            ),

            email,
            telegram,
        };

        // Validate configuration
        config.validate()?;

        Ok(config)
    }

    /// Validate configuration
    fn validate(&self) -> Result<()> {
        if self.api_port == 0 {
            anyhow::bail!("API_PORT must be greater than 0");
        }

        Ok(())
    }

    /// Get the API server address
    pub fn api_address(&self) -> String {
        format!("{}:{}", self.api_host, self.api_port)
    }
}

fn non_empty(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const KEYS: &[&str] = &[
        "API_HOST",
        "API_PORT",
        "REDIS_URL",
        "CONTACT_EMAIL",
        "LEAD_CAMPAIGN",
        "RESEND_API_KEY",
        "RESEND_FROM_EMAIL",
        "RESEND_API_URL",
        "TELEGRAM_BOT_TOKEN",
        "TELEGRAM_CHAT_ID",
        "TELEGRAM_API_URL",
        "CAPACITY_TARGET",
        "CAPACITY_WEEKS",
        "CAPACITY_DAYS_PER_WEEK",
        "CAPACITY_HOURS_PER_DAY",
    ];

    fn clear_env() {
        for key in KEYS {
            env::remove_var(key);
        }
    }

    #[test]
    #[serial]
    fn test_config_defaults() {
        clear_env();

        let config = Config::from_env().expect("Failed to load config");

        assert_eq!(config.api_host, "0.0.0.0");
        assert_eq!(config.api_port, 8080);
        assert_eq!(config.redis_url, "redis://127.0.0.1:6379");
        assert_eq!(config.campaign, "2026");
        assert_eq!(config.capacity, CapacityConfig::default());
        assert!(config.email.is_none());
        assert!(config.telegram.is_none());
    }

    #[test]
    #[serial]
    fn test_channels_enabled() {
        clear_env();
        env::set_var("CONTACT_EMAIL", "owner@example.com");
        env::set_var("RESEND_API_KEY", "re_test");
        env::set_var("RESEND_FROM_EMAIL", "site@example.com");
        env::set_var("TELEGRAM_BOT_TOKEN", "123:abc");
        env::set_var("TELEGRAM_CHAT_ID", "42");
        env::set_var("CAPACITY_TARGET", "100000");

        let config = Config::from_env().unwrap();

        let email = config.email.expect("email channel");
        assert_eq!(email.to, "owner@example.com");
        assert_eq!(email.api_url, DEFAULT_RESEND_API_URL);

        let telegram = config.telegram.expect("telegram channel");
        assert_eq!(telegram.chat_id, "42");
        assert_eq!(telegram.api_url, DEFAULT_TELEGRAM_API_URL);

        assert_eq!(config.capacity.target, 100_000.0);

        clear_env();
    }

    #[test]
    #[serial]
    fn test_email_needs_recipient() {
        clear_env();
        env::set_var("RESEND_API_KEY", "re_test");
        env::set_var("RESEND_FROM_EMAIL", "site@example.com");
        env::set_var("CONTACT_EMAIL", "   ");

        let config = Config::from_env().unwrap();
        assert!(config.email.is_none());
        assert!(config.contact_email.is_none());

        clear_env();
    }

    #[test]
    fn test_api_address() {
        let config = Config {
            api_host: "127.0.0.1".to_string(),
            api_port: 9000,
            redis_url: "redis://localhost".to_string(),
            contact_email: None,
            campaign: "2026".to_string(),
            capacity: CapacityConfig::default(),
            email: None,
            telegram: None,
        };

        assert_eq!(config.api_address(), "127.0.0.1:9000");
    }

    #[test]
    #[serial]
    fn test_invalid_port() {
        clear_env();
        env::set_var("API_PORT", "0");

        let result = Config::from_env();
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("API_PORT must be greater than 0"));

        env::set_var("API_PORT", "not-a-port");
        assert!(Config::from_env().is_err());

        clear_env();
    }
}
