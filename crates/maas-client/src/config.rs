//! Client configuration types.
//!
//! This module defines the connection settings for a MAAS region controller
//! and the backoff policy used while waiting for machine status changes.

use std::time::Duration;

use serde::Deserialize;

use crate::error::{ClientError, Result};

/// Configuration for a MAAS client.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the MAAS API (e.g., `http://maas:5240/MAAS/api/2.0`).
    pub base_url: String,

    /// API key in `consumer_key:token_key:token_secret` form.
    pub api_key: String,

    /// Per-request timeout in seconds.
    #[serde(default = "ClientConfig::default_request_timeout")]
    pub request_timeout_seconds: u64,

    /// Connection timeout in seconds.
    #[serde(default = "ClientConfig::default_connect_timeout")]
    pub connect_timeout_seconds: u64,

    /// Backoff policy for status polling.
    #[serde(default)]
    pub poll: PollConfig,
}

impl ClientConfig {
    const fn default_request_timeout() -> u64 {
        30
    }

    const fn default_connect_timeout() -> u64 {
        5
    }

    /// Create a configuration with default timeouts and polling policy.
    #[must_use]
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            request_timeout_seconds: Self::default_request_timeout(),
            connect_timeout_seconds: Self::default_connect_timeout(),
            poll: PollConfig::default(),
        }
    }

    /// Load configuration from the environment.
    ///
    /// Reads `MAAS_URL` and `MAAS_API_KEY` (required) and
    /// `MAAS_REQUEST_TIMEOUT_SECONDS` (optional).
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Config` if a required variable is missing or a
    /// value cannot be parsed.
    pub fn from_env() -> Result<Self> {
        let base_url = required_env("MAAS_URL")?;
        let api_key = required_env("MAAS_API_KEY")?;
        let mut config = Self::new(base_url, api_key);

        if let Ok(value) = std::env::var("MAAS_REQUEST_TIMEOUT_SECONDS") {
            config.request_timeout_seconds = value.parse().map_err(|_| {
                ClientError::Config(format!(
                    "MAAS_REQUEST_TIMEOUT_SECONDS is not a number: {value}"
                ))
            })?;
        }

        Ok(config)
    }

    /// Get the request timeout as a `Duration`.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    /// Get the connection timeout as a `Duration`.
    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_seconds)
    }
}

fn required_env(name: &str) -> Result<String> {
    std::env::var(name).map_err(|_| ClientError::Config(format!("{name} is not set")))
}

/// Backoff policy for waiting on machine status.
///
/// Delays start at `initial_backoff_seconds` and are multiplied by
/// `backoff_multiplier` after every sleep, capped at `max_backoff_seconds`.
/// The defaults give 3, 6, 10, 10, ... seconds.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PollConfig {
    /// First delay between status checks, in seconds.
    #[serde(default = "PollConfig::default_initial_backoff")]
    pub initial_backoff_seconds: u64,

    /// Upper bound on the delay, in seconds.
    #[serde(default = "PollConfig::default_max_backoff")]
    pub max_backoff_seconds: u64,

    /// Factor applied to the delay after each sleep.
    #[serde(default = "PollConfig::default_multiplier")]
    pub backoff_multiplier: u32,
}

impl PollConfig {
    const fn default_initial_backoff() -> u64 {
        3
    }

    const fn default_max_backoff() -> u64 {
        10
    }

    const fn default_multiplier() -> u32 {
        2
    }

    /// Check that the policy backs off at all and respects its own cap.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Config` for a zero multiplier, a zero initial
    /// backoff, or an initial backoff above the maximum.
    pub fn validate(&self) -> Result<()> {
        if self.backoff_multiplier == 0 {
            return Err(ClientError::Config(
                "backoff_multiplier must be at least 1".into(),
            ));
        }
        if self.initial_backoff_seconds == 0 {
            return Err(ClientError::Config(
                "initial_backoff_seconds must be at least 1".into(),
            ));
        }
        if self.initial_backoff_seconds > self.max_backoff_seconds {
            return Err(ClientError::Config(format!(
                "initial_backoff_seconds ({}) exceeds max_backoff_seconds ({})",
                self.initial_backoff_seconds, self.max_backoff_seconds
            )));
        }
        Ok(())
    }

    /// Get the initial backoff as a `Duration`.
    #[must_use]
    pub fn initial_backoff(&self) -> Duration {
        Duration::from_secs(self.initial_backoff_seconds)
    }

    /// Get the maximum backoff as a `Duration`.
    #[must_use]
    pub fn max_backoff(&self) -> Duration {
        Duration::from_secs(self.max_backoff_seconds)
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            initial_backoff_seconds: Self::default_initial_backoff(),
            max_backoff_seconds: Self::default_max_backoff(),
            backoff_multiplier: Self::default_multiplier(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = ClientConfig::new("http://maas:5240/MAAS/api/2.0", "a:b:c");
        assert_eq!(config.request_timeout_seconds, 30);
        assert_eq!(config.connect_timeout_seconds, 5);
        assert_eq!(config.poll, PollConfig::default());
    }

    #[test]
    fn timeout_duration() {
        let config = ClientConfig::new("http://maas", "a:b:c");
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.connect_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn default_poll_policy() {
        let poll = PollConfig::default();
        assert_eq!(poll.initial_backoff(), Duration::from_secs(3));
        assert_eq!(poll.max_backoff(), Duration::from_secs(10));
        assert_eq!(poll.backoff_multiplier, 2);
    }

    #[test]
    fn deserialize_fills_defaults() {
        let config: ClientConfig = serde_json::from_str(
            r#"{"base_url": "http://maas", "api_key": "a:b:c", "poll": {"max_backoff_seconds": 30}}"#,
        )
        .unwrap();
        assert_eq!(config.request_timeout_seconds, 30);
        assert_eq!(config.poll.initial_backoff_seconds, 3);
        assert_eq!(config.poll.max_backoff_seconds, 30);
    }

    #[test]
    fn default_poll_policy_is_valid() {
        assert!(PollConfig::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_degenerate_poll_policies() {
        let zero_multiplier: PollConfig =
            serde_json::from_str(r#"{"backoff_multiplier": 0}"#).unwrap();
        let zero_initial: PollConfig =
            serde_json::from_str(r#"{"initial_backoff_seconds": 0}"#).unwrap();
        let above_cap: PollConfig =
            serde_json::from_str(r#"{"initial_backoff_seconds": 20, "max_backoff_seconds": 10}"#)
                .unwrap();

        for poll in [zero_multiplier, zero_initial, above_cap] {
            let err = poll.validate().unwrap_err();
            assert!(matches!(err, ClientError::Config(_)), "{poll:?} should be rejected");
        }
    }
}
