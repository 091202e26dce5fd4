//! HTTP fetch configuration with sensible defaults.
//!
//! [`FetchConfig`] controls request timeouts and the User-Agent sent to the
//! status and render endpoints.

use crate::error::FragmentError;

/// Default per-request timeout in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 5_000;

/// Configuration for the HTTP client used to reach the preview server.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Per-request timeout in milliseconds. A request still in flight after
    /// this long is treated as failed.
    pub timeout_ms: u64,
    /// User-Agent header value.
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT_MS,
            user_agent: concat!("formpreview/", env!("CARGO_PKG_VERSION")).to_owned(),
        }
    }
}

impl FetchConfig {
    /// Validates this configuration.
    ///
    /// Checks:
    /// - `timeout_ms` must be greater than 0
    /// - `user_agent` must not be blank
    pub fn validate(&self) -> Result<(), FragmentError> {
        if self.timeout_ms == 0 {
            return Err(FragmentError::Config(
                "timeout_ms must be greater than 0".into(),
            ));
        }
        if self.user_agent.trim().is_empty() {
            return Err(FragmentError::Config("user_agent must not be empty".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_sensible_values() {
        let config = FetchConfig::default();
        assert_eq!(config.timeout_ms, 5_000);
        assert!(config.user_agent.starts_with("formpreview/"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_timeout_rejected() {
        let config = FetchConfig {
            timeout_ms: 0,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("timeout_ms"));
    }

    #[test]
    fn blank_user_agent_rejected() {
        let config = FetchConfig {
            user_agent: "   ".into(),
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("user_agent"));
    }
}
