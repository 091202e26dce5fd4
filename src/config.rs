//! Configuration for the live preview.
//!
//! Everything the poller needs besides the page metadata lives here, loaded
//! from TOML with defaults for every missing field.

use crate::error::{PreviewError, Result};
use formpreview_fragment::{DEFAULT_CONTAINER_PREFIX, FetchConfig, MetadataSelectors};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use url::Url;

/// What to do after a refresh fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefreshRetry {
    /// Retry on every later tick whose status fetch succeeds, until a
    /// refresh goes through.
    #[default]
    NextTick,
    /// Wait until the server reports another version.
    NextVersionChange,
}

/// Selectors for the hidden inputs carrying page metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetadataConfig {
    /// Input holding the instance identifier.
    pub id_selector: String,
    /// Input holding the status endpoint URL.
    pub status_url_selector: String,
    /// Input holding the initial version marker.
    pub version_selector: String,
}

impl Default for MetadataConfig {
    fn default() -> Self {
        let defaults = MetadataSelectors::default();
        Self {
            id_selector: defaults.id,
            status_url_selector: defaults.status_url,
            version_selector: defaults.version,
        }
    }
}

/// Top-level preview configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    /// Milliseconds between status checks.
    pub poll_interval_ms: u64,
    /// Per-request timeout in milliseconds, for status and render requests.
    pub request_timeout_ms: u64,
    /// Container element id prefix; the instance id is appended.
    pub container_prefix: String,
    /// Policy for failed refreshes.
    pub refresh_retry: RefreshRetry,
    /// Base for relative URLs found in page metadata.
    pub base_url: Option<String>,
    /// User-Agent override.
    pub user_agent: Option<String>,
    /// Page metadata selectors.
    pub metadata: MetadataConfig,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 1_000,
            request_timeout_ms: formpreview_fragment::config::DEFAULT_TIMEOUT_MS,
            container_prefix: DEFAULT_CONTAINER_PREFIX.to_owned(),
            refresh_retry: RefreshRetry::default(),
            base_url: None,
            user_agent: None,
            metadata: MetadataConfig::default(),
        }
    }
}

impl PreviewConfig {
    /// Load configuration from a TOML file, falling back to defaults for missing fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| PreviewError::Config(e.to_string()))
    }

    /// Validates this configuration.
    ///
    /// Checks:
    /// - `poll_interval_ms` and `request_timeout_ms` must be greater than 0
    /// - `container_prefix` must be non-empty and free of whitespace
    /// - `base_url`, if set, must be an absolute http(s) URL
    /// - metadata selectors must not be empty
    pub fn validate(&self) -> Result<()> {
        if self.poll_interval_ms == 0 {
            return Err(PreviewError::Config(
                "poll_interval_ms must be greater than 0".into(),
            ));
        }
        if self.request_timeout_ms == 0 {
            return Err(PreviewError::Config(
                "request_timeout_ms must be greater than 0".into(),
            ));
        }
        if self.container_prefix.is_empty()
            || self
                .container_prefix
                .chars()
                .any(|c| c.is_whitespace() || c.is_control())
        {
            return Err(PreviewError::Config(
                "container_prefix must be non-empty and contain no whitespace".into(),
            ));
        }
        if let Some(base) = &self.base_url {
            if http_url(base).is_none() {
                return Err(PreviewError::Config(format!(
                    "base_url {base:?} is not an absolute http(s) URL"
                )));
            }
        }
        let selectors = [
            &self.metadata.id_selector,
            &self.metadata.status_url_selector,
            &self.metadata.version_selector,
        ];
        if selectors.iter().any(|s| s.trim().is_empty()) {
            return Err(PreviewError::Config(
                "metadata selectors must not be empty".into(),
            ));
        }
        Ok(())
    }

    /// Tick cadence.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// HTTP settings for the shared client.
    pub fn fetch_config(&self) -> FetchConfig {
        let mut fetch = FetchConfig {
            timeout_ms: self.request_timeout_ms,
            ..Default::default()
        };
        if let Some(ua) = &self.user_agent {
            fetch.user_agent.clone_from(ua);
        }
        fetch
    }

    /// Metadata selectors in the form the page reader takes.
    pub fn metadata_selectors(&self) -> MetadataSelectors {
        MetadataSelectors {
            id: self.metadata.id_selector.clone(),
            status_url: self.metadata.status_url_selector.clone(),
            version: self.metadata.version_selector.clone(),
        }
    }

    /// Resolve a URL from page metadata.
    ///
    /// Absolute http(s) URLs are used as-is; relative ones are joined onto
    /// `base_url`. Returns `None` when neither works.
    pub fn resolve_url(&self, raw: &str) -> Option<Url> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        match Url::parse(raw) {
            Ok(url) => is_http(&url).then_some(url),
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                let base = http_url(self.base_url.as_deref()?)?;
                base.join(raw).ok()
            }
            Err(_) => None,
        }
    }
}

fn http_url(raw: &str) -> Option<Url> {
    Url::parse(raw).ok().filter(is_http)
}

fn is_http(url: &Url) -> bool {
    matches!(url.scheme(), "http" | "https")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_sensible_values() {
        let config = PreviewConfig::default();
        assert_eq!(config.poll_interval_ms, 1_000);
        assert_eq!(config.request_timeout_ms, 5_000);
        assert_eq!(config.container_prefix, "preview-form-");
        assert_eq!(config.refresh_retry, RefreshRetry::NextTick);
        assert!(config.base_url.is_none());
        assert_eq!(config.metadata.id_selector, "#uiform-id");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_interval_rejected() {
        let config = PreviewConfig {
            poll_interval_ms: 0,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("poll_interval_ms"));
    }

    #[test]
    fn zero_timeout_rejected() {
        let config = PreviewConfig {
            request_timeout_ms: 0,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("request_timeout_ms"));
    }

    #[test]
    fn prefix_with_space_rejected() {
        let config = PreviewConfig {
            container_prefix: "preview form-".into(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn relative_base_url_rejected() {
        let config = PreviewConfig {
            base_url: Some("/forms/".into()),
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("base_url"));
    }

    #[test]
    fn empty_metadata_selector_rejected() {
        let mut config = PreviewConfig::default();
        config.metadata.version_selector = " ".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn resolve_absolute_url() {
        let config = PreviewConfig::default();
        let url = config.resolve_url("http://example.test/forms/3/status/").unwrap();
        assert_eq!(url.path(), "/forms/3/status/");
    }

    #[test]
    fn resolve_relative_url_needs_base() {
        let config = PreviewConfig::default();
        assert!(config.resolve_url("/forms/3/status/").is_none());

        let config = PreviewConfig {
            base_url: Some("http://example.test/app/".into()),
            ..Default::default()
        };
        let url = config.resolve_url("/forms/3/status/").unwrap();
        assert_eq!(url.as_str(), "http://example.test/forms/3/status/");
    }

    #[test]
    fn resolve_rejects_non_http_and_blank() {
        let config = PreviewConfig::default();
        assert!(config.resolve_url("mailto:someone@example.test").is_none());
        assert!(config.resolve_url("   ").is_none());
    }

    #[test]
    fn fetch_config_carries_timeout_and_user_agent() {
        let config = PreviewConfig {
            request_timeout_ms: 250,
            user_agent: Some("editor/2".into()),
            ..Default::default()
        };
        let fetch = config.fetch_config();
        assert_eq!(fetch.timeout_ms, 250);
        assert_eq!(fetch.user_agent, "editor/2");
    }

    #[test]
    fn toml_partial_fills_defaults() {
        let config: PreviewConfig = toml::from_str(
            r##"
            poll_interval_ms = 250
            refresh_retry = "next_version_change"

            [metadata]
            id_selector = "#form-id"
            "##,
        )
        .unwrap();
        assert_eq!(config.poll_interval_ms, 250);
        assert_eq!(config.refresh_retry, RefreshRetry::NextVersionChange);
        assert_eq!(config.metadata.id_selector, "#form-id");
        assert_eq!(config.metadata.status_url_selector, "#uiform-url");
        assert_eq!(config.request_timeout_ms, 5_000);
    }

    #[test]
    fn from_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preview.toml");
        std::fs::write(&path, "poll_interval_ms = 500\nbase_url = \"http://localhost:8000/\"\n")
            .unwrap();
        let config = PreviewConfig::from_file(&path).unwrap();
        assert_eq!(config.poll_interval(), Duration::from_millis(500));
        assert_eq!(config.base_url.as_deref(), Some("http://localhost:8000/"));
    }

    #[test]
    fn from_file_missing_is_io_error() {
        let err = PreviewConfig::from_file(Path::new("/nonexistent/preview.toml")).unwrap_err();
        assert!(matches!(err, PreviewError::Io(_)));
    }

    #[test]
    fn from_file_bad_toml_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "poll_interval_ms = \"soon\"").unwrap();
        let err = PreviewConfig::from_file(&path).unwrap_err();
        assert!(matches!(err, PreviewError::Config(_)));
    }
}
