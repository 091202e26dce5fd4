//! The previewed resource: which instance, where its status lives, and the
//! version the page was rendered at.

use crate::config::PreviewConfig;
use crate::error::{PreviewError, Result};
use crate::version::VersionMarker;
use formpreview_fragment::PageMetadata;
use std::fmt;
use url::Url;

/// Identifier of the previewed resource on the page.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InstanceId(String);

impl InstanceId {
    /// Accept a non-blank identifier without control characters.
    ///
    /// Returns `None` otherwise; a blank id on the page counts as absent.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.chars().any(char::is_control) {
            return None;
        }
        Some(Self(trimmed.to_owned()))
    }

    /// The identifier text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Validated preview parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewTarget {
    /// The previewed instance.
    pub instance_id: InstanceId,
    /// Absolute status endpoint.
    pub status_url: Url,
    /// Version the page was rendered at. `None` makes the first successful
    /// status check refresh unconditionally.
    pub initial_version: Option<VersionMarker>,
}

impl PreviewTarget {
    /// Build a target from raw page metadata.
    ///
    /// # Errors
    ///
    /// - [`PreviewError::ConfigurationMissing`] if the instance id or status
    ///   URL is absent, blank, or the URL cannot be resolved
    /// - [`PreviewError::InvalidMetadata`] if a version is present but is not
    ///   an integer
    pub fn from_metadata(metadata: &PageMetadata, config: &PreviewConfig) -> Result<Self> {
        let instance_id = metadata
            .instance_id
            .as_deref()
            .and_then(InstanceId::parse)
            .ok_or_else(|| PreviewError::ConfigurationMissing("instance id".into()))?;

        let raw_url = metadata
            .status_url
            .as_deref()
            .ok_or_else(|| PreviewError::ConfigurationMissing("status URL".into()))?;
        let status_url = config.resolve_url(raw_url).ok_or_else(|| {
            PreviewError::ConfigurationMissing(format!("status URL {raw_url:?} cannot be resolved"))
        })?;

        let initial_version = metadata
            .version
            .as_deref()
            .map(str::parse::<VersionMarker>)
            .transpose()?;

        Ok(Self {
            instance_id,
            status_url,
            initial_version,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata(id: Option<&str>, url: Option<&str>, version: Option<&str>) -> PageMetadata {
        PageMetadata {
            instance_id: id.map(str::to_owned),
            status_url: url.map(str::to_owned),
            version: version.map(str::to_owned),
        }
    }

    fn config() -> PreviewConfig {
        PreviewConfig {
            base_url: Some("http://editor.test/".into()),
            ..Default::default()
        }
    }

    #[test]
    fn complete_metadata_builds_target() {
        let meta = metadata(Some("12"), Some("/forms/12/status/"), Some("1300000000"));
        let target = PreviewTarget::from_metadata(&meta, &config()).unwrap();
        assert_eq!(target.instance_id.as_str(), "12");
        assert_eq!(target.status_url.as_str(), "http://editor.test/forms/12/status/");
        assert_eq!(target.initial_version, Some(VersionMarker::new(1_300_000_000)));
    }

    #[test]
    fn missing_instance_id_is_configuration_missing() {
        let meta = metadata(None, Some("/s"), Some("1"));
        let err = PreviewTarget::from_metadata(&meta, &config()).unwrap_err();
        assert!(matches!(err, PreviewError::ConfigurationMissing(_)));
        assert!(err.to_string().contains("instance id"));
    }

    #[test]
    fn blank_instance_id_is_configuration_missing() {
        let meta = metadata(Some("  "), Some("/s"), None);
        let err = PreviewTarget::from_metadata(&meta, &config()).unwrap_err();
        assert!(matches!(err, PreviewError::ConfigurationMissing(_)));
    }

    #[test]
    fn missing_status_url_is_configuration_missing() {
        let meta = metadata(Some("1"), None, Some("1"));
        let err = PreviewTarget::from_metadata(&meta, &config()).unwrap_err();
        assert!(err.to_string().contains("status URL"));
    }

    #[test]
    fn unresolvable_status_url_is_configuration_missing() {
        let meta = metadata(Some("1"), Some("/s"), Some("1"));
        let err = PreviewTarget::from_metadata(&meta, &PreviewConfig::default()).unwrap_err();
        assert!(matches!(err, PreviewError::ConfigurationMissing(_)));
        assert!(err.to_string().contains("cannot be resolved"));
    }

    #[test]
    fn malformed_version_is_invalid_metadata() {
        let meta = metadata(Some("1"), Some("/s"), Some("NaN"));
        let err = PreviewTarget::from_metadata(&meta, &config()).unwrap_err();
        assert!(matches!(err, PreviewError::InvalidMetadata(_)));
    }

    #[test]
    fn absent_version_is_none() {
        let meta = metadata(Some("1"), Some("/s"), None);
        let target = PreviewTarget::from_metadata(&meta, &config()).unwrap();
        assert!(target.initial_version.is_none());
    }

    #[test]
    fn instance_id_is_trimmed() {
        assert_eq!(InstanceId::parse(" 7 ").unwrap().as_str(), "7");
        assert!(InstanceId::parse("a\tb").is_none());
    }
}
