//! Status endpoint client.
//!
//! The status endpoint answers with the resource's current version and the
//! URL its preview is rendered at:
//!
//! ```json
//! { "version": 1300000042, "renderUrl": "/forms/contact/preview/" }
//! ```
//!
//! The older field names, `last_updated` and `url`, are
//! accepted too. Unknown fields are ignored.

use crate::error::{PreviewError, Result};
use crate::version::VersionMarker;
use formpreview_fragment::http::get_text;
use serde::Deserialize;
use url::Url;

/// Status response body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusPayload {
    /// Current version marker.
    pub version: VersionMarker,
    /// Where the current preview is rendered, possibly relative.
    pub render_url: String,
}

// Older pages send both spellings at once, which `serde(alias)` would reject
// as a duplicate field. Keep every spelling and prefer the current one.
#[derive(Debug, Deserialize)]
struct StatusWire {
    #[serde(default)]
    version: Option<VersionMarker>,
    #[serde(default)]
    last_updated: Option<VersionMarker>,
    #[serde(rename = "renderUrl", default)]
    render_url: Option<String>,
    #[serde(rename = "render_url", default)]
    render_url_snake: Option<String>,
    #[serde(default)]
    url: Option<String>,
}

impl StatusPayload {
    /// Parse a status body.
    ///
    /// # Errors
    ///
    /// Returns [`PreviewError::StatusFetchFailed`] for invalid JSON or a
    /// missing or malformed `version` or render URL.
    pub fn parse(body: &str) -> Result<Self> {
        let wire: StatusWire = serde_json::from_str(body).map_err(|e| {
            PreviewError::StatusFetchFailed(format!("malformed status response: {e}"))
        })?;
        let version = wire.version.or(wire.last_updated).ok_or_else(|| {
            PreviewError::StatusFetchFailed("malformed status response: missing version".into())
        })?;
        let render_url = wire
            .render_url
            .or(wire.render_url_snake)
            .or(wire.url)
            .ok_or_else(|| {
                PreviewError::StatusFetchFailed(
                    "malformed status response: missing render URL".into(),
                )
            })?;
        Ok(Self {
            version,
            render_url,
        })
    }
}

/// One successful status observation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReport {
    /// Reported version.
    pub version: VersionMarker,
    /// Absolute render URL.
    pub render_url: Url,
}

/// Fetches and interprets the status endpoint of one instance.
#[derive(Debug, Clone)]
pub struct StatusClient {
    client: reqwest::Client,
    status_url: Url,
}

impl StatusClient {
    /// Create a client for `status_url`.
    pub fn new(client: reqwest::Client, status_url: Url) -> Self {
        Self { client, status_url }
    }

    /// Fetch the current status.
    ///
    /// A relative render URL is resolved against the status URL.
    ///
    /// # Errors
    ///
    /// Returns [`PreviewError::StatusFetchFailed`] on network failure,
    /// timeout, non-2xx status, a malformed body, or an unresolvable render URL.
    pub async fn fetch(&self) -> Result<StatusReport> {
        let body = get_text(&self.client, &self.status_url)
            .await
            .map_err(|e| PreviewError::StatusFetchFailed(e.to_string()))?;
        let payload = StatusPayload::parse(&body)?;
        let render_url = self.status_url.join(&payload.render_url).map_err(|e| {
            PreviewError::StatusFetchFailed(format!(
                "render URL {:?} cannot be resolved: {e}",
                payload.render_url
            ))
        })?;
        Ok(StatusReport {
            version: payload.version,
            render_url,
        })
    }
}
