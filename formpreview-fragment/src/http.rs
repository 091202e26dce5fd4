//! Shared HTTP client and GET helpers for the preview server.
//!
//! The same [`reqwest::Client`] is reused for status and render requests so
//! connections are pooled across ticks.

use crate::config::FetchConfig;
use crate::error::FragmentError;
use std::time::Duration;
use url::Url;

/// Build a [`reqwest::Client`] configured from `config`.
///
/// The client has:
/// - Timeout from config, applied to the whole request
/// - The configured User-Agent
/// - gzip decompression
///
/// # Errors
///
/// Returns [`FragmentError::Config`] if the config is invalid, or
/// [`FragmentError::Http`] if the client cannot be constructed.
pub fn build_client(config: &FetchConfig) -> Result<reqwest::Client, FragmentError> {
    config.validate()?;

    reqwest::Client::builder()
        .timeout(Duration::from_millis(config.timeout_ms))
        .user_agent(config.user_agent.clone())
        .redirect(reqwest::redirect::Policy::limited(10))
        .build()
        .map_err(|e| FragmentError::Http(format!("failed to build HTTP client: {e}")))
}

/// GET `url` and return the body as text.
///
/// Non-2xx responses are errors; their bodies are discarded.
///
/// # Errors
///
/// Returns [`FragmentError::Http`] on network failure, timeout, non-2xx status
/// or an undecodable body.
pub async fn get_text(client: &reqwest::Client, url: &Url) -> Result<String, FragmentError> {
    let response = client
        .get(url.clone())
        .send()
        .await
        .map_err(|e| FragmentError::Http(describe(&e, url)))?;

    let status = response.status();
    if !status.is_success() {
        return Err(FragmentError::Http(format!(
            "status {} from {url}",
            status.as_u16()
        )));
    }

    response
        .text()
        .await
        .map_err(|e| FragmentError::Http(describe(&e, url)))
}

fn describe(err: &reqwest::Error, url: &Url) -> String {
    if err.is_timeout() {
        format!("request to {url} timed out")
    } else {
        format!("request to {url} failed: {err}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_client_with_default_config() {
        let client = build_client(&FetchConfig::default());
        assert!(client.is_ok());
    }

    #[test]
    fn build_client_rejects_invalid_config() {
        let config = FetchConfig {
            timeout_ms: 0,
            ..Default::default()
        };
        let err = build_client(&config).unwrap_err();
        assert!(matches!(err, FragmentError::Config(_)));
    }
}
