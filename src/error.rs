//! Error types for the live preview.
//!
//! None of these reach the person editing the form. Initialization errors
//! disable the preview; every other error leaves the preview stale until a
//! later tick succeeds.

/// Top-level error type for the preview poller and refresher.
#[derive(Debug, thiserror::Error)]
pub enum PreviewError {
    /// Required page metadata is absent or cannot be resolved.
    #[error("configuration missing: {0}")]
    ConfigurationMissing(String),

    /// Page metadata is present but malformed.
    #[error("invalid metadata: {0}")]
    InvalidMetadata(String),

    /// Invalid preview configuration.
    #[error("config error: {0}")]
    Config(String),

    /// Status request failed or returned an unusable payload.
    #[error("status fetch failed: {0}")]
    StatusFetchFailed(String),

    /// Rendered markup could not be fetched or scoped.
    #[error("refresh fetch failed: {0}")]
    RefreshFetchFailed(String),

    /// The preview container is not on the live page.
    #[error("container missing: {0}")]
    ContainerMissing(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, PreviewError>;
