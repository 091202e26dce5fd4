//! Error types for the formpreview-fragment crate.
//!
//! Messages are stable lowercase strings so callers can log them as-is.
//! Markup content never appears in an error message, only selectors and URLs.

/// Errors that can occur while fetching, extracting or installing fragments.
#[derive(Debug, thiserror::Error)]
pub enum FragmentError {
    /// An HTTP request failed, timed out or returned a non-2xx status.
    #[error("HTTP error: {0}")]
    Http(String),

    /// A document or fragment could not be parsed.
    #[error("parse error: {0}")]
    Parse(String),

    /// The container selector matched nothing in the given document.
    #[error("selector not found: {0}")]
    SelectorNotFound(String),

    /// A selector string is not valid CSS.
    #[error("invalid selector: {0}")]
    InvalidSelector(String),

    /// Invalid fetch configuration.
    #[error("config error: {0}")]
    Config(String),
}

/// Convenience type alias for formpreview-fragment results.
pub type Result<T> = std::result::Result<T, FragmentError>;
