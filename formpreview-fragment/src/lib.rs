//! # formpreview-fragment
//!
//! The HTML half of the live form preview: fetch a rendered page, cut out
//! the preview container's children, and install them into the live page.
//!
//! ## Design
//!
//! - One [`reqwest::Client`] with an explicit request timeout, shared by
//!   every request a preview makes
//! - Container addressing by element id, the same selector on both sides
//! - Extraction keeps element children only (`#container > *`)
//! - Replacement is all-or-nothing: the page markup changes only once the
//!   new document is fully built
//! - Page metadata (instance id, status URL, initial version) is read from
//!   hidden inputs on the page

pub mod config;
pub mod error;
pub mod extract;
pub mod http;
pub mod metadata;
pub mod page;
pub mod selector;

pub use config::FetchConfig;
pub use error::{FragmentError, Result};
pub use extract::{extract_fragment, fetch_fragment, Fragment};
pub use http::build_client;
pub use metadata::{MetadataSelectors, PageMetadata};
pub use page::HtmlPage;
pub use selector::{ContainerSelector, DEFAULT_CONTAINER_PREFIX};
