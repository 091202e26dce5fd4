//! Fragment extraction from rendered preview documents.
//!
//! The render endpoint returns a full page (or a larger fragment than needed).
//! Only the child elements of the container are kept, which is the
//! `#container > *` scoping the preview pages have always used.

use crate::error::{FragmentError, Result};
use crate::http::get_text;
use crate::selector::ContainerSelector;
use scraper::{ElementRef, Html};
use url::Url;

/// Markup extracted from a rendered document, ready to install.
///
/// The whole source document is kept alongside the container's serialized
/// children. Installing grafts nodes out of the parsed source, so children
/// that only parse inside their container (table rows, list items) arrive
/// intact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    source: String,
    container: ContainerSelector,
    markup: String,
    element_count: usize,
}

impl Fragment {
    /// The rendered document the fragment was taken from.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The container scoping [`source`](Self::source).
    pub fn container(&self) -> &ContainerSelector {
        &self.container
    }

    /// Serialized child elements of the source container.
    pub fn markup(&self) -> &str {
        &self.markup
    }

    /// Number of top-level elements in [`markup`](Self::markup).
    pub fn element_count(&self) -> usize {
        self.element_count
    }

    /// Whether the source container had no child elements.
    pub fn is_empty(&self) -> bool {
        self.element_count == 0
    }
}

/// Extract the child elements of `selector` from `html`.
///
/// Text nodes and comments directly under the container are dropped; only
/// element children are carried over.
///
/// # Errors
///
/// Returns [`FragmentError::SelectorNotFound`] if no element matches, or
/// [`FragmentError::InvalidSelector`] if the selector cannot be compiled.
pub fn extract_fragment(html: &str, selector: &ContainerSelector) -> Result<Fragment> {
    let compiled = selector.to_selector()?;
    let document = Html::parse_document(html);

    let Some(container) = document.select(&compiled).next() else {
        return Err(FragmentError::SelectorNotFound(selector.to_string()));
    };

    let mut markup = String::new();
    let mut element_count = 0;
    for child in container.children().filter_map(ElementRef::wrap) {
        markup.push_str(&child.html());
        element_count += 1;
    }

    Ok(Fragment {
        source: html.to_owned(),
        container: selector.clone(),
        markup,
        element_count,
    })
}

/// Fetch `url` and extract the child elements of `selector` from the response.
///
/// # Errors
///
/// Returns [`FragmentError::Http`] if the request fails, otherwise the errors
/// of [`extract_fragment`].
pub async fn fetch_fragment(
    client: &reqwest::Client,
    url: &Url,
    selector: &ContainerSelector,
) -> Result<Fragment> {
    let body = get_text(client, url).await?;
    let fragment = extract_fragment(&body, selector)?;
    tracing::trace!(
        url = %url,
        container = %selector,
        elements = fragment.element_count(),
        "extracted preview fragment"
    );
    Ok(fragment)
}
