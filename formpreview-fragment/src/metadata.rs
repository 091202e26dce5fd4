//! Page-embedded preview metadata.
//!
//! Editing pages carry the preview parameters in hidden inputs:
//!
//! ```html
//! <input type="hidden" id="uiform-id" value="12">
//! <input type="hidden" id="uiform-url" value="/forms/12/status/">
//! <input type="hidden" id="uiform-last-updated" value="1300000000">
//! ```
//!
//! Reading never fails on missing inputs; absence is reported as `None` and
//! judged by the caller.

use crate::error::{FragmentError, Result};
use crate::page::HtmlPage;
use scraper::{Html, Selector};

/// CSS selectors locating the metadata inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataSelectors {
    /// Input holding the instance identifier.
    pub id: String,
    /// Input holding the status endpoint URL.
    pub status_url: String,
    /// Input holding the initial version marker.
    pub version: String,
}

impl Default for MetadataSelectors {
    fn default() -> Self {
        Self {
            id: "#uiform-id".to_owned(),
            status_url: "#uiform-url".to_owned(),
            version: "#uiform-last-updated".to_owned(),
        }
    }
}

/// Raw metadata values as found on the page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageMetadata {
    /// Instance identifier text.
    pub instance_id: Option<String>,
    /// Status endpoint URL text, possibly relative.
    pub status_url: Option<String>,
    /// Initial version marker text, unparsed.
    pub version: Option<String>,
}

impl PageMetadata {
    /// Read metadata from `page`.
    ///
    /// # Errors
    ///
    /// Returns [`FragmentError::InvalidSelector`] if a configured selector is
    /// not valid CSS.
    pub fn read(page: &HtmlPage, selectors: &MetadataSelectors) -> Result<Self> {
        let document = page.document();
        Ok(Self {
            instance_id: value_of(&document, &selectors.id)?,
            status_url: value_of(&document, &selectors.status_url)?,
            version: value_of(&document, &selectors.version)?,
        })
    }
}

/// `value` attribute of the first element matching `selector`.
fn value_of(document: &Html, selector: &str) -> Result<Option<String>> {
    let compiled =
        Selector::parse(selector).map_err(|_| FragmentError::InvalidSelector(selector.to_owned()))?;
    Ok(document
        .select(&compiled)
        .next()
        .and_then(|el| el.value().attr("value"))
        .map(str::to_owned))
}
