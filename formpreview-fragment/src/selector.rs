//! Container selector convention shared by the fetched and the live document.
//!
//! The preview container for an instance is the element whose `id` is the
//! configured prefix followed by the instance identifier, e.g.
//! `preview-form-12`. The same selector scopes the fetched markup and
//! addresses the element being replaced.

use crate::error::FragmentError;
use scraper::Selector;
use std::fmt;

/// Default container id prefix used by the form preview pages.
pub const DEFAULT_CONTAINER_PREFIX: &str = "preview-form-";

/// Identifies a preview container element by id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContainerSelector {
    element_id: String,
}

impl ContainerSelector {
    /// Selector for the container of `instance_id` using `prefix`.
    pub fn for_instance(prefix: &str, instance_id: &str) -> Self {
        Self {
            element_id: format!("{prefix}{instance_id}"),
        }
    }

    /// Selector for an element with exactly this id.
    pub fn from_element_id(element_id: impl Into<String>) -> Self {
        Self {
            element_id: element_id.into(),
        }
    }

    /// The `id` attribute value the container carries.
    pub fn element_id(&self) -> &str {
        &self.element_id
    }

    /// Compile into a [`scraper::Selector`].
    ///
    /// Matches on the `id` attribute as a quoted string rather than `#id`, so
    /// ids starting with a digit or containing punctuation still select.
    ///
    /// # Errors
    ///
    /// Returns [`FragmentError::InvalidSelector`] if the id is empty, contains
    /// control characters, or otherwise fails to compile.
    pub fn to_selector(&self) -> Result<Selector, FragmentError> {
        if self.element_id.is_empty() || self.element_id.chars().any(char::is_control) {
            return Err(FragmentError::InvalidSelector(self.to_string()));
        }
        let escaped = self.element_id.replace('\\', "\\\\").replace('"', "\\\"");
        Selector::parse(&format!("[id=\"{escaped}\"]"))
            .map_err(|_| FragmentError::InvalidSelector(self.to_string()))
    }
}

impl fmt::Display for ContainerSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.element_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    #[test]
    fn for_instance_joins_prefix_and_id() {
        let sel = ContainerSelector::for_instance(DEFAULT_CONTAINER_PREFIX, "12");
        assert_eq!(sel.element_id(), "preview-form-12");
        assert_eq!(sel.to_string(), "#preview-form-12");
    }

    #[test]
    fn compiled_selector_matches_digit_leading_id() {
        let sel = ContainerSelector::from_element_id("42");
        let doc = Html::parse_fragment(r#"<div id="42">x</div>"#);
        let selector = sel.to_selector().unwrap();
        assert_eq!(doc.select(&selector).count(), 1);
    }

    #[test]
    fn compiled_selector_escapes_quotes() {
        let sel = ContainerSelector::from_element_id(r#"a"b"#);
        let selector = sel.to_selector().unwrap();
        let doc = Html::parse_fragment(r#"<div id='a"b'>x</div>"#);
        assert_eq!(doc.select(&selector).count(), 1);
    }

    #[test]
    fn empty_id_is_invalid() {
        let sel = ContainerSelector::from_element_id("");
        assert!(matches!(
            sel.to_selector(),
            Err(FragmentError::InvalidSelector(_))
        ));
    }

    #[test]
    fn control_characters_are_invalid() {
        let sel = ContainerSelector::from_element_id("a\nb");
        assert!(sel.to_selector().is_err());
    }
}
