//! The live page: an HTML document whose preview container gets replaced.
//!
//! [`HtmlPage`] keeps the serialized document and re-parses it for each
//! operation, so no parsed tree outlives a call and the page stays `Send`.

use crate::error::{FragmentError, Result};
use crate::extract::Fragment;
use crate::selector::ContainerSelector;
use scraper::Html;

/// An in-memory HTML page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HtmlPage {
    markup: String,
}

impl HtmlPage {
    /// Wrap page markup. Parsing is lenient, so any string is accepted.
    pub fn new(markup: impl Into<String>) -> Self {
        Self {
            markup: markup.into(),
        }
    }

    /// Current serialized page.
    pub fn markup(&self) -> &str {
        &self.markup
    }

    /// Parse the current markup.
    pub fn document(&self) -> Html {
        Html::parse_document(&self.markup)
    }

    /// Inner HTML of the container, or `None` if it is not on the page.
    pub fn container_markup(&self, selector: &ContainerSelector) -> Option<String> {
        let compiled = selector.to_selector().ok()?;
        let document = self.document();
        let container = document.select(&compiled).next()?;
        Some(container.inner_html())
    }

    /// Replace every child of the container with the fragment's elements.
    ///
    /// The new document is built completely before it replaces the old markup,
    /// so on error the page is unchanged.
    ///
    /// The live container must be the same kind of element as the one in the
    /// fragment's source. Nodes are copied as parsed, and the page is
    /// re-parsed on every call, so children that are only valid inside the
    /// source container (say `<tbody>` out of a `<table>`) are dropped on the
    /// next parse if the live container is a `<div>`.
    ///
    /// # Errors
    ///
    /// Returns [`FragmentError::SelectorNotFound`] if the container is not on
    /// the page or not in the fragment's source, or
    /// [`FragmentError::InvalidSelector`] for an uncompilable selector.
    pub fn replace_contents(
        &mut self,
        selector: &ContainerSelector,
        fragment: &Fragment,
    ) -> Result<()> {
        let compiled = selector.to_selector()?;
        let mut document = self.document();

        let Some(target) = document.select(&compiled).next().map(|el| el.id()) else {
            return Err(FragmentError::SelectorNotFound(selector.to_string()));
        };

        {
            let Some(mut container) = document.tree.get_mut(target) else {
                return Err(FragmentError::SelectorNotFound(selector.to_string()));
            };
            while let Some(mut child) = container.first_child() {
                child.detach();
            }
        }

        // Copy the source container's element children and their subtrees,
        // parents before children.
        let source_selector = fragment.container().to_selector()?;
        let source = Html::parse_document(fragment.source());
        let Some(origin) = source.select(&source_selector).next() else {
            return Err(FragmentError::SelectorNotFound(fragment.container().to_string()));
        };
        let mut pending = vec![(*origin, target, true)];
        while let Some((from, into, top_level)) = pending.pop() {
            for child in from.children() {
                if top_level && !child.value().is_element() {
                    continue;
                }
                let Some(mut parent) = document.tree.get_mut(into) else {
                    return Err(FragmentError::Parse(format!(
                        "lost node while installing into {selector}"
                    )));
                };
                let copied = parent.append(child.value().clone()).id();
                pending.push((child, copied, false));
            }
        }

        self.markup = document.html();
        Ok(())
    }
}
