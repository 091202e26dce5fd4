//! Fetch rendered markup and splice it into the page.

use crate::error::{PreviewError, Result};
use crate::surface::PreviewSurface;
use formpreview_fragment::{ContainerSelector, fetch_fragment};
use tracing::{info, warn};
use url::Url;

/// Where fresh markup comes from and where it goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderLocator {
    /// Render endpoint.
    pub url: Url,
    /// Container scoping the fetched document and addressing the live one.
    pub container: ContainerSelector,
}

/// Replaces a container's contents with freshly rendered markup.
///
/// There is no retry here; whether a failed refresh is attempted again is
/// the poller's decision.
pub struct Refresher<S> {
    client: reqwest::Client,
    surface: S,
}

impl<S: PreviewSurface> Refresher<S> {
    /// Create a refresher writing into `surface`.
    pub fn new(client: reqwest::Client, surface: S) -> Self {
        Self { client, surface }
    }

    /// The surface being refreshed.
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Fetch `locator.url`, keep the children of `locator.container`, and
    /// replace the live container's contents with them.
    ///
    /// # Errors
    ///
    /// - [`PreviewError::RefreshFetchFailed`] if the fetch fails or the
    ///   fetched document has no such container
    /// - [`PreviewError::ContainerMissing`] if the live page has no such
    ///   container
    ///
    /// The surface is untouched on error.
    pub async fn refresh(&mut self, locator: &RenderLocator) -> Result<()> {
        let fragment = fetch_fragment(&self.client, &locator.url, &locator.container)
            .await
            .map_err(|e| {
                warn!(url = %locator.url, error = %e, "preview markup fetch failed");
                PreviewError::RefreshFetchFailed(e.to_string())
            })?;

        if let Err(e) = self.surface.replace_contents(&locator.container, &fragment) {
            warn!(container = %locator.container, error = %e, "preview replacement skipped");
            return Err(e);
        }

        info!(
            url = %locator.url,
            container = %locator.container,
            elements = fragment.element_count(),
            "preview refreshed"
        );
        Ok(())
    }
}
