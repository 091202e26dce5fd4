//! Where refreshed markup is installed.
//!
//! [`PreviewSurface`] is the local view the refresher writes into. The
//! in-memory [`HtmlPage`] is the basic surface; [`SharedPage`] lets a host
//! read the page while a poller owns it, and [`FilePage`] mirrors every
//! replacement to a file on disk.

use crate::error::{PreviewError, Result};
use formpreview_fragment::{ContainerSelector, Fragment, FragmentError, HtmlPage};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

/// A view whose preview container can be replaced.
///
/// Implementations must be all-or-nothing: on error the view is unchanged.
pub trait PreviewSurface: Send + 'static {
    /// Replace the contents of `container` with `fragment`.
    ///
    /// # Errors
    ///
    /// Returns [`PreviewError::ContainerMissing`] if the container is not in
    /// the view.
    fn replace_contents(&mut self, container: &ContainerSelector, fragment: &Fragment)
    -> Result<()>;
}

impl PreviewSurface for HtmlPage {
    fn replace_contents(
        &mut self,
        container: &ContainerSelector,
        fragment: &Fragment,
    ) -> Result<()> {
        HtmlPage::replace_contents(self, container, fragment).map_err(|e| match e {
            FragmentError::SelectorNotFound(sel) | FragmentError::InvalidSelector(sel) => {
                PreviewError::ContainerMissing(sel)
            }
            other => PreviewError::RefreshFetchFailed(other.to_string()),
        })
    }
}

/// An [`HtmlPage`] shared between the poller and its host.
#[derive(Debug, Clone)]
pub struct SharedPage(Arc<Mutex<HtmlPage>>);

impl SharedPage {
    /// Share `page`.
    pub fn new(page: HtmlPage) -> Self {
        Self(Arc::new(Mutex::new(page)))
    }

    /// Copy of the current page.
    pub fn snapshot(&self) -> HtmlPage {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Inner HTML of `container` on the current page.
    pub fn container_markup(&self, container: &ContainerSelector) -> Option<String> {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .container_markup(container)
    }
}

impl PreviewSurface for SharedPage {
    fn replace_contents(
        &mut self,
        container: &ContainerSelector,
        fragment: &Fragment,
    ) -> Result<()> {
        let mut page = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        PreviewSurface::replace_contents(&mut *page, container, fragment)
    }
}

/// A page backed by a file, rewritten after every replacement.
#[derive(Debug)]
pub struct FilePage {
    path: PathBuf,
    page: HtmlPage,
}

impl FilePage {
    /// Read the page at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`PreviewError::Io`] if the file cannot be read.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let markup = std::fs::read_to_string(&path)?;
        Ok(Self {
            path,
            page: HtmlPage::new(markup),
        })
    }

    /// The backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The current page.
    pub fn page(&self) -> &HtmlPage {
        &self.page
    }
}

impl PreviewSurface for FilePage {
    fn replace_contents(
        &mut self,
        container: &ContainerSelector,
        fragment: &Fragment,
    ) -> Result<()> {
        let mut next = self.page.clone();
        PreviewSurface::replace_contents(&mut next, container, fragment)?;
        write_atomic(&self.path, next.markup())?;
        self.page = next;
        Ok(())
    }
}

/// Sibling temp file used while rewriting `path`.
fn temp_path(path: &Path) -> PathBuf {
    let tmp_name = format!(
        ".{}.tmp",
        path.file_name().and_then(|n| n.to_str()).unwrap_or("page")
    );
    path.parent()
        .map(|p| p.join(&tmp_name))
        .unwrap_or_else(|| PathBuf::from(&tmp_name))
}

/// Write `content` to a temp file, sync it, then rename it over `path`.
///
/// On error `path` keeps its previous contents.
fn write_atomic(path: &Path, content: &str) -> Result<()> {
    let tmp_path = temp_path(path);
    let mut file = std::fs::File::create(&tmp_path)?;
    let written = file
        .write_all(content.as_bytes())
        .and_then(|()| file.sync_all())
        .and_then(|()| std::fs::rename(&tmp_path, path));
    if let Err(e) = written {
        let _ = std::fs::remove_file(&tmp_path);
        return Err(e.into());
    }
    Ok(())
}
