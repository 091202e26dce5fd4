//! formpreview: live preview for the form builder.
//!
//! While a form specification is being edited, the page shows a rendered
//! preview of the form. This crate keeps that preview current without a page
//! reload:
//!
//! Timer → status endpoint → version changed? → render endpoint → container swap
//!
//! # Architecture
//!
//! - **Poller** ([`Poller`]): ticks on a fixed interval, fetches the status
//!   endpoint, and compares the reported version with the one it holds
//! - **Refresher** ([`Refresher`]): fetches the rendered page, keeps the
//!   preview container's children, and replaces the live container's contents
//! - **Surface** ([`PreviewSurface`]): the page being updated
//! - **Scheduled task** ([`task::ScheduledTask`]): the cancellable,
//!   non-overlapping repeating task the poller runs on
//!
//! Every failure after initialization leaves the preview stale and shows up
//! only in the logs.

pub mod config;
pub mod error;
pub mod poller;
pub mod refresher;
pub mod status;
pub mod surface;
pub mod target;
pub mod task;
pub mod version;

pub use config::{PreviewConfig, RefreshRetry};
pub use error::{PreviewError, Result};
pub use poller::{Poller, PollerHandle, PollerPhase, PollerSnapshot, TickOutcome};
pub use refresher::{Refresher, RenderLocator};
pub use status::{StatusClient, StatusPayload, StatusReport};
pub use surface::{FilePage, PreviewSurface, SharedPage};
pub use target::{InstanceId, PreviewTarget};
pub use version::VersionMarker;

pub use formpreview_fragment::{ContainerSelector, Fragment, HtmlPage, PageMetadata};
