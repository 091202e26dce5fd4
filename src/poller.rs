//! The preview poller.
//!
//! Each tick asks the status endpoint for the resource's version. A version
//! different from the one held means the preview is stale: the held version
//! is updated and the refresher fetches and installs fresh markup. An equal
//! version does nothing. A failed status check drops the tick; the next
//! regular tick tries again.
//!
//! Ticks run one at a time (see [`crate::task`]), so a slow status endpoint
//! delays later ticks rather than stacking concurrent requests whose
//! responses could land out of order.

use crate::config::{PreviewConfig, RefreshRetry};
use crate::error::{PreviewError, Result};
use crate::refresher::{RenderLocator, Refresher};
use crate::status::StatusClient;
use crate::surface::PreviewSurface;
use crate::target::{InstanceId, PreviewTarget};
use crate::task::{ScheduledTask, Tick};
use crate::version::VersionMarker;
use formpreview_fragment::{ContainerSelector, PageMetadata, build_client};
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

/// Where a poller is in its lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PollerPhase {
    /// Initialized, not ticking.
    #[default]
    Idle,
    /// Ticking on its interval.
    Polling,
    /// A change was detected and new markup is being installed.
    Refreshing,
}

/// What one tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The status check failed; nothing changed.
    StatusFailed,
    /// The version matched the held one and no retry was due.
    Unchanged,
    /// Fresh markup was installed.
    Refreshed,
    /// A refresh was attempted and failed.
    RefreshFailed,
}

/// Observable poller state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PollerSnapshot {
    /// Lifecycle phase.
    pub phase: PollerPhase,
    /// Held version marker.
    pub version: Option<VersionMarker>,
    /// Ticks started.
    pub ticks: u64,
    /// Successful refreshes.
    pub refreshes: u64,
    /// Failed refreshes.
    pub refresh_failures: u64,
    /// Failed status checks.
    pub status_failures: u64,
    /// A failed refresh is waiting to be retried.
    pub retry_pending: bool,
}

/// Polls one preview instance and refreshes it when its version changes.
pub struct Poller<S> {
    instance_id: InstanceId,
    status: StatusClient,
    refresher: Refresher<S>,
    container: ContainerSelector,
    version: Option<VersionMarker>,
    interval: Duration,
    retry: RefreshRetry,
    retry_pending: bool,
    snapshot: watch::Sender<PollerSnapshot>,
}

impl<S: PreviewSurface> Poller<S> {
    /// Initialize from page metadata.
    ///
    /// This is the only place a preview can be disabled: a missing instance
    /// id or status URL, or malformed metadata, is logged once and returned
    /// as an error, and no poller exists to schedule.
    ///
    /// # Errors
    ///
    /// Returns [`PreviewError::ConfigurationMissing`],
    /// [`PreviewError::InvalidMetadata`] or [`PreviewError::Config`].
    pub fn initialize(metadata: &PageMetadata, config: &PreviewConfig, surface: S) -> Result<Self> {
        let target = PreviewTarget::from_metadata(metadata, config).inspect_err(|e| {
            error!(error = %e, "no usable preview metadata, live preview disabled");
        })?;
        Self::with_target(target, config, surface)
    }

    /// Initialize from an already validated target.
    ///
    /// # Errors
    ///
    /// Returns [`PreviewError::Config`] if `config` is invalid.
    pub fn with_target(target: PreviewTarget, config: &PreviewConfig, surface: S) -> Result<Self> {
        config.validate()?;
        let client =
            build_client(&config.fetch_config()).map_err(|e| PreviewError::Config(e.to_string()))?;

        let container =
            ContainerSelector::for_instance(&config.container_prefix, target.instance_id.as_str());
        let (snapshot, _) = watch::channel(PollerSnapshot {
            version: target.initial_version,
            ..Default::default()
        });

        info!(
            instance = %target.instance_id,
            status_url = %target.status_url,
            version = ?target.initial_version,
            "live preview initialized"
        );

        Ok(Self {
            instance_id: target.instance_id,
            status: StatusClient::new(client.clone(), target.status_url),
            refresher: Refresher::new(client, surface),
            container,
            version: target.initial_version,
            interval: config.poll_interval(),
            retry: config.refresh_retry,
            retry_pending: false,
            snapshot,
        })
    }

    /// The previewed instance.
    pub fn instance_id(&self) -> &InstanceId {
        &self.instance_id
    }

    /// The container being refreshed.
    pub fn container(&self) -> &ContainerSelector {
        &self.container
    }

    /// Held version marker.
    pub fn version(&self) -> Option<VersionMarker> {
        self.version
    }

    /// Tick cadence, from the validated configuration.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// The surface refreshes are written into.
    pub fn surface(&self) -> &S {
        self.refresher.surface()
    }

    /// Watch the poller's state.
    pub fn subscribe(&self) -> watch::Receiver<PollerSnapshot> {
        self.snapshot.subscribe()
    }

    /// Run one status check, refreshing if the version changed.
    ///
    /// The version comparison always completes before any refresh starts.
    /// Failures are logged and reported in the outcome, never returned.
    pub async fn on_tick(&mut self) -> TickOutcome {
        self.snapshot.send_modify(|s| s.ticks += 1);

        let report = match self.status.fetch().await {
            Ok(report) => report,
            Err(e) => {
                debug!(instance = %self.instance_id, error = %e, "status check dropped");
                self.snapshot.send_modify(|s| s.status_failures += 1);
                return TickOutcome::StatusFailed;
            }
        };

        if self.version == Some(report.version) {
            if !(self.retry_pending && self.retry == RefreshRetry::NextTick) {
                return TickOutcome::Unchanged;
            }
            debug!(instance = %self.instance_id, "retrying failed preview refresh");
        } else {
            info!(
                instance = %self.instance_id,
                from = ?self.version,
                to = %report.version,
                "preview source changed"
            );
            self.version = Some(report.version);
            self.snapshot.send_modify(|s| s.version = Some(report.version));
        }

        let locator = RenderLocator {
            url: report.render_url,
            container: self.container.clone(),
        };

        let resume = self.snapshot.borrow().phase;
        self.snapshot.send_modify(|s| s.phase = PollerPhase::Refreshing);
        let result = self.refresher.refresh(&locator).await;

        match result {
            Ok(()) => {
                self.retry_pending = false;
                self.snapshot.send_modify(|s| {
                    s.phase = resume;
                    s.refreshes += 1;
                    s.retry_pending = false;
                });
                TickOutcome::Refreshed
            }
            Err(e) => {
                self.retry_pending = self.retry == RefreshRetry::NextTick;
                if !self.retry_pending {
                    warn!(
                        instance = %self.instance_id,
                        error = %e,
                        "preview stays stale until the next version change"
                    );
                }
                let pending = self.retry_pending;
                self.snapshot.send_modify(|s| {
                    s.phase = resume;
                    s.refresh_failures += 1;
                    s.retry_pending = pending;
                });
                TickOutcome::RefreshFailed
            }
        }
    }

    /// Start ticking on the configured interval, first tick one interval
    /// from now.
    ///
    /// Must be called within a tokio runtime.
    pub fn start(self) -> PollerHandle {
        let interval = self.interval;
        info!(
            instance = %self.instance_id,
            interval = ?interval,
            "live preview polling started"
        );
        self.snapshot.send_modify(|s| s.phase = PollerPhase::Polling);
        let snapshots = self.snapshot.subscribe();
        PollerHandle {
            task: ScheduledTask::spawn(interval, self),
            snapshots,
        }
    }
}

impl<S: PreviewSurface> Tick for Poller<S> {
    async fn tick(&mut self) {
        self.on_tick().await;
    }

    fn stopped(&mut self) {
        self.snapshot.send_modify(|s| s.phase = PollerPhase::Idle);
        info!(instance = %self.instance_id, "live preview polling stopped");
    }
}

/// Handle to a running poller.
///
/// Dropping the handle stops polling.
#[derive(Debug)]
pub struct PollerHandle {
    task: ScheduledTask,
    snapshots: watch::Receiver<PollerSnapshot>,
}

impl PollerHandle {
    /// Stop polling. Idempotent.
    ///
    /// A tick already in flight is abandoned at its next suspension point and
    /// its result discarded.
    pub fn stop(&self) {
        self.task.stop();
    }

    /// Whether [`stop`](Self::stop) has been called.
    pub fn is_stopped(&self) -> bool {
        self.task.is_stopped()
    }

    /// Current poller state.
    pub fn snapshot(&self) -> PollerSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Watch the poller's state.
    pub fn subscribe(&self) -> watch::Receiver<PollerSnapshot> {
        self.snapshots.clone()
    }

    /// Stop polling and wait until the loop has exited.
    ///
    /// Once this returns nothing can change the poller's state.
    pub async fn shutdown(self) {
        self.task.shutdown().await;
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use formpreview_fragment::HtmlPage;

    fn target(version: Option<i64>) -> PreviewTarget {
        PreviewTarget {
            instance_id: InstanceId::parse("42").unwrap(),
            status_url: "http://127.0.0.1:9/forms/42/status/".parse().unwrap(),
            initial_version: version.map(VersionMarker::new),
        }
    }

    fn page() -> HtmlPage {
        HtmlPage::new(r#"<div id="preview-form-42"></div>"#)
    }

    #[test]
    fn new_poller_is_idle_with_initial_version() {
        let poller = Poller::with_target(target(Some(7)), &PreviewConfig::default(), page())
            .expect("poller");
        let snapshot = poller.subscribe().borrow().clone();

        assert_eq!(snapshot.phase, PollerPhase::Idle);
        assert_eq!(snapshot.version, Some(VersionMarker::new(7)));
        assert_eq!(snapshot.ticks, 0);
        assert_eq!(poller.version(), Some(VersionMarker::new(7)));
    }

    #[test]
    fn container_uses_configured_prefix() {
        let config = PreviewConfig {
            container_prefix: "live-".into(),
            ..Default::default()
        };
        let poller = Poller::with_target(target(None), &config, page()).expect("poller");
        assert_eq!(poller.container().element_id(), "live-42");
    }

    #[tokio::test]
    async fn start_ticks_on_configured_interval() {
        let config = PreviewConfig {
            poll_interval_ms: 60_000,
            ..Default::default()
        };
        let poller = Poller::with_target(target(Some(1)), &config, page()).expect("poller");
        assert_eq!(poller.interval(), Duration::from_secs(60));

        let handle = poller.start();
        tokio::time::sleep(Duration::from_millis(50)).await;
        let snapshot = handle.snapshot();
        assert_eq!(snapshot.phase, PollerPhase::Polling);
        assert_eq!(snapshot.ticks, 0);
        handle.shutdown().await;
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = PreviewConfig {
            poll_interval_ms: 0,
            ..Default::default()
        };
        let result = Poller::with_target(target(None), &config, page());
        assert!(matches!(result, Err(PreviewError::Config(_))));
    }

    #[test]
    fn missing_status_url_disables_preview() {
        let metadata = PageMetadata {
            instance_id: Some("42".into()),
            status_url: None,
            version: Some("1".into()),
        };
        let result = Poller::initialize(&metadata, &PreviewConfig::default(), page());
        assert!(matches!(
            result,
            Err(PreviewError::ConfigurationMissing(_))
        ));
    }

    #[tokio::test]
    async fn unreachable_status_endpoint_drops_the_tick() {
        let config = PreviewConfig {
            request_timeout_ms: 200,
            ..Default::default()
        };
        let mut poller = Poller::with_target(target(Some(3)), &config, page()).expect("poller");

        assert_eq!(poller.on_tick().await, TickOutcome::StatusFailed);
        assert_eq!(poller.version(), Some(VersionMarker::new(3)));
        let snapshot = poller.subscribe().borrow().clone();
        assert_eq!(snapshot.ticks, 1);
        assert_eq!(snapshot.status_failures, 1);
    }
}
