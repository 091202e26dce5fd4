//! Headless live preview for an editing page saved to disk.
//!
//! Reads the page, takes the preview metadata from its hidden inputs, and
//! polls until Ctrl-C, rewriting the page file whenever the preview
//! container is refreshed.
//!
//! All tracing output goes to stderr.

use clap::Parser;
use formpreview::{FilePage, PageMetadata, Poller, PreviewConfig};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Keep a saved form-editing page's preview in sync with the server.
#[derive(Parser)]
#[command(name = "formpreview-watch", version, about)]
struct Cli {
    /// The editing page (HTML) to keep in sync.
    #[arg(short, long)]
    page: PathBuf,

    /// Path to TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Base URL for relative URLs on the page, e.g. http://localhost:8000/.
    #[arg(long)]
    base_url: Option<String>,

    /// Poll interval in milliseconds.
    #[arg(long)]
    interval_ms: Option<u64>,

    /// Only log errors.
    #[arg(short, long)]
    quiet: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let directive = if cli.quiet {
        "formpreview=error"
    } else {
        "formpreview=info"
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive)),
        )
        .init();

    let mut config = if let Some(ref path) = cli.config {
        PreviewConfig::from_file(path)?
    } else {
        PreviewConfig::default()
    };
    if let Some(base_url) = cli.base_url {
        config.base_url = Some(base_url);
    }
    if let Some(interval_ms) = cli.interval_ms {
        config.poll_interval_ms = interval_ms;
    }
    config.validate()?;

    let page = FilePage::load(&cli.page)?;
    let metadata = PageMetadata::read(page.page(), &config.metadata_selectors())?;

    let poller = Poller::initialize(&metadata, &config, page)
        .map_err(|e| anyhow::anyhow!("live preview disabled for {}: {e}", cli.page.display()))?;
    let handle = poller.start();

    tokio::signal::ctrl_c().await?;
    tracing::info!("interrupted, stopping");
    handle.shutdown().await;

    Ok(())
}
