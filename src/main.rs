//! Demo binary: drives a simulated scroll session over a photo folder.
//!
//! Delegates all logic to the library crate; no local modules here.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{Level, debug, info};
use tracing_subscriber::{EnvFilter, fmt};

use photo_grid::cache::ChannelCache;
use photo_grid::geometry::Rect;
use photo_grid::grid::GridController;
use photo_grid::library::PhotoLibrary;
use photo_grid::tasks::prefetcher::{self, FileThumbnailSource};

/// Simple CLI
#[derive(Debug, Parser)]
#[command(name = "photo-grid", about = "Viewport-driven thumbnail precaching demo")]
struct Cli {
    /// Path to YAML config file
    #[arg(short, long, value_name = "FILE", default_value = "grid.yaml")]
    config: PathBuf,

    /// Number of simulated scroll ticks
    #[arg(long, default_value_t = 200)]
    ticks: u32,

    /// Viewport height in points
    #[arg(long, default_value_t = 600.0)]
    viewport_height: f64,

    /// Seed for the scroll random walk
    #[arg(long)]
    seed: Option<u64>,

    /// Increase log verbosity (repeatable)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbosity: u8) {
    // map -v to log level
    let level = match verbosity {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let filter = EnvFilter::from_default_env()
        .add_directive(format!("photo_grid={}", level).parse().unwrap());
    fmt().with_env_filter(filter).with_target(true).init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let cfg = photo_grid::config::from_yaml_file(&cli.config)
        .with_context(|| format!("loading config from {}", cli.config.display()))?;
    cfg.validate().context("validating configuration")?;

    let mut library = PhotoLibrary::open(&cfg.library_path)?;
    let collection = library.scan();
    info!(count = collection.len(), "scanned assets");

    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let (ready_tx, mut ready_rx) = mpsc::channel(64);
    let cancel = CancellationToken::new();
    let worker = tokio::spawn(prefetcher::run(
        command_rx,
        Arc::new(FileThumbnailSource::new()),
        ready_tx,
        cancel.clone(),
        cfg.max_in_flight,
    ));

    let layout = cfg.layout();
    let viewport_width = layout.content_width();
    let content_height = layout.content_height(collection.len());
    let mut controller = GridController::new(
        layout,
        collection,
        cfg.request_options(),
        ChannelCache::new(command_tx),
    );

    let mut rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let max_y = (content_height - cli.viewport_height).max(0.0);
    let mut y = 0.0f64;
    let mut prepared = 0usize;

    for _ in 0..cli.ticks {
        let step: f64 = rng.random_range(-cli.viewport_height..=cli.viewport_height);
        y = (y + step).clamp(0.0, max_y);
        controller.viewport_changed(Rect::new(0.0, y, viewport_width, cli.viewport_height), true);

        while let Ok(ready) = ready_rx.try_recv() {
            prepared += 1;
            debug!(asset = %ready.0.id, width = ready.0.width, height = ready.0.height, "thumbnail ready");
        }

        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    cancel.cancel();
    let _ = worker.await;
    while let Ok(ready) = ready_rx.try_recv() {
        prepared += 1;
        debug!(asset = %ready.0.id, "thumbnail ready");
    }
    info!(prepared, "scroll simulation complete");
    Ok(())
}
