//! The prefetch cache seam between the grid and the prefetcher task.

use serde::Deserialize;
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

use crate::assets::Asset;
use crate::events::CacheCommand;

/// Thumbnail dimensions in device pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PixelSize {
    pub width: u32,
    pub height: u32,
}

impl PixelSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// How a thumbnail is fitted into its target box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContentMode {
    /// Cover the box, cropping the overflow.
    #[default]
    AspectFill,
    /// Fit inside the box, preserving aspect ratio.
    AspectFit,
}

/// Request options fixed per grid instance and passed unchanged on every
/// cache call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestOptions {
    pub target_size: PixelSize,
    pub mode: ContentMode,
}

/// Advisory prefetch control.
///
/// Implementations are fire-and-forget and must stay idempotent under
/// redundant calls; the window manager never waits on completion.
pub trait ThumbnailCache {
    fn start_caching(&mut self, assets: &[Asset], options: RequestOptions);
    fn stop_caching(&mut self, assets: &[Asset], options: RequestOptions);
    fn stop_caching_all(&mut self);
}

/// Bridges cache calls onto the prefetcher task's command channel.
///
/// Sends never block. A closed channel means the prefetcher is gone; the
/// signal is dropped, matching the best-effort cache contract.
#[derive(Debug, Clone)]
pub struct ChannelCache {
    commands: UnboundedSender<CacheCommand>,
}

impl ChannelCache {
    pub fn new(commands: UnboundedSender<CacheCommand>) -> Self {
        Self { commands }
    }

    fn send(&self, command: CacheCommand) {
        if self.commands.send(command).is_err() {
            debug!("prefetcher gone; dropping cache command");
        }
    }
}

impl ThumbnailCache for ChannelCache {
    fn start_caching(&mut self, assets: &[Asset], options: RequestOptions) {
        self.send(CacheCommand::StartCaching {
            assets: assets.to_vec(),
            options,
        });
    }

    fn stop_caching(&mut self, assets: &[Asset], options: RequestOptions) {
        self.send(CacheCommand::StopCaching {
            assets: assets.to_vec(),
            options,
        });
    }

    fn stop_caching_all(&mut self) {
        self.send(CacheCommand::StopCachingAll);
    }
}
