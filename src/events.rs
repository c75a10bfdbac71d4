use crate::assets::{Asset, AssetId};
use crate::cache::RequestOptions;

/// Control messages for the prefetcher task.
#[derive(Debug, Clone)]
pub enum CacheCommand {
    StartCaching {
        assets: Vec<Asset>,
        options: RequestOptions,
    },
    StopCaching {
        assets: Vec<Asset>,
        options: RequestOptions,
    },
    StopCachingAll,
}

/// A decoded, resized thumbnail, RGBA8.
#[derive(Debug, Clone)]
pub struct PreparedThumbnail {
    pub id: AssetId,
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

/// Emitted by the prefetcher when a wanted thumbnail finishes preparing.
#[derive(Debug, Clone)]
pub struct ThumbnailReady(pub PreparedThumbnail);
