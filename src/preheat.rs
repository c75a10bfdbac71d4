//! Viewport-driven maintenance of the thumbnail precache window.
//!
//! The window trails the visible viewport: twice the viewport's height,
//! vertically centered on it. Only moves larger than a third of the
//! viewport height recompute the window; the symmetric difference between
//! the committed window and the new one then tells the cache which assets
//! to start or stop preparing, without rescanning the whole collection.

use tracing::{debug, trace};

use crate::assets::{Asset, AssetCollection};
use crate::cache::{RequestOptions, ThumbnailCache};
use crate::geometry::{Rect, vertical_difference};
use crate::layout::RegionResolver;

pub struct PreheatWindow {
    options: RequestOptions,
    previous: Rect,
}

impl PreheatWindow {
    pub fn new(options: RequestOptions) -> Self {
        Self {
            options,
            previous: Rect::ZERO,
        }
    }

    pub fn options(&self) -> RequestOptions {
        self.options
    }

    /// The committed window from the last completed pass; zero until one
    /// runs, and again after every [`reset`](Self::reset).
    pub fn previous_region(&self) -> Rect {
        self.previous
    }

    /// Evict the whole cache and forget the committed window. Safe to call
    /// redundantly.
    pub fn reset(&mut self, cache: &mut dyn ThumbnailCache) {
        cache.stop_caching_all();
        self.previous = Rect::ZERO;
    }

    /// Recompute the precache window for a new viewport position.
    ///
    /// Does nothing while the hosting surface is off screen, and nothing
    /// for moves within a third of the viewport height of the committed
    /// window. Otherwise issues at most one start and one stop call and
    /// commits the new window.
    pub fn update(
        &mut self,
        viewport: Rect,
        on_screen: bool,
        resolver: &dyn RegionResolver,
        assets: &AssetCollection,
        cache: &mut dyn ThumbnailCache,
    ) {
        if !on_screen {
            return;
        }

        // The preheat window is twice the height of the visible rect.
        let preheat = viewport.expanded_vertically(viewport.height / 2.0);

        let delta = (preheat.mid_y() - self.previous.mid_y()).abs();
        if delta <= viewport.height / 3.0 {
            trace!(delta, "viewport move below preheat threshold");
            return;
        }

        let diff = vertical_difference(&self.previous, &preheat);
        let to_start = resolve(&diff.added, resolver, assets);
        let to_stop = resolve(&diff.removed, resolver, assets);

        debug!(
            start = to_start.len(),
            stop = to_stop.len(),
            window_y = preheat.y,
            window_height = preheat.height,
            "preheat window moved"
        );

        if !to_start.is_empty() {
            cache.start_caching(&to_start, self.options);
        }
        if !to_stop.is_empty() {
            cache.stop_caching(&to_stop, self.options);
        }

        self.previous = preheat;
    }
}

fn resolve(
    strips: &[Rect],
    resolver: &dyn RegionResolver,
    assets: &AssetCollection,
) -> Vec<Asset> {
    let mut out = Vec::new();
    for strip in strips {
        if strip.is_empty() {
            continue;
        }
        out.extend(assets.assets_at(&resolver.indices_in(strip)));
    }
    out
}
