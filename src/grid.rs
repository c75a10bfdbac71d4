//! The collection-facing half of a photo grid, minus the UI.

use tracing::info;

use crate::assets::{AssetCollection, AssetId};
use crate::cache::{RequestOptions, ThumbnailCache};
use crate::events::PreparedThumbnail;
use crate::geometry::Rect;
use crate::layout::GridLayout;
use crate::library::ChangeDetails;
use crate::preheat::PreheatWindow;

/// How the hosting view should refresh after a library change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshPlan {
    /// Wholesale reload; the diff was not expressible incrementally.
    Reload,
    /// Animate per-index updates. `removed` and `changed` index the
    /// pre-change collection, `inserted` the post-change collection.
    Incremental {
        removed: Vec<usize>,
        inserted: Vec<usize>,
        changed: Vec<usize>,
    },
}

/// Drives precaching for one scrollable grid over one asset collection.
///
/// The host surface forwards scroll and visibility state; the library feeds
/// change details. Callers serialize both onto one thread, conventionally
/// the one driving the surface.
pub struct GridController<C> {
    layout: GridLayout,
    collection: AssetCollection,
    window: PreheatWindow,
    cache: C,
}

impl<C: ThumbnailCache> GridController<C> {
    pub fn new(
        layout: GridLayout,
        collection: AssetCollection,
        options: RequestOptions,
        mut cache: C,
    ) -> Self {
        let mut window = PreheatWindow::new(options);
        window.reset(&mut cache);
        Self {
            layout,
            collection,
            window,
            cache,
        }
    }

    pub fn layout(&self) -> &GridLayout {
        &self.layout
    }

    pub fn collection(&self) -> &AssetCollection {
        &self.collection
    }

    pub fn request_options(&self) -> RequestOptions {
        self.window.options()
    }

    /// Forward a scroll or layout pass from the host surface.
    pub fn viewport_changed(&mut self, viewport: Rect, on_screen: bool) {
        self.window.update(
            viewport,
            on_screen,
            &self.layout,
            &self.collection,
            &mut self.cache,
        );
    }

    /// Drop every cached thumbnail and start over from a zero window.
    pub fn reset(&mut self) {
        self.window.reset(&mut self.cache);
    }

    /// Swap in the post-change collection and decide how the host should
    /// refresh. The precache window restarts from scratch either way; the
    /// next viewport pass repopulates it against the new index space.
    pub fn apply_change(&mut self, change: &ChangeDetails) -> RefreshPlan {
        self.collection = change.after.clone();

        let plan = if !change.has_incremental_changes || change.has_moves {
            RefreshPlan::Reload
        } else {
            RefreshPlan::Incremental {
                removed: change.removed.clone(),
                inserted: change.inserted.clone(),
                changed: change.changed.clone(),
            }
        };

        info!(
            assets = self.collection.len(),
            incremental = matches!(plan, RefreshPlan::Incremental { .. }),
            "library change applied"
        );
        self.window.reset(&mut self.cache);
        plan
    }
}

/// One grid cell's thumbnail holder.
///
/// Prefetch results arrive out of order, so a slot only accepts the
/// thumbnail for the asset it is currently bound to; a recycled cell never
/// shows a predecessor's image.
#[derive(Debug, Default)]
pub struct ThumbnailSlot {
    bound: Option<AssetId>,
    thumbnail: Option<PreparedThumbnail>,
}

impl ThumbnailSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind the slot to an asset, discarding any previous image.
    pub fn prepare_for(&mut self, id: AssetId) {
        self.bound = Some(id);
        self.thumbnail = None;
    }

    pub fn bound_id(&self) -> Option<&AssetId> {
        self.bound.as_ref()
    }

    /// Accept `thumbnail` only if it belongs to the bound asset.
    pub fn present(&mut self, thumbnail: PreparedThumbnail) -> bool {
        if self.bound.as_ref() == Some(&thumbnail.id) {
            self.thumbnail = Some(thumbnail);
            true
        } else {
            false
        }
    }

    pub fn thumbnail(&self) -> Option<&PreparedThumbnail> {
        self.thumbnail.as_ref()
    }
}
