//! Folder-backed photo library with explicit change subscription.

use std::collections::BTreeMap;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tracing::{debug, info, instrument};
use walkdir::WalkDir;

use crate::assets::{Asset, AssetCollection, AssetKind};
use crate::error::Error;

/// One change pass over the library, in terms the grid can apply.
///
/// `removed` and `changed` index the pre-change collection; `inserted`
/// indexes `after`.
#[derive(Debug, Clone)]
pub struct ChangeDetails {
    pub after: AssetCollection,
    pub removed: Vec<usize>,
    pub inserted: Vec<usize>,
    pub changed: Vec<usize>,
    pub has_incremental_changes: bool,
    pub has_moves: bool,
}

impl ChangeDetails {
    /// A non-incremental replacement; consumers fall back to a full reload.
    pub fn reload(after: AssetCollection) -> Self {
        Self {
            after,
            removed: Vec::new(),
            inserted: Vec::new(),
            changed: Vec::new(),
            has_incremental_changes: false,
            has_moves: false,
        }
    }
}

pub type ChangeHandler = Box<dyn FnMut(&ChangeDetails)>;

/// Token returned by [`PhotoLibrary::subscribe`]; hand it back to
/// [`PhotoLibrary::unsubscribe`] to stop delivery.
#[derive(Debug, PartialEq, Eq)]
pub struct Subscription(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FileStamp {
    modified: SystemTime,
    len: u64,
}

/// Photo library rooted at a directory.
///
/// Assets are ordered by path so the grid sees a stable index space between
/// rescans. Change handlers run synchronously on the thread that calls
/// [`rescan`](Self::rescan); callers marshal that onto the same thread that
/// drives viewport updates.
pub struct PhotoLibrary {
    root: PathBuf,
    snapshot: BTreeMap<PathBuf, FileStamp>,
    collection: AssetCollection,
    subscribers: Vec<(u64, ChangeHandler)>,
    next_subscriber: u64,
}

impl std::fmt::Debug for PhotoLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhotoLibrary")
            .field("root", &self.root)
            .field("snapshot", &self.snapshot)
            .field("collection", &self.collection)
            .field("subscriber_count", &self.subscribers.len())
            .field("next_subscriber", &self.next_subscriber)
            .finish()
    }
}

impl PhotoLibrary {
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, Error> {
        let root = root.into();
        if !root.is_dir() {
            return Err(Error::BadLibraryRoot(root.display().to_string()));
        }
        Ok(Self {
            root,
            snapshot: BTreeMap::new(),
            collection: AssetCollection::default(),
            subscribers: Vec::new(),
            next_subscriber: 0,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The collection produced by the most recent scan or rescan.
    pub fn collection(&self) -> &AssetCollection {
        &self.collection
    }

    /// Walk the root and build the initial collection.
    #[instrument(skip(self), fields(root = %self.root.display()))]
    pub fn scan(&mut self) -> AssetCollection {
        self.snapshot = self.walk();
        self.collection = collection_from(&self.snapshot);
        info!(assets = self.collection.len(), "library scan complete");
        self.collection.clone()
    }

    /// Re-walk the root, notify subscribers of what changed, and return the
    /// change details.
    pub fn rescan(&mut self) -> ChangeDetails {
        let fresh = self.walk();

        let mut removed = Vec::new();
        let mut changed = Vec::new();
        for (index, (path, stamp)) in self.snapshot.iter().enumerate() {
            match fresh.get(path) {
                None => removed.push(index),
                Some(new_stamp) if new_stamp != stamp => changed.push(index),
                Some(_) => {}
            }
        }
        let inserted: Vec<usize> = fresh
            .keys()
            .enumerate()
            .filter(|(_, path)| !self.snapshot.contains_key(*path))
            .map(|(index, _)| index)
            .collect();

        self.snapshot = fresh;
        self.collection = collection_from(&self.snapshot);

        let details = ChangeDetails {
            after: self.collection.clone(),
            removed,
            inserted,
            changed,
            has_incremental_changes: true,
            has_moves: false,
        };
        debug!(
            removed = details.removed.len(),
            inserted = details.inserted.len(),
            changed = details.changed.len(),
            "library rescan"
        );

        for (_, handler) in &mut self.subscribers {
            handler(&details);
        }
        details
    }

    /// Register for change delivery.
    pub fn subscribe(&mut self, handler: ChangeHandler) -> Subscription {
        let id = self.next_subscriber;
        self.next_subscriber += 1;
        self.subscribers.push((id, handler));
        Subscription(id)
    }

    pub fn unsubscribe(&mut self, subscription: Subscription) {
        self.subscribers.retain(|(id, _)| *id != subscription.0);
    }

    fn walk(&self) -> BTreeMap<PathBuf, FileStamp> {
        let mut found = BTreeMap::new();
        for entry in WalkDir::new(&self.root)
            .follow_links(true)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_file())
        {
            let path = entry.path().to_path_buf();
            if kind_of(&path).is_none() {
                continue;
            }
            let Ok(metadata) = entry.metadata() else {
                continue;
            };
            let stamp = FileStamp {
                modified: metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH),
                len: metadata.len(),
            };
            found.insert(path, stamp);
        }
        found
    }
}

fn collection_from(snapshot: &BTreeMap<PathBuf, FileStamp>) -> AssetCollection {
    snapshot
        .keys()
        .filter_map(|path| {
            let kind = kind_of(path)?;
            Some(Asset::new(path.to_string_lossy().into_owned(), kind))
        })
        .collect()
}

fn kind_of(path: &Path) -> Option<AssetKind> {
    let ext = path.extension().and_then(OsStr::to_str)?.to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" | "png" | "webp" | "gif" => Some(AssetKind::Photo),
        "mov" | "mp4" => Some(AssetKind::Video),
        _ => None,
    }
}
