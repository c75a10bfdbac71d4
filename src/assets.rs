//! Assets and the ordered collection the grid browses.

use std::fmt;
use std::sync::Arc;

/// Stable identity of an asset. Cheap to clone and compare.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AssetId(Arc<str>);

impl AssetId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AssetId {
    fn from(value: &str) -> Self {
        Self(Arc::from(value))
    }
}

impl From<String> for AssetId {
    fn from(value: String) -> Self {
        Self(Arc::from(value))
    }
}

/// Media kind, carried for hosts that badge non-still assets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Photo,
    LivePhoto,
    Video,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Asset {
    pub id: AssetId,
    pub kind: AssetKind,
}

impl Asset {
    pub fn new(id: impl Into<AssetId>, kind: AssetKind) -> Self {
        Self {
            id: id.into(),
            kind,
        }
    }

    pub fn photo(id: impl Into<AssetId>) -> Self {
        Self::new(id, AssetKind::Photo)
    }
}

/// Ordered snapshot of the library.
///
/// Snapshots are replaced wholesale when the library changes; indices are
/// only meaningful against the snapshot they were resolved from, so lookups
/// tolerate anything out of range.
#[derive(Debug, Clone, Default)]
pub struct AssetCollection {
    assets: Arc<[Asset]>,
}

impl AssetCollection {
    pub fn new(assets: Vec<Asset>) -> Self {
        Self {
            assets: assets.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Asset> {
        self.assets.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Asset> {
        self.assets.iter()
    }

    /// Resolve indices to assets, silently dropping anything out of range.
    pub fn assets_at(&self, indices: &[usize]) -> Vec<Asset> {
        indices
            .iter()
            .filter_map(|&index| self.assets.get(index).cloned())
            .collect()
    }
}

impl FromIterator<Asset> for AssetCollection {
    fn from_iter<I: IntoIterator<Item = Asset>>(iter: I) -> Self {
        Self {
            assets: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_range_indices_resolve_to_fewer_assets() {
        let collection = AssetCollection::new(vec![Asset::photo("a"), Asset::photo("b")]);
        assert_eq!(collection.get(0).map(|a| a.id.as_str()), Some("a"));
        assert!(collection.get(2).is_none());

        let resolved = collection.assets_at(&[0, 1, 2, 99]);
        assert_eq!(resolved.len(), 2);
        assert_eq!(resolved[0].id, AssetId::from("a"));
        assert_eq!(resolved[1].id, AssetId::from("b"));
    }

    #[test]
    fn empty_collection_resolves_nothing() {
        let collection = AssetCollection::default();
        assert!(collection.is_empty());
        assert!(collection.assets_at(&[0, 1]).is_empty());
    }
}
