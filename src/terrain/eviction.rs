use std::num::NonZeroUsize;

use lru::LruCache;

use crate::terrain::tile::TileCoord;

/// Decides whether the tile cache may drop entries. The reference behavior is
/// to never evict: memory is bounded by the distinct coordinates ever
/// visited, and revisits are free. The policy seam exists so a bounded cache
/// can be swapped in without touching the manager's streaming logic.
pub trait EvictionPolicy: Send {
    /// Record that `coord` is in the current visible window. Returns a
    /// coordinate the policy wants evicted, if its capacity is exceeded. The
    /// manager still refuses to drop tiles that are visible or have work in
    /// flight.
    fn note_visible(&mut self, coord: TileCoord) -> Option<TileCoord>;
}

/// The reference policy: tiles persist once generated.
pub struct NeverEvict;

impl EvictionPolicy for NeverEvict {
    fn note_visible(&mut self, _coord: TileCoord) -> Option<TileCoord> {
        None
    }
}

/// Bounded cache: evicts the least-recently-visible coordinate once more than
/// `capacity` distinct tiles have been touched.
pub struct LruEviction {
    cache: LruCache<TileCoord, ()>,
}

impl LruEviction {
    pub fn new(capacity: NonZeroUsize) -> LruEviction {
        LruEviction {
            cache: LruCache::new(capacity),
        }
    }
}

impl EvictionPolicy for LruEviction {
    fn note_visible(&mut self, coord: TileCoord) -> Option<TileCoord> {
        self.cache
            .push(coord, ())
            .map(|(old, _)| old)
            .filter(|&old| old != coord)
    }
}
