//! Spatial hash grid over the painting plane.
//!
//! Buckets particle slots by truncated-division cell coordinates, cell size
//! equal to the nominal particle radius. Keys collapse the two cell
//! coordinates into a single `i64` with a row stride wide enough that the x
//! component never bleeds into the z component for any reachable canvas.

use std::collections::HashMap;

/// Row stride of the packed cell key.
pub const HASH_STRIDE: i64 = 1024;

/// Offsets of the 3x3 cell neighborhood in packed-key space.
const NEIGHBOR_DELTAS: [i64; 9] = [
    0,
    -1,
    1,
    -HASH_STRIDE,
    HASH_STRIDE,
    -HASH_STRIDE - 1,
    -HASH_STRIDE + 1,
    HASH_STRIDE - 1,
    HASH_STRIDE + 1,
];

/// Hash grid mapping packed cell keys to the particle slots inside the cell.
///
/// Buckets are created lazily as particles wander into new cells and are all
/// dropped at once on [`clear`](Self::clear).
pub struct SpatialHash {
    inv_cell: f32,
    cell_size: f32,
    buckets: HashMap<i64, Vec<u32>>,
}

impl SpatialHash {
    pub fn new(cell_size: f32) -> Self {
        Self {
            inv_cell: 1.0 / cell_size,
            cell_size,
            buckets: HashMap::new(),
        }
    }

    #[inline]
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Packed cell key for a planar position.
    #[inline]
    pub fn key(&self, x: f32, z: f32) -> i64 {
        (z * self.inv_cell).floor() as i64 * HASH_STRIDE + (x * self.inv_cell).floor() as i64
    }

    /// The 9 keys of a cell and its neighbors.
    #[inline]
    pub fn neighbor_keys(key: i64) -> [i64; 9] {
        NEIGHBOR_DELTAS.map(|d| key + d)
    }

    /// Slots bucketed under `key`; empty if the cell was never touched.
    #[inline]
    pub fn bucket(&self, key: i64) -> &[u32] {
        self.buckets.get(&key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// File a slot under `key`.
    pub fn insert(&mut self, slot: u32, key: i64) {
        self.buckets.entry(key).or_default().push(slot);
    }

    /// Remove a slot from the bucket it was filed under.
    ///
    /// A slot missing from its recorded bucket means a caller bypassed the
    /// grid contract; that is a programming error, not a runtime condition.
    pub fn remove(&mut self, slot: u32, key: i64) -> bool {
        if let Some(bucket) = self.buckets.get_mut(&key) {
            if let Some(i) = bucket.iter().position(|&s| s == slot) {
                bucket.swap_remove(i);
                return true;
            }
        }
        debug_assert!(false, "slot {} missing from bucket {}", slot, key);
        log::warn!("spatial hash inconsistency: slot {} not in bucket {}", slot, key);
        false
    }

    /// Move a slot between buckets after its cell changed.
    pub fn migrate(&mut self, slot: u32, old_key: i64, new_key: i64) {
        if old_key == new_key {
            return;
        }
        // Tolerates the inconsistent case in release by re-filing the slot.
        self.remove(slot, old_key);
        self.insert(slot, new_key);
    }

    /// Drop all buckets at once.
    pub fn clear(&mut self) {
        self.buckets = HashMap::new();
    }

    #[cfg(test)]
    fn bucket_count(&self) -> usize {
        self.buckets.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_packs_rows_without_collision() {
        let grid = SpatialHash::new(32.0);
        // Same cell.
        assert_eq!(grid.key(0.0, 0.0), grid.key(31.9, 31.9));
        // Next column and next row differ by exactly one delta.
        assert_eq!(grid.key(32.0, 0.0), grid.key(0.0, 0.0) + 1);
        assert_eq!(grid.key(0.0, 32.0), grid.key(0.0, 0.0) + HASH_STRIDE);
        // Negative coordinates truncate toward negative infinity.
        assert_eq!(grid.key(-0.1, 0.0), grid.key(0.0, 0.0) - 1);
    }

    #[test]
    fn test_neighbor_keys_are_distinct_and_centered() {
        let keys = SpatialHash::neighbor_keys(5000);
        assert!(keys.contains(&5000));
        for (i, a) in keys.iter().enumerate() {
            for b in &keys[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_insert_migrate_remove_round_trip() {
        let mut grid = SpatialHash::new(32.0);
        let k0 = grid.key(10.0, 10.0);
        grid.insert(7, k0);
        assert_eq!(grid.bucket(k0), &[7]);

        // Migrating within the same cell is a no-op.
        grid.migrate(7, k0, k0);
        assert_eq!(grid.bucket(k0), &[7]);

        let k1 = grid.key(40.0, 10.0);
        grid.migrate(7, k0, k1);
        assert!(grid.bucket(k0).is_empty());
        assert_eq!(grid.bucket(k1), &[7]);

        assert!(grid.remove(7, k1));
        assert!(grid.bucket(k1).is_empty());
    }

    #[test]
    fn test_clear_drops_all_buckets() {
        let mut grid = SpatialHash::new(32.0);
        for i in 0..20 {
            let key = grid.key(i as f32 * 40.0, 0.0);
            grid.insert(i, key);
        }
        assert!(grid.bucket_count() > 0);
        grid.clear();
        assert_eq!(grid.bucket_count(), 0);
    }

    #[test]
    #[should_panic(expected = "missing from bucket")]
    #[cfg(debug_assertions)]
    fn test_remove_of_unfiled_slot_asserts_in_debug() {
        let mut grid = SpatialHash::new(32.0);
        grid.remove(3, 0);
    }
}
