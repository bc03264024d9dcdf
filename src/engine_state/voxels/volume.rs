//! # Voxel Volume
//!
//! The CPU-side occupancy grid. The volume is the single writable authority
//! for voxel data; the meshing pipeline uploads it to a read-only GPU storage
//! buffer at the start of each regeneration. A dirty flag tracks whether the
//! mesh still reflects the stored cells.
//!
//! ## Invariants
//!
//! * Cells are linearized as `x + N * (y + N * z)` with `N = CHUNK_DIMENSION`,
//!   matching the indexing in the compute shaders.
//! * Out-of-range writes are silent no-ops, never faults.
//! * The dirty flag is only raised by writes that actually change a cell.

use super::{CHUNK_DIMENSION, CHUNK_VOLUME};

/// A cubic grid of binary occupancy values.
///
/// Allocated once, zero-initialized, and mutated in place through
/// [`VoxelVolume::set_voxel`]. Any value other than zero counts as occupied.
pub struct VoxelVolume {
    /// One unsigned occupancy value per cell, in linearized order
    cells: Vec<u32>,
    /// Whether the cells have changed since the mesh was last regenerated
    dirty: bool,
}

impl VoxelVolume {
    /// Creates an empty, clean volume.
    pub fn new() -> Self {
        Self {
            cells: vec![0; CHUNK_VOLUME],
            dirty: false,
        }
    }

    /// Writes one cell.
    ///
    /// Coordinates with any component `>= CHUNK_DIMENSION` are ignored.
    /// Writing the value a cell already holds leaves the dirty flag untouched,
    /// so redundant writes never trigger a regeneration.
    pub fn set_voxel(&mut self, x: u32, y: u32, z: u32, value: u32) {
        if x >= CHUNK_DIMENSION || y >= CHUNK_DIMENSION || z >= CHUNK_DIMENSION {
            return;
        }

        let index = (x + CHUNK_DIMENSION * (y + CHUNK_DIMENSION * z)) as usize;
        if self.cells[index] != value {
            self.cells[index] = value;
            self.dirty = true;
        }
    }

    /// Reads one cell, treating out-of-range coordinates as empty.
    pub fn voxel(&self, x: u32, y: u32, z: u32) -> u32 {
        if x >= CHUNK_DIMENSION || y >= CHUNK_DIMENSION || z >= CHUNK_DIMENSION {
            return 0;
        }

        self.cells[(x + CHUNK_DIMENSION * (y + CHUNK_DIMENSION * z)) as usize]
    }

    /// Refills every cell with a random binary occupancy value.
    pub fn fill_random(&mut self) {
        for x in 0..CHUNK_DIMENSION {
            for y in 0..CHUNK_DIMENSION {
                for z in 0..CHUNK_DIMENSION {
                    self.set_voxel(x, y, z, fastrand::u32(..) % 2);
                }
            }
        }
    }

    /// Whether the mesh no longer reflects the stored cells.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Lowers the dirty flag.
    ///
    /// Called at the start of regeneration, before the counting pass, so a
    /// mutation arriving during regeneration re-dirties the volume instead of
    /// being lost.
    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    /// The raw cell data in upload order.
    pub fn cells(&self) -> &[u32] {
        &self.cells
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_volume_is_empty_and_clean() {
        let volume = VoxelVolume::new();

        assert!(!volume.is_dirty());
        assert!(volume.cells().iter().all(|&cell| cell == 0));
    }

    #[test]
    fn set_voxel_uses_linearized_indexing() {
        let mut volume = VoxelVolume::new();

        volume.set_voxel(3, 5, 7, 1);

        let index = (3 + CHUNK_DIMENSION * (5 + CHUNK_DIMENSION * 7)) as usize;
        assert_eq!(volume.cells()[index], 1);
        assert_eq!(volume.voxel(3, 5, 7), 1);
    }

    #[test]
    fn out_of_range_writes_are_silent_no_ops() {
        let mut volume = VoxelVolume::new();

        volume.set_voxel(CHUNK_DIMENSION, 0, 0, 1);
        volume.set_voxel(0, CHUNK_DIMENSION, 0, 1);
        volume.set_voxel(0, 0, u32::MAX, 1);

        assert!(!volume.is_dirty());
        assert!(volume.cells().iter().all(|&cell| cell == 0));
    }

    #[test]
    fn only_changed_values_raise_the_dirty_flag() {
        let mut volume = VoxelVolume::new();

        volume.set_voxel(1, 1, 1, 0);
        assert!(!volume.is_dirty());

        volume.set_voxel(1, 1, 1, 1);
        assert!(volume.is_dirty());

        volume.clear_dirty();
        volume.set_voxel(1, 1, 1, 1);
        assert!(!volume.is_dirty());

        volume.set_voxel(1, 1, 1, 0);
        assert!(volume.is_dirty());
    }

    #[test]
    fn clear_dirty_keeps_cell_data() {
        let mut volume = VoxelVolume::new();

        volume.set_voxel(2, 2, 2, 1);
        volume.clear_dirty();

        assert_eq!(volume.voxel(2, 2, 2), 1);
        assert!(!volume.is_dirty());
    }
}
