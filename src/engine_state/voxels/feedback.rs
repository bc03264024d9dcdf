//! # Feedback Counters
//!
//! GPU-resident counter structures produced by the counting pass. The chunk
//! feedback totals are read back to the CPU to size the mesh buffers; the
//! sub-region feedback array never leaves the GPU and hands each emission
//! work group its reserved offset range.
//!
//! The layouts must match the structs declared in `feedback.wgsl` and
//! `voxelizer.wgsl` field for field.

use bytemuck::{Pod, Zeroable};

/// Whole-volume geometry totals for one regeneration.
///
/// During the counting pass the two fields double as the atomic reservation
/// counters: the previous value returned by each sub-region's fetch-and-add is
/// that sub-region's exclusive offset, and the final value is the total.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct ChunkFeedback {
    /// Total number of vertices the emission pass will write
    pub vertex_count: u32,
    /// Total number of indices the emission pass will write
    pub index_count: u32,
}

/// One sub-region's reserved slice of the shared mesh buffers.
///
/// Offsets are element counts, not bytes. Summed across all sub-regions the
/// ranges tile `[0, total)` for both resources with no gaps or overlap.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, Pod, Zeroable)]
pub struct SubRegionFeedback {
    /// First vertex slot owned by this sub-region
    pub vertex_offset: u32,
    /// Number of vertex slots owned by this sub-region
    pub vertex_count: u32,
    /// First index slot owned by this sub-region
    pub index_offset: u32,
    /// Number of index slots owned by this sub-region
    pub index_count: u32,
}

/// Vertices emitted per exposed face (one quad).
pub const VERTICES_PER_FACE: u32 = 4;
/// Indices emitted per exposed face (two triangles).
pub const INDICES_PER_FACE: u32 = 6;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::volume::VoxelVolume;
    use crate::engine_state::voxels::{
        CHUNK_DIMENSION, SUB_REGIONS_PER_AXIS, SUB_REGION_COUNT, WORK_GROUP_DIMENSION,
    };

    const FACE_DIRECTIONS: [(i64, i64, i64); 6] = [
        (1, 0, 0),
        (-1, 0, 0),
        (0, 1, 0),
        (0, -1, 0),
        (0, 0, 1),
        (0, 0, -1),
    ];

    fn occupied(volume: &VoxelVolume, x: i64, y: i64, z: i64) -> bool {
        let limit = CHUNK_DIMENSION as i64;
        if x < 0 || y < 0 || z < 0 || x >= limit || y >= limit || z >= limit {
            return false;
        }
        volume.voxel(x as u32, y as u32, z as u32) != 0
    }

    fn exposed_faces(volume: &VoxelVolume, x: u32, y: u32, z: u32) -> u32 {
        if volume.voxel(x, y, z) == 0 {
            return 0;
        }

        FACE_DIRECTIONS
            .iter()
            .filter(|(dx, dy, dz)| {
                !occupied(volume, x as i64 + dx, y as i64 + dy, z as i64 + dz)
            })
            .count() as u32
    }

    /// CPU model of the counting pass: per-sub-region face counts turned into
    /// prefix-sum reservations, in sub-region iteration order. The GPU
    /// reserves through atomics in unspecified order, but the totals and the
    /// tiling invariant are identical.
    fn count_pass(volume: &VoxelVolume) -> (ChunkFeedback, Vec<SubRegionFeedback>) {
        let mut totals = ChunkFeedback::default();
        let mut sub_regions = Vec::with_capacity(SUB_REGION_COUNT);

        for gz in 0..SUB_REGIONS_PER_AXIS {
            for gy in 0..SUB_REGIONS_PER_AXIS {
                for gx in 0..SUB_REGIONS_PER_AXIS {
                    let mut faces = 0;
                    for lz in 0..WORK_GROUP_DIMENSION {
                        for ly in 0..WORK_GROUP_DIMENSION {
                            for lx in 0..WORK_GROUP_DIMENSION {
                                faces += exposed_faces(
                                    volume,
                                    gx * WORK_GROUP_DIMENSION + lx,
                                    gy * WORK_GROUP_DIMENSION + ly,
                                    gz * WORK_GROUP_DIMENSION + lz,
                                );
                            }
                        }
                    }

                    let vertex_count = faces * VERTICES_PER_FACE;
                    let index_count = faces * INDICES_PER_FACE;
                    sub_regions.push(SubRegionFeedback {
                        vertex_offset: totals.vertex_count,
                        vertex_count,
                        index_offset: totals.index_count,
                        index_count,
                    });
                    totals.vertex_count += vertex_count;
                    totals.index_count += index_count;
                }
            }
        }

        (totals, sub_regions)
    }

    fn assert_conservation_and_tiling(
        totals: &ChunkFeedback,
        sub_regions: &[SubRegionFeedback],
    ) {
        let vertex_sum: u32 = sub_regions.iter().map(|s| s.vertex_count).sum();
        let index_sum: u32 = sub_regions.iter().map(|s| s.index_count).sum();
        assert_eq!(vertex_sum, totals.vertex_count);
        assert_eq!(index_sum, totals.index_count);

        // In iteration order the ranges must tile [0, total) gap free.
        let mut next_vertex = 0;
        let mut next_index = 0;
        for sub_region in sub_regions {
            assert_eq!(sub_region.vertex_offset, next_vertex);
            assert_eq!(sub_region.index_offset, next_index);
            next_vertex += sub_region.vertex_count;
            next_index += sub_region.index_count;
        }
        assert_eq!(next_vertex, totals.vertex_count);
        assert_eq!(next_index, totals.index_count);
    }

    #[test]
    fn feedback_layouts_match_the_shader_structs() {
        assert_eq!(std::mem::size_of::<ChunkFeedback>(), 8);
        assert_eq!(std::mem::size_of::<SubRegionFeedback>(), 16);
    }

    #[test]
    fn empty_volume_produces_no_geometry() {
        let volume = VoxelVolume::new();

        let (totals, sub_regions) = count_pass(&volume);

        assert_eq!(totals, ChunkFeedback::default());
        assert_conservation_and_tiling(&totals, &sub_regions);
    }

    #[test]
    fn single_center_voxel_exposes_six_faces() {
        let mut volume = VoxelVolume::new();
        volume.set_voxel(40, 40, 40, 1);

        let (totals, sub_regions) = count_pass(&volume);

        assert_eq!(totals.vertex_count, 24);
        assert_eq!(totals.index_count, 36);
        assert_conservation_and_tiling(&totals, &sub_regions);
    }

    #[test]
    fn adjacent_voxels_hide_the_shared_face() {
        let mut volume = VoxelVolume::new();
        volume.set_voxel(40, 40, 40, 1);
        volume.set_voxel(41, 40, 40, 1);

        let (totals, sub_regions) = count_pass(&volume);

        // 12 faces minus the 2 internal ones.
        assert_eq!(totals.vertex_count, 40);
        assert_eq!(totals.index_count, 60);
        assert_conservation_and_tiling(&totals, &sub_regions);
    }

    #[test]
    fn voxels_straddling_a_sub_region_boundary_still_conserve_counts() {
        let mut volume = VoxelVolume::new();
        // 7 and 8 fall into neighboring work groups along x.
        volume.set_voxel(7, 4, 4, 1);
        volume.set_voxel(8, 4, 4, 1);

        let (totals, sub_regions) = count_pass(&volume);

        assert_eq!(totals.vertex_count, 40);
        assert_eq!(totals.index_count, 60);
        assert_conservation_and_tiling(&totals, &sub_regions);
    }

    #[test]
    fn full_volume_exposes_only_the_outer_boundary() {
        let mut volume = VoxelVolume::new();
        for x in 0..CHUNK_DIMENSION {
            for y in 0..CHUNK_DIMENSION {
                for z in 0..CHUNK_DIMENSION {
                    volume.set_voxel(x, y, z, 1);
                }
            }
        }

        let (totals, sub_regions) = count_pass(&volume);

        let boundary_faces = 6 * CHUNK_DIMENSION * CHUNK_DIMENSION;
        assert_eq!(totals.vertex_count, boundary_faces * VERTICES_PER_FACE);
        assert_eq!(totals.index_count, boundary_faces * INDICES_PER_FACE);
        assert_conservation_and_tiling(&totals, &sub_regions);
    }

    #[test]
    fn counting_is_deterministic_for_fixed_voxel_data() {
        let mut volume = VoxelVolume::new();
        fastrand::seed(7);
        volume.fill_random();

        let (first_totals, first_regions) = count_pass(&volume);
        let (second_totals, second_regions) = count_pass(&volume);

        assert_eq!(first_totals, second_totals);
        for (first, second) in first_regions.iter().zip(&second_regions) {
            assert_eq!(bytemuck::bytes_of(first), bytemuck::bytes_of(second));
        }
    }
}
