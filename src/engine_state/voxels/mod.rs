//! # Voxels Module
//!
//! Voxel data storage and the GPU meshing pipeline that keeps a drawable
//! triangle mesh synchronized with it.
//!
//! ## Key Components
//!
//! * `VoxelVolume` - The CPU-side occupancy grid with its dirty flag
//! * `Chunk` - The meshing pipeline: two compute dispatches, the feedback
//!   readback between them, and the grow-only mesh buffers
//! * `feedback` - The GPU counter structures shared between the passes

pub mod chunk;
pub mod feedback;
pub mod volume;

/// The side length of the cubic voxel volume in cells.
pub const CHUNK_DIMENSION: u32 = 80;
/// The side length of one compute work group in cells.
pub const WORK_GROUP_DIMENSION: u32 = 8;
/// The number of sub-regions along each axis of the volume.
pub const SUB_REGIONS_PER_AXIS: u32 = CHUNK_DIMENSION / WORK_GROUP_DIMENSION;
/// The total number of cells in the volume.
pub const CHUNK_VOLUME: usize =
    (CHUNK_DIMENSION * CHUNK_DIMENSION * CHUNK_DIMENSION) as usize;
/// The total number of sub-regions, one feedback slot each.
pub const SUB_REGION_COUNT: usize =
    (SUB_REGIONS_PER_AXIS * SUB_REGIONS_PER_AXIS * SUB_REGIONS_PER_AXIS) as usize;
