//! Grow-only sizing policy for the shared mesh buffers.
//!
//! Buffers are never sized exactly to content: required byte sizes are rounded
//! up to a fixed granularity so that incremental growth reallocates rarely, and
//! capacity never decreases over the chunk's lifetime.

use crate::engine_state::voxels::feedback::ChunkFeedback;

/// Granularity every mesh buffer allocation is rounded up to.
pub const BUFFER_ALIGNMENT_GRANULARITY: u64 = 32 * 1024 * 1024;

/// Rounds `size` up to the next multiple of `granularity`.
pub fn align_up(size: u64, granularity: u64) -> u64 {
    size.div_ceil(granularity) * granularity
}

/// Current byte capacities of the vertex and index buffers.
///
/// Starts at zero (no buffers exist until the first non-empty regeneration)
/// and only ever grows.
#[derive(Debug, Default, Clone, Copy)]
pub struct MeshCapacity {
    /// Allocated vertex buffer size in bytes
    pub vertex_bytes: u64,
    /// Allocated index buffer size in bytes
    pub index_bytes: u64,
}

/// The reallocation decision for one regeneration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GrowthPlan {
    /// New vertex buffer size, if the vertex buffer must be reallocated
    pub vertex_bytes: Option<u64>,
    /// New index buffer size, if the index buffer must be reallocated
    pub index_bytes: Option<u64>,
}

impl GrowthPlan {
    /// Whether either buffer gets reallocated.
    pub fn reallocates(&self) -> bool {
        self.vertex_bytes.is_some() || self.index_bytes.is_some()
    }
}

impl MeshCapacity {
    /// Plans buffer growth for the given feedback totals and commits the new
    /// capacities.
    ///
    /// A buffer is reallocated only when the required byte size exceeds its
    /// current capacity; the new capacity is the required size aligned up to
    /// [`BUFFER_ALIGNMENT_GRANULARITY`]. Old contents are not preserved, the
    /// emission pass rewrites everything.
    pub fn grow_for(&mut self, feedback: &ChunkFeedback, vertex_stride: u64) -> GrowthPlan {
        let required_vertex_bytes = feedback.vertex_count as u64 * vertex_stride;
        let required_index_bytes = feedback.index_count as u64 * std::mem::size_of::<u32>() as u64;

        let mut plan = GrowthPlan {
            vertex_bytes: None,
            index_bytes: None,
        };

        if required_vertex_bytes > self.vertex_bytes {
            self.vertex_bytes = align_up(required_vertex_bytes, BUFFER_ALIGNMENT_GRANULARITY);
            plan.vertex_bytes = Some(self.vertex_bytes);
        }

        if required_index_bytes > self.index_bytes {
            self.index_bytes = align_up(required_index_bytes, BUFFER_ALIGNMENT_GRANULARITY);
            plan.index_bytes = Some(self.index_bytes);
        }

        plan
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feedback(vertex_count: u32, index_count: u32) -> ChunkFeedback {
        ChunkFeedback {
            vertex_count,
            index_count,
        }
    }

    #[test]
    fn align_up_rounds_to_the_granularity() {
        assert_eq!(align_up(0, BUFFER_ALIGNMENT_GRANULARITY), 0);
        assert_eq!(align_up(1, BUFFER_ALIGNMENT_GRANULARITY), BUFFER_ALIGNMENT_GRANULARITY);
        assert_eq!(
            align_up(BUFFER_ALIGNMENT_GRANULARITY, BUFFER_ALIGNMENT_GRANULARITY),
            BUFFER_ALIGNMENT_GRANULARITY
        );
        assert_eq!(
            align_up(BUFFER_ALIGNMENT_GRANULARITY + 1, BUFFER_ALIGNMENT_GRANULARITY),
            2 * BUFFER_ALIGNMENT_GRANULARITY
        );
    }

    #[test]
    fn empty_feedback_allocates_nothing() {
        let mut capacity = MeshCapacity::default();

        let plan = capacity.grow_for(&feedback(0, 0), 32);

        assert!(!plan.reallocates());
        assert_eq!(capacity.vertex_bytes, 0);
        assert_eq!(capacity.index_bytes, 0);
    }

    #[test]
    fn first_growth_allocates_one_granule() {
        let mut capacity = MeshCapacity::default();

        let plan = capacity.grow_for(&feedback(24, 36), 32);

        assert_eq!(plan.vertex_bytes, Some(BUFFER_ALIGNMENT_GRANULARITY));
        assert_eq!(plan.index_bytes, Some(BUFFER_ALIGNMENT_GRANULARITY));
    }

    #[test]
    fn capacity_is_monotonic_and_granularity_aligned() {
        let mut capacity = MeshCapacity::default();
        let mut previous = MeshCapacity::default();

        // Grow, shrink, grow again: capacity must never decrease.
        for &vertex_count in &[1_000_000u32, 10, 4_000_000, 100, 4_000_000] {
            capacity.grow_for(&feedback(vertex_count, vertex_count / 4 * 6), 32);

            assert!(capacity.vertex_bytes >= previous.vertex_bytes);
            assert!(capacity.index_bytes >= previous.index_bytes);
            assert_eq!(capacity.vertex_bytes % BUFFER_ALIGNMENT_GRANULARITY, 0);
            assert_eq!(capacity.index_bytes % BUFFER_ALIGNMENT_GRANULARITY, 0);
            previous = capacity;
        }
    }

    #[test]
    fn no_reallocation_while_content_fits() {
        let mut capacity = MeshCapacity::default();
        capacity.grow_for(&feedback(1_000_000, 1_500_000), 32);

        let plan = capacity.grow_for(&feedback(500_000, 750_000), 32);

        assert!(!plan.reallocates());
    }

    #[test]
    fn buffers_grow_independently() {
        let mut capacity = MeshCapacity::default();
        capacity.grow_for(&feedback(1_000_000, 10), 32);

        // Index demand now outgrows its buffer while vertices still fit.
        let plan = capacity.grow_for(&feedback(1_000_000, 12_000_000), 32);

        assert_eq!(plan.vertex_bytes, None);
        assert!(plan.index_bytes.is_some());
    }
}
