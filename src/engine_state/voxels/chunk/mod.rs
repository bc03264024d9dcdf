//! GPU-resident chunk state and the mesh regeneration sequence.
//!
//! A [`Chunk`] owns the CPU voxel volume, its GPU mirror, the feedback
//! buffers used by the counting pass, and the mesh output buffers written by
//! the emission pass. Regeneration is driven lazily from [`Chunk::prepare`]:
//! nothing happens while the volume is clean, and a dirty volume triggers the
//! full two-pass compile before the next draw.
//!
//! # Regeneration sequence
//!
//! 1. Clear the dirty flag, then upload the voxel mirror and zero the
//!    whole-chunk feedback counters.
//! 2. Dispatch the counting pass and copy the resulting totals to a staging
//!    buffer in the same submission.
//! 3. Map the staging buffer and block on the device until the totals are
//!    readable on the CPU.
//! 4. Grow the vertex/index buffers if the totals exceed their capacity, and
//!    rebuild the mesh bind group whenever a buffer was replaced.
//! 5. Dispatch the emission pass, which fills the reserved ranges.
//!
//! An empty mesh (zero indices) skips steps 4 and 5 entirely; existing
//! buffers are kept at their current capacity and the renderer skips the
//! draw based on the cached index count.

pub mod capacity;

use wgpu::util::DeviceExt;

use crate::engine_state::rendering::meshing::MeshingPipelines;
use crate::engine_state::rendering::vertex::Vertex;
use crate::engine_state::voxels::feedback::ChunkFeedback;
use crate::engine_state::voxels::volume::VoxelVolume;
use crate::engine_state::voxels::{SUB_REGIONS_PER_AXIS, SUB_REGION_COUNT};

use capacity::MeshCapacity;

/// One cubic voxel chunk with its GPU meshing state.
pub struct Chunk {
    volume: VoxelVolume,
    /// Latest totals read back from the counting pass
    feedback: ChunkFeedback,
    capacity: MeshCapacity,

    voxel_buffer: wgpu::Buffer,
    chunk_feedback_buffer: wgpu::Buffer,
    feedback_staging_buffer: wgpu::Buffer,
    sub_region_feedback_buffer: wgpu::Buffer,

    /// Allocated on first non-empty regeneration, grow-only afterwards
    vertex_buffer: Option<wgpu::Buffer>,
    index_buffer: Option<wgpu::Buffer>,

    feedback_bind_group: wgpu::BindGroup,
    /// Rebuilt whenever a mesh buffer is reallocated
    mesh_bind_group: Option<wgpu::BindGroup>,
}

impl Chunk {
    /// Creates a chunk with an empty volume and no mesh buffers.
    ///
    /// The volume, feedback and sub-region buffers are fixed-size and live
    /// for the lifetime of the chunk; only the mesh output buffers are
    /// allocated on demand.
    pub fn new(device: &wgpu::Device, pipelines: &MeshingPipelines) -> Self {
        let volume = VoxelVolume::new();

        let voxel_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Chunk Voxel Buffer"),
            contents: bytemuck::cast_slice(volume.cells()),
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
        });

        let chunk_feedback_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Chunk Feedback Buffer"),
            size: std::mem::size_of::<ChunkFeedback>() as u64,
            usage: wgpu::BufferUsages::STORAGE
                | wgpu::BufferUsages::COPY_DST
                | wgpu::BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        });

        let feedback_staging_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Chunk Feedback Staging Buffer"),
            size: std::mem::size_of::<ChunkFeedback>() as u64,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let sub_region_feedback_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Sub Region Feedback Buffer"),
            size: (SUB_REGION_COUNT * 4 * std::mem::size_of::<u32>()) as u64,
            usage: wgpu::BufferUsages::STORAGE,
            mapped_at_creation: false,
        });

        let feedback_bind_group = pipelines.create_feedback_bind_group(
            device,
            &voxel_buffer,
            &chunk_feedback_buffer,
            &sub_region_feedback_buffer,
        );

        Self {
            volume,
            feedback: ChunkFeedback::default(),
            capacity: MeshCapacity::default(),
            voxel_buffer,
            chunk_feedback_buffer,
            feedback_staging_buffer,
            sub_region_feedback_buffer,
            vertex_buffer: None,
            index_buffer: None,
            feedback_bind_group,
            mesh_bind_group: None,
        }
    }

    pub fn set_voxel(&mut self, x: u32, y: u32, z: u32, value: u32) {
        self.volume.set_voxel(x, y, z, value);
    }

    /// Refills the whole volume with uniform random occupancy.
    pub fn fill_random(&mut self) {
        self.volume.fill_random();
    }

    /// Compiles the mesh if the volume changed since the last call.
    ///
    /// Blocks on the device once per regeneration to read back the counting
    /// pass totals; this is the synchronization point that lets the CPU size
    /// the output buffers before the emission pass runs.
    pub fn prepare(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        pipelines: &MeshingPipelines,
    ) {
        if !self.volume.is_dirty() {
            return;
        }
        // Cleared up front so edits landing mid-regeneration mark the volume
        // dirty again and get picked up by the next prepare.
        self.volume.clear_dirty();

        queue.write_buffer(&self.voxel_buffer, 0, bytemuck::cast_slice(self.volume.cells()));
        queue.write_buffer(
            &self.chunk_feedback_buffer,
            0,
            bytemuck::bytes_of(&ChunkFeedback::default()),
        );

        let dispatch = (
            SUB_REGIONS_PER_AXIS,
            SUB_REGIONS_PER_AXIS,
            SUB_REGIONS_PER_AXIS,
        );

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Counting Encoder"),
        });
        pipelines.encode_counting_pass(&mut encoder, &self.feedback_bind_group, dispatch);
        encoder.copy_buffer_to_buffer(
            &self.chunk_feedback_buffer,
            0,
            &self.feedback_staging_buffer,
            0,
            std::mem::size_of::<ChunkFeedback>() as u64,
        );
        queue.submit(Some(encoder.finish()));

        self.feedback = self.read_feedback(device);
        log::debug!(
            "Chunk regeneration counted {} vertices / {} indices",
            self.feedback.vertex_count,
            self.feedback.index_count
        );

        if self.feedback.index_count == 0 {
            return;
        }

        self.ensure_mesh_buffers(device, pipelines);

        let mesh_bind_group = self
            .mesh_bind_group
            .as_ref()
            .expect("mesh bind group exists after ensure_mesh_buffers");

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Emission Encoder"),
        });
        pipelines.encode_emission_pass(
            &mut encoder,
            &self.feedback_bind_group,
            mesh_bind_group,
            dispatch,
        );
        queue.submit(Some(encoder.finish()));
    }

    /// Maps the staging buffer and reads the counting pass totals.
    fn read_feedback(&self, device: &wgpu::Device) -> ChunkFeedback {
        let slice = self.feedback_staging_buffer.slice(..);
        slice.map_async(wgpu::MapMode::Read, |_| {});
        device.poll(wgpu::PollType::Wait).unwrap();

        let feedback = {
            let view = slice.get_mapped_range();
            *bytemuck::from_bytes::<ChunkFeedback>(&view)
        };
        self.feedback_staging_buffer.unmap();
        feedback
    }

    /// Grows the mesh buffers to fit the latest totals and rebuilds the mesh
    /// bind group when any buffer identity changed.
    fn ensure_mesh_buffers(&mut self, device: &wgpu::Device, pipelines: &MeshingPipelines) {
        let vertex_stride = std::mem::size_of::<Vertex>() as u64;
        let plan = self.capacity.grow_for(&self.feedback, vertex_stride);

        if let Some(vertex_bytes) = plan.vertex_bytes {
            log::debug!("Reallocating chunk vertex buffer to {vertex_bytes} bytes");
            self.vertex_buffer = Some(device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("Chunk Vertex Buffer"),
                size: vertex_bytes,
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::STORAGE,
                mapped_at_creation: false,
            }));
        }
        if let Some(index_bytes) = plan.index_bytes {
            log::debug!("Reallocating chunk index buffer to {index_bytes} bytes");
            self.index_buffer = Some(device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("Chunk Index Buffer"),
                size: index_bytes,
                usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::STORAGE,
                mapped_at_creation: false,
            }));
        }

        if plan.reallocates() || self.mesh_bind_group.is_none() {
            let (Some(vertex_buffer), Some(index_buffer)) =
                (self.vertex_buffer.as_ref(), self.index_buffer.as_ref())
            else {
                return;
            };
            self.mesh_bind_group =
                Some(pipelines.create_mesh_bind_group(device, vertex_buffer, index_buffer));
        }
    }

    /// Number of indices the current mesh draws with. Zero means the mesh is
    /// empty and there is nothing to draw.
    pub fn index_count(&self) -> u32 {
        self.feedback.index_count
    }

    pub fn vertex_buffer(&self) -> Option<&wgpu::Buffer> {
        self.vertex_buffer.as_ref()
    }

    pub fn index_buffer(&self) -> Option<&wgpu::Buffer> {
        self.index_buffer.as_ref()
    }
}
