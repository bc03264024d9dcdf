//! Compute pipelines for voxel-to-mesh compilation.
//!
//! The mesh is compiled on the GPU in two dispatches sharing one dispatch grid
//! of `(SUB_REGIONS_PER_AXIS)^3` work groups:
//!
//! 1. The counting pass inspects the voxel volume, accumulates whole-chunk
//!    vertex/index totals and reserves each sub-region's disjoint output range
//!    through atomic fetch-and-add.
//! 2. The emission pass re-derives face exposure and writes packed vertices
//!    and indices into the reserved ranges, contention free.
//!
//! # Bind group layout
//!
//! * group(0): voxel volume, chunk feedback counters and sub-region feedback
//!   array. Used by both passes, bound once for the chunk's lifetime.
//! * group(1): vertex and index storage. Emission only, recreated after every
//!   mesh buffer reallocation so no binding outlives a resize.

use wgpu::Device;

const FEEDBACK_BIND_GROUP_ID: u32 = 0;
const VOXEL_BUFFER_IDX: u32 = 0;
const CHUNK_FEEDBACK_BUFFER_IDX: u32 = 1;
const SUB_REGION_FEEDBACK_BUFFER_IDX: u32 = 2;

const MESH_BIND_GROUP_ID: u32 = 1;
const VERTEX_BUFFER_IDX: u32 = 0;
const INDEX_BUFFER_IDX: u32 = 1;

/// The two compute pipelines of the meshing pass pair plus their layouts.
///
/// Owned by the render manager and shared by every chunk; the per-chunk state
/// (buffers and bind groups) lives with the chunk itself.
pub struct MeshingPipelines {
    /// Counting pass pipeline ("feedback" stage)
    counting_pipeline: wgpu::ComputePipeline,
    /// Emission pass pipeline ("voxelizer" stage)
    emission_pipeline: wgpu::ComputePipeline,
    /// Layout of group(0): volume and feedback bindings
    feedback_bind_group_layout: wgpu::BindGroupLayout,
    /// Layout of group(1): mesh output bindings
    mesh_bind_group_layout: wgpu::BindGroupLayout,
}

impl MeshingPipelines {
    /// Builds both compute pipelines from the given WGSL sources.
    ///
    /// A shader that fails validation is a fatal configuration error; wgpu
    /// surfaces it through the device error handler and the pipeline is
    /// unusable, so there is nothing to recover here.
    pub fn new(device: &Device, feedback_shader: &str, voxelizer_shader: &str) -> Self {
        let storage_entry = |binding: u32, read_only: bool| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::COMPUTE,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Storage { read_only },
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        };

        let feedback_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Meshing Feedback Bind Group Layout"),
                entries: &[
                    storage_entry(VOXEL_BUFFER_IDX, true),
                    storage_entry(CHUNK_FEEDBACK_BUFFER_IDX, false),
                    storage_entry(SUB_REGION_FEEDBACK_BUFFER_IDX, false),
                ],
            });

        let mesh_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Meshing Output Bind Group Layout"),
                entries: &[
                    storage_entry(VERTEX_BUFFER_IDX, false),
                    storage_entry(INDEX_BUFFER_IDX, false),
                ],
            });

        let counting_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Counting Pipeline Layout"),
            bind_group_layouts: &[&feedback_bind_group_layout],
            push_constant_ranges: &[],
        });

        let emission_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Emission Pipeline Layout"),
            bind_group_layouts: &[&feedback_bind_group_layout, &mesh_bind_group_layout],
            push_constant_ranges: &[],
        });

        let feedback_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Feedback Shader"),
            source: wgpu::ShaderSource::Wgsl(feedback_shader.into()),
        });

        let voxelizer_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Voxelizer Shader"),
            source: wgpu::ShaderSource::Wgsl(voxelizer_shader.into()),
        });

        let counting_pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("Counting Pipeline"),
            layout: Some(&counting_layout),
            module: &feedback_module,
            entry_point: Some("count_faces"),
            compilation_options: Default::default(),
            cache: None,
        });

        let emission_pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("Emission Pipeline"),
            layout: Some(&emission_layout),
            module: &voxelizer_module,
            entry_point: Some("emit_faces"),
            compilation_options: Default::default(),
            cache: None,
        });

        Self {
            counting_pipeline,
            emission_pipeline,
            feedback_bind_group_layout,
            mesh_bind_group_layout,
        }
    }

    /// Creates the group(0) bind group for a chunk's volume and feedback
    /// buffers. These buffers never reallocate, so the bind group lives as
    /// long as the chunk.
    pub fn create_feedback_bind_group(
        &self,
        device: &Device,
        voxel_buffer: &wgpu::Buffer,
        chunk_feedback_buffer: &wgpu::Buffer,
        sub_region_feedback_buffer: &wgpu::Buffer,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Meshing Feedback Bind Group"),
            layout: &self.feedback_bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: VOXEL_BUFFER_IDX,
                    resource: voxel_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: CHUNK_FEEDBACK_BUFFER_IDX,
                    resource: chunk_feedback_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: SUB_REGION_FEEDBACK_BUFFER_IDX,
                    resource: sub_region_feedback_buffer.as_entire_binding(),
                },
            ],
        })
    }

    /// Creates the group(1) bind group for the current mesh buffers.
    ///
    /// Must be called again after every reallocation: buffer identity is the
    /// owning handle, and no consumer may cache a binding across a resize.
    pub fn create_mesh_bind_group(
        &self,
        device: &Device,
        vertex_buffer: &wgpu::Buffer,
        index_buffer: &wgpu::Buffer,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Meshing Output Bind Group"),
            layout: &self.mesh_bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: VERTEX_BUFFER_IDX,
                    resource: vertex_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: INDEX_BUFFER_IDX,
                    resource: index_buffer.as_entire_binding(),
                },
            ],
        })
    }

    /// Records the counting dispatch into `encoder`.
    pub fn encode_counting_pass(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        feedback_bind_group: &wgpu::BindGroup,
        dispatch: (u32, u32, u32),
    ) {
        let mut cpass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some("Counting Pass"),
            timestamp_writes: None,
        });
        cpass.set_pipeline(&self.counting_pipeline);
        cpass.set_bind_group(FEEDBACK_BIND_GROUP_ID, feedback_bind_group, &[]);
        cpass.dispatch_workgroups(dispatch.0, dispatch.1, dispatch.2);
    }

    /// Records the emission dispatch into `encoder`.
    pub fn encode_emission_pass(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        feedback_bind_group: &wgpu::BindGroup,
        mesh_bind_group: &wgpu::BindGroup,
        dispatch: (u32, u32, u32),
    ) {
        let mut cpass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some("Emission Pass"),
            timestamp_writes: None,
        });
        cpass.set_pipeline(&self.emission_pipeline);
        cpass.set_bind_group(FEEDBACK_BIND_GROUP_ID, feedback_bind_group, &[]);
        cpass.set_bind_group(MESH_BIND_GROUP_ID, mesh_bind_group, &[]);
        cpass.dispatch_workgroups(dispatch.0, dispatch.1, dispatch.2);
    }
}
