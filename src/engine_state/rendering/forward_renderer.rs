//! Forward render pipeline drawing the compiled chunk mesh.
//!
//! One pipeline, one uniform bind group. The vertex buffer it consumes is
//! the storage buffer the emission pass filled; no CPU-side vertex data ever
//! exists for the mesh.

use crate::engine_state::camera_state::GlobalUniform;
use crate::engine_state::rendering::texture::Texture;
use crate::engine_state::rendering::vertex::Vertex;
use crate::engine_state::voxels::chunk::Chunk;

/// Pipeline and globals for the single forward pass.
pub struct ForwardRenderer {
    render_pipeline: wgpu::RenderPipeline,
    global_uniform_buffer: wgpu::Buffer,
    global_bind_group: wgpu::BindGroup,
}

impl ForwardRenderer {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        shader_source: &str,
    ) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Forward Shader"),
            source: wgpu::ShaderSource::Wgsl(shader_source.into()),
        });

        let global_uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Global Uniform Buffer"),
            size: std::mem::size_of::<GlobalUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let global_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Global Bind Group Layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        let global_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Global Bind Group"),
            layout: &global_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: global_uniform_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Forward Pipeline Layout"),
            bind_group_layouts: &[&global_bind_group_layout],
            push_constant_ranges: &[],
        });

        let render_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Forward Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[Vertex::desc()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: Some(wgpu::Face::Back),
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: Texture::DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        Self {
            render_pipeline,
            global_uniform_buffer,
            global_bind_group,
        }
    }

    /// Uploads the per-frame globals.
    pub fn write_globals(&self, queue: &wgpu::Queue, globals: &GlobalUniform) {
        queue.write_buffer(&self.global_uniform_buffer, 0, bytemuck::bytes_of(globals));
    }

    /// Records one indexed draw of the chunk's mesh.
    ///
    /// An empty mesh, or a chunk that has never produced one, records
    /// nothing; the pass still runs so the clear happens.
    pub fn draw<'rpass>(&'rpass self, rpass: &mut wgpu::RenderPass<'rpass>, chunk: &'rpass Chunk) {
        let index_count = chunk.index_count();
        let (Some(vertex_buffer), Some(index_buffer)) =
            (chunk.vertex_buffer(), chunk.index_buffer())
        else {
            return;
        };
        if index_count == 0 {
            return;
        }

        rpass.set_pipeline(&self.render_pipeline);
        rpass.set_bind_group(0, &self.global_bind_group, &[]);
        rpass.set_vertex_buffer(0, vertex_buffer.slice(..));
        rpass.set_index_buffer(index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        rpass.draw_indexed(0..index_count, 0, 0..1);
    }
}
