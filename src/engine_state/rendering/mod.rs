//! Render management: surface ownership, frame encoding and the meshing
//! compute pipelines.
//!
//! # Architecture
//!
//! [`RenderManager`] owns everything tied to the window surface (the surface
//! itself, its configuration and the depth texture) plus the two pipeline
//! bundles: the forward pass and the compute pair that compiles voxel
//! volumes into meshes. Each frame it first gives the chunk a chance to
//! regenerate its mesh, then encodes a single depth-tested pass that draws
//! whatever mesh the chunk currently holds.

pub mod forward_renderer;
pub mod meshing;
pub mod texture;
pub mod vertex;

use crate::core::StSystem;
use crate::engine_state::camera_state::{GlobalUniform, Projection};
use crate::engine_state::voxels::chunk::Chunk;

use forward_renderer::ForwardRenderer;
use meshing::MeshingPipelines;
use texture::Texture;

/// Owns the surface and all pipelines, and encodes one frame per call.
pub struct RenderManager {
    surface: wgpu::Surface<'static>,
    surface_config: wgpu::SurfaceConfiguration,
    device: StSystem<wgpu::Device>,
    queue: StSystem<wgpu::Queue>,
    depth_texture: Texture,
    forward_renderer: ForwardRenderer,
    meshing_pipelines: MeshingPipelines,
}

impl RenderManager {
    pub fn new(
        surface: wgpu::Surface<'static>,
        surface_config: wgpu::SurfaceConfiguration,
        device: StSystem<wgpu::Device>,
        queue: StSystem<wgpu::Queue>,
        feedback_shader: &str,
        voxelizer_shader: &str,
        forward_shader: &str,
    ) -> Self {
        let (depth_texture, forward_renderer, meshing_pipelines) = {
            let device_ref = device.get();
            let depth_texture =
                Texture::create_depth_texture(&device_ref, &surface_config, "Depth Texture");
            let forward_renderer =
                ForwardRenderer::new(&device_ref, surface_config.format, forward_shader);
            let meshing_pipelines =
                MeshingPipelines::new(&device_ref, feedback_shader, voxelizer_shader);
            (depth_texture, forward_renderer, meshing_pipelines)
        };

        Self {
            surface,
            surface_config,
            device,
            queue,
            depth_texture,
            forward_renderer,
            meshing_pipelines,
        }
    }

    /// Shared compute pipelines chunks bind their buffers against.
    pub fn meshing_pipelines(&self) -> &MeshingPipelines {
        &self.meshing_pipelines
    }

    /// Reconfigures the surface and replaces the depth texture.
    pub fn resize_surface(&mut self, width: u32, height: u32) {
        self.surface_config.width = width;
        self.surface_config.height = height;
        let device = self.device.get();
        self.surface.configure(&device, &self.surface_config);
        self.depth_texture =
            Texture::create_depth_texture(&device, &self.surface_config, "Depth Texture");
    }

    /// Regenerates the chunk mesh if needed, then encodes and presents one
    /// frame.
    pub fn render(&mut self, chunk: &mut Chunk, projection: &Projection) {
        let device = self.device.get();
        let queue = self.queue.get();

        chunk.prepare(&device, &queue, &self.meshing_pipelines);

        self.forward_renderer
            .write_globals(&queue, &GlobalUniform::new(projection));

        let frame = match self.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(e) => {
                log::error!("Failed to acquire surface texture: {e:?}");
                panic!("Failed to acquire surface texture: {e:?}");
            }
        };
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Frame Encoder"),
        });
        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Forward Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            self.forward_renderer.draw(&mut rpass, chunk);
        }

        queue.submit(Some(encoder.finish()));
        frame.present();
    }
}
