//! # Engine State
//!
//! Owns the simulation and rendering state of the running application: the
//! single voxel chunk, the fixed camera and the render manager. The
//! application layer drives it with three calls: [`EngineState::update`] from
//! the event loop's idle hook, [`EngineState::render`] on redraw and
//! [`EngineState::resize_surface`] on window resizes.

pub mod camera_state;
pub mod rendering;
pub mod voxels;

use web_time::{Duration, Instant};
use wgpu::{Device, Queue, Surface, SurfaceConfiguration};

use crate::core::StSystem;
use camera_state::Projection;
use rendering::RenderManager;
use voxels::chunk::Chunk;

/// How often the demo volume is refilled with fresh random contents.
const REFILL_INTERVAL: Duration = Duration::from_millis(50);

/// Top-level state for the voxel meshing demo.
pub struct EngineState {
    render_manager: RenderManager,
    chunk: Chunk,
    projection: Projection,
    last_refill: Instant,
}

impl EngineState {
    pub fn new(
        surface: Surface<'static>,
        surface_config: SurfaceConfiguration,
        device: Device,
        queue: Queue,
        feedback_shader_string: String,
        voxelizer_shader_string: String,
        forward_shader_string: String,
    ) -> Self {
        let projection = Projection::new(surface_config.width, surface_config.height);

        let device = StSystem::new(Box::new(device));
        let queue = StSystem::new(Box::new(queue));

        let render_manager = RenderManager::new(
            surface,
            surface_config,
            device.clone(),
            queue.clone(),
            &feedback_shader_string,
            &voxelizer_shader_string,
            &forward_shader_string,
        );

        let mut chunk = Chunk::new(&device.get(), render_manager.meshing_pipelines());
        // Start with content on screen instead of a black frame.
        chunk.fill_random();

        Self {
            render_manager,
            chunk,
            projection,
            last_refill: Instant::now(),
        }
    }

    /// Advances the demo: refills the volume with random voxels on a fixed
    /// cadence. The refill only dirties the volume; the mesh recompiles on
    /// the next render.
    pub fn update(&mut self) {
        if self.last_refill.elapsed() >= REFILL_INTERVAL {
            self.chunk.fill_random();
            self.last_refill = Instant::now();
        }
    }

    pub fn resize_surface(&mut self, size: winit::dpi::PhysicalSize<u32>) {
        if size.width == 0 || size.height == 0 {
            return;
        }
        self.render_manager.resize_surface(size.width, size.height);
        self.projection = Projection::new(size.width, size.height);
    }

    pub fn render(&mut self) {
        self.render_manager.render(&mut self.chunk, &self.projection);
    }
}
