//! # Graphics Resources Builder
//!
//! Asynchronous creation of the window, the WebGPU context and the shader
//! sources the engine needs. Initialization runs off the event loop and the
//! finished [`Graphics`] bundle is delivered back through a user event.
//!
//! The main components are:
//! - `Graphics`: Holds all graphics-related resources
//! - `GraphicsBuilder`: Helper for asynchronous graphics initialization
//! - `MaybeGraphics`: Represents the various states of graphics initialization

use std::future::Future;
use std::path::Path;
use std::sync::Arc;

use wgpu::{Adapter, Device, Features, Instance, Queue, Surface, SurfaceConfiguration};
use winit::{
    event_loop::{ActiveEventLoop, EventLoopProxy},
    window::Window,
};

const FEEDBACK_SHADER_PATH: &str = "assets/shaders/feedback.wgsl";
const VOXELIZER_SHADER_PATH: &str = "assets/shaders/voxelizer.wgsl";
const FORWARD_SHADER_PATH: &str = "assets/shaders/forward.wgsl";

/// Contains all graphics-related resources required by the application.
///
/// Created once during initialization and consumed when the engine state is
/// built. The `Option` fields exist so the bundle can be taken apart with
/// `std::mem::take`.
#[derive(Default)]
pub struct Graphics {
    pub window: Option<Arc<Window>>,
    #[allow(dead_code)]
    pub instance: Option<Instance>,
    pub surface: Option<Surface<'static>>,
    pub surface_config: Option<SurfaceConfiguration>,
    #[allow(dead_code)]
    pub adapter: Option<Adapter>,
    pub device: Option<Device>,
    pub queue: Option<Queue>,
    pub feedback_shader_string: String,
    pub voxelizer_shader_string: String,
    pub forward_shader_string: String,
}

/// Reads a WGSL source file from the assets directory.
///
/// A missing shader makes the whole renderer unusable, so this is fatal.
fn load_shader(path: &str) -> String {
    std::fs::read_to_string(Path::new(path)).unwrap_or_else(|e| {
        log::error!("Failed to read shader {path}: {e}");
        panic!("Failed to read shader {path}: {e}");
    })
}

/// Asynchronously creates and initializes all required graphics resources.
///
/// # Arguments
/// * `event_loop` - The active event loop used to create the window and surface
///
/// # Returns
/// A `Future` that resolves to the initialized `Graphics` when complete
fn create_graphics(event_loop: &ActiveEventLoop) -> impl Future<Output = Graphics> + 'static {
    let window_attrs = Window::default_attributes().with_title("voxel-mesher");
    let window = Arc::new(event_loop.create_window(window_attrs).unwrap());

    // The instance is a handle to our GPU
    let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
        backends: wgpu::Backends::PRIMARY,
        flags: wgpu::InstanceFlags::empty(),
        backend_options: wgpu::BackendOptions::from_env_or_default(),
    });

    let surface = instance.create_surface(window.clone()).unwrap();

    async move {
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .unwrap();

        // A dense random volume can count close to a hundred megabytes of
        // vertex data, well past the default storage binding limit, so the
        // mesh output bindings take whatever the adapter can give.
        let adapter_limits = adapter.limits();
        let mut required_limits = wgpu::Limits::default();
        required_limits.max_storage_buffer_binding_size =
            adapter_limits.max_storage_buffer_binding_size;
        required_limits.max_buffer_size = adapter_limits.max_buffer_size;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                required_features: Features::empty(),
                required_limits,
                label: None,
                memory_hints: wgpu::MemoryHints::MemoryUsage,
                trace: wgpu::Trace::Off,
            })
            .await
            .unwrap();

        let size = window.inner_size();

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);
        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width,
            height: size.height,
            present_mode: surface_caps.present_modes[0],
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };

        let feedback_shader_string = load_shader(FEEDBACK_SHADER_PATH);
        let voxelizer_shader_string = load_shader(VOXELIZER_SHADER_PATH);
        let forward_shader_string = load_shader(FORWARD_SHADER_PATH);

        surface.configure(&device, &surface_config);
        Graphics {
            window: Some(window),
            instance: Some(instance),
            surface: Some(surface),
            surface_config: Some(surface_config),
            adapter: Some(adapter),
            device: Some(device),
            queue: Some(queue),
            feedback_shader_string,
            voxelizer_shader_string,
            forward_shader_string,
        }
    }
}

/// Helper struct for managing the asynchronous initialization of graphics
/// resources.
pub struct GraphicsBuilder {
    event_loop_proxy: Option<EventLoopProxy<Graphics>>,
}

/// Represents the possible states of the graphics initialization process.
pub enum MaybeGraphics {
    /// State during asynchronous graphics initialization
    Builder(GraphicsBuilder),

    /// State when graphics resources are fully initialized and ready for use
    Graphics(Graphics),

    /// State after graphics resources have been moved to another owner
    Moved,
}

impl GraphicsBuilder {
    pub fn new(event_loop_proxy: EventLoopProxy<Graphics>) -> Self {
        Self {
            event_loop_proxy: Some(event_loop_proxy),
        }
    }

    /// Initiates the asynchronous graphics initialization process.
    ///
    /// Builds the resources and sends them back to the main thread through
    /// the event loop proxy.
    ///
    /// # Panics
    /// Panics if sending the finished resources fails
    pub fn build_and_send(&mut self, event_loop: &ActiveEventLoop) {
        let Some(event_loop_proxy) = self.event_loop_proxy.take() else {
            // event_loop_proxy is already spent - we already constructed Graphics
            return;
        };

        let gfx = pollster::block_on(create_graphics(event_loop));
        assert!(event_loop_proxy.send_event(gfx).is_ok());
    }
}
