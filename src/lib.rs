//! # Voxel Mesher
//!
//! A GPU-driven voxel meshing demo built with Rust and WGPU.
//!
//! A single cubic chunk of binary voxels is compiled into a triangle mesh
//! entirely on the GPU: a counting compute pass measures how much geometry
//! each sub-region of the chunk will produce and reserves disjoint output
//! ranges through atomic counters, the CPU reads the totals back to size the
//! mesh buffers, and an emission compute pass fills the reserved ranges with
//! packed vertices and indices. The forward pass then draws the result with
//! a single indexed draw call.
//!
//! ## Key Modules
//!
//! * `application_state` - Manages the application lifecycle and window management
//! * `core` - Shared utilities used throughout the engine
//! * `engine_state` - Rendering, voxel storage and the meshing pipelines
//!
//! ## Usage
//!
//! ```rust,no_run
//! fn main() {
//!     voxel_mesher::run();
//! }
//! ```

use application_state::{graphics_resources_builder::GraphicsBuilder, ApplicationState};

use log::info;
use winit::event_loop::EventLoop;

pub mod application_state;
pub mod core;
pub mod engine_state;

/// Initializes logging, builds the event loop and runs the application until
/// the window closes.
pub fn run() {
    let mut log_builder = env_logger::Builder::new();
    log_builder
        .target(env_logger::Target::Stdout)
        .parse_env("RUST_LOG")
        .init();

    info!("Logger initialized");
    let event_loop = EventLoop::with_user_event().build().unwrap();

    let mut state = ApplicationState::new(GraphicsBuilder::new(event_loop.create_proxy()));

    let _ = event_loop.run_app(&mut state);
}
