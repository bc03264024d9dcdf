//! # Core Module
//!
//! Fundamental resource-sharing primitives used throughout the renderer.
//! The meshing pipeline is strictly single threaded, so a reference-counted
//! cell is all that is needed to hand the GPU device and queue to the
//! subsystems that dispatch work on them.

pub mod st_system;

// Re-export for easier access
pub use st_system::StSystem;
