//! Native entry point for the voxel meshing demo.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --release
//! ```

fn main() {
    voxel_mesher::run();
}
