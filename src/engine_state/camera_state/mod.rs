//! Fixed camera and the global uniform uploaded each frame.
//!
//! The camera does not move: the view is a fixed translation placed to frame
//! the whole chunk, and only the projection changes, tracking the surface
//! aspect ratio across resizes.

use bytemuck::{Pod, Zeroable};
use cgmath::{perspective, vec3, Deg, Matrix4, SquareMatrix};

/// Conversion matrix from OpenGL clip space (z in -1..1) to the
/// 0..1 depth range wgpu expects.
#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

const FOV_Y_DEGREES: f32 = 45.0;
const Z_NEAR: f32 = 0.1;
const Z_FAR: f32 = 1000.0;

/// Perspective projection parameters derived from the surface size.
pub struct Projection {
    aspect: f32,
    fovy: Deg<f32>,
    znear: f32,
    zfar: f32,
}

impl Projection {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            aspect: width as f32 / height as f32,
            fovy: Deg(FOV_Y_DEGREES),
            znear: Z_NEAR,
            zfar: Z_FAR,
        }
    }

    pub fn calc_matrix(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * perspective(self.fovy, self.aspect, self.znear, self.zfar)
    }
}

/// Returns the fixed view matrix: the inverse of the camera's placement at
/// the chunk's center in x/y, pulled back along +z to see all of it.
pub fn view_matrix() -> Matrix4<f32> {
    Matrix4::from_translation(vec3(40.0, 40.0, 170.0))
        .invert()
        .unwrap_or_else(Matrix4::identity)
}

/// Per-frame globals uploaded to the forward pass uniform buffer.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct GlobalUniform {
    pub projection: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
}

impl GlobalUniform {
    pub fn new(projection: &Projection) -> Self {
        Self {
            projection: projection.calc_matrix().into(),
            view: view_matrix().into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_uniform_is_two_packed_matrices() {
        assert_eq!(std::mem::size_of::<GlobalUniform>(), 128);
    }

    #[test]
    fn projection_tracks_aspect_ratio() {
        let wide = Projection::new(1600, 800).calc_matrix();
        let square = Projection::new(800, 800).calc_matrix();
        // Horizontal scale halves when the surface is twice as wide.
        assert!((wide.x.x - square.x.x / 2.0).abs() < 1e-6);
        assert!((wide.y.y - square.y.y).abs() < 1e-6);
    }

    #[test]
    fn view_matrix_moves_the_camera_position_to_the_origin() {
        let eye = cgmath::vec4(40.0, 40.0, 170.0, 1.0);
        let at_origin = view_matrix() * eye;
        assert!(at_origin.x.abs() < 1e-6);
        assert!(at_origin.y.abs() < 1e-6);
        assert!(at_origin.z.abs() < 1e-6);
    }
}
