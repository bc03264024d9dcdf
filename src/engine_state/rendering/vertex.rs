//! Vertex format shared by the emission shader and the forward pipeline.
//!
//! The emission pass writes this exact 32-byte layout into the vertex storage
//! buffer as a flat float stream, so the field order and `#[repr(C)]` packing
//! here are part of the GPU contract, not a convenience.

use bytemuck::{Pod, Zeroable};

/// A single mesh vertex: position, texture coordinates and face normal.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub tex_coords: [f32; 2],
    pub normal: [f32; 3],
}

impl Vertex {
    /// Vertex buffer layout matching the shader's `VertexInput` locations.
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 5]>() as wgpu::BufferAddress,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32x3,
                },
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stride_matches_the_emission_shader() {
        // The emission shader writes eight floats per vertex.
        assert_eq!(std::mem::size_of::<Vertex>(), 8 * 4);
        assert_eq!(Vertex::desc().array_stride, 32);
    }

    #[test]
    fn attribute_offsets_are_tightly_packed() {
        let desc = Vertex::desc();
        let offsets: Vec<u64> = desc.attributes.iter().map(|a| a.offset).collect();
        assert_eq!(offsets, vec![0, 12, 20]);
    }
}
