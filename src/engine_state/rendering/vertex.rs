//! Vertex data structures and layouts for voxel rendering.
//!
//! This module defines the vertex format the mesher emits and the backend uploads, and
//! describes its attribute layout so a backend can bind it without knowing the Rust type.

use std::mem::{offset_of, size_of};

/// A vertex of a chunk mesh.
///
/// Positions are chunk-local block corners; the chunk's model matrix moves them into
/// world space at draw time.
///
/// # Memory Layout
/// - Texture Coordinates: [f32; 2] (8 bytes)
/// - Position: [u8; 3] (3 bytes)
/// - Padding: u8 (1 byte)
///
/// Total size: 12 bytes
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    /// Normalized texture atlas coordinates
    pub tex_coords: [f32; 2],
    /// Chunk-local position of the block corner
    pub position: [u8; 3],
    _padding: u8,
}

/// Scalar type of a vertex attribute.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AttributeFormat {
    /// 32-bit float
    Float32,
    /// Unsigned byte, not normalized
    Uint8,
}

/// Where one shader input lives inside a [`Vertex`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct VertexAttribute {
    /// Shader input location
    pub location: u32,
    /// Byte offset from the start of the vertex
    pub offset: usize,
    /// Number of scalar components
    pub components: u32,
    /// Scalar type of each component
    pub format: AttributeFormat,
}

impl Vertex {
    /// Creates a new vertex.
    ///
    /// # Arguments
    /// * `position` - The chunk-local corner position
    /// * `tex_coords` - The atlas texture coordinates
    ///
    /// # Returns
    /// A new `Vertex` instance
    pub fn new(position: [u8; 3], tex_coords: [f32; 2]) -> Self {
        Vertex {
            tex_coords,
            position,
            _padding: 0,
        }
    }

    /// Distance in bytes between consecutive vertices in a buffer.
    pub const STRIDE: usize = size_of::<Vertex>();

    /// Returns the attribute layout of the vertex.
    ///
    /// # Shader Attributes
    /// - `location = 0`: tex_coords (vec2<f32>)
    /// - `location = 1`: position (u8 x3)
    pub fn layout() -> &'static [VertexAttribute] {
        const ATTRIBUTES: [VertexAttribute; 2] = [
            VertexAttribute {
                location: 0,
                offset: offset_of!(Vertex, tex_coords),
                components: 2,
                format: AttributeFormat::Float32,
            },
            VertexAttribute {
                location: 1,
                offset: offset_of!(Vertex, position),
                components: 3,
                format: AttributeFormat::Uint8,
            },
        ];
        &ATTRIBUTES
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_is_tightly_packed() {
        assert_eq!(Vertex::STRIDE, 12);
        let layout = Vertex::layout();
        assert_eq!(layout[0].offset, 0);
        assert_eq!(layout[1].offset, 8);
    }

    #[test]
    fn vertices_cast_to_bytes() {
        let vertices = [Vertex::new([1, 2, 3], [0.5, 0.25])];
        let bytes: &[u8] = bytemuck::cast_slice(&vertices);
        assert_eq!(bytes.len(), Vertex::STRIDE);
        assert_eq!(&bytes[8..11], &[1, 2, 3]);
    }
}
