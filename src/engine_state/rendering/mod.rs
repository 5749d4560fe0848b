//! Rendering system for the voxel world.
//!
//! This module contains the boundary between the world core and whatever draws it. The
//! core only needs a handful of primitives ("create a vertex buffer", "upload vertices",
//! "bind texture", "set uniform", "draw N vertices"), which are captured by the
//! [`RenderBackend`] trait. Shader compilation and the actual upload path belong to the
//! backend.
//!
//! # Architecture
//! - [`RenderBackend`]: the primitives the core issues, always from the render thread
//! - [`HeadlessBackend`]: a recording backend with no graphics context
//! - [`meshing`]: converts chunk voxel data into triangle lists
//! - [`atlas`]: the static per-block-kind texture atlas table
//! - [`Vertex`]: the vertex format shared by mesher and backend

use cgmath::Matrix4;

pub mod atlas;
pub mod headless;
pub mod meshing;
mod vertex;

// Re-export commonly used types
pub use headless::HeadlessBackend;
pub use meshing::ChunkMesh;
pub use vertex::{AttributeFormat, Vertex, VertexAttribute};

/// Name of the uniform that receives `view_projection * model` for each chunk.
pub const MVP_UNIFORM_NAME: &str = "model_view_projection";

/// Opaque id of a vertex buffer owned by a [`RenderBackend`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BufferHandle(pub u32);

/// Opaque id of a texture owned by a [`RenderBackend`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureHandle(pub u32);

/// The drawing primitives the world core relies on.
///
/// Every method is called from the thread that renders; the streaming worker never
/// touches the backend. Buffers of evicted chunks are handed back through
/// [`RenderBackend::delete_vertex_buffer`] on that same thread.
pub trait RenderBackend {
    /// Allocates an empty vertex buffer.
    fn create_vertex_buffer(&mut self) -> BufferHandle;

    /// Replaces the contents of `buffer` with `vertices`.
    fn upload_vertices(&mut self, buffer: BufferHandle, vertices: &[Vertex]);

    /// Releases `buffer`. The handle is invalid afterwards.
    fn delete_vertex_buffer(&mut self, buffer: BufferHandle);

    /// Binds the atlas texture used by subsequent draws.
    fn bind_texture(&mut self, texture: TextureHandle);

    /// Sets a 4x4 matrix uniform by name.
    fn set_uniform_matrix(&mut self, name: &str, matrix: Matrix4<f32>);

    /// Draws `vertex_count` vertices of `buffer` as a triangle list.
    fn draw_triangles(&mut self, buffer: BufferHandle, vertex_count: u32);
}
