//! A render backend without a graphics context.
//!
//! Keeps uploaded vertex data in memory and records every call, so the world can be
//! streamed and rendered in tests and in the command line demo.

use std::collections::HashMap;

use cgmath::Matrix4;
use log::{trace, warn};

use super::{BufferHandle, RenderBackend, TextureHandle, Vertex};

/// One recorded `draw_triangles` call.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DrawCall {
    /// The buffer that was drawn
    pub buffer: BufferHandle,
    /// Number of vertices drawn
    pub vertex_count: u32,
    /// Texture bound at the time of the call
    pub texture: Option<TextureHandle>,
    /// Value of the MVP uniform at the time of the call
    pub model_view_projection: Option<Matrix4<f32>>,
}

/// Recording [`RenderBackend`].
#[derive(Debug, Default)]
pub struct HeadlessBackend {
    next_buffer_id: u32,
    buffers: HashMap<BufferHandle, Vec<Vertex>>,
    bound_texture: Option<TextureHandle>,
    uniforms: HashMap<String, Matrix4<f32>>,
    /// Every draw call, in order
    pub draw_calls: Vec<DrawCall>,
    /// Buffers released through `delete_vertex_buffer`, in order
    pub deleted_buffers: Vec<BufferHandle>,
    /// Number of `upload_vertices` calls
    pub uploads: usize,
}

impl HeadlessBackend {
    /// Creates an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of buffers currently alive.
    pub fn live_buffer_count(&self) -> usize {
        self.buffers.len()
    }

    /// Vertices last uploaded to `buffer`.
    pub fn buffer_contents(&self, buffer: BufferHandle) -> Option<&[Vertex]> {
        self.buffers.get(&buffer).map(Vec::as_slice)
    }

    /// Last value set for a matrix uniform.
    pub fn uniform(&self, name: &str) -> Option<Matrix4<f32>> {
        self.uniforms.get(name).copied()
    }

    /// Currently bound texture.
    pub fn bound_texture(&self) -> Option<TextureHandle> {
        self.bound_texture
    }

    /// Total vertices over all recorded draw calls.
    pub fn drawn_vertex_count(&self) -> u64 {
        self.draw_calls
            .iter()
            .map(|call| call.vertex_count as u64)
            .sum()
    }

    /// Forgets recorded draw calls, keeping buffers, uniforms and texture.
    pub fn begin_frame(&mut self) {
        self.draw_calls.clear();
    }
}

impl RenderBackend for HeadlessBackend {
    fn create_vertex_buffer(&mut self) -> BufferHandle {
        let handle = BufferHandle(self.next_buffer_id);
        self.next_buffer_id += 1;
        self.buffers.insert(handle, Vec::new());
        trace!("Created vertex buffer {:?}", handle);
        handle
    }

    fn upload_vertices(&mut self, buffer: BufferHandle, vertices: &[Vertex]) {
        match self.buffers.get_mut(&buffer) {
            Some(contents) => {
                contents.clear();
                contents.extend_from_slice(vertices);
                self.uploads += 1;
            }
            None => warn!("Upload to unknown vertex buffer {:?}", buffer),
        }
    }

    fn delete_vertex_buffer(&mut self, buffer: BufferHandle) {
        if self.buffers.remove(&buffer).is_none() {
            warn!("Delete of unknown vertex buffer {:?}", buffer);
        }
        self.deleted_buffers.push(buffer);
    }

    fn bind_texture(&mut self, texture: TextureHandle) {
        self.bound_texture = Some(texture);
    }

    fn set_uniform_matrix(&mut self, name: &str, matrix: Matrix4<f32>) {
        self.uniforms.insert(name.to_owned(), matrix);
    }

    fn draw_triangles(&mut self, buffer: BufferHandle, vertex_count: u32) {
        self.draw_calls.push(DrawCall {
            buffer,
            vertex_count,
            texture: self.bound_texture,
            model_view_projection: self.uniform(super::MVP_UNIFORM_NAME),
        });
    }
}
