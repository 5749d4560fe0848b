//! # Chunk Module
//!
//! This module provides the `Chunk` struct: a dense, fixed-size 3D grid of block kinds
//! together with its neighbor links and its cached, GPU-visible mesh.
//!
//! ## Storage
//!
//! Blocks are stored as a flat boxed slice in Y-major order (`x`, then `z`, then `y`), so
//! that a horizontal layer is contiguous. One `BlockKind` is one byte, which puts a full
//! 16×128×16 chunk at 32 KiB.
//!
//! ## Neighbor Links
//!
//! A chunk records the *coordinates* of up to six adjacent chunks, one per `BlockSide`.
//! These are non-owning handles into the chunk map: the map alone owns chunks, and a link
//! is resolved through it at the moment it is needed. Setting a link never sets the
//! reciprocal one; the chunk map keeps both sides consistent on insertion and eviction.
//!
//! ## Mesh Lifecycle
//!
//! Any `set` marks the chunk dirty. The next `render` call rebuilds the whole mesh from
//! the voxel grid and the current neighbors, uploads it through the render backend and
//! clears the flag. All backend calls happen inside `render`, never inside `get`/`set`.

use cgmath::{Matrix4, Point3, Vector3};
use log::debug;

use super::block::{BlockKind, BlockSide};
use crate::engine_state::rendering::{
    meshing::{ChunkMesh, NeighborChunks},
    BufferHandle, RenderBackend,
};

pub mod chunk_index;

pub use chunk_index::ChunkCoordinate;

/// Width of a chunk in blocks (X).
pub const CHUNK_WIDTH: usize = 16;
/// Height of a chunk in blocks (Y).
pub const CHUNK_HEIGHT: usize = 128;
/// Depth of a chunk in blocks (Z).
pub const CHUNK_DEPTH: usize = 16;
/// Number of blocks in one horizontal layer of a chunk.
pub const CHUNK_LAYER_SIZE: usize = CHUNK_WIDTH * CHUNK_DEPTH;
/// Total number of blocks in a chunk.
pub const CHUNK_SIZE: usize = CHUNK_LAYER_SIZE * CHUNK_HEIGHT;

/// A fixed-size region of voxel data with its neighbor links and mesh cache.
pub struct Chunk {
    /// Position of this chunk in chunk coordinates (not block coordinates).
    coordinate: ChunkCoordinate,

    /// Block kinds, indexed by `index_of`.
    blocks: Box<[BlockKind]>,

    /// Coordinates of linked neighbors, indexed by `BlockSide`.
    neighbors: [Option<ChunkCoordinate>; 6],

    /// Set by every `set`, cleared when the mesh is rebuilt.
    dirty: bool,

    /// Translation from chunk-local block space to world space.
    model_matrix: Matrix4<f32>,

    /// Last generated vertex list.
    mesh: ChunkMesh,

    /// Backend buffer holding the uploaded mesh, created on first upload.
    vertex_buffer: Option<BufferHandle>,

    /// Number of vertices in `vertex_buffer`.
    vertex_count: u32,

    /// Set once the chunk was evicted; a released chunk never touches the backend again.
    released: bool,
}

impl Chunk {
    /// Creates a chunk filled with air.
    pub fn new(coordinate: ChunkCoordinate) -> Self {
        Self::filled(coordinate, BlockKind::Air)
    }

    /// Creates a chunk with every cell set to `kind`.
    pub fn filled(coordinate: ChunkCoordinate, kind: BlockKind) -> Self {
        let origin = coordinate.to_world_origin();
        let translation = Vector3::new(origin.x as f32, origin.y as f32, origin.z as f32);
        Chunk {
            coordinate,
            blocks: vec![kind; CHUNK_SIZE].into_boxed_slice(),
            neighbors: [None; 6],
            dirty: true,
            model_matrix: Matrix4::from_translation(translation),
            mesh: ChunkMesh::default(),
            vertex_buffer: None,
            vertex_count: 0,
            released: false,
        }
    }

    /// Returns `true` if `(x, y, z)` is a valid local cell.
    #[inline]
    pub fn contains_local(x: usize, y: usize, z: usize) -> bool {
        x < CHUNK_WIDTH && y < CHUNK_HEIGHT && z < CHUNK_DEPTH
    }

    #[inline]
    fn index_of(x: usize, y: usize, z: usize) -> usize {
        assert!(
            Self::contains_local(x, y, z),
            "local block position ({x}, {y}, {z}) outside chunk bounds {CHUNK_WIDTH}x{CHUNK_HEIGHT}x{CHUNK_DEPTH}"
        );
        x + CHUNK_WIDTH * (z + CHUNK_DEPTH * y)
    }

    /// Gets the block kind at the specified local coordinates.
    ///
    /// # Panics
    /// Panics if the coordinates are out of bounds. Callers that may step outside the
    /// chunk must consult the neighbor instead.
    #[inline]
    pub fn get(&self, x: usize, y: usize, z: usize) -> BlockKind {
        self.blocks[Self::index_of(x, y, z)]
    }

    /// Sets the block kind at the specified local coordinates and marks the chunk dirty.
    ///
    /// The chunk is marked dirty even when `kind` equals the current value.
    ///
    /// # Panics
    /// Panics if the coordinates are out of bounds.
    pub fn set(&mut self, x: usize, y: usize, z: usize, kind: BlockKind) {
        let index = Self::index_of(x, y, z);
        self.blocks[index] = kind;
        self.dirty = true;
    }

    /// The chunk's coordinate.
    pub fn coordinate(&self) -> ChunkCoordinate {
        self.coordinate
    }

    /// World position of the chunk's minimum corner.
    pub fn world_origin(&self) -> Point3<i32> {
        self.coordinate.to_world_origin()
    }

    /// Transform from chunk-local block space into world space.
    pub fn model_matrix(&self) -> Matrix4<f32> {
        self.model_matrix
    }

    /// Whether the mesh is out of date.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Forces a mesh rebuild on the next render, e.g. after a neighbor changed.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// The linked neighbor in direction `side`, if any.
    pub fn neighbor(&self, side: BlockSide) -> Option<ChunkCoordinate> {
        self.neighbors[side.index()]
    }

    /// All neighbor links, indexed by `BlockSide`.
    pub fn neighbors(&self) -> [Option<ChunkCoordinate>; 6] {
        self.neighbors
    }

    /// Links (or unlinks, with `None`) the neighbor in direction `side`.
    ///
    /// Only this side of the link is updated.
    pub fn set_neighbor(&mut self, side: BlockSide, neighbor: Option<ChunkCoordinate>) {
        self.neighbors[side.index()] = neighbor;
    }

    /// Clears every link that points at `coordinate`. Returns `true` if any was cleared.
    pub fn unlink(&mut self, coordinate: ChunkCoordinate) -> bool {
        let mut cleared = false;
        for link in self.neighbors.iter_mut() {
            if *link == Some(coordinate) {
                *link = None;
                cleared = true;
            }
        }
        cleared
    }

    /// Per-column solidity of the bottom layer, indexed `x + z * CHUNK_WIDTH`.
    ///
    /// A freshly generated chunk below treats every column marked here as already past its
    /// surface.
    pub fn bottom_layer_solidity(&self) -> Vec<bool> {
        self.blocks[..CHUNK_LAYER_SIZE]
            .iter()
            .map(|kind| kind.is_solid())
            .collect()
    }

    /// Number of solid cells.
    pub fn solid_count(&self) -> usize {
        self.blocks.iter().filter(|kind| kind.is_solid()).count()
    }

    /// The last generated mesh.
    pub fn mesh(&self) -> &ChunkMesh {
        &self.mesh
    }

    /// Number of vertices uploaded to the backend.
    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    /// The backend buffer holding this chunk's mesh, once one was uploaded.
    pub fn vertex_buffer(&self) -> Option<BufferHandle> {
        self.vertex_buffer
    }

    /// Whether the chunk was evicted.
    pub fn is_released(&self) -> bool {
        self.released
    }

    /// Marks the chunk as evicted, clears its links and detaches its backend buffer so
    /// that the render thread can delete it.
    pub fn release(&mut self) -> Option<BufferHandle> {
        self.released = true;
        self.neighbors = [None; 6];
        self.vertex_count = 0;
        self.vertex_buffer.take()
    }

    /// Rebuilds the mesh from the voxel grid and `neighbors`, uploads it and clears the
    /// dirty flag.
    pub fn regenerate_mesh<B: RenderBackend + ?Sized>(
        &mut self,
        neighbors: &NeighborChunks<'_>,
        backend: &mut B,
    ) {
        self.mesh = ChunkMesh::generate(self, neighbors);

        let buffer = match self.vertex_buffer {
            Some(buffer) => buffer,
            None => {
                let buffer = backend.create_vertex_buffer();
                self.vertex_buffer = Some(buffer);
                buffer
            }
        };
        backend.upload_vertices(buffer, self.mesh.vertices());

        self.vertex_count = self.mesh.len() as u32;
        self.dirty = false;

        debug!(
            "Meshed chunk {:?}: {} vertices",
            self.coordinate, self.vertex_count
        );
    }

    /// Draws the chunk, rebuilding its mesh first if it is dirty. Released chunks are skipped.
    pub fn render<B: RenderBackend + ?Sized>(
        &mut self,
        neighbors: &NeighborChunks<'_>,
        backend: &mut B,
    ) {
        if self.released {
            return;
        }
        if self.dirty {
            self.regenerate_mesh(neighbors, backend);
        }

        if let Some(buffer) = self.vertex_buffer {
            backend.draw_triangles(buffer, self.vertex_count);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::rendering::headless::HeadlessBackend;

    const NO_NEIGHBORS: NeighborChunks<'static> = [None, None, None, None, None, None];

    #[test]
    fn new_chunk_is_air_and_dirty() {
        let chunk = Chunk::new(ChunkCoordinate::new(1, 2, 3));
        assert!(chunk.is_dirty());
        assert_eq!(chunk.solid_count(), 0);
        assert_eq!(chunk.get(15, 127, 15), BlockKind::Air);
        assert_eq!(chunk.world_origin(), Point3::new(16, 256, 48));
    }

    #[test]
    fn set_then_get() {
        let mut chunk = Chunk::new(ChunkCoordinate::default());
        chunk.set(3, 100, 7, BlockKind::Stone);
        assert_eq!(chunk.get(3, 100, 7), BlockKind::Stone);
        assert_eq!(chunk.get(7, 100, 3), BlockKind::Air);
        assert_eq!(chunk.solid_count(), 1);
    }

    #[test]
    fn set_with_unchanged_value_still_marks_dirty() {
        let mut chunk = Chunk::new(ChunkCoordinate::default());
        let mut backend = HeadlessBackend::new();
        chunk.regenerate_mesh(&NO_NEIGHBORS, &mut backend);
        assert!(!chunk.is_dirty());

        chunk.set(0, 0, 0, BlockKind::Air);

        assert!(chunk.is_dirty());
    }

    #[test]
    #[should_panic(expected = "outside chunk bounds")]
    fn get_out_of_range_panics() {
        let chunk = Chunk::new(ChunkCoordinate::default());
        chunk.get(CHUNK_WIDTH, 0, 0);
    }

    #[test]
    #[should_panic(expected = "outside chunk bounds")]
    fn set_out_of_range_panics() {
        let mut chunk = Chunk::new(ChunkCoordinate::default());
        chunk.set(0, CHUNK_HEIGHT, 0, BlockKind::Dirt);
    }

    #[test]
    fn neighbor_links_are_one_sided_until_both_are_set() {
        let a = ChunkCoordinate::new(0, 0, 0);
        let b = ChunkCoordinate::new(1, 0, 0);
        let mut chunk_a = Chunk::new(a);
        let mut chunk_b = Chunk::new(b);

        chunk_a.set_neighbor(BlockSide::PosX, Some(b));
        assert_eq!(chunk_a.neighbor(BlockSide::PosX), Some(b));
        assert_eq!(chunk_b.neighbor(BlockSide::NegX), None);

        chunk_b.set_neighbor(BlockSide::NegX, Some(a));
        assert!(chunk_b.unlink(a));
        assert!(!chunk_b.unlink(a));
        assert_eq!(chunk_b.neighbor(BlockSide::NegX), None);
    }

    #[test]
    fn render_meshes_once_and_draws_every_frame() {
        let mut chunk = Chunk::new(ChunkCoordinate::default());
        chunk.set(4, 4, 4, BlockKind::Dirt);
        let mut backend = HeadlessBackend::new();

        chunk.render(&NO_NEIGHBORS, &mut backend);
        chunk.render(&NO_NEIGHBORS, &mut backend);

        assert_eq!(backend.uploads, 1);
        assert_eq!(backend.draw_calls.len(), 2);
        assert_eq!(chunk.vertex_count(), 36);
        assert!(backend.draw_calls.iter().all(|call| call.vertex_count == 36));
    }

    #[test]
    fn bottom_layer_solidity_reads_layer_zero() {
        let mut chunk = Chunk::new(ChunkCoordinate::default());
        chunk.set(2, 0, 3, BlockKind::Stone);
        chunk.set(2, 1, 4, BlockKind::Stone);

        let layer = chunk.bottom_layer_solidity();

        assert_eq!(layer.len(), CHUNK_LAYER_SIZE);
        assert!(layer[2 + 3 * CHUNK_WIDTH]);
        assert!(!layer[2 + 4 * CHUNK_WIDTH]);
    }

    #[test]
    fn released_chunk_detaches_buffer_and_stops_drawing() {
        let mut chunk = Chunk::new(ChunkCoordinate::default());
        chunk.set_neighbor(BlockSide::PosY, Some(ChunkCoordinate::new(0, 1, 0)));
        let mut backend = HeadlessBackend::new();
        chunk.render(&NO_NEIGHBORS, &mut backend);

        let handle = chunk.release();
        chunk.mark_dirty();
        chunk.render(&NO_NEIGHBORS, &mut backend);

        assert!(handle.is_some());
        assert!(chunk.is_released());
        assert_eq!(chunk.vertex_buffer(), None);
        assert_eq!(chunk.neighbors(), [None; 6]);
        assert_eq!(backend.draw_calls.len(), 1);
        assert_eq!(backend.live_buffer_count(), 1);
    }
}
