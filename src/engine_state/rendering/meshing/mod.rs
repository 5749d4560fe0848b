//! Mesh generation for voxel chunks.
//!
//! This module converts a chunk's voxel grid into a triangle list with one quad per
//! visible block face. A face is visible when the cell it faces is air. Cells past the
//! chunk boundary are read from the linked neighbor chunk; when no neighbor is linked on
//! that side the face is treated as exposed, so the frontier of the loaded world always
//! shows its outer shell.
//!
//! # Architecture
//! - [`ChunkMesh`]: the vertex list of one chunk, rebuilt wholesale
//! - [`NeighborChunks`]: the six neighbors consulted at the chunk boundary
//! - `face`: corner tables for the six face directions
//!
//! # Output
//! Each visible face contributes two triangles, six vertices, with chunk-local byte
//! positions and atlas texture coordinates looked up per face orientation.

mod face;

pub use face::face_corners;

use super::{atlas, Vertex};
use crate::engine_state::voxels::{
    block::{BlockKind, BlockSide},
    chunk::{Chunk, CHUNK_DEPTH, CHUNK_HEIGHT, CHUNK_WIDTH},
};

/// Number of vertices emitted per visible face.
pub const VERTICES_PER_FACE: usize = 6;

/// Read access to the neighbors of the chunk being meshed, indexed by `BlockSide`.
pub type NeighborChunks<'a> = [Option<&'a Chunk>; 6];

/// Derived triangle list of one chunk.
#[derive(Debug, Default, Clone)]
pub struct ChunkMesh {
    vertices: Vec<Vertex>,
}

impl ChunkMesh {
    /// Builds the mesh of `chunk`.
    ///
    /// # Arguments
    /// * `chunk` - The chunk to mesh
    /// * `neighbors` - Its linked neighbors, consulted for boundary faces
    ///
    /// # Returns
    /// A new `ChunkMesh` with six vertices per visible face.
    pub fn generate(chunk: &Chunk, neighbors: &NeighborChunks<'_>) -> Self {
        let mut vertices = Vec::new();

        for x in 0..CHUNK_WIDTH {
            for y in 0..CHUNK_HEIGHT {
                for z in 0..CHUNK_DEPTH {
                    let kind = chunk.get(x, y, z);
                    let Some(textures) = atlas::face_textures(kind) else {
                        continue;
                    };

                    for side in BlockSide::all() {
                        if !is_exposed(chunk, neighbors, x, y, z, side) {
                            continue;
                        }

                        let corners = face_corners(side, x as u8, y as u8, z as u8);
                        let coords = textures.region(side.orientation()).face_coords();
                        vertices.extend(
                            corners
                                .into_iter()
                                .zip(coords)
                                .map(|(position, tex_coords)| Vertex::new(position, tex_coords)),
                        );
                    }
                }
            }
        }

        ChunkMesh { vertices }
    }

    /// The vertex list.
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// Number of vertices.
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// Whether the mesh has no geometry.
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Number of visible faces.
    pub fn face_count(&self) -> usize {
        self.vertices.len() / VERTICES_PER_FACE
    }
}

/// Whether the face of block `(x, y, z)` on `side` borders air or an unlinked boundary.
fn is_exposed(
    chunk: &Chunk,
    neighbors: &NeighborChunks<'_>,
    x: usize,
    y: usize,
    z: usize,
    side: BlockSide,
) -> bool {
    let offset = side.offset();
    let nx = x as i32 + offset.x;
    let ny = y as i32 + offset.y;
    let nz = z as i32 + offset.z;

    let inside = nx >= 0
        && ny >= 0
        && nz >= 0
        && Chunk::contains_local(nx as usize, ny as usize, nz as usize);
    if inside {
        return chunk.get(nx as usize, ny as usize, nz as usize) == BlockKind::Air;
    }

    match neighbors[side.index()] {
        Some(neighbor) => {
            let wx = nx.rem_euclid(CHUNK_WIDTH as i32) as usize;
            let wy = ny.rem_euclid(CHUNK_HEIGHT as i32) as usize;
            let wz = nz.rem_euclid(CHUNK_DEPTH as i32) as usize;
            neighbor.get(wx, wy, wz) == BlockKind::Air
        }
        None => true,
    }
}
