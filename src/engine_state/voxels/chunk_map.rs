//! # Chunk Map
//!
//! The owning collection of loaded chunks, shared between the streaming worker and the
//! render thread.
//!
//! ## Locking
//!
//! The map itself sits behind one `Mutex`; each chunk sits behind its own `RwLock` inside
//! an [`MtResource`]. A third mutex, the link lock, serializes `insert` and `evict`, the
//! only operations that edit neighbor links. Locks are taken in that order: link lock,
//! then map lock, then chunk locks. No chunk is ever locked while the map lock is held, so
//! a chunk held by the render thread never blocks lookups.
//!
//! Rendering resolves neighbor handles under the map lock, releases it, and only then locks
//! the chunk it draws together with its neighbors. It never takes the link lock.
//!
//! ## Neighbor Consistency
//!
//! `insert` links a new chunk with every present neighbor in both directions, and `evict`
//! clears the reciprocal link on every neighbor before the chunk is dropped. Both mark the
//! neighbors dirty, since a face on the shared boundary may have appeared or disappeared.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use cgmath::Matrix4;
use log::debug;

use crate::core::MtResource;
use crate::engine_state::{
    config::ViewDistance,
    rendering::{meshing::NeighborChunks, BufferHandle, RenderBackend, MVP_UNIFORM_NAME},
    voxels::{
        block::BlockSide,
        chunk::{Chunk, ChunkCoordinate},
        terrain::TerrainGenerator,
    },
};

/// Shared handles of the six neighbors of a chunk, indexed by `BlockSide`.
pub type NeighborHandles = [Option<MtResource<Chunk>>; 6];

/// What one call to [`ChunkMap::render_all`] did.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Chunks that issued a draw call.
    pub chunks_drawn: usize,
    /// Chunks whose mesh was rebuilt before drawing.
    pub meshes_rebuilt: usize,
    /// Total vertices drawn.
    pub vertices_drawn: u64,
    /// Buffers of evicted chunks deleted at the start of the frame.
    pub buffers_released: usize,
}

/// Loaded chunks keyed by coordinate. At most one chunk exists per coordinate.
#[derive(Default)]
pub struct ChunkMap {
    chunks: Mutex<HashMap<ChunkCoordinate, MtResource<Chunk>>>,
    links: Mutex<()>,
    retired_buffers: Mutex<Vec<BufferHandle>>,
}

impl ChunkMap {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<ChunkCoordinate, MtResource<Chunk>>> {
        self.chunks.lock().expect("chunk map lock poisoned")
    }

    /// The chunk at `coordinate`, if loaded.
    pub fn chunk_at(&self, coordinate: ChunkCoordinate) -> Option<MtResource<Chunk>> {
        self.lock().get(&coordinate).cloned()
    }

    /// Whether a chunk is loaded at `coordinate`.
    pub fn contains(&self, coordinate: ChunkCoordinate) -> bool {
        self.lock().contains_key(&coordinate)
    }

    /// Number of loaded chunks.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether no chunk is loaded.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Coordinates of all loaded chunks, in no particular order.
    pub fn coordinates(&self) -> Vec<ChunkCoordinate> {
        self.lock().keys().copied().collect()
    }

    /// Handles of all loaded chunks, taken under a single lock.
    pub fn snapshot(&self) -> Vec<(ChunkCoordinate, MtResource<Chunk>)> {
        self.lock()
            .iter()
            .map(|(coordinate, chunk)| (*coordinate, chunk.clone()))
            .collect()
    }

    /// Resolves neighbor links to shared handles. Links to chunks that are no longer
    /// loaded resolve to `None`.
    pub fn resolve_neighbors(&self, links: [Option<ChunkCoordinate>; 6]) -> NeighborHandles {
        let chunks = self.lock();
        links.map(|link| link.and_then(|coordinate| chunks.get(&coordinate).cloned()))
    }

    /// Adds `chunk` and links it with its present neighbors in both directions.
    ///
    /// If a chunk already exists at the same coordinate, the existing chunk is kept and
    /// returned and `chunk` is dropped.
    pub fn insert(&self, mut chunk: Chunk) -> MtResource<Chunk> {
        let coordinate = chunk.coordinate();
        let _links = self.links.lock().expect("chunk link lock poisoned");

        let (handle, linked) = {
            let mut chunks = self.lock();
            if let Some(existing) = chunks.get(&coordinate) {
                return existing.clone();
            }

            let mut linked = Vec::with_capacity(6);
            for side in BlockSide::all() {
                let neighbor_coordinate = coordinate.neighbor(side);
                if let Some(neighbor) = chunks.get(&neighbor_coordinate) {
                    chunk.set_neighbor(side, Some(neighbor_coordinate));
                    linked.push((side, neighbor.clone()));
                }
            }

            let handle = MtResource::new(chunk);
            chunks.insert(coordinate, handle.clone());
            (handle, linked)
        };

        for (side, neighbor) in linked {
            let mut neighbor = neighbor.get_mut();
            neighbor.set_neighbor(side.opposite(), Some(coordinate));
            neighbor.mark_dirty();
        }

        handle
    }

    /// Returns the chunk at `coordinate`, generating and inserting it first if absent.
    ///
    /// Generation runs without the map lock held.
    pub fn ensure_chunk(
        &self,
        coordinate: ChunkCoordinate,
        generator: &TerrainGenerator,
    ) -> MtResource<Chunk> {
        if let Some(existing) = self.chunk_at(coordinate) {
            return existing;
        }

        self.insert(generator.generate_chunk(coordinate))
    }

    /// Runs `edit` on the chunk at `coordinate` under its write lock, generating the chunk
    /// first if absent.
    ///
    /// A chunk evicted between lookup and locking is never edited; a fresh one is generated
    /// and edited instead.
    pub fn edit_chunk<R>(
        &self,
        coordinate: ChunkCoordinate,
        generator: &TerrainGenerator,
        edit: impl FnOnce(&mut Chunk) -> R,
    ) -> R {
        loop {
            let handle = self.ensure_chunk(coordinate, generator);
            let mut chunk = handle.get_mut();
            if !chunk.is_released() {
                return edit(&mut *chunk);
            }
        }
    }

    /// Removes the chunk at `coordinate` and unlinks it from its neighbors.
    ///
    /// The chunk's backend buffer is queued for deletion on the render thread. Returns
    /// `false` if nothing was loaded there.
    pub fn evict(&self, coordinate: ChunkCoordinate) -> bool {
        let _links = self.links.lock().expect("chunk link lock poisoned");
        let Some(handle) = self.lock().remove(&coordinate) else {
            return false;
        };

        let (links, buffer) = {
            let mut chunk = handle.get_mut();
            let links = chunk.neighbors();
            (links, chunk.release())
        };

        for link in links.into_iter().flatten() {
            if let Some(neighbor) = self.chunk_at(link) {
                let mut neighbor = neighbor.get_mut();
                neighbor.unlink(coordinate);
                neighbor.mark_dirty();
            }
        }

        if let Some(buffer) = buffer {
            self.retired_buffers
                .lock()
                .expect("retired buffer lock poisoned")
                .push(buffer);
        }

        true
    }

    /// Evicts every chunk outside the window of `view_distance` around `origin`.
    ///
    /// Returns the number of evicted chunks.
    pub fn evict_outside(&self, origin: ChunkCoordinate, view_distance: ViewDistance) -> usize {
        let outside: Vec<ChunkCoordinate> = self
            .coordinates()
            .into_iter()
            .filter(|coordinate| {
                let offset = *coordinate - origin;
                !view_distance.contains_offset(offset.x, offset.y, offset.z)
            })
            .collect();

        outside
            .into_iter()
            .filter(|coordinate| self.evict(*coordinate))
            .count()
    }

    /// Takes the buffers of evicted chunks that still have to be deleted.
    pub fn take_retired_buffers(&self) -> Vec<BufferHandle> {
        std::mem::take(&mut *self.retired_buffers.lock().expect("retired buffer lock poisoned"))
    }

    /// Draws every loaded chunk.
    ///
    /// Deletes retired buffers first, then for each chunk sets the MVP uniform to
    /// `view_projection * model` and calls [`Chunk::render`], which rebuilds dirty meshes
    /// against the current neighbors. Must be called on the render thread.
    pub fn render_all<B: RenderBackend + ?Sized>(
        &self,
        backend: &mut B,
        view_projection: Matrix4<f32>,
    ) -> FrameStats {
        let mut stats = FrameStats::default();

        for buffer in self.take_retired_buffers() {
            backend.delete_vertex_buffer(buffer);
            stats.buffers_released += 1;
        }

        for (_, handle) in self.snapshot() {
            let mut links = handle.get().neighbors();
            loop {
                let neighbor_handles = self.resolve_neighbors(links);
                let mut chunk = handle.get_mut();

                // A neighbor was linked or unlinked in between; resolve again.
                if chunk.neighbors() != links {
                    links = chunk.neighbors();
                    continue;
                }
                if chunk.is_released() {
                    break;
                }

                let guards = neighbor_handles
                    .each_ref()
                    .map(|neighbor| neighbor.as_ref().map(|neighbor| neighbor.get()));
                let neighbors: NeighborChunks<'_> = guards.each_ref().map(|guard| guard.as_deref());

                if chunk.is_dirty() {
                    stats.meshes_rebuilt += 1;
                }
                backend.set_uniform_matrix(MVP_UNIFORM_NAME, view_projection * chunk.model_matrix());
                chunk.render(&neighbors, backend);

                if chunk.vertex_buffer().is_some() {
                    stats.chunks_drawn += 1;
                    stats.vertices_drawn += chunk.vertex_count() as u64;
                }
                break;
            }
        }

        debug!("Rendered frame: {:?}", stats);
        stats
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    };
    use std::thread;
    use std::time::{Duration, Instant};

    use super::*;
    use crate::engine_state::{
        config::TerrainConfig,
        rendering::HeadlessBackend,
        voxels::block::BlockKind,
    };

    fn assert_links_symmetric(map: &ChunkMap) {
        for (coordinate, handle) in map.snapshot() {
            let chunk = handle.get();
            for side in BlockSide::all() {
                let expected = coordinate.neighbor(side);
                match chunk.neighbor(side) {
                    Some(link) => {
                        assert_eq!(link, expected);
                        let neighbor = map.chunk_at(link).expect("linked chunk is loaded");
                        assert_eq!(neighbor.get().neighbor(side.opposite()), Some(coordinate));
                    }
                    None => assert!(!map.contains(expected), "{coordinate:?} misses {side:?}"),
                }
            }
        }
    }

    fn fill_block(map: &ChunkMap, radius: i32) {
        for x in -radius..=radius {
            for y in -radius..=radius {
                for z in -radius..=radius {
                    map.insert(Chunk::new(ChunkCoordinate::new(x, y, z)));
                }
            }
        }
    }

    #[test]
    fn insert_links_both_directions() {
        let map = ChunkMap::new();
        let a = ChunkCoordinate::new(0, 0, 0);
        let b = ChunkCoordinate::new(0, 0, 1);

        map.insert(Chunk::new(a));
        map.insert(Chunk::new(b));

        let chunk_a = map.chunk_at(a).unwrap();
        let chunk_b = map.chunk_at(b).unwrap();
        assert_eq!(chunk_a.get().neighbor(BlockSide::PosZ), Some(b));
        assert_eq!(chunk_b.get().neighbor(BlockSide::NegZ), Some(a));
        assert_links_symmetric(&map);
    }

    #[test]
    fn insert_keeps_existing_chunk() {
        let map = ChunkMap::new();
        let coordinate = ChunkCoordinate::new(2, 0, 2);
        let first = map.insert(Chunk::filled(coordinate, BlockKind::Stone));

        let second = map.insert(Chunk::new(coordinate));

        assert!(first.ptr_eq(&second));
        assert_eq!(map.len(), 1);
        assert_eq!(second.get().get(0, 0, 0), BlockKind::Stone);
    }

    #[test]
    fn insert_marks_existing_neighbor_dirty() {
        let map = ChunkMap::new();
        let mut backend = HeadlessBackend::new();
        let a = ChunkCoordinate::new(0, 0, 0);
        map.insert(Chunk::new(a));
        map.render_all(&mut backend, Matrix4::from_scale(1.0));
        assert!(!map.chunk_at(a).unwrap().get().is_dirty());

        map.insert(Chunk::new(ChunkCoordinate::new(1, 0, 0)));

        assert!(map.chunk_at(a).unwrap().get().is_dirty());
    }

    #[test]
    fn evict_clears_reciprocal_links() {
        let map = ChunkMap::new();
        fill_block(&map, 1);
        assert_eq!(map.len(), 27);
        assert_links_symmetric(&map);

        assert!(map.evict(ChunkCoordinate::new(0, 0, 0)));
        assert!(!map.evict(ChunkCoordinate::new(0, 0, 0)));

        assert_eq!(map.len(), 26);
        assert_links_symmetric(&map);
        let east = map.chunk_at(ChunkCoordinate::new(1, 0, 0)).unwrap();
        assert_eq!(east.get().neighbor(BlockSide::NegX), None);
        assert!(east.get().is_dirty());
    }

    #[test]
    fn random_inserts_and_evictions_keep_links_symmetric() {
        let map = ChunkMap::new();
        for _ in 0..300 {
            let coordinate = ChunkCoordinate::new(
                fastrand::i32(-3..=3),
                fastrand::i32(-2..=2),
                fastrand::i32(-3..=3),
            );
            if fastrand::bool() {
                map.insert(Chunk::new(coordinate));
            } else {
                map.evict(coordinate);
            }
        }

        assert_links_symmetric(&map);
    }

    #[test]
    fn evict_outside_keeps_only_the_window() {
        let map = ChunkMap::new();
        fill_block(&map, 2);
        let origin = ChunkCoordinate::new(1, 0, 0);
        let view_distance = ViewDistance::new(1, 0);

        let evicted = map.evict_outside(origin, view_distance);

        assert_eq!(map.len(), 9);
        assert_eq!(evicted, 125 - 9);
        for coordinate in map.coordinates() {
            let offset = coordinate - origin;
            assert!(view_distance.contains_offset(offset.x, offset.y, offset.z));
        }
        assert_links_symmetric(&map);
    }

    #[test]
    fn evicted_buffers_are_deleted_on_next_render() {
        let map = ChunkMap::new();
        let mut backend = HeadlessBackend::new();
        let coordinate = ChunkCoordinate::new(0, 0, 0);
        map.insert(Chunk::new(coordinate));
        map.render_all(&mut backend, Matrix4::from_scale(1.0));
        let buffer = map.chunk_at(coordinate).unwrap().get().vertex_buffer();

        map.evict(coordinate);
        assert_eq!(backend.live_buffer_count(), 1);
        let stats = map.render_all(&mut backend, Matrix4::from_scale(1.0));

        assert_eq!(stats.buffers_released, 1);
        assert_eq!(backend.live_buffer_count(), 0);
        assert_eq!(buffer.map(|buffer| vec![buffer]), Some(backend.deleted_buffers.clone()));
    }

    #[test]
    fn render_all_sets_mvp_per_chunk_and_culls_shared_faces() {
        let map = ChunkMap::new();
        let mut backend = HeadlessBackend::new();
        map.insert(Chunk::filled(ChunkCoordinate::new(0, 0, 0), BlockKind::Stone));
        map.insert(Chunk::filled(ChunkCoordinate::new(1, 0, 0), BlockKind::Stone));
        let view_projection = Matrix4::from_scale(0.5);

        let stats = map.render_all(&mut backend, view_projection);

        assert_eq!(stats.chunks_drawn, 2);
        assert_eq!(stats.meshes_rebuilt, 2);
        assert_eq!(backend.draw_calls.len(), 2);
        for call in &backend.draw_calls {
            let mvp = call.model_view_projection.unwrap();
            let is_first = mvp == view_projection;
            let is_second = mvp
                == view_projection * Chunk::new(ChunkCoordinate::new(1, 0, 0)).model_matrix();
            assert!(is_first || is_second);
        }
        let faces = stats.vertices_drawn / 6;
        let full_shell = 2 * (16 * 128 + 128 * 16 + 16 * 16) as u64;
        assert_eq!(faces, 2 * full_shell - 2 * 16 * 128);
    }

    #[test]
    fn ensure_chunk_generates_once() {
        let map = ChunkMap::new();
        let generator = TerrainGenerator::new(1, TerrainConfig::default());
        let coordinate = ChunkCoordinate::new(0, 0, 0);

        let first = map.ensure_chunk(coordinate, &generator);
        let second = map.ensure_chunk(coordinate, &generator);

        assert!(first.ptr_eq(&second));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn ensure_chunk_does_not_depend_on_loaded_neighbors() {
        let generator = TerrainGenerator::new(
            1,
            TerrainConfig {
                max_height: 400,
                ..TerrainConfig::default()
            },
        );
        let coordinate = ChunkCoordinate::new(0, 0, 0);
        let alone = ChunkMap::new().ensure_chunk(coordinate, &generator);

        let map = ChunkMap::new();
        map.insert(Chunk::filled(coordinate.neighbor(BlockSide::PosY), BlockKind::Stone));
        map.insert(Chunk::new(coordinate.neighbor(BlockSide::NegX)));
        let crowded = map.ensure_chunk(coordinate, &generator);

        let (alone, crowded) = (alone.get(), crowded.get());
        for x in 0..16 {
            for z in 0..16 {
                for y in 0..128 {
                    assert_eq!(alone.get(x, y, z), crowded.get(x, y, z), "({x}, {y}, {z})");
                }
            }
        }
    }

    #[test]
    fn insert_leaves_the_map_usable_while_a_neighbor_is_locked() {
        let map = Arc::new(ChunkMap::new());
        let held = map.insert(Chunk::new(ChunkCoordinate::new(0, 0, 0)));
        let added = ChunkCoordinate::new(1, 0, 0);
        let guard = held.get();

        let inserter = {
            let map = Arc::clone(&map);
            thread::spawn(move || {
                map.insert(Chunk::new(added));
            })
        };

        let deadline = Instant::now() + Duration::from_secs(10);
        while !map.contains(added) {
            assert!(Instant::now() < deadline, "inserted chunk never appeared");
            thread::yield_now();
        }
        assert_eq!(map.len(), 2);
        assert_eq!(guard.neighbor(BlockSide::PosX), None);

        drop(guard);
        inserter.join().unwrap();
        assert_links_symmetric(&map);
    }

    #[test]
    fn edit_chunk_never_edits_an_evicted_chunk() {
        let map = Arc::new(ChunkMap::new());
        let generator = TerrainGenerator::new(3, TerrainConfig::default());
        let coordinate = ChunkCoordinate::new(0, 4, 0);
        let stop = Arc::new(AtomicBool::new(false));

        let evictor = {
            let map = Arc::clone(&map);
            let stop = Arc::clone(&stop);
            thread::spawn(move || {
                while !stop.load(Ordering::Relaxed) {
                    map.evict(coordinate);
                    thread::yield_now();
                }
            })
        };

        for step in 0..500 {
            let kind = if step % 2 == 0 { BlockKind::Stone } else { BlockKind::Dirt };
            let edited_released = map.edit_chunk(coordinate, &generator, |chunk| {
                chunk.set(3, 5, 7, kind);
                chunk.is_released()
            });
            assert!(!edited_released, "step {step} edited an evicted chunk");
        }

        stop.store(true, Ordering::Relaxed);
        evictor.join().unwrap();
        assert!(map.len() <= 1);
    }
}
