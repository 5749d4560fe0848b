//! # World Module
//!
//! This module provides the `World` struct, the entry point of the voxel core. A world
//! owns the shared chunk map and the streaming worker, and exposes block access and the
//! per-frame render call to the main thread.
//!
//! ## Architecture
//!
//! The world is sparse: only chunks inside the view window around the current origin (plus
//! chunks created by explicit edits) are loaded. Origin changes are posted to the
//! streaming worker, which evicts and generates chunks in the background while the main
//! thread keeps rendering whatever is loaded.
//!
//! ## Threads
//!
//! - The main thread calls `render`, `set_block`, `block_at` and posts origin changes.
//! - The streaming worker owns its own terrain generator and only touches the chunk map.
//!
//! Dropping the world stops the worker and joins it.

use std::sync::Arc;
use std::time::Duration;

use cgmath::{Matrix4, Point3};
use log::info;

use crate::core::MtResource;
use crate::engine_state::{
    config::WorldConfig,
    rendering::{RenderBackend, TextureHandle},
    task_management::{EventQueue, EventThread},
    voxels::{
        block::{BlockKind, BlockSide},
        chunk::{Chunk, ChunkCoordinate, CHUNK_DEPTH, CHUNK_HEIGHT, CHUNK_WIDTH},
        chunk_map::{ChunkMap, FrameStats},
        tasks::{ChunkStreamEvent, ChunkStreamer},
        terrain::TerrainGenerator,
    },
};
use crate::error::{Result, WorldError};

/// Name of the streaming worker thread.
pub const STREAMING_THREAD_NAME: &str = "chunk-streaming";

/// A cloneable, thread-safe way to move the streaming origin.
///
/// Handed to the camera side so that origin changes can be posted from wherever the
/// viewpoint is updated.
#[derive(Clone)]
pub struct OriginHandle {
    queue: Arc<EventQueue<ChunkStreamEvent>>,
}

impl OriginHandle {
    /// Posts a new origin to the streaming worker.
    ///
    /// Returns `false` if the world has already been shut down.
    pub fn set_origin(&self, origin: ChunkCoordinate) -> bool {
        self.queue.push(ChunkStreamEvent::NewOrigin { origin })
    }
}

/// A streamed voxel world.
///
/// # Examples
///
/// ```
/// use cgmath::Point3;
/// use voxel_world::{BlockKind, TextureHandle, World, WorldConfig};
///
/// let world = World::new(WorldConfig::default(), TextureHandle(0)).unwrap();
///
/// world.set_block(Point3::new(5, 300, -3), BlockKind::Stone);
/// assert_eq!(world.block_at(Point3::new(5, 300, -3)), Some(BlockKind::Stone));
/// ```
pub struct World {
    config: WorldConfig,
    chunks: Arc<ChunkMap>,
    /// Creates chunks for edits on the calling thread; the worker owns its own.
    generator: TerrainGenerator,
    texture: TextureHandle,
    streaming: EventThread<ChunkStreamEvent>,
}

impl World {
    /// Validates `config`, creates an empty world and starts the streaming worker.
    ///
    /// Nothing is streamed until the first origin is set.
    ///
    /// # Arguments
    /// * `config` - World settings
    /// * `texture` - The atlas texture bound before chunks are drawn
    ///
    /// # Errors
    /// Returns [`WorldError::Config`] for an invalid config and [`WorldError::WorkerSpawn`]
    /// if the worker thread could not be started.
    pub fn new(config: WorldConfig, texture: TextureHandle) -> Result<Self> {
        config.validate()?;

        let chunks = Arc::new(ChunkMap::new());
        let streamer = ChunkStreamer::new(
            chunks.clone(),
            TerrainGenerator::new(config.seed, config.terrain.clone()),
            config.view_distance,
        );
        let streaming = EventThread::spawn(STREAMING_THREAD_NAME, streamer)
            .map_err(WorldError::WorkerSpawn)?;

        info!(
            "Created world with seed {} and view distance {:?}",
            config.seed, config.view_distance
        );

        Ok(World {
            generator: TerrainGenerator::new(config.seed, config.terrain.clone()),
            config,
            chunks,
            texture,
            streaming,
        })
    }

    /// The settings the world was created with.
    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// The atlas texture bound by [`World::render`].
    pub fn texture(&self) -> TextureHandle {
        self.texture
    }

    /// The shared chunk map.
    pub fn chunk_map(&self) -> &Arc<ChunkMap> {
        &self.chunks
    }

    /// A handle that posts origin changes to this world's streaming worker.
    pub fn origin_handle(&self) -> OriginHandle {
        OriginHandle {
            queue: self.streaming.queue().clone(),
        }
    }

    /// Moves the streaming window to be centered on `origin`.
    pub fn set_origin(&self, origin: ChunkCoordinate) -> bool {
        self.streaming.post(ChunkStreamEvent::NewOrigin { origin })
    }

    /// The chunk at `coordinate`, if loaded.
    pub fn chunk_at(&self, coordinate: ChunkCoordinate) -> Option<MtResource<Chunk>> {
        self.chunks.chunk_at(coordinate)
    }

    /// Number of loaded chunks.
    pub fn loaded_chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Coordinates of all loaded chunks, in no particular order.
    pub fn loaded_coordinates(&self) -> Vec<ChunkCoordinate> {
        self.chunks.coordinates()
    }

    /// The block at a world position, or `None` if its chunk is not loaded.
    pub fn block_at(&self, position: Point3<i32>) -> Option<BlockKind> {
        let (coordinate, [x, y, z]) = split_world_position(position);
        self.chunks
            .chunk_at(coordinate)
            .map(|chunk| chunk.get().get(x, y, z))
    }

    /// Sets the block at a world position.
    ///
    /// The containing chunk is generated first if it is not loaded, or generated again if it
    /// is evicted while the edit waits for its lock. When the block lies on
    /// a chunk face, the chunk across that face is marked dirty as well, since its
    /// boundary faces may change.
    pub fn set_block(&self, position: Point3<i32>, kind: BlockKind) {
        let (coordinate, [x, y, z]) = split_world_position(position);
        self.chunks
            .edit_chunk(coordinate, &self.generator, |chunk| chunk.set(x, y, z, kind));

        let mut boundary = Vec::new();
        if x == 0 {
            boundary.push(BlockSide::NegX);
        }
        if x == CHUNK_WIDTH - 1 {
            boundary.push(BlockSide::PosX);
        }
        if y == 0 {
            boundary.push(BlockSide::NegY);
        }
        if y == CHUNK_HEIGHT - 1 {
            boundary.push(BlockSide::PosY);
        }
        if z == 0 {
            boundary.push(BlockSide::NegZ);
        }
        if z == CHUNK_DEPTH - 1 {
            boundary.push(BlockSide::PosZ);
        }

        for side in boundary {
            if let Some(neighbor) = self.chunks.chunk_at(coordinate.neighbor(side)) {
                neighbor.get_mut().mark_dirty();
            }
        }
    }

    /// Draws every loaded chunk. Must be called on the thread owning the backend.
    ///
    /// # Arguments
    /// * `backend` - The render backend
    /// * `view_projection` - The camera's aggregated view-projection matrix
    ///
    /// # Returns
    /// What the frame did, for logging.
    pub fn render<B: RenderBackend + ?Sized>(
        &self,
        backend: &mut B,
        view_projection: Matrix4<f32>,
    ) -> FrameStats {
        backend.bind_texture(self.texture);
        self.chunks.render_all(backend, view_projection)
    }

    /// Blocks until the streaming worker has nothing left to do, or `timeout` elapses.
    ///
    /// Returns `true` if streaming settled.
    pub fn wait_until_idle(&self, timeout: Duration) -> bool {
        self.streaming.wait_idle(timeout)
    }
}

/// Splits a world block position into its chunk and the local cell inside it.
fn split_world_position(position: Point3<i32>) -> (ChunkCoordinate, [usize; 3]) {
    let coordinate = ChunkCoordinate::from_world_position(position);
    let origin = coordinate.to_world_origin();
    let local = [
        (position.x - origin.x) as usize,
        (position.y - origin.y) as usize,
        (position.z - origin.z) as usize,
    ];
    (coordinate, local)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::{config::ViewDistance, rendering::HeadlessBackend};
    use crate::error::ConfigError;

    fn small_world() -> World {
        let config = WorldConfig {
            view_distance: ViewDistance::new(1, 0),
            ..WorldConfig::default()
        };
        World::new(config, TextureHandle(3)).unwrap()
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = WorldConfig {
            view_distance: ViewDistance::new(-1, 0),
            ..WorldConfig::default()
        };

        let result = World::new(config, TextureHandle(0));

        assert!(matches!(
            result,
            Err(WorldError::Config(ConfigError::InvalidValue { .. }))
        ));
    }

    #[test]
    fn split_handles_negative_positions() {
        let (coordinate, local) = split_world_position(Point3::new(-1, -1, 16));
        assert_eq!(coordinate, ChunkCoordinate::new(-1, -1, 1));
        assert_eq!(local, [CHUNK_WIDTH - 1, CHUNK_HEIGHT - 1, 0]);
    }

    #[test]
    fn set_block_creates_missing_chunk() {
        let world = small_world();
        let position = Point3::new(-20, 400, 7);
        assert_eq!(world.block_at(position), None);

        world.set_block(position, BlockKind::Dirt);

        assert_eq!(world.block_at(position), Some(BlockKind::Dirt));
        assert_eq!(world.loaded_chunk_count(), 1);
    }

    #[test]
    fn set_block_after_eviction_lands_in_a_loaded_chunk() {
        let world = small_world();
        let position = Point3::new(5, 300, 5);
        let coordinate = ChunkCoordinate::from_world_position(position);
        world.set_block(position, BlockKind::Stone);
        let evicted = world.chunk_at(coordinate).unwrap();
        assert!(world.chunk_map().evict(coordinate));

        world.set_block(position, BlockKind::Dirt);

        assert!(evicted.get().is_released());
        assert_eq!(evicted.get().get(5, 300 - 256, 5), BlockKind::Stone);
        assert_eq!(world.block_at(position), Some(BlockKind::Dirt));
        assert!(!world.chunk_at(coordinate).unwrap().get().is_released());
    }

    #[test]
    fn set_block_on_boundary_dirties_the_neighbor() {
        let world = small_world();
        let mut backend = HeadlessBackend::new();
        world.set_block(Point3::new(0, 300, 0), BlockKind::Stone);
        world.set_block(Point3::new(-1, 300, 0), BlockKind::Stone);
        world.render(&mut backend, Matrix4::from_scale(1.0));
        let west = world.chunk_at(ChunkCoordinate::new(-1, 2, 0)).unwrap();
        assert!(!west.get().is_dirty());

        world.set_block(Point3::new(0, 300, 0), BlockKind::Air);

        assert!(west.get().is_dirty());
    }

    #[test]
    fn edits_across_a_boundary_cull_the_shared_face() {
        let world = small_world();
        let mut backend = HeadlessBackend::new();
        world.set_block(Point3::new(15, 300, 4), BlockKind::Stone);
        world.set_block(Point3::new(16, 300, 4), BlockKind::Stone);

        let stats = world.render(&mut backend, Matrix4::from_scale(1.0));

        assert_eq!(stats.vertices_drawn, 2 * 36 - 2 * 6);
        assert_eq!(backend.bound_texture(), Some(TextureHandle(3)));
    }

    #[test]
    fn origin_handle_stops_working_after_drop() {
        let world = small_world();
        let handle = world.origin_handle();
        drop(world);

        assert!(!handle.set_origin(ChunkCoordinate::default()));
    }
}
