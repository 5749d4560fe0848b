//! # Chunk Streaming Handler
//!
//! This module defines the `ChunkStreamer`, the state machine the streaming worker runs.
//! It keeps the set of loaded chunks equal to the view window around the latest origin:
//!
//! 1. `NewOrigin` remembers the origin, evicts every chunk outside the new window and
//!    starts a spiral at ring offset zero.
//! 2. Each `Generate` step fills one vertical column of the window, top to bottom, then
//!    enqueues the next step of the spiral until the spiral leaves the window.
//!
//! Steps scheduled for an older origin are dropped when they come up, since every origin
//! change starts a fresh spiral of its own.

use std::sync::Arc;

use log::{info, trace};

use super::{
    spiral::{next_ring_offset, ring_of},
    ChunkStreamEvent,
};
use crate::engine_state::{
    config::ViewDistance,
    task_management::{EventHandler, EventQueue},
    voxels::{chunk::ChunkCoordinate, chunk_map::ChunkMap, terrain::TerrainGenerator},
};

/// Streams chunks into a shared [`ChunkMap`].
pub struct ChunkStreamer {
    /// The map shared with the render thread.
    chunks: Arc<ChunkMap>,
    /// Owned by the worker; never shared.
    generator: TerrainGenerator,
    /// Size of the window kept loaded.
    view_distance: ViewDistance,
    /// Last origin received, `None` before the first `NewOrigin`.
    origin: Option<ChunkCoordinate>,
}

impl ChunkStreamer {
    /// Creates a streamer with no origin.
    ///
    /// # Arguments
    /// * `chunks` - The map to fill
    /// * `generator` - Terrain source for missing chunks
    /// * `view_distance` - Window size around the origin
    pub fn new(
        chunks: Arc<ChunkMap>,
        generator: TerrainGenerator,
        view_distance: ViewDistance,
    ) -> Self {
        Self {
            chunks,
            generator,
            view_distance,
            origin: None,
        }
    }

    /// The origin the streamer is currently working towards.
    pub fn origin(&self) -> Option<ChunkCoordinate> {
        self.origin
    }

    fn on_new_origin(&mut self, origin: ChunkCoordinate, queue: &EventQueue<ChunkStreamEvent>) {
        self.origin = Some(origin);

        let evicted = self.chunks.evict_outside(origin, self.view_distance);
        info!(
            "New streaming origin {:?}: evicted {} chunks, {} remain",
            origin,
            evicted,
            self.chunks.len()
        );

        queue.push(ChunkStreamEvent::Generate {
            origin,
            ring_offset: ChunkCoordinate::default(),
        });
    }

    fn on_generate(
        &mut self,
        origin: ChunkCoordinate,
        ring_offset: ChunkCoordinate,
        queue: &EventQueue<ChunkStreamEvent>,
    ) {
        if self.origin != Some(origin) {
            trace!(
                "Discarded stale generation step {:?} for origin {:?}",
                ring_offset,
                origin
            );
            return;
        }

        // Top-down, nearest the surface first.
        let vertical = self.view_distance.vertical;
        for dy in (-vertical..=vertical).rev() {
            let coordinate = origin + ChunkCoordinate::new(ring_offset.x, dy, ring_offset.z);
            self.chunks.ensure_chunk(coordinate, &self.generator);
        }

        let next = next_ring_offset(ring_offset);
        if ring_of(next) > self.view_distance.horizontal {
            info!(
                "Streaming around {:?} complete: {} chunks loaded",
                origin,
                self.chunks.len()
            );
            return;
        }

        queue.push(ChunkStreamEvent::Generate {
            origin,
            ring_offset: next,
        });
    }
}

impl EventHandler<ChunkStreamEvent> for ChunkStreamer {
    fn handle_event(&mut self, event: ChunkStreamEvent, queue: &EventQueue<ChunkStreamEvent>) {
        match event {
            ChunkStreamEvent::NewOrigin { origin } => self.on_new_origin(origin, queue),
            ChunkStreamEvent::Generate {
                origin,
                ring_offset,
            } => self.on_generate(origin, ring_offset, queue),
        }
    }

    fn on_finish(&mut self) {
        info!(
            "Chunk streaming stopped with {} chunks loaded",
            self.chunks.len()
        );
    }
}
