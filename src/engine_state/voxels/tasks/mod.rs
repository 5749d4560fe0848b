//! # Voxel Task System
//!
//! This module contains the events driving chunk streaming and the handler that runs
//! them on the streaming worker. Streaming is split into one event per chunk column so
//! that an origin change can overtake a spiral that is still in progress.

pub mod chunk_generation_task;
pub mod spiral;

pub use chunk_generation_task::ChunkStreamer;

use crate::engine_state::{task_management::Event, voxels::chunk::ChunkCoordinate};

/// Priority of [`ChunkStreamEvent::NewOrigin`]. Served before any generation step.
pub const NEW_ORIGIN_PRIORITY: usize = 1;

/// Priority of [`ChunkStreamEvent::Generate`].
pub const GENERATE_PRIORITY: usize = 10;

/// Work items of the streaming worker.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ChunkStreamEvent {
    /// The viewpoint entered a different chunk.
    NewOrigin {
        /// Chunk containing the viewpoint.
        origin: ChunkCoordinate,
    },
    /// Fill one vertical column of the window, then continue the spiral.
    Generate {
        /// The origin this step was scheduled for; stale if the origin has moved since.
        origin: ChunkCoordinate,
        /// Horizontal offset of the column from the origin (`y` is always 0).
        ring_offset: ChunkCoordinate,
    },
}

impl Event for ChunkStreamEvent {
    fn priority(&self) -> usize {
        match self {
            ChunkStreamEvent::NewOrigin { .. } => NEW_ORIGIN_PRIORITY,
            ChunkStreamEvent::Generate { .. } => GENERATE_PRIORITY,
        }
    }
}
