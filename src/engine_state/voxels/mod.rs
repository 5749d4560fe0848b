//! # Voxel World Core
//!
//! This module contains the voxel world itself: how blocks are stored, how chunks are
//! generated and streamed around a moving viewpoint, and how they are kept linked to
//! their neighbors.
//!
//! ## Architecture
//!
//! * **Block**: the block kinds and the six axis-aligned sides
//! * **Chunk**: fixed-size 3D arrays of blocks with neighbor links and a mesh cache
//! * **Chunk Map**: the shared owner of all loaded chunks
//! * **Terrain**: deterministic noise terrain for new chunks
//! * **Tasks**: the streaming events and the worker-side state machine
//! * **World**: ties it together for the main thread
//!
//! ## Data Flow
//!
//! 1. The viewpoint enters a new chunk and an origin event is posted
//! 2. The streaming worker evicts chunks outside the window and generates missing ones
//! 3. Inserting or evicting a chunk marks its neighbors dirty
//! 4. The next render rebuilds dirty meshes on the main thread and draws every chunk

pub mod block;
pub mod chunk;
pub mod chunk_map;
pub mod tasks;
pub mod terrain;
pub mod world;
