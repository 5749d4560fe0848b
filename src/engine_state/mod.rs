//! # Engine State Module
//!
//! The subsystems of the voxel world.
//!
//! ## Key Components
//!
//! * `camera_state` - Viewpoint position, chunk tracking and view-projection matrix
//! * `config` - World, view distance and terrain settings
//! * `rendering` - Render backend contract, meshing, atlas lookup and a headless backend
//! * `task_management` - Priority event queue and the worker thread that drains it
//! * `voxels` - Blocks, chunks, terrain generation, streaming and the world itself
//!
//! ## Architecture
//!
//! Two threads share the world. The main thread moves the camera, posts origin changes
//! and renders; the streaming worker evicts and generates chunks. They communicate only
//! through the event queue and the locked chunk map, and every graphics call stays on
//! the main thread.

pub mod camera_state;
pub mod config;
pub mod rendering;
pub mod task_management;
pub mod voxels;
