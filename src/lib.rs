#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::invalid_rust_codeblocks)]

//! # Voxel World
//!
//! A chunked voxel world that streams procedurally generated terrain around a moving
//! viewpoint.
//!
//! The world is split into fixed-size chunks of blocks. A background worker keeps every
//! chunk inside a box around the viewpoint's chunk loaded, generating missing chunks
//! nearest-first along a square spiral and evicting chunks that fall outside. Loaded
//! chunks are linked to their six neighbors so that meshing can cull faces across chunk
//! boundaries. Meshes are rebuilt lazily on the render thread, through a small
//! [`RenderBackend`] trait that keeps the core independent of any graphics API.
//!
//! ## Key Modules
//!
//! * `core` - Shared handles and the observable property
//! * `engine_state` - Configuration, task management, voxels, rendering and camera
//! * `error` - Recoverable error types
//!
//! ## Usage
//!
//! ```no_run
//! use std::time::Duration;
//! use cgmath::Matrix4;
//! use voxel_world::{ChunkCoordinate, HeadlessBackend, TextureHandle, World, WorldConfig};
//!
//! let world = World::new(WorldConfig::default(), TextureHandle(0))?;
//! world.set_origin(ChunkCoordinate::new(0, 0, 0));
//! world.wait_until_idle(Duration::from_secs(60));
//!
//! let mut backend = HeadlessBackend::new();
//! let stats = world.render(&mut backend, Matrix4::from_scale(1.0));
//! println!("drew {} chunks", stats.chunks_drawn);
//! # Ok::<(), voxel_world::WorldError>(())
//! ```
//!
//! ## Threads
//!
//! The main thread owns the render backend and the camera. The streaming worker owns its
//! terrain generator. Both share the chunk map; dropping the [`World`] stops and joins
//! the worker.

use std::env;
use std::time::Duration;

use cgmath::{Deg, Point3};
use log::{info, warn};

pub mod core;
pub mod engine_state;
pub mod error;

pub use engine_state::{
    camera_state::CameraState,
    config::{TerrainConfig, ViewDistance, WorldConfig},
    rendering::{BufferHandle, HeadlessBackend, RenderBackend, TextureHandle, Vertex},
    voxels::{
        block::{BlockKind, BlockSide},
        chunk::{Chunk, ChunkCoordinate},
        chunk_map::{ChunkMap, FrameStats},
        terrain::TerrainGenerator,
        world::{OriginHandle, World},
    },
};
pub use error::{ConfigError, WorldError};

use engine_state::camera_state::{Camera, Projection};

/// Environment variable naming a JSON [`WorldConfig`] file for [`run`].
pub const CONFIG_PATH_VARIABLE: &str = "VOXEL_WORLD_CONFIG";

/// How long [`run`] waits for streaming to settle at each stop of the camera path.
const SETTLE_TIMEOUT: Duration = Duration::from_secs(120);

/// Stops of the demo flight, in world units.
const CAMERA_PATH: [[f32; 3]; 4] = [
    [8.0, 96.0, 8.0],
    [40.0, 96.0, 8.0],
    [40.0, 96.0, -60.0],
    [-100.0, 140.0, -60.0],
];

/// Runs the headless demo.
///
/// Initializes logging from `RUST_LOG`, loads the config named by
/// [`CONFIG_PATH_VARIABLE`] (defaults otherwise), then flies a camera along a short path.
/// At every stop it waits for streaming to settle and renders one frame into a
/// [`HeadlessBackend`], logging what the frame did.
///
/// # Errors
/// Returns an error if the config cannot be loaded or the world cannot be created.
pub fn run() -> Result<(), WorldError> {
    let mut log_builder = env_logger::Builder::new();
    log_builder
        .target(env_logger::Target::Stdout)
        .parse_env("RUST_LOG")
        .init();

    info!("Logger initialized");

    let config = match env::var_os(CONFIG_PATH_VARIABLE) {
        Some(path) => {
            info!("Loading world config from {:?}", path);
            WorldConfig::from_file(path)?
        }
        None => WorldConfig::default(),
    };

    let world = World::new(config, TextureHandle(0))?;
    let mut backend = HeadlessBackend::new();

    let start = CAMERA_PATH[0];
    let mut camera_state = CameraState::new(
        Camera::new(Point3::from(start), Deg(0.0), Deg(-20.0)),
        Projection::new(1280, 720, Deg(45.0), 0.1, 1000.0),
    );

    let origin_handle = world.origin_handle();
    origin_handle.set_origin(camera_state.chunk_position());
    camera_state.subscribe_chunk_position(move |chunk| {
        origin_handle.set_origin(*chunk);
    });

    for (stop, position) in CAMERA_PATH.iter().enumerate() {
        camera_state.set_position(Point3::from(*position));
        camera_state.rotate(Deg(45.0), Deg(0.0));

        if !world.wait_until_idle(SETTLE_TIMEOUT) {
            warn!(
                "Streaming around {:?} did not settle within {:?}",
                camera_state.chunk_position(),
                SETTLE_TIMEOUT
            );
        }

        backend.begin_frame();
        let stats = world.render(&mut backend, camera_state.view_projection());
        info!(
            "Stop {} at chunk {:?}: {} chunks loaded, {} drawn, {} meshes rebuilt, {} vertices, {} buffers released",
            stop,
            camera_state.chunk_position(),
            world.loaded_chunk_count(),
            stats.chunks_drawn,
            stats.meshes_rebuilt,
            stats.vertices_drawn,
            stats.buffers_released
        );
    }

    info!(
        "Demo finished with {} live vertex buffers",
        backend.live_buffer_count()
    );
    Ok(())
}
