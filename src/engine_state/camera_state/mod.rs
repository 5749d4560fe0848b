//! # Camera State Management
//!
//! This module is the viewpoint side of the world: it tracks where the camera is, which
//! chunk it is in, and the aggregated view-projection matrix handed to the renderer.
//!
//! ## Core Components
//! - `Camera`: The camera's position and orientation in 3D space
//! - `Projection`: The camera's projection matrix
//! - `CameraState`: Owns both, plus an observable chunk position
//!
//! Movement logic lives outside this module. Whoever moves the viewpoint calls
//! [`CameraState::set_position`], and listeners of the chunk position (typically the
//! world's origin handle) hear about it only when the camera crosses a chunk boundary.

use cgmath::{Matrix4, Point3, Rad};

use crate::core::{ListenerId, Property};
use crate::engine_state::voxels::chunk::ChunkCoordinate;

pub mod camera;

pub use camera::{Camera, Projection};

/// Owns the camera, its projection and the chunk the camera is currently in.
///
/// # Examples
///
/// ```
/// use std::sync::{Arc, Mutex};
/// use cgmath::{Deg, Point3};
/// use voxel_world::{CameraState, ChunkCoordinate};
/// use voxel_world::engine_state::camera_state::{Camera, Projection};
///
/// let mut camera_state = CameraState::new(
///     Camera::new(Point3::new(0.5, 10.0, 0.5), Deg(0.0), Deg(0.0)),
///     Projection::new(800, 600, Deg(45.0), 0.1, 1000.0),
/// );
///
/// let crossings = Arc::new(Mutex::new(Vec::new()));
/// let sink = crossings.clone();
/// camera_state.subscribe_chunk_position(move |chunk: &ChunkCoordinate| {
///     sink.lock().unwrap().push(*chunk);
/// });
///
/// camera_state.set_position(Point3::new(4.0, 10.0, 0.5));
/// camera_state.set_position(Point3::new(17.0, 10.0, 0.5));
///
/// assert_eq!(*crossings.lock().unwrap(), vec![ChunkCoordinate::new(1, 0, 0)]);
/// ```
pub struct CameraState {
    camera: Camera,
    projection: Projection,
    chunk_position: Property<ChunkCoordinate>,
}

impl CameraState {
    /// Creates a camera state. The chunk position starts at the chunk containing the
    /// camera; no listener is notified for it.
    pub fn new(camera: Camera, projection: Projection) -> Self {
        let chunk_position = Property::new(ChunkCoordinate::from_world_point(camera.position));
        Self {
            camera,
            projection,
            chunk_position,
        }
    }

    /// The camera.
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// The projection.
    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    /// Mutable access to the projection, e.g. to resize it.
    pub fn projection_mut(&mut self) -> &mut Projection {
        &mut self.projection
    }

    /// Moves the camera.
    ///
    /// Returns `true` if the camera entered a different chunk, after the chunk position
    /// listeners have been notified.
    pub fn set_position(&mut self, position: Point3<f32>) -> bool {
        self.camera.position = position;
        self.chunk_position
            .set(ChunkCoordinate::from_world_point(position))
    }

    /// Turns the camera.
    pub fn rotate<Y: Into<Rad<f32>>, P: Into<Rad<f32>>>(&mut self, yaw: Y, pitch: P) {
        self.camera.rotate(yaw, pitch);
    }

    /// The chunk the camera is in.
    pub fn chunk_position(&self) -> ChunkCoordinate {
        *self.chunk_position.get()
    }

    /// Registers a listener called whenever the camera enters a different chunk.
    pub fn subscribe_chunk_position<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&ChunkCoordinate) + Send + 'static,
    {
        self.chunk_position.subscribe(listener)
    }

    /// Removes a chunk position listener.
    pub fn unsubscribe_chunk_position(&mut self, id: ListenerId) -> bool {
        self.chunk_position.unsubscribe(id)
    }

    /// The aggregated projection * view matrix.
    pub fn view_projection(&self) -> Matrix4<f32> {
        self.projection.calc_matrix() * self.camera.calc_matrix()
    }
}
