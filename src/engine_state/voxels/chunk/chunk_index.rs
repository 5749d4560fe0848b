//! # Chunk Index Module
//!
//! The single conversion between world block positions and chunk grid coordinates. Every
//! chunk lookup goes through [`ChunkCoordinate`], so there is exactly one place that
//! decides how negative positions round.

use std::ops::{Add, Sub};

use cgmath::{Point3, Vector3};

use crate::engine_state::voxels::block::BlockSide;

use super::{CHUNK_DEPTH, CHUNK_HEIGHT, CHUNK_WIDTH};

/// Integer address of a chunk in chunk-grid units.
///
/// Invariant: `coordinate = floor(world_block_position / chunk_extent)` per axis. The
/// derived `Hash` is what keys the chunk map; distinct coordinates never alias.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkCoordinate {
    /// Chunk index along X.
    pub x: i32,
    /// Chunk index along Y.
    pub y: i32,
    /// Chunk index along Z.
    pub z: i32,
}

impl ChunkCoordinate {
    /// Creates a chunk coordinate.
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// The chunk containing the world block at `position`.
    ///
    /// Uses floor division, so block `-1` lands in chunk `-1` and not chunk `0`.
    pub fn from_world_position(position: Point3<i32>) -> Self {
        Self {
            x: position.x.div_euclid(CHUNK_WIDTH as i32),
            y: position.y.div_euclid(CHUNK_HEIGHT as i32),
            z: position.z.div_euclid(CHUNK_DEPTH as i32),
        }
    }

    /// The chunk containing a continuous world-space point, e.g. a camera position.
    pub fn from_world_point(point: Point3<f32>) -> Self {
        Self {
            x: (point.x / CHUNK_WIDTH as f32).floor() as i32,
            y: (point.y / CHUNK_HEIGHT as f32).floor() as i32,
            z: (point.z / CHUNK_DEPTH as f32).floor() as i32,
        }
    }

    /// World position of this chunk's minimum corner.
    ///
    /// Every coordinate produced by [`ChunkCoordinate::from_world_position`] has an origin
    /// that fits in `i32`. Use [`ChunkCoordinate::checked_world_origin`] for coordinates
    /// from anywhere else.
    ///
    /// # Panics
    /// Panics if the origin overflows `i32` on any axis.
    pub fn to_world_origin(self) -> Point3<i32> {
        match self.checked_world_origin() {
            Some(origin) => origin,
            None => panic!("world origin of chunk {self:?} overflows i32"),
        }
    }

    /// World position of this chunk's minimum corner, or `None` if it overflows `i32`.
    pub fn checked_world_origin(self) -> Option<Point3<i32>> {
        Some(Point3::new(
            self.x.checked_mul(CHUNK_WIDTH as i32)?,
            self.y.checked_mul(CHUNK_HEIGHT as i32)?,
            self.z.checked_mul(CHUNK_DEPTH as i32)?,
        ))
    }

    /// The adjacent chunk in direction `side`.
    pub fn neighbor(self, side: BlockSide) -> Self {
        self + side.offset()
    }

    /// Largest per-axis distance to `other`.
    pub fn chebyshev_distance(self, other: ChunkCoordinate) -> i32 {
        let diff = self - other;
        diff.x.abs().max(diff.y.abs()).max(diff.z.abs())
    }
}

impl Add<Vector3<i32>> for ChunkCoordinate {
    type Output = ChunkCoordinate;

    fn add(self, rhs: Vector3<i32>) -> Self::Output {
        ChunkCoordinate::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Add for ChunkCoordinate {
    type Output = ChunkCoordinate;

    fn add(self, rhs: ChunkCoordinate) -> Self::Output {
        ChunkCoordinate::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for ChunkCoordinate {
    type Output = Vector3<i32>;

    fn sub(self, rhs: ChunkCoordinate) -> Self::Output {
        Vector3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl From<Point3<i32>> for ChunkCoordinate {
    fn from(point: Point3<i32>) -> Self {
        ChunkCoordinate::new(point.x, point.y, point.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_positions_floor_toward_negative_infinity() {
        assert_eq!(
            ChunkCoordinate::from_world_position(Point3::new(-1, -1, -1)),
            ChunkCoordinate::new(-1, -1, -1)
        );
        assert_eq!(
            ChunkCoordinate::from_world_position(Point3::new(-16, -128, -17)),
            ChunkCoordinate::new(-1, -1, -2)
        );
        assert_eq!(
            ChunkCoordinate::from_world_position(Point3::new(15, 127, 16)),
            ChunkCoordinate::new(0, 0, 1)
        );
    }

    #[test]
    fn world_origin_scales_by_extent() {
        assert_eq!(
            ChunkCoordinate::new(-1, 0, 2).to_world_origin(),
            Point3::new(-16, 0, 32)
        );
        assert_eq!(
            ChunkCoordinate::new(0, -2, 0).to_world_origin(),
            Point3::new(0, -256, 0)
        );
    }

    #[test]
    fn extreme_coordinates_have_no_world_origin() {
        let edge = ChunkCoordinate::from_world_position(Point3::new(i32::MIN, i32::MAX, i32::MIN));
        assert!(edge.checked_world_origin().is_some());

        assert_eq!(ChunkCoordinate::new(i32::MAX, 0, 0).checked_world_origin(), None);
        assert_eq!(ChunkCoordinate::new(0, i32::MIN / 64, 0).checked_world_origin(), None);
    }

    #[test]
    #[should_panic(expected = "overflows i32")]
    fn overflowing_world_origin_panics() {
        ChunkCoordinate::new(0, 0, i32::MIN).to_world_origin();
    }

    #[test]
    fn position_round_trip_yields_minimum_corner() {
        for _ in 0..1000 {
            let position = Point3::new(
                fastrand::i32(-10_000..10_000),
                fastrand::i32(-10_000..10_000),
                fastrand::i32(-10_000..10_000),
            );
            let origin = ChunkCoordinate::from_world_position(position).to_world_origin();

            assert!(origin.x <= position.x && position.x < origin.x + CHUNK_WIDTH as i32);
            assert!(origin.y <= position.y && position.y < origin.y + CHUNK_HEIGHT as i32);
            assert!(origin.z <= position.z && position.z < origin.z + CHUNK_DEPTH as i32);
        }
    }

    #[test]
    fn coordinate_round_trip_is_identity() {
        for _ in 0..1000 {
            let coordinate = ChunkCoordinate::new(
                fastrand::i32(-500..500),
                fastrand::i32(-50..50),
                fastrand::i32(-500..500),
            );
            assert_eq!(
                ChunkCoordinate::from_world_position(coordinate.to_world_origin()),
                coordinate
            );
        }
    }

    #[test]
    fn world_point_matches_block_position() {
        assert_eq!(
            ChunkCoordinate::from_world_point(Point3::new(-0.5, 130.0, 31.9)),
            ChunkCoordinate::new(-1, 1, 1)
        );
    }

    #[test]
    fn chebyshev_distance_takes_largest_axis() {
        let a = ChunkCoordinate::new(0, 0, 0);
        let b = ChunkCoordinate::new(-3, 1, 2);
        assert_eq!(a.chebyshev_distance(b), 3);
        assert_eq!(a.neighbor(BlockSide::NegY), ChunkCoordinate::new(0, -1, 0));
    }
}
