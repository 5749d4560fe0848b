//! # Block Side Module
//!
//! The six axis-aligned directions. The same type names a face of a block during meshing
//! and a neighbor slot of a chunk during streaming.

use cgmath::Vector3;

/// Which texture set of a block kind a face uses.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum FaceOrientation {
    /// The +Y face.
    Top,
    /// The -Y face.
    Bottom,
    /// Any of the four horizontal faces.
    Side,
}

/// One of the six axis-aligned unit directions.
///
/// The discriminant doubles as the index into per-direction arrays such as a chunk's
/// neighbor table. The order is: [NegX, PosX, NegY, PosY, NegZ, PosZ]
#[derive(PartialEq, Eq, Hash, Copy, Clone, Debug)]
pub enum BlockSide {
    /// Facing negative X
    NegX = 0,

    /// Facing positive X
    PosX = 1,

    /// Facing negative Y
    NegY = 2,

    /// Facing positive Y
    PosY = 3,

    /// Facing negative Z
    NegZ = 4,

    /// Facing positive Z
    PosZ = 5,
}

impl BlockSide {
    /// Returns an array containing all six sides in index order.
    pub fn all() -> [BlockSide; 6] {
        [
            BlockSide::NegX,
            BlockSide::PosX,
            BlockSide::NegY,
            BlockSide::PosY,
            BlockSide::NegZ,
            BlockSide::PosZ,
        ]
    }

    /// Index of this side in per-direction arrays.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// The side pointing the other way along the same axis.
    pub fn opposite(self) -> BlockSide {
        match self {
            BlockSide::NegX => BlockSide::PosX,
            BlockSide::PosX => BlockSide::NegX,
            BlockSide::NegY => BlockSide::PosY,
            BlockSide::PosY => BlockSide::NegY,
            BlockSide::NegZ => BlockSide::PosZ,
            BlockSide::PosZ => BlockSide::NegZ,
        }
    }

    /// Unit step in this direction.
    pub fn offset(self) -> Vector3<i32> {
        match self {
            BlockSide::NegX => Vector3::new(-1, 0, 0),
            BlockSide::PosX => Vector3::new(1, 0, 0),
            BlockSide::NegY => Vector3::new(0, -1, 0),
            BlockSide::PosY => Vector3::new(0, 1, 0),
            BlockSide::NegZ => Vector3::new(0, 0, -1),
            BlockSide::PosZ => Vector3::new(0, 0, 1),
        }
    }

    /// Which texture set a face on this side is drawn with.
    pub fn orientation(self) -> FaceOrientation {
        match self {
            BlockSide::PosY => FaceOrientation::Top,
            BlockSide::NegY => FaceOrientation::Bottom,
            _ => FaceOrientation::Side,
        }
    }
}
