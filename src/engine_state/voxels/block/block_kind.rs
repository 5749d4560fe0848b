//! # Block Kind Module
//!
//! This module defines the finite set of materials a voxel cell can hold.

use num_derive::FromPrimitive;
use num_traits::FromPrimitive;

use super::BlockKindSize;

/// Enumerates every material a voxel cell can hold.
///
/// `Air` is the absence of matter. Every other kind is solid and opaque, which is all the
/// mesher needs to know to cull faces. The discriminants are stable: they key the texture
/// atlas table and are what `BlockKindSize` stores.
#[repr(u8)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, FromPrimitive)]
pub enum BlockKind {
    /// Empty space.
    #[default]
    Air = 0,

    /// Surface block with a distinct top texture, dirt-textured bottom and grassy sides.
    Grass = 1,

    /// The few blocks directly under the grass surface.
    Dirt = 2,

    /// Everything deeper.
    Stone = 3,
}

impl BlockKind {
    /// All kinds, in discriminant order.
    pub const ALL: [BlockKind; 4] = [
        BlockKind::Air,
        BlockKind::Grass,
        BlockKind::Dirt,
        BlockKind::Stone,
    ];

    /// Returns `true` for every kind except `Air`.
    #[inline]
    pub fn is_solid(self) -> bool {
        self != BlockKind::Air
    }

    /// The compact id used as the atlas lookup key.
    #[inline]
    pub fn id(self) -> BlockKindSize {
        self as BlockKindSize
    }

    /// Converts a compact id back into a kind, or `None` for an unknown id.
    pub fn from_id(id: BlockKindSize) -> Option<Self> {
        FromPrimitive::from_u8(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_air_is_not_solid() {
        for kind in BlockKind::ALL {
            assert_eq!(kind.is_solid(), kind != BlockKind::Air);
        }
    }

    #[test]
    fn ids_round_trip() {
        for kind in BlockKind::ALL {
            assert_eq!(BlockKind::from_id(kind.id()), Some(kind));
        }
        assert_eq!(BlockKind::from_id(200), None);
    }
}
