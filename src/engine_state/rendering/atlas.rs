//! # Texture Atlas Module
//!
//! Static lookup from a block kind and face orientation to the region of the shared tile
//! sheet it is drawn with. The sheet itself is an external asset; only its layout is
//! encoded here.

use phf::phf_map;

use crate::engine_state::voxels::block::{BlockKind, BlockKindSize, FaceOrientation};

/// A rectangle of the atlas in normalized texture coordinates.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AtlasRegion {
    /// Left edge
    pub u_min: f32,
    /// Bottom edge
    pub v_min: f32,
    /// Right edge
    pub u_max: f32,
    /// Top edge
    pub v_max: f32,
}

impl AtlasRegion {
    const fn new(u_min: f32, v_min: f32, u_max: f32, v_max: f32) -> Self {
        AtlasRegion {
            u_min,
            v_min,
            u_max,
            v_max,
        }
    }

    /// Texture coordinates for the six vertices of one face, in emission order.
    pub fn face_coords(&self) -> [[f32; 2]; 6] {
        [
            [self.u_min, self.v_min],
            [self.u_max, self.v_min],
            [self.u_min, self.v_max],
            [self.u_min, self.v_max],
            [self.u_max, self.v_min],
            [self.u_max, self.v_max],
        ]
    }
}

/// The atlas regions used by the three face orientations of one block kind.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FaceTextures {
    /// The four horizontal faces
    pub side: AtlasRegion,
    /// The +Y face
    pub top: AtlasRegion,
    /// The -Y face
    pub bottom: AtlasRegion,
}

impl FaceTextures {
    const fn uniform(region: AtlasRegion) -> Self {
        FaceTextures {
            side: region,
            top: region,
            bottom: region,
        }
    }

    /// The region for faces with the given orientation.
    pub fn region(&self, orientation: FaceOrientation) -> AtlasRegion {
        match orientation {
            FaceOrientation::Side => self.side,
            FaceOrientation::Top => self.top,
            FaceOrientation::Bottom => self.bottom,
        }
    }
}

const GRASS_SIDE: AtlasRegion = AtlasRegion::new(0.635, 0.9375, 0.759, 1.0);
const GRASS_TOP: AtlasRegion = AtlasRegion::new(0.507, 0.557, 0.633, 0.619);
const DIRT: AtlasRegion = AtlasRegion::new(0.634, 0.875, 0.759, 0.936);
const STONE: AtlasRegion = AtlasRegion::new(0.254, 0.62, 0.379, 0.683);

/// Face textures keyed by [`BlockKind::id`]. Air has no entry.
static FACE_TEXTURES: phf::Map<BlockKindSize, FaceTextures> = phf_map! {
    1u8 => FaceTextures { side: GRASS_SIDE, top: GRASS_TOP, bottom: DIRT },
    2u8 => FaceTextures::uniform(DIRT),
    3u8 => FaceTextures::uniform(STONE),
};

/// Face textures of `kind`, or `None` for kinds that are never drawn.
pub fn face_textures(kind: BlockKind) -> Option<&'static FaceTextures> {
    FACE_TEXTURES.get(&kind.id())
}

/// The atlas region of one face of `kind`.
pub fn region(kind: BlockKind, orientation: FaceOrientation) -> Option<AtlasRegion> {
    face_textures(kind).map(|textures| textures.region(orientation))
}
