use crate::engine_state::voxels::block::BlockSide;

/// Corner offsets of the two triangles of each block face, indexed by `BlockSide`.
///
/// Each face is wound so that it is front-facing when seen from outside the block, and the
/// six corners pair up with the atlas coordinates of `AtlasRegion::face_coords` in the same
/// order.
const FACE_CORNERS: [[[u8; 3]; 6]; 6] = [
    // -X
    [[0, 0, 0], [0, 0, 1], [0, 1, 0], [0, 1, 0], [0, 0, 1], [0, 1, 1]],
    // +X
    [[1, 0, 1], [1, 0, 0], [1, 1, 1], [1, 1, 1], [1, 0, 0], [1, 1, 0]],
    // -Y
    [[0, 0, 1], [0, 0, 0], [1, 0, 1], [1, 0, 1], [0, 0, 0], [1, 0, 0]],
    // +Y
    [[0, 1, 0], [0, 1, 1], [1, 1, 0], [1, 1, 0], [0, 1, 1], [1, 1, 1]],
    // -Z
    [[1, 0, 0], [0, 0, 0], [1, 1, 0], [1, 1, 0], [0, 0, 0], [0, 1, 0]],
    // +Z
    [[0, 0, 1], [1, 0, 1], [0, 1, 1], [0, 1, 1], [1, 0, 1], [1, 1, 1]],
];

/// The six chunk-local corner positions of `side` of the block at `(x, y, z)`.
///
/// # Arguments
/// * `side` - Which face of the block
/// * `x`, `y`, `z` - The block's local position
///
/// # Returns
/// Corner positions in triangle-list order.
pub fn face_corners(side: BlockSide, x: u8, y: u8, z: u8) -> [[u8; 3]; 6] {
    FACE_CORNERS[side.index()].map(|[dx, dy, dz]| [x + dx, y + dy, z + dz])
}
