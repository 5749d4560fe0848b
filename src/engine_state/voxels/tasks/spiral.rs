//! Deterministic square spiral over the horizontal plane.
//!
//! Starting at `(0, 0)`, the walk visits square rings of Chebyshev radius 1, 2, ... in
//! turn. Each ring starts at its `(-r, -r)` corner and goes along `-Z` edge towards `+X`,
//! then `+X` edge towards `+Z`, `+Z` edge towards `-X` and finally back down the `-X`
//! edge, visiting every perimeter cell exactly once.

use crate::engine_state::voxels::chunk::ChunkCoordinate;

/// Chebyshev radius of a horizontal offset. The `y` component is ignored.
pub fn ring_of(offset: ChunkCoordinate) -> i32 {
    offset.x.abs().max(offset.z.abs())
}

/// The offset visited after `offset`. The `y` component of the result is always 0.
pub fn next_ring_offset(offset: ChunkCoordinate) -> ChunkCoordinate {
    let (x, z) = (offset.x, offset.z);
    let r = ring_of(offset);

    let (x, z) = if r == 0 {
        (-1, -1)
    } else if z == -r && x < r {
        (x + 1, z)
    } else if x == r && z < r {
        (x, z + 1)
    } else if z == r && x > -r {
        (x - 1, z)
    } else if x == -r && z > -r + 1 {
        (x, z - 1)
    } else {
        // Last cell of the ring, (-r, -r + 1): step out to the next ring's corner.
        (x - 1, z - 2)
    };

    ChunkCoordinate::new(x, 0, z)
}

/// Iterates the spiral from `(0, 0)` until (excluding) the first offset outside `radius`.
pub fn spiral_offsets(radius: i32) -> impl Iterator<Item = ChunkCoordinate> {
    std::iter::successors(Some(ChunkCoordinate::default()), |offset| {
        Some(next_ring_offset(*offset))
    })
    .take_while(move |offset| ring_of(*offset) <= radius)
}
