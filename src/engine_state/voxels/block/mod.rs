//! # Block Module
//!
//! This module provides the voxel block model: the set of block kinds and the six
//! axis-aligned sides used for faces and chunk adjacency.

pub mod block_kind;
pub mod block_side;

pub use block_kind::BlockKind;
pub use block_side::{BlockSide, FaceOrientation};

/// The underlying integer type used to represent block kinds in compact form.
pub type BlockKindSize = u8;
