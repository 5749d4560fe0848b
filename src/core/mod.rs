//! # Core Module
//!
//! Small shared building blocks used throughout the crate.
//!
//! ## Key Components
//! - `MtResource`: Thread-safe reference-counted handle with read-write locking, used to
//!   share loaded chunks between the streaming worker and the render thread
//! - `Property`: A value with synchronous change listeners, used to turn camera movement
//!   into "origin changed" notifications

pub mod mt_resource;
pub mod property;

pub use mt_resource::MtResource;
pub use property::{ListenerId, Property};
