//! Error types for the crate.
//!
//! Only recoverable conditions live here. Out-of-range voxel access and poisoned locks
//! are programmer errors and panic at the call site.

use thiserror::Error;

/// Errors raised while loading or validating a [`WorldConfig`](crate::WorldConfig).
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The config text is not valid JSON for the expected shape.
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// A field holds a value the world cannot run with.
    #[error("Invalid value for `{field}`: {reason}")]
    InvalidValue {
        /// Name of the offending field.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

/// Errors raised while constructing a [`World`](crate::World).
#[derive(Error, Debug)]
pub enum WorldError {
    /// The supplied configuration was rejected.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// The streaming worker thread could not be started.
    #[error("Failed to spawn chunk streaming thread: {0}")]
    WorkerSpawn(#[source] std::io::Error),
}

/// Result type alias for world construction.
pub type Result<T> = std::result::Result<T, WorldError>;
