//! # Voxel World Demo Entry Point
//!
//! Runs the headless streaming demo from the library's `run()` function.
//!
//! ## Usage
//!
//! ```bash
//! RUST_LOG=info cargo run --release
//! VOXEL_WORLD_CONFIG=world.json RUST_LOG=debug cargo run
//! ```

use std::process::ExitCode;

fn main() -> ExitCode {
    match voxel_world::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("voxel-world: {err}");
            ExitCode::FAILURE
        }
    }
}
