//! Shared scene configuration for the OBJ viewer.
//!
//! # Invariants
//! - A scene is plain data: paths plus placement steps, no GPU handles.
//! - Placement steps post-multiply, in the order listed.

mod config;
mod types;

pub use config::{ConfigError, SceneConfig};
pub use types::{ModelEntry, PlacementOp, ShaderPaths};
