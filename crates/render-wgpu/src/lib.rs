//! wgpu render backend for the model viewer.
//!
//! Programs are compiled from a vertex and a fragment WGSL file at runtime.
//! Each draw snapshots the program's uniform block into its own slot of a
//! dynamic-offset buffer, so every model keeps the transform it was drawn with.
//!
//! # Bindings
//! - Group 0, binding 0: the program's uniform block (vertex + fragment).
//! - Group 1: diffuse texture (0), sampler (1), material tint `vec4` (2).
//! - Vertex inputs: position (0), normal (1), texture coordinates (2).

mod gpu;
mod model;
mod program;

pub use gpu::{GpuError, MAX_UNIFORM_BLOCK, WgpuBackend};
pub use model::{GpuMesh, GpuModel};
pub use program::WgpuProgram;
