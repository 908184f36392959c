//! Renderer-agnostic core of the model viewer.
//!
//! The [`Viewer`] owns the camera, frame timing and input state, and drives any
//! [`RenderBackend`] through one frame at a time.
//!
//! # Invariants
//! - The camera basis is orthonormal after every update.
//! - Pitch stays within ±89° and zoom within [1°, 45°].
//! - Input events are applied in arrival order, once per frame.
//! - Nothing runs after the loop reaches [`LoopState::Terminated`].

mod backend;
mod camera;
mod placement;
mod recording;
mod timing;
mod uniforms;
mod viewer;

pub use backend::{PolygonMode, RenderBackend, ShaderProgram};
pub use camera::{
    Camera, CameraMovement, FAR_PLANE, NEAR_PLANE, PITCH_LIMIT, SPEED, SENSITIVITY, ZOOM,
    ZOOM_MAX, ZOOM_MIN,
};
pub use placement::{compose, compose_all, normal_matrix};
pub use recording::{Command, RecordingBackend, RecordingProgram};
pub use timing::FrameTiming;
pub use uniforms::{UniformBlock, UniformField, UniformLayout, UniformType, align_to};
pub use viewer::{
    AppState, CLEAR_COLOR, LoopState, SCR_HEIGHT, SCR_WIDTH, SceneInstance, Viewer, WINDOW_TITLE,
};
