//! Input plumbing between the window host and the render loop.
//!
//! # Invariants
//! - No windowing types cross this boundary; the host translates its own
//!   events into [`InputEvent`].
//! - Events are consumed in arrival order, once per frame.

pub mod event;
pub mod keyboard;
pub mod mouse;

pub use event::{EventQueue, InputEvent, Key};
pub use keyboard::KeyboardState;
pub use mouse::MouseTracker;
