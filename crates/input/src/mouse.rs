use glam::Vec2;

/// Turns cursor positions or raw motion into look offsets.
///
/// The first sample after construction or [`MouseTracker::reset`] only seeds the
/// last position, so a cursor that enters far from `last` causes no jump.
#[derive(Debug, Clone)]
pub struct MouseTracker {
    last: Vec2,
    first: bool,
}

impl MouseTracker {
    /// Start tracking with `initial` as the assumed last position.
    pub fn new(initial: Vec2) -> Self {
        Self {
            last: initial,
            first: true,
        }
    }

    /// Offset since the previous sample. Y is reversed because window
    /// coordinates grow downward while pitch grows upward.
    pub fn offset(&mut self, x: f32, y: f32) -> Vec2 {
        if self.first {
            self.last = Vec2::new(x, y);
            self.first = false;
        }
        let offset = Vec2::new(x - self.last.x, self.last.y - y);
        self.last = Vec2::new(x, y);
        offset
    }

    /// Offset for a raw relative motion, y reversed like [`MouseTracker::offset`].
    /// Deltas are not accumulated.
    pub fn motion(&mut self, dx: f32, dy: f32) -> Vec2 {
        if self.first {
            self.first = false;
            return Vec2::ZERO;
        }
        Vec2::new(dx, -dy)
    }

    /// Seed again on the next sample.
    pub fn reset(&mut self) {
        tracing::debug!("mouse tracking reset");
        self.first = true;
    }
}
