/// Seconds elapsed between consecutive frames.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameTiming {
    last_frame: f32,
    delta_time: f32,
}

impl FrameTiming {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a frame at `now` seconds and return the delta since the last one.
    pub fn tick(&mut self, now: f32) -> f32 {
        self.delta_time = now - self.last_frame;
        self.last_frame = now;
        self.delta_time
    }

    pub fn delta_time(&self) -> f32 {
        self.delta_time
    }

    pub fn last_frame(&self) -> f32 {
        self.last_frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_tick_measures_from_zero() {
        let mut timing = FrameTiming::new();
        assert_eq!(timing.tick(0.5), 0.5);
        assert_eq!(timing.last_frame(), 0.5);
    }

    #[test]
    fn deltas_between_ticks() {
        let mut timing = FrameTiming::new();
        timing.tick(1.0);
        assert_eq!(timing.tick(1.25), 0.25);
        assert_eq!(timing.delta_time(), 0.25);
        assert_eq!(timing.tick(1.25), 0.0);
    }
}
