use std::collections::VecDeque;

/// Keys the viewer reacts to. Everything else maps to `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Escape,
    W,
    A,
    S,
    D,
    /// Line (wireframe) polygon mode.
    L,
    /// Fill polygon mode.
    F,
    Other,
}

/// A typed input event pushed by the window host.
///
/// The render loop consumes events, never raw windowing callbacks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Framebuffer size changed, in physical pixels.
    Resize { width: u32, height: u32 },
    /// Absolute cursor position in window pixels (y grows downward).
    MouseMove { x: f32, y: f32 },
    /// Relative pointer motion in pixels while the cursor is grabbed
    /// (y grows downward).
    MouseMotion { dx: f32, dy: f32 },
    /// Scroll wheel offset in lines.
    Scroll { x: f32, y: f32 },
    /// A key went down or up.
    Key { key: Key, pressed: bool },
    /// The window regained focus.
    FocusGained,
    /// The window lost focus; key releases may never arrive.
    FocusLost,
    /// The host asked the window to close.
    CloseRequested,
}

/// FIFO of pending input events, drained once per frame.
#[derive(Debug, Default)]
pub struct EventQueue {
    pending: VecDeque<InputEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: InputEvent) {
        self.pending.push_back(event);
    }

    /// Take every pending event in arrival order.
    pub fn drain(&mut self) -> impl Iterator<Item = InputEvent> + '_ {
        self.pending.drain(..)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drain_preserves_order() {
        let mut queue = EventQueue::new();
        queue.push(InputEvent::Resize {
            width: 10,
            height: 20,
        });
        queue.push(InputEvent::Scroll { x: 0.0, y: 1.0 });
        queue.push(InputEvent::CloseRequested);

        let drained: Vec<_> = queue.drain().collect();
        assert_eq!(
            drained,
            vec![
                InputEvent::Resize {
                    width: 10,
                    height: 20
                },
                InputEvent::Scroll { x: 0.0, y: 1.0 },
                InputEvent::CloseRequested,
            ]
        );
        assert!(queue.is_empty());
    }

    #[test]
    fn push_after_drain() {
        let mut queue = EventQueue::new();
        queue.push(InputEvent::FocusGained);
        assert_eq!(queue.drain().count(), 1);
        queue.push(InputEvent::Key {
            key: Key::W,
            pressed: true,
        });
        assert_eq!(queue.len(), 1);
    }
}
