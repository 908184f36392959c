use crate::event::Key;
use std::collections::HashSet;

/// Which keys are currently held down.
///
/// Queried each frame rather than reacting to individual key events, so a held
/// key acts on every frame it stays down.
#[derive(Debug, Default, Clone)]
pub struct KeyboardState {
    held: HashSet<Key>,
}

impl KeyboardState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: Key, pressed: bool) {
        if key == Key::Other {
            return;
        }
        if pressed {
            self.held.insert(key);
        } else {
            self.held.remove(&key);
        }
    }

    pub fn is_pressed(&self, key: Key) -> bool {
        self.held.contains(&key)
    }

    /// Release everything, e.g. when focus is lost and key-up events never arrive.
    pub fn clear(&mut self) {
        self.held.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn press_and_release() {
        let mut keys = KeyboardState::new();
        keys.set(Key::W, true);
        assert!(keys.is_pressed(Key::W));
        assert!(!keys.is_pressed(Key::S));
        keys.set(Key::W, false);
        assert!(!keys.is_pressed(Key::W));
    }

    #[test]
    fn repeated_press_is_idempotent() {
        let mut keys = KeyboardState::new();
        keys.set(Key::L, true);
        keys.set(Key::L, true);
        keys.set(Key::L, false);
        assert!(!keys.is_pressed(Key::L));
    }

    #[test]
    fn other_keys_are_not_tracked() {
        let mut keys = KeyboardState::new();
        keys.set(Key::Other, true);
        assert!(!keys.is_pressed(Key::Other));
    }

    #[test]
    fn clear_releases_all() {
        let mut keys = KeyboardState::new();
        keys.set(Key::A, true);
        keys.set(Key::D, true);
        keys.clear();
        assert!(!keys.is_pressed(Key::A));
        assert!(!keys.is_pressed(Key::D));
    }
}
