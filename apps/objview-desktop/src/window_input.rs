use glam::Vec2;
use objview_input::Key;
use winit::event::MouseScrollDelta;
use winit::keyboard::KeyCode;

/// Pixels per scroll line for touchpads that report pixel deltas.
pub const PIXELS_PER_LINE: f32 = 20.0;

pub fn map_key(code: KeyCode) -> Key {
    match code {
        KeyCode::Escape => Key::Escape,
        KeyCode::KeyW => Key::W,
        KeyCode::KeyA => Key::A,
        KeyCode::KeyS => Key::S,
        KeyCode::KeyD => Key::D,
        KeyCode::KeyL => Key::L,
        KeyCode::KeyF => Key::F,
        _ => Key::Other,
    }
}

/// Scroll offset in lines.
pub fn scroll_lines(delta: MouseScrollDelta) -> Vec2 {
    match delta {
        MouseScrollDelta::LineDelta(x, y) => Vec2::new(x, y),
        MouseScrollDelta::PixelDelta(p) => {
            Vec2::new(p.x as f32, p.y as f32) / PIXELS_PER_LINE
        }
    }
}
