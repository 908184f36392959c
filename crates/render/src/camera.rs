use glam::{Mat4, Vec3};

pub const YAW: f32 = -90.0;
pub const PITCH: f32 = 0.0;
pub const SPEED: f32 = 2.5;
pub const SENSITIVITY: f32 = 0.1;
pub const ZOOM: f32 = 45.0;

/// Pitch stays inside this many degrees of the horizon so the basis never flips.
pub const PITCH_LIMIT: f32 = 89.0;
pub const ZOOM_MIN: f32 = 1.0;
pub const ZOOM_MAX: f32 = 45.0;

pub const NEAR_PLANE: f32 = 0.1;
pub const FAR_PLANE: f32 = 1000.0;

/// Directions the keyboard can move the camera in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraMovement {
    Forward,
    Backward,
    Left,
    Right,
}

/// Free-fly camera driven by Euler angles, in degrees.
///
/// `front`, `right` and `up` are recomputed together whenever yaw or pitch
/// change and always form an orthonormal basis.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub movement_speed: f32,
    pub mouse_sensitivity: f32,
    front: Vec3,
    up: Vec3,
    right: Vec3,
    world_up: Vec3,
    yaw: f32,
    pitch: f32,
    zoom: f32,
}

impl Camera {
    pub fn new(position: Vec3) -> Self {
        Self::with_orientation(position, Vec3::Y, YAW, PITCH)
    }

    pub fn with_orientation(position: Vec3, world_up: Vec3, yaw: f32, pitch: f32) -> Self {
        let mut camera = Self {
            position,
            movement_speed: SPEED,
            mouse_sensitivity: SENSITIVITY,
            front: Vec3::NEG_Z,
            up: world_up,
            right: Vec3::X,
            world_up,
            yaw,
            pitch: pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT),
            zoom: ZOOM,
        };
        camera.update_vectors();
        camera
    }

    pub fn front(&self) -> Vec3 {
        self.front
    }

    pub fn right(&self) -> Vec3 {
        self.right
    }

    pub fn up(&self) -> Vec3 {
        self.up
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    /// Vertical field of view in degrees.
    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    /// Move along the current basis by `speed * delta_time`. Position is unbounded.
    pub fn process_keyboard(&mut self, direction: CameraMovement, delta_time: f32) {
        let velocity = self.movement_speed * delta_time;
        match direction {
            CameraMovement::Forward => self.position += self.front * velocity,
            CameraMovement::Backward => self.position -= self.front * velocity,
            CameraMovement::Left => self.position -= self.right * velocity,
            CameraMovement::Right => self.position += self.right * velocity,
        }
    }

    /// Turn by raw pixel offsets. Positive `y_offset` looks up.
    pub fn process_mouse_movement(&mut self, x_offset: f32, y_offset: f32) {
        self.yaw += x_offset * self.mouse_sensitivity;
        self.pitch = (self.pitch + y_offset * self.mouse_sensitivity)
            .clamp(-PITCH_LIMIT, PITCH_LIMIT);
        self.update_vectors();
    }

    /// Adjust the field of view, clamped to `[ZOOM_MIN, ZOOM_MAX]`.
    pub fn process_mouse_scroll(&mut self, y_offset: f32) {
        self.zoom = (self.zoom + y_offset).clamp(ZOOM_MIN, ZOOM_MAX);
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.front, self.up)
    }

    /// Perspective projection with `zoom` as the vertical field of view.
    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.zoom.to_radians(), aspect, NEAR_PLANE, FAR_PLANE)
    }

    fn update_vectors(&mut self) {
        let (yaw, pitch) = (self.yaw.to_radians(), self.pitch.to_radians());
        self.front = Vec3::new(
            yaw.cos() * pitch.cos(),
            pitch.sin(),
            yaw.sin() * pitch.cos(),
        )
        .normalize();
        self.right = self.front.cross(self.world_up).normalize();
        self.up = self.right.cross(self.front).normalize();
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Vec3::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const EPS: f32 = 1e-5;

    fn assert_orthonormal(cam: &Camera) {
        assert_relative_eq!(cam.front().length(), 1.0, epsilon = EPS);
        assert_relative_eq!(cam.right().length(), 1.0, epsilon = EPS);
        assert_relative_eq!(cam.up().length(), 1.0, epsilon = EPS);
        assert_relative_eq!(cam.front().dot(cam.right()), 0.0, epsilon = EPS);
        assert_relative_eq!(cam.front().dot(cam.up()), 0.0, epsilon = EPS);
        assert_relative_eq!(cam.right().dot(cam.up()), 0.0, epsilon = EPS);
    }

    #[test]
    fn default_orientation_looks_down_negative_z() {
        let cam = Camera::new(Vec3::new(0.0, 0.0, 3.0));
        assert!(cam.front().abs_diff_eq(Vec3::NEG_Z, EPS));
        assert!(cam.right().abs_diff_eq(Vec3::X, EPS));
        assert!(cam.up().abs_diff_eq(Vec3::Y, EPS));
        assert_eq!(cam.zoom(), ZOOM);
    }

    #[test]
    fn keyboard_movement_is_linear_in_time() {
        let mut cam = Camera::new(Vec3::new(0.0, 0.0, 3.0));
        let (front, right) = (cam.front(), cam.right());
        let steps = [
            (CameraMovement::Forward, 0.016),
            (CameraMovement::Forward, 0.5),
            (CameraMovement::Left, 0.25),
            (CameraMovement::Backward, 0.1),
            (CameraMovement::Right, 1.0),
        ];
        let mut expected = cam.position;
        for (dir, dt) in steps {
            cam.process_keyboard(dir, dt);
            let basis = match dir {
                CameraMovement::Forward => front,
                CameraMovement::Backward => -front,
                CameraMovement::Left => -right,
                CameraMovement::Right => right,
            };
            expected += basis * SPEED * dt;
        }
        assert!(cam.position.abs_diff_eq(expected, EPS));
    }

    #[test]
    fn zero_delta_time_does_not_move() {
        let mut cam = Camera::new(Vec3::ONE);
        cam.process_keyboard(CameraMovement::Forward, 0.0);
        assert_eq!(cam.position, Vec3::ONE);
    }

    #[test]
    fn pitch_is_clamped_for_any_input() {
        let mut cam = Camera::default();
        for _ in 0..100 {
            cam.process_mouse_movement(3.0, 10_000.0);
            assert!(cam.pitch() <= PITCH_LIMIT);
        }
        assert_eq!(cam.pitch(), PITCH_LIMIT);
        for _ in 0..100 {
            cam.process_mouse_movement(-7.0, -10_000.0);
            assert!(cam.pitch() >= -PITCH_LIMIT);
        }
        assert_eq!(cam.pitch(), -PITCH_LIMIT);
    }

    #[test]
    fn basis_stays_orthonormal() {
        let mut cam = Camera::default();
        let offsets = [(13.0, 4.0), (-250.0, 80.0), (1e4, -3e3), (0.5, 900.0), (-77.0, -77.0)];
        for (x, y) in offsets {
            cam.process_mouse_movement(x, y);
            assert_orthonormal(&cam);
        }
    }

    #[test]
    fn mouse_offsets_scale_by_sensitivity() {
        let mut cam = Camera::default();
        cam.process_mouse_movement(10.0, 20.0);
        assert_relative_eq!(cam.yaw(), YAW + 1.0, epsilon = EPS);
        assert_relative_eq!(cam.pitch(), 2.0, epsilon = EPS);
    }

    #[test]
    fn scroll_adjusts_zoom_within_range() {
        let mut cam = Camera::new(Vec3::new(0.0, 0.0, 3.0));
        cam.process_mouse_scroll(-5.0);
        assert_relative_eq!(cam.zoom(), 40.0);
        for _ in 0..20 {
            cam.process_mouse_scroll(-100.0);
        }
        assert_eq!(cam.zoom(), ZOOM_MIN);
        cam.process_mouse_scroll(1_000.0);
        assert_eq!(cam.zoom(), ZOOM_MAX);
    }

    #[test]
    fn view_matrix_is_pure() {
        let mut cam = Camera::new(Vec3::new(1.0, 2.0, 3.0));
        cam.process_mouse_movement(42.0, -17.0);
        assert_eq!(cam.view_matrix(), cam.view_matrix());
    }

    #[test]
    fn view_matrix_puts_eye_at_origin_looking_down_negative_z() {
        let cam = Camera::new(Vec3::new(0.0, 0.0, 3.0));
        let view = cam.view_matrix();
        assert!(view.transform_point3(cam.position).abs_diff_eq(Vec3::ZERO, EPS));
        let ahead = view.transform_point3(cam.position + cam.front() * 2.0);
        assert!(ahead.abs_diff_eq(Vec3::new(0.0, 0.0, -2.0), EPS));
    }

    #[test]
    fn projection_uses_aspect_and_zoom() {
        let cam = Camera::default();
        let p = cam.projection_matrix(2.0);
        let f = 1.0 / (ZOOM.to_radians() / 2.0).tan();
        assert_relative_eq!(p.y_axis.y, f, epsilon = EPS);
        assert_relative_eq!(p.x_axis.x, f / 2.0, epsilon = EPS);
    }
}
