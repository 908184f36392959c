use crate::backend::{PolygonMode, RenderBackend, ShaderProgram};
use crate::camera::{Camera, CameraMovement};
use crate::placement::{compose_all, normal_matrix};
use crate::timing::FrameTiming;
use glam::{Vec2, Vec3};
use objview_common::PlacementOp;
use objview_input::{EventQueue, InputEvent, Key, KeyboardState, MouseTracker};

pub const SCR_WIDTH: u32 = 800;
pub const SCR_HEIGHT: u32 = 600;
pub const WINDOW_TITLE: &str = "Loading model...";
pub const CLEAR_COLOR: [f32; 4] = [0.05, 0.05, 0.05, 1.0];

const MOVEMENT_KEYS: [(Key, CameraMovement); 4] = [
    (Key::W, CameraMovement::Forward),
    (Key::S, CameraMovement::Backward),
    (Key::A, CameraMovement::Left),
    (Key::D, CameraMovement::Right),
];

/// Lifecycle of the render loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Running,
    /// Close was requested; the current frame still presents.
    ClosingRequested,
    /// No further frames run.
    Terminated,
}

/// A loaded model and where it is placed.
#[derive(Debug, Clone)]
pub struct SceneInstance<M> {
    pub model: M,
    pub placement: Vec<PlacementOp>,
}

/// Per-session mutable state, owned by the loop instead of process globals.
#[derive(Debug, Clone)]
pub struct AppState {
    pub camera: Camera,
    pub timing: FrameTiming,
    pub mouse: MouseTracker,
    pub keys: KeyboardState,
    framebuffer: (u32, u32),
    loop_state: LoopState,
}

impl AppState {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            camera: Camera::new(Vec3::new(0.0, 0.0, 3.0)),
            timing: FrameTiming::new(),
            mouse: MouseTracker::new(Vec2::new(width as f32 / 2.0, height as f32 / 2.0)),
            keys: KeyboardState::new(),
            framebuffer: (width, height),
            loop_state: LoopState::Running,
        }
    }

    /// Width over height of the current framebuffer; a zero height counts as 1.
    pub fn aspect_ratio(&self) -> f32 {
        let (width, height) = self.framebuffer;
        width as f32 / height.max(1) as f32
    }

    pub fn loop_state(&self) -> LoopState {
        self.loop_state
    }

    pub fn request_close(&mut self) {
        if self.loop_state == LoopState::Running {
            tracing::info!("close requested");
            self.loop_state = LoopState::ClosingRequested;
        }
    }

    fn handle_event<B: RenderBackend>(&mut self, event: InputEvent, backend: &mut B) {
        match event {
            InputEvent::Resize { width, height } => {
                tracing::debug!(width, height, "framebuffer resized");
                self.framebuffer = (width, height);
                backend.set_viewport(width, height);
            }
            InputEvent::MouseMove { x, y } => {
                let offset = self.mouse.offset(x, y);
                self.camera.process_mouse_movement(offset.x, offset.y);
            }
            InputEvent::MouseMotion { dx, dy } => {
                let offset = self.mouse.motion(dx, dy);
                self.camera.process_mouse_movement(offset.x, offset.y);
            }
            InputEvent::Scroll { y, .. } => self.camera.process_mouse_scroll(y),
            InputEvent::Key { key, pressed } => self.keys.set(key, pressed),
            InputEvent::FocusGained => self.mouse.reset(),
            InputEvent::FocusLost => self.keys.clear(),
            InputEvent::CloseRequested => self.request_close(),
        }
    }

    /// Act on held keys. Mode keys re-apply every frame they are down, and fill
    /// is applied after line so it wins when both are held.
    fn process_input<B: RenderBackend>(&mut self, backend: &mut B) {
        if self.keys.is_pressed(Key::Escape) {
            self.request_close();
        }
        if self.keys.is_pressed(Key::L) {
            backend.set_polygon_mode(PolygonMode::Line);
        }
        if self.keys.is_pressed(Key::F) {
            backend.set_polygon_mode(PolygonMode::Fill);
        }

        let dt = self.timing.delta_time();
        for (key, direction) in MOVEMENT_KEYS {
            if self.keys.is_pressed(key) {
                self.camera.process_keyboard(direction, dt);
            }
        }
    }
}

/// The render loop: drains input, moves the camera, draws every instance.
pub struct Viewer<B: RenderBackend> {
    state: AppState,
    events: EventQueue,
    program: B::Program,
    instances: Vec<SceneInstance<B::Model>>,
    chain_placements: bool,
}

impl<B: RenderBackend> Viewer<B> {
    pub fn new(
        program: B::Program,
        instances: Vec<SceneInstance<B::Model>>,
        chain_placements: bool,
        framebuffer: (u32, u32),
    ) -> Self {
        Self {
            state: AppState::new(framebuffer.0, framebuffer.1),
            events: EventQueue::new(),
            program,
            instances,
            chain_placements,
        }
    }

    /// Queue an event for the next frame.
    pub fn push_event(&mut self, event: InputEvent) {
        self.events.push(event);
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn instances(&self) -> &[SceneInstance<B::Model>] {
        &self.instances
    }

    pub fn is_terminated(&self) -> bool {
        self.state.loop_state == LoopState::Terminated
    }

    /// Run one frame at `now` seconds since startup.
    ///
    /// Once the loop is terminated this does nothing. A frame that observes a
    /// close request still presents, and the loop terminates right after.
    pub fn frame(&mut self, backend: &mut B, now: f32) -> Result<LoopState, B::Error> {
        if self.is_terminated() {
            return Ok(LoopState::Terminated);
        }

        self.state.timing.tick(now);
        for event in self.events.drain() {
            self.state.handle_event(event, backend);
        }
        self.state.process_input(backend);

        backend.clear(CLEAR_COLOR);
        backend.use_program(&self.program);
        let projection = self
            .state
            .camera
            .projection_matrix(self.state.aspect_ratio());
        self.program.set_mat4("projection", projection);
        self.program.set_mat4("view", self.state.camera.view_matrix());

        let models = compose_all(
            self.instances.iter().map(|i| i.placement.as_slice()),
            self.chain_placements,
        );
        for (instance, model) in self.instances.iter().zip(models) {
            self.program.set_mat4("model", model);
            self.program.set_mat4("normal", normal_matrix(model));
            backend.draw(&instance.model, &self.program);
        }

        let presented = backend.present();
        if self.state.loop_state == LoopState::ClosingRequested {
            self.state.loop_state = LoopState::Terminated;
        }
        presented.map(|()| self.state.loop_state)
    }
}
