mod window_input;

use anyhow::{Context, Result};
use objview_assets::load_model;
use objview_common::SceneConfig;
use objview_input::{InputEvent, Key};
use objview_render::{
    LoopState, RenderBackend, SCR_HEIGHT, SCR_WIDTH, SceneInstance, UniformLayout, Viewer,
    WINDOW_TITLE,
};
use objview_render_wgpu::{GpuModel, WgpuBackend, WgpuProgram};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;
use window_input::{map_key, scroll_lines};
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{DeviceEvent, ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::PhysicalKey;
use winit::window::{CursorGrabMode, Window, WindowId};

/// Scene file picked up from the working directory when present.
const SCENE_FILE: &str = "objview.yaml";

/// Everything that exists once the window is up.
struct Session {
    window: Arc<Window>,
    backend: WgpuBackend,
    viewer: Viewer<WgpuBackend>,
}

struct ViewerApp {
    scene: SceneConfig,
    session: Option<Session>,
    cursor_grabbed: bool,
    started: Instant,
    error: Option<anyhow::Error>,
}

impl ViewerApp {
    fn new(scene: SceneConfig) -> Self {
        Self {
            scene,
            session: None,
            cursor_grabbed: false,
            started: Instant::now(),
            error: None,
        }
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<Session> {
        let attrs = Window::default_attributes()
            .with_title(WINDOW_TITLE)
            .with_inner_size(PhysicalSize::new(SCR_WIDTH, SCR_HEIGHT));
        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .context("failed to create window")?,
        );
        self.cursor_grabbed = grab_cursor(&window);

        let size = window.inner_size();
        let mut backend = WgpuBackend::new(window.clone(), size.width, size.height)
            .context("failed to initialize graphics")?;

        let program = WgpuProgram::compile(
            &backend,
            &self.scene.shaders.vertex,
            &self.scene.shaders.fragment,
            UniformLayout::model_loading(),
        )
        .context("failed to build shader program")?;

        let instances = self
            .scene
            .models
            .iter()
            .map(|entry| -> Result<SceneInstance<GpuModel>> {
                let data = load_model(&entry.path)
                    .with_context(|| format!("failed to load model {}", entry.path.display()))?;
                Ok(SceneInstance {
                    model: GpuModel::upload(&backend, &data),
                    placement: entry.placement.clone(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        backend.set_viewport(size.width, size.height);
        let viewer = Viewer::new(
            program,
            instances,
            self.scene.chain_placements,
            (size.width, size.height),
        );
        tracing::info!(models = viewer.instances().len(), "scene ready");

        Ok(Session {
            window,
            backend,
            viewer,
        })
    }
}

/// Lock and hide the cursor so raw motion drives the camera. Returns false
/// when the platform refuses both grab modes, and the absolute cursor is used.
fn grab_cursor(window: &Window) -> bool {
    let grabbed = window
        .set_cursor_grab(CursorGrabMode::Locked)
        .or_else(|_| window.set_cursor_grab(CursorGrabMode::Confined));
    match grabbed {
        Ok(()) => {
            window.set_cursor_visible(false);
            true
        }
        Err(e) => {
            tracing::warn!("cursor grab unavailable, using absolute cursor: {e}");
            false
        }
    }
}

impl ApplicationHandler for ViewerApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.session.is_some() || self.error.is_some() {
            return;
        }
        match self.init(event_loop) {
            Ok(session) => self.session = Some(session),
            Err(e) => {
                self.error = Some(e);
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(session) = &mut self.session else {
            return;
        };
        let viewer = &mut session.viewer;

        match event {
            WindowEvent::CloseRequested => viewer.push_event(InputEvent::CloseRequested),
            WindowEvent::Resized(size) => viewer.push_event(InputEvent::Resize {
                width: size.width,
                height: size.height,
            }),
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state,
                        ..
                    },
                ..
            } => {
                let key = map_key(code);
                if key != Key::Other {
                    viewer.push_event(InputEvent::Key {
                        key,
                        pressed: state == ElementState::Pressed,
                    });
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let offset = scroll_lines(delta);
                viewer.push_event(InputEvent::Scroll {
                    x: offset.x,
                    y: offset.y,
                });
            }
            WindowEvent::CursorMoved { position, .. } if !self.cursor_grabbed => {
                viewer.push_event(InputEvent::MouseMove {
                    x: position.x as f32,
                    y: position.y as f32,
                });
            }
            WindowEvent::Focused(true) => {
                self.cursor_grabbed = grab_cursor(&session.window);
                viewer.push_event(InputEvent::FocusGained);
            }
            WindowEvent::Focused(false) => viewer.push_event(InputEvent::FocusLost),
            WindowEvent::RedrawRequested => {
                let now = self.started.elapsed().as_secs_f32();
                match viewer.frame(&mut session.backend, now) {
                    Ok(LoopState::Terminated) => event_loop.exit(),
                    Ok(_) => {}
                    Err(e) => tracing::error!("frame skipped: {e}"),
                }
            }
            _ => {}
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: winit::event::DeviceId,
        event: DeviceEvent,
    ) {
        if let DeviceEvent::MouseMotion { delta } = event {
            let Some(session) = &mut self.session else {
                return;
            };
            if self.cursor_grabbed {
                session.viewer.push_event(InputEvent::MouseMotion {
                    dx: delta.0 as f32,
                    dy: delta.1 as f32,
                });
            }
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(session) = &self.session {
            session.window.request_redraw();
        }
    }
}

fn run() -> Result<()> {
    let scene = SceneConfig::load_or_default(SCENE_FILE)
        .context("failed to read scene configuration")?;

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = ViewerApp::new(scene);
    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new("info"))
        .init();

    tracing::info!("objview starting");

    match run() {
        Ok(()) => {
            tracing::info!("objview shut down");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("{e:#}");
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
