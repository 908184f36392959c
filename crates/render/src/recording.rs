use crate::backend::{PolygonMode, RenderBackend, ShaderProgram};
use crate::uniforms::{UniformBlock, UniformLayout};
use std::convert::Infallible;

/// A backend call captured by [`RecordingBackend`].
#[derive(Debug, Clone)]
pub enum Command {
    Viewport { width: u32, height: u32 },
    PolygonMode(PolygonMode),
    Clear([f32; 4]),
    UseProgram(String),
    /// The model drawn and the uniform values in effect at that moment.
    Draw { model: String, uniforms: UniformBlock },
    Present,
}

/// Program stand-in that only holds uniform values.
#[derive(Debug, Clone)]
pub struct RecordingProgram {
    pub name: String,
    uniforms: UniformBlock,
}

impl RecordingProgram {
    pub fn new(name: impl Into<String>, layout: UniformLayout) -> Self {
        Self {
            name: name.into(),
            uniforms: UniformBlock::new(layout),
        }
    }
}

impl ShaderProgram for RecordingProgram {
    fn uniforms(&self) -> &UniformBlock {
        &self.uniforms
    }

    fn uniforms_mut(&mut self) -> &mut UniformBlock {
        &mut self.uniforms
    }
}

/// Headless backend that records every call instead of touching a GPU.
///
/// Models are identified by name.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    commands: Vec<Command>,
    polygon_mode: PolygonMode,
    viewport: Option<(u32, u32)>,
    frames_presented: usize,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Hand back everything recorded so far and start a fresh log.
    pub fn take_commands(&mut self) -> Vec<Command> {
        std::mem::take(&mut self.commands)
    }

    /// Draw commands only, in submission order.
    pub fn draws(&self) -> impl Iterator<Item = (&str, &UniformBlock)> {
        self.commands.iter().filter_map(|c| match c {
            Command::Draw { model, uniforms } => Some((model.as_str(), uniforms)),
            _ => None,
        })
    }

    pub fn polygon_mode(&self) -> PolygonMode {
        self.polygon_mode
    }

    pub fn viewport(&self) -> Option<(u32, u32)> {
        self.viewport
    }

    pub fn frames_presented(&self) -> usize {
        self.frames_presented
    }
}

impl RenderBackend for RecordingBackend {
    type Program = RecordingProgram;
    type Model = String;
    type Error = Infallible;

    fn set_viewport(&mut self, width: u32, height: u32) {
        self.viewport = Some((width, height));
        self.commands.push(Command::Viewport { width, height });
    }

    fn set_polygon_mode(&mut self, mode: PolygonMode) {
        self.polygon_mode = mode;
        self.commands.push(Command::PolygonMode(mode));
    }

    fn clear(&mut self, color: [f32; 4]) {
        self.commands.push(Command::Clear(color));
    }

    fn use_program(&mut self, program: &RecordingProgram) {
        self.commands.push(Command::UseProgram(program.name.clone()));
    }

    fn draw(&mut self, model: &String, program: &RecordingProgram) {
        self.commands.push(Command::Draw {
            model: model.clone(),
            uniforms: program.uniforms().clone(),
        });
    }

    fn present(&mut self) -> Result<(), Infallible> {
        self.frames_presented += 1;
        self.commands.push(Command::Present);
        Ok(())
    }
}
