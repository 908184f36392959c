use crate::uniforms::UniformBlock;
use glam::{Mat4, Vec3, Vec4};

/// How triangles are rasterized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PolygonMode {
    #[default]
    Fill,
    Line,
}

/// A compiled vertex/fragment pair plus the uniform values it draws with.
///
/// Setters go through the program's [`UniformBlock`]; each draw sees whatever
/// values were set before it.
pub trait ShaderProgram {
    fn uniforms(&self) -> &UniformBlock;
    fn uniforms_mut(&mut self) -> &mut UniformBlock;

    fn set_mat4(&mut self, name: &str, value: Mat4) {
        self.uniforms_mut().set_mat4(name, value);
    }

    fn set_vec3(&mut self, name: &str, value: Vec3) {
        self.uniforms_mut().set_vec3(name, value);
    }

    fn set_vec4(&mut self, name: &str, value: Vec4) {
        self.uniforms_mut().set_vec4(name, value);
    }

    fn set_float(&mut self, name: &str, value: f32) {
        self.uniforms_mut().set_float(name, value);
    }
}

/// Renderer-agnostic command interface. All backends implement this trait.
///
/// The viewer loop talks only to this trait, so it runs the same against a GPU
/// or against [`RecordingBackend`](crate::RecordingBackend) in tests.
pub trait RenderBackend {
    type Program: ShaderProgram;
    /// A loaded model: one or more mesh batches.
    type Model;
    type Error: std::error::Error + Send + Sync + 'static;

    /// Resize the drawable area, in physical pixels.
    fn set_viewport(&mut self, width: u32, height: u32);

    /// Persists until changed; setting the current mode again is harmless.
    fn set_polygon_mode(&mut self, mode: PolygonMode);

    /// Start a frame cleared to `color`, with depth reset to the far plane.
    fn clear(&mut self, color: [f32; 4]);

    fn use_program(&mut self, program: &Self::Program);

    /// One draw call per mesh batch of `model`, using `program`'s current uniforms.
    fn draw(&mut self, model: &Self::Model, program: &Self::Program);

    /// Submit the frame and show it.
    fn present(&mut self) -> Result<(), Self::Error>;
}
