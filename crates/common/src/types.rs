use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A single placement step applied to a model matrix.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlacementOp {
    Translate(Vec3),
    Scale(Vec3),
}

impl PlacementOp {
    /// Post-multiply `base` by this step, so later steps act in the local frame
    /// left by earlier ones.
    pub fn apply(self, base: Mat4) -> Mat4 {
        match self {
            Self::Translate(offset) => base * Mat4::from_translation(offset),
            Self::Scale(factor) => base * Mat4::from_scale(factor),
        }
    }
}

/// One model to load and where to draw it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelEntry {
    pub path: PathBuf,
    #[serde(default, with = "serde_yaml::with::singleton_map_recursive")]
    pub placement: Vec<PlacementOp>,
}

impl ModelEntry {
    pub fn new(path: impl Into<PathBuf>, placement: Vec<PlacementOp>) -> Self {
        Self {
            path: path.into(),
            placement,
        }
    }
}

/// Vertex and fragment shader source paths.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShaderPaths {
    pub vertex: PathBuf,
    pub fragment: PathBuf,
}

impl Default for ShaderPaths {
    fn default() -> Self {
        Self {
            vertex: "shaders/model_loading.vert.wgsl".into(),
            fragment: "shaders/model_loading.frag.wgsl".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translate_then_scale_keeps_translation() {
        let m = PlacementOp::Scale(Vec3::splat(0.5))
            .apply(PlacementOp::Translate(Vec3::new(1.0, 2.0, 3.0)).apply(Mat4::IDENTITY));
        let origin = m.transform_point3(Vec3::ZERO);
        assert_eq!(origin, Vec3::new(1.0, 2.0, 3.0));
        let unit_x = m.transform_point3(Vec3::X);
        assert_eq!(unit_x, Vec3::new(1.5, 2.0, 3.0));
    }

    #[test]
    fn scale_then_translate_scales_the_offset() {
        let m = PlacementOp::Translate(Vec3::Y)
            .apply(PlacementOp::Scale(Vec3::splat(0.8)).apply(Mat4::IDENTITY));
        assert_eq!(m.transform_point3(Vec3::ZERO), Vec3::new(0.0, 0.8, 0.0));
    }

    #[test]
    fn placement_yaml_shape() {
        let entry = ModelEntry::new(
            "m.obj",
            vec![PlacementOp::Translate(Vec3::new(0.0, -0.75, 0.0))],
        );
        let yaml = serde_yaml::to_string(&entry).unwrap();
        assert!(yaml.contains("translate:"));
        let back: ModelEntry = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(back, entry);
    }
}
