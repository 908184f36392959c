use crate::types::{ModelEntry, PlacementOp, ShaderPaths};
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Errors from reading a scene configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Data-driven description of what the viewer loads and where it draws it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneConfig {
    #[serde(default)]
    pub shaders: ShaderPaths,
    /// When set, each model's placement continues from the previous model's
    /// matrix instead of starting from identity.
    #[serde(default = "default_chain")]
    pub chain_placements: bool,
    pub models: Vec<ModelEntry>,
}

fn default_chain() -> bool {
    true
}

impl Default for SceneConfig {
    /// The stock scene: two decimation levels of three meshes, stacked with
    /// cumulative offsets.
    fn default() -> Self {
        let t = |x, y, z| PlacementOp::Translate(Vec3::new(x, y, z));
        Self {
            shaders: ShaderPaths::default(),
            chain_placements: true,
            models: vec![
                ModelEntry::new(
                    "data/mymodel/50%/mesh50%.obj",
                    vec![t(0.0, -0.75, 0.0), PlacementOp::Scale(Vec3::splat(0.8))],
                ),
                ModelEntry::new("data/mymodel/20%/mesh20%.obj", vec![t(0.0, 0.75, 0.0)]),
                ModelEntry::new("data/lata/lata50%/lata50%.obj", vec![t(0.0, 1.0, 0.0)]),
                ModelEntry::new("data/lata/lata20%/lata20%.obj", vec![t(1.0, 0.0, 0.0)]),
                ModelEntry::new("data/livros/50%/50%.obj", vec![t(-1.0, 0.0, -1.5)]),
                ModelEntry::new("data/livros/20%/20%.obj", vec![t(-1.0, 0.0, -2.5)]),
            ],
        }
    }
}

impl SceneConfig {
    /// Parse a scene from YAML text.
    pub fn from_yaml(text: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(text)
    }

    /// Read and parse a scene file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&text).map_err(|source| ConfigError::Yaml {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Read a scene file if one exists, otherwise use the built-in scene.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.exists() {
            tracing::info!("using scene config {}", path.display());
            Self::load(path)
        } else {
            tracing::debug!("no {} found, using built-in scene", path.display());
            Ok(Self::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_scene_has_six_models() {
        let scene = SceneConfig::default();
        assert_eq!(scene.models.len(), 6);
        assert!(scene.chain_placements);
        assert_eq!(scene.models[0].placement.len(), 2);
        assert!(scene.models.iter().skip(1).all(|m| m.placement.len() == 1));
    }

    #[test]
    fn parse_minimal_yaml() {
        let yaml = r#"
models:
  - path: assets/cube.obj
    placement:
      - translate: [1.0, 0.0, 0.0]
      - scale: [2.0, 2.0, 2.0]
  - path: assets/teapot.obj
"#;
        let scene = SceneConfig::from_yaml(yaml).unwrap();
        assert!(scene.chain_placements);
        assert_eq!(scene.shaders, ShaderPaths::default());
        assert_eq!(scene.models.len(), 2);
        assert_eq!(
            scene.models[0].placement,
            vec![
                PlacementOp::Translate(Vec3::X),
                PlacementOp::Scale(Vec3::splat(2.0))
            ]
        );
        assert!(scene.models[1].placement.is_empty());
    }

    #[test]
    fn load_from_file() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            tmp,
            "chain_placements: false\nshaders:\n  vertex: a.wgsl\n  fragment: b.wgsl\nmodels: []"
        )
        .unwrap();
        let scene = SceneConfig::load(tmp.path()).unwrap();
        assert!(!scene.chain_placements);
        assert_eq!(scene.shaders.vertex, PathBuf::from("a.wgsl"));
        assert!(scene.models.is_empty());
    }

    #[test]
    fn load_reports_parse_errors_with_path() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        writeln!(tmp, "models: 12").unwrap();
        let err = SceneConfig::load(tmp.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Yaml { .. }));
        assert!(err.to_string().contains(&tmp.path().display().to_string()));
    }

    #[test]
    fn missing_file_falls_back_to_default() {
        let dir = tempfile::tempdir().unwrap();
        let scene = SceneConfig::load_or_default(dir.path().join("objview.yaml")).unwrap();
        assert_eq!(scene, SceneConfig::default());
    }

    #[test]
    fn existing_file_replaces_default_scene() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("objview.yaml");
        std::fs::write(
            &path,
            "chain_placements: false\nmodels:\n  - path: assets/cube.obj\n    placement:\n      - translate: [0.0, 2.0, 0.0]\n",
        )
        .unwrap();

        let scene = SceneConfig::load_or_default(&path).unwrap();
        assert_ne!(scene, SceneConfig::default());
        assert!(!scene.chain_placements);
        assert_eq!(scene.models.len(), 1);
        assert_eq!(scene.models[0].path, PathBuf::from("assets/cube.obj"));
        assert_eq!(
            scene.models[0].placement,
            vec![PlacementOp::Translate(Vec3::new(0.0, 2.0, 0.0))]
        );
    }

    #[test]
    fn existing_but_broken_file_is_not_silently_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("objview.yaml");
        std::fs::write(&path, "models: 12\n").unwrap();
        let err = SceneConfig::load_or_default(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Yaml { .. }));
    }

    #[test]
    fn missing_file_is_an_error_for_load() {
        let dir = tempfile::tempdir().unwrap();
        let err = SceneConfig::load(dir.path().join("nope.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
