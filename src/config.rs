//! Engine configuration
//!
//! Every field has a default, so a config file only needs the values it changes.
//! Files ending in `.json` are read as JSON, everything else as YAML.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::GraphResult;
use crate::shapes::ShapeTable;
use crate::simulation::SimulationConfig;

/// Size of the drawing area in screen units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 960.0,
            height: 600.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub viewport: Viewport,
    pub simulation: SimulationConfig,
    /// Node type to glyph mapping
    pub shapes: ShapeTable,
    /// Added to both spans by zoom-to-fit so edge glyphs are not clipped
    pub fit_padding: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            viewport: Viewport::default(),
            simulation: SimulationConfig::default(),
            shapes: ShapeTable::default(),
            fit_padding: 10.0,
        }
    }
}

impl EngineConfig {
    pub fn from_yaml_str(yaml: &str) -> GraphResult<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn from_json_str(json: &str) -> GraphResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load from a file, picking the format from the extension
    pub fn from_path(path: &Path) -> GraphResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        if is_json {
            Self::from_json_str(&content)
        } else {
            Self::from_yaml_str(&content)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GraphError;
    use crate::shapes::NodeShape;

    #[test]
    fn empty_yaml_gives_defaults() {
        let config = EngineConfig::from_yaml_str("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn partial_yaml_overrides_only_named_fields() {
        let config = EngineConfig::from_yaml_str(
            r#"
viewport:
  width: 200
simulation:
  charge: -500
  link_distances:
    compressed: 90
    attached: 25
  link_strengths:
    attached: 0.2
shapes:
  tall: [volume]
fit_padding: 4
"#,
        )
        .unwrap();

        assert_eq!(config.viewport.width, 200.0);
        assert_eq!(config.viewport.height, 600.0);
        assert_eq!(config.simulation.charge, -500.0);
        assert_eq!(config.simulation.distance_for("compressed"), 90.0);
        assert_eq!(config.simulation.strength_for("attached"), 0.2);
        assert_eq!(config.simulation.friction, SimulationConfig::default().friction);
        assert_eq!(config.shapes.shape_of("volume"), NodeShape::Tall);
        assert_eq!(config.fit_padding, 4.0);
    }

    #[test]
    fn json_config_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.json");
        std::fs::write(&path, r#"{"viewport": {"width": 320, "height": 240}}"#).unwrap();

        let config = EngineConfig::from_path(&path).unwrap();
        assert_eq!(config.viewport.width, 320.0);
        assert_eq!(config.viewport.height, 240.0);
    }

    #[test]
    fn missing_file_is_io_error() {
        let result = EngineConfig::from_path(Path::new("/definitely/not/here.yaml"));
        assert!(matches!(result, Err(GraphError::Io(_))));
    }

    #[test]
    fn bad_yaml_is_yaml_error() {
        let result = EngineConfig::from_yaml_str("viewport: [1, 2");
        assert!(matches!(result, Err(GraphError::Yaml(_))));
    }
}
