use glam::Vec3;
use serde::{Deserialize, Serialize};
use solids_geometry::{GeometryError, Mesh, SolidShape};
use std::path::Path;

use crate::camera::Projection;

/// Errors from loading or validating a scene configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid projection: {0}")]
    InvalidProjection(String),
    #[error("invalid solid: {0}")]
    Geometry(#[from] GeometryError),
}

/// One solid in the scene: what to build and where to put it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolidConfig {
    pub shape: SolidShape,
    pub offset: Vec3,
}

/// Scene description. `Default` is the three-solid demo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Drawn in order every frame.
    pub solids: Vec<SolidConfig>,
    pub projection: Projection,
    pub clear_color: [f32; 4],
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            solids: vec![
                SolidConfig {
                    shape: SolidShape::Cube,
                    offset: Vec3::new(-3.0, 0.0, -7.0),
                },
                SolidConfig {
                    shape: SolidShape::default_cylinder(),
                    offset: Vec3::new(0.0, 0.0, -7.0),
                },
                SolidConfig {
                    shape: SolidShape::default_cone(),
                    offset: Vec3::new(3.0, 0.0, -7.0),
                },
            ],
            projection: Projection::default(),
            clear_color: [0.0, 0.0, 0.0, 1.0],
        }
    }
}

/// A generated mesh placed at a fixed world offset.
#[derive(Debug, Clone, PartialEq)]
pub struct SolidInstance {
    pub name: &'static str,
    pub mesh: Mesh,
    pub offset: Vec3,
}

impl SceneConfig {
    /// Load and validate a configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let file = std::fs::File::open(path.as_ref())?;
        let config: Self = serde_json::from_reader(file)?;
        config.validate()?;
        tracing::debug!(
            "loaded scene config with {} solids from {}",
            config.solids.len(),
            path.as_ref().display()
        );
        Ok(config)
    }

    /// Write the configuration as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let file = std::fs::File::create(path.as_ref())?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_projection()?;
        self.instances()?;
        Ok(())
    }

    /// Reject projections that cannot produce a finite perspective matrix.
    pub fn validate_projection(&self) -> Result<(), ConfigError> {
        let p = &self.projection;
        if !(p.fov_degrees > 0.0 && p.fov_degrees < 180.0) {
            return Err(ConfigError::InvalidProjection(format!(
                "fov_degrees must be in (0, 180), got {}",
                p.fov_degrees
            )));
        }
        if !(p.near > 0.0 && p.far > p.near) {
            return Err(ConfigError::InvalidProjection(format!(
                "need 0 < near < far, got near={} far={}",
                p.near, p.far
            )));
        }
        Ok(())
    }

    /// Generate every solid's mesh, in draw order.
    pub fn instances(&self) -> Result<Vec<SolidInstance>, GeometryError> {
        self.solids
            .iter()
            .map(|solid| {
                Ok(SolidInstance {
                    name: solid.shape.name(),
                    mesh: solid.shape.build()?,
                    offset: solid.offset,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_three_solid_demo() {
        let config = SceneConfig::default();
        let names: Vec<&str> = config.solids.iter().map(|s| s.shape.name()).collect();
        assert_eq!(names, vec!["cube", "cylinder", "cone"]);
        let xs: Vec<f32> = config.solids.iter().map(|s| s.offset.x).collect();
        assert_eq!(xs, vec![-3.0, 0.0, 3.0]);
        assert!(config.solids.iter().all(|s| s.offset.z == -7.0));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn instances_build_meshes_in_order() {
        let instances = SceneConfig::default().instances().unwrap();
        let counts: Vec<usize> = instances.iter().map(|i| i.mesh.vertex_count()).collect();
        assert_eq!(counts, vec![24, 68, 35]);
    }

    #[test]
    fn file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scene.json");
        let config = SceneConfig::default();
        config.save(&path).unwrap();
        assert_eq!(SceneConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn partial_json_uses_defaults() {
        let config: SceneConfig =
            serde_json::from_str(r#"{ "projection": { "fov_degrees": 60.0 } }"#).unwrap();
        assert_eq!(config.projection.fov_degrees, 60.0);
        assert_eq!(config.projection.far, 100.0);
        assert_eq!(config.solids.len(), 3);
    }

    #[test]
    fn solid_json_shape() {
        let json = r#"{
            "solids": [
                { "shape": { "kind": "cone", "radius": 1.0, "height": 2.0, "radial_segments": 8 },
                  "offset": [1.0, 2.0, 3.0] }
            ]
        }"#;
        let config: SceneConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.solids.len(), 1);
        assert_eq!(config.solids[0].offset, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(config.instances().unwrap()[0].mesh.vertex_count(), 11);
    }

    #[test]
    fn invalid_projection_rejected() {
        let mut config = SceneConfig::default();
        config.projection.near = 0.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidProjection(_))
        ));
    }

    #[test]
    fn degenerate_solid_rejected() {
        let mut config = SceneConfig::default();
        config.solids[1].shape = SolidShape::Cylinder {
            radius_top: 1.0,
            radius_bottom: 1.0,
            height: 1.0,
            radial_segments: 2,
        };
        assert!(matches!(config.validate(), Err(ConfigError::Geometry(_))));
    }
}
