//! Engine configuration, loadable from YAML.
//!
//! Every field has a default, so a config file only needs the values it
//! changes:
//!
//! ```yaml
//! eyeball_radius_mm: 11.5
//! head_stabilized: false
//! locator:
//!   project_pupil_onto_sphere: true
//! ```

use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::GazeError;
use crate::gaze::eyeball::DEFAULT_EYEBALL_RADIUS_MM;
use crate::landmarks::LandmarkLayout;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Eyeball radius used for both eyes (mm).
    pub eyeball_radius_mm: f64,
    /// Also report the head-stabilized gaze when a head pose is given.
    pub head_stabilized: bool,
    pub locator: LocatorSettings,
    pub layout: LandmarkLayout,
}

/// Thresholds of the pupil/eyeball-center locator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocatorSettings {
    pub min_socket_points: usize,
    pub min_iris_points: usize,
    /// Socket contours whose second principal spread is below this fraction
    /// of the first are treated as collinear.
    pub collinearity_tolerance: f64,
    /// Snap the pupil onto the eyeball sphere along the camera ray.
    pub project_pupil_onto_sphere: bool,
}

impl Default for LocatorSettings {
    fn default() -> Self {
        Self {
            min_socket_points: 3,
            min_iris_points: 3,
            collinearity_tolerance: 1e-4,
            project_pupil_onto_sphere: false,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            eyeball_radius_mm: DEFAULT_EYEBALL_RADIUS_MM,
            head_stabilized: true,
            locator: LocatorSettings::default(),
            layout: LandmarkLayout::default(),
        }
    }
}

impl EngineConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).with_context(|| format!("Failed to open {:?}", path))?;
        let config: EngineConfig = serde_yaml::from_reader(file)
            .with_context(|| format!("Failed to parse engine config {:?}", path))?;
        config.validate()?;
        info!(path = %path.display(), layout = %config.layout.name, "loaded engine config");
        Ok(config)
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: EngineConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml_string(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn validate(&self) -> std::result::Result<(), GazeError> {
        if !(self.eyeball_radius_mm.is_finite() && self.eyeball_radius_mm > 0.0) {
            return Err(GazeError::InvalidConfig(format!(
                "eyeball_radius_mm must be positive, got {}",
                self.eyeball_radius_mm
            )));
        }
        let locator = &self.locator;
        if locator.min_socket_points < 3 {
            return Err(GazeError::InvalidConfig(
                "min_socket_points must be at least 3 to define a plane".to_string(),
            ));
        }
        if locator.min_iris_points == 0 {
            return Err(GazeError::InvalidConfig(
                "min_iris_points must be at least 1".to_string(),
            ));
        }
        if !(locator.collinearity_tolerance.is_finite()
            && (0.0..1.0).contains(&locator.collinearity_tolerance))
        {
            return Err(GazeError::InvalidConfig(format!(
                "collinearity_tolerance must be in [0, 1), got {}",
                locator.collinearity_tolerance
            )));
        }
        Ok(())
    }
}
