//! Render settings, loadable from a TOML file
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use ortho3d_core::{Axis, ColorPolicy};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// A value is out of range
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Axis the scene spins around between frames
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum RotationAxis {
    X,
    Y,
    Z,
}

impl From<RotationAxis> for Axis {
    fn from(axis: RotationAxis) -> Self {
        match axis {
            RotationAxis::X => Axis::X,
            RotationAxis::Y => Axis::Y,
            RotationAxis::Z => Axis::Z,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub width: usize,
    pub height: usize,
    /// Viewing direction; must have exactly three components
    pub camera_normal: Vec<f32>,
    pub frames: usize,
    /// Rotation per frame; a full turn spread over all frames when unset
    pub degrees_per_frame: Option<f32>,
    pub rotation_axis: RotationAxis,
    pub output_dir: PathBuf,
    pub file_prefix: String,
    /// Mesh to render; a colored cube when unset
    pub stl: Option<PathBuf>,
    pub cube_size: f32,
    /// Give every N facets of the mesh a new random color
    pub color_every: Option<usize>,
    pub seed: u64,
    /// Move the scene so its centroid lands in the middle of the image
    pub center: bool,
    pub parallel: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1000,
            height: 1000,
            camera_normal: vec![0.0, 0.0, 1.0],
            frames: 2,
            degrees_per_frame: None,
            rotation_axis: RotationAxis::Y,
            output_dir: PathBuf::from("output"),
            file_prefix: "frame".to_string(),
            stl: None,
            cube_size: 100.0,
            color_every: None,
            seed: 0,
            center: true,
            parallel: true,
        }
    }
}

impl RenderConfig {
    /// Load configuration from a TOML file; missing keys keep their defaults
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "image size must be non-zero, got {}x{}",
                self.width, self.height
            )));
        }
        if self.frames == 0 {
            return Err(ConfigError::Invalid("frames must be at least 1".to_string()));
        }
        if self.color_every == Some(0) {
            return Err(ConfigError::Invalid("color_every must be at least 1".to_string()));
        }
        if self.cube_size.is_nan() || self.cube_size <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "cube_size must be positive, got {}",
                self.cube_size
            )));
        }
        Ok(())
    }

    /// Degrees to rotate after each frame
    pub fn step_degrees(&self) -> f32 {
        self.degrees_per_frame
            .unwrap_or(360.0 / self.frames.max(1) as f32)
    }

    pub fn color_policy(&self) -> ColorPolicy {
        match self.color_every {
            Some(faces) => ColorPolicy::RandomEvery {
                faces,
                seed: self.seed,
            },
            None => ColorPolicy::default(),
        }
    }

    pub fn frame_path(&self, frame: usize) -> PathBuf {
        self.output_dir
            .join(format!("{}_{}.ppm", self.file_prefix, frame))
    }
}
