//! Frame-by-frame renderer that writes a spinning scene to PPM files
use std::fs;
use std::path::PathBuf;

use log::{debug, info, warn};
use nalgebra::Vector3;
use ortho3d_core::{
    Axis, CameraAxis, Canvas, CanvasError, RenderError, StlError, TriangleObject,
};
use thiserror::Error;

pub mod config;
pub mod preview;

pub use config::{ConfigError, RenderConfig, RotationAxis};
pub use preview::TerminalPreview;

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Canvas(#[from] CanvasError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error("Failed to load mesh: {0}")]
    Stl(#[from] StlError),
    #[error("Failed to create output directory: {0}")]
    Io(#[from] std::io::Error),
}

/// Outcome of [`App::run`]
#[derive(Debug, Default)]
pub struct RunSummary {
    pub written: Vec<PathBuf>,
    pub failed: usize,
}

/// Owns the scene and the canvas for an animation run
pub struct App {
    config: RenderConfig,
    scene: TriangleObject,
    canvas: Canvas,
}

impl App {
    /// Build the scene described by `config` and point the camera
    pub fn new(config: RenderConfig) -> Result<Self, AppError> {
        config.validate()?;
        let scene = load_scene(&config)?;
        Self::build(config, scene)
    }

    /// Use an already built scene instead of the one named in `config`
    pub fn with_scene(config: RenderConfig, scene: TriangleObject) -> Result<Self, AppError> {
        config.validate()?;
        Self::build(config, scene)
    }

    fn build(config: RenderConfig, mut scene: TriangleObject) -> Result<Self, AppError> {
        let mut canvas = Canvas::new(config.height, config.width);
        let axis = canvas.set_camera_normal_from_slice(&config.camera_normal)?;

        if config.center {
            center_on_canvas(&mut scene, &axis, &canvas);
        }

        Ok(Self {
            config,
            scene,
            canvas,
        })
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn scene(&self) -> &TriangleObject {
        &self.scene
    }

    /// Render every frame. A frame that cannot be written is logged and
    /// skipped; the remaining frames are still rendered.
    pub fn run(&mut self) -> Result<RunSummary, AppError> {
        fs::create_dir_all(&self.config.output_dir)?;

        let pivot = self.scene.centroid().unwrap_or_else(Vector3::zeros);
        let axis = Axis::from(self.config.rotation_axis);
        let step = self.config.step_degrees();
        let mut summary = RunSummary::default();

        for frame in 0..self.config.frames {
            self.render_frame()?;

            let path = self.config.frame_path(frame);
            match self.canvas.write_ppm(&path) {
                Ok(()) => summary.written.push(path),
                Err(e) => {
                    warn!("Skipping frame {}: {}", frame, e);
                    summary.failed += 1;
                }
            }

            self.scene.rotate_around(axis, step, &pivot);
        }

        info!(
            "{} of {} frames written to '{}'",
            summary.written.len(),
            self.config.frames,
            self.config.output_dir.display()
        );
        Ok(summary)
    }

    /// Clear the canvas and draw the scene in its current pose
    pub fn render_frame(&mut self) -> Result<(), AppError> {
        self.canvas.clear();
        if self.config.parallel {
            self.scene.project(&mut self.canvas)?;
        } else {
            self.scene.project_serial(&mut self.canvas)?;
        }
        Ok(())
    }
}

/// The configured STL mesh, or a cube when none is given
pub fn load_scene(config: &RenderConfig) -> Result<TriangleObject, AppError> {
    let scene = match &config.stl {
        Some(path) => {
            info!("Loading STL file: {}", path.display());
            TriangleObject::from_stl_file(path, &config.color_policy())?
        }
        None => TriangleObject::cube(Vector3::zeros(), config.cube_size),
    };
    debug!("scene has {} triangles", scene.size());
    Ok(scene)
}

/// Translate `scene` so its centroid projects onto the middle of `canvas`
pub fn center_on_canvas(scene: &mut TriangleObject, axis: &CameraAxis, canvas: &Canvas) {
    let Some(centroid) = scene.centroid() else {
        return;
    };
    let screen = axis.to_screen(&centroid);
    let offset = axis.ortho1 * (canvas.height() as f32 / 2.0 - screen.x)
        + axis.ortho2 * (canvas.width() as f32 / 2.0 - screen.y);
    scene.translate(offset.x, offset.y, offset.z);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config(dir: &std::path::Path) -> RenderConfig {
        RenderConfig {
            width: 64,
            height: 48,
            frames: 3,
            cube_size: 20.0,
            output_dir: dir.join("frames"),
            ..RenderConfig::default()
        }
    }

    #[test]
    fn test_run_writes_every_frame() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = App::new(small_config(dir.path())).unwrap();
        assert_eq!(app.scene().size(), 12);

        let summary = app.run().unwrap();
        assert_eq!(summary.failed, 0);
        assert_eq!(summary.written.len(), 3);
        for path in &summary.written {
            let text = fs::read_to_string(path).unwrap();
            assert!(text.starts_with("P3\n64 48\n255\n"));
        }
    }

    #[test]
    fn test_scene_is_centered() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = App::new(small_config(dir.path())).unwrap();
        app.render_frame().unwrap();
        assert!(app.canvas().depth_at(24, 32).is_some());
        assert!(app.canvas().depth_at(0, 0).is_none());
    }

    #[test]
    fn test_tilted_camera_still_centers() {
        let dir = tempfile::tempdir().unwrap();
        let config = RenderConfig {
            camera_normal: vec![1.0, 1.0, 1.0],
            ..small_config(dir.path())
        };
        let mut app = App::new(config).unwrap();
        app.render_frame().unwrap();
        assert!(app.canvas().depth_at(24, 32).is_some());
    }

    #[test]
    fn test_bad_camera_normal_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let config = RenderConfig {
            camera_normal: vec![0.0, 1.0],
            ..small_config(dir.path())
        };
        assert!(matches!(
            App::new(config),
            Err(AppError::Canvas(CanvasError::NormalDimension(2)))
        ));

        let config = RenderConfig {
            camera_normal: vec![0.0, 0.0, 0.0],
            ..small_config(dir.path())
        };
        assert!(matches!(
            App::new(config),
            Err(AppError::Canvas(CanvasError::ZeroNormal))
        ));
    }

    #[test]
    fn test_unwritable_frames_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let config = small_config(dir.path());
        let mut app = App::new(config.clone()).unwrap();

        // A directory where the first frame file should go makes that write fail.
        fs::create_dir_all(config.frame_path(0)).unwrap();
        let summary = app.run().unwrap();
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.written, vec![config.frame_path(1), config.frame_path(2)]);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let config = RenderConfig {
            frames: 0,
            ..small_config(dir.path())
        };
        assert!(matches!(
            App::with_scene(config.clone(), TriangleObject::cube(Vector3::zeros(), 10.0)),
            Err(AppError::Config(ConfigError::Invalid(_)))
        ));

        // Checked before the mesh is read
        let config = RenderConfig {
            stl: Some(dir.path().join("missing.stl")),
            ..config
        };
        assert!(matches!(
            App::new(config),
            Err(AppError::Config(ConfigError::Invalid(_)))
        ));
    }

    #[test]
    fn test_missing_stl_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = RenderConfig {
            stl: Some(dir.path().join("missing.stl")),
            ..small_config(dir.path())
        };
        assert!(matches!(App::new(config), Err(AppError::Stl(StlError::Io(_)))));
    }
}
