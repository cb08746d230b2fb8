//! ortho3d - render a spinning mesh to a sequence of PPM frames
//!
//! Without `--stl` a cube with one color per face is rendered.

use std::io::stdout;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use ortho3d_cli::{App, RenderConfig, RotationAxis, TerminalPreview};

#[derive(Parser, Debug)]
#[command(name = "ortho3d", version, about = "Orthographic software rasterizer writing PPM frames")]
struct Cli {
    /// TOML file with render settings; flags override its values
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// ASCII or binary STL mesh to render
    #[arg(long, value_name = "FILE")]
    stl: Option<PathBuf>,

    #[arg(long)]
    width: Option<usize>,

    #[arg(long)]
    height: Option<usize>,

    /// Number of frames to write
    #[arg(short, long)]
    frames: Option<usize>,

    /// Rotation between frames in degrees
    #[arg(short, long, allow_hyphen_values = true)]
    degrees: Option<f32>,

    #[arg(long, value_enum)]
    axis: Option<RotationAxis>,

    /// Camera normal as X,Y,Z
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true, value_name = "X,Y,Z")]
    normal: Option<Vec<f32>>,

    /// Directory for the frame files
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Give every N facets a new random color
    #[arg(long, value_name = "N")]
    color_every: Option<usize>,

    /// Seed for random facet colors
    #[arg(long)]
    seed: Option<u64>,

    /// Draw the last frame in the terminal
    #[arg(long)]
    preview: bool,

    /// Project on a single thread
    #[arg(long)]
    serial: bool,

    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn into_config(self) -> Result<(RenderConfig, bool)> {
        let mut config = match &self.config {
            Some(path) => RenderConfig::load(path)
                .with_context(|| format!("Failed to load config '{}'", path.display()))?,
            None => RenderConfig::default(),
        };

        if let Some(stl) = self.stl {
            config.stl = Some(stl);
        }
        if let Some(width) = self.width {
            config.width = width;
        }
        if let Some(height) = self.height {
            config.height = height;
        }
        if let Some(frames) = self.frames {
            config.frames = frames;
        }
        if let Some(degrees) = self.degrees {
            config.degrees_per_frame = Some(degrees);
        }
        if let Some(axis) = self.axis {
            config.rotation_axis = axis;
        }
        if let Some(normal) = self.normal {
            config.camera_normal = normal;
        }
        if let Some(output) = self.output {
            config.output_dir = output;
        }
        if let Some(every) = self.color_every {
            config.color_every = Some(every);
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if self.serial {
            config.parallel = false;
        }

        Ok((config, self.preview))
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let (config, preview) = cli.into_config()?;
    let mut app = App::new(config).context("Failed to set up scene")?;
    info!("Rendering {} triangles", app.scene().size());

    let summary = app.run().context("Rendering failed")?;
    if summary.failed > 0 {
        info!("{} frame(s) could not be written", summary.failed);
    }

    if preview {
        let (columns, rows) = crossterm::terminal::size().context("Failed to query terminal size")?;
        let preview = TerminalPreview::fit(
            app.canvas(),
            columns as usize,
            (rows as usize).saturating_sub(1),
        );
        preview
            .draw(app.canvas(), &mut stdout())
            .context("Failed to draw preview")?;
    }

    Ok(())
}
