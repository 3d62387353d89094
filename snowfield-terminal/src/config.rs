/// Command line options and the viewer configuration built from them
use clap::Parser;
use snowfield_core::{GroundGrid, Steps};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{Result, ViewerError};

#[derive(Debug, Parser)]
#[command(
    name = "snowfield",
    version,
    about = "Textured ground and a spinning cube, rendered in the terminal"
)]
pub struct Cli {
    /// Milliseconds between animation ticks
    #[arg(long, default_value_t = 10)]
    pub tick_ms: u64,

    /// Number of ground quads along each axis
    #[arg(long, default_value_t = 40)]
    pub grid_size: u32,

    /// Distance travelled per forward/backward key press
    #[arg(long, default_value_t = 0.1, allow_negative_numbers = true)]
    pub move_step: f32,

    /// Degrees turned per left/right key press
    #[arg(long, default_value_t = 0.1, allow_negative_numbers = true)]
    pub turn_step: f32,

    /// Degrees the cube spins per tick
    #[arg(long, default_value_t = 0.1, allow_negative_numbers = true)]
    pub spin_step: f32,

    /// Image used for the ground instead of the built-in snow
    #[arg(long)]
    pub ground_texture: Option<PathBuf>,

    /// Image used for the cube instead of the built-in tree
    #[arg(long)]
    pub cube_texture: Option<PathBuf>,

    /// Write logs to this file (the terminal is busy with the scene)
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Render a single frame to a PNG file and exit
    #[arg(long)]
    pub screenshot: Option<PathBuf>,

    /// Screenshot width in pixels
    #[arg(long, default_value_t = 320)]
    pub width: u32,

    /// Screenshot height in pixels
    #[arg(long, default_value_t = 180)]
    pub height: u32,
}

/// Output of a screenshot run
#[derive(Debug, Clone, PartialEq)]
pub struct ScreenshotConfig {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
}

/// Everything the viewer needs to run
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerConfig {
    pub tick_interval: Duration,
    pub grid: GroundGrid,
    pub steps: Steps,
    pub ground_texture: Option<PathBuf>,
    pub cube_texture: Option<PathBuf>,
    pub screenshot: Option<ScreenshotConfig>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(10),
            grid: GroundGrid::default(),
            steps: Steps::default(),
            ground_texture: None,
            cube_texture: None,
            screenshot: None,
        }
    }
}

impl ViewerConfig {
    /// Reject settings the viewer cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.tick_interval.is_zero() {
            return Err(ViewerError::InvalidConfig(
                "tick interval must be positive".to_string(),
            ));
        }
        if self.grid.size == 0 {
            return Err(ViewerError::InvalidConfig(
                "grid size must be positive".to_string(),
            ));
        }
        if self.grid.size > GroundGrid::MAX_SIZE {
            return Err(ViewerError::InvalidConfig(format!(
                "grid size {} exceeds the maximum of {}",
                self.grid.size,
                GroundGrid::MAX_SIZE
            )));
        }
        if let Some(screenshot) = &self.screenshot {
            if screenshot.width == 0 || screenshot.height == 0 {
                return Err(ViewerError::InvalidConfig(format!(
                    "screenshot size {}x{} is empty",
                    screenshot.width, screenshot.height
                )));
            }
        }
        Ok(())
    }
}

impl TryFrom<&Cli> for ViewerConfig {
    type Error = ViewerError;

    fn try_from(cli: &Cli) -> Result<Self> {
        let config = Self {
            tick_interval: Duration::from_millis(cli.tick_ms),
            grid: GroundGrid {
                size: cli.grid_size,
                ..GroundGrid::default()
            },
            steps: Steps {
                move_distance: cli.move_step,
                turn_degrees: cli.turn_step,
                spin_degrees: cli.spin_step,
            },
            ground_texture: cli.ground_texture.clone(),
            cube_texture: cli.cube_texture.clone(),
            screenshot: cli.screenshot.clone().map(|path| ScreenshotConfig {
                path,
                width: cli.width,
                height: cli.height,
            }),
        };
        config.validate()?;
        Ok(config)
    }
}
