//! Command-line configuration for the terminal front-end.

use std::path::PathBuf;

use clap::Parser;
use thiserror::Error;

/// Smallest world (in tiles) the terrain bands and spawn policy work in.
pub const MIN_WORLD_TILES: usize = 8;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("world of {width}x{height} tiles is too small (minimum {min}x{min})")]
    ViewportTooSmall {
        width: usize,
        height: usize,
        min: usize,
    },
    #[error("start level must be at least 1, got {0}")]
    InvalidLevel(u32),
}

#[derive(Debug, Clone, Parser)]
#[command(name = "dig_survive", version, about = "Dig for treasure, dodge missiles, outlast the robots")]
pub struct Config {
    /// Seed for world generation and every random roll (random if omitted)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Level to start on
    #[arg(long, default_value_t = 1)]
    pub start_level: u32,

    /// World width in tiles (defaults to what fits the terminal)
    #[arg(long)]
    pub width: Option<usize>,

    /// World height in tiles (defaults to what fits the terminal)
    #[arg(long)]
    pub height: Option<usize>,

    /// Write logs to this file; nothing is logged otherwise
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl Config {
    /// Resolve the world size against the terminal and check it.
    ///
    /// A tile is drawn two columns wide and one row tall, and two rows are
    /// reserved for the HUD and the hint line.
    pub fn world_size(&self, term_cols: u16, term_rows: u16) -> Result<(usize, usize), ConfigError> {
        let width = self.width.unwrap_or(usize::from(term_cols) / 2);
        let height = self
            .height
            .unwrap_or_else(|| usize::from(term_rows).saturating_sub(2));
        validate_size(width, height)?;
        Ok((width, height))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.start_level == 0 {
            return Err(ConfigError::InvalidLevel(self.start_level));
        }
        if let (Some(width), Some(height)) = (self.width, self.height) {
            validate_size(width, height)?;
        }
        Ok(())
    }
}

fn validate_size(width: usize, height: usize) -> Result<(), ConfigError> {
    if width < MIN_WORLD_TILES || height < MIN_WORLD_TILES {
        return Err(ConfigError::ViewportTooSmall {
            width,
            height,
            min: MIN_WORLD_TILES,
        });
    }
    Ok(())
}
