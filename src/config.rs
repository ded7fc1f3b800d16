//! Command line configuration and logging setup.

use std::{fs::File, path::PathBuf, time::Duration};

use clap::Parser;
use color_eyre::eyre::Result;
use env_logger::{Builder, Env, Target};
use thiserror::Error;

/// Default number of grid columns.
pub const DEFAULT_WIDTH: u16 = 40;
/// Default number of grid rows.
pub const DEFAULT_HEIGHT: u16 = 20;
/// Default delay between two search steps, in milliseconds.
pub const DEFAULT_SEARCH_DELAY_MS: u64 = 10;
/// Default delay between two maze carving steps, in milliseconds.
pub const DEFAULT_MAZE_DELAY_MS: u64 = 20;
/// Default delay between two path following frames, in milliseconds.
pub const DEFAULT_FRAME_DELAY_MS: u64 = 16;
/// Default agent speed limit, in world units per frame.
pub const DEFAULT_MAX_SPEED: f64 = 2.;
/// Default agent acceleration limit, in world units per frame squared.
pub const DEFAULT_MAX_ACCELERATION: f64 = 2.;
/// Default distance the agent looks ahead along its path, in world units.
pub const DEFAULT_LOOKAHEAD: f64 = 35.;

/// Rejection of a steering limit given on the command line.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SteeringLimitError {
    /// The value is not a number.
    #[error("`{0}` is not a number")]
    NotANumber(String),
    /// The value is infinite, NaN, zero or negative.
    #[error("{0} must be finite and greater than zero")]
    NotPositive(f64),
}

/// Checks whether a steering limit lets the agent make progress.
///
/// A zero or negative limit stalls or reverses the agent, and NaN poisons every position it touches.
#[must_use]
pub fn is_positive_finite(value: f64) -> bool {
    value.is_finite() && value > 0.
}

/// Parses a steering limit, accepting only finite values above zero.
///
/// # Errors
///
/// - [`SteeringLimitError::NotANumber`] if the text is not a float
/// - [`SteeringLimitError::NotPositive`] if the float is not finite and positive
pub fn parse_steering_limit(text: &str) -> Result<f64, SteeringLimitError> {
    let value = text
        .parse::<f64>()
        .map_err(|_parse_error| SteeringLimitError::NotANumber(text.to_owned()))?;

    if is_positive_finite(value) {
        Ok(value)
    } else {
        Err(SteeringLimitError::NotPositive(value))
    }
}

/// Options recognized on the command line.
///
/// Every option has a default, so running the binary without arguments opens an empty grid ready
/// for painting.
#[derive(Debug, Clone, PartialEq, Parser)]
#[command(version, about)]
pub struct Config {
    /// Number of grid columns.
    #[arg(long, default_value_t = DEFAULT_WIDTH)]
    pub width: u16,
    /// Number of grid rows.
    #[arg(long, default_value_t = DEFAULT_HEIGHT)]
    pub height: u16,
    /// Side length of a cell in world units.
    #[arg(long, default_value_t = crate::grid::DEFAULT_CELL_SIZE)]
    pub cell_size: u16,
    /// Delay between two search steps, in milliseconds.
    #[arg(long, default_value_t = DEFAULT_SEARCH_DELAY_MS)]
    pub search_delay_ms: u64,
    /// Delay between two maze carving steps, in milliseconds.
    #[arg(long, default_value_t = DEFAULT_MAZE_DELAY_MS)]
    pub maze_delay_ms: u64,
    /// Delay between two path following frames, in milliseconds.
    #[arg(long, default_value_t = DEFAULT_FRAME_DELAY_MS)]
    pub frame_delay_ms: u64,
    /// Agent speed limit, in world units per frame.
    #[arg(long, default_value_t = DEFAULT_MAX_SPEED, value_parser = parse_steering_limit)]
    pub max_speed: f64,
    /// Agent acceleration limit, in world units per frame squared.
    #[arg(long, default_value_t = DEFAULT_MAX_ACCELERATION, value_parser = parse_steering_limit)]
    pub max_acceleration: f64,
    /// Distance the agent looks ahead along its path, in world units.
    #[arg(long, default_value_t = DEFAULT_LOOKAHEAD, value_parser = parse_steering_limit)]
    pub lookahead: f64,
    /// Seed for maze generation; a random seed is used when omitted.
    #[arg(long)]
    pub seed: Option<u64>,
    /// File to write logs to. Logging is disabled when omitted, as the terminal belongs to the UI.
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            cell_size: crate::grid::DEFAULT_CELL_SIZE,
            search_delay_ms: DEFAULT_SEARCH_DELAY_MS,
            maze_delay_ms: DEFAULT_MAZE_DELAY_MS,
            frame_delay_ms: DEFAULT_FRAME_DELAY_MS,
            max_speed: DEFAULT_MAX_SPEED,
            max_acceleration: DEFAULT_MAX_ACCELERATION,
            lookahead: DEFAULT_LOOKAHEAD,
            seed: None,
            log_file: None,
        }
    }
}

impl Config {
    /// Delay between two search steps.
    #[must_use]
    pub const fn search_delay(&self) -> Duration {
        Duration::from_millis(self.search_delay_ms)
    }

    /// Delay between two maze carving steps.
    #[must_use]
    pub const fn maze_delay(&self) -> Duration {
        Duration::from_millis(self.maze_delay_ms)
    }

    /// Delay between two path following frames.
    #[must_use]
    pub const fn frame_delay(&self) -> Duration {
        Duration::from_millis(self.frame_delay_ms)
    }
}

/// Routes log records to the configured log file.
///
/// The filter is read from `RUST_LOG` and defaults to `info`. Nothing is installed when no log file
/// was requested.
///
/// # Errors
///
/// This function may return errors if:
/// - The log file cannot be created
/// - A logger has already been installed
pub fn init_logging(config: &Config) -> Result<()> {
    let Some(path) = &config.log_file else {
        return Ok(());
    };

    let file = File::create(path)?;
    Builder::from_env(Env::default().default_filter_or("info"))
        .target(Target::Pipe(Box::new(file)))
        .try_init()?;

    Ok(())
}
