//! Game tuning, loaded from `snake.toml` (or `$SNAKE_CONFIG`) when present.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::{Cell, Coords};

pub const DEFAULT_GRID_COUNT: Cell = 20;
pub const DEFAULT_START: Coords = (10, 10);
pub const BASE_SPEED_MS: u64 = 150;
pub const MIN_SPEED_MS: u64 = 50;
pub const SPEED_STEP_MS: u64 = 10;
pub const SPEED_UP_EVERY: u32 = 3;
/// Largest board the terminal front end can lay out.
pub const MAX_GRID_COUNT: Cell = 200;

const CONFIG_FILE: &str = "snake.toml";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Cells per side of the square board.
    pub grid_count: Cell,
    pub start: Coords,
    pub base_speed_ms: u64,
    pub min_speed_ms: u64,
    pub speed_step_ms: u64,
    /// Speed goes up every time the score reaches a multiple of this.
    pub speed_up_every: u32,
    pub log_file: Option<PathBuf>,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            grid_count: DEFAULT_GRID_COUNT,
            start: DEFAULT_START,
            base_speed_ms: BASE_SPEED_MS,
            min_speed_ms: MIN_SPEED_MS,
            speed_step_ms: SPEED_STEP_MS,
            speed_up_every: SPEED_UP_EVERY,
            log_file: None,
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("grid_count must be between 2 and {max}, got {0}", max = MAX_GRID_COUNT)]
    GridSize(Cell),
    #[error("start {0:?} is outside the grid")]
    StartOffGrid(Coords),
    #[error("tick intervals must be non-zero")]
    ZeroInterval,
    #[error("min_speed_ms ({min}) is above base_speed_ms ({base})")]
    MinAboveBase { min: u64, base: u64 },
    #[error("speed_up_every must be non-zero")]
    ZeroSpeedUpEvery,
}

impl GameConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let n = self.grid_count;
        if n < 2 || n > MAX_GRID_COUNT {
            return Err(ConfigError::GridSize(n));
        }
        let (x, y) = self.start;
        if x < 0 || y < 0 || x >= n || y >= n {
            return Err(ConfigError::StartOffGrid(self.start));
        }
        if self.base_speed_ms == 0 || self.min_speed_ms == 0 {
            return Err(ConfigError::ZeroInterval);
        }
        if self.min_speed_ms > self.base_speed_ms {
            return Err(ConfigError::MinAboveBase { min: self.min_speed_ms, base: self.base_speed_ms });
        }
        if self.speed_up_every == 0 {
            return Err(ConfigError::ZeroSpeedUpEvery);
        }
        Ok(())
    }

    pub fn from_toml_str(text: &str) -> anyhow::Result<Self> {
        let cfg: GameConfig = toml::from_str(text)?;
        Ok(cfg)
    }

    /// Reads `path` if it is a file, otherwise starts from the defaults.
    /// Env overrides are applied on top, then the result is validated.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        use anyhow::Context;

        let mut cfg = if path.is_file() {
            let txt = std::fs::read_to_string(path)
                .with_context(|| format!("read {}", path.display()))?;
            Self::from_toml_str(&txt).with_context(|| format!("parse {}", path.display()))?
        } else {
            GameConfig::default()
        };

        if let Ok(s) = std::env::var("SNAKE_GRID") {
            if let Ok(n) = s.parse() {
                cfg.grid_count = n;
            }
        }
        if let Ok(s) = std::env::var("SNAKE_SPEED_MS") {
            if let Ok(ms) = s.parse() {
                cfg.base_speed_ms = ms;
            }
        }

        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load_default() -> anyhow::Result<Self> {
        let path = std::env::var_os("SNAKE_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILE));
        Self::load_from(&path)
    }
}
