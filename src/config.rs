use crate::time::{MINUTES_PER_HOUR, TimeWindow};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

pub const CONFIG_PATH_ENV: &str = "SHIFT_GRID_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("invalid config json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Layout and editor constants. Every field falls back to its default when
/// missing from a config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Extra vertical distance (percent of the axis) under which two blocks count as overlapping.
    pub overlap_margin: f64,
    /// Smallest block height in percent so short shifts stay clickable.
    pub min_block_height: f64,
    pub column_gutter: f64,
    pub conflict_width: f64,
    pub column_width_px: u32,
    pub overlapped_column_width_px: u32,
    /// Blocks shorter than this (percent) hide their description.
    pub description_min_height: f64,
    pub slot_granularity_minutes: u32,
    pub default_shift_minutes: u32,
    pub fallback_start_hour: u32,
    pub fallback_end_hour: u32,
    pub toast_duration_ms: u64,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            overlap_margin: 1.0,
            min_block_height: 3.0,
            column_gutter: 0.5,
            conflict_width: 98.0,
            column_width_px: 160,
            overlapped_column_width_px: 200,
            description_min_height: 8.0,
            slot_granularity_minutes: 5,
            default_shift_minutes: 60,
            fallback_start_hour: 8,
            fallback_end_hour: 18,
            toast_duration_ms: 4000,
        }
    }
}

impl GridConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config: GridConfig = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let contents = serde_json::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Loads the file named by `SHIFT_GRID_CONFIG`, or the defaults when unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) if !path.trim().is_empty() => {
                tracing::debug!(%path, "loading grid config");
                Self::load(path.trim())
            }
            _ => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let percent = 0.0..=100.0;
        if !self.overlap_margin.is_finite() || !percent.contains(&self.overlap_margin) {
            return Err(ConfigError::Invalid(format!(
                "overlap_margin {} must be within 0..=100",
                self.overlap_margin
            )));
        }
        if !self.min_block_height.is_finite()
            || self.min_block_height <= 0.0
            || self.min_block_height > 100.0
        {
            return Err(ConfigError::Invalid(format!(
                "min_block_height {} must be within (0, 100]",
                self.min_block_height
            )));
        }
        if !self.column_gutter.is_finite() || self.column_gutter < 0.0 || self.column_gutter >= 50.0
        {
            return Err(ConfigError::Invalid(format!(
                "column_gutter {} must be within 0..50",
                self.column_gutter
            )));
        }
        if !self.conflict_width.is_finite()
            || self.conflict_width <= 0.0
            || self.conflict_width > 100.0
        {
            return Err(ConfigError::Invalid(format!(
                "conflict_width {} must be within (0, 100]",
                self.conflict_width
            )));
        }
        let step = self.slot_granularity_minutes;
        if step == 0 || MINUTES_PER_HOUR % step != 0 {
            return Err(ConfigError::Invalid(format!(
                "slot_granularity_minutes {step} must divide an hour"
            )));
        }
        if self.default_shift_minutes == 0 {
            return Err(ConfigError::Invalid(
                "default_shift_minutes must be positive".into(),
            ));
        }
        TimeWindow::from_hours(self.fallback_start_hour, self.fallback_end_hour).map_err(|err| {
            ConfigError::Invalid(format!("fallback hours are not a valid window: {err}"))
        })?;
        Ok(())
    }

    /// Axis used when the school publishes no operating hours.
    pub fn fallback_window(&self) -> TimeWindow {
        TimeWindow::from_hours(self.fallback_start_hour, self.fallback_end_hour)
            .unwrap_or_default()
    }

    pub fn toast_duration(&self) -> Duration {
        Duration::from_millis(self.toast_duration_ms)
    }
}
