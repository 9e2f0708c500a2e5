//! Harness configuration, loaded from TOML.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use conditional::RunMode;

/// Settings for the simulated host loop.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HarnessConfig {
    /// Simulated frame rate.
    pub tick_hz: u32,
    /// Game-speed multiplier applied to the scaled delta. 0.0 simulates a
    /// paused game.
    pub time_scale: f32,
    /// Number of frames to run before teardown.
    pub frames: u64,
    /// Headless run: demotes task-failure logs to informational severity.
    pub batch: bool,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            tick_hz: 60,
            time_scale: 1.0,
            frames: 600,
            batch: false,
        }
    }
}

impl HarnessConfig {
    /// Loads the config file, falling back to defaults when it is absent.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config = toml::from_str(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;
        Ok(config)
    }

    pub fn run_mode(&self) -> RunMode {
        if self.batch {
            RunMode::Batch
        } else {
            RunMode::Interactive
        }
    }

    /// Unscaled seconds per frame.
    pub fn frame_dt(&self) -> f32 {
        1.0 / self.tick_hz.max(1) as f32
    }
}
