//! Configuration management for the pitch controller
//!
//! Handles loading, parsing, and validation of the YAML configuration file.
//! Every section is optional; a missing file means defaults.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tokio::fs;

use crate::display::{DisplayLayout, LineLayout};

/// Largest text scale the renderer accepts
pub const MAX_TEXT_SCALE: u8 = 8;

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub control: ControlConfig,
    #[serde(default)]
    pub encoder: EncoderConfig,
    #[serde(default)]
    pub display: DisplayLayout,
    #[serde(default)]
    pub bench: BenchConfig,
}

/// Loop timing
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ControlConfig {
    /// Pause between bench polls (microseconds)
    #[serde(default = "default_poll_interval_us")]
    pub poll_interval_us: u64,
    /// Minimum time between two rendered frames (milliseconds)
    #[serde(default = "default_render_interval_ms")]
    pub render_interval_ms: u64,
}

/// Encoder wiring
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct EncoderConfig {
    /// Swap direction (encoder mounted with A/B crossed)
    #[serde(default)]
    pub reverse: bool,
}

/// Simulated inputs for running without hardware
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct BenchConfig {
    /// Signed detent counts turned one after another
    #[serde(default = "default_detents")]
    pub detents: Vec<i32>,
    /// Frequency readings replayed in a loop; `.nan` and negatives are allowed
    #[serde(default = "default_tones")]
    pub tones_hz: Vec<f32>,
    /// Polls between two frequency readings
    #[serde(default = "default_tone_every_polls")]
    pub tone_every_polls: u32,
    /// Polls between two encoder samples
    #[serde(default = "default_step_every_polls")]
    pub step_every_polls: u32,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            poll_interval_us: default_poll_interval_us(),
            render_interval_ms: default_render_interval_ms(),
        }
    }
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            detents: default_detents(),
            tones_hz: default_tones(),
            tone_every_polls: default_tone_every_polls(),
            step_every_polls: default_step_every_polls(),
        }
    }
}

impl ControlConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_micros(self.poll_interval_us)
    }

    pub fn render_interval(&self) -> Duration {
        Duration::from_millis(self.render_interval_ms)
    }
}

impl AppConfig {
    /// Load configuration from file with validation
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_yaml(&contents)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }

    /// Load from file, or fall back to defaults when the file does not exist
    pub async fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let exists = fs::try_exists(path)
            .await
            .with_context(|| format!("Failed to check config file: {}", path.display()))?;
        if exists {
            Self::load(path).await
        } else {
            tracing::warn!("Config file {} not found, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Parse and validate a YAML document
    pub fn from_yaml(contents: &str) -> Result<Self> {
        let config: AppConfig =
            serde_yaml::from_str(contents).context("Failed to parse YAML config")?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration for correctness and consistency
    pub fn validate(&self) -> Result<()> {
        if self.control.poll_interval_us == 0 {
            anyhow::bail!("control.poll_interval_us must be greater than 0");
        }
        if self.control.render_interval_ms == 0 {
            anyhow::bail!("control.render_interval_ms must be greater than 0");
        }

        for (name, line) in [
            ("top", &self.display.top),
            ("middle", &self.display.middle),
            ("bottom", &self.display.bottom),
        ] {
            validate_line(name, line)?;
        }

        if self.bench.tone_every_polls == 0 {
            anyhow::bail!("bench.tone_every_polls must be greater than 0");
        }
        if self.bench.step_every_polls == 0 {
            anyhow::bail!("bench.step_every_polls must be greater than 0");
        }

        Ok(())
    }
}

fn validate_line(name: &str, line: &LineLayout) -> Result<()> {
    if line.scale == 0 || line.scale > MAX_TEXT_SCALE {
        anyhow::bail!(
            "display.{} scale {} is invalid (must be 1-{})",
            name,
            line.scale,
            MAX_TEXT_SCALE
        );
    }
    if line.y < 0 {
        anyhow::bail!("display.{} y position cannot be negative", name);
    }
    Ok(())
}

// Default value functions
fn default_poll_interval_us() -> u64 { 500 }
fn default_render_interval_ms() -> u64 { 120 }
fn default_detents() -> Vec<i32> { vec![3, -5, 12, -10] }
fn default_tones() -> Vec<f32> { vec![440.0, 261.63, f32::NAN, 82.41, -1.0, 1046.5] }
fn default_tone_every_polls() -> u32 { 200 }
fn default_step_every_polls() -> u32 { 50 }
