//! Console drivers - log every output for bench runs and debugging
//!
//! Useful for:
//! - Running the controller without a display or DSP board attached
//! - Watching what the loop would send to the hardware
//! - Asserting on outputs in tests

use anyhow::Result;
use tracing::{debug, info};

use super::{PitchShifter, TextRenderer};
use crate::display::DisplayLine;

/// Renderer that logs presented frames instead of drawing them
#[derive(Debug, Default)]
pub struct ConsoleRenderer {
    pending: Vec<DisplayLine>,
    last_frame: Vec<DisplayLine>,
    frames: u64,
}

impl ConsoleRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines of the most recently presented frame
    pub fn last_frame(&self) -> &[DisplayLine] {
        &self.last_frame
    }

    /// Frames presented so far
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl TextRenderer for ConsoleRenderer {
    fn draw_text(&mut self, line: &DisplayLine) -> Result<()> {
        debug!(text = %line.text, y = line.y, scale = line.scale, "draw");
        self.pending.push(line.clone());
        Ok(())
    }

    fn present(&mut self) -> Result<()> {
        self.frames += 1;
        self.last_frame = std::mem::take(&mut self.pending);

        let text = self
            .last_frame
            .iter()
            .map(|l| l.text.as_str())
            .collect::<Vec<_>>()
            .join(" | ");
        info!("🖥  [frame #{}] {}", self.frames, text);
        Ok(())
    }
}

/// Shift engine stand-in that records every ratio it receives
#[derive(Debug, Default)]
pub struct LoggingShifter {
    history: Vec<f32>,
}

impl LoggingShifter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ratios in the order they were set
    pub fn history(&self) -> &[f32] {
        &self.history
    }

    pub fn current(&self) -> Option<f32> {
        self.history.last().copied()
    }
}

impl PitchShifter for LoggingShifter {
    fn set_pitch_ratio(&mut self, ratio: f32) -> Result<()> {
        info!("🎚  Pitch ratio → {:.4}", ratio);
        self.history.push(ratio);
        Ok(())
    }
}
