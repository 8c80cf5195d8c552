//! Hardware collaborators (encoder pins, pitch estimator, shift engine, display)
//!
//! The control loop only talks to these traits. Every method returns
//! immediately: readiness is checked first, data is read only when ready.

use anyhow::Result;

use crate::display::DisplayLine;
use crate::encoder::EncoderSample;

/// The two encoder signal pins (pull-up, idle high)
pub trait EncoderPins {
    /// Sample both pins right now
    fn read(&mut self) -> EncoderSample;

    /// Resting level at power-up, used to seed the decoder
    ///
    /// Must not consume any motion the next `read()` would report.
    fn rest(&mut self) -> EncoderSample {
        self.read()
    }
}

/// Asynchronous fundamental-frequency estimator
pub trait FrequencySource {
    /// Whether a new estimate is waiting
    fn is_ready(&mut self) -> bool;

    /// Latest estimate in Hz; only meaningful right after `is_ready()` was true
    fn read_hz(&mut self) -> f32;

    /// Read the estimate if one is waiting
    fn poll(&mut self) -> Option<f32> {
        if self.is_ready() {
            Some(self.read_hz())
        } else {
            None
        }
    }
}

/// Granular pitch-shift engine
pub trait PitchShifter {
    /// Set the frequency multiplier (0.5 - 2.0)
    fn set_pitch_ratio(&mut self, ratio: f32) -> Result<()>;
}

/// Text display; pixel layout is the implementor's business
pub trait TextRenderer {
    /// Queue one line of text
    fn draw_text(&mut self, line: &DisplayLine) -> Result<()>;

    /// Show everything queued since the last call
    fn present(&mut self) -> Result<()>;
}

pub mod console;
pub mod simulated;

// Re-export commonly used drivers
pub use console::{ConsoleRenderer, LoggingShifter};
pub use simulated::{ManualEncoder, ManualFrequency, ScriptedEncoder, ToneSequence};
