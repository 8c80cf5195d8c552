//! Pitch-control core for a wearable pitch shifter
//!
//! Decodes the rotary encoder into semitone steps, maps pitch estimates to
//! note names, and drives the display at a fixed cadence. Audio DSP, pitch
//! estimation and pixel drawing stay behind the traits in [`drivers`].

pub mod bench;
pub mod cli;
pub mod config;
pub mod control;
pub mod display;
pub mod drivers;
pub mod encoder;
pub mod notes;
pub mod pitch;

pub use config::AppConfig;
pub use control::{ControlLoop, ControllerState, Devices, TickReport};
pub use display::{DisplayLine, DisplayModel, NoteModel};
pub use encoder::{Direction, EncoderSample, QuadratureDecoder};
pub use notes::{frequency_to_nearest_semitone, output_note, semitone_to_name, NoteName};
pub use pitch::PitchState;
