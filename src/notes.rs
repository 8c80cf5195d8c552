//! Frequency to note mapping (12-TET, A4 = 440 Hz)
//!
//! Note numbers follow the MIDI convention: 69 is A4, 60 is C4 and the range
//! is 0-127 (about 8.18 Hz to 12.5 kHz).

use std::fmt;
use thiserror::Error;

/// Reference pitch of A4 in Hz
pub const A4_HZ: f64 = 440.0;
/// Note number of A4
pub const A4_NOTE: u8 = 69;
/// Highest note number
pub const MAX_NOTE: u8 = 127;

/// Chromatic names starting at C
pub const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NoteError {
    #[error("note number {0} is outside 0-127")]
    OutOfRange(i32),
}

/// Note name plus octave, e.g. `C#4`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NoteName {
    index: u8,
    octave: i8,
}

impl NoteName {
    /// Letter and accidental, e.g. `"A#"`
    pub fn letter(&self) -> &'static str {
        NOTE_NAMES[self.index as usize]
    }

    /// Position in the chromatic table (0 = C)
    pub fn index(&self) -> u8 {
        self.index
    }

    pub fn octave(&self) -> i8 {
        self.octave
    }

    /// Note number this name denotes (`octave * 12 + 12 + index`)
    pub fn semitone(&self) -> i32 {
        self.octave as i32 * 12 + 12 + self.index as i32
    }
}

impl fmt::Display for NoteName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.letter(), self.octave)
    }
}

/// Nearest note number for a frequency estimate
///
/// Returns `None` for non-finite or non-positive input. Finite frequencies
/// outside the note range are clamped to 0 or 127.
pub fn frequency_to_nearest_semitone(hz: f32) -> Option<u8> {
    let hz = hz as f64;
    if !hz.is_finite() || hz <= 0.0 {
        return None;
    }
    Some(nearest_note(A4_NOTE as f64 + 12.0 * (hz / A4_HZ).log2()))
}

/// Round a fractional note number half away from zero, then clamp to 0-127
fn nearest_note(exact: f64) -> u8 {
    exact.round().clamp(0.0, MAX_NOTE as f64) as u8
}

/// Name and octave of a note number in 0-127
pub fn semitone_to_name(n: i32) -> Result<NoteName, NoteError> {
    if !(0..=MAX_NOTE as i32).contains(&n) {
        return Err(NoteError::OutOfRange(n));
    }
    Ok(name_of(n))
}

/// Name of the input note moved by `shift` semitones, clamped into 0-127
pub fn output_note(input: u8, shift: i8) -> NoteName {
    name_of((input as i32 + shift as i32).clamp(0, MAX_NOTE as i32))
}

fn name_of(n: i32) -> NoteName {
    NoteName {
        index: n.rem_euclid(12) as u8,
        octave: (n.div_euclid(12) - 1) as i8,
    }
}

/// Centre frequency of a note number
pub fn semitone_to_hz(n: u8) -> f64 {
    A4_HZ * 2f64.powf((n as f64 - A4_NOTE as f64) / 12.0)
}
