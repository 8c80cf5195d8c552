//! Display model: the three text lines handed to the renderer
//!
//! Layout is data only. The renderer decides glyphs and pixels.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::notes::{self, NoteName};
use crate::pitch::PitchState;

/// Placeholder shown on the top line when no valid estimate is retained
pub const UNKNOWN_INPUT: &str = "--- Hz --";
/// Placeholder shown on the bottom line when the input is unknown
pub const UNKNOWN_NOTE: &str = "--";

/// Where and how big one line is drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct LineLayout {
    pub y: i32,
    pub scale: u8,
}

/// Positions for the three lines
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct DisplayLayout {
    #[serde(default = "default_top")]
    pub top: LineLayout,
    #[serde(default = "default_middle")]
    pub middle: LineLayout,
    #[serde(default = "default_bottom")]
    pub bottom: LineLayout,
}

impl Default for DisplayLayout {
    fn default() -> Self {
        Self {
            top: default_top(),
            middle: default_middle(),
            bottom: default_bottom(),
        }
    }
}

/// One draw request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayLine {
    pub text: String,
    pub y: i32,
    pub scale: u8,
}

impl DisplayLine {
    fn new(text: String, layout: LineLayout) -> Self {
        Self {
            text,
            y: layout.y,
            scale: layout.scale,
        }
    }
}

/// Detected input note with the frequency it was read from
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InputNote {
    pub name: NoteName,
    pub hz: f32,
}

/// Input and output notes for one frame; rebuilt every render, never patched
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NoteModel {
    pub input: Option<InputNote>,
    pub output: Option<NoteName>,
}

impl NoteModel {
    /// Derive from the retained estimate (if any) and the current shift
    pub fn derive(observation: Option<(f32, u8)>, pitch: &PitchState) -> Self {
        match observation {
            Some((hz, semitone)) => Self {
                input: Some(InputNote {
                    name: notes::output_note(semitone, 0),
                    hz,
                }),
                output: Some(notes::output_note(semitone, pitch.offset())),
            },
            None => Self::default(),
        }
    }
}

/// The full frame: top (input), middle (shift), bottom (output)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayModel {
    pub top: DisplayLine,
    pub middle: DisplayLine,
    pub bottom: DisplayLine,
}

impl DisplayModel {
    pub fn build(pitch: &PitchState, notes: &NoteModel, layout: &DisplayLayout) -> Self {
        let top = match notes.input {
            Some(input) => format!("{:.1} Hz {}", input.hz, input.name),
            None => UNKNOWN_INPUT.to_string(),
        };
        let bottom = match notes.output {
            Some(name) => name.to_string(),
            None => UNKNOWN_NOTE.to_string(),
        };

        Self {
            top: DisplayLine::new(top, layout.top),
            middle: DisplayLine::new(format_shift(pitch.offset()), layout.middle),
            bottom: DisplayLine::new(bottom, layout.bottom),
        }
    }

    /// Lines in draw order
    pub fn lines(&self) -> [&DisplayLine; 3] {
        [&self.top, &self.middle, &self.bottom]
    }
}

impl fmt::Display for DisplayModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] [{}] [{}]",
            self.top.text, self.middle.text, self.bottom.text
        )
    }
}

/// Signed shift label: `+3`, `0`, `-5`
pub fn format_shift(offset: i8) -> String {
    if offset > 0 {
        format!("+{}", offset)
    } else {
        offset.to_string()
    }
}

fn default_top() -> LineLayout { LineLayout { y: 0, scale: 1 } }
fn default_middle() -> LineLayout { LineLayout { y: 16, scale: 3 } }
fn default_bottom() -> LineLayout { LineLayout { y: 48, scale: 2 } }
