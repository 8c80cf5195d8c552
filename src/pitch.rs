//! Semitone offset selected with the encoder

use crate::encoder::Direction;

/// Lowest selectable shift (one octave down)
pub const MIN_SEMITONES: i8 = -12;
/// Highest selectable shift (one octave up)
pub const MAX_SEMITONES: i8 = 12;

/// Current pitch shift, always within [`MIN_SEMITONES`, `MAX_SEMITONES`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PitchState {
    offset: i8,
}

impl PitchState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start at a given offset, clamped into range
    pub fn with_offset(offset: i8) -> Self {
        Self {
            offset: offset.clamp(MIN_SEMITONES, MAX_SEMITONES),
        }
    }

    /// Move one semitone in `direction`; a step past either bound is dropped
    pub fn apply_detent(&mut self, direction: Direction) -> i8 {
        let next = match direction {
            Direction::Up => self.offset.saturating_add(1),
            Direction::Down => self.offset.saturating_sub(1),
        };
        if (MIN_SEMITONES..=MAX_SEMITONES).contains(&next) {
            self.offset = next;
        }
        self.offset
    }

    pub fn offset(&self) -> i8 {
        self.offset
    }

    /// Frequency multiplier for the shift engine, `2^(offset/12)`
    pub fn ratio(&self) -> f32 {
        semitones_to_ratio(self.offset)
    }
}

/// Equal-tempered ratio for a semitone count
pub fn semitones_to_ratio(semitones: i8) -> f32 {
    2f64.powf(semitones as f64 / 12.0) as f32
}
