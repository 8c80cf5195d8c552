//! Simulated inputs for bench runs and the interactive REPL
//!
//! Encoder drivers emit proper Gray-code sequences (four edges per detent),
//! one sample per read, so the real decoder path is exercised.

use std::collections::VecDeque;

use super::{EncoderPins, FrequencySource};
use crate::encoder::{detent_sequence, Direction, EncoderSample};

/// Samples for `count` detents; the sign of `count` picks the direction
fn samples_for(count: i32) -> impl Iterator<Item = EncoderSample> {
    let direction = if count >= 0 {
        Direction::Up
    } else {
        Direction::Down
    };
    (0..count.unsigned_abs()).flat_map(move |_| detent_sequence(direction))
}

/// Encoder that plays back a fixed script of turns
#[derive(Debug, Clone)]
pub struct ScriptedEncoder {
    samples: VecDeque<EncoderSample>,
    current: EncoderSample,
    step_every: u32,
    reads: u64,
}

impl ScriptedEncoder {
    /// `detents` are signed turn counts played in order; one sample advances
    /// every `step_every` reads
    pub fn new(detents: &[i32], step_every: u32) -> Self {
        Self {
            samples: detents.iter().flat_map(|&n| samples_for(n)).collect(),
            current: EncoderSample::IDLE,
            step_every: step_every.max(1),
            reads: 0,
        }
    }

    /// Whether every scripted sample has been read
    pub fn is_finished(&self) -> bool {
        self.samples.is_empty()
    }
}

impl EncoderPins for ScriptedEncoder {
    fn read(&mut self) -> EncoderSample {
        self.reads += 1;
        if self.reads % self.step_every as u64 == 0 {
            if let Some(next) = self.samples.pop_front() {
                self.current = next;
            }
        }
        self.current
    }

    fn rest(&mut self) -> EncoderSample {
        self.current
    }
}

/// Estimator that reports readings from a list, cycling forever
#[derive(Debug, Clone)]
pub struct ToneSequence {
    tones: Vec<f32>,
    every: u32,
    polls: u64,
    next: usize,
}

impl ToneSequence {
    /// A new reading becomes ready every `every` readiness checks
    pub fn new(tones: Vec<f32>, every: u32) -> Self {
        Self {
            tones,
            every: every.max(1),
            polls: 0,
            next: 0,
        }
    }
}

impl FrequencySource for ToneSequence {
    fn is_ready(&mut self) -> bool {
        if self.tones.is_empty() {
            return false;
        }
        self.polls += 1;
        self.polls % self.every as u64 == 0
    }

    fn read_hz(&mut self) -> f32 {
        let Some(&hz) = self.tones.get(self.next) else {
            return f32::NAN;
        };
        self.next = (self.next + 1) % self.tones.len();
        hz
    }
}

/// Encoder driven by hand, one queued sample per read
#[derive(Debug, Clone, Default)]
pub struct ManualEncoder {
    queue: VecDeque<EncoderSample>,
    current: EncoderSample,
}

impl ManualEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `count` detents (negative turns down)
    pub fn turn(&mut self, count: i32) {
        self.queue.extend(samples_for(count));
    }

    /// Samples still to be read
    pub fn pending(&self) -> usize {
        self.queue.len()
    }
}

impl EncoderPins for ManualEncoder {
    fn read(&mut self) -> EncoderSample {
        if let Some(next) = self.queue.pop_front() {
            self.current = next;
        }
        self.current
    }

    fn rest(&mut self) -> EncoderSample {
        self.current
    }
}

/// Estimator driven by hand: each pushed reading is reported once
#[derive(Debug, Clone, Default)]
pub struct ManualFrequency {
    pending: Option<f32>,
}

impl ManualFrequency {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, hz: f32) {
        self.pending = Some(hz);
    }
}

impl FrequencySource for ManualFrequency {
    fn is_ready(&mut self) -> bool {
        self.pending.is_some()
    }

    fn read_hz(&mut self) -> f32 {
        self.pending.take().unwrap_or(f32::NAN)
    }
}
