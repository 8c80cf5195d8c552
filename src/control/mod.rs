//! Control loop - sense, update, render
//!
//! One thread advances everything. Each tick runs, in this order:
//! 1. encoder: sample pins, decode, apply detents, push the ratio if it changed
//! 2. frequency: if the estimator has a reading, map it (or invalidate it)
//! 3. render: if the render interval has elapsed, rebuild and present the frame
//!
//! The state lives in [`ControllerState`] and is only touched through the three
//! update functions below, which makes every step testable without hardware.

use std::time::{Duration, Instant};
use tracing::{debug, info, trace, warn};

use crate::display::{DisplayLayout, DisplayModel, NoteModel};
use crate::drivers::{EncoderPins, FrequencySource, PitchShifter, TextRenderer};
use crate::encoder::{EncoderSample, QuadratureDecoder};
use crate::notes;
use crate::pitch::PitchState;

#[cfg(test)]
mod tests;

/// Default minimum time between rendered frames
pub const DEFAULT_RENDER_INTERVAL: Duration = Duration::from_millis(120);

/// Last valid frequency reading and the note it maps to
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrequencyObservation {
    pub hz: f32,
    pub semitone: u8,
}

/// Everything the loop mutates
#[derive(Debug, Clone)]
pub struct ControllerState {
    decoder: QuadratureDecoder,
    pitch: PitchState,
    observation: Option<FrequencyObservation>,
    last_render: Option<Instant>,
    reverse: bool,
}

impl ControllerState {
    pub fn new() -> Self {
        Self {
            decoder: QuadratureDecoder::new(),
            pitch: PitchState::new(),
            observation: None,
            last_render: None,
            reverse: false,
        }
    }

    /// Flip the sign of every detent
    pub fn with_reverse(mut self, reverse: bool) -> Self {
        self.reverse = reverse;
        self
    }

    /// Decode one encoder sample and apply every detent it completes
    ///
    /// Returns the number of detents decoded (including ones dropped at the
    /// range limit) and whether the offset actually moved.
    pub fn update_encoder(&mut self, sample: EncoderSample) -> EncoderUpdate {
        let before = self.pitch.offset();
        let mut detents = 0;

        for direction in self.decoder.poll(sample) {
            let direction = if self.reverse {
                direction.reversed()
            } else {
                direction
            };
            let offset = self.pitch.apply_detent(direction);
            detents += 1;
            trace!(?direction, offset, "detent");
        }

        EncoderUpdate {
            detents,
            offset_changed: self.pitch.offset() != before,
        }
    }

    /// Replace the retained observation with this reading, or clear it when
    /// the reading is not a usable frequency
    pub fn update_frequency(&mut self, hz: f32) -> Option<FrequencyObservation> {
        self.observation = notes::frequency_to_nearest_semitone(hz)
            .map(|semitone| FrequencyObservation { hz, semitone });

        if self.observation.is_none() {
            debug!(hz, "Invalid frequency estimate, input unknown");
        }
        self.observation
    }

    /// Build a frame if at least `interval` has passed since the last one
    pub fn update_render(
        &mut self,
        now: Instant,
        interval: Duration,
        layout: &DisplayLayout,
    ) -> Option<DisplayModel> {
        if let Some(last) = self.last_render {
            if now.saturating_duration_since(last) < interval {
                return None;
            }
        }
        self.last_render = Some(now);
        Some(self.display_model(layout))
    }

    pub fn decoder(&self) -> &QuadratureDecoder {
        &self.decoder
    }

    pub fn pitch(&self) -> &PitchState {
        &self.pitch
    }

    /// Last valid reading, `None` while the input is unknown
    pub fn observation(&self) -> Option<FrequencyObservation> {
        self.observation
    }

    pub fn last_render(&self) -> Option<Instant> {
        self.last_render
    }

    /// Current note model (input note plus shifted output note)
    pub fn note_model(&self) -> NoteModel {
        NoteModel::derive(
            self.observation.map(|o| (o.hz, o.semitone)),
            &self.pitch,
        )
    }

    /// Frame for the current state, regardless of cadence
    pub fn display_model(&self, layout: &DisplayLayout) -> DisplayModel {
        DisplayModel::build(&self.pitch, &self.note_model(), layout)
    }
}

impl Default for ControllerState {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of [`ControllerState::update_encoder`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EncoderUpdate {
    pub detents: u32,
    pub offset_changed: bool,
}

/// What one tick did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickReport {
    pub detents: u32,
    pub ratio_pushed: bool,
    pub frequency_updated: bool,
    pub rendered: bool,
}

/// The collaborators a control loop drives
pub struct Devices<E, F, P, R> {
    pub encoder: E,
    pub frequency: F,
    pub shifter: P,
    pub renderer: R,
}

/// Single-threaded scheduler owning the state and the devices
pub struct ControlLoop<E, F, P, R> {
    state: ControllerState,
    devices: Devices<E, F, P, R>,
    layout: DisplayLayout,
    render_interval: Duration,
}

impl<E, F, P, R> ControlLoop<E, F, P, R>
where
    E: EncoderPins,
    F: FrequencySource,
    P: PitchShifter,
    R: TextRenderer,
{
    pub fn new(devices: Devices<E, F, P, R>) -> Self {
        Self {
            state: ControllerState::new(),
            devices,
            layout: DisplayLayout::default(),
            render_interval: DEFAULT_RENDER_INTERVAL,
        }
    }

    pub fn with_layout(mut self, layout: DisplayLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_render_interval(mut self, interval: Duration) -> Self {
        self.render_interval = interval;
        self
    }

    pub fn with_reverse(mut self, reverse: bool) -> Self {
        self.state = self.state.with_reverse(reverse);
        self
    }

    /// Seed the decoder with the resting pin state and put the engine at the
    /// current ratio
    pub fn start(&mut self) {
        let initial = self.devices.encoder.rest();
        self.state.decoder = QuadratureDecoder::with_initial(initial);
        self.push_ratio();
        info!(
            offset = self.state.pitch.offset(),
            render_interval_ms = self.render_interval.as_millis() as u64,
            "Control loop started"
        );
    }

    /// Run one sense → update → render iteration
    pub fn tick(&mut self, now: Instant) -> TickReport {
        let mut report = TickReport::default();

        // 1. encoder
        let sample = self.devices.encoder.read();
        let update = self.state.update_encoder(sample);
        report.detents = update.detents;
        if update.offset_changed {
            self.push_ratio();
            report.ratio_pushed = true;
        }

        // 2. frequency
        if let Some(hz) = self.devices.frequency.poll() {
            self.state.update_frequency(hz);
            report.frequency_updated = true;
        }

        // 3. render
        if let Some(frame) = self
            .state
            .update_render(now, self.render_interval, &self.layout)
        {
            self.present(&frame);
            report.rendered = true;
        }

        report
    }

    fn push_ratio(&mut self) {
        let ratio = self.state.pitch.ratio();
        debug!(offset = self.state.pitch.offset(), ratio, "Pushing pitch ratio");
        if let Err(e) = self.devices.shifter.set_pitch_ratio(ratio) {
            warn!("Failed to set pitch ratio {:.4}: {}", ratio, e);
        }
    }

    fn present(&mut self, frame: &DisplayModel) {
        debug!(frame = %frame, "Presenting frame");
        for line in frame.lines() {
            if let Err(e) = self.devices.renderer.draw_text(line) {
                warn!("Failed to draw '{}': {}", line.text, e);
            }
        }
        if let Err(e) = self.devices.renderer.present() {
            warn!("Failed to present frame: {}", e);
        }
    }

    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    pub fn devices(&self) -> &Devices<E, F, P, R> {
        &self.devices
    }

    pub fn devices_mut(&mut self) -> &mut Devices<E, F, P, R> {
        &mut self.devices
    }

    pub fn layout(&self) -> &DisplayLayout {
        &self.layout
    }
}
