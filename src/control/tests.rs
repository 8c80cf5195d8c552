//! Tests for the control loop

use super::*;
use crate::display::{UNKNOWN_INPUT, UNKNOWN_NOTE};
use crate::drivers::{ConsoleRenderer, LoggingShifter, ManualEncoder, ManualFrequency};
use crate::encoder::{detent_sequence, Direction};
use anyhow::Result;

type BenchLoop = ControlLoop<ManualEncoder, ManualFrequency, LoggingShifter, ConsoleRenderer>;

fn make_test_loop() -> BenchLoop {
    let mut control = ControlLoop::new(Devices {
        encoder: ManualEncoder::new(),
        frequency: ManualFrequency::new(),
        shifter: LoggingShifter::new(),
        renderer: ConsoleRenderer::new(),
    });
    control.start();
    control
}

/// Tick until every queued encoder sample has been read
fn drain(control: &mut BenchLoop, now: Instant) -> u32 {
    let mut detents = 0;
    while control.devices().encoder.pending() > 0 {
        detents += control.tick(now).detents;
    }
    detents
}

fn frame_text(control: &BenchLoop) -> Vec<String> {
    control
        .devices()
        .renderer
        .last_frame()
        .iter()
        .map(|l| l.text.clone())
        .collect()
}

#[test]
fn test_start_pushes_unity_ratio() {
    let control = make_test_loop();
    assert_eq!(control.devices().shifter.history(), &[1.0]);
}

#[test]
fn test_ratio_pushed_only_on_change() {
    let mut control = make_test_loop();
    let t0 = Instant::now();

    for _ in 0..20 {
        control.tick(t0);
    }
    assert_eq!(control.devices().shifter.history().len(), 1);

    control.devices_mut().encoder.turn(2);
    assert_eq!(drain(&mut control, t0), 2);
    assert_eq!(control.state().pitch().offset(), 2);

    let history = control.devices().shifter.history();
    assert_eq!(history.len(), 3);
    assert!((history[2] - 2f32.powf(2.0 / 12.0)).abs() < 1e-6);
}

#[test]
fn test_saturated_detents_do_not_push() {
    let mut control = make_test_loop();
    let t0 = Instant::now();

    control.devices_mut().encoder.turn(30);
    assert_eq!(drain(&mut control, t0), 30);
    assert_eq!(control.state().pitch().offset(), 12);

    // one push at start plus twelve real changes
    let history = control.devices().shifter.history();
    assert_eq!(history.len(), 13);
    assert!((history[12] - 2.0).abs() < 1e-6);
}

#[test]
fn test_reverse_flips_direction() {
    let mut control = make_test_loop().with_reverse(true);
    control.devices_mut().encoder.turn(3);
    drain(&mut control, Instant::now());
    assert_eq!(control.state().pitch().offset(), -3);
}

#[test]
fn test_invalid_frequency_clears_input() {
    let mut control = make_test_loop();
    let t0 = Instant::now();

    control.devices_mut().frequency.push(440.0);
    let report = control.tick(t0);
    assert!(report.frequency_updated);
    assert!(report.rendered);
    assert_eq!(frame_text(&control), vec!["440.0 Hz A4", "0", "A4"]);

    control.devices_mut().frequency.push(f32::NAN);
    control.tick(t0 + Duration::from_millis(200));
    assert_eq!(control.state().observation(), None);
    assert_eq!(frame_text(&control), vec![UNKNOWN_INPUT, "0", UNKNOWN_NOTE]);
}

#[test]
fn test_no_new_reading_keeps_last_good_value() {
    let mut control = make_test_loop();
    let t0 = Instant::now();

    control.devices_mut().frequency.push(261.63);
    control.tick(t0);
    let report = control.tick(t0 + Duration::from_millis(500));
    assert!(!report.frequency_updated);
    assert_eq!(
        control.state().observation().map(|o| o.semitone),
        Some(60)
    );
}

#[test]
fn test_render_cadence() {
    let mut control = make_test_loop();
    let t0 = Instant::now();

    // (elapsed ms, expected render)
    let schedule = [
        (0, true),
        (1, false),
        (60, false),
        (119, false),
        (120, true),
        (121, false),
        (200, false),
        (240, true),
        (1000, true),
        (1119, false),
        (1120, true),
    ];

    for (ms, expected) in schedule {
        let report = control.tick(t0 + Duration::from_millis(ms));
        assert_eq!(report.rendered, expected, "at {}ms", ms);
    }
    assert_eq!(control.devices().renderer.frames(), 5);
}

#[test]
fn test_updates_between_renders_are_not_rendered() {
    let mut control = make_test_loop();
    let t0 = Instant::now();
    control.tick(t0);

    control.devices_mut().encoder.turn(1);
    drain(&mut control, t0 + Duration::from_millis(10));
    control.devices_mut().frequency.push(440.0);
    control.tick(t0 + Duration::from_millis(20));

    assert_eq!(control.devices().renderer.frames(), 1);
    assert_eq!(frame_text(&control), vec![UNKNOWN_INPUT, "0", UNKNOWN_NOTE]);

    control.tick(t0 + Duration::from_millis(130));
    assert_eq!(control.devices().renderer.frames(), 2);
    assert_eq!(frame_text(&control), vec!["440.0 Hz A4", "+1", "A#4"]);
}

#[test]
fn test_render_sees_same_tick_updates() {
    let mut control = make_test_loop();
    let t0 = Instant::now();

    // the last sample of the detent and the reading land on a render tick
    control.devices_mut().encoder.turn(-1);
    for _ in 0..3 {
        control.tick(t0);
    }
    control.devices_mut().frequency.push(440.0);
    let report = control.tick(t0 + Duration::from_millis(150));

    assert_eq!(report.detents, 1);
    assert!(report.ratio_pushed);
    assert!(report.frequency_updated);
    assert!(report.rendered);
    assert_eq!(frame_text(&control), vec!["440.0 Hz A4", "-1", "G#4"]);
}

#[test]
fn test_output_note_clamps_high() {
    let mut state = ControllerState::new();
    for _ in 0..12 {
        for sample in detent_sequence(Direction::Up) {
            state.update_encoder(sample);
        }
    }
    assert_eq!(state.pitch().offset(), 12);
    state.update_frequency(10_000.0);
    let model = state.note_model();
    assert_eq!(model.output.map(|n| n.to_string()), Some("G9".to_string()));
}

#[test]
fn test_state_update_encoder_counts_detents() {
    let mut state = ControllerState::new();
    let mut total = EncoderUpdate::default();
    for sample in detent_sequence(Direction::Up) {
        let update = state.update_encoder(sample);
        total.detents += update.detents;
        total.offset_changed |= update.offset_changed;
    }
    assert_eq!(total.detents, 1);
    assert!(total.offset_changed);
    assert_eq!(state.decoder().accumulator(), 0);
}

struct FailingShifter;

impl PitchShifter for FailingShifter {
    fn set_pitch_ratio(&mut self, _ratio: f32) -> Result<()> {
        anyhow::bail!("engine offline")
    }
}

#[test]
fn test_driver_errors_do_not_stop_loop() {
    let mut control = ControlLoop::new(Devices {
        encoder: ManualEncoder::new(),
        frequency: ManualFrequency::new(),
        shifter: FailingShifter,
        renderer: ConsoleRenderer::new(),
    });
    control.start();

    control.devices_mut().encoder.turn(1);
    while control.devices().encoder.pending() > 0 {
        control.tick(Instant::now());
    }
    assert_eq!(control.state().pitch().offset(), 1);
    assert!(control.devices().renderer.frames() >= 1);
}
