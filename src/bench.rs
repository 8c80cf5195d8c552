//! Bench runner - drives the control loop with simulated devices
//!
//! Polls are paced by a tokio interval on the current thread; the loop itself
//! never waits on any device.

use anyhow::Result;
use std::future::Future;
use std::time::Instant;
use tokio::time::MissedTickBehavior;
use tracing::info;

use crate::config::AppConfig;
use crate::control::{ControlLoop, Devices};
use crate::drivers::{ConsoleRenderer, LoggingShifter, ScriptedEncoder, ToneSequence};

/// The control loop wired to bench devices
pub type BenchLoop = ControlLoop<ScriptedEncoder, ToneSequence, LoggingShifter, ConsoleRenderer>;

/// Totals reported when a bench run ends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BenchSummary {
    pub polls: u64,
    pub detents: u64,
    pub ratio_pushes: u64,
    pub frequency_updates: u64,
    pub frames: u64,
    pub final_offset: i8,
}

/// Build a control loop from the configuration's bench section
pub fn build_bench_loop(config: &AppConfig) -> BenchLoop {
    let devices = Devices {
        encoder: ScriptedEncoder::new(&config.bench.detents, config.bench.step_every_polls),
        frequency: ToneSequence::new(config.bench.tones_hz.clone(), config.bench.tone_every_polls),
        shifter: LoggingShifter::new(),
        renderer: ConsoleRenderer::new(),
    };

    ControlLoop::new(devices)
        .with_layout(config.display.clone())
        .with_render_interval(config.control.render_interval())
        .with_reverse(config.encoder.reverse)
}

/// Run until `shutdown` resolves or `max_polls` iterations have run
pub async fn run_bench(
    config: &AppConfig,
    max_polls: Option<u64>,
    shutdown: impl Future<Output = ()>,
) -> Result<BenchSummary> {
    let mut control = build_bench_loop(config);
    control.start();

    let mut interval = tokio::time::interval(config.control.poll_interval());
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut summary = BenchSummary::default();
    tokio::pin!(shutdown);

    info!("Bench loop running (Ctrl-C to stop)");

    loop {
        if max_polls.is_some_and(|max| summary.polls >= max) {
            info!("Reached {} polls, stopping", summary.polls);
            break;
        }

        tokio::select! {
            _ = interval.tick() => {
                let report = control.tick(Instant::now());
                summary.polls += 1;
                summary.detents += report.detents as u64;
                summary.ratio_pushes += report.ratio_pushed as u64;
                summary.frequency_updates += report.frequency_updated as u64;
            }

            _ = &mut shutdown => {
                info!("Shutdown signal received, stopping bench loop");
                break;
            }
        }
    }

    summary.frames = control.devices().renderer.frames();
    summary.final_offset = control.state().pitch().offset();
    Ok(summary)
}
