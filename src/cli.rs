//! Command-line tools: interactive REPL, note table and frequency lookup

use anyhow::Result;
use colored::*;
use rustyline::DefaultEditor;
use std::time::Instant;
use tracing::debug;

use crate::config::AppConfig;
use crate::control::{ControlLoop, Devices};
use crate::drivers::{ConsoleRenderer, LoggingShifter, ManualEncoder, ManualFrequency};
use crate::notes::{self, MAX_NOTE};

type ReplLoop = ControlLoop<ManualEncoder, ManualFrequency, LoggingShifter, ConsoleRenderer>;

/// A parsed REPL line
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Turn(i32),
    Frequency(f32),
    Show,
    Help,
    Quit,
}

impl Command {
    pub fn parse(line: &str) -> Result<Option<Self>> {
        let mut words = line.split_whitespace();
        let Some(head) = words.next() else {
            return Ok(None);
        };
        let arg = words.next();

        let count = |arg: Option<&str>| -> Result<i32> {
            Ok(arg.map(str::parse::<i32>).transpose()?.unwrap_or(1))
        };

        let command = match head {
            "up" | "u" | "+" => Command::Turn(count(arg)?),
            "down" | "d" | "-" => Command::Turn(-count(arg)?),
            "hz" | "f" => {
                let Some(value) = arg else {
                    anyhow::bail!("usage: hz <frequency>");
                };
                Command::Frequency(value.parse()?)
            }
            "nan" => Command::Frequency(f32::NAN),
            "show" | "s" => Command::Show,
            "help" | "h" | "?" => Command::Help,
            "exit" | "quit" | "q" => Command::Quit,
            other => anyhow::bail!("unknown command '{}'", other),
        };
        Ok(Some(command))
    }
}

fn print_help() {
    println!("  {}     turn the encoder up n detents", "up [n]".yellow());
    println!("  {}   turn the encoder down n detents", "down [n]".yellow());
    println!("  {}   feed a frequency estimate", "hz <f>".yellow());
    println!("  {}        feed an invalid estimate", "nan".yellow());
    println!("  {}       print the current frame", "show".yellow());
    println!("  {}       leave", "quit".yellow());
}

fn print_frame(control: &ReplLoop) {
    let frame = control.state().display_model(control.layout());
    for line in frame.lines() {
        println!("  {:>3} x{} │ {}", line.y, line.scale, line.text.bright_white());
    }
}

/// Apply one command to the loop; returns false when the REPL should stop
fn apply(control: &mut ReplLoop, command: Command) -> bool {
    match command {
        Command::Turn(n) => {
            control.devices_mut().encoder.turn(n);
            while control.devices().encoder.pending() > 0 {
                control.tick(Instant::now());
            }
            print_frame(control);
        }
        Command::Frequency(hz) => {
            control.devices_mut().frequency.push(hz);
            control.tick(Instant::now());
            print_frame(control);
        }
        Command::Show => print_frame(control),
        Command::Help => print_help(),
        Command::Quit => return false,
    }
    true
}

pub fn run_repl(config: &AppConfig) -> Result<()> {
    let mut rl = DefaultEditor::new()?;

    let mut control = ControlLoop::new(Devices {
        encoder: ManualEncoder::new(),
        frequency: ManualFrequency::new(),
        shifter: LoggingShifter::new(),
        renderer: ConsoleRenderer::new(),
    })
    .with_layout(config.display.clone())
    .with_render_interval(config.control.render_interval())
    .with_reverse(config.encoder.reverse);
    control.start();

    println!("{}", "=== Pitch controller bench ===".bold().cyan());
    print_help();

    loop {
        let readline = rl.readline("pitch> ");
        match readline {
            Ok(line) => {
                if let Err(e) = rl.add_history_entry(line.as_str()) {
                    debug!("Failed to record REPL history: {}", e);
                }
                match Command::parse(&line) {
                    Ok(Some(command)) => {
                        if !apply(&mut control, command) {
                            break;
                        }
                    }
                    Ok(None) => {}
                    Err(e) => println!("{} {}", "error:".red(), e),
                }
            }
            Err(_) => break,
        }
    }

    Ok(())
}

/// Print every note number with its name and centre frequency
pub fn print_note_table() {
    println!("\n{}", "=== Note Table (A4 = 440 Hz) ===".bold().cyan());
    for n in 0..=MAX_NOTE {
        let name = match notes::semitone_to_name(n as i32) {
            Ok(name) => name.to_string(),
            Err(e) => e.to_string(),
        };
        let row = format!("{:>3}  {:<4} {:>10.3} Hz", n, name, notes::semitone_to_hz(n));
        if n == notes::A4_NOTE {
            println!("  {}", row.green().bold());
        } else {
            println!("  {}", row);
        }
    }
}

/// Print the nearest note for each frequency
pub fn print_conversions(frequencies: &[f32]) {
    for &hz in frequencies {
        match notes::frequency_to_nearest_semitone(hz) {
            Some(n) => println!(
                "  {:>10} Hz → {} ({})",
                hz,
                notes::output_note(n, 0).to_string().green(),
                n
            ),
            None => println!("  {:>10} Hz → {}", hz, "unknown".red()),
        }
    }
}
