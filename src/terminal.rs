//! Terminal backend for headless/dedicated server console.
//!
//! Lines read from stdin become user [`ConsoleInputEvent`]s and every
//! [`ConsoleOutputEvent`] is printed to stdout.

use std::io::{self, BufRead, Write};
use std::sync::Mutex;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use bevy::prelude::*;

use crate::core::{ConsoleInputEvent, ConsoleOutputEvent, ConsoleOutputLevel};

/// Plugin that adds terminal (stdin/stdout) console support.
pub struct TerminalPlugin;

impl Plugin for TerminalPlugin {
    fn build(&self, app: &mut App) {
        let (sender, receiver) = mpsc::channel();
        spawn_stdin_reader(sender);

        app.insert_resource(StdinReceiver(Mutex::new(receiver)))
            .init_resource::<TerminalConfig>()
            .add_systems(Update, (read_stdin, write_stdout));
    }
}

/// Configuration for terminal behavior.
#[derive(Resource, Debug, Clone, Default)]
pub struct TerminalConfig {
    /// Whether to use colored output (ANSI escape codes).
    pub colored: bool,
    /// Whether to print the `$ line` echo of each executed line.
    pub echo_commands: bool,
}

#[derive(Resource)]
struct StdinReceiver(Mutex<Receiver<String>>);

fn spawn_stdin_reader(sender: Sender<String>) {
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines().map_while(Result::ok) {
            let text = line.trim();
            if text.is_empty() {
                continue;
            }
            if sender.send(text.to_string()).is_err() {
                break;
            }
        }
        debug!("Console: stdin closed");
    });
}

fn read_stdin(receiver: Res<StdinReceiver>, mut events: MessageWriter<ConsoleInputEvent>) {
    let Ok(rx) = receiver.0.lock() else {
        warn!("Console: stdin receiver poisoned");
        return;
    };
    while let Ok(line) = rx.try_recv() {
        events.write(ConsoleInputEvent::new(line));
    }
}

fn write_stdout(mut events: MessageReader<ConsoleOutputEvent>, config: Res<TerminalConfig>) {
    let mut stdout = io::stdout().lock();
    for event in events.read() {
        if event.level == ConsoleOutputLevel::Command && !config.echo_commands {
            continue;
        }
        // Multi-line results (help, writeconfig) already end in a newline
        let text = event.message.trim_end_matches('\n');
        let _ = writeln!(stdout, "{}", format_line(text, event.level, config.colored));
    }
    let _ = stdout.flush();
}

/// Render one output line, wrapping it in an ANSI color when enabled.
fn format_line(message: &str, level: ConsoleOutputLevel, colored: bool) -> String {
    if !colored {
        return message.to_string();
    }
    let color = match level {
        ConsoleOutputLevel::Info => "\x1b[33m",
        ConsoleOutputLevel::Error => "\x1b[31m",
        ConsoleOutputLevel::Command => "\x1b[36m",
        ConsoleOutputLevel::Result => "\x1b[0m",
    };
    format!("{}{}\x1b[0m", color, message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_line_plain() {
        assert_eq!(format_line("2 -> 4", ConsoleOutputLevel::Result, false), "2 -> 4");
    }

    #[test]
    fn test_format_line_colored() {
        assert_eq!(
            format_line("Invalid value", ConsoleOutputLevel::Error, true),
            "\x1b[31mInvalid value\x1b[0m"
        );
    }
}
