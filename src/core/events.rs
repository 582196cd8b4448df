//! Console messages for communication between the host and the registry.
//!
//! - Host -> Core: command input
//! - Core -> Host: result and error text

use bevy::prelude::*;

/// Message sent when a command line is submitted to the console.
///
/// # Examples
///
/// ```ignore
/// fn submit_command(mut input: MessageWriter<ConsoleInputEvent>) {
///     input.write(ConsoleInputEvent::new("sv_count 4"));
/// }
/// ```
#[derive(Message, Debug, Clone)]
pub struct ConsoleInputEvent {
    /// The raw command line to execute.
    pub command: String,
    /// Whether the line came from a user. Internal entries are invisible to user input.
    pub user_input: bool,
}

impl ConsoleInputEvent {
    /// Input typed by a user.
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            user_input: true,
        }
    }

    /// Input from trusted host code, allowed to reach internal entries.
    pub fn internal(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            user_input: false,
        }
    }
}

/// Message sent when output should be displayed in the console.
#[derive(Message, Debug, Clone)]
pub struct ConsoleOutputEvent {
    /// The message text.
    pub message: String,
    /// The kind of output.
    pub level: ConsoleOutputLevel,
}

/// Kind of console output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConsoleOutputLevel {
    /// General information, such as a deferral notice.
    #[default]
    Info,
    /// A failed invocation.
    Error,
    /// Echo of the line that was executed.
    Command,
    /// Result text of a successful invocation.
    Result,
}

impl ConsoleOutputEvent {
    /// Create a new output message.
    pub fn new(level: ConsoleOutputLevel, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level,
        }
    }

    /// Create an info message.
    pub fn info(message: impl Into<String>) -> Self {
        Self::new(ConsoleOutputLevel::Info, message)
    }

    /// Create an error message.
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(ConsoleOutputLevel::Error, message)
    }

    /// Create a command echo message.
    pub fn command(message: impl Into<String>) -> Self {
        Self::new(ConsoleOutputLevel::Command, message)
    }

    /// Create a result message.
    pub fn result(message: impl Into<String>) -> Self {
        Self::new(ConsoleOutputLevel::Result, message)
    }
}

/// Plugin that registers all console messages.
pub struct ConsoleEventsPlugin;

impl Plugin for ConsoleEventsPlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<ConsoleInputEvent>()
            .add_message::<ConsoleOutputEvent>();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_console_input_event() {
        let event = ConsoleInputEvent::new("sv_count 4");
        assert_eq!(event.command, "sv_count 4");
        assert!(event.user_input);
        assert!(!ConsoleInputEvent::internal("sv_count 4").user_input);
    }

    #[test]
    fn test_console_output_event() {
        let event = ConsoleOutputEvent::error("Invalid value");
        assert_eq!(event.level, ConsoleOutputLevel::Error);
        assert_eq!(event.message, "Invalid value");
    }
}
