//! Error types for execution and variable writes.
//!
//! Every failure is recoverable and reported as data; the `Display` text is
//! what the console shows the user.

/// Why a variable write was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetVariableError {
    /// No variable with that name (actions count as missing).
    NotFound,
    /// The text could not be coerced into the variable's type.
    InvalidArgument,
    /// The parsed value lies outside the declared inclusive bounds.
    OutOfRange { min: String, max: String },
}

impl std::fmt::Display for SetVariableError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SetVariableError::NotFound => write!(f, "variable not found"),
            SetVariableError::InvalidArgument => write!(f, "invalid value"),
            SetVariableError::OutOfRange { min, max } => {
                write!(f, "value out of range [{}..{}]", min, max)
            }
        }
    }
}

impl std::error::Error for SetVariableError {}

/// Why an invocation failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecuteError {
    /// The line held no tokens.
    InvalidInput,
    /// Unknown name, or an internal entry reached from user input.
    NotFound,
    /// The entry needs the caller to host the session.
    MustBeHosting,
    /// The entry needs the caller to host or be in the lobby.
    MustBeLobbyOrHosting,
    /// The value could not be coerced into the variable's type.
    InvalidArgument,
    /// The value lies outside the variable's bounds.
    OutOfRange { value: String, min: String, max: String },
    /// The update handler refused the change; the value was reverted.
    HandlerRejected { message: String },
}

impl ExecuteError {
    /// Map a failed write of `value` to the pipeline error.
    pub(crate) fn from_set(err: SetVariableError, value: &str) -> Self {
        match err {
            SetVariableError::NotFound => ExecuteError::NotFound,
            SetVariableError::InvalidArgument => ExecuteError::InvalidArgument,
            SetVariableError::OutOfRange { min, max } => ExecuteError::OutOfRange {
                value: value.to_string(),
                min,
                max,
            },
        }
    }
}

impl std::fmt::Display for ExecuteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExecuteError::InvalidInput => write!(f, "Invalid input"),
            ExecuteError::NotFound => write!(f, "Command/Variable not found"),
            ExecuteError::MustBeHosting => {
                write!(f, "Only a player hosting a game can use this command")
            }
            ExecuteError::MustBeLobbyOrHosting => {
                write!(f, "You must be at the lobby or hosting a game to use this command")
            }
            ExecuteError::InvalidArgument => write!(f, "Invalid value"),
            ExecuteError::OutOfRange { value, min, max } => {
                write!(f, "Value {} out of range [{}..{}]", value, min, max)
            }
            ExecuteError::HandlerRejected { message } => write!(f, "{}", message),
        }
    }
}

impl std::error::Error for ExecuteError {}
