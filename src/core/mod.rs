//! Core interpreter types.
//!
//! This module provides the fundamental building blocks:
//! - [`CommandEntry`] - A command or typed variable
//! - [`CommandRegistry`] - Lookup, registration and the execution pipeline
//! - [`tokenize`] - Command line tokenizer
//! - [`HostContext`] - Host predicates consulted by the access gates
//! - [`Console`] - System parameter for convenient access
//! - Messages for communication between host and registry

mod args;
mod console;
mod entry;
mod error;
mod events;
mod help;
mod permissions;
mod registry;
mod tokenizer;

pub use args::CommandArgs;
pub use console::{Console, ConsoleRef};
pub use entry::{
    ArgSpec, CommandEntry, CommandFlags, CommandKind, EntryValue, Numeric, UpdateHandler, VarNumber,
};
pub use error::{ExecuteError, SetVariableError};
pub use events::{ConsoleEventsPlugin, ConsoleInputEvent, ConsoleOutputEvent, ConsoleOutputLevel};
pub use help::generate_entry_help;
pub use permissions::{
    HostContext, HostState, check_hosting, check_internal, check_replicated, must_defer,
};
pub use registry::{CommandRegistry, EntryId, ExecuteOutcome, QUEUED_MESSAGE};
pub use tokenizer::{TokenizeError, TokenizedCommand, split_lines, tokenize, tokenize_string};
