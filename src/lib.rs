//! A command and variable interpreter for game consoles.
//!
//! dorito_console provides:
//!
//! - **CommandEntry**: Actions and typed variables (string, int, int64, float) with
//!   bounds, flags and update handlers that can veto a change
//! - **CommandRegistry**: Case-insensitive lookup, access gates, the text and
//!   status pipelines, batch execution and a queue of lines deferred until the
//!   main menu shows
//! - **Console**: Unified system parameter for convenient access
//!
//! # Features
//!
//! - `terminal`: stdin/stdout backend for dedicated servers
//!
//! # Quick Start
//!
//! ```ignore
//! use bevy::prelude::*;
//! use dorito_console::prelude::*;
//!
//! fn main() {
//!     App::new()
//!         .add_plugins(DefaultPlugins)
//!         .add_plugins(ConsolePlugin)
//!         .add_systems(Startup, setup_console)
//!         .run();
//! }
//!
//! fn setup_console(mut console: Console) {
//!     // Register a variable
//!     console.add(CommandEntry::float_var("Camera.Fov", 90.0)
//!         .module("Camera")
//!         .description("Field of view")
//!         .range(60.0f32, 120.0)
//!         .flags(CommandFlags::ARCHIVED));
//!
//!     // Register a command
//!     console.add(CommandEntry::action("Game.Start", |_, out| {
//!         *out = "Starting".to_string();
//!         true
//!     }).description("Start the game"));
//!
//!     console.execute("Camera.Fov 100");
//! }
//! ```

use bevy::prelude::*;

pub mod core;

pub use core::{
    ArgSpec, CommandArgs, CommandEntry, CommandFlags, CommandKind, CommandRegistry, Console,
    ConsoleEventsPlugin, ConsoleInputEvent, ConsoleOutputEvent, ConsoleOutputLevel, ConsoleRef,
    EntryId, EntryValue, ExecuteError, ExecuteOutcome, HostContext, HostState, Numeric,
    QUEUED_MESSAGE, SetVariableError, TokenizeError, TokenizedCommand, UpdateHandler, VarNumber,
    generate_entry_help, split_lines, tokenize, tokenize_string,
};

// Terminal backend (feature-gated)
#[cfg(feature = "terminal")]
pub mod terminal;

#[cfg(feature = "terminal")]
pub use terminal::{TerminalConfig, TerminalPlugin};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::core::{
        CommandArgs, CommandEntry, CommandFlags, CommandKind, CommandRegistry, Console,
        ConsoleInputEvent, ConsoleOutputEvent, ConsoleOutputLevel, ConsoleRef, ExecuteError,
        ExecuteOutcome, HostContext, HostState, tokenize,
    };
    pub use crate::ConsolePlugin;
}

/// Main console plugin.
///
/// Inserts the [`CommandRegistry`] and [`HostState`] resources, registers the
/// built-in commands, fires every variable's initial update after startup and
/// executes [`ConsoleInputEvent`]s each frame. Deferred lines run on the first
/// frame where [`HostState::main_menu_shown`] is set.
#[derive(Default)]
pub struct ConsolePlugin;

impl Plugin for ConsolePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<CommandRegistry>()
            .init_resource::<HostState>()
            .add_plugins(core::ConsoleEventsPlugin);

        app.add_systems(Startup, register_builtin_commands);
        app.add_systems(PostStartup, finish_registration);

        app.add_systems(
            Update,
            (
                execute_console_input,
                drain_deferred_commands.run_if(main_menu_ready),
            )
                .chain(),
        );

        // Terminal backend (feature-gated)
        #[cfg(feature = "terminal")]
        {
            app.add_plugins(terminal::TerminalPlugin);
        }
    }
}

/// Register built-in console commands.
fn register_builtin_commands(mut registry: ResMut<CommandRegistry>) {
    // help - List entries, describe one, or list a module
    registry.add(
        CommandEntry::action("help", |args, out| {
            let registry = args.registry();
            *out = match args.get(0) {
                None => registry.generate_help_text(None),
                Some(name) => match registry.entry(name) {
                    Some(entry) if !entry.has_flag(CommandFlags::INTERNAL) => generate_entry_help(entry),
                    _ => {
                        let listing = registry.generate_help_text(Some(name));
                        if listing.is_empty() {
                            format!("No command, variable or module named '{}'", name)
                        } else {
                            listing
                        }
                    }
                },
            };
            true
        })
        .description("Show help for a command, variable or module")
        .arg("name Command, variable or module to describe"),
    );

    // echo - Print text to console
    registry.add(
        CommandEntry::action("echo", |args, out| {
            *out = args.join(" ");
            true
        })
        .description("Print text to console")
        .arg("text Text to print"),
    );

    // writeconfig - Dump archived variables as executable lines
    registry.add(
        CommandEntry::action("writeconfig", |args, out| {
            *out = args.registry().save_variables();
            true
        })
        .description("Print archived variables as a config that can be executed back"),
    );

    info!("Console: registered {} built-in commands", registry.len());
}

/// Fire the initial update for every variable once startup registration is done.
fn finish_registration(registry: Res<CommandRegistry>) {
    registry.finish_add();
}

/// System that executes console input and reports the result.
fn execute_console_input(
    mut input_events: MessageReader<ConsoleInputEvent>,
    mut registry: ResMut<CommandRegistry>,
    host: Res<HostState>,
    mut output_events: MessageWriter<ConsoleOutputEvent>,
) {
    for event in input_events.read() {
        output_events.write(ConsoleOutputEvent::command(format!("$ {}", event.command)));

        match registry.try_execute(&event.command, event.user_input, &*host) {
            Ok(ExecuteOutcome::Output(text)) => {
                if !text.is_empty() {
                    output_events.write(ConsoleOutputEvent::result(text));
                }
            }
            Ok(ExecuteOutcome::Queued) => {
                output_events.write(ConsoleOutputEvent::info(QUEUED_MESSAGE));
            }
            Err(err) => {
                output_events.write(ConsoleOutputEvent::error(err.to_string()));
            }
        }
    }
}

fn main_menu_ready(host: Res<HostState>, registry: Res<CommandRegistry>) -> bool {
    host.main_menu_shown && !registry.deferred().is_empty()
}

/// System that runs the deferred queue once the main menu shows.
fn drain_deferred_commands(
    mut registry: ResMut<CommandRegistry>,
    host: Res<HostState>,
    mut output_events: MessageWriter<ConsoleOutputEvent>,
) {
    let results = registry.execute_queue(&*host);
    for line in results.lines().filter(|line| !line.is_empty()) {
        output_events.write(ConsoleOutputEvent::result(line));
    }
}
