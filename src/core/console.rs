//! Unified console API for systems.
//!
//! The [`Console`] system parameter pairs the [`CommandRegistry`] with the
//! current [`HostState`] so systems can run lines without passing the host
//! context around by hand.

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

use super::{CommandEntry, CommandRegistry, EntryId, ExecuteError, ExecuteOutcome, HostState};

/// Console system parameter.
///
/// # Examples
///
/// ```ignore
/// fn setup_console(mut console: Console) {
///     console.add(CommandEntry::int_var("sv_count", 8)
///         .description("Maximum player count")
///         .range(1u32, 16));
///
///     console.execute_internal("sv_count 4");
///     assert_eq!(console.registry().get_int("sv_count"), Some(4));
/// }
/// ```
#[derive(SystemParam)]
pub struct Console<'w> {
    registry: ResMut<'w, CommandRegistry>,
    host: Res<'w, HostState>,
}

impl Console<'_> {
    /// Register an entry. See [`CommandRegistry::add`].
    pub fn add(&mut self, entry: CommandEntry) -> Option<EntryId> {
        self.registry.add(entry)
    }

    /// Execute a line as user input and return the result text.
    pub fn execute(&mut self, line: &str) -> String {
        self.registry.execute(line, true, &*self.host)
    }

    /// Execute a line as trusted input and return the result text.
    pub fn execute_internal(&mut self, line: &str) -> String {
        self.registry.execute(line, false, &*self.host)
    }

    /// Execute a line as user input, keeping the typed outcome.
    pub fn try_execute(&mut self, line: &str) -> Result<ExecuteOutcome, ExecuteError> {
        self.registry.try_execute(line, true, &*self.host)
    }

    /// Execute a newline-separated batch as trusted input.
    pub fn execute_list(&mut self, commands: &str) -> String {
        self.registry.execute_list(commands, false, &*self.host)
    }

    /// Read-only access to the registry.
    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    /// Current host state.
    pub fn host(&self) -> &HostState {
        &self.host
    }
}

/// Read-only console system parameter.
///
/// Use this when you only need to read values, not run commands.
#[derive(SystemParam)]
pub struct ConsoleRef<'w> {
    registry: Res<'w, CommandRegistry>,
}

impl ConsoleRef<'_> {
    /// Get an entry by name.
    pub fn entry(&self, name: &str) -> Option<&CommandEntry> {
        self.registry.entry(name)
    }

    /// Get any variable's canonical string.
    pub fn value_string(&self, name: &str) -> Option<&str> {
        self.registry.value_string(name)
    }

    /// Help listing, optionally filtered by module.
    pub fn help_text(&self, module_filter: Option<&str>) -> String {
        self.registry.generate_help_text(module_filter)
    }

    /// Get read-only access to the underlying registry.
    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }
}
