//! Command registry: entries, lookup and the execution pipeline.
//!
//! Entries live in insertion order and are never removed. Callers hold
//! [`EntryId`] handles; every mutation goes through the registry.

use std::fmt::{self, Display, Write};

use bevy::prelude::*;

use super::entry::Commit;
use super::permissions::{check_hosting, check_internal, check_replicated, must_defer};
use super::{
    CommandArgs, CommandEntry, CommandFlags, CommandKind, ExecuteError, HostContext,
    SetVariableError, TokenizedCommand, split_lines, tokenize,
};

/// Text returned when an invocation is deferred.
pub const QUEUED_MESSAGE: &str = "Command queued until mainmenu shows";

/// Stable handle to a registered entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntryId(usize);

impl EntryId {
    /// Position in registration order.
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

/// Successful result of one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecuteOutcome {
    /// The entry ran; this is its result text.
    Output(String),
    /// The line was put on the deferred queue.
    Queued,
}

impl Display for ExecuteOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecuteOutcome::Output(text) => write!(f, "{}", text),
            ExecuteOutcome::Queued => write!(f, "{}", QUEUED_MESSAGE),
        }
    }
}

/// Which public entry point is driving the pipeline.
///
/// Only the text pipeline defers `RUN_ON_MAIN_MENU` entries; the status
/// pipeline runs them straight away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pipeline {
    Text,
    Status,
}

/// Central registry for console commands and variables.
///
/// # Examples
///
/// ```
/// use dorito_console::core::{CommandEntry, CommandRegistry, HostState};
///
/// let mut registry = CommandRegistry::new();
/// registry.add(CommandEntry::int_var("sv_count", 2).range(1u32, 8));
/// registry.finish_add();
///
/// let host = HostState::default();
/// assert_eq!(registry.execute("sv_count 10", true, &host), "Value 10 out of range [1..8]");
/// assert_eq!(registry.execute("sv_count 4", true, &host), "2 -> 4");
/// assert_eq!(registry.execute("sv_count", true, &host), "4");
/// ```
#[derive(Resource, Debug, Default)]
pub struct CommandRegistry {
    entries: Vec<CommandEntry>,
    /// Raw lines waiting for the main menu.
    deferred: Vec<String>,
}

impl CommandRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an entry.
    ///
    /// Returns `None`, leaving the registry unchanged, when the name is empty
    /// or the name or short name collides with any existing name or short name.
    pub fn add(&mut self, entry: CommandEntry) -> Option<EntryId> {
        if entry.name().is_empty() {
            warn!("Console: refusing to register an entry without a name");
            return None;
        }

        let short_taken = !entry.get_short_name().is_empty() && self.find(entry.get_short_name()).is_some();
        if self.find(entry.name()).is_some() || short_taken {
            warn!("Console: '{}' collides with an existing entry, not registered", entry.name());
            return None;
        }

        self.entries.push(entry);
        Some(EntryId(self.entries.len() - 1))
    }

    /// Fire every variable's handler once with no arguments.
    ///
    /// Call after all startup registrations so modules can apply defaults
    /// that depend on the host environment. Entries flagged
    /// `DONT_UPDATE_INITIAL` are skipped.
    pub fn finish_add(&self) {
        let mut fired = 0;
        for entry in &self.entries {
            if !entry.kind().is_variable() || entry.has_flag(CommandFlags::DONT_UPDATE_INITIAL) {
                continue;
            }
            let mut discarded = String::new();
            if entry.invoke(&CommandArgs::new("", &[], self), &mut discarded).is_some() {
                fired += 1;
            }
        }
        debug!("Console: initial update fired for {} variables", fired);
    }

    /// Resolve a name or short name, ignoring ASCII case.
    pub fn find(&self, name: &str) -> Option<EntryId> {
        self.entries.iter().position(|entry| entry.matches(name)).map(EntryId)
    }

    /// Get an entry by handle.
    pub fn get(&self, id: EntryId) -> Option<&CommandEntry> {
        self.entries.get(id.0)
    }

    /// Get an entry by name.
    pub fn entry(&self, name: &str) -> Option<&CommandEntry> {
        self.find(name).and_then(|id| self.get(id))
    }

    /// Check if a name resolves.
    pub fn contains(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    /// Get the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over all entries in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &CommandEntry> {
        self.entries.iter()
    }

    /// Iterate over all variables.
    pub fn vars(&self) -> impl Iterator<Item = &CommandEntry> {
        self.entries.iter().filter(|entry| entry.kind().is_variable())
    }

    /// Iterate over all actions.
    pub fn actions(&self) -> impl Iterator<Item = &CommandEntry> {
        self.entries.iter().filter(|entry| !entry.kind().is_variable())
    }

    /// Lines waiting for the main menu, oldest first.
    pub fn deferred(&self) -> &[String] {
        &self.deferred
    }

    /// Set a variable from text without running its handler.
    ///
    /// Returns the previous canonical value. An empty `value` is a read.
    pub fn set_variable(&mut self, id: EntryId, value: &str) -> Result<String, SetVariableError> {
        self.entries
            .get_mut(id.0)
            .ok_or(SetVariableError::NotFound)?
            .assign(value, Commit::Checked)
    }

    /// Set a variable by name without running its handler.
    pub fn set_variable_by_name(&mut self, name: &str, value: &str) -> Result<String, SetVariableError> {
        let id = self.find(name).ok_or(SetVariableError::NotFound)?;
        self.set_variable(id, value)
    }

    /// Get an int variable's value.
    pub fn get_int(&self, name: &str) -> Option<u32> {
        self.entry(name)?.as_int()
    }

    /// Get an int64 variable's value.
    pub fn get_int64(&self, name: &str) -> Option<u64> {
        self.entry(name)?.as_int64()
    }

    /// Get a float variable's value.
    pub fn get_float(&self, name: &str) -> Option<f32> {
        self.entry(name)?.as_float()
    }

    /// Get a string variable's value.
    pub fn get_string(&self, name: &str) -> Option<&str> {
        self.entry(name)?.as_string()
    }

    /// Get any variable's canonical string.
    pub fn value_string(&self, name: &str) -> Option<&str> {
        self.entry(name)
            .filter(|entry| entry.kind().is_variable())
            .map(CommandEntry::value_string)
    }

    /// Execute a line and return the result text.
    ///
    /// Failures come back as their message; deferral as [`QUEUED_MESSAGE`].
    pub fn execute(&mut self, line: &str, is_user_input: bool, host: &dyn HostContext) -> String {
        match self.try_execute(line, is_user_input, host) {
            Ok(outcome) => outcome.to_string(),
            Err(err) => err.to_string(),
        }
    }

    /// Execute a line, keeping the typed outcome.
    pub fn try_execute(
        &mut self,
        line: &str,
        is_user_input: bool,
        host: &dyn HostContext,
    ) -> Result<ExecuteOutcome, ExecuteError> {
        self.run(line, is_user_input, host, Pipeline::Text)
    }

    /// Execute a line and report only success.
    ///
    /// Unlike [`execute`](Self::execute) this never defers: a
    /// `RUN_ON_MAIN_MENU` entry runs immediately. Actions always count as
    /// successful whatever their handler returns.
    pub fn execute_with_status(&mut self, line: &str, is_user_input: bool, host: &dyn HostContext) -> bool {
        self.run(line, is_user_input, host, Pipeline::Status).is_ok()
    }

    /// Execute pre-split arguments. Each one is quoted before running.
    pub fn execute_args(&mut self, args: &[&str], is_user_input: bool, host: &dyn HostContext) -> String {
        let line = args
            .iter()
            .map(|arg| format!("\"{}\"", arg))
            .collect::<Vec<_>>()
            .join(" ");
        self.execute(&line, is_user_input, host)
    }

    /// Execute one command per line, skipping blank lines.
    ///
    /// Returns an `Error at line N` line (0-based) for every failure and keeps
    /// going past it. An empty result means every line succeeded.
    pub fn execute_list(&mut self, commands: &str, is_user_input: bool, host: &dyn HostContext) -> String {
        let mut report = String::new();
        for (index, line) in split_lines(commands) {
            if !self.execute_with_status(line, is_user_input, host) {
                let _ = writeln!(report, "Error at line {}", index);
            }
        }
        report
    }

    /// Run every deferred line in FIFO order as user input, then clear the queue.
    ///
    /// Each result is followed by a newline. Lines are never retried: anything
    /// deferred again during the drain is dropped with the rest.
    pub fn execute_queue(&mut self, host: &dyn HostContext) -> String {
        let queued = std::mem::take(&mut self.deferred);
        debug!("Console: draining {} deferred commands", queued.len());

        let mut results = String::new();
        for line in &queued {
            results.push_str(&self.execute(line, true, host));
            results.push('\n');
        }

        self.deferred.clear();
        results
    }

    fn run(
        &mut self,
        line: &str,
        is_user_input: bool,
        host: &dyn HostContext,
        pipeline: Pipeline,
    ) -> Result<ExecuteOutcome, ExecuteError> {
        let TokenizedCommand { command, args } = tokenize(line).map_err(|_| ExecuteError::InvalidInput)?;

        let id = self.find(&command).ok_or(ExecuteError::NotFound)?;
        check_internal(&self.entries[id.0], is_user_input)?;

        if pipeline == Pipeline::Text && must_defer(&self.entries[id.0], host) {
            debug!("Console: deferring '{}' until the main menu shows", line);
            self.deferred.push(line.to_string());
            return Ok(ExecuteOutcome::Queued);
        }

        let entry = &self.entries[id.0];
        check_hosting(entry, host)?;
        check_replicated(entry, host)?;

        if entry.kind() == CommandKind::Action {
            let mut output = String::new();
            if entry.invoke(&CommandArgs::new(line, &args, self), &mut output) == Some(false) {
                debug!("Console: action '{}' reported failure", entry.name());
            }
            return Ok(ExecuteOutcome::Output(output));
        }

        let candidate = args.first().map(String::as_str);
        let previous = self
            .assign_from_arg(id, candidate, Commit::Checked)
            .map_err(|err| ExecuteError::from_set(err, candidate.unwrap_or("")))?;

        if args.is_empty() {
            return Ok(ExecuteOutcome::Output(previous));
        }

        let entry = &self.entries[id.0];
        let mut output = String::new();
        let rejected = entry.invoke(&CommandArgs::new(line, &args, self), &mut output) == Some(false);
        if rejected {
            let name = entry.name().to_string();
            self.revert(id, &previous);
            warn!("Console: update of '{}' rejected, reverted to \"{}\"", name, previous);
        }

        // After a revert this reads "old -> old"
        if output.is_empty() {
            output = format!("{} -> {}", previous, self.entries[id.0].value_string());
        }

        if rejected {
            Err(ExecuteError::HandlerRejected { message: output })
        } else {
            Ok(ExecuteOutcome::Output(output))
        }
    }

    /// Forward write shared by execution and revert.
    ///
    /// `None` is a read. An explicit empty argument clears a string
    /// variable, which a plain empty write would not.
    fn assign_from_arg(&mut self, id: EntryId, value: Option<&str>, mode: Commit) -> Result<String, SetVariableError> {
        let entry = &mut self.entries[id.0];
        let previous = entry.assign(value.unwrap_or(""), mode)?;
        if value == Some("") {
            entry.clear_string();
        }
        Ok(previous)
    }

    /// Replay `previous` through the write path. Never calls a handler.
    fn revert(&mut self, id: EntryId, previous: &str) {
        let _ = self.assign_from_arg(id, Some(previous), Commit::Replay);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::core::HostState;

    fn host() -> HostState {
        HostState::default()
    }

    fn counting_action(name: &str, counter: Arc<AtomicUsize>) -> CommandEntry {
        CommandEntry::action(name, move |args, out| {
            counter.fetch_add(1, Ordering::SeqCst);
            *out = format!("ran with {}", args.join(","));
            true
        })
    }

    #[test]
    fn test_add_and_find() {
        let mut registry = CommandRegistry::new();
        let id = registry.add(CommandEntry::int_var("Server.Count", 2).short_name("count")).unwrap();

        assert_eq!(registry.find("server.count"), Some(id));
        assert_eq!(registry.find("COUNT"), Some(id));
        assert_eq!(registry.find("missing"), None);
        assert_eq!(registry.find(""), None);
        assert_eq!(id.index(), 0);
    }

    #[test]
    fn test_contains_and_kind_iterators() {
        let mut registry = CommandRegistry::new();
        registry.add(CommandEntry::int_var("rate", 1));
        registry.add(CommandEntry::action("quit", |_, _| true));
        registry.add(CommandEntry::string_var("name", "Player"));

        assert!(registry.contains("QUIT"));
        assert!(!registry.contains("missing"));

        let actions: Vec<_> = registry.actions().map(CommandEntry::name).collect();
        assert_eq!(actions, vec!["quit"]);
        let vars: Vec<_> = registry.vars().map(CommandEntry::name).collect();
        assert_eq!(vars, vec!["rate", "name"]);
    }

    #[test]
    fn test_duplicate_detection() {
        let mut registry = CommandRegistry::new();
        assert!(registry.add(CommandEntry::int_var("sv_count", 2).short_name("count")).is_some());

        assert!(registry.add(CommandEntry::int_var("SV_COUNT", 3)).is_none());
        assert!(registry.add(CommandEntry::int_var("other", 3).short_name("sv_count")).is_none());
        assert!(registry.add(CommandEntry::int_var("count", 3)).is_none());
        assert!(registry.add(CommandEntry::int_var("other", 3).short_name("Count")).is_none());
        assert!(registry.add(CommandEntry::int_var("", 3)).is_none());
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get_int("sv_count"), Some(2));

        // two entries without short names do not collide on ""
        assert!(registry.add(CommandEntry::int_var("other", 3)).is_some());
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_handles_survive_growth() {
        let mut registry = CommandRegistry::new();
        let first = registry.add(CommandEntry::int_var("first", 1)).unwrap();
        for i in 0..64 {
            registry.add(CommandEntry::int_var(format!("var_{}", i), i));
        }
        registry.set_variable(first, "7").unwrap();
        assert_eq!(registry.get(first).map(|e| e.name()), Some("first"));
        assert_eq!(registry.get_int("first"), Some(7));
    }

    #[test]
    fn test_invalid_input() {
        let mut registry = CommandRegistry::new();
        assert_eq!(registry.execute("", true, &host()), "Invalid input");
        assert_eq!(registry.try_execute("  \t ", true, &host()), Err(ExecuteError::InvalidInput));
        assert!(!registry.execute_with_status("", true, &host()));
    }

    #[test]
    fn test_not_found() {
        let mut registry = CommandRegistry::new();
        assert_eq!(registry.execute("nope 1", true, &host()), "Command/Variable not found");
    }

    #[test]
    fn test_int_example() {
        let mut registry = CommandRegistry::new();
        registry.add(CommandEntry::int_var("sv_count", 2).range(1u32, 8));

        assert_eq!(registry.execute("sv_count 10", true, &host()), "Value 10 out of range [1..8]");
        assert_eq!(registry.get_int("sv_count"), Some(2));
        assert_eq!(registry.value_string("sv_count"), Some("2"));

        assert_eq!(registry.execute("sv_count 4", true, &host()), "2 -> 4");
        assert_eq!(registry.execute("sv_count", true, &host()), "4");
        assert_eq!(registry.value_string("sv_count"), Some("4"));
    }

    #[test]
    fn test_int_base_prefixes() {
        let mut registry = CommandRegistry::new();
        registry.add(CommandEntry::int_var("mask", 0));

        assert_eq!(registry.execute("mask 0x10", true, &host()), "0 -> 16");
        assert_eq!(registry.execute("mask 010", true, &host()), "16 -> 8");
        assert_eq!(registry.execute("mask ten", true, &host()), "Invalid value");
        assert_eq!(registry.get_int("mask"), Some(8));
    }

    #[test]
    fn test_int64_and_float() {
        let mut registry = CommandRegistry::new();
        registry.add(CommandEntry::int64_var("uid", 1).range(1u64, 10_000_000_000));
        registry.add(CommandEntry::float_var("fov", 90.0).range(60.0f32, 120.0));

        assert_eq!(registry.execute("uid 9000000000", true, &host()), "1 -> 9000000000");
        assert_eq!(registry.execute("uid 0", true, &host()), "Value 0 out of range [1..10000000000]");
        assert_eq!(registry.get_int64("uid"), Some(9_000_000_000));
        assert_eq!(registry.value_string("uid"), Some("9000000000"));

        assert_eq!(registry.execute("fov 100.5", true, &host()), "90 -> 100.5");
        assert_eq!(registry.execute("fov 130", true, &host()), "Value 130 out of range [60..120]");
        assert_eq!(registry.get_float("fov"), Some(100.5));
        assert_eq!(registry.value_string("fov"), Some("100.5"));

        assert_eq!(registry.execute("fov abc", true, &host()), "Invalid value");
        assert_eq!(registry.get_float("fov"), Some(100.5));
        assert_eq!(registry.value_string("fov"), Some("100.5"));
    }

    #[test]
    fn test_unbounded_zero_is_settable() {
        let mut registry = CommandRegistry::new();
        registry.add(CommandEntry::int_var("zero", 5));
        registry.add(CommandEntry::int_var("only_zero", 0).range(0u32, 0));

        assert_eq!(registry.execute("zero 123", true, &host()), "5 -> 123");
        assert_eq!(registry.execute("only_zero 0", true, &host()), "0 -> 0");
        assert_eq!(registry.execute("only_zero 1", true, &host()), "Value 1 out of range [0..0]");
    }

    #[test]
    fn test_string_var_set_and_clear() {
        let mut registry = CommandRegistry::new();
        registry.add(CommandEntry::string_var("name", "Player"));

        assert_eq!(registry.execute("name \"Master Chief\"", true, &host()), "Player -> Master Chief");
        assert_eq!(registry.execute("name", true, &host()), "Master Chief");

        assert_eq!(registry.execute("name \"\"", true, &host()), "Master Chief -> ");
        assert_eq!(registry.get_string("name"), Some(""));
    }

    #[test]
    fn test_action_output() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut registry = CommandRegistry::new();
        registry.add(counting_action("act", counter.clone()));

        assert_eq!(registry.execute("act a \"b c\"", true, &host()), "ran with a,b c");
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_action_failure_is_not_pipeline_failure() {
        let mut registry = CommandRegistry::new();
        registry.add(CommandEntry::action("fail", |_, out| {
            *out = "Usage: fail <x>".to_string();
            false
        }));

        assert_eq!(registry.execute("fail", true, &host()), "Usage: fail <x>");
        assert!(registry.execute_with_status("fail", true, &host()));
    }

    #[test]
    fn test_handler_output_replaces_arrow() {
        let mut registry = CommandRegistry::new();
        registry.add(CommandEntry::int_var("rate", 1).on_update(|args, out| {
            *out = format!("rate is now {}", &args[0]);
            true
        }));

        assert_eq!(registry.execute("rate 5", true, &host()), "rate is now 5");
    }

    #[test]
    fn test_handler_sees_new_value() {
        let mut registry = CommandRegistry::new();
        registry.add(CommandEntry::int_var("rate", 1).on_update(|args, out| {
            let current = args.registry().get_int("rate").unwrap_or_default();
            *out = format!("{}", current * 2);
            true
        }));

        assert_eq!(registry.execute("rate 21", true, &host()), "42");
    }

    #[test]
    fn test_revert_law_all_kinds() {
        fn reject(_: &CommandArgs, _: &mut String) -> bool {
            false
        }

        let mut registry = CommandRegistry::new();
        registry.add(CommandEntry::string_var("s", "keep").on_update(reject));
        registry.add(CommandEntry::string_var("empty", "").on_update(reject));
        registry.add(CommandEntry::int_var("i", 3).on_update(reject));
        registry.add(CommandEntry::int64_var("l", 4).on_update(reject));
        registry.add(CommandEntry::float_var("f", 0.25).on_update(reject));

        for (line, name, before) in [
            ("s other", "s", "keep"),
            ("s \"\"", "s", "keep"),
            ("empty full", "empty", ""),
            ("i 9", "i", "3"),
            ("l 9", "l", "4"),
            ("f 9.5", "f", "0.25"),
        ] {
            let result = registry.try_execute(line, true, &host());
            assert!(matches!(result, Err(ExecuteError::HandlerRejected { .. })), "{}", line);
            assert_eq!(registry.value_string(name), Some(before), "{}", line);
        }
        assert_eq!(registry.get_float("f"), Some(0.25));
        assert_eq!(registry.get_string("empty"), Some(""));
    }

    #[test]
    fn test_silent_rejection_reports_unchanged_value() {
        let mut registry = CommandRegistry::new();
        registry.add(CommandEntry::int_var("i", 3).on_update(|_, _| false));
        registry.add(CommandEntry::string_var("s", "keep").on_update(|_, _| false));

        assert_eq!(registry.execute("i 9", true, &host()), "3 -> 3");
        assert_eq!(
            registry.try_execute("s other", true, &host()),
            Err(ExecuteError::HandlerRejected { message: "keep -> keep".to_string() })
        );
        assert_eq!(registry.value_string("i"), Some("3"));
    }

    #[test]
    fn test_revert_reports_handler_text() {
        let mut registry = CommandRegistry::new();
        registry.add(CommandEntry::int_var("team", 0).on_update(|_, out| {
            *out = "Teams are locked".to_string();
            false
        }));

        assert_eq!(registry.execute("team 1", true, &host()), "Teams are locked");
        assert!(!registry.execute_with_status("team 1", true, &host()));
        assert_eq!(registry.get_int("team"), Some(0));
    }

    #[test]
    fn test_revert_bypasses_bounds() {
        let mut registry = CommandRegistry::new();
        registry.add(CommandEntry::int_var("slots", 0).range(1u32, 16).on_update(|_, _| false));

        assert!(registry.try_execute("slots 4", true, &host()).is_err());
        assert_eq!(registry.get_int("slots"), Some(0));
    }

    #[test]
    fn test_revert_does_not_rerun_handler() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let mut registry = CommandRegistry::new();
        registry.add(CommandEntry::int_var("x", 0).on_update(move |_, _| {
            counter.fetch_add(1, Ordering::SeqCst);
            false
        }));

        registry.execute("x 1", true, &host());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_read_does_not_run_handler() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let mut registry = CommandRegistry::new();
        registry.add(CommandEntry::int_var("x", 7).on_update(move |_, _| {
            counter.fetch_add(1, Ordering::SeqCst);
            true
        }));

        assert_eq!(registry.execute("x", true, &host()), "7");
        assert!(registry.execute_with_status("x", true, &host()));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_internal_hidden_from_user_input() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut registry = CommandRegistry::new();
        registry.add(counting_action("secret", counter.clone()).flags(CommandFlags::INTERNAL));

        let missing = registry.try_execute("does_not_exist", true, &host());
        assert_eq!(registry.try_execute("secret", true, &host()), missing);
        assert!(!registry.execute_with_status("secret", true, &host()));
        assert_eq!(counter.load(Ordering::SeqCst), 0);

        assert_eq!(registry.execute("secret x", false, &host()), "ran with x");
        assert!(registry.execute_with_status("secret", false, &host()));
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_hosting_gates() {
        let mut registry = CommandRegistry::new();
        registry.add(CommandEntry::int_var("kick", 0).flags(CommandFlags::MUST_BE_HOSTING));
        registry.add(CommandEntry::int_var("map", 0).flags(CommandFlags::REPLICATED));

        let nobody = HostState::default();
        let lobby = HostState { at_lobby: true, ..Default::default() };
        let hosting = HostState { hosting: true, ..Default::default() };

        assert_eq!(
            registry.execute("kick 1", true, &lobby),
            "Only a player hosting a game can use this command"
        );
        assert!(!registry.execute_with_status("kick 1", true, &lobby));
        assert_eq!(registry.execute("kick 1", true, &hosting), "0 -> 1");

        assert_eq!(
            registry.execute("map 1", true, &nobody),
            "You must be at the lobby or hosting a game to use this command"
        );
        assert_eq!(registry.execute("map 1", true, &lobby), "0 -> 1");
        assert_eq!(registry.execute("map 2", true, &hosting), "1 -> 2");
    }

    #[test]
    fn test_deferred_until_main_menu() {
        let mut registry = CommandRegistry::new();
        registry.add(CommandEntry::string_var("motd", "hi").flags(CommandFlags::RUN_ON_MAIN_MENU));

        let before = HostState::default();
        assert_eq!(registry.execute("motd first", true, &before), QUEUED_MESSAGE);
        assert_eq!(registry.try_execute("motd  second", true, &before), Ok(ExecuteOutcome::Queued));
        assert_eq!(registry.get_string("motd"), Some("hi"));
        assert_eq!(registry.deferred(), ["motd first", "motd  second"]);

        let after = HostState::hosting_on_main_menu();
        let results = registry.execute_queue(&after);
        assert_eq!(results, "hi -> first\nfirst -> second\n");
        assert!(registry.deferred().is_empty());
        assert_eq!(registry.get_string("motd"), Some("second"));
    }

    #[test]
    fn test_queue_drained_once_even_if_still_deferred() {
        let mut registry = CommandRegistry::new();
        registry.add(CommandEntry::int_var("late", 0).flags(CommandFlags::RUN_ON_MAIN_MENU));

        let before = HostState::default();
        registry.execute("late 1", true, &before);

        assert_eq!(registry.execute_queue(&before), format!("{}\n", QUEUED_MESSAGE));
        assert!(registry.deferred().is_empty());
        assert_eq!(registry.get_int("late"), Some(0));
    }

    #[test]
    fn test_status_pipeline_does_not_defer() {
        let mut registry = CommandRegistry::new();
        registry.add(CommandEntry::int_var("late", 0).flags(CommandFlags::RUN_ON_MAIN_MENU));

        assert!(registry.execute_with_status("late 3", true, &HostState::default()));
        assert!(registry.deferred().is_empty());
        assert_eq!(registry.get_int("late"), Some(3));
    }

    #[test]
    fn test_execute_args_quotes_each() {
        let mut registry = CommandRegistry::new();
        registry.add(CommandEntry::string_var("name", "a"));
        assert_eq!(registry.execute_args(&["name", "two words"], true, &host()), "a -> two words");
    }

    #[test]
    fn test_execute_list() {
        let mut registry = CommandRegistry::new();
        registry.add(CommandEntry::int_var("a", 0));
        registry.add(CommandEntry::int_var("b", 0).range(1u32, 2));

        let report = registry.execute_list("a 1\n\nmissing 2\nb 5\nb 2\n", true, &host());
        assert_eq!(report, "Error at line 2\nError at line 3\n");
        assert_eq!(registry.get_int("a"), Some(1));
        assert_eq!(registry.get_int("b"), Some(2));
    }

    #[test]
    fn test_set_variable_api() {
        let mut registry = CommandRegistry::new();
        let id = registry.add(CommandEntry::int_var("x", 1).range(1u32, 5)).unwrap();
        registry.add(CommandEntry::action("act", |_, _| true));

        assert_eq!(registry.set_variable(id, "3"), Ok("1".to_string()));
        assert_eq!(registry.set_variable(id, ""), Ok("3".to_string()));
        assert_eq!(
            registry.set_variable(id, "6"),
            Err(SetVariableError::OutOfRange { min: "1".into(), max: "5".into() })
        );
        assert_eq!(registry.set_variable_by_name("missing", "1"), Err(SetVariableError::NotFound));
        assert_eq!(registry.set_variable_by_name("act", "1"), Err(SetVariableError::NotFound));
    }

    #[test]
    fn test_typed_getters_check_kind() {
        let mut registry = CommandRegistry::new();
        registry.add(CommandEntry::int_var("i", 1));
        registry.add(CommandEntry::action("act", |_, _| true));

        assert_eq!(registry.get_int("i"), Some(1));
        assert_eq!(registry.get_float("i"), None);
        assert_eq!(registry.get_string("i"), None);
        assert_eq!(registry.value_string("act"), None);
    }

    #[test]
    fn test_finish_add() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut registry = CommandRegistry::new();

        let c = calls.clone();
        registry.add(CommandEntry::int_var("plain", 0).on_update(move |args, _| {
            assert!(args.is_empty());
            c.fetch_add(1, Ordering::SeqCst);
            true
        }));
        let c = calls.clone();
        registry.add(
            CommandEntry::int_var("skipped", 0)
                .flags(CommandFlags::DONT_UPDATE_INITIAL)
                .on_update(move |_, _| {
                    c.fetch_add(100, Ordering::SeqCst);
                    true
                }),
        );
        registry.add(counting_action("action", Arc::new(AtomicUsize::new(0))));
        registry.add(CommandEntry::int_var("no_handler", 0));

        registry.finish_add();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
