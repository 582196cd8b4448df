//! Help listing, per-entry usage text and the archived-variable dump.

use std::fmt::Write;

use super::{CommandEntry, CommandFlags, CommandRegistry};

impl CommandRegistry {
    /// List visible entries, one per line, sorted by name.
    ///
    /// Hidden and internal entries never appear. With a `module_filter`, only
    /// entries whose module matches it (ignoring ASCII case) are listed.
    /// Entries without a module come first, then those with one.
    pub fn generate_help_text(&self, module_filter: Option<&str>) -> String {
        let mut sorted: Vec<&CommandEntry> = self
            .iter()
            .filter(|entry| {
                !entry.has_flag(CommandFlags::HIDDEN) && !entry.has_flag(CommandFlags::INTERNAL)
            })
            .filter(|entry| match module_filter {
                Some(module) if !module.is_empty() => entry.module_name().eq_ignore_ascii_case(module),
                _ => true,
            })
            .collect();
        sorted.sort_by(|a, b| a.name().cmp(b.name()));

        let (ungrouped, grouped): (Vec<_>, Vec<_>) =
            sorted.into_iter().partition(|entry| entry.module_name().is_empty());

        let mut text = String::new();
        for entry in ungrouped.into_iter().chain(grouped) {
            let _ = writeln!(text, "{}", entry);
        }
        text
    }

    /// Usage text for a named entry, if it resolves.
    pub fn help_for(&self, name: &str) -> Option<String> {
        self.entry(name).map(generate_entry_help)
    }

    /// Dump archived, non-internal variables as `name "value"` lines.
    ///
    /// Feeding the result back through
    /// [`execute_list`](CommandRegistry::execute_list) restores the values.
    pub fn save_variables(&self) -> String {
        let mut text = String::new();
        for entry in self.vars() {
            if !entry.has_flag(CommandFlags::ARCHIVED) || entry.has_flag(CommandFlags::INTERNAL) {
                continue;
            }
            let _ = writeln!(text, "{} \"{}\"", entry.name(), entry.value_string());
        }
        text
    }
}

/// Usage text for one entry.
///
/// Variables show their type tag and current value; actions show each
/// argument inline plus an indented line for every described argument.
pub fn generate_entry_help(entry: &CommandEntry) -> String {
    let mut text = String::new();

    if entry.get_description().is_empty() {
        let _ = writeln!(text, "{}", entry.name());
    } else {
        let _ = writeln!(text, "{} - {}.", entry.name(), entry.get_description());
    }
    let _ = write!(text, "Usage: {}", entry.name());

    if entry.kind().is_variable() {
        let _ = writeln!(text, " <value({})>", entry.kind().type_name());
        let _ = writeln!(text, "Current value: {}", entry.value_string());
        return text;
    }

    for arg in entry.arg_specs() {
        let _ = write!(text, " <{}>", arg.name);
    }
    text.push('\n');

    for arg in entry.arg_specs().iter().filter(|arg| !arg.description.is_empty()) {
        let _ = writeln!(text, "  {}: {}", arg.name, arg.description);
    }
    text
}
