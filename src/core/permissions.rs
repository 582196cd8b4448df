//! Host predicates and the flag-gated access checks built on them.
//!
//! The registry never reaches into global host state. Callers pass a
//! [`HostContext`] to every execution entry point instead.

use bevy::prelude::*;

use super::{CommandEntry, CommandFlags, ExecuteError};

/// Questions the registry asks the host at call time.
pub trait HostContext {
    /// Has the deferred-execution precondition (main menu shown) occurred?
    fn main_menu_shown(&self) -> bool;

    /// Is the caller hosting the current session?
    fn is_hosting(&self) -> bool;

    /// Is the caller sitting in the pre-game lobby?
    fn at_lobby(&self) -> bool;
}

/// Plain host state, also used as the resource the plugin reads.
///
/// Everything starts `false`: nothing deferred runs and no gated entry is
/// usable until the host says otherwise.
///
/// # Examples
///
/// ```ignore
/// fn on_main_menu(mut host: ResMut<HostState>) {
///     host.main_menu_shown = true;
/// }
/// ```
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HostState {
    /// The main menu has been shown at least once.
    pub main_menu_shown: bool,
    /// The local player hosts the session.
    pub hosting: bool,
    /// The local player is in the pre-game lobby.
    pub at_lobby: bool,
}

impl HostState {
    /// State of a host that has reached the main menu and hosts a game.
    pub fn hosting_on_main_menu() -> Self {
        Self {
            main_menu_shown: true,
            hosting: true,
            at_lobby: false,
        }
    }
}

impl HostContext for HostState {
    fn main_menu_shown(&self) -> bool {
        self.main_menu_shown
    }

    fn is_hosting(&self) -> bool {
        self.hosting
    }

    fn at_lobby(&self) -> bool {
        self.at_lobby
    }
}

/// Internal entries look exactly like missing ones to user input.
pub fn check_internal(entry: &CommandEntry, is_user_input: bool) -> Result<(), ExecuteError> {
    if is_user_input && entry.has_flag(CommandFlags::INTERNAL) {
        return Err(ExecuteError::NotFound);
    }
    Ok(())
}

/// Check if the invocation must wait for the main menu.
pub fn must_defer(entry: &CommandEntry, host: &dyn HostContext) -> bool {
    entry.has_flag(CommandFlags::RUN_ON_MAIN_MENU) && !host.main_menu_shown()
}

/// Hosting gate.
pub fn check_hosting(entry: &CommandEntry, host: &dyn HostContext) -> Result<(), ExecuteError> {
    if entry.has_flag(CommandFlags::MUST_BE_HOSTING) && !host.is_hosting() {
        return Err(ExecuteError::MustBeHosting);
    }
    Ok(())
}

/// Replication gate: host or lobby.
pub fn check_replicated(entry: &CommandEntry, host: &dyn HostContext) -> Result<(), ExecuteError> {
    if entry.has_flag(CommandFlags::REPLICATED) && !host.is_hosting() && !host.at_lobby() {
        return Err(ExecuteError::MustBeLobbyOrHosting);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn var(flags: CommandFlags) -> CommandEntry {
        CommandEntry::int_var("test", 0).flags(flags)
    }

    #[test]
    fn test_default_state_is_closed() {
        let host = HostState::default();
        assert!(!host.main_menu_shown());
        assert!(!host.is_hosting());
        assert!(!host.at_lobby());
    }

    #[test]
    fn test_internal_gate() {
        let entry = var(CommandFlags::INTERNAL);
        assert_eq!(check_internal(&entry, true), Err(ExecuteError::NotFound));
        assert_eq!(check_internal(&entry, false), Ok(()));
        assert_eq!(check_internal(&var(CommandFlags::NONE), true), Ok(()));
    }

    #[test]
    fn test_defer_gate() {
        let entry = var(CommandFlags::RUN_ON_MAIN_MENU);
        assert!(must_defer(&entry, &HostState::default()));
        assert!(!must_defer(&entry, &HostState::hosting_on_main_menu()));
        assert!(!must_defer(&var(CommandFlags::NONE), &HostState::default()));
    }

    #[test]
    fn test_hosting_gate() {
        let entry = var(CommandFlags::MUST_BE_HOSTING);
        let lobby = HostState { at_lobby: true, ..Default::default() };

        assert_eq!(check_hosting(&entry, &lobby), Err(ExecuteError::MustBeHosting));
        assert_eq!(check_hosting(&entry, &HostState::hosting_on_main_menu()), Ok(()));
    }

    #[test]
    fn test_replicated_gate() {
        let entry = var(CommandFlags::REPLICATED);
        let lobby = HostState { at_lobby: true, ..Default::default() };
        let host = HostState { hosting: true, ..Default::default() };

        assert_eq!(
            check_replicated(&entry, &HostState::default()),
            Err(ExecuteError::MustBeLobbyOrHosting)
        );
        assert_eq!(check_replicated(&entry, &lobby), Ok(()));
        assert_eq!(check_replicated(&entry, &host), Ok(()));
    }
}
