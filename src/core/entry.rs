//! Command entries: the record behind every console command and variable.
//!
//! An entry is either an *action* (runs its handler) or a *variable* holding
//! one typed value plus a canonical string mirror of it.

use std::fmt::{self, Display};

use bevy::prelude::*;

use super::{CommandArgs, SetVariableError};

/// Flags controlling how an entry may be reached and listed.
///
/// Flags are independent bits; any combination is legal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct CommandFlags(u32);

impl CommandFlags {
    /// No flags set.
    pub const NONE: Self = Self(0);

    /// Left out of the default help listing.
    pub const HIDDEN: Self = Self(1 << 0);

    /// Unreachable from user input; only trusted callers may run it.
    pub const INTERNAL: Self = Self(1 << 1);

    /// Queued until the host reports the main menu as shown.
    pub const RUN_ON_MAIN_MENU: Self = Self(1 << 2);

    /// Rejected unless the caller is hosting the session.
    pub const MUST_BE_HOSTING: Self = Self(1 << 3);

    /// Rejected unless the caller is hosting or sitting in the lobby.
    pub const REPLICATED: Self = Self(1 << 4);

    /// Written out by [`CommandRegistry::save_variables`](super::CommandRegistry::save_variables).
    pub const ARCHIVED: Self = Self(1 << 5);

    /// Help listing prints the name without the current value.
    pub const OMIT_VALUE_IN_LIST: Self = Self(1 << 6);

    /// Skipped by the startup pass in [`CommandRegistry::finish_add`](super::CommandRegistry::finish_add).
    pub const DONT_UPDATE_INITIAL: Self = Self(1 << 7);

    /// Check if a flag is set.
    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    /// Combine two flag sets.
    #[inline]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Check if no flags are set.
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl std::ops::BitOr for CommandFlags {
    type Output = Self;

    #[inline]
    fn bitor(self, rhs: Self) -> Self::Output {
        self.union(rhs)
    }
}

impl std::ops::BitOrAssign for CommandFlags {
    #[inline]
    fn bitor_assign(&mut self, rhs: Self) {
        *self = self.union(rhs);
    }
}

/// What an entry is. Fixed for the entry's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    /// Runs its handler and returns text.
    Action,
    /// Holds a string.
    StringVar,
    /// Holds a 32-bit unsigned integer.
    IntVar,
    /// Holds a 64-bit unsigned integer.
    Int64Var,
    /// Holds a 32-bit float.
    FloatVar,
}

impl CommandKind {
    /// Check if this kind holds a value.
    #[inline]
    pub fn is_variable(self) -> bool {
        self != CommandKind::Action
    }

    /// Type tag shown in usage text.
    pub fn type_name(self) -> &'static str {
        match self {
            CommandKind::Action => "command",
            CommandKind::StringVar => "string",
            CommandKind::IntVar => "int",
            CommandKind::Int64Var => "int64",
            CommandKind::FloatVar => "float",
        }
    }
}

/// Handler invoked as an action, or after a variable changed.
///
/// Receives the positional arguments and a slot for a result message;
/// returns `false` to report failure. A variable whose handler fails is
/// reverted to its previous value.
pub type UpdateHandler = Box<dyn Fn(&CommandArgs, &mut String) -> bool + Send + Sync>;

/// Numeric types a variable can hold.
///
/// Implemented for `u32` (int), `u64` (int64) and `f32` (float).
pub trait VarNumber: Copy + PartialOrd + Send + Sync + 'static {
    /// Parse a literal. `None` means the text is not a valid value.
    fn parse_literal(s: &str) -> Option<Self>;

    /// Format the value as its canonical string.
    fn format(&self) -> String;

    #[doc(hidden)]
    fn numeric_mut(value: &mut EntryValue) -> Option<&mut Numeric<Self>>;
}

/// Parse an unsigned integer with C-style base detection.
///
/// `0x`/`0X` selects hex, a leading `0` selects octal, anything else is
/// decimal. Surrounding whitespace and a leading `+` are accepted.
pub(crate) fn parse_c_integer(s: &str) -> Option<u64> {
    let s = s.trim();
    let s = s.strip_prefix('+').unwrap_or(s);

    let (digits, radix) = if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        (hex, 16)
    } else if s.len() > 1 && s.starts_with('0') {
        (&s[1..], 8)
    } else {
        (s, 10)
    };

    // from_str_radix would also take a sign here
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return None;
    }
    u64::from_str_radix(digits, radix).ok()
}

impl VarNumber for u32 {
    fn parse_literal(s: &str) -> Option<Self> {
        parse_c_integer(s).and_then(|v| u32::try_from(v).ok())
    }

    fn format(&self) -> String {
        self.to_string()
    }

    fn numeric_mut(value: &mut EntryValue) -> Option<&mut Numeric<Self>> {
        match value {
            EntryValue::Int(n) => Some(n),
            _ => None,
        }
    }
}

impl VarNumber for u64 {
    fn parse_literal(s: &str) -> Option<Self> {
        parse_c_integer(s)
    }

    fn format(&self) -> String {
        self.to_string()
    }

    fn numeric_mut(value: &mut EntryValue) -> Option<&mut Numeric<Self>> {
        match value {
            EntryValue::Int64(n) => Some(n),
            _ => None,
        }
    }
}

impl VarNumber for f32 {
    fn parse_literal(s: &str) -> Option<Self> {
        s.trim().parse::<f32>().ok().filter(|v| v.is_finite())
    }

    fn format(&self) -> String {
        // Avoid unnecessary decimal places
        if self.fract() == 0.0 {
            format!("{:.0}", self)
        } else {
            format!("{}", self)
        }
    }

    fn numeric_mut(value: &mut EntryValue) -> Option<&mut Numeric<Self>> {
        match value {
            EntryValue::Float(n) => Some(n),
            _ => None,
        }
    }
}

/// A numeric value with optional inclusive bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Numeric<T> {
    value: T,
    bounds: Option<(T, T)>,
}

impl<T: VarNumber> Numeric<T> {
    fn new(value: T) -> Self {
        Self { value, bounds: None }
    }

    /// Current value.
    #[inline]
    pub fn get(&self) -> T {
        self.value
    }

    /// Inclusive `(min, max)` bounds, if any.
    #[inline]
    pub fn bounds(&self) -> Option<(T, T)> {
        self.bounds
    }

    /// Parse and store `candidate`. An empty candidate leaves the value alone.
    ///
    /// Returns the previous value's canonical string.
    fn assign(&mut self, candidate: &str, mode: Commit) -> Result<String, SetVariableError> {
        let previous = self.value.format();
        if candidate.is_empty() {
            return Ok(previous);
        }

        let parsed = T::parse_literal(candidate).ok_or(SetVariableError::InvalidArgument)?;
        if let (Commit::Checked, Some((min, max))) = (mode, self.bounds) {
            if parsed < min || parsed > max {
                return Err(SetVariableError::OutOfRange {
                    min: min.format(),
                    max: max.format(),
                });
            }
        }

        self.value = parsed;
        Ok(previous)
    }
}

/// Whether a write honours the declared bounds.
///
/// Replaying a previous value during a revert skips them so a default that
/// sits outside its own range can still be restored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Commit {
    Checked,
    Replay,
}

/// Typed storage; exactly one variant is active for an entry's lifetime.
#[derive(Debug, Clone, PartialEq)]
pub enum EntryValue {
    /// Actions hold no value.
    None,
    /// String variable.
    Str(String),
    /// 32-bit integer variable.
    Int(Numeric<u32>),
    /// 64-bit integer variable.
    Int64(Numeric<u64>),
    /// Float variable.
    Float(Numeric<f32>),
}

impl EntryValue {
    fn kind(&self) -> CommandKind {
        match self {
            EntryValue::None => CommandKind::Action,
            EntryValue::Str(_) => CommandKind::StringVar,
            EntryValue::Int(_) => CommandKind::IntVar,
            EntryValue::Int64(_) => CommandKind::Int64Var,
            EntryValue::Float(_) => CommandKind::FloatVar,
        }
    }

    fn render(&self) -> String {
        match self {
            EntryValue::None => String::new(),
            EntryValue::Str(s) => s.clone(),
            EntryValue::Int(n) => n.value.format(),
            EntryValue::Int64(n) => n.value.format(),
            EntryValue::Float(n) => n.value.format(),
        }
    }

    /// Inclusive bounds as canonical strings, for numeric kinds that have them.
    fn bounds_text(&self) -> Option<(String, String)> {
        fn text<T: VarNumber>(n: &Numeric<T>) -> Option<(String, String)> {
            n.bounds.map(|(min, max)| (min.format(), max.format()))
        }
        match self {
            EntryValue::Int(n) => text(n),
            EntryValue::Int64(n) => text(n),
            EntryValue::Float(n) => text(n),
            EntryValue::None | EntryValue::Str(_) => None,
        }
    }
}

/// Help-only description of one action argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgSpec {
    /// Argument name, shown as `<name>`.
    pub name: String,
    /// Optional description, shown on its own line.
    pub description: String,
}

impl ArgSpec {
    /// Split `"name rest of description"` at the first space.
    pub fn parse(spec: &str) -> Self {
        match spec.split_once(' ') {
            Some((name, description)) => Self {
                name: name.to_string(),
                description: description.to_string(),
            },
            None => Self {
                name: spec.to_string(),
                description: String::new(),
            },
        }
    }
}

/// A registered console command or variable.
///
/// # Examples
///
/// ```
/// use dorito_console::core::{CommandEntry, CommandFlags, CommandKind};
///
/// let count = CommandEntry::int_var("sv_count", 4)
///     .short_name("count")
///     .description("Maximum player count")
///     .range(1u32, 8)
///     .flags(CommandFlags::ARCHIVED);
///
/// assert_eq!(count.kind(), CommandKind::IntVar);
/// assert_eq!(count.value_string(), "4");
/// ```
pub struct CommandEntry {
    name: String,
    short_name: String,
    description: String,
    module_name: String,
    flags: CommandFlags,
    arg_specs: Vec<ArgSpec>,
    value: EntryValue,
    value_string: String,
    handler: Option<UpdateHandler>,
}

impl CommandEntry {
    fn with_value(name: impl Into<String>, value: EntryValue) -> Self {
        let value_string = value.render();
        Self {
            name: name.into(),
            short_name: String::new(),
            description: String::new(),
            module_name: String::new(),
            flags: CommandFlags::NONE,
            arg_specs: Vec::new(),
            value,
            value_string,
            handler: None,
        }
    }

    /// Create an action. Actions always carry a handler.
    pub fn action<F>(name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&CommandArgs, &mut String) -> bool + Send + Sync + 'static,
    {
        let mut entry = Self::with_value(name, EntryValue::None);
        entry.handler = Some(Box::new(handler));
        entry
    }

    /// Create a string variable.
    pub fn string_var(name: impl Into<String>, default: impl Into<String>) -> Self {
        Self::with_value(name, EntryValue::Str(default.into()))
    }

    /// Create a 32-bit integer variable.
    pub fn int_var(name: impl Into<String>, default: u32) -> Self {
        Self::with_value(name, EntryValue::Int(Numeric::new(default)))
    }

    /// Create a 64-bit integer variable.
    pub fn int64_var(name: impl Into<String>, default: u64) -> Self {
        Self::with_value(name, EntryValue::Int64(Numeric::new(default)))
    }

    /// Create a float variable.
    pub fn float_var(name: impl Into<String>, default: f32) -> Self {
        Self::with_value(name, EntryValue::Float(Numeric::new(default)))
    }

    /// Set the secondary name.
    pub fn short_name(mut self, short_name: impl Into<String>) -> Self {
        self.short_name = short_name.into();
        self
    }

    /// Set the description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the module used to group help output.
    pub fn module(mut self, module_name: impl Into<String>) -> Self {
        self.module_name = module_name.into();
        self
    }

    /// Set the flags.
    pub fn flags(mut self, flags: CommandFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Append an argument spec, written as `"name description"`.
    pub fn arg(mut self, spec: &str) -> Self {
        self.arg_specs.push(ArgSpec::parse(spec));
        self
    }

    /// Restrict a numeric variable to the inclusive range `[min, max]`.
    ///
    /// Ignored (with a warning) when `T` does not match the variable's kind.
    pub fn range<T: VarNumber>(mut self, min: T, max: T) -> Self {
        match T::numeric_mut(&mut self.value) {
            Some(numeric) => numeric.bounds = Some((min, max)),
            None => warn!(
                "Console: range on '{}' ignored, it is a {} entry",
                self.name,
                self.kind().type_name()
            ),
        }
        self
    }

    /// Set the handler invoked after a successful change.
    pub fn on_update<F>(mut self, handler: F) -> Self
    where
        F: Fn(&CommandArgs, &mut String) -> bool + Send + Sync + 'static,
    {
        self.handler = Some(Box::new(handler));
        self
    }

    /// Primary name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Secondary name, possibly empty.
    #[inline]
    pub fn get_short_name(&self) -> &str {
        &self.short_name
    }

    /// Description.
    #[inline]
    pub fn get_description(&self) -> &str {
        &self.description
    }

    /// Module name, possibly empty.
    #[inline]
    pub fn module_name(&self) -> &str {
        &self.module_name
    }

    /// Entry kind.
    #[inline]
    pub fn kind(&self) -> CommandKind {
        self.value.kind()
    }

    /// Flags.
    #[inline]
    pub fn get_flags(&self) -> CommandFlags {
        self.flags
    }

    /// Check a single flag.
    #[inline]
    pub fn has_flag(&self, flag: CommandFlags) -> bool {
        self.flags.contains(flag)
    }

    /// Argument specs (actions only).
    #[inline]
    pub fn arg_specs(&self) -> &[ArgSpec] {
        &self.arg_specs
    }

    /// Typed storage.
    #[inline]
    pub fn value(&self) -> &EntryValue {
        &self.value
    }

    /// Canonical string of the current value. Empty for actions.
    #[inline]
    pub fn value_string(&self) -> &str {
        &self.value_string
    }

    /// Check if a handler is attached.
    #[inline]
    pub fn has_handler(&self) -> bool {
        self.handler.is_some()
    }

    /// Check if `name` matches the primary or secondary name, ignoring ASCII case.
    pub fn matches(&self, name: &str) -> bool {
        (!self.name.is_empty() && self.name.eq_ignore_ascii_case(name))
            || (!self.short_name.is_empty() && self.short_name.eq_ignore_ascii_case(name))
    }

    /// Current value of a string variable.
    pub fn as_string(&self) -> Option<&str> {
        match &self.value {
            EntryValue::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Current value of an int variable.
    pub fn as_int(&self) -> Option<u32> {
        match &self.value {
            EntryValue::Int(n) => Some(n.get()),
            _ => None,
        }
    }

    /// Current value of an int64 variable.
    pub fn as_int64(&self) -> Option<u64> {
        match &self.value {
            EntryValue::Int64(n) => Some(n.get()),
            _ => None,
        }
    }

    /// Current value of a float variable.
    pub fn as_float(&self) -> Option<f32> {
        match &self.value {
            EntryValue::Float(n) => Some(n.get()),
            _ => None,
        }
    }

    /// Invoke the handler, if any. Returns `None` when there is none.
    pub(crate) fn invoke(&self, args: &CommandArgs, output: &mut String) -> Option<bool> {
        self.handler.as_ref().map(|handler| handler(args, output))
    }

    /// Coerce `candidate` into the typed value and refresh the canonical string.
    ///
    /// Returns the previous canonical value. On error nothing is changed.
    pub(crate) fn assign(&mut self, candidate: &str, mode: Commit) -> Result<String, SetVariableError> {
        let previous = match &mut self.value {
            EntryValue::None => return Err(SetVariableError::NotFound),
            EntryValue::Str(current) => {
                let previous = std::mem::take(current);
                *current = if candidate.is_empty() { previous.clone() } else { candidate.to_string() };
                previous
            }
            EntryValue::Int(n) => n.assign(candidate, mode)?,
            EntryValue::Int64(n) => n.assign(candidate, mode)?,
            EntryValue::Float(n) => n.assign(candidate, mode)?,
        };
        self.value_string = self.value.render();
        Ok(previous)
    }

    /// Empty a string variable. No-op for other kinds.
    pub(crate) fn clear_string(&mut self) {
        if let EntryValue::Str(current) = &mut self.value {
            current.clear();
            self.value_string.clear();
        }
    }

    /// Inclusive bounds as canonical strings, for bounded numeric variables.
    pub fn bounds_text(&self) -> Option<(String, String)> {
        self.value.bounds_text()
    }
}

impl std::fmt::Debug for CommandEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandEntry")
            .field("name", &self.name)
            .field("short_name", &self.short_name)
            .field("kind", &self.kind())
            .field("flags", &self.flags)
            .field("value", &self.value_string)
            .finish_non_exhaustive()
    }
}

/// Renders the help listing line: `name[ value][ - description]`.
impl Display for CommandEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if self.kind().is_variable()
            && !self.has_flag(CommandFlags::OMIT_VALUE_IN_LIST)
            && !self.value_string.is_empty()
        {
            write!(f, " {}", self.value_string)?;
        }
        if !self.description.is_empty() {
            write!(f, " - {}", self.description)?;
        }
        Ok(())
    }
}
