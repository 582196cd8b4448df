//! Arguments handed to entry handlers.

use super::CommandRegistry;

/// Arguments passed to an [`UpdateHandler`](super::UpdateHandler).
///
/// Besides the positional arguments, handlers get a read-only view of the
/// registry. It is a shared borrow, so a handler cannot re-enter the
/// execution pipeline while a change is in flight.
#[derive(Clone, Copy)]
pub struct CommandArgs<'a> {
    /// The raw command line, empty for the startup pass.
    raw: &'a str,
    /// Parsed arguments (excluding the entry name).
    args: &'a [String],
    registry: &'a CommandRegistry,
}

impl<'a> CommandArgs<'a> {
    /// Create new command args.
    pub fn new(raw: &'a str, args: &'a [String], registry: &'a CommandRegistry) -> Self {
        Self { raw, args, registry }
    }

    /// Get the raw command string.
    #[inline]
    pub fn raw(&self) -> &'a str {
        self.raw
    }

    /// Get the registry the entry belongs to.
    #[inline]
    pub fn registry(&self) -> &'a CommandRegistry {
        self.registry
    }

    /// Get the number of arguments.
    #[inline]
    pub fn len(&self) -> usize {
        self.args.len()
    }

    /// Check if there are no arguments.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    /// Get an argument by index.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&'a str> {
        self.args.get(index).map(String::as_str)
    }

    /// Try to parse an argument as a specific type.
    pub fn parse<T: std::str::FromStr>(&self, index: usize) -> Option<T> {
        self.get(index).and_then(|s| s.parse().ok())
    }

    /// Parse an argument with a default value.
    pub fn parse_or<T: std::str::FromStr>(&self, index: usize, default: T) -> T {
        self.parse(index).unwrap_or(default)
    }

    /// Get all arguments as a slice.
    #[inline]
    pub fn as_slice(&self) -> &'a [String] {
        self.args
    }

    /// Iterate over arguments.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &'a str> + 'a {
        self.args.iter().map(String::as_str)
    }

    /// Join all arguments with a separator.
    pub fn join(&self, separator: &str) -> String {
        self.args.join(separator)
    }

    /// Join arguments starting from an index.
    pub fn join_from(&self, start: usize, separator: &str) -> String {
        self.args.get(start..).unwrap_or(&[]).join(separator)
    }
}

impl std::ops::Index<usize> for CommandArgs<'_> {
    type Output = str;

    fn index(&self, index: usize) -> &Self::Output {
        &self.args[index]
    }
}

impl std::fmt::Debug for CommandArgs<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandArgs")
            .field("raw", &self.raw)
            .field("args", &self.args)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owned(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_command_args_basic() {
        let registry = CommandRegistry::new();
        let argv = owned(&["hello", "world"]);
        let args = CommandArgs::new("echo hello world", &argv, &registry);

        assert_eq!(args.len(), 2);
        assert_eq!(args.get(0), Some("hello"));
        assert_eq!(&args[1], "world");
        assert_eq!(args.get(2), None);
        assert_eq!(args.raw(), "echo hello world");
    }

    #[test]
    fn test_command_args_parse() {
        let registry = CommandRegistry::new();
        let argv = owned(&["42"]);
        let args = CommandArgs::new("set 42", &argv, &registry);

        assert_eq!(args.parse::<i32>(0), Some(42));
        assert_eq!(args.parse::<i32>(1), None);
        assert_eq!(args.parse_or::<i32>(1, 0), 0);
    }

    #[test]
    fn test_command_args_join() {
        let registry = CommandRegistry::new();
        let argv = owned(&["hello", "world"]);
        let args = CommandArgs::new("echo hello world", &argv, &registry);

        assert_eq!(args.join(" "), "hello world");
        assert_eq!(args.join_from(1, " "), "world");
        assert_eq!(args.join_from(5, " "), "");
    }
}
