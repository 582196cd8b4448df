//! Tokenizer for console command lines.
//!
//! Whitespace separates fields; double quotes make whitespace literal.
//! No external dependencies.

/// Result of tokenizing a command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenizedCommand {
    /// The entry name (first token).
    pub command: String,
    /// The arguments (remaining tokens).
    pub args: Vec<String>,
}

/// Tokenize error types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenizeError {
    /// The line held no tokens.
    EmptyInput,
}

impl std::fmt::Display for TokenizeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenizeError::EmptyInput => write!(f, "empty input"),
        }
    }
}

impl std::error::Error for TokenizeError {}

/// Tokenize a command line into entry name and arguments.
///
/// # Examples
///
/// ```
/// use dorito_console::core::tokenize;
///
/// let result = tokenize("sv_count 4").unwrap();
/// assert_eq!(result.command, "sv_count");
/// assert_eq!(result.args, vec!["4"]);
///
/// let result = tokenize(r#"say "hello world""#).unwrap();
/// assert_eq!(result.args, vec!["hello world"]);
///
/// assert!(tokenize("   ").is_err());
/// ```
pub fn tokenize(input: &str) -> Result<TokenizedCommand, TokenizeError> {
    let mut tokens = tokenize_string(input).into_iter();
    let command = tokens.next().ok_or(TokenizeError::EmptyInput)?;

    Ok(TokenizedCommand {
        command,
        args: tokens.collect(),
    })
}

/// Split a line into tokens.
///
/// # Syntax
///
/// - Fields are separated by runs of space, tab, CR or LF
/// - `"` toggles a quoted span in which whitespace is literal; the quote
///   itself is dropped and there are no escape sequences
/// - A quote at a field boundary starts a new token, even an empty one
///   (`""`); a quote inside a field continues it (`a"b c"d` is `ab cd`)
/// - An unterminated quote runs to the end of the input
///
/// An empty result means the line was blank.
pub fn tokenize_string(input: &str) -> Vec<String> {
    let mut tokens: Vec<String> = Vec::new();
    let mut in_quotes = false;
    let mut in_token = false;

    for c in input.chars() {
        if in_quotes {
            if c == '"' {
                in_quotes = false;
            } else if let Some(current) = tokens.last_mut() {
                current.push(c);
            }
            continue;
        }

        match c {
            ' ' | '\t' | '\r' | '\n' => in_token = false,
            '"' => {
                if !in_token {
                    tokens.push(String::new());
                    in_token = true;
                }
                in_quotes = true;
            }
            _ => {
                if !in_token {
                    tokens.push(String::new());
                    in_token = true;
                }
                if let Some(current) = tokens.last_mut() {
                    current.push(c);
                }
            }
        }
    }

    tokens
}

/// Iterate the non-blank lines of a batch, with their 0-based line index.
///
/// Blank lines are skipped but still counted.
pub fn split_lines(input: &str) -> impl Iterator<Item = (usize, &str)> {
    input
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
}
