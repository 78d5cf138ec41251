//! Command tokenizer.
//!
//! A message is a command when its first non-whitespace character is
//! [`COMMAND_MARKER`]. The name runs up to the first whitespace and is
//! resolved against the registry immediately, because the resolved options
//! decide how the arguments are split:
//!
//! - arguments are whitespace separated, runs of whitespace produce no
//!   empty arguments
//! - with quoting enabled, [`QUOTE_CHAR`] toggles a quoted span and is
//!   dropped, so whitespace inside the span stays in the argument
//! - once `capture_after` arguments are complete, every remaining
//!   character, quotes and whitespace included, goes verbatim into one
//!   final argument
//!
//! ```text
//! AwaitingCommand --'.'--> ReadingCommand --ws + known name--> ReadingArgs
//!        |                        |
//!        +--other char--> NotACommand   +--ws + unknown name--> UnknownCommand
//! ```

use crate::handler::CommandHandler;
use crate::registry::CommandRegistry;

/// Leading character that marks a command.
pub const COMMAND_MARKER: char = '.';

/// Character that opens and closes a quoted argument.
pub const QUOTE_CHAR: char = '"';

/// Scanner position within a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    /// Skipping leading whitespace, waiting for the marker.
    AwaitingCommand,
    /// Accumulating the command name.
    ReadingCommand,
    /// Splitting arguments.
    ReadingArgs {
        /// An argument is open and will be pushed on the next separator.
        in_arg: bool,
        /// Inside a quoted span.
        quoted: bool,
        /// Past the capture boundary; everything is literal from here on.
        capturing: bool,
    },
}

impl ScanState {
    const ARGS_START: Self = Self::ReadingArgs {
        in_arg: false,
        quoted: false,
        capturing: false,
    };
}

/// Result of scanning one message.
#[derive(Debug)]
pub enum Scan<'r> {
    /// The text does not start with the command marker.
    NotACommand,
    /// The name did not resolve to a registered handler.
    UnknownCommand(String),
    /// A handler was resolved and its arguments split.
    Parsed {
        handler: &'r CommandHandler,
        args: Vec<String>,
    },
}

/// Character-at-a-time command scanner.
pub struct Scanner<'r> {
    registry: &'r CommandRegistry,
    state: ScanState,
    name: String,
    arg: String,
    args: Vec<String>,
    handler: Option<&'r CommandHandler>,
    capture_after: Option<usize>,
    quotes_enabled: bool,
}

impl<'r> Scanner<'r> {
    pub fn new(registry: &'r CommandRegistry) -> Self {
        Self {
            registry,
            state: ScanState::AwaitingCommand,
            name: String::new(),
            arg: String::new(),
            args: Vec::new(),
            handler: None,
            capture_after: None,
            quotes_enabled: true,
        }
    }

    pub fn state(&self) -> ScanState {
        self.state
    }

    /// Arguments completed so far.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Feeds one character. Returns `Some` when scanning ends early.
    pub fn feed(&mut self, ch: char) -> Option<Scan<'r>> {
        match self.state {
            ScanState::AwaitingCommand => {
                if ch == COMMAND_MARKER {
                    self.state = ScanState::ReadingCommand;
                } else if !ch.is_whitespace() {
                    return Some(Scan::NotACommand);
                }
            }
            ScanState::ReadingCommand => {
                if !ch.is_whitespace() {
                    self.name.push(ch);
                } else if let Some(handler) = self.registry.lookup(&self.name) {
                    self.resolve(handler);
                    self.state = ScanState::ARGS_START;
                } else {
                    return Some(Scan::UnknownCommand(std::mem::take(&mut self.name)));
                }
            }
            ScanState::ReadingArgs {
                in_arg,
                quoted,
                capturing,
            } => {
                self.state = self.read_arg(ch, in_arg, quoted, capturing);
            }
        }
        None
    }

    /// Ends the scan at the end of the text.
    pub fn finish(mut self) -> Scan<'r> {
        match self.state {
            ScanState::AwaitingCommand => Scan::NotACommand,
            ScanState::ReadingCommand => match self.registry.lookup(&self.name) {
                Some(handler) => Scan::Parsed {
                    handler,
                    args: self.args,
                },
                None => Scan::UnknownCommand(self.name),
            },
            ScanState::ReadingArgs { in_arg, .. } => {
                if in_arg {
                    self.args.push(self.arg);
                }
                match self.handler {
                    Some(handler) => Scan::Parsed {
                        handler,
                        args: self.args,
                    },
                    None => Scan::UnknownCommand(self.name),
                }
            }
        }
    }

    fn resolve(&mut self, handler: &'r CommandHandler) {
        self.capture_after = handler.options().capture_after();
        self.quotes_enabled = handler.options().quotes_enabled();
        self.handler = Some(handler);
    }

    fn read_arg(&mut self, ch: char, in_arg: bool, quoted: bool, capturing: bool) -> ScanState {
        let capturing = capturing || self.capture_after.is_some_and(|k| self.args.len() >= k);

        if capturing {
            self.arg.push(ch);
            return ScanState::ReadingArgs {
                in_arg: true,
                quoted,
                capturing,
            };
        }

        if !ch.is_whitespace() || quoted {
            if ch == QUOTE_CHAR && self.quotes_enabled {
                return ScanState::ReadingArgs {
                    in_arg: true,
                    quoted: !quoted,
                    capturing,
                };
            }
            self.arg.push(ch);
            ScanState::ReadingArgs {
                in_arg: true,
                quoted,
                capturing,
            }
        } else {
            if in_arg {
                self.args.push(std::mem::take(&mut self.arg));
            }
            ScanState::ReadingArgs {
                in_arg: false,
                quoted,
                capturing,
            }
        }
    }
}

/// Scans `text` against `registry`.
pub fn scan<'r>(text: &str, registry: &'r CommandRegistry) -> Scan<'r> {
    let mut scanner = Scanner::new(registry);
    for ch in text.chars() {
        if let Some(done) = scanner.feed(ch) {
            return done;
        }
    }
    scanner.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::CommandOptions;

    fn registry(entries: Vec<(&str, CommandOptions)>) -> CommandRegistry {
        let mut registry = CommandRegistry::new();
        for (name, options) in entries {
            registry.register(CommandHandler::new(name, |_| Ok(()), options));
        }
        registry
    }

    fn parsed(text: &str, registry: &CommandRegistry) -> (String, Vec<String>) {
        match scan(text, registry) {
            Scan::Parsed { handler, args } => (handler.name().to_string(), args),
            other => panic!("expected a parsed command, got {other:?}"),
        }
    }

    fn plain() -> CommandRegistry {
        registry(vec![("cmd", CommandOptions::default())])
    }

    #[test]
    fn test_not_a_command() {
        let registry = plain();
        assert!(matches!(scan("hello .cmd", &registry), Scan::NotACommand));
        assert!(matches!(scan("", &registry), Scan::NotACommand));
        assert!(matches!(scan("  \t ", &registry), Scan::NotACommand));
    }

    #[test]
    fn test_leading_whitespace_ignored() {
        let registry = plain();
        let (name, args) = parsed("   .cmd a", &registry);
        assert_eq!(name, "cmd");
        assert_eq!(args, vec!["a"]);
    }

    #[test]
    fn test_name_only() {
        let registry = plain();
        let (name, args) = parsed(".cmd", &registry);
        assert_eq!(name, "cmd");
        assert!(args.is_empty());
    }

    #[test]
    fn test_name_is_case_insensitive() {
        let registry = plain();
        let (name, _) = parsed(".CMD x", &registry);
        assert_eq!(name, "cmd");
    }

    #[test]
    fn test_unknown_command() {
        let registry = plain();
        match scan(".nope a b", &registry) {
            Scan::UnknownCommand(name) => assert_eq!(name, "nope"),
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(scan(".nope", &registry), Scan::UnknownCommand(_)));
        assert!(matches!(scan(". cmd", &registry), Scan::UnknownCommand(_)));
    }

    #[test]
    fn test_whitespace_runs_produce_no_empty_args() {
        let registry = plain();
        let (_, args) = parsed(".cmd  a \t b   ", &registry);
        assert_eq!(args, vec!["a", "b"]);
    }

    #[test]
    fn test_quoted_argument() {
        let registry = plain();
        let (_, args) = parsed(r#".cmd "hello world" b"#, &registry);
        assert_eq!(args, vec!["hello world", "b"]);
    }

    #[test]
    fn test_quote_inside_word_joins() {
        let registry = plain();
        let (_, args) = parsed(r#".cmd a"b c"d e"#, &registry);
        assert_eq!(args, vec!["ab cd", "e"]);
    }

    #[test]
    fn test_empty_quotes_make_empty_argument() {
        let registry = plain();
        let (_, args) = parsed(r#".cmd "" x"#, &registry);
        assert_eq!(args, vec!["", "x"]);
    }

    #[test]
    fn test_unterminated_quote_keeps_rest() {
        let registry = plain();
        let (_, args) = parsed(r#".cmd "a b  c"#, &registry);
        assert_eq!(args, vec!["a b  c"]);
    }

    #[test]
    fn test_quotes_disabled_are_literal() {
        let registry = registry(vec![(
            "cmd",
            CommandOptions::builder().quotes_enabled(false).build(),
        )]);
        let (_, args) = parsed(r#".cmd "hello world""#, &registry);
        assert_eq!(args, vec![r#""hello"#, r#"world""#]);
    }

    #[test]
    fn test_capture_after_one() {
        let registry = registry(vec![("cmd", CommandOptions::builder().capture_after(1).build())]);
        let (_, args) = parsed(r#".cmd x rest of the "line" here"#, &registry);
        assert_eq!(args, vec!["x", r#"rest of the "line" here"#]);
    }

    #[test]
    fn test_capture_keeps_extra_whitespace() {
        let registry = registry(vec![("cmd", CommandOptions::builder().capture_after(1).build())]);
        let (_, args) = parsed(".cmd x   spaced  out ", &registry);
        assert_eq!(args, vec!["x", "  spaced  out "]);
    }

    #[test]
    fn test_capture_after_zero_takes_everything() {
        let registry = registry(vec![("cmd", CommandOptions::builder().capture_after(0).build())]);
        let (_, args) = parsed(r#".cmd "a"  b"#, &registry);
        assert_eq!(args, vec![r#""a"  b"#]);
    }

    #[test]
    fn test_capture_after_quoted_argument() {
        let registry = registry(vec![("say", CommandOptions::builder().capture_after(1).build())]);
        let (_, args) = parsed(r##".say "#gen eral" hi "there""##, &registry);
        assert_eq!(args, vec!["#gen eral", r#"hi "there""#]);
    }

    #[test]
    fn test_capture_not_reached() {
        let registry = registry(vec![("cmd", CommandOptions::builder().capture_after(2).build())]);
        let (_, args) = parsed(".cmd a", &registry);
        assert_eq!(args, vec!["a"]);
    }

    #[test]
    fn test_state_transitions() {
        let registry = registry(vec![("c", CommandOptions::builder().capture_after(1).build())]);
        let mut scanner = Scanner::new(&registry);

        assert_eq!(scanner.state(), ScanState::AwaitingCommand);
        scanner.feed(' ');
        assert_eq!(scanner.state(), ScanState::AwaitingCommand);
        scanner.feed('.');
        assert_eq!(scanner.state(), ScanState::ReadingCommand);
        scanner.feed('c');
        scanner.feed(' ');
        assert_eq!(scanner.state(), ScanState::ARGS_START);

        scanner.feed('"');
        assert_eq!(
            scanner.state(),
            ScanState::ReadingArgs {
                in_arg: true,
                quoted: true,
                capturing: false
            }
        );
        scanner.feed('a');
        scanner.feed('"');
        scanner.feed(' ');
        assert_eq!(scanner.args(), ["a"]);

        scanner.feed('"');
        assert_eq!(
            scanner.state(),
            ScanState::ReadingArgs {
                in_arg: true,
                quoted: false,
                capturing: true
            }
        );

        match scanner.finish() {
            Scan::Parsed { args, .. } => assert_eq!(args, vec!["a", "\""]),
            other => panic!("unexpected {other:?}"),
        }
    }
}
