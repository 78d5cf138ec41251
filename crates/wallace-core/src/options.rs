//! Per-command configuration and its builder.
//!
//! ```rust,ignore
//! use wallace_core::CommandOptions;
//!
//! let options = CommandOptions::builder()
//!     .required_args(2, "#channel <message>")
//!     .capture_after(1)
//!     .match_channel("^D")
//!     .build();
//! ```
//!
//! Argument-based commands and whole-message pattern commands are mutually
//! exclusive. When both are configured, `build()` keeps the argument options
//! and drops the message matching.

use regex::Regex;
use tracing::warn;

use crate::error::{OptionsError, OptionsResult, PatternTarget};

/// Immutable configuration attached to a registered command.
#[derive(Debug, Clone)]
pub struct CommandOptions {
    capture_after: Option<usize>,
    quotes_enabled: bool,
    min_args: Option<usize>,
    usage: String,
    match_channels: Vec<Regex>,
    match_messages: Vec<Regex>,
    custom_only: bool,
}

impl Default for CommandOptions {
    fn default() -> Self {
        Self {
            capture_after: None,
            quotes_enabled: true,
            min_args: None,
            usage: String::new(),
            match_channels: Vec::new(),
            match_messages: Vec::new(),
            custom_only: false,
        }
    }
}

impl CommandOptions {
    /// Starts a new builder with default options.
    pub fn builder() -> CommandOptionsBuilder {
        CommandOptionsBuilder::new()
    }

    /// Number of completed arguments after which the rest of the line is
    /// captured verbatim as one final argument.
    pub fn capture_after(&self) -> Option<usize> {
        self.capture_after
    }

    pub fn quotes_enabled(&self) -> bool {
        self.quotes_enabled
    }

    pub fn min_args(&self) -> Option<usize> {
        self.min_args
    }

    pub fn usage(&self) -> &str {
        &self.usage
    }

    pub fn match_channels(&self) -> &[Regex] {
        &self.match_channels
    }

    pub fn match_messages(&self) -> &[Regex] {
        &self.match_messages
    }

    /// Whether the command is reachable only through message patterns.
    pub fn custom_only(&self) -> bool {
        self.custom_only
    }

    /// Returns `true` when `channel` is allowed by the channel patterns.
    ///
    /// An empty pattern list allows every channel.
    pub fn allows_channel(&self, channel: &str) -> bool {
        self.match_channels.is_empty() || self.match_channels.iter().any(|r| r.is_match(channel))
    }

    /// Returns `true` when any message pattern matches `text`.
    pub fn matches_message(&self, text: &str) -> bool {
        self.match_messages.iter().any(|r| r.is_match(text))
    }
}

/// Chainable builder for [`CommandOptions`].
///
/// Invalid patterns and conflicting settings never abort the chain; they are
/// logged, recorded in [`issues`](Self::issues), and repaired by
/// [`build`](Self::build). Use [`try_build`](Self::try_build) to treat them
/// as errors instead.
#[derive(Debug, Default)]
pub struct CommandOptionsBuilder {
    options: CommandOptions,
    issues: Vec<OptionsError>,
}

impl CommandOptionsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Captures all text after `after` completed arguments as one argument.
    pub fn capture_after(mut self, after: usize) -> Self {
        self.options.capture_after = Some(after);
        self
    }

    /// Enables or disables `"` quoting (default: enabled).
    pub fn quotes_enabled(mut self, enabled: bool) -> Self {
        self.options.quotes_enabled = enabled;
        self
    }

    /// Sets the minimum argument count and the usage shown when it is not met.
    pub fn required_args(mut self, min: usize, usage: impl Into<String>) -> Self {
        self.options.min_args = Some(min);
        self.options.usage = usage.into();
        self
    }

    /// Restricts the command to channels matching `pattern`.
    pub fn match_channel(mut self, pattern: &str) -> Self {
        if let Some(regex) = self.compile(PatternTarget::Channel, pattern) {
            self.options.match_channels.push(regex);
        }
        self
    }

    /// Fires the command whenever `pattern` matches a whole message.
    pub fn match_msg(mut self, pattern: &str) -> Self {
        if let Some(regex) = self.compile(PatternTarget::Message, pattern) {
            self.options.match_messages.push(regex);
        }
        self
    }

    /// Excludes the command from `.command` dispatch and the usage listing.
    pub fn match_msg_only(mut self, enabled: bool) -> Self {
        self.options.custom_only = enabled;
        self
    }

    /// Problems recorded so far.
    pub fn issues(&self) -> &[OptionsError] {
        &self.issues
    }

    /// Finalizes the options, repairing any conflict.
    pub fn build(self) -> CommandOptions {
        let (options, _) = self.finish();
        options
    }

    /// Finalizes the options, failing on the first recorded problem.
    pub fn try_build(self) -> OptionsResult<CommandOptions> {
        let (options, mut issues) = self.finish();
        if issues.is_empty() {
            Ok(options)
        } else {
            Err(issues.swap_remove(0))
        }
    }

    fn finish(mut self) -> (CommandOptions, Vec<OptionsError>) {
        let opts = &mut self.options;
        if opts.capture_after.is_some() || opts.min_args.is_some() {
            if opts.custom_only || !opts.match_messages.is_empty() {
                let err = OptionsError::ConflictingMatchers;
                warn!(usage = %opts.usage, "{err}");
                self.issues.push(err);
            }
            opts.match_messages.clear();
            opts.custom_only = false;
        }
        (self.options, self.issues)
    }

    fn compile(&mut self, target: PatternTarget, pattern: &str) -> Option<Regex> {
        match Regex::new(pattern) {
            Ok(regex) => Some(regex),
            Err(source) => {
                let err = OptionsError::InvalidPattern {
                    target,
                    pattern: pattern.to_string(),
                    source,
                };
                warn!("{err}");
                self.issues.push(err);
                None
            }
        }
    }
}
