//! Error types for the Wallace core.
//!
//! Malformed invocations are not errors here: they surface as
//! [`Dispatch::Ignored`](crate::Dispatch::Ignored) outcomes. The types below
//! cover configuration-time problems, outbound delivery, and handler failures.

use thiserror::Error;

// =============================================================================
// Options Errors
// =============================================================================

/// Which pattern list a rejected regex was destined for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternTarget {
    /// A channel identifier pattern (`match_channel`).
    Channel,
    /// A whole-message pattern (`match_msg`).
    Message,
}

impl std::fmt::Display for PatternTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Channel => f.write_str("channel"),
            Self::Message => f.write_str("message"),
        }
    }
}

/// Problems recorded while building [`CommandOptions`](crate::CommandOptions).
///
/// `build()` reports these and falls back to a safe configuration;
/// `try_build()` returns the first one instead.
#[derive(Debug, Clone, Error)]
pub enum OptionsError {
    /// A match pattern failed to compile and was skipped.
    #[error("invalid {target} pattern '{pattern}': {source}")]
    InvalidPattern {
        /// The list the pattern was meant for.
        target: PatternTarget,
        /// The pattern as written.
        pattern: String,
        /// The compile error.
        #[source]
        source: regex::Error,
    },

    /// Argument options were combined with message matching.
    #[error(
        "command requires arguments and cannot have message matching, this feature will be disabled"
    )]
    ConflictingMatchers,
}

// =============================================================================
// Outbound Errors
// =============================================================================

/// Errors raised by an [`Outbound`](crate::Outbound) implementation.
///
/// The in-tree sinks only ever fail with `NotConnected`. `SendFailed` and
/// `Other` are for chat API clients living outside this crate, e.g. a
/// rejected post or a rate limit.
#[derive(Debug, Clone, Error)]
pub enum OutboundError {
    /// The transport is not connected.
    #[error("transport is not connected")]
    NotConnected,

    /// The service rejected or dropped the message.
    #[error("failed to send message: {0}")]
    SendFailed(String),

    /// Any other transport failure.
    #[error("{0}")]
    Other(String),
}

// =============================================================================
// Handler Errors
// =============================================================================

/// Error type returned by command callbacks.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for option building.
pub type OptionsResult<T> = Result<T, OptionsError>;

/// Result type for outbound operations.
pub type OutboundResult<T> = Result<T, OutboundError>;

/// Result type for command callbacks.
pub type HandlerResult = Result<(), HandlerError>;
