//! # Wallace Core
//!
//! The command engine of the Wallace chat bot.
//!
//! Raw chat messages go in; registered command handlers come out. A message
//! is either matched whole against a handler's message patterns, or scanned
//! as a `.command` with arguments:
//!
//! ```text
//! ┌──────────────┐     ┌────────────┐     ┌─────────┐     ┌──────────┐
//! │ InboundMsg   │────▶│ Dispatcher │────▶│ Scanner │────▶│ Handler  │
//! │ (transport)  │     │  patterns  │     │  FSM    │     │ callback │
//! └──────────────┘     └────────────┘     └─────────┘     └──────────┘
//!                            │                                  │
//!                            └──── Usage: .cmd <usage> ────▶ Outbound
//! ```
//!
//! - [`CommandOptions`]: per-command capture, quoting, argument and match rules
//! - [`CommandRegistry`]: ordered handler store with case-insensitive lookup
//! - [`scanner`]: the tokenizer state machine
//! - [`Dispatcher`]: routing and validation, returning a [`Dispatch`] outcome
//!
//! The transport is external: it hands over [`InboundMessage`]s and provides
//! an [`Outbound`] implementation for replies.

pub mod dispatcher;
pub mod error;
pub mod handler;
pub mod message;
pub mod options;
pub mod outbound;
pub mod registry;
pub mod scanner;

pub use dispatcher::{Dispatch, Dispatcher, Route, Skip};
pub use error::{
    HandlerError, HandlerResult, OptionsError, OptionsResult, OutboundError, OutboundResult,
    PatternTarget,
};
pub use handler::{CommandCallback, CommandEvent, CommandHandler};
pub use message::{Attachment, AttachmentField, InboundMessage, OutboundMessage, PostMessage};
pub use options::{CommandOptions, CommandOptionsBuilder};
pub use outbound::{MemoryOutbound, Outbound};
pub use registry::CommandRegistry;
pub use scanner::{COMMAND_MARKER, QUOTE_CHAR, Scan, ScanState, Scanner};

/// Prelude for common imports.
pub mod prelude {
    pub use super::{
        CommandEvent, CommandOptions, Dispatch, Dispatcher, HandlerResult, InboundMessage,
        Outbound, PostMessage,
    };
}
