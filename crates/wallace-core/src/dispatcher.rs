//! Message dispatcher.
//!
//! [`Dispatcher::dispatch`] handles one inbound message to completion:
//!
//! 1. Handlers with whole-message patterns are tried in registration order;
//!    the first pattern match invokes its handler with no arguments and ends
//!    dispatch.
//! 2. Otherwise the text is scanned as a `.command` (see [`crate::scanner`]).
//! 3. The resolved handler is checked for `custom_only`, channel patterns and
//!    the minimum argument count, in that order. A missing argument sends
//!    `Usage: .<cmd> <usage>` back to the channel; every other failure is
//!    silent.
//!
//! ```rust,ignore
//! use wallace_core::{CommandOptions, Dispatcher, InboundMessage, MemoryOutbound};
//!
//! let mut dispatcher = Dispatcher::new();
//! dispatcher.register(
//!     "say",
//!     |event| {
//!         event.outbound().send_message(&event.args()[0], &event.args()[1])?;
//!         Ok(())
//!     },
//!     CommandOptions::builder()
//!         .required_args(2, "#channel <message>")
//!         .capture_after(1)
//!         .build(),
//! );
//!
//! let outbound = MemoryOutbound::new();
//! dispatcher.dispatch(&InboundMessage::new("D1", ".say C2 hello there"), &outbound);
//! ```

use tracing::{Level, debug, error, span, trace, warn};

use crate::error::HandlerResult;
use crate::handler::{CommandEvent, CommandHandler};
use crate::message::InboundMessage;
use crate::options::CommandOptions;
use crate::outbound::Outbound;
use crate::registry::CommandRegistry;
use crate::scanner::{COMMAND_MARKER, Scan, scan};

/// Why a message produced no invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Skip {
    /// The text does not start with the command marker.
    NotACommand,
    /// No handler is registered under the name.
    UnknownCommand,
    /// The handler only fires on message patterns.
    CustomOnly,
    /// The handler is not available on the originating channel.
    ChannelMismatch,
}

/// How an invoked handler was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// A whole-message pattern matched.
    Pattern,
    /// A `.command` was parsed.
    Command,
}

/// Outcome of dispatching one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// Nothing was invoked and nothing was sent.
    Ignored(Skip),
    /// Too few arguments; the usage message was sent instead.
    UsageViolation {
        command: String,
        message: String,
    },
    /// The handler callback ran.
    Invoked {
        command: String,
        route: Route,
    },
}

impl Dispatch {
    pub fn is_invoked(&self) -> bool {
        matches!(self, Self::Invoked { .. })
    }
}

/// Routes inbound messages to registered commands.
///
/// Handlers are registered before dispatching starts; dispatch itself only
/// needs `&self` and holds no locks.
#[derive(Default, Clone)]
pub struct Dispatcher {
    registry: CommandRegistry,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self {
            registry: CommandRegistry::new(),
        }
    }

    /// Creates a dispatcher over an existing registry.
    pub fn with_registry(registry: CommandRegistry) -> Self {
        Self { registry }
    }

    /// Registers a command.
    pub fn register<F>(
        &mut self,
        name: impl Into<String>,
        callback: F,
        options: CommandOptions,
    ) -> &mut Self
    where
        F: Fn(CommandEvent<'_>) -> HandlerResult + Send + Sync + 'static,
    {
        self.registry
            .register(CommandHandler::new(name, callback, options));
        self
    }

    /// Registers a pre-built handler.
    pub fn register_handler(&mut self, handler: CommandHandler) -> &mut Self {
        self.registry.register(handler);
        self
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    /// Returns the number of registered commands.
    pub fn command_count(&self) -> usize {
        self.registry.len()
    }

    /// Dispatches one message.
    pub fn dispatch(&self, message: &InboundMessage, outbound: &dyn Outbound) -> Dispatch {
        let span = span!(Level::DEBUG, "dispatch", channel = %message.channel);
        let _enter = span.enter();

        if let Some(handler) = self
            .registry
            .pattern_handlers()
            .find(|h| h.options().matches_message(&message.text))
        {
            debug!(command = handler.name(), "Message pattern matched");
            self.invoke(handler, message, Vec::new(), outbound);
            return Dispatch::Invoked {
                command: handler.name().to_string(),
                route: Route::Pattern,
            };
        }

        let (handler, args) = match scan(&message.text, &self.registry) {
            Scan::NotACommand => return Dispatch::Ignored(Skip::NotACommand),
            Scan::UnknownCommand(name) => {
                trace!(command = %name, "Unknown command");
                return Dispatch::Ignored(Skip::UnknownCommand);
            }
            Scan::Parsed { handler, args } => (handler, args),
        };

        let options = handler.options();

        if options.custom_only() {
            trace!(command = handler.name(), "Command only fires on message patterns");
            return Dispatch::Ignored(Skip::CustomOnly);
        }

        if !options.allows_channel(&message.channel) {
            debug!(command = handler.name(), "Command not available on channel");
            return Dispatch::Ignored(Skip::ChannelMismatch);
        }

        if let Some(min) = options.min_args()
            && args.len() < min
        {
            let usage = format!("Usage: {COMMAND_MARKER}{} {}", handler.name(), options.usage());
            debug!(
                command = handler.name(),
                got = args.len(),
                required = min,
                "Too few arguments"
            );
            if let Err(e) = outbound.send_message(&message.channel, &usage) {
                warn!(command = handler.name(), error = %e, "Failed to send usage message");
            }
            return Dispatch::UsageViolation {
                command: handler.name().to_string(),
                message: usage,
            };
        }

        debug!(command = handler.name(), arg_count = args.len(), "Invoking command");
        self.invoke(handler, message, args, outbound);
        Dispatch::Invoked {
            command: handler.name().to_string(),
            route: Route::Command,
        }
    }

    fn invoke(
        &self,
        handler: &CommandHandler,
        message: &InboundMessage,
        args: Vec<String>,
        outbound: &dyn Outbound,
    ) {
        let event = CommandEvent::new(message, args, outbound, &self.registry);
        if let Err(e) = handler.execute(event) {
            error!(command = handler.name(), error = %e, "Command handler failed");
        }
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("command_count", &self.registry.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{OutboundError, OutboundResult};
    use crate::message::{OutboundMessage, PostMessage};
    use crate::outbound::MemoryOutbound;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use parking_lot::Mutex;

    type Calls = Arc<Mutex<Vec<Vec<String>>>>;

    fn recording(dispatcher: &mut Dispatcher, name: &str, options: CommandOptions) -> Calls {
        let calls: Calls = Arc::default();
        let sink = Arc::clone(&calls);
        dispatcher.register(
            name,
            move |event| {
                sink.lock().push(event.into_args());
                Ok(())
            },
            options,
        );
        calls
    }

    fn msg(channel: &str, text: &str) -> InboundMessage {
        InboundMessage::new(channel, text)
    }

    #[test]
    fn test_non_command_text_is_ignored() {
        let mut dispatcher = Dispatcher::new();
        let calls = recording(&mut dispatcher, "cmd", CommandOptions::default());
        let outbound = MemoryOutbound::new();

        for text in ["hello", "  x .cmd", "", "?cmd a"] {
            let outcome = dispatcher.dispatch(&msg("C1", text), &outbound);
            assert_eq!(outcome, Dispatch::Ignored(Skip::NotACommand));
        }
        assert!(calls.lock().is_empty());
        assert!(outbound.is_empty());
    }

    #[test]
    fn test_unknown_command_is_silent() {
        let dispatcher = Dispatcher::new();
        let outbound = MemoryOutbound::new();
        let outcome = dispatcher.dispatch(&msg("C1", ".missing a"), &outbound);
        assert_eq!(outcome, Dispatch::Ignored(Skip::UnknownCommand));
        assert!(outbound.is_empty());
    }

    #[test]
    fn test_min_args_usage_violation() {
        let mut dispatcher = Dispatcher::new();
        let calls = recording(
            &mut dispatcher,
            "cmd",
            CommandOptions::builder().required_args(2, "<a> <b>").build(),
        );
        let outbound = MemoryOutbound::new();

        let outcome = dispatcher.dispatch(&msg("C1", ".cmd a"), &outbound);
        assert_eq!(
            outcome,
            Dispatch::UsageViolation {
                command: "cmd".into(),
                message: "Usage: .cmd <a> <b>".into(),
            }
        );
        assert!(calls.lock().is_empty());
        assert_eq!(
            outbound.take(),
            vec![OutboundMessage::Text {
                channel: "C1".into(),
                text: "Usage: .cmd <a> <b>".into(),
            }]
        );

        let outcome = dispatcher.dispatch(&msg("C1", ".cmd a b"), &outbound);
        assert!(outcome.is_invoked());
        assert_eq!(*calls.lock(), vec![vec!["a".to_string(), "b".to_string()]]);
        assert!(outbound.is_empty());
    }

    #[test]
    fn test_quoted_arguments_reach_handler() {
        let mut dispatcher = Dispatcher::new();
        let calls = recording(&mut dispatcher, "cmd", CommandOptions::default());
        let outbound = MemoryOutbound::new();

        dispatcher.dispatch(&msg("C1", r#".cmd "hello world" b"#), &outbound);
        assert_eq!(calls.lock()[0], vec!["hello world", "b"]);
    }

    #[test]
    fn test_capture_after_reaches_handler() {
        let mut dispatcher = Dispatcher::new();
        let calls = recording(
            &mut dispatcher,
            "cmd",
            CommandOptions::builder().capture_after(1).build(),
        );
        let outbound = MemoryOutbound::new();

        dispatcher.dispatch(&msg("C1", ".cmd x rest of the line here"), &outbound);
        assert_eq!(calls.lock()[0], vec!["x", "rest of the line here"]);
    }

    #[test]
    fn test_channel_matching() {
        let mut dispatcher = Dispatcher::new();
        let calls = recording(
            &mut dispatcher,
            "cmd",
            CommandOptions::builder().match_channel("^D").build(),
        );
        let outbound = MemoryOutbound::new();

        let outcome = dispatcher.dispatch(&msg("C123", ".cmd a"), &outbound);
        assert_eq!(outcome, Dispatch::Ignored(Skip::ChannelMismatch));
        assert!(calls.lock().is_empty());

        let outcome = dispatcher.dispatch(&msg("D456", ".cmd a"), &outbound);
        assert!(outcome.is_invoked());
        assert_eq!(calls.lock().len(), 1);
    }

    #[test]
    fn test_channel_checked_before_usage() {
        let mut dispatcher = Dispatcher::new();
        recording(
            &mut dispatcher,
            "cmd",
            CommandOptions::builder()
                .match_channel("^D")
                .required_args(1, "<x>")
                .build(),
        );
        let outbound = MemoryOutbound::new();

        let outcome = dispatcher.dispatch(&msg("C1", ".cmd"), &outbound);
        assert_eq!(outcome, Dispatch::Ignored(Skip::ChannelMismatch));
        assert!(outbound.is_empty());
    }

    #[test]
    fn test_message_pattern_short_circuits() {
        let mut dispatcher = Dispatcher::new();
        let first = recording(
            &mut dispatcher,
            "first",
            CommandOptions::builder().match_msg("lunch").build(),
        );
        let second = recording(
            &mut dispatcher,
            "second",
            CommandOptions::builder().match_msg("lunch").build(),
        );
        let command = recording(&mut dispatcher, "lunch", CommandOptions::default());
        let outbound = MemoryOutbound::new();

        let outcome = dispatcher.dispatch(&msg("C1", ".lunch time"), &outbound);
        assert_eq!(
            outcome,
            Dispatch::Invoked {
                command: "first".into(),
                route: Route::Pattern,
            }
        );
        assert_eq!(*first.lock(), vec![Vec::<String>::new()]);
        assert!(second.lock().is_empty());
        assert!(command.lock().is_empty());
    }

    #[test]
    fn test_message_pattern_ignores_marker_and_channel() {
        let mut dispatcher = Dispatcher::new();
        let calls = recording(
            &mut dispatcher,
            "foodtruck",
            CommandOptions::builder()
                .match_channel("^C")
                .match_msg("^Reminder: foodtruck")
                .build(),
        );
        let outbound = MemoryOutbound::new();

        let outcome = dispatcher.dispatch(&msg("D1", "Reminder: foodtruck"), &outbound);
        assert!(outcome.is_invoked());
        assert_eq!(calls.lock().len(), 1);
    }

    #[test]
    fn test_custom_only_not_dispatched_as_command() {
        let mut dispatcher = Dispatcher::new();
        let calls = recording(
            &mut dispatcher,
            "hook",
            CommandOptions::builder()
                .match_msg("^never$")
                .match_msg_only(true)
                .build(),
        );
        let outbound = MemoryOutbound::new();

        let outcome = dispatcher.dispatch(&msg("C1", ".hook"), &outbound);
        assert_eq!(outcome, Dispatch::Ignored(Skip::CustomOnly));
        assert!(calls.lock().is_empty());
    }

    #[test]
    fn test_handler_error_still_counts_as_invoked() {
        let counter = Arc::new(AtomicUsize::new(0));
        let counter_clone = Arc::clone(&counter);

        let mut dispatcher = Dispatcher::new();
        dispatcher.register(
            "fail",
            move |_| {
                counter_clone.fetch_add(1, Ordering::SeqCst);
                Err("boom".into())
            },
            CommandOptions::default(),
        );

        let outcome = dispatcher.dispatch(&msg("C1", ".fail"), &MemoryOutbound::new());
        assert!(outcome.is_invoked());
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_handler_sees_registry() {
        let mut dispatcher = Dispatcher::new();
        dispatcher.register(
            "help",
            |event| {
                event.reply(&event.registry().usage_text())?;
                Ok(())
            },
            CommandOptions::default(),
        );
        let outbound = MemoryOutbound::new();

        dispatcher.dispatch(&msg("D1", ".HELP"), &outbound);
        assert_eq!(outbound.take()[0].text(), "Usage:\n.help \n");
    }

    struct ClosedOutbound;

    impl Outbound for ClosedOutbound {
        fn send_message(&self, _channel: &str, _text: &str) -> OutboundResult<()> {
            Err(OutboundError::NotConnected)
        }

        fn post_message(&self, _channel: &str, _post: PostMessage) -> OutboundResult<()> {
            Err(OutboundError::SendFailed("channel archived".into()))
        }
    }

    #[test]
    fn test_usage_violation_survives_failed_reply() {
        let mut dispatcher = Dispatcher::new();
        let calls = recording(
            &mut dispatcher,
            "cmd",
            CommandOptions::builder().required_args(1, "<x>").build(),
        );

        let outcome = dispatcher.dispatch(&msg("C1", ".cmd"), &ClosedOutbound);
        assert_eq!(
            outcome,
            Dispatch::UsageViolation {
                command: "cmd".into(),
                message: "Usage: .cmd <x>".into(),
            }
        );
        assert!(calls.lock().is_empty());
    }
}
