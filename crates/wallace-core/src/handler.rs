//! Registered commands and the event passed to their callbacks.

use std::sync::Arc;

use crate::error::{HandlerResult, OutboundResult};
use crate::message::{InboundMessage, PostMessage};
use crate::options::CommandOptions;
use crate::outbound::Outbound;
use crate::registry::CommandRegistry;

/// A type-erased command callback.
pub type CommandCallback = Arc<dyn Fn(CommandEvent<'_>) -> HandlerResult + Send + Sync>;

/// Everything a callback gets for one invocation.
pub struct CommandEvent<'a> {
    source: &'a InboundMessage,
    args: Vec<String>,
    outbound: &'a dyn Outbound,
    registry: &'a CommandRegistry,
}

impl<'a> CommandEvent<'a> {
    pub(crate) fn new(
        source: &'a InboundMessage,
        args: Vec<String>,
        outbound: &'a dyn Outbound,
        registry: &'a CommandRegistry,
    ) -> Self {
        Self {
            source,
            args,
            outbound,
            registry,
        }
    }

    /// The message that triggered the command.
    pub fn source(&self) -> &InboundMessage {
        self.source
    }

    /// Channel the triggering message arrived on.
    pub fn channel(&self) -> &str {
        &self.source.channel
    }

    /// Parsed arguments. Empty for message-pattern invocations.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Returns the argument at `index`, if present.
    pub fn arg(&self, index: usize) -> Option<&str> {
        self.args.get(index).map(String::as_str)
    }

    pub fn into_args(self) -> Vec<String> {
        self.args
    }

    /// The outbound messaging capability.
    pub fn outbound(&self) -> &dyn Outbound {
        self.outbound
    }

    /// All registered commands, for handlers that list them.
    pub fn registry(&self) -> &CommandRegistry {
        self.registry
    }

    /// Sends plain text back to the originating channel.
    pub fn reply(&self, text: &str) -> OutboundResult<()> {
        self.outbound.send_message(&self.source.channel, text)
    }

    /// Posts a rich message to the originating channel.
    pub fn reply_post(&self, post: PostMessage) -> OutboundResult<()> {
        self.outbound.post_message(&self.source.channel, post)
    }
}

impl std::fmt::Debug for CommandEvent<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandEvent")
            .field("source", &self.source)
            .field("args", &self.args)
            .finish_non_exhaustive()
    }
}

/// A named command: callback plus options.
#[derive(Clone)]
pub struct CommandHandler {
    name: String,
    callback: CommandCallback,
    options: Arc<CommandOptions>,
}

impl CommandHandler {
    /// Creates a handler. The name is stored lowercased.
    pub fn new<F>(name: impl Into<String>, callback: F, options: CommandOptions) -> Self
    where
        F: Fn(CommandEvent<'_>) -> HandlerResult + Send + Sync + 'static,
    {
        Self {
            name: name.into().to_lowercase(),
            callback: Arc::new(callback),
            options: Arc::new(options),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn options(&self) -> &CommandOptions {
        &self.options
    }

    /// Runs the callback.
    pub fn execute(&self, event: CommandEvent<'_>) -> HandlerResult {
        (self.callback)(event)
    }
}

impl std::fmt::Debug for CommandHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandHandler")
            .field("name", &self.name)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
