//! Ordered store of registered commands.

use tracing::{debug, warn};

use crate::handler::CommandHandler;

/// Registered command handlers in registration order.
///
/// Names are not unique: registering a name twice keeps both entries, and
/// [`lookup`](Self::lookup) always returns the first one.
#[derive(Debug, Default, Clone)]
pub struct CommandRegistry {
    handlers: Vec<CommandHandler>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    /// Appends a handler.
    pub fn register(&mut self, handler: CommandHandler) {
        if self.lookup(handler.name()).is_some() {
            warn!(
                command = handler.name(),
                "Command already registered, the new handler is unreachable"
            );
        }
        debug!(
            command = handler.name(),
            custom_only = handler.options().custom_only(),
            "Registered command"
        );
        self.handlers.push(handler);
    }

    /// Finds the first handler named `name`, ignoring case.
    pub fn lookup(&self, name: &str) -> Option<&CommandHandler> {
        let name = name.to_lowercase();
        self.handlers.iter().find(|h| h.name() == name)
    }

    /// Renders the usage listing for every command that takes `.name` syntax.
    pub fn usage_text(&self) -> String {
        let mut buf = String::from("Usage:\n");
        for handler in self.handlers.iter().filter(|h| !h.options().custom_only()) {
            buf.push('.');
            buf.push_str(handler.name());
            buf.push(' ');
            buf.push_str(handler.options().usage());
            buf.push('\n');
        }
        buf
    }

    /// Handlers that carry whole-message patterns, in registration order.
    pub fn pattern_handlers(&self) -> impl Iterator<Item = &CommandHandler> {
        self.handlers
            .iter()
            .filter(|h| !h.options().match_messages().is_empty())
    }

    pub fn iter(&self) -> impl Iterator<Item = &CommandHandler> {
        self.handlers.iter()
    }

    /// Returns the number of registered handlers.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::CommandOptions;

    fn noop(name: &str, options: CommandOptions) -> CommandHandler {
        CommandHandler::new(name, |_| Ok(()), options)
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let mut registry = CommandRegistry::new();
        registry.register(noop("Help", CommandOptions::default()));

        assert!(registry.lookup("help").is_some());
        assert!(registry.lookup("HELP").is_some());
        assert!(registry.lookup("hel").is_none());
    }

    #[test]
    fn test_duplicate_name_first_wins() {
        let mut registry = CommandRegistry::new();
        registry.register(noop("say", CommandOptions::builder().build()));
        registry.register(noop(
            "say",
            CommandOptions::builder().required_args(5, "<lots>").build(),
        ));

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.lookup("say").unwrap().options().min_args(), None);
    }

    #[test]
    fn test_usage_excludes_custom_only_and_keeps_order() {
        let mut registry = CommandRegistry::new();
        registry.register(noop(
            "sayas",
            CommandOptions::builder()
                .required_args(3, "@user #channel <message>")
                .build(),
        ));
        registry.register(noop(
            "foodtruck",
            CommandOptions::builder()
                .match_msg("^Reminder: foodtruck")
                .match_msg_only(true)
                .build(),
        ));
        registry.register(noop("help", CommandOptions::default()));

        assert_eq!(
            registry.usage_text(),
            "Usage:\n.sayas @user #channel <message>\n.help \n"
        );
    }

    #[test]
    fn test_pattern_handlers() {
        let mut registry = CommandRegistry::new();
        registry.register(noop("plain", CommandOptions::default()));
        registry.register(noop(
            "hook",
            CommandOptions::builder().match_msg("hook").build(),
        ));

        let names: Vec<_> = registry.pattern_handlers().map(|h| h.name()).collect();
        assert_eq!(names, vec!["hook"]);
    }

    #[test]
    fn test_empty_registry() {
        let registry = CommandRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.usage_text(), "Usage:\n");
    }
}
