//! The outbound messaging capability handed to handlers.

use parking_lot::Mutex;

use crate::error::OutboundResult;
use crate::message::{OutboundMessage, PostMessage};

/// Sends messages back through the chat transport.
///
/// Implementations must not block for long: dispatch is synchronous and the
/// next inbound message waits until the current handler returns.
pub trait Outbound: Send + Sync {
    /// Sends plain text to a channel.
    fn send_message(&self, channel: &str, text: &str) -> OutboundResult<()>;

    /// Posts a rich message to a channel.
    fn post_message(&self, channel: &str, post: PostMessage) -> OutboundResult<()>;
}

/// An [`Outbound`] that keeps every message in memory.
///
/// Useful for tests and for embedding the dispatcher where replies are
/// collected and flushed by the caller.
#[derive(Debug, Default)]
pub struct MemoryOutbound {
    sent: Mutex<Vec<OutboundMessage>>,
}

impl MemoryOutbound {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of everything sent so far.
    pub fn messages(&self) -> Vec<OutboundMessage> {
        self.sent.lock().clone()
    }

    /// Removes and returns everything sent so far.
    pub fn take(&self) -> Vec<OutboundMessage> {
        std::mem::take(&mut *self.sent.lock())
    }

    pub fn is_empty(&self) -> bool {
        self.sent.lock().is_empty()
    }
}

impl Outbound for MemoryOutbound {
    fn send_message(&self, channel: &str, text: &str) -> OutboundResult<()> {
        self.sent.lock().push(OutboundMessage::Text {
            channel: channel.to_string(),
            text: text.to_string(),
        });
        Ok(())
    }

    fn post_message(&self, channel: &str, post: PostMessage) -> OutboundResult<()> {
        self.sent.lock().push(OutboundMessage::Post {
            channel: channel.to_string(),
            post,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_outbound_records_in_order() {
        let out = MemoryOutbound::new();
        out.send_message("C1", "first").unwrap();
        out.post_message("C2", PostMessage::new("second")).unwrap();

        let sent = out.take();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].text(), "first");
        assert_eq!(sent[1].channel(), "C2");
        assert!(out.is_empty());
    }
}
