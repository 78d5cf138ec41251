//! Inbound transports and the channel-backed outbound sink.
//!
//! A [`Transport`] yields inbound chat messages one at a time until it is
//! exhausted. The runtime pairs it with an [`Outbound`] for replies.
//!
//! ```rust,ignore
//! let (sender, transport) = channel_transport(64);
//! let (outbound, mut replies) = channel_outbound();
//!
//! sender.send(InboundMessage::new("C1", ".help")).await?;
//! ```

use async_trait::async_trait;
use futures::{Stream, StreamExt};
use tokio::sync::mpsc;
use tracing::trace;
use wallace_core::{
    InboundMessage, Outbound, OutboundError, OutboundMessage, OutboundResult, PostMessage,
};

/// A source of inbound chat messages.
#[async_trait]
pub trait Transport: Send {
    /// Waits for the next message. `None` means the transport is closed.
    async fn recv(&mut self) -> Option<InboundMessage>;
}

// =============================================================================
// Channel transport
// =============================================================================

/// Creates a bounded inbound channel and the transport reading from it.
pub fn channel_transport(buffer: usize) -> (InboundSender, ChannelTransport) {
    let (tx, rx) = mpsc::channel(buffer.max(1));
    (InboundSender { tx }, ChannelTransport { rx })
}

/// The write half of a [`ChannelTransport`].
#[derive(Debug, Clone)]
pub struct InboundSender {
    tx: mpsc::Sender<InboundMessage>,
}

impl InboundSender {
    /// Queues a message, waiting while the channel is full.
    ///
    /// Returns the message back if the runtime has gone away.
    pub async fn send(&self, message: InboundMessage) -> Result<(), InboundMessage> {
        self.tx.send(message).await.map_err(|e| e.0)
    }

    /// Queues a message from outside the async runtime, blocking while the
    /// channel is full.
    ///
    /// Panics if called from within an async context.
    pub fn blocking_send(&self, message: InboundMessage) -> Result<(), InboundMessage> {
        self.tx.blocking_send(message).map_err(|e| e.0)
    }

    /// Returns true once the receiving transport has been dropped.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// A transport fed through an [`InboundSender`].
///
/// Closes once every sender has been dropped and the queue is drained.
#[derive(Debug)]
pub struct ChannelTransport {
    rx: mpsc::Receiver<InboundMessage>,
}

#[async_trait]
impl Transport for ChannelTransport {
    async fn recv(&mut self) -> Option<InboundMessage> {
        self.rx.recv().await
    }
}

// =============================================================================
// Stream transport
// =============================================================================

/// Adapts any stream of messages into a [`Transport`].
pub struct StreamTransport<S> {
    stream: S,
}

impl<S> StreamTransport<S>
where
    S: Stream<Item = InboundMessage> + Send + Unpin,
{
    pub fn new(stream: S) -> Self {
        Self { stream }
    }
}

#[async_trait]
impl<S> Transport for StreamTransport<S>
where
    S: Stream<Item = InboundMessage> + Send + Unpin,
{
    async fn recv(&mut self) -> Option<InboundMessage> {
        self.stream.next().await
    }
}

// =============================================================================
// Channel outbound
// =============================================================================

/// An [`Outbound`] that forwards every message into an unbounded channel.
///
/// Sending never blocks, so handlers stay synchronous while a separate task
/// delivers replies to the chat service.
#[derive(Debug, Clone)]
pub struct ChannelOutbound {
    tx: mpsc::UnboundedSender<OutboundMessage>,
}

/// Creates an outbound sink and the receiver that drains it.
pub fn channel_outbound() -> (ChannelOutbound, mpsc::UnboundedReceiver<OutboundMessage>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ChannelOutbound { tx }, rx)
}

impl ChannelOutbound {
    fn forward(&self, message: OutboundMessage) -> OutboundResult<()> {
        trace!(channel = %message.channel(), "Forwarding outbound message");
        self.tx
            .send(message)
            .map_err(|_| OutboundError::NotConnected)
    }
}

impl Outbound for ChannelOutbound {
    fn send_message(&self, channel: &str, text: &str) -> OutboundResult<()> {
        self.forward(OutboundMessage::Text {
            channel: channel.to_string(),
            text: text.to_string(),
        })
    }

    fn post_message(&self, channel: &str, post: PostMessage) -> OutboundResult<()> {
        self.forward(OutboundMessage::Post {
            channel: channel.to_string(),
            post,
        })
    }
}
