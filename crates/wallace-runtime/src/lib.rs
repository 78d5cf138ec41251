//! Wallace Runtime - the process around the command engine.
//!
//! This crate provides:
//! - Configuration loading (`WallaceConfig`, `ConfigLoader`)
//! - Logging setup driven by that configuration
//! - Inbound transports and the channel-backed outbound sink
//! - The receive loop (`WallaceRuntime`) with signal and token shutdown
//!
//! ```ignore
//! use wallace_runtime::{WallaceRuntime, channel_outbound};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut runtime = WallaceRuntime::new();
//!     runtime.register("ping", |event| Ok(event.reply("pong")?), Default::default());
//!
//!     let (sender, transport) = runtime.inbound_channel();
//!     let (outbound, mut replies) = channel_outbound();
//!     // hand `sender` to the chat connection and drain `replies` into it
//!
//!     runtime.run(transport, &outbound).await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod runtime;
pub mod transport;

// Re-exports
pub use config::{BotConfig, ConfigError, ConfigLoader, ConfigResult, Profile, WallaceConfig};
pub use error::{RuntimeError, RuntimeResult};
pub use logging::LoggingBuilder;
pub use runtime::{RuntimeBuilder, RuntimeStats, WallaceRuntime};
pub use transport::{
    ChannelOutbound, ChannelTransport, InboundSender, StreamTransport, Transport,
    channel_outbound, channel_transport,
};

// Re-export tracing for use by other crates
pub use tracing;
pub use tracing_subscriber;
pub use tokio_util::sync::CancellationToken;

/// Prelude module for convenient imports.
///
/// Provides the logging macros plus the runtime entry points.
pub mod prelude {
    pub use super::{WallaceRuntime, channel_outbound};
    pub use tracing::{Level, debug, error, info, instrument, span, trace, warn};
}
