//! # Wallace
//!
//! A chat bot built around dot-prefixed commands.
//!
//! ## Overview
//!
//! A message such as `.sayas @alice #general hello all` is scanned into a
//! command name and arguments, checked against the command's options, and
//! handed to its callback. Commands can also fire on whole-message regular
//! expressions, without the leading dot.
//!
//! ```text
//! ┌─────────────┐     ┌────────────┐     ┌──────────────┐
//! │  Transport  │────▶│  Runtime   │────▶│  Dispatcher  │──▶ handler ──▶ Outbound
//! │  (inbound)  │     │  (loop)    │     │  (scan+check)│
//! └─────────────┘     └────────────┘     └──────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use wallace::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut runtime = WallaceRuntime::new();
//!     runtime.register(
//!         "say",
//!         |event| Ok(event.reply(&event.args().join(" "))?),
//!         CommandOptions::builder()
//!             .capture_after(0)
//!             .required_args(1, "<message>")
//!             .build(),
//!     );
//!
//!     let (sender, transport) = runtime.inbound_channel();
//!     let (outbound, replies) = channel_outbound();
//!     runtime.run(transport, &outbound).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - `toml-config`: load `wallace.toml` (default)
//! - `yaml-config`: load `wallace.yaml`
//! - `json-log`: JSON log output

pub use wallace_core as core;
pub use wallace_runtime as runtime;

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use wallace::prelude::*;
/// ```
pub mod prelude {
    // Runtime
    pub use wallace_runtime::{
        RuntimeStats, Transport, WallaceConfig, WallaceRuntime, channel_outbound,
        channel_transport,
    };

    // Commands
    pub use wallace_core::{
        Attachment, AttachmentField, CommandEvent, CommandOptions, Dispatch, Dispatcher,
        HandlerResult, InboundMessage, Outbound, OutboundMessage, PostMessage,
    };

    // Logging
    pub use wallace_runtime::tracing::{debug, error, info, trace, warn};
}
