//! The dispatch loop that connects a transport to the command dispatcher.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use wallace_runtime::{WallaceRuntime, channel_outbound};
//!
//! // Auto-loads wallace.toml from the current directory
//! let mut runtime = WallaceRuntime::new();
//! runtime.register("ping", |event| event.reply("pong").map_err(Into::into), Default::default());
//!
//! let (sender, transport) = runtime.inbound_channel();
//! let (outbound, replies) = channel_outbound();
//! let stats = runtime.run(transport, &outbound).await?;
//! ```

use std::future::Future;

use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace};
use wallace_core::{
    CommandEvent, CommandHandler, CommandOptions, Dispatch, Dispatcher, HandlerResult,
    InboundMessage, Outbound,
};

use crate::config::{ConfigLoader, ConfigResult, WallaceConfig};
use crate::error::{RuntimeError, RuntimeResult};
use crate::logging;
use crate::transport::{ChannelTransport, InboundSender, Transport, channel_transport};

/// Counters collected while the runtime loop is running.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RuntimeStats {
    /// Messages read from the transport.
    pub received: u64,
    /// Messages that ran a handler.
    pub invoked: u64,
    /// Messages answered with a usage line.
    pub usage_violations: u64,
    /// Messages that triggered nothing.
    pub ignored: u64,
}

impl RuntimeStats {
    fn record(&mut self, outcome: &Dispatch) {
        self.received += 1;
        match outcome {
            Dispatch::Invoked { .. } => self.invoked += 1,
            Dispatch::UsageViolation { .. } => self.usage_violations += 1,
            Dispatch::Ignored(_) => self.ignored += 1,
        }
    }
}

/// Owns the configuration and the dispatcher, and drives the receive loop.
///
/// Commands are registered before [`run`](Self::run) is called. Messages
/// are dispatched one at a time in the order the transport yields them.
pub struct WallaceRuntime {
    config: WallaceConfig,
    dispatcher: Dispatcher,
    shutdown: CancellationToken,
}

impl WallaceRuntime {
    /// Creates a runtime with automatic configuration loading.
    ///
    /// Falls back to defaults if no usable configuration is found.
    pub fn new() -> Self {
        let config = ConfigLoader::new()
            .with_current_dir()
            .with_user_config_dir()
            .load()
            .unwrap_or_else(|e| {
                eprintln!("Warning: Failed to load config ({e}), using defaults");
                WallaceConfig::default()
            });

        Self::from_config(config)
    }

    /// Creates a runtime builder for custom configuration.
    ///
    /// ```rust,ignore
    /// let runtime = WallaceRuntime::builder()
    ///     .config_file("config/wallace.toml")
    ///     .profile("production")
    ///     .build()?;
    /// ```
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Creates a runtime from an already loaded configuration.
    ///
    /// Initializes logging unless a subscriber is already installed.
    pub fn from_config(config: WallaceConfig) -> Self {
        logging::init_from_config(&config.logging);

        info!(
            bot = %config.bot.name,
            log_level = %config.logging.level,
            log_format = ?config.logging.format,
            "Runtime initialized from configuration"
        );

        Self {
            config,
            dispatcher: Dispatcher::new(),
            shutdown: CancellationToken::new(),
        }
    }

    pub fn config(&self) -> &WallaceConfig {
        &self.config
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
        self.dispatcher.register(name, callback, options);
        self
    }

    /// Registers a pre-built handler.
    pub fn register_handler(&mut self, handler: CommandHandler) -> &mut Self {
        self.dispatcher.register_handler(handler);
        self
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Mutable access for registering commands in bulk.
    pub fn dispatcher_mut(&mut self) -> &mut Dispatcher {
        &mut self.dispatcher
    }

    pub fn command_count(&self) -> usize {
        self.dispatcher.command_count()
    }

    /// A token that stops [`run`](Self::run) when cancelled.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Creates an inbound channel sized by `dispatch.queue_capacity`.
    pub fn inbound_channel(&self) -> (InboundSender, ChannelTransport) {
        channel_transport(self.config.dispatch.queue_capacity)
    }

    /// Dispatches a single message outside the loop.
    pub fn dispatch(&self, message: &InboundMessage, outbound: &dyn Outbound) -> Dispatch {
        self.dispatcher.dispatch(message, outbound)
    }

    /// Runs until the transport closes, the shutdown token is cancelled, or
    /// Ctrl+C / SIGTERM is received.
    pub async fn run<T>(
        &self,
        transport: T,
        outbound: &dyn Outbound,
    ) -> RuntimeResult<RuntimeStats>
    where
        T: Transport,
    {
        info!(
            commands = self.command_count(),
            "Wallace runtime is now running. Press Ctrl+C to stop."
        );
        self.run_loop(transport, outbound, wait_for_shutdown()).await
    }

    /// Runs with a custom shutdown future instead of process signals.
    pub async fn run_until<T, F>(
        &self,
        transport: T,
        outbound: &dyn Outbound,
        shutdown: F,
    ) -> RuntimeResult<RuntimeStats>
    where
        T: Transport,
        F: Future<Output = ()>,
    {
        self.run_loop(transport, outbound, async {
            shutdown.await;
            Ok(())
        })
        .await
    }

    async fn run_loop<T, F>(
        &self,
        mut transport: T,
        outbound: &dyn Outbound,
        shutdown: F,
    ) -> RuntimeResult<RuntimeStats>
    where
        T: Transport,
        F: Future<Output = RuntimeResult<()>>,
    {
        tokio::pin!(shutdown);
        let mut stats = RuntimeStats::default();

        loop {
            tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => {
                    info!("Shutdown requested");
                    break;
                }
                result = &mut shutdown => {
                    result?;
                    break;
                }
                message = transport.recv() => match message {
                    Some(message) => {
                        let outcome = self.dispatcher.dispatch(&message, outbound);
                        trace!(channel = %message.channel, outcome = ?outcome, "Message handled");
                        stats.record(&outcome);
                    }
                    None => {
                        debug!("Transport closed");
                        break;
                    }
                },
            }
        }

        info!(
            received = stats.received,
            invoked = stats.invoked,
            usage_violations = stats.usage_violations,
            ignored = stats.ignored,
            "Runtime stopped"
        );
        Ok(stats)
    }
}

impl Default for WallaceRuntime {
    fn default() -> Self {
        Self::new()
    }
}

/// Waits for Ctrl+C, or SIGTERM on unix.
async fn wait_for_shutdown() -> RuntimeResult<()> {
    #[cfg(unix)]
    {
        let mut sigterm = signal::unix::signal(signal::unix::SignalKind::terminate())
            .map_err(RuntimeError::Signal)?;

        tokio::select! {
            result = signal::ctrl_c() => {
                result.map_err(RuntimeError::Signal)?;
                info!("Received Ctrl+C, shutting down");
            }
            _ = sigterm.recv() => {
                info!("Received SIGTERM, shutting down");
            }
        }
    }

    #[cfg(not(unix))]
    {
        signal::ctrl_c().await.map_err(RuntimeError::Signal)?;
        info!("Received Ctrl+C, shutting down");
    }

    Ok(())
}

// =============================================================================
// RuntimeBuilder
// =============================================================================

/// Builder for creating a [`WallaceRuntime`] with custom configuration.
pub struct RuntimeBuilder {
    config_loader: ConfigLoader,
}

impl RuntimeBuilder {
    pub fn new() -> Self {
        Self {
            config_loader: ConfigLoader::new()
                .with_current_dir()
                .with_user_config_dir(),
        }
    }

    /// Sets a specific configuration file to load.
    pub fn config_file<P: AsRef<std::path::Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.file(path);
        self
    }

    /// Sets the configuration profile, e.g. "production".
    pub fn profile(mut self, profile: impl AsRef<str>) -> Self {
        self.config_loader = self.config_loader.profile(profile);
        self
    }

    /// Adds a search path for configuration files.
    pub fn search_path<P: AsRef<std::path::Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.search_path(path);
        self
    }

    pub fn with_env(mut self) -> Self {
        self.config_loader = self.config_loader.with_env();
        self
    }

    pub fn without_env(mut self) -> Self {
        self.config_loader = self.config_loader.without_env();
        self
    }

    /// Merges additional configuration programmatically.
    pub fn merge(mut self, config: WallaceConfig) -> Self {
        self.config_loader = self.config_loader.merge(config);
        self
    }

    pub fn build(self) -> ConfigResult<WallaceRuntime> {
        let config = self.config_loader.load()?;
        Ok(WallaceRuntime::from_config(config))
    }
}

impl Default for RuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}
