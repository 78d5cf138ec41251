//! Logging setup built on `tracing-subscriber`.
//!
//! The subscriber is driven by [`LoggingConfig`]: a base level (overridden
//! by `RUST_LOG`), per-module filters, a line format and a destination.
//!
//! ```rust,ignore
//! use wallace_runtime::logging::LoggingBuilder;
//!
//! LoggingBuilder::from_config(&config.logging)
//!     .directive("wallace_core=trace")
//!     .init();
//! ```

use tracing::warn;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::filter::Directive;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::prelude::*;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::{LogFormat, LogOutput, LogRotation, LoggingConfig, SpanEventConfig};

/// Initializes logging from a [`LoggingConfig`].
///
/// Does nothing if a global subscriber is already installed.
pub fn init_from_config(config: &LoggingConfig) {
    let _ = LoggingBuilder::from_config(config).try_init();
}

/// Installs the global subscriber described by a [`LoggingConfig`].
#[derive(Debug, Clone, Default)]
pub struct LoggingBuilder {
    config: LoggingConfig,
    directives: Vec<String>,
}

impl LoggingBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from `config`, turning its `filters` table into directives
    /// sorted by module name.
    pub fn from_config(config: &LoggingConfig) -> Self {
        let mut filters: Vec<_> = config.filters.iter().collect();
        filters.sort_by(|a, b| a.0.cmp(b.0));

        Self {
            config: config.clone(),
            directives: filters
                .into_iter()
                .map(|(module, level)| format!("{module}={level}"))
                .collect(),
        }
    }

    /// Adds a filter directive such as `wallace_core=trace`.
    pub fn directive(mut self, directive: impl Into<String>) -> Self {
        self.directives.push(directive.into());
        self
    }

    /// The directives that will be applied, in order.
    pub fn directives(&self) -> &[String] {
        &self.directives
    }

    /// Initializes the logging system, ignoring a second initialization.
    pub fn init(self) {
        let _ = self.try_init();
    }

    /// Tries to initialize the logging system.
    pub fn try_init(self) -> Result<(), TryInitError> {
        let filter = self.build_filter();
        let spans = fmt_span(&self.config.span_events);
        let thread_ids = self.config.thread_ids;
        let location = self.config.file_location;

        macro_rules! install {
            ($writer:expr) => {{
                let layer = fmt::layer()
                    .with_writer($writer)
                    .with_span_events(spans)
                    .with_thread_ids(thread_ids)
                    .with_file(location)
                    .with_line_number(location);
                let registry = tracing_subscriber::registry().with(filter);
                match self.config.format {
                    LogFormat::Compact => registry.with(layer.compact()).try_init(),
                    LogFormat::Pretty => registry.with(layer.pretty()).try_init(),
                    #[cfg(feature = "json-log")]
                    LogFormat::Json => registry.with(layer.json()).try_init(),
                    // Without `json-log`, JSON falls back to the full format
                    _ => registry.with(layer).try_init(),
                }
            }};
        }

        match self.config.output {
            LogOutput::Stdout => install!(std::io::stdout),
            LogOutput::Stderr => install!(std::io::stderr),
            LogOutput::File => match self.file_appender() {
                Some(appender) => install!(appender),
                None => {
                    let result = install!(std::io::stdout);
                    warn!("File output requested but no usable file path, falling back to stdout");
                    result
                }
            },
        }
    }

    fn build_filter(&self) -> EnvFilter {
        // RUST_LOG wins over the configured level
        let mut filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.config.level.as_str()));

        for directive in &self.directives {
            match directive.parse::<Directive>() {
                Ok(d) => filter = filter.add_directive(d),
                Err(e) => eprintln!("Ignoring invalid log directive '{directive}': {e}"),
            }
        }

        filter
    }

    fn file_appender(&self) -> Option<RollingFileAppender> {
        let path = self.config.file_path.as_ref()?;
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| std::path::Path::new("."));
        let prefix = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("wallace.log");
        let rotation = match self.config.rotation {
            LogRotation::Never => Rotation::NEVER,
            LogRotation::Hourly => Rotation::HOURLY,
            LogRotation::Daily => Rotation::DAILY,
        };

        RollingFileAppender::builder()
            .rotation(rotation)
            .filename_prefix(prefix)
            .max_log_files(self.config.max_files.max(1) as usize)
            .build(dir)
            .map_err(|e| eprintln!("Failed to open log file {}: {e}", path.display()))
            .ok()
    }
}

fn fmt_span(events: &SpanEventConfig) -> FmtSpan {
    [
        (events.new, FmtSpan::NEW),
        (events.enter, FmtSpan::ENTER),
        (events.exit, FmtSpan::EXIT),
        (events.close, FmtSpan::CLOSE),
    ]
    .into_iter()
    .filter(|(enabled, _)| *enabled)
    .fold(FmtSpan::NONE, |acc, (_, span)| acc | span)
}
