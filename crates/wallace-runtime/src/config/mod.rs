//! Configuration module for the Wallace runtime.
//!
//! This module provides figment-based configuration loading and validation
//! for the bot identity, logging, and the inbound dispatch queue.

pub mod error;
pub mod loader;
pub mod schema;
pub mod validation;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigLoader, Profile};
pub use schema::{
    BotConfig, DispatchConfig, LogFormat, LogLevel, LogOutput, LogRotation, LoggingConfig,
    SpanEventConfig, WallaceConfig,
};
pub use validation::validate_config;
