//! Configuration system for termdeck.
//!
//! This crate provides configuration loading, saving, and default values
//! for the multiplexer core. It includes:
//!
//! - The `Config` struct and its YAML persistence
//! - Default values for every field
//! - Typed `ConfigError` variants for load/save/validation failures
//! - The `LogLevel` setting shared with the logging bridge

pub mod config;
pub mod defaults;
mod error;
mod types;

pub use config::Config;
pub use error::ConfigError;
pub use types::LogLevel;
