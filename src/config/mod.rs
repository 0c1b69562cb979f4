//! Configuration module for the unity build generator
//!
//! Provides types and parsing for `unity.toml` project configuration.

pub mod loader;
pub mod schema;

pub use loader::{default_config, load_config, ConfigError};
pub use schema::*;
