//! Configuration management
//!
//! Loads the `[postgres]` namespace from a TOML configuration source.

pub mod settings;

pub use settings::PostgresConfig;
