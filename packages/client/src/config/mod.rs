//! Configuration
//!
//! Plain configuration structs with `Default` values and named presets.

pub mod connector;

pub use connector::ConnectorConfig;
