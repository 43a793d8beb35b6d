//! Fluent connection builder
//!
//! Describe the target, the proxy and the optional extras with method
//! chaining, then finish with one of the terminal methods.

pub mod auth;
pub mod core;
pub mod methods;
pub mod options;

pub use self::core::*;
pub use methods::*;
