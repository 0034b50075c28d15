//! Application errors.

use sparklink_core::{ConfigError, EngineError};
use thiserror::Error;

/// Errors surfaced by [`crate::App`].
///
/// None are fatal: the app keeps running and the presentation layer decides
/// how to show them.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AppError {
    /// An engine operation was rejected.
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// The configuration is invalid.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
}
