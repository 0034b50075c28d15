//! Driver trait for abstracting I/O operations.
//!
//! The [`Driver`] trait decouples the application runtime from specific I/O
//! implementations. Each frontend implements the trait to provide
//! platform-specific I/O, while the generic [`crate::Runtime`] handles all
//! orchestration.

use std::future::Future;

use crate::{AppError, AppEvent, Snapshot};

/// Abstracts I/O operations for the application runtime.
///
/// Implementations provide platform-specific input and rendering while the
/// generic [`crate::Runtime`] handles timers and dispatch. Time comes from
/// the app's [`sparklink_core::Environment`], not from the driver.
pub trait Driver: Send {
    /// Platform-specific error type.
    type Error: std::error::Error + Send + 'static;

    /// Wait for the next user intent.
    ///
    /// Must be cancel-safe: the runtime drops this future whenever a timer
    /// becomes due and polls again afterwards. Returns `Ok(None)` when input
    /// is exhausted and the run should end.
    fn poll_event(&mut self) -> impl Future<Output = Result<Option<AppEvent>, Self::Error>> + Send;

    /// Render the application state.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering fails.
    fn render(&mut self, snapshot: &Snapshot) -> Result<(), Self::Error>;

    /// Show a rejected intent to the user.
    ///
    /// # Errors
    ///
    /// Returns an error if the report cannot be written.
    fn report_error(&mut self, error: &AppError) -> Result<(), Self::Error>;
}
