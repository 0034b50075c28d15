//! Actions produced by the App state machine for the runtime to execute.

use std::time::Duration;

use sparklink_core::Timer;

/// Actions produced by the App state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppAction {
    /// Deliver `timer` back to the app as [`crate::AppEvent::TimerFired`]
    /// after `delay`.
    ScheduleTimer {
        /// Delay from now.
        delay: Duration,
        /// Payload to deliver.
        timer: Timer,
    },

    /// Render the UI.
    Render,

    /// Quit the application.
    Quit,
}
