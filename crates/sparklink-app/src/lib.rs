//! Application layer for SparkLink
//!
//! The application-session root that owns the discovery session and the
//! chat session, plus a generic runtime that drives it against any frontend.
//! The same [`App`] runs under the terminal shell and under deterministic
//! simulation.
//!
//! # Components
//!
//! - [`App`]: Session root (intents in, actions and notifications out)
//! - [`AppEvent`] / [`AppAction`]: Inbound events and outbound actions
//! - [`StateChange`] / [`Snapshot`]: Observer notifications and full state
//! - [`Driver`]: Trait for platform-specific I/O abstraction
//! - [`Runtime`]: Generic orchestration loop using Driver
//! - [`SystemEnv`]: Production environment on tokio time

mod action;
mod app;
mod driver;
mod error;
mod event;
mod runtime;
mod state;
mod system_env;

pub use action::AppAction;
pub use app::{App, SubscriptionId};
pub use driver::Driver;
pub use error::AppError;
pub use event::AppEvent;
pub use runtime::Runtime;
pub use state::{ChatView, Snapshot, StateChange};
pub use system_env::SystemEnv;
