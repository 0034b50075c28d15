//! Terminal shell for SparkLink
//!
//! A thin line-based [`sparklink_app::Driver`] over stdin and stdout. All
//! orchestration lives in the generic [`sparklink_app::Runtime`]; this crate
//! only parses commands and prints state.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod cli;
pub mod commands;
pub mod terminal;
pub mod ui;

pub use cli::{Args, CliError, run};
pub use commands::Command;
pub use sparklink_app::{App, AppAction, AppEvent, Driver, Runtime};
pub use terminal::{TerminalDriver, TerminalError};
