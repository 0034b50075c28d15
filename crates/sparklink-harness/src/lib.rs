//! Deterministic simulation harness for SparkLink engine testing.
//!
//! Virtual-time implementations of the Environment trait plus a reference
//! model, so the engine can be exercised for arbitrary intent and timer
//! interleavings without sleeping.
//!
//! - [`SimEnv`]: virtual clock and seeded RNG
//! - [`Simulation`]: an [`sparklink_app::App`] with its timer queue, advanced
//!   on the virtual clock
//! - [`ModelWorld`]: reference model the real engine is compared against

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod model;
pub mod sim_env;
pub mod simulation;

pub use model::{ModelState, ModelWorld, Operation, OperationError, OperationResult, TextKind};
pub use sim_env::SimEnv;
pub use simulation::Simulation;
