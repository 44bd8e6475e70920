//! Application layer for the BB84 visualizer.
//!
//! Pure state machine and generic runtime for protocol orchestration,
//! enabling deterministic simulation testing with the same code that runs in
//! production.
//!
//! # Components
//!
//! - [`App`]: protocol state machine (input handling, run transitions, chat)
//! - [`Driver`]: trait for platform-specific I/O and remote calls
//! - [`Runtime`]: generic orchestration loop using Driver

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod action;
mod app;
mod driver;
mod event;
mod input;
mod runtime;
mod state;

pub use action::{AppAction, RoundPlan};
pub use app::App;
pub use driver::Driver;
pub use event::{AppEvent, Operation};
pub use input::KeyInput;
pub use runtime::Runtime;
pub use state::BackendHealth;
