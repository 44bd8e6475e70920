//! Terminal UI for the BB84 visualizer
//!
//! A thin shell over [`bb84_app::Driver`] that provides terminal-specific
//! I/O. All orchestration logic lives in the generic [`bb84_app::Runtime`].
//!
//! This crate only handles terminal rendering and the HTTP transport.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod terminal;
pub mod ui;

pub use bb84_app::{App, AppAction, AppEvent, Driver, KeyInput, Runtime};
pub use terminal::{TerminalDriver, TerminalError};
