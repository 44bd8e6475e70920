//! HTTP client for the remote BB84 protocol backend.
//!
//! The backend owns all protocol math; this crate only speaks its REST
//! dialect: typed endpoints ([`Bb84Api`]), wire DTOs ([`types`]), and the
//! three-way error taxonomy ([`ApiError`]) that drives user messaging.

#![forbid(unsafe_code)]

mod api;
mod error;
pub mod types;

pub use api::Bb84Api;
pub use error::ApiError;
