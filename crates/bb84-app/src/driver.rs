//! Driver trait for abstracting I/O operations.
//!
//! The [`Driver`] trait decouples the application runtime from specific I/O
//! implementations. Each frontend implements the trait to provide
//! platform-specific I/O, while the generic [`crate::Runtime`] handles all
//! orchestration.

use std::{future::Future, time::Duration};

use bb84_client::{ApiError, types::FinalKeyResponse};
use bb84_core::{Basis, Bit, Qubit};

use crate::{App, AppEvent};

/// Abstracts I/O operations for the application runtime.
///
/// Implementations provide platform-specific I/O while the generic
/// [`Runtime`](crate::Runtime) handles orchestration logic. This ensures
/// the same orchestration code runs in production TUI and simulation.
///
/// # Implementations
///
/// - **TUI**: crossterm for terminal events, reqwest against the live backend
/// - **Simulation**: scripted events and a deterministic in-process backend
pub trait Driver: Send {
    /// Platform-specific error type.
    type Error: std::error::Error + Send + 'static;

    /// Poll for the next input event.
    ///
    /// Returns an event or `None` if no event is ready.
    fn poll_event(&mut self) -> impl Future<Output = Result<Option<AppEvent>, Self::Error>> + Send;

    /// Wait out one pacing delay, collecting any input that arrives.
    ///
    /// The transmission loop stays responsive through this: skip and quit
    /// keys pressed mid-flight come back here.
    fn pace(&mut self, delay: Duration) -> impl Future<Output = Vec<AppEvent>> + Send;

    /// Reset the backend's session state.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is unreachable or rejects the call.
    fn reset_backend(&mut self) -> impl Future<Output = Result<(), ApiError>> + Send;

    /// Hand one of Alice's qubits to the backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is unreachable or rejects the qubit.
    fn send_qubit(&mut self, qubit: &Qubit)
    -> impl Future<Output = Result<(), ApiError>> + Send;

    /// Have Eve intercept the qubit at `round`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is unreachable or rejects the call.
    fn eve_intercept(&mut self, round: usize)
    -> impl Future<Output = Result<(), ApiError>> + Send;

    /// Have Bob measure the qubit at `round` in `basis`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is unreachable or rejects the call.
    fn bob_measure(
        &mut self,
        round: usize,
        basis: Basis,
    ) -> impl Future<Output = Result<Bit, ApiError>> + Send;

    /// Run the public basis comparison and return the matching indices.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is unreachable or rejects the call.
    fn compare_bases(&mut self) -> impl Future<Output = Result<Vec<usize>, ApiError>> + Send;

    /// Derive the final key.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is unreachable or rejects the call.
    fn final_key(&mut self) -> impl Future<Output = Result<FinalKeyResponse, ApiError>> + Send;

    /// Fetch the overall circuit rendering, store it, and return its path.
    ///
    /// # Errors
    ///
    /// Returns an error if the fetch fails or the rendering cannot be stored.
    fn fetch_overall_circuit(
        &mut self,
        eve: bool,
    ) -> impl Future<Output = Result<String, ApiError>> + Send;

    /// Probe backend liveness.
    fn health(&mut self) -> impl Future<Output = bool> + Send;

    /// Render the application state.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering fails.
    fn render(&mut self, app: &App) -> Result<(), Self::Error>;

    /// Clean up resources.
    fn stop(&mut self);
}
