//! Application side-effects and intents.
//!
//! This module defines the [`AppAction`] enum, which represents instructions
//! produced by the [`crate::App`] state machine for the runtime to execute.
//! Remote calls never happen inside the state machine itself.

use bb84_core::{Basis, Qubit};

/// Everything the transmission loop needs to run one round.
///
/// Eve's interception decision is fixed here, before any remote call, as an
/// independent Bernoulli trial against the configured interception rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundPlan {
    /// Round index.
    pub round: usize,
    /// Alice's prepared qubit for this round.
    pub qubit: Qubit,
    /// Bob's measurement basis for this round.
    pub bob_basis: Basis,
    /// Whether Eve intercepts this round.
    pub intercept: bool,
}

/// Actions produced by the App state machine.
#[derive(Debug, Clone, PartialEq)]
pub enum AppAction {
    /// Render the UI.
    Render,

    /// Quit the application.
    Quit,

    /// Reset the backend, then commit the freshly generated run.
    Prepare {
        /// Alice's qubits for the new run.
        qubits: Vec<Qubit>,
        /// Bob's bases for the new run.
        bases: Vec<Basis>,
    },

    /// Run the sequential per-round transmission loop.
    Transmit {
        /// One entry per round, in order.
        plan: Vec<RoundPlan>,
    },

    /// Ask the backend for the sifted matching indices.
    CompareBases,

    /// Ask the backend for the shared key and error rate.
    GenerateKey,

    /// Fetch the run's overall circuit rendering and store it to disk.
    FetchOverallCircuit {
        /// Include Eve's wire in the rendering.
        eve: bool,
    },

    /// Probe backend liveness.
    ProbeHealth,
}
