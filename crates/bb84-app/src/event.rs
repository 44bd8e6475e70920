//! Application input events.
//!
//! This module defines [`AppEvent`], the comprehensive set of inputs that
//! drive the [`crate::App`] state machine.
//!
//! Events originate from two distinct sources:
//! - User interactions (keyboard, resize) and periodic ticks.
//! - Completions of remote calls, translated by the runtime.

use bb84_client::ApiError;
use bb84_core::{Basis, Bit, Qubit};

use crate::KeyInput;

/// Remote operation that an [`AppEvent::RemoteFailed`] aborts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Backend reset during prepare.
    Prepare,
    /// Per-round transmission loop.
    Send,
    /// Public basis comparison.
    Compare,
    /// Key derivation.
    GenerateKey,
    /// Circuit visualization fetch.
    Visualize,
}

impl Operation {
    /// Human-readable operation name.
    pub fn label(self) -> &'static str {
        match self {
            Self::Prepare => "prepare",
            Self::Send => "send",
            Self::Compare => "compare bases",
            Self::GenerateKey => "generate key",
            Self::Visualize => "visualize",
        }
    }
}

/// Events processed by the App state machine.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// Keyboard input.
    Key(KeyInput),

    /// Periodic tick.
    Tick,

    /// Terminal resize (columns, rows).
    Resize(u16, u16),

    /// Liveness probe finished.
    HealthProbed {
        /// Backend answered.
        healthy: bool,
    },

    /// Backend reset succeeded; commit the generated run.
    RunPrepared {
        /// Alice's qubits.
        qubits: Vec<Qubit>,
        /// Bob's bases.
        bases: Vec<Basis>,
    },

    /// Alice's qubit for `round` is on the wire.
    RoundSent {
        /// Round index.
        round: usize,
    },

    /// Eve intercepted `round`.
    RoundIntercepted {
        /// Round index.
        round: usize,
    },

    /// Bob measured `round`.
    RoundMeasured {
        /// Round index.
        round: usize,
        /// Measured bit.
        measured: Bit,
    },

    /// Every round has been transmitted and measured.
    TransmissionFinished,

    /// Backend reported the sifted indices.
    BasesCompared {
        /// Matching-basis indices, echoed verbatim.
        matching_indices: Vec<usize>,
    },

    /// Backend derived the final key (or aborted).
    KeyGenerated {
        /// Shared key; `None` when the backend aborted.
        shared_key: Option<String>,
        /// Error rate as a percentage.
        error_rate_percent: f64,
        /// Abort reason, if any.
        msg: Option<String>,
    },

    /// Overall circuit rendering was written to disk.
    CircuitSaved {
        /// Path of the written file.
        path: String,
    },

    /// A remote call failed; the operation is aborted.
    RemoteFailed {
        /// Which operation was in flight.
        operation: Operation,
        /// The failure.
        error: ApiError,
    },
}
