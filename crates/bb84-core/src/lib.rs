//! Domain model for the BB84 visualizer.
//!
//! Pure state and primitives shared by every layer: qubit types, the
//! [`ProtocolRun`] session state machine, the append-only [`ChatLog`],
//! transient [`Photon`] tokens, and the seedable [`Entropy`] abstraction.
//! No I/O lives here; the protocol math itself is the remote backend's job.

#![forbid(unsafe_code)]

pub mod chat;
pub mod env;
pub mod photon;
pub mod qubit;
pub mod run;

pub use chat::{ChatLog, ChatMessage, Sender};
pub use env::{Entropy, ScriptedEntropy, StdEntropy};
pub use photon::{Photon, PhotonField};
pub use qubit::{Basis, Bit, Qubit};
pub use run::{Mode, ProtocolRun, SECURITY_THRESHOLD, Speed, Step};
