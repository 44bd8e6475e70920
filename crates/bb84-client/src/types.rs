//! Wire types for the backend's JSON API.
//!
//! Field names and shapes follow the backend verbatim; optional fields are
//! `#[serde(default)]` so older backend builds that omit them still parse.

use bb84_core::{Basis, Bit};
use serde::{Deserialize, Serialize};

/// Request body for `POST /bob/measure/{index}`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MeasureRequest {
    /// Basis Bob measures in.
    pub basis: Basis,
}

/// Bob's measurement outcome inside [`BobMeasureResponse`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BobResult {
    /// Basis the measurement was taken in.
    pub basis: Basis,
    /// Measured bit.
    pub measured: Bit,
}

/// Response of `POST /bob/measure/{index}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BobMeasureResponse {
    /// Backend narration, if any.
    #[serde(default)]
    pub msg: Option<String>,
    /// Round index the measurement belongs to.
    pub index: usize,
    /// The measurement outcome.
    pub bob_result: BobResult,
}

/// Response of `GET /compare-bases`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompareBasesResponse {
    /// Indices where Alice's and Bob's bases matched.
    pub matching_indices: Vec<usize>,
    /// Alice's sifted bits.
    #[serde(default)]
    pub alice_key: Vec<Bit>,
    /// Bob's sifted bits.
    #[serde(default)]
    pub bob_key: Vec<Bit>,
}

/// Response of `GET /final-key`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinalKeyResponse {
    /// Derived key; absent when the backend aborted on a high error rate.
    #[serde(default)]
    pub shared_key: Option<String>,
    /// Error rate as a percentage.
    pub error_rate: f64,
    /// Abort reason or narration, if any.
    #[serde(default)]
    pub msg: Option<String>,
}

/// Response of `GET /visualize/{who}/{index}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QubitVisualization {
    /// Circuit diagram, base64 PNG.
    pub circuit: String,
    /// Bloch sphere, base64 PNG.
    pub bloch: String,
}

/// Response of the overall-visualization endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverallVisualization {
    /// Rendered image, base64 PNG.
    pub img_base64: String,
}

/// Party addressed by the visualization endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actor {
    /// Alice's circuit view.
    Alice,
    /// Eve's circuit view.
    Eve,
    /// Bob's circuit view.
    Bob,
}

impl Actor {
    /// URL path segment for this actor.
    pub fn path_segment(self) -> &'static str {
        match self {
            Self::Alice => "alice",
            Self::Eve => "eve",
            Self::Bob => "bob",
        }
    }
}
