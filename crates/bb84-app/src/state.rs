//! Observable application state types.
//!
//! Small view-model pieces that sit next to the protocol run: the backend
//! liveness indicator shown in the status bar. The run itself lives in
//! `bb84_core::ProtocolRun`.

/// Result of the last backend liveness probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendHealth {
    /// No probe has completed yet.
    Unknown,
    /// Backend answered the probe.
    Healthy,
    /// Probe failed.
    Unreachable,
}

impl BackendHealth {
    /// Status-bar label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Unknown => "probing...",
            Self::Healthy => "online",
            Self::Unreachable => "unreachable",
        }
    }
}
