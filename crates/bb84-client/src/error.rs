//! Client error taxonomy.
//!
//! Three failure classes, kept distinct because they produce different user
//! messaging: the backend never answered, the backend answered with a
//! structured error, or the backend answered something we cannot read.

use thiserror::Error;

/// Errors from talking to the BB84 backend.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// No response received (connectivity, DNS, timeout).
    #[error("no response from backend: {0}")]
    Network(String),

    /// Non-2xx response with the backend's own diagnostic.
    #[error("backend error ({status}): {detail}")]
    Server {
        /// HTTP status code.
        status: u16,
        /// `detail`/`message` field of the error body, or a fallback.
        detail: String,
    },

    /// 2xx response whose body did not match the expected shape.
    #[error("malformed backend response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Whether the failure was at the network level (nothing received).
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network(_))
    }

    /// Message suitable for the status bar.
    pub fn user_message(&self) -> String {
        match self {
            Self::Network(_) => {
                "Unable to reach the BB84 backend. Check the server address and your connection."
                    .to_string()
            },
            Self::Server { detail, .. } => detail.clone(),
            Self::Decode(_) => "The backend sent an unexpected response.".to_string(),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            Self::Server { status: status.as_u16(), detail: err.to_string() }
        } else {
            Self::Network(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn network_errors_get_connectivity_messaging() {
        let err = ApiError::Network("connection refused".into());
        assert!(err.is_network());
        assert!(err.user_message().contains("Unable to reach"));
    }

    #[test]
    fn server_errors_surface_backend_detail() {
        let err = ApiError::Server { status: 400, detail: "no qubits sent yet".into() };
        assert!(!err.is_network());
        assert_eq!(err.user_message(), "no qubits sent yet");
    }
}
