use std::any::Any;
use thiserror::Error;

/// Why a probe failed. Always recovered inside the probe runner.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProbeError {
    #[error("Timed out after {budget_ms}ms")]
    Timeout { budget_ms: u64 },
    #[error("{0}")]
    Dependency(String),
    #[error("Unknown error")]
    Unknown,
}

impl ProbeError {
    /// Wraps any collaborator error, keeping only its message.
    pub fn dependency(error: impl std::fmt::Display) -> Self {
        Self::Dependency(error.to_string())
    }

    /// Converts a panic payload into an error. String payloads keep their text.
    #[must_use]
    pub fn from_panic(payload: &(dyn Any + Send)) -> Self {
        if let Some(message) = payload.downcast_ref::<&'static str>() {
            Self::Dependency((*message).to_string())
        } else if let Some(message) = payload.downcast_ref::<String>() {
            Self::Dependency(message.clone())
        } else {
            Self::Unknown
        }
    }
}

impl From<sqlx::Error> for ProbeError {
    fn from(error: sqlx::Error) -> Self {
        Self::dependency(error)
    }
}

impl From<reqwest::Error> for ProbeError {
    fn from(error: reqwest::Error) -> Self {
        Self::dependency(error)
    }
}

pub type Result<T> = std::result::Result<T, ProbeError>;
