// Error kinds for each step of the repricing flow. The orchestrator
// decides per kind whether a failure aborts the run or only the item.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid credentials ({status}): {body}")]
    InvalidCredentials { status: u16, body: String },

    #[error("login request failed: {0}")]
    TransportError(#[source] reqwest::Error),

    #[error("malformed login response: {0}")]
    ParseError(#[source] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("catalog fetch failed ({status}): {body}")]
    FetchFailed { status: u16, body: String },

    #[error("catalog request failed: {0}")]
    TransportError(#[source] reqwest::Error),

    #[error("malformed catalog response: {0}")]
    ParseError(#[source] serde_json::Error),
}

impl FetchError {
    /// A rejected fetch leaves the run going with nothing to update;
    /// transport and parse faults end it.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, FetchError::FetchFailed { .. })
    }
}

#[derive(Debug, Error)]
pub enum UpdateError {
    #[error("update rejected ({status}): {body}")]
    UpdateFailed { status: u16, body: String },

    #[error("update request failed: {0}")]
    TransportError(#[source] reqwest::Error),

    #[error("malformed update response: {0}")]
    ParseError(#[source] serde_json::Error),

    #[error("refusing to set invalid price {0}")]
    InvalidPrice(f64),
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("login failed: {0}")]
    Auth(#[from] AuthError),

    #[error("could not load products: {0}")]
    Fetch(#[from] FetchError),

    #[error("terminal interaction failed: {0}")]
    Console(#[from] std::io::Error),
}
