use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProofError {
    #[error("proof service request failed: {0}")]
    RequestFailed(String),

    #[error("proof service unreachable: {0}")]
    Unreachable(String),

    #[error("invalid response from proof service: {0}")]
    InvalidResponse(String),

    #[error("malformed proof: {0}")]
    Malformed(String),

    #[error("{0}")]
    Other(String),
}
