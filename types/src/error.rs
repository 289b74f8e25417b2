use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypesError {
    #[error("invalid voter identity: {0}")]
    InvalidIdentity(String),

    #[error("invalid hex encoding: {0}")]
    InvalidHex(String),

    #[error("unknown token kind: {0}")]
    UnknownTokenKind(String),

    #[error("unknown vote choice: {0}")]
    UnknownChoice(String),
}
