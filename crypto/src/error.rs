use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CryptoError {
    #[error("secret must be 32 bytes of hex: {0}")]
    InvalidSecret(String),
}
