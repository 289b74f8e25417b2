use thiserror::Error;

#[derive(Debug, Error)]
pub enum GroupError {
    #[error("unknown group: {0}")]
    GroupNotFound(String),

    #[error("group ids must be non-empty")]
    InvalidGroupId,

    #[error("group {0} is not remotely managed")]
    NoEndpoint(String),

    #[error("membership query failed: {0}")]
    RequestFailed(String),

    #[error("membership endpoint returned garbage: {0}")]
    InvalidResponse(String),

    #[error("membership endpoint unreachable: {0}")]
    Unreachable(String),
}
