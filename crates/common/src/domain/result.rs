use thiserror::Error;

pub type BridgeResult<T> = Result<T, BridgeError>;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Malformed message: {0}")]
    MalformedMessage(String),

    #[error("Invalid nodeinfo payload: {0}")]
    InvalidNodeInfo(String),

    #[error("Write sink error: {0}")]
    WriteSink(#[source] anyhow::Error),

    #[error("Repository error: {0}")]
    Repository(#[from] anyhow::Error),
}
