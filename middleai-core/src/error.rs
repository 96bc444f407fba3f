use thiserror::Error;

/// Core error type for the MiddleAI tracer.
/// Internally, modules can use `anyhow::Result<T>` for convenience,
/// but public boundaries should expose `CoreResult<T>` with this error.
#[derive(Debug, Error)]
pub enum MiddleAiError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("span exporter error: {0}")]
    Exporter(String),

    #[error("collector unreachable: {0}")]
    Transport(String),

    #[error("serialization failed: {0}")]
    Serialization(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type CoreResult<T> = std::result::Result<T, MiddleAiError>;
