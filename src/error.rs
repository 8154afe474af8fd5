use thiserror::Error;

#[derive(Debug, Error)]
pub enum SentinelError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration yaml: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

pub type SentinelResult<T> = Result<T, SentinelError>;
