use std::path::PathBuf;

/// Failures at the edges: configuration and server setup.
///
/// Poll and drain never fail; provider problems degrade to `ok = 0`.
#[derive(Debug, thiserror::Error)]
pub enum EdgeStatsError {
    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config JSON in {}: {source}", .path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("cannot bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot encode JSON: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}

pub type Result<T> = std::result::Result<T, EdgeStatsError>;
