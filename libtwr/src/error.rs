use std::path::PathBuf;

/// Opaque failure reported by an API handle (network, auth, rate limiting).
pub type TransportError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Malformed JSON ({context}): {source}")]
    Parse {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Not implemented: {0}")]
    NotImplemented(&'static str),

    #[error("Transport error: {0}")]
    Transport(#[source] TransportError),

    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No place matches {0:?}")]
    NoPlaceMatch(String),

    #[error("Malformed dictionary file {}: {reason}", .path.display())]
    Dictionary { path: PathBuf, reason: String },
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn parse(context: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Parse {
            context: context.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
