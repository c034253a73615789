//! Error types for the user management middleware.

use std::io;
use std::path::PathBuf;

/// Errors raised by the credential and metadata stores.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Malformed user info file '{}': {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Password file '{}' does not exist", path.display())]
    MissingPasswordFile { path: PathBuf },

    #[error("Password file '{}': {source}", path.display())]
    Htpasswd {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Invalid username: '{0}'")]
    InvalidUsername(String),

    #[error("Password for user '{0}' must not be empty")]
    EmptyPassword(String),

    #[error("User map is empty")]
    EmptyUserMap,

    #[error("Background task failed: {0}")]
    TaskFailed(String),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn htpasswd(
        path: impl Into<PathBuf>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Error::Htpasswd {
            path: path.into(),
            source: Box::new(source),
        }
    }

    pub(crate) fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Error::Json {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
