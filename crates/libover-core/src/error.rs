//! Error types for Libover

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("no library named {0} found")]
    LibraryNotFound(String),

    #[error("version override not permitted for library {name} (requested {version})")]
    VersionOverrideDenied { name: String, version: String },

    #[error("invalid library request: {0}")]
    InvalidRequest(String),

    #[error("unknown retriever: {0}")]
    UnknownRetriever(String),

    #[error("config error: {0}")]
    ConfigError(String),

    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("json error: {0}")]
    JsonError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn library_not_found(name: impl Into<String>) -> Self {
        Self::LibraryNotFound(name.into())
    }

    pub fn version_override_denied(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self::VersionOverrideDenied {
            name: name.into(),
            version: version.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigError(message.into())
    }
}
