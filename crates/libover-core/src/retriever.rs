//! Retriever trait

use crate::types::{RetrieverSpec, ScopeId};

/// Result type for retriever operations
pub type RetrieverResult<T> = std::result::Result<T, RetrieverError>;

/// Retriever error types
#[derive(Debug, thiserror::Error)]
pub enum RetrieverError {
    #[error("could not resolve {version} for library {name}")]
    VersionNotFound { name: String, version: String },

    #[error("timed out after {after_ms}ms")]
    Timeout { after_ms: u64 },

    #[error("unsupported retriever: {0}")]
    Unsupported(String),

    #[error("retriever misconfigured: {0}")]
    Misconfigured(String),

    #[error("retrieval failed: {0}")]
    Failed(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl RetrieverError {
    pub fn version_not_found(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self::VersionNotFound {
            name: name.into(),
            version: version.into(),
        }
    }
}

/// Fetches library sources. Only version confirmation is needed here.
#[async_trait::async_trait]
pub trait Retriever: Send + Sync {
    /// Kind matched against `RetrieverSpec::kind`.
    fn kind(&self) -> &str;

    /// Confirm that `version` of library `name` exists at `spec`.
    /// `context` is the folder the check is made from.
    async fn validate_version(
        &self,
        spec: &RetrieverSpec,
        name: &str,
        version: &str,
        context: &ScopeId,
    ) -> RetrieverResult<()>;
}
