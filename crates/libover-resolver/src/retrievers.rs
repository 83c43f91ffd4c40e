//! Built-in retrievers

use libover_core::{Retriever, RetrieverError, RetrieverResult, RetrieverSpec, ScopeId};
use tokio::process::Command;
use tracing::debug;

/// Accepts exactly the versions listed in the spec.
pub struct FixedRetriever;

#[async_trait::async_trait]
impl Retriever for FixedRetriever {
    fn kind(&self) -> &str { "fixed" }

    async fn validate_version(
        &self,
        spec: &RetrieverSpec,
        name: &str,
        version: &str,
        _context: &ScopeId,
    ) -> RetrieverResult<()> {
        if spec.versions.iter().any(|v| v == version) {
            Ok(())
        } else {
            Err(RetrieverError::version_not_found(name, version))
        }
    }
}

/// Confirms a branch or tag exists with `git ls-remote`.
///
/// The process is killed if the caller's timeout drops the future.
pub struct GitRetriever {
    program: String,
}

impl Default for GitRetriever {
    fn default() -> Self { Self::new() }
}

impl GitRetriever {
    pub fn new() -> Self {
        Self { program: "git".into() }
    }

    /// Use a different git executable.
    pub fn with_program(program: impl Into<String>) -> Self {
        Self { program: program.into() }
    }
}

#[async_trait::async_trait]
impl Retriever for GitRetriever {
    fn kind(&self) -> &str { "git" }

    async fn validate_version(
        &self,
        spec: &RetrieverSpec,
        name: &str,
        version: &str,
        context: &ScopeId,
    ) -> RetrieverResult<()> {
        let remote = spec
            .remote
            .as_deref()
            .ok_or_else(|| RetrieverError::Misconfigured(format!("{} has no remote", name)))?;

        debug!("git ls-remote {} {} (from {})", remote, version, context);

        let output = Command::new(&self.program)
            .arg("ls-remote")
            .arg("--exit-code")
            .arg(remote)
            .arg(version)
            .env("GIT_TERMINAL_PROMPT", "0")
            .kill_on_drop(true)
            .output()
            .await?;

        match output.status.code() {
            Some(0) => Ok(()),
            // --exit-code reports "no matching refs" as 2
            Some(2) => Err(RetrieverError::version_not_found(name, version)),
            _ => Err(RetrieverError::Failed(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            )),
        }
    }
}
