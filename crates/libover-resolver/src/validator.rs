//! Validator - edit-time checks for a proposed override
//!
//! Conditions the resolver silently ignores at run time (unknown name,
//! immutable library) are reported here so an administrator sees them
//! before saving. Every applicable failure is collected.

use crate::config::ResolverConfig;
use crate::registry::RetrieverRegistry;
use crate::resolver::Resolver;
use libover_core::{LibraryDefinition, RetrieverError, RetrieverResult, ScopeId};
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// A single reason a proposed override fails validation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, thiserror::Error)]
pub enum ValidationFailure {
    #[error("A library name is required.")]
    NameRequired,

    #[error("No library with this name is defined for this folder.")]
    NameUnknown,

    #[error("This library does not allow its version to be overridden.")]
    VersionImmutable,

    #[error("A version is required.")]
    VersionRequired,

    #[error("This version could not be found by the library's retriever.")]
    VersionUnresolvable,
}

impl ValidationFailure {
    /// Advisory failures warn but do not block saving.
    pub fn is_advisory(&self) -> bool {
        matches!(self, Self::VersionUnresolvable)
    }
}

/// Outcome of `Validator::validate`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "failures", rename_all = "lowercase")]
pub enum ValidationResult {
    Ok,
    Failed(BTreeSet<ValidationFailure>),
}

impl ValidationResult {
    pub fn from_failures(failures: BTreeSet<ValidationFailure>) -> Self {
        if failures.is_empty() {
            Self::Ok
        } else {
            Self::Failed(failures)
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok)
    }

    pub fn failures(&self) -> Vec<ValidationFailure> {
        match self {
            Self::Ok => Vec::new(),
            Self::Failed(set) => set.iter().copied().collect(),
        }
    }

    pub fn contains(&self, failure: ValidationFailure) -> bool {
        match self {
            Self::Ok => false,
            Self::Failed(set) => set.contains(&failure),
        }
    }

    /// True when any non-advisory failure is present.
    pub fn blocks_save(&self) -> bool {
        self.failures().iter().any(|f| !f.is_advisory())
    }

    pub fn messages(&self) -> Vec<String> {
        self.failures().iter().map(|f| f.to_string()).collect()
    }
}

/// Outcome of the single-field version check.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "message", rename_all = "lowercase")]
pub enum VersionCheck {
    Ok,
    Failed(String),
    /// The library is not known yet; nothing to check against.
    Deferred(String),
}

#[derive(Clone)]
pub struct Validator {
    resolver: Resolver,
    retrievers: Arc<RetrieverRegistry>,
    timeout: Duration,
    defer_message: String,
}

impl Validator {
    pub fn new(
        resolver: Resolver,
        retrievers: Arc<RetrieverRegistry>,
        config: &ResolverConfig,
    ) -> Self {
        Self {
            resolver,
            retrievers,
            timeout: config.version_timeout(),
            defer_message: config.validation.defer_message.clone(),
        }
    }

    /// Check `name@version` as an override saved on `scope`.
    pub async fn validate(&self, name: &str, version: &str, scope: &ScopeId) -> ValidationResult {
        let name = name.trim();
        let version = version.trim();
        let mut failures = BTreeSet::new();

        let catalog = self.resolver.effective_catalog(scope, true);
        let definition = if name.is_empty() {
            failures.insert(ValidationFailure::NameRequired);
            None
        } else {
            catalog.find(name)
        };

        match definition {
            None if !name.is_empty() => {
                failures.insert(ValidationFailure::NameUnknown);
            }
            Some(def) if !def.allow_version_override => {
                failures.insert(ValidationFailure::VersionImmutable);
            }
            _ => {}
        }

        if version.is_empty() {
            failures.insert(ValidationFailure::VersionRequired);
        }

        if let Some(def) = definition {
            if !version.is_empty() {
                if let Err(e) = self.confirm_version(def, name, version, scope).await {
                    warn!("Version {} of {} not confirmed: {}", version, name, e);
                    failures.insert(ValidationFailure::VersionUnresolvable);
                }
            }
        }

        debug!(name, version, scope = %scope, ?failures, "validated override");
        ValidationResult::from_failures(failures)
    }

    /// Check only the version field, as a form does while it is edited.
    pub async fn check_version(&self, name: &str, version: &str, scope: &ScopeId) -> VersionCheck {
        let name = name.trim();
        let version = version.trim();
        if version.is_empty() {
            return VersionCheck::Ok;
        }

        let catalog = self.resolver.effective_catalog(scope, true);
        let Some(def) = catalog.find(name) else {
            return VersionCheck::Deferred(self.defer_message.clone());
        };

        match self.confirm_version(def, name, version, scope).await {
            Ok(()) => VersionCheck::Ok,
            Err(e) => VersionCheck::Failed(e.to_string()),
        }
    }

    /// Ask the definition's retriever, bounded by the configured timeout.
    ///
    /// The check runs on its own task so a retriever that blocks its thread
    /// or panics still yields an error once the deadline passes.
    async fn confirm_version(
        &self,
        def: &LibraryDefinition,
        name: &str,
        version: &str,
        scope: &ScopeId,
    ) -> RetrieverResult<()> {
        let retriever = self
            .retrievers
            .get(&def.retriever.kind)
            .ok_or_else(|| RetrieverError::Unsupported(def.retriever.kind.clone()))?;

        let spec = def.retriever.clone();
        let name = name.to_string();
        let version = version.to_string();
        let scope = scope.clone();
        let mut handle = tokio::spawn(async move {
            retriever.validate_version(&spec, &name, &version, &scope).await
        });

        match tokio::time::timeout(self.timeout, &mut handle).await {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => Err(RetrieverError::Failed(format!("retriever task failed: {}", e))),
            Err(_) => {
                handle.abort();
                Err(RetrieverError::Timeout {
                    after_ms: self.timeout.as_millis() as u64,
                })
            }
        }
    }
}
