//! Global library registry and retriever registry

use libover_core::{LibraryDefinition, Retriever, TrustLevel};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::info;

/// Process-wide global library catalogs.
///
/// Readers get an `Arc` snapshot; writers swap in a whole new list, so an
/// in-flight resolution keeps the list it started with.
#[derive(Default)]
pub struct GlobalLibraries {
    trusted: RwLock<Arc<Vec<LibraryDefinition>>>,
    untrusted: RwLock<Arc<Vec<LibraryDefinition>>>,
}

impl GlobalLibraries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trusted(&self) -> Arc<Vec<LibraryDefinition>> {
        self.trusted
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn untrusted(&self) -> Arc<Vec<LibraryDefinition>> {
        self.untrusted
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replace the trusted catalog. Every definition is marked trusted.
    pub fn replace_trusted(&self, libraries: Vec<LibraryDefinition>) {
        let libraries = with_trust(libraries, TrustLevel::Trusted);
        info!("Global trusted libraries: {}", names(&libraries));
        *self.trusted.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(libraries);
    }

    /// Replace the untrusted catalog. Every definition is marked untrusted.
    pub fn replace_untrusted(&self, libraries: Vec<LibraryDefinition>) {
        let libraries = with_trust(libraries, TrustLevel::Untrusted);
        info!("Global untrusted libraries: {}", names(&libraries));
        *self.untrusted.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(libraries);
    }
}

fn with_trust(libraries: Vec<LibraryDefinition>, trust: TrustLevel) -> Vec<LibraryDefinition> {
    libraries
        .into_iter()
        .map(|lib| lib.with_trust_level(trust))
        .collect()
}

fn names(libraries: &[LibraryDefinition]) -> String {
    libraries
        .iter()
        .map(|l| l.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Retriever implementations keyed by `RetrieverSpec::kind`.
pub struct RetrieverRegistry {
    retrievers: HashMap<String, Arc<dyn Retriever>>,
}

impl Default for RetrieverRegistry {
    fn default() -> Self { Self::new() }
}

impl RetrieverRegistry {
    pub fn new() -> Self { Self { retrievers: HashMap::new() } }

    /// Registry with the built-in "fixed" and "git" retrievers.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(crate::retrievers::FixedRetriever);
        registry.register(crate::retrievers::GitRetriever::new());
        registry
    }

    /// Register a retriever. Replaces any existing one of the same kind.
    pub fn register(&mut self, retriever: impl Retriever + 'static) {
        let kind = retriever.kind().to_string();
        self.retrievers.insert(kind, Arc::new(retriever));
    }

    pub fn get(&self, kind: &str) -> Option<Arc<dyn Retriever>> {
        self.retrievers.get(kind).cloned()
    }

    pub fn list(&self) -> Vec<&str> {
        self.retrievers.keys().map(|s| s.as_str()).collect()
    }
}
