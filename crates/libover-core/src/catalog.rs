//! Collaborator traits the host implements
//!
//! Every method returns an owned snapshot. Callers never hold references
//! into the host's live catalogs or folder graph.

use crate::types::{LibraryDefinition, OverrideStore, ScopeId};

/// Read-only enumeration of library definitions.
pub trait CatalogAccessor: Send + Sync {
    /// Globally defined libraries that run with elevated trust.
    fn global_trusted(&self) -> Vec<LibraryDefinition>;

    /// Globally defined libraries that run sandboxed.
    fn global_untrusted(&self) -> Vec<LibraryDefinition>;

    /// Libraries defined directly on `scope` (not its ancestors).
    fn folder_local(&self, scope: &ScopeId) -> Vec<LibraryDefinition>;
}

/// The externally owned folder hierarchy.
pub trait FolderGraph: Send + Sync {
    /// Whether `scope` is a folder. Walks stop at the first non-folder.
    fn is_folder(&self, scope: &ScopeId) -> bool;

    /// Parent of `scope`, if it has one.
    fn parent(&self, scope: &ScopeId) -> Option<ScopeId>;

    /// Override list attached to `scope`, if any.
    fn overrides(&self, scope: &ScopeId) -> Option<OverrideStore>;
}
