//! Effective catalog - every library definition visible at a folder
//!
//! Construction order is global trusted, global untrusted, then each
//! ancestor folder's own libraries nearest first. Lookups return the first
//! definition with a matching name, so that order decides which definition
//! an override binds to when names collide across scopes.

use libover_core::{CatalogAccessor, LibraryDefinition, ScopeId};
use std::collections::BTreeSet;
use tracing::debug;

#[derive(Clone, Debug, Default)]
pub struct EffectiveCatalog {
    definitions: Vec<LibraryDefinition>,
}

impl EffectiveCatalog {
    pub fn from_definitions(definitions: Vec<LibraryDefinition>) -> Self {
        Self { definitions }
    }

    /// Build the catalog for an ancestor chain (nearest first).
    pub fn build<C>(catalogs: &C, chain: &[ScopeId], include_global: bool) -> Self
    where
        C: CatalogAccessor + ?Sized,
    {
        let mut definitions = Vec::new();
        if include_global {
            definitions.extend(catalogs.global_trusted());
            definitions.extend(catalogs.global_untrusted());
        }
        for scope in chain {
            definitions.extend(catalogs.folder_local(scope));
        }
        debug!(
            names = ?definitions.iter().map(|d| d.name.as_str()).collect::<Vec<_>>(),
            include_global,
            "effective catalog"
        );
        Self { definitions }
    }

    /// Append definitions after the existing ones.
    pub fn extend(&mut self, definitions: impl IntoIterator<Item = LibraryDefinition>) {
        self.definitions.extend(definitions);
    }

    /// First definition named `name`.
    pub fn find(&self, name: &str) -> Option<&LibraryDefinition> {
        self.definitions.iter().find(|d| d.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    /// Sorted, de-duplicated library names.
    pub fn names(&self) -> Vec<String> {
        self.definitions
            .iter()
            .map(|d| d.name.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn definitions(&self) -> &[LibraryDefinition] {
        &self.definitions
    }

    pub fn into_definitions(self) -> Vec<LibraryDefinition> {
        self.definitions
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}
