//! In-memory host - folders, folder libraries, overrides and globals
//!
//! Folders are addressed by `/`-separated paths; a folder's parent is its
//! path prefix and the empty path is the (non-folder) root. The folder map
//! may be edited concurrently with resolutions.

use crate::registry::GlobalLibraries;
use dashmap::DashMap;
use libover_core::{
    CatalogAccessor, Error, FolderGraph, LibraryDefinition, OverrideEntry, OverrideStore, Result,
    ScopeId, TrustLevel,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

#[derive(Clone, Debug, Default)]
struct FolderNode {
    libraries: Vec<LibraryDefinition>,
    overrides: Option<OverrideStore>,
}

#[derive(Default)]
pub struct InMemoryHost {
    globals: GlobalLibraries,
    folders: DashMap<ScopeId, FolderNode>,
}

impl InMemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn globals(&self) -> &GlobalLibraries {
        &self.globals
    }

    /// Create `path` and any missing ancestor folders.
    pub fn add_folder(&self, path: &str) -> ScopeId {
        let scope = normalize(path);
        let mut current = scope.clone();
        while !current.is_root() {
            let parent = parent_of(&current);
            self.folders.entry(current).or_default();
            current = parent;
        }
        scope
    }

    /// Remove a folder. Descendants stay but their walks stop here.
    pub fn remove_folder(&self, scope: &ScopeId) -> bool {
        self.folders.remove(scope).is_some()
    }

    /// Replace the libraries defined directly on `scope`.
    pub fn set_folder_libraries(&self, scope: &ScopeId, libraries: Vec<LibraryDefinition>) {
        let libraries = libraries
            .into_iter()
            .map(|lib| lib.with_trust_level(TrustLevel::Untrusted))
            .collect();
        self.add_folder(scope.as_str());
        if let Some(mut node) = self.folders.get_mut(scope) {
            node.libraries = libraries;
        }
    }

    /// Replace the override list of `scope` wholesale.
    pub fn set_overrides(&self, scope: &ScopeId, entries: Vec<OverrideEntry>) {
        self.add_folder(scope.as_str());
        if let Some(mut node) = self.folders.get_mut(scope) {
            node.overrides.get_or_insert_with(OverrideStore::default).set(entries);
        }
    }

    /// Detach the override list from `scope`.
    pub fn clear_overrides(&self, scope: &ScopeId) {
        if let Some(mut node) = self.folders.get_mut(scope) {
            node.overrides = None;
        }
    }

    pub fn folders(&self) -> Vec<ScopeId> {
        let mut folders: Vec<_> = self.folders.iter().map(|e| e.key().clone()).collect();
        folders.sort();
        folders
    }

    pub fn from_snapshot(snapshot: HostSnapshot) -> Self {
        let host = Self::new();
        host.globals.replace_trusted(snapshot.global.trusted);
        host.globals.replace_untrusted(snapshot.global.untrusted);
        for folder in snapshot.folders {
            let scope = host.add_folder(&folder.path);
            if !folder.libraries.is_empty() {
                host.set_folder_libraries(&scope, folder.libraries);
            }
            if let Some(overrides) = folder.overrides {
                host.set_overrides(&scope, overrides);
            }
        }
        host
    }
}

impl CatalogAccessor for InMemoryHost {
    fn global_trusted(&self) -> Vec<LibraryDefinition> {
        self.globals.trusted().as_ref().clone()
    }

    fn global_untrusted(&self) -> Vec<LibraryDefinition> {
        self.globals.untrusted().as_ref().clone()
    }

    fn folder_local(&self, scope: &ScopeId) -> Vec<LibraryDefinition> {
        self.folders
            .get(scope)
            .map(|node| node.libraries.clone())
            .unwrap_or_default()
    }
}

impl FolderGraph for InMemoryHost {
    fn is_folder(&self, scope: &ScopeId) -> bool {
        self.folders.contains_key(scope)
    }

    fn parent(&self, scope: &ScopeId) -> Option<ScopeId> {
        if scope.is_root() {
            None
        } else {
            Some(parent_of(scope))
        }
    }

    fn overrides(&self, scope: &ScopeId) -> Option<OverrideStore> {
        self.folders.get(scope).and_then(|node| node.overrides.clone())
    }
}

/// Folder path of the job at `job_path` (its path prefix).
pub fn job_folder(job_path: &str) -> ScopeId {
    parent_of(&normalize(job_path))
}

/// Scope id for a slash-separated folder path, ignoring blank segments.
pub fn normalize(path: &str) -> ScopeId {
    let cleaned: Vec<&str> = path.split('/').map(str::trim).filter(|s| !s.is_empty()).collect();
    ScopeId::new(cleaned.join("/"))
}

fn parent_of(scope: &ScopeId) -> ScopeId {
    match scope.as_str().rsplit_once('/') {
        Some((parent, _)) => ScopeId::new(parent),
        None => ScopeId::root(),
    }
}

// ============================================================
// Snapshot file
// ============================================================

/// TOML description of a host: global catalogs and folders.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HostSnapshot {
    pub global: GlobalSection,
    pub folders: Vec<FolderSection>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalSection {
    pub trusted: Vec<LibraryDefinition>,
    pub untrusted: Vec<LibraryDefinition>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FolderSection {
    pub path: String,
    #[serde(default)]
    pub libraries: Vec<LibraryDefinition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overrides: Option<Vec<OverrideEntry>>,
}

impl HostSnapshot {
    /// Load a snapshot. Unlike `ResolverConfig`, a bad file is an error.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let snapshot = Self::from_toml_str(&content)
            .map_err(|e| Error::config(format!("{}: {}", path.display(), e)))?;
        info!(
            "Loaded host snapshot from {} ({} folders)",
            path.display(),
            snapshot.folders.len()
        );
        Ok(snapshot)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::config(e.to_string()))
    }

    pub fn to_toml(&self) -> String {
        toml::to_string_pretty(self).unwrap_or_default()
    }
}
