//! Core types for Libover

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::trace;

/// Folder scope identifier - cheaply cloneable.
///
/// The empty identifier names the hierarchy root, which is never a folder.
#[derive(Clone, Debug, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct ScopeId(Arc<str>);

impl ScopeId {
    pub fn new(s: impl Into<String>) -> Self {
        Self(Arc::from(s.into()))
    }

    pub fn root() -> Self {
        Self::new("")
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for ScopeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_root() {
            write!(f, "<root>")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

impl From<String> for ScopeId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for ScopeId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<ScopeId> for String {
    fn from(id: ScopeId) -> Self {
        id.0.to_string()
    }
}

/// Trust partition of a library
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TrustLevel {
    /// Runs with elevated privileges (global trusted catalog only)
    Trusted,
    /// Runs inside the restricted sandbox
    #[default]
    Untrusted,
}

impl std::fmt::Display for TrustLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Trusted => write!(f, "trusted"),
            Self::Untrusted => write!(f, "untrusted"),
        }
    }
}

impl std::str::FromStr for TrustLevel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trusted" => Ok(Self::Trusted),
            "untrusted" => Ok(Self::Untrusted),
            other => Err(format!("unknown trust level: {}", other)),
        }
    }
}

/// Fetch descriptor handed to a retriever. The resolver only copies it.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RetrieverSpec {
    /// Retriever kind, used to pick the implementation (e.g. "git", "fixed")
    pub kind: String,
    /// Remote location, when the retriever fetches from one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote: Option<String>,
    /// Versions known up front (used by the "fixed" retriever)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub versions: Vec<String>,
}

impl RetrieverSpec {
    pub fn git(remote: impl Into<String>) -> Self {
        Self {
            kind: "git".into(),
            remote: Some(remote.into()),
            versions: Vec::new(),
        }
    }

    pub fn fixed<I, S>(versions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            kind: "fixed".into(),
            remote: None,
            versions: versions.into_iter().map(Into::into).collect(),
        }
    }
}

/// Caching settings carried through resolution untouched
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CachingConfig {
    pub refresh_time_minutes: u32,
    pub excluded_versions: Vec<String>,
    pub included_versions: Vec<String>,
}

fn default_true() -> bool {
    true
}

/// A library as declared by the global registry or by a folder.
///
/// `name` is only unique within the catalog that declared it.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct LibraryDefinition {
    pub name: String,
    pub retriever: RetrieverSpec,
    #[serde(default)]
    pub default_version: String,
    #[serde(default = "default_true")]
    pub allow_version_override: bool,
    #[serde(default)]
    pub implicit: bool,
    #[serde(default = "default_true")]
    pub include_in_changesets: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caching: Option<CachingConfig>,
    #[serde(default)]
    pub trust_level: TrustLevel,
}

impl LibraryDefinition {
    pub fn new(name: impl Into<String>, retriever: RetrieverSpec) -> Self {
        Self {
            name: name.into(),
            retriever,
            default_version: String::new(),
            allow_version_override: true,
            implicit: false,
            include_in_changesets: true,
            caching: None,
            trust_level: TrustLevel::Untrusted,
        }
    }

    pub fn with_default_version(mut self, version: impl Into<String>) -> Self {
        self.default_version = version.into();
        self
    }

    pub fn with_allow_version_override(mut self, allow: bool) -> Self {
        self.allow_version_override = allow;
        self
    }

    pub fn with_implicit(mut self, implicit: bool) -> Self {
        self.implicit = implicit;
        self
    }

    pub fn with_include_in_changesets(mut self, include: bool) -> Self {
        self.include_in_changesets = include;
        self
    }

    pub fn with_caching(mut self, caching: CachingConfig) -> Self {
        self.caching = Some(caching);
        self
    }

    pub fn with_trust_level(mut self, trust_level: TrustLevel) -> Self {
        self.trust_level = trust_level;
        self
    }

    /// Resolved config at the definition's own default version.
    pub fn to_default_config(&self, trust_level: TrustLevel) -> ResolvedLibraryConfig {
        ResolvedLibraryConfig::from_definition(self, self.default_version.clone(), trust_level)
    }
}

/// One entry of the resolution output. Built fresh per call.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResolvedLibraryConfig {
    pub name: String,
    pub retriever: RetrieverSpec,
    pub effective_version: String,
    pub trust_level: TrustLevel,
    pub allow_version_override: bool,
    pub implicit: bool,
    pub include_in_changesets: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caching: Option<CachingConfig>,
}

impl ResolvedLibraryConfig {
    /// Copy every attribute of `definition`, pinning `effective_version`.
    pub fn from_definition(
        definition: &LibraryDefinition,
        effective_version: impl Into<String>,
        trust_level: TrustLevel,
    ) -> Self {
        Self {
            name: definition.name.clone(),
            retriever: definition.retriever.clone(),
            effective_version: effective_version.into(),
            trust_level,
            allow_version_override: definition.allow_version_override,
            implicit: definition.implicit,
            include_in_changesets: definition.include_in_changesets,
            caching: definition.caching.clone(),
        }
    }
}

#[derive(Deserialize)]
struct RawOverrideEntry {
    #[serde(default)]
    name: String,
    #[serde(default)]
    version: String,
}

impl From<RawOverrideEntry> for OverrideEntry {
    fn from(raw: RawOverrideEntry) -> Self {
        Self::new(raw.name, raw.version)
    }
}

/// An administrator-declared `(library name, version)` pair.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(from = "RawOverrideEntry")]
pub struct OverrideEntry {
    #[serde(rename = "name")]
    pub library_name: String,
    pub version: String,
}

impl OverrideEntry {
    /// Both fields are trimmed; blank input stays empty.
    pub fn new(library_name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            library_name: library_name.into().trim().to_string(),
            version: version.into().trim().to_string(),
        }
    }

    /// Complete and naming a library present in `catalog`.
    pub fn is_valid(&self, catalog: &[LibraryDefinition]) -> bool {
        !self.library_name.is_empty()
            && !self.version.is_empty()
            && catalog.iter().any(|lib| lib.name == self.library_name)
    }
}

/// Ordered override list attached to one folder. Replaced wholesale on save.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct OverrideStore {
    entries: Vec<OverrideEntry>,
}

impl OverrideStore {
    pub fn new(entries: Vec<OverrideEntry>) -> Self {
        Self { entries }
    }

    pub fn get(&self) -> Vec<OverrideEntry> {
        trace!(count = self.entries.len(), "get overrides");
        self.entries.clone()
    }

    pub fn set(&mut self, entries: Vec<OverrideEntry>) {
        trace!(
            names = ?entries.iter().map(|e| e.library_name.as_str()).collect::<Vec<_>>(),
            "replace overrides"
        );
        self.entries = entries;
    }

    pub fn entries(&self) -> &[OverrideEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

impl From<Vec<OverrideEntry>> for OverrideStore {
    fn from(entries: Vec<OverrideEntry>) -> Self {
        Self::new(entries)
    }
}
