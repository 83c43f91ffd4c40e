//! Resolver - applies folder overrides to the effective catalogs
//!
//! Each call snapshots the ancestor chain once and reads catalogs and
//! override lists fresh. Nothing is cached between calls; concurrent calls
//! share no mutable state.

use crate::catalog::EffectiveCatalog;
use crate::config::ResolverConfig;
use crate::merge;
use crate::walker::HierarchyWalker;
use libover_core::{
    CatalogAccessor, FolderGraph, OverrideEntry, ResolvedLibraryConfig, ScopeId, TrustLevel,
};
use std::sync::Arc;
use tracing::debug;

#[derive(Clone)]
pub struct Resolver {
    catalogs: Arc<dyn CatalogAccessor>,
    graph: Arc<dyn FolderGraph>,
    walker: HierarchyWalker,
}

impl Resolver {
    pub fn new(
        catalogs: Arc<dyn CatalogAccessor>,
        graph: Arc<dyn FolderGraph>,
        config: &ResolverConfig,
    ) -> Self {
        Self {
            catalogs,
            graph,
            walker: HierarchyWalker::new(config.hierarchy.max_depth),
        }
    }

    /// Ancestor chain of `scope`, nearest first.
    pub fn ancestors(&self, scope: &ScopeId) -> Vec<ScopeId> {
        self.walker.ancestors(self.graph.as_ref(), scope)
    }

    /// Overrides bound to the global trusted catalog, nearest folder first.
    ///
    /// Names may repeat; callers merge with first-match-wins.
    pub fn resolve_trusted(&self, scope: &ScopeId) -> Vec<ResolvedLibraryConfig> {
        let chain = self.ancestors(scope);
        self.resolve_trusted_in(&chain)
    }

    /// Overrides bound to the global untrusted catalog plus the libraries
    /// defined on the folder chain itself.
    pub fn resolve_untrusted(&self, scope: &ScopeId) -> Vec<ResolvedLibraryConfig> {
        let chain = self.ancestors(scope);
        self.resolve_untrusted_in(&chain)
    }

    pub fn resolve(&self, scope: &ScopeId, trust: TrustLevel) -> Vec<ResolvedLibraryConfig> {
        match trust {
            TrustLevel::Trusted => self.resolve_trusted(scope),
            TrustLevel::Untrusted => self.resolve_untrusted(scope),
        }
    }

    /// Every definition visible at `scope`, optionally without globals.
    pub fn effective_catalog(&self, scope: &ScopeId, include_global: bool) -> EffectiveCatalog {
        let chain = self.ancestors(scope);
        EffectiveCatalog::build(self.catalogs.as_ref(), &chain, include_global)
    }

    /// Sorted unique names for a library picker.
    pub fn library_names(&self, scope: &ScopeId) -> Vec<String> {
        self.effective_catalog(scope, true).names()
    }

    /// The host's non-overridden resolution: every visible definition of the
    /// given trust at its default version.
    pub fn defaults(&self, scope: &ScopeId, trust: TrustLevel) -> Vec<ResolvedLibraryConfig> {
        let chain = self.ancestors(scope);
        self.defaults_in(&chain, trust)
    }

    /// Override output merged ahead of the defaults for one trust level.
    pub fn effective(&self, scope: &ScopeId, trust: TrustLevel) -> Vec<ResolvedLibraryConfig> {
        let chain = self.ancestors(scope);
        let overrides = match trust {
            TrustLevel::Trusted => self.resolve_trusted_in(&chain),
            TrustLevel::Untrusted => self.resolve_untrusted_in(&chain),
        };
        merge::first_wins([overrides, self.defaults_in(&chain, trust)])
    }

    /// Everything a job in `scope` can load, in the host's provider order:
    /// trusted overrides, untrusted overrides, trusted defaults, untrusted
    /// defaults.
    pub fn job_libraries(&self, scope: &ScopeId) -> Vec<ResolvedLibraryConfig> {
        let chain = self.ancestors(scope);
        merge::first_wins([
            self.resolve_trusted_in(&chain),
            self.resolve_untrusted_in(&chain),
            self.defaults_in(&chain, TrustLevel::Trusted),
            self.defaults_in(&chain, TrustLevel::Untrusted),
        ])
    }

    fn resolve_trusted_in(&self, chain: &[ScopeId]) -> Vec<ResolvedLibraryConfig> {
        let target = EffectiveCatalog::from_definitions(self.catalogs.global_trusted());
        self.apply_overrides(chain, &target, TrustLevel::Trusted)
    }

    fn resolve_untrusted_in(&self, chain: &[ScopeId]) -> Vec<ResolvedLibraryConfig> {
        let mut target = EffectiveCatalog::from_definitions(self.catalogs.global_untrusted());
        target.extend(EffectiveCatalog::build(self.catalogs.as_ref(), chain, false).into_definitions());
        self.apply_overrides(chain, &target, TrustLevel::Untrusted)
    }

    fn defaults_in(&self, chain: &[ScopeId], trust: TrustLevel) -> Vec<ResolvedLibraryConfig> {
        let definitions = match trust {
            TrustLevel::Trusted => self.catalogs.global_trusted(),
            TrustLevel::Untrusted => {
                let mut catalog =
                    EffectiveCatalog::from_definitions(self.catalogs.global_untrusted());
                catalog.extend(
                    EffectiveCatalog::build(self.catalogs.as_ref(), chain, false).into_definitions(),
                );
                catalog.into_definitions()
            }
        };
        definitions
            .iter()
            .map(|d| d.to_default_config(trust))
            .collect()
    }

    fn apply_overrides(
        &self,
        chain: &[ScopeId],
        target: &EffectiveCatalog,
        trust: TrustLevel,
    ) -> Vec<ResolvedLibraryConfig> {
        let mut resolved = Vec::new();
        for scope in chain {
            let Some(store) = self.graph.overrides(scope) else {
                continue;
            };
            for entry in store.entries() {
                if let Some(config) = bind_override(entry, target, trust) {
                    resolved.push(config);
                }
            }
        }
        debug!(
            trust = %trust,
            names = ?resolved.iter().map(|c| c.name.as_str()).collect::<Vec<_>>(),
            "resolved overrides"
        );
        resolved
    }
}

/// Bind one override entry to the first same-named definition in `catalog`.
///
/// Returns `None` (inert) when the name is unknown, the definition forbids
/// overriding, or the entry carries no version.
pub fn bind_override(
    entry: &OverrideEntry,
    catalog: &EffectiveCatalog,
    trust: TrustLevel,
) -> Option<ResolvedLibraryConfig> {
    let Some(definition) = catalog.find(&entry.library_name) else {
        debug!("Override for {} names no known library, skipping", entry.library_name);
        return None;
    };
    if !definition.allow_version_override {
        debug!("{} does not allow version override, skipping", definition.name);
        return None;
    }
    if entry.version.is_empty() {
        debug!("Override for {} has no version, skipping", definition.name);
        return None;
    }
    Some(ResolvedLibraryConfig::from_definition(
        definition,
        entry.version.clone(),
        trust,
    ))
}
