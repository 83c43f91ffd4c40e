//! Hierarchy walker - ancestor chain snapshots

use libover_core::{FolderGraph, ScopeId};
use std::collections::HashSet;
use tracing::warn;

/// Produces the folder chain from a scope up to the hierarchy root.
#[derive(Clone, Debug)]
pub struct HierarchyWalker {
    max_depth: usize,
}

impl Default for HierarchyWalker {
    fn default() -> Self {
        Self::new(64)
    }
}

impl HierarchyWalker {
    pub fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }

    /// Folders from `start` (inclusive) to the first non-folder, nearest first.
    ///
    /// The graph may be reconfigured while we walk it, so the chain is read
    /// once into an owned Vec. A repeated scope or a chain longer than
    /// `max_depth` ends the walk.
    pub fn ancestors<G>(&self, graph: &G, start: &ScopeId) -> Vec<ScopeId>
    where
        G: FolderGraph + ?Sized,
    {
        let mut chain = Vec::new();
        let mut seen = HashSet::new();
        let mut current = Some(start.clone());

        while let Some(scope) = current {
            if !graph.is_folder(&scope) {
                break;
            }
            if !seen.insert(scope.clone()) {
                warn!("Folder cycle at {} while walking from {}", scope, start);
                break;
            }
            if chain.len() >= self.max_depth {
                warn!("Folder chain from {} exceeds {} levels, truncating", start, self.max_depth);
                break;
            }
            current = graph.parent(&scope);
            chain.push(scope);
        }

        chain
    }
}
