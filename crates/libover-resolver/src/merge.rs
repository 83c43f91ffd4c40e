//! First-match-by-name merge of resolution layers

use libover_core::ResolvedLibraryConfig;
use std::collections::HashSet;

/// Concatenate `layers` in order, keeping the first config for each name.
///
/// Override output goes ahead of the default resolution, so an overridden
/// library shadows its default and the nearest folder's override shadows
/// farther ones.
pub fn first_wins<I>(layers: I) -> Vec<ResolvedLibraryConfig>
where
    I: IntoIterator<Item = Vec<ResolvedLibraryConfig>>,
{
    let mut seen = HashSet::new();
    let mut merged = Vec::new();
    for config in layers.into_iter().flatten() {
        if seen.insert(config.name.clone()) {
            merged.push(config);
        }
    }
    merged
}
