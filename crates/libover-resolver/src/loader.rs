//! Library requests and load planning
//!
//! A job names libraries as `name` or `name@version`. The plan loads every
//! requested library plus every implicit one, each exactly once.

use libover_core::{Error, ResolvedLibraryConfig, Result};
use std::collections::HashSet;
use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LibraryRequest {
    pub name: String,
    pub version: Option<String>,
}

impl LibraryRequest {
    /// Parse `name` or `name@version`.
    pub fn parse(identifier: &str) -> Result<Self> {
        let identifier = identifier.trim();
        let (name, version) = match identifier.split_once('@') {
            Some((name, version)) => (name.trim(), Some(version.trim())),
            None => (identifier, None),
        };
        if name.is_empty() {
            return Err(Error::InvalidRequest(format!("missing library name in '{}'", identifier)));
        }
        if version.is_some_and(str::is_empty) {
            return Err(Error::InvalidRequest(format!("missing version in '{}'", identifier)));
        }
        Ok(Self {
            name: name.to_string(),
            version: version.map(str::to_string),
        })
    }
}

impl fmt::Display for LibraryRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.version {
            Some(v) => write!(f, "{}@{}", self.name, v),
            None => write!(f, "{}", self.name),
        }
    }
}

/// Libraries to load for a job, given its merged effective configs.
///
/// Requests come first in request order, then implicit libraries not
/// already requested. An explicit version is honoured only when the
/// library allows version override.
pub fn plan(
    effective: &[ResolvedLibraryConfig],
    requests: &[LibraryRequest],
) -> Result<Vec<ResolvedLibraryConfig>> {
    let mut loaded = HashSet::new();
    let mut plan = Vec::new();

    for request in requests {
        if !loaded.insert(request.name.clone()) {
            continue;
        }
        let config = effective
            .iter()
            .find(|c| c.name == request.name)
            .ok_or_else(|| Error::library_not_found(&request.name))?;

        let mut config = config.clone();
        if let Some(version) = &request.version {
            if !config.allow_version_override && *version != config.effective_version {
                return Err(Error::version_override_denied(&request.name, version));
            }
            config.effective_version = version.clone();
        }
        plan.push(config);
    }

    for config in effective.iter().filter(|c| c.implicit) {
        if loaded.insert(config.name.clone()) {
            plan.push(config.clone());
        }
    }

    Ok(plan)
}
