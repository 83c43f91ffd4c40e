//! Libover Resolver - folder-scoped library version overrides
//!
//! The resolver walks a folder's ancestors, binds each override entry to
//! the effective catalog, and emits resolved configs nearest-folder first.
//! The validator checks a proposed override before it is saved.

pub mod catalog;
pub mod config;
pub mod host;
pub mod loader;
pub mod merge;
pub mod registry;
pub mod resolver;
pub mod retrievers;
pub mod validator;
pub mod walker;

pub use catalog::EffectiveCatalog;
pub use config::ResolverConfig;
pub use host::{HostSnapshot, InMemoryHost};
pub use libover_core::*;
pub use loader::{plan, LibraryRequest};
pub use registry::{GlobalLibraries, RetrieverRegistry};
pub use resolver::Resolver;
pub use validator::{ValidationFailure, ValidationResult, Validator, VersionCheck};
pub use walker::HierarchyWalker;
