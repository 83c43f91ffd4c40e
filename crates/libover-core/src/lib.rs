//! Libover Core - library catalog types, collaborator traits, and error handling

pub mod catalog;
pub mod error;
pub mod retriever;
pub mod types;

pub use catalog::{CatalogAccessor, FolderGraph};
pub use error::{Error, Result};
pub use retriever::{Retriever, RetrieverError, RetrieverResult};
pub use types::*;
