//! Sesli Search crate - the fixed, read-only result catalog and its query.
//!
//! The index is built once at startup (from the built-in catalog or a JSON
//! file) and never mutated afterwards, so a single `Arc<SearchIndex>` can be
//! shared by any number of dialogue sessions.

pub mod catalog;
pub mod error;
pub mod index;

pub use catalog::{builtin_catalog, load_catalog};
pub use error::CatalogError;
pub use index::{SearchIndex, DEFAULT_MAX_RESULTS};
