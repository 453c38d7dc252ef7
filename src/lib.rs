//! Catalog Strata: Stratified Attribute Resolution
//!
//! Catalog entries (groups and items) keep their attribute values in ordered strata
//! (`defaults`, `definition`, `load`, `underride`, `user`, `override`, plus configured
//! load strata). Reads resolve each attribute across the strata with a per-attribute
//! merge policy; writes always target one named stratum and never disturb the others.

pub mod catalog;
pub mod cli;
pub mod config;
pub mod entry;
pub mod error;
pub mod load;
pub mod logging;
pub mod persist;
pub mod reference;
pub mod resolve;
pub mod schema;
pub mod stratum;
pub mod types;

pub use catalog::{Catalog, CatalogContext, NewEntry};
pub use entry::CatalogEntry;
pub use error::{CatalogError, SchemaError, StratumError};
pub use resolve::Resolved;
pub use types::{EntryId, RawValue, StratumId};
