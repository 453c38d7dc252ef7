//! Error types for the catalog strata engine.

use crate::types::{EntryId, StratumId};
use thiserror::Error;

/// Schema definition errors. These indicate a programming error in schema
/// definitions and are expected to surface at startup.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("Duplicate attribute '{attribute}' in {context}")]
    DuplicateAttribute { attribute: String, context: String },

    #[error("Unknown attribute '{attribute}' for kind '{kind}'")]
    UnknownAttribute { attribute: String, kind: String },

    #[error("Unknown schema: {0}")]
    UnknownSchema(String),

    #[error("Schema already registered: {0}")]
    DuplicateSchema(String),

    #[error("Invalid default for '{attribute}': {reason}")]
    InvalidDefault { attribute: String, reason: String },

    #[error("Unknown entry kind: {0}")]
    UnknownKind(String),

    #[error("Entry kind already registered: {0}")]
    DuplicateKind(String),

    #[error("Merge policy {policy} is not valid for attribute '{attribute}' of kind {kind}")]
    IncompatibleMergePolicy {
        attribute: String,
        policy: String,
        kind: String,
    },
}

/// Errors raised while writing into a stratum stack.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StratumError {
    #[error("Attribute '{attribute}' is not declared by kind '{kind}'")]
    SchemaMismatch { attribute: String, kind: String },

    #[error("Value for '{attribute}' does not match {expected}: {reason}")]
    TypeMismatch {
        attribute: String,
        expected: String,
        reason: String,
    },

    #[error("Unknown stratum: {0}")]
    UnknownStratum(StratumId),
}

/// Catalog-level errors
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Adding '{child}' under '{parent}' would create a membership cycle")]
    Cycle { parent: EntryId, child: EntryId },

    #[error("Entry not found: {0}")]
    EntryNotFound(EntryId),

    #[error("Entry '{0}' is not a group")]
    NotAGroup(EntryId),

    #[error("Entry '{id}' already exists with kind '{existing}', not '{requested}'")]
    KindMismatch {
        id: EntryId,
        existing: String,
        requested: String,
    },

    #[error("Share key '{key}' already points at '{existing}'")]
    ShareKeyConflict { key: String, existing: EntryId },

    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("Stratum error: {0}")]
    Stratum(#[from] StratumError),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Load failed: {0}")]
    LoadFailed(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<config::ConfigError> for CatalogError {
    fn from(err: config::ConfigError) -> Self {
        CatalogError::ConfigError(err.to_string())
    }
}
