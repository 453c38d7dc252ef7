//! CLI output: error mapping from domain errors to stable CLI surface.

use crate::error::CatalogError;

/// Map domain errors to a string for CLI output.
pub fn map_error(e: &CatalogError) -> String {
    match e {
        CatalogError::EntryNotFound(id) => format!("No entry or share key named '{}'", id),
        CatalogError::Schema(inner) => format!("Schema error: {}", inner),
        other => other.to_string(),
    }
}
