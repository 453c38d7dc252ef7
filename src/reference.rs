//! Model references and tombstones.
//!
//! A reference array in a stratum holds either plain entry ids or tombstones of the
//! form `{"removed": "<id>"}`. A tombstone in a higher stratum hides the id contributed
//! by lower strata without touching them. Only the resolution engine interprets
//! tombstones; resolved values contain plain ids only.

use crate::types::{EntryId, RawValue};
use serde::{Deserialize, Serialize};

/// A reference to another catalog entry, or a tombstone for one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ModelReference {
    Id(EntryId),
    Removed { removed: EntryId },
}

impl ModelReference {
    pub fn id(id: impl Into<EntryId>) -> Self {
        ModelReference::Id(id.into())
    }

    /// Tombstones are written by the catalog's remove operation only.
    pub(crate) fn tombstone(id: EntryId) -> Self {
        ModelReference::Removed { removed: id }
    }

    pub fn is_removed(&self) -> bool {
        matches!(self, ModelReference::Removed { .. })
    }

    /// The entry id this reference (or tombstone) is about.
    pub fn target(&self) -> &EntryId {
        match self {
            ModelReference::Id(id) => id,
            ModelReference::Removed { removed } => removed,
        }
    }

    /// Parse a single raw array element. Returns `None` for anything that is not a
    /// string or an exact `{"removed": "<id>"}` object.
    pub fn from_raw(value: &RawValue) -> Option<Self> {
        match value {
            RawValue::String(s) => Some(ModelReference::Id(EntryId::new(s.clone()))),
            RawValue::Object(map) if map.len() == 1 => map
                .get("removed")
                .and_then(|v| v.as_str())
                .map(|s| ModelReference::Removed {
                    removed: EntryId::new(s),
                }),
            _ => None,
        }
    }

    pub fn to_raw(&self) -> RawValue {
        match self {
            ModelReference::Id(id) => RawValue::String(id.as_str().to_string()),
            ModelReference::Removed { removed } => {
                serde_json::json!({ "removed": removed.as_str() })
            }
        }
    }
}

/// Parse a raw reference array, skipping malformed elements.
pub fn parse_reference_array(value: &RawValue) -> Vec<ModelReference> {
    value
        .as_array()
        .map(|items| items.iter().filter_map(ModelReference::from_raw).collect())
        .unwrap_or_default()
}

pub fn to_raw_array(references: &[ModelReference]) -> RawValue {
    RawValue::Array(references.iter().map(ModelReference::to_raw).collect())
}
