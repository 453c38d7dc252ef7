//! Resolution Engine
//!
//! Computes the effective value of an attribute from an entry's stratum stack
//! according to the attribute's merge policy:
//!
//! - `Topmost`: the highest stratum where the attribute is present wins wholesale,
//!   including an explicit `null`.
//! - `DeepMerge`: object layers are overlaid lowest first (see [`merge`]).
//! - `ReferenceUnion`: reference arrays are unioned with tombstones (see [`references`]).
//!
//! With no stratum defining the attribute the descriptor default applies, and
//! without a default the result is [`Resolved::Unset`].

pub mod cache;
pub mod merge;
pub mod references;

pub use cache::{CacheStats, ResolutionCache};

use crate::schema::{AttributeDescriptor, MergePolicy};
use crate::stratum::StratumStack;
use crate::types::{EntryId, RawValue};

/// Effective value of an attribute. `Unset` is distinct from an explicit `null`.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved {
    Unset,
    Value(RawValue),
}

impl Resolved {
    pub fn is_unset(&self) -> bool {
        matches!(self, Resolved::Unset)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Resolved::Value(RawValue::Null))
    }

    pub fn value(&self) -> Option<&RawValue> {
        match self {
            Resolved::Value(v) => Some(v),
            Resolved::Unset => None,
        }
    }

    pub fn into_value(self) -> Option<RawValue> {
        match self {
            Resolved::Value(v) => Some(v),
            Resolved::Unset => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        self.value().and_then(|v| v.as_f64())
    }

    pub fn as_str(&self) -> Option<&str> {
        self.value().and_then(|v| v.as_str())
    }

    pub fn as_bool(&self) -> Option<bool> {
        self.value().and_then(|v| v.as_bool())
    }

    /// Entry ids of a resolved reference or reference array.
    pub fn references(&self) -> Vec<EntryId> {
        match self.value() {
            Some(RawValue::String(id)) => vec![EntryId::new(id.clone())],
            Some(RawValue::Array(items)) => items
                .iter()
                .filter_map(|i| i.as_str())
                .map(EntryId::new)
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// Resolve one attribute against a stack. No memoization happens here; see
/// [`crate::entry::CatalogEntry::resolve`].
pub fn resolve_attribute(stack: &StratumStack, descriptor: &AttributeDescriptor) -> Resolved {
    let name = descriptor.name.as_str();
    let resolved = match descriptor.merge_policy() {
        MergePolicy::Topmost => stack
            .top_to_bottom()
            .find_map(|(_, stratum)| stratum.get(name))
            .cloned(),
        MergePolicy::DeepMerge => {
            merge::merge_layers(stack.bottom_to_top().filter_map(|(_, s)| s.get(name)))
        }
        MergePolicy::ReferenceUnion => {
            let mut layers = stack
                .top_to_bottom()
                .filter_map(|(_, s)| s.get(name))
                .peekable();
            if layers.peek().is_none() {
                None
            } else {
                let ids = references::union_references(layers);
                Some(RawValue::Array(
                    ids.into_iter()
                        .map(|id| RawValue::String(id.as_str().to_string()))
                        .collect(),
                ))
            }
        }
    };

    match resolved {
        Some(value) => Resolved::Value(value),
        None => descriptor
            .default
            .clone()
            .map(Resolved::Value)
            .unwrap_or(Resolved::Unset),
    }
}
