//! Object deep merge.
//!
//! Each stratum's object value is read as a merge patch: fields overlay the result
//! below recursively, and a `null` field deletes the field below it. A whole-value
//! `null` resets the attribute to `null`; an object above that overlays onto an
//! empty object.
//!
//! Patches compose without being applied, and composing is function composition, so
//! the merged result depends only on the ordered sequence of strata. Grouping the
//! top strata first and laying the result over the lower ones gives the same value
//! as folding from the bottom.

use crate::types::RawValue;
use indexmap::IndexMap;
use serde_json::Map;

/// A stratum's object value as an operation on the value below it.
#[derive(Debug, Clone, PartialEq)]
pub enum Patch {
    /// Replace wholesale
    Set(RawValue),
    /// Remove the field
    Delete,
    /// Overlay fields onto the object below, or onto `{}` if there is none
    Merge(IndexMap<String, Patch>),
}

impl Patch {
    /// Read a stratum's value for the whole attribute. `null` here is a value, not
    /// a deletion.
    pub fn from_layer(value: &RawValue) -> Self {
        match value {
            RawValue::Object(fields) => Patch::Merge(Self::fields(fields)),
            other => Patch::Set(other.clone()),
        }
    }

    fn from_field(value: &RawValue) -> Self {
        match value {
            RawValue::Null => Patch::Delete,
            RawValue::Object(fields) => Patch::Merge(Self::fields(fields)),
            other => Patch::Set(other.clone()),
        }
    }

    fn fields(fields: &Map<String, RawValue>) -> IndexMap<String, Patch> {
        fields
            .iter()
            .map(|(key, value)| (key.clone(), Self::from_field(value)))
            .collect()
    }

    /// Apply to `base`. `None` means absent, before and after.
    pub fn apply(&self, base: Option<&RawValue>) -> Option<RawValue> {
        match self {
            Patch::Set(value) => Some(value.clone()),
            Patch::Delete => None,
            Patch::Merge(fields) => {
                let mut merged = match base {
                    Some(RawValue::Object(existing)) => existing.clone(),
                    _ => Map::new(),
                };
                for (key, patch) in fields {
                    match patch.apply(merged.get(key)) {
                        Some(value) => {
                            merged.insert(key.clone(), value);
                        }
                        None => {
                            merged.remove(key);
                        }
                    }
                }
                Some(RawValue::Object(merged))
            }
        }
    }

    /// The patch equivalent to applying `self` and then `upper`.
    pub fn then(&self, upper: &Patch) -> Patch {
        match (self, upper) {
            (_, Patch::Set(_)) | (_, Patch::Delete) => upper.clone(),
            (Patch::Merge(lower), Patch::Merge(patch)) => {
                let mut composed = lower.clone();
                for (key, next) in patch {
                    let field = match composed.get(key) {
                        Some(below) => below.then(next),
                        None => next.clone(),
                    };
                    composed.insert(key.clone(), field);
                }
                Patch::Merge(composed)
            }
            (Patch::Set(value), Patch::Merge(_)) => match upper.apply(Some(value)) {
                Some(value) => Patch::Set(value),
                None => Patch::Delete,
            },
            (Patch::Delete, Patch::Merge(_)) => match upper.apply(None) {
                Some(value) => Patch::Set(value),
                None => Patch::Delete,
            },
        }
    }
}

/// Merge layers given lowest precedence first. Returns `None` when there are no
/// layers.
pub fn merge_layers<'a>(layers: impl IntoIterator<Item = &'a RawValue>) -> Option<RawValue> {
    let composed = layers
        .into_iter()
        .map(Patch::from_layer)
        .reduce(|lower, upper| lower.then(&upper))?;
    composed.apply(None)
}
