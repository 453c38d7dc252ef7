//! Reference-array union with tombstones.
//!
//! Layers are visited highest precedence first. The first layer to mention an id
//! decides it: a tombstone excludes it, a plain reference includes it. Included ids
//! keep first-seen order, so contributions from higher strata come before ids first
//! introduced by lower strata, and order within a stratum is preserved.

use crate::reference::parse_reference_array;
use crate::types::{EntryId, RawValue};
use std::collections::HashSet;

pub fn union_references<'a>(layers: impl IntoIterator<Item = &'a RawValue>) -> Vec<EntryId> {
    let mut decided: HashSet<EntryId> = HashSet::new();
    let mut resolved = Vec::new();
    for layer in layers {
        // null contributes nothing
        for reference in parse_reference_array(layer) {
            if decided.insert(reference.target().clone()) && !reference.is_removed() {
                resolved.push(reference.target().clone());
            }
        }
    }
    resolved
}
