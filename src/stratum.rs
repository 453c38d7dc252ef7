//! Strata
//!
//! A stratum is a sparse partial record of an entry's attributes. A missing key means
//! "not set at this layer", which is different from an explicit `null`.

pub mod order;
pub mod stack;

pub use order::{common_strata, StratumOrder, StratumOrderBuilder};
pub use stack::StratumStack;

use crate::types::RawValue;
use indexmap::IndexMap;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Stratum {
    values: IndexMap<String, RawValue>,
}

impl Stratum {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw value if the attribute is present in this stratum (which may be `null`).
    pub fn get(&self, attribute: &str) -> Option<&RawValue> {
        self.values.get(attribute)
    }

    pub fn contains(&self, attribute: &str) -> bool {
        self.values.contains_key(attribute)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RawValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn attribute_names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(|k| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub(crate) fn insert(&mut self, attribute: String, value: RawValue) -> Option<RawValue> {
        self.values.insert(attribute, value)
    }

    pub(crate) fn remove(&mut self, attribute: &str) -> Option<RawValue> {
        self.values.shift_remove(attribute)
    }
}
