//! Capability descriptor table.
//!
//! A capability is a named set of attribute names. An entry satisfies a capability
//! when its composed schema declares all of them, regardless of its kind.

use crate::schema::ComposedSchema;
use indexmap::IndexMap;

#[derive(Debug, Clone, Default)]
pub struct CapabilityTable {
    capabilities: IndexMap<String, Vec<String>>,
}

impl CapabilityTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or replace a capability.
    pub fn register(&mut self, name: impl Into<String>, attributes: Vec<String>) {
        self.capabilities.insert(name.into(), attributes);
    }

    pub fn required_attributes(&self, name: &str) -> Option<&[String]> {
        self.capabilities.get(name).map(|v| v.as_slice())
    }

    /// Unknown capabilities are never satisfied.
    pub fn is_satisfied_by(&self, schema: &ComposedSchema, name: &str) -> bool {
        match self.capabilities.get(name) {
            Some(required) => required.iter().all(|attr| schema.contains(attr)),
            None => false,
        }
    }

    /// All capabilities satisfied by a schema, in registration order.
    pub fn satisfied_by<'a>(&'a self, schema: &ComposedSchema) -> Vec<&'a str> {
        self.capabilities
            .iter()
            .filter(|(_, required)| required.iter().all(|attr| schema.contains(attr)))
            .map(|(name, _)| name.as_str())
            .collect()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.capabilities.keys().map(|k| k.as_str())
    }
}
