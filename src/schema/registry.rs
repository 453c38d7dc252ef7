//! Schema registry and trait composition.
//!
//! Schemas and entry kinds are registered during startup through `&mut self`.
//! Afterwards the registry is shared behind an `Arc` and only read.

use crate::error::SchemaError;
use crate::schema::builtin::MEMBERS;
use crate::schema::capability::CapabilityTable;
use crate::schema::descriptor::{AttributeDescriptor, TraitSchema, ValueKind};
use crate::types::SchemaId;
use indexmap::IndexMap;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Attribute set of an entry kind: the union of its trait schemas.
#[derive(Debug, Clone)]
pub struct ComposedSchema {
    kind: String,
    schemas: Vec<SchemaId>,
    attributes: IndexMap<String, AttributeDescriptor>,
}

impl ComposedSchema {
    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn schema_ids(&self) -> &[SchemaId] {
        &self.schemas
    }

    pub fn describe(&self, attribute: &str) -> Result<&AttributeDescriptor, SchemaError> {
        self.attributes
            .get(attribute)
            .ok_or_else(|| SchemaError::UnknownAttribute {
                attribute: attribute.to_string(),
                kind: self.kind.clone(),
            })
    }

    pub fn contains(&self, attribute: &str) -> bool {
        self.attributes.contains_key(attribute)
    }

    pub fn attribute_names(&self) -> impl Iterator<Item = &str> {
        self.attributes.keys().map(|k| k.as_str())
    }

    pub fn descriptors(&self) -> impl Iterator<Item = &AttributeDescriptor> {
        self.attributes.values()
    }

    /// Groups are kinds that declare a `members` reference array.
    pub fn is_group(&self) -> bool {
        matches!(
            self.attributes.get(MEMBERS).map(|d| &d.kind),
            Some(ValueKind::ArrayOfModelReference)
        )
    }
}

/// Registry of trait schemas, composed entry kinds, and capabilities.
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    schemas: Vec<TraitSchema>,
    schema_names: HashMap<String, SchemaId>,
    kinds: IndexMap<String, Arc<ComposedSchema>>,
    capabilities: CapabilityTable,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_schema(&mut self, schema: TraitSchema) -> Result<SchemaId, SchemaError> {
        if self.schema_names.contains_key(schema.name()) {
            return Err(SchemaError::DuplicateSchema(schema.name().to_string()));
        }
        let id = SchemaId(self.schemas.len());
        debug!(schema = schema.name(), attributes = schema.len(), "Registered trait schema");
        self.schema_names.insert(schema.name().to_string(), id);
        self.schemas.push(schema);
        Ok(id)
    }

    /// Compose schemas into an entry kind. Attribute names must be unique across the
    /// composed set.
    pub fn register_kind(
        &mut self,
        kind: impl Into<String>,
        schemas: &[SchemaId],
    ) -> Result<Arc<ComposedSchema>, SchemaError> {
        let kind = kind.into();
        if self.kinds.contains_key(&kind) {
            return Err(SchemaError::DuplicateKind(kind));
        }

        let mut attributes: IndexMap<String, AttributeDescriptor> = IndexMap::new();
        let mut owners: HashMap<String, &str> = HashMap::new();
        for schema_id in schemas {
            let schema = self.schema(*schema_id)?;
            for descriptor in schema.descriptors() {
                if let Some(owner) = owners.get(&descriptor.name) {
                    return Err(SchemaError::DuplicateAttribute {
                        attribute: descriptor.name.clone(),
                        context: format!(
                            "kind '{}' (declared by '{}' and '{}')",
                            kind,
                            owner,
                            schema.name()
                        ),
                    });
                }
                owners.insert(descriptor.name.clone(), schema.name());
                attributes.insert(descriptor.name.clone(), descriptor.clone());
            }
        }

        let composed = Arc::new(ComposedSchema {
            kind: kind.clone(),
            schemas: schemas.to_vec(),
            attributes,
        });
        debug!(kind = %kind, schemas = schemas.len(), "Registered entry kind");
        self.kinds.insert(kind, Arc::clone(&composed));
        Ok(composed)
    }

    pub fn register_capability(&mut self, name: impl Into<String>, attributes: Vec<String>) {
        self.capabilities.register(name, attributes);
    }

    pub fn schema(&self, id: SchemaId) -> Result<&TraitSchema, SchemaError> {
        self.schemas
            .get(id.0)
            .ok_or_else(|| SchemaError::UnknownSchema(id.to_string()))
    }

    pub fn schema_id(&self, name: &str) -> Result<SchemaId, SchemaError> {
        self.schema_names
            .get(name)
            .copied()
            .ok_or_else(|| SchemaError::UnknownSchema(name.to_string()))
    }

    pub fn kind(&self, kind: &str) -> Result<Arc<ComposedSchema>, SchemaError> {
        self.kinds
            .get(kind)
            .cloned()
            .ok_or_else(|| SchemaError::UnknownKind(kind.to_string()))
    }

    pub fn kinds(&self) -> impl Iterator<Item = &Arc<ComposedSchema>> {
        self.kinds.values()
    }

    pub fn capabilities(&self) -> &CapabilityTable {
        &self.capabilities
    }
}
