//! Schema documents: trait schemas, entry kinds and capabilities declared in a
//! JSON or TOML file and applied to a registry at startup.

use crate::error::{CatalogError, SchemaError};
use crate::schema::descriptor::{AttributeDescriptor, TraitSchema};
use crate::schema::registry::SchemaRegistry;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaDocument {
    #[serde(default)]
    pub schemas: Vec<SchemaDefinition>,

    #[serde(default)]
    pub kinds: Vec<KindDefinition>,

    /// Capability name -> required attribute names
    #[serde(default)]
    pub capabilities: IndexMap<String, Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaDefinition {
    pub name: String,
    #[serde(default)]
    pub attributes: Vec<AttributeDescriptor>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KindDefinition {
    pub name: String,
    /// Names of the trait schemas composed into this kind
    pub schemas: Vec<String>,
}

impl SchemaDocument {
    /// Read a schema document; `.toml` files are parsed as TOML, anything else as JSON.
    pub fn from_path(path: &Path) -> Result<Self, CatalogError> {
        let text = std::fs::read_to_string(path)?;
        let is_toml = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("toml"))
            .unwrap_or(false);
        if is_toml {
            toml::from_str(&text).map_err(|e| {
                CatalogError::ConfigError(format!(
                    "Invalid schema document {}: {}",
                    path.display(),
                    e
                ))
            })
        } else {
            Ok(serde_json::from_str(&text)?)
        }
    }

    /// Register everything in this document. Kinds may compose schemas registered
    /// earlier (for example the built-in ones).
    pub fn apply(&self, registry: &mut SchemaRegistry) -> Result<(), SchemaError> {
        for definition in &self.schemas {
            let schema = TraitSchema::new(definition.name.clone(), definition.attributes.clone())?;
            registry.register_schema(schema)?;
        }
        for kind in &self.kinds {
            let ids = kind
                .schemas
                .iter()
                .map(|name| registry.schema_id(name))
                .collect::<Result<Vec<_>, _>>()?;
            registry.register_kind(kind.name.clone(), &ids)?;
        }
        for (name, attributes) in &self.capabilities {
            registry.register_capability(name.clone(), attributes.clone());
        }
        Ok(())
    }
}
