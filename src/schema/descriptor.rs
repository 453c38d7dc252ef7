//! Attribute descriptors: value kinds, merge policies, and shape checking.

use crate::error::SchemaError;
use crate::reference::ModelReference;
use crate::types::RawValue;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Scalar value kinds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarKind {
    String,
    Number,
    Boolean,
    /// String restricted to a fixed set of variants
    Enum(Vec<String>),
}

impl ScalarKind {
    fn check(&self, value: &RawValue) -> Result<(), String> {
        let ok = match self {
            ScalarKind::String => value.is_string(),
            ScalarKind::Number => value.is_number(),
            ScalarKind::Boolean => value.is_boolean(),
            ScalarKind::Enum(variants) => match value.as_str() {
                Some(s) if variants.iter().any(|v| v == s) => true,
                Some(s) => return Err(format!("'{}' is not one of {:?}", s, variants)),
                None => false,
            },
        };
        if ok {
            Ok(())
        } else {
            Err(format!("expected {}, found {}", self, json_type_name(value)))
        }
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarKind::String => f.write_str("string"),
            ScalarKind::Number => f.write_str("number"),
            ScalarKind::Boolean => f.write_str("boolean"),
            ScalarKind::Enum(variants) => write!(f, "enum({})", variants.join("|")),
        }
    }
}

/// Shape of an attribute value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ValueKind {
    Scalar { scalar: ScalarKind },
    Object { fields: IndexMap<String, ValueKind> },
    ArrayOfScalar { scalar: ScalarKind },
    ArrayOfObject { fields: IndexMap<String, ValueKind> },
    ModelReference,
    ArrayOfModelReference,
}

impl ValueKind {
    /// Merge policy used when a descriptor does not name one.
    pub fn default_merge_policy(&self) -> MergePolicy {
        match self {
            ValueKind::Object { .. } => MergePolicy::DeepMerge,
            ValueKind::ArrayOfModelReference => MergePolicy::ReferenceUnion,
            _ => MergePolicy::Topmost,
        }
    }

    pub fn accepts_policy(&self, policy: MergePolicy) -> bool {
        match policy {
            MergePolicy::Topmost => true,
            MergePolicy::DeepMerge => matches!(self, ValueKind::Object { .. }),
            MergePolicy::ReferenceUnion => matches!(self, ValueKind::ArrayOfModelReference),
        }
    }

    /// Check that a raw stratum value has this shape. `null` is accepted at the top
    /// level for every kind since it is a valid explicit override.
    pub fn check(&self, value: &RawValue) -> Result<(), String> {
        if value.is_null() {
            return Ok(());
        }
        self.check_present(value)
    }

    fn check_present(&self, value: &RawValue) -> Result<(), String> {
        match self {
            ValueKind::Scalar { scalar } => scalar.check(value),
            ValueKind::Object { fields } => check_object(fields, value),
            ValueKind::ArrayOfScalar { scalar } => {
                let items = expect_array(value)?;
                for (i, item) in items.iter().enumerate() {
                    scalar.check(item).map_err(|e| format!("element {}: {}", i, e))?;
                }
                Ok(())
            }
            ValueKind::ArrayOfObject { fields } => {
                let items = expect_array(value)?;
                for (i, item) in items.iter().enumerate() {
                    check_object(fields, item).map_err(|e| format!("element {}: {}", i, e))?;
                }
                Ok(())
            }
            ValueKind::ModelReference => match value {
                RawValue::String(_) => Ok(()),
                RawValue::Object(_) if ModelReference::from_raw(value).is_some() => Err(
                    "tombstones are only valid inside reference arrays".to_string(),
                ),
                other => Err(format!(
                    "expected entry id string, found {}",
                    json_type_name(other)
                )),
            },
            ValueKind::ArrayOfModelReference => {
                let items = expect_array(value)?;
                for (i, item) in items.iter().enumerate() {
                    if ModelReference::from_raw(item).is_none() {
                        return Err(format!(
                            "element {}: expected entry id or {{\"removed\": id}}, found {}",
                            i, item
                        ));
                    }
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueKind::Scalar { scalar } => write!(f, "{}", scalar),
            ValueKind::Object { .. } => f.write_str("object"),
            ValueKind::ArrayOfScalar { scalar } => write!(f, "array of {}", scalar),
            ValueKind::ArrayOfObject { .. } => f.write_str("array of object"),
            ValueKind::ModelReference => f.write_str("model reference"),
            ValueKind::ArrayOfModelReference => f.write_str("array of model reference"),
        }
    }
}

fn expect_array(value: &RawValue) -> Result<&Vec<RawValue>, String> {
    value
        .as_array()
        .ok_or_else(|| format!("expected array, found {}", json_type_name(value)))
}

fn check_object(fields: &IndexMap<String, ValueKind>, value: &RawValue) -> Result<(), String> {
    let map = value
        .as_object()
        .ok_or_else(|| format!("expected object, found {}", json_type_name(value)))?;
    for (key, field_value) in map {
        let kind = fields
            .get(key)
            .ok_or_else(|| format!("unknown field '{}'", key))?;
        kind.check(field_value)
            .map_err(|e| format!("field '{}': {}", key, e))?;
    }
    Ok(())
}

pub(crate) fn json_type_name(value: &RawValue) -> &'static str {
    match value {
        RawValue::Null => "null",
        RawValue::Bool(_) => "boolean",
        RawValue::Number(_) => "number",
        RawValue::String(_) => "string",
        RawValue::Array(_) => "array",
        RawValue::Object(_) => "object",
    }
}

/// How values from several strata combine into one effective value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MergePolicy {
    /// Highest-precedence stratum that has the attribute wins wholesale.
    Topmost,
    /// Objects are overlaid field by field, lowest stratum first.
    DeepMerge,
    /// Reference arrays are unioned across strata, honouring tombstones.
    ReferenceUnion,
}

impl fmt::Display for MergePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MergePolicy::Topmost => f.write_str("topmost"),
            MergePolicy::DeepMerge => f.write_str("deep-merge"),
            MergePolicy::ReferenceUnion => f.write_str("reference-union"),
        }
    }
}

/// Declaration of a single attribute
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeDescriptor {
    pub name: String,

    #[serde(flatten)]
    pub kind: ValueKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merge: Option<MergePolicy>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<RawValue>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl AttributeDescriptor {
    pub fn new(name: impl Into<String>, kind: ValueKind) -> Self {
        Self {
            name: name.into(),
            kind,
            merge: None,
            default: None,
            description: None,
        }
    }

    pub fn scalar(name: impl Into<String>, scalar: ScalarKind) -> Self {
        Self::new(name, ValueKind::Scalar { scalar })
    }

    pub fn object(name: impl Into<String>, fields: IndexMap<String, ValueKind>) -> Self {
        Self::new(name, ValueKind::Object { fields })
    }

    pub fn array_of_scalar(name: impl Into<String>, scalar: ScalarKind) -> Self {
        Self::new(name, ValueKind::ArrayOfScalar { scalar })
    }

    pub fn array_of_object(name: impl Into<String>, fields: IndexMap<String, ValueKind>) -> Self {
        Self::new(name, ValueKind::ArrayOfObject { fields })
    }

    pub fn reference(name: impl Into<String>) -> Self {
        Self::new(name, ValueKind::ModelReference)
    }

    pub fn references(name: impl Into<String>) -> Self {
        Self::new(name, ValueKind::ArrayOfModelReference)
    }

    pub fn with_default(mut self, value: RawValue) -> Self {
        self.default = Some(value);
        self
    }

    pub fn with_merge(mut self, policy: MergePolicy) -> Self {
        self.merge = Some(policy);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Effective merge policy for this attribute
    pub fn merge_policy(&self) -> MergePolicy {
        self.merge.unwrap_or_else(|| self.kind.default_merge_policy())
    }

    pub(crate) fn validate(&self) -> Result<(), SchemaError> {
        if let Some(policy) = self.merge {
            if !self.kind.accepts_policy(policy) {
                return Err(SchemaError::IncompatibleMergePolicy {
                    attribute: self.name.clone(),
                    policy: policy.to_string(),
                    kind: self.kind.to_string(),
                });
            }
        }
        if let Some(default) = &self.default {
            if matches!(self.kind, ValueKind::ArrayOfModelReference)
                && default
                    .as_array()
                    .map(|items| items.iter().any(|i| !i.is_string()))
                    .unwrap_or(false)
            {
                return Err(SchemaError::InvalidDefault {
                    attribute: self.name.clone(),
                    reason: "defaults may not contain tombstones".to_string(),
                });
            }
            self.kind
                .check(default)
                .map_err(|reason| SchemaError::InvalidDefault {
                    attribute: self.name.clone(),
                    reason,
                })?;
        }
        Ok(())
    }
}

/// A named, ordered set of attribute descriptors.
#[derive(Debug, Clone, PartialEq)]
pub struct TraitSchema {
    name: String,
    attributes: IndexMap<String, AttributeDescriptor>,
}

impl TraitSchema {
    /// Build a schema, rejecting repeated names, incompatible merge policies, and
    /// defaults that don't fit their kind.
    pub fn new(
        name: impl Into<String>,
        descriptors: Vec<AttributeDescriptor>,
    ) -> Result<Self, SchemaError> {
        let name = name.into();
        let mut attributes = IndexMap::with_capacity(descriptors.len());
        for descriptor in descriptors {
            descriptor.validate()?;
            if attributes.contains_key(&descriptor.name) {
                return Err(SchemaError::DuplicateAttribute {
                    attribute: descriptor.name,
                    context: format!("schema '{}'", name),
                });
            }
            attributes.insert(descriptor.name.clone(), descriptor);
        }
        Ok(Self { name, attributes })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get(&self, attribute: &str) -> Option<&AttributeDescriptor> {
        self.attributes.get(attribute)
    }

    pub fn descriptors(&self) -> impl Iterator<Item = &AttributeDescriptor> {
        self.attributes.values()
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}
