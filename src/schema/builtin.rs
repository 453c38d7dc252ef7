//! Built-in trait schemas and entry kinds for catalog groups and items.

use crate::error::SchemaError;
use crate::schema::descriptor::{AttributeDescriptor, ScalarKind, TraitSchema, ValueKind};
use crate::schema::registry::SchemaRegistry;
use indexmap::IndexMap;
use serde_json::json;

/// Membership attribute of group kinds
pub const MEMBERS: &str = "members";

pub const CATALOG_MEMBER_TRAITS: &str = "catalog-member";
pub const GROUP_TRAITS: &str = "group";
pub const MAPPABLE_TRAITS: &str = "mappable";
pub const STYLE_TRAITS: &str = "style";

pub const GROUP_KIND: &str = "group";
pub const ITEM_KIND: &str = "item";

pub fn catalog_member_traits() -> Result<TraitSchema, SchemaError> {
    let mut info_fields = IndexMap::new();
    info_fields.insert("name".to_string(), string_kind());
    info_fields.insert("content".to_string(), string_kind());

    TraitSchema::new(
        CATALOG_MEMBER_TRAITS,
        vec![
            AttributeDescriptor::scalar("name", ScalarKind::String)
                .with_description("The name of the catalog member."),
            AttributeDescriptor::scalar("description", ScalarKind::String)
                .with_description("The description of the catalog member."),
            AttributeDescriptor::array_of_object("info", info_fields)
                .with_description("Named information sections shown alongside the member."),
            AttributeDescriptor::array_of_scalar("tags", ScalarKind::String),
        ],
    )
}

pub fn group_traits() -> Result<TraitSchema, SchemaError> {
    TraitSchema::new(
        GROUP_TRAITS,
        vec![
            AttributeDescriptor::references(MEMBERS)
                .with_default(json!([]))
                .with_description("Ids of the members of this group."),
            AttributeDescriptor::scalar("isOpen", ScalarKind::Boolean).with_default(json!(false)),
        ],
    )
}

pub fn mappable_traits() -> Result<TraitSchema, SchemaError> {
    TraitSchema::new(
        MAPPABLE_TRAITS,
        vec![
            AttributeDescriptor::scalar("url", ScalarKind::String),
            AttributeDescriptor::scalar("opacity", ScalarKind::Number)
                .with_default(json!(1.0))
                .with_description("The opacity of the map layers."),
            AttributeDescriptor::scalar("show", ScalarKind::Boolean).with_default(json!(true)),
            AttributeDescriptor::reference("sourceReference"),
        ],
    )
}

pub fn style_traits() -> Result<TraitSchema, SchemaError> {
    let mut stroke_fields = IndexMap::new();
    stroke_fields.insert("color".to_string(), string_kind());
    stroke_fields.insert(
        "width".to_string(),
        ValueKind::Scalar {
            scalar: ScalarKind::Number,
        },
    );

    let mut fields = IndexMap::new();
    fields.insert("fill".to_string(), string_kind());
    fields.insert(
        "stroke".to_string(),
        ValueKind::Object {
            fields: stroke_fields,
        },
    );
    fields.insert(
        "shading".to_string(),
        ValueKind::Scalar {
            scalar: ScalarKind::Enum(vec!["flat".into(), "smooth".into()]),
        },
    );

    TraitSchema::new(STYLE_TRAITS, vec![AttributeDescriptor::object("style", fields)])
}

fn string_kind() -> ValueKind {
    ValueKind::Scalar {
        scalar: ScalarKind::String,
    }
}

impl SchemaRegistry {
    /// Registry pre-populated with the built-in schemas, the `group` and `item`
    /// kinds, and the built-in capabilities.
    pub fn with_builtin() -> Result<Self, SchemaError> {
        let mut registry = SchemaRegistry::new();
        let member = registry.register_schema(catalog_member_traits()?)?;
        let group = registry.register_schema(group_traits()?)?;
        let mappable = registry.register_schema(mappable_traits()?)?;
        let style = registry.register_schema(style_traits()?)?;

        registry.register_kind(GROUP_KIND, &[member, group])?;
        registry.register_kind(ITEM_KIND, &[member, mappable, style])?;

        registry.register_capability("group", vec![MEMBERS.to_string()]);
        registry.register_capability("opacity", vec!["opacity".to_string()]);
        registry.register_capability("mappable", vec!["url".to_string(), "opacity".to_string()]);
        Ok(registry)
    }
}
