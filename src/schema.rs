//! Trait Schemas
//!
//! Declarative attribute sets (names, value kinds, merge policies, defaults) shared by
//! many entry kinds, their composition into entry kinds, and the capability table.

pub mod builtin;
pub mod capability;
pub mod descriptor;
pub mod document;
pub mod registry;

pub use capability::CapabilityTable;
pub use descriptor::{AttributeDescriptor, MergePolicy, ScalarKind, TraitSchema, ValueKind};
pub use document::SchemaDocument;
pub use registry::{ComposedSchema, SchemaRegistry};
