//! Entity metadata registry.
//!
//! Resolves, per declared type, its logical name, field-to-column table,
//! primary-key field, and includable navigation fields.

mod entity;
mod registry;
mod value;

pub use entity::{Entity, EntityDef};
pub use registry::{
    column_of, logical_name_of, mapped_columns_of, metadata_of, primary_key_column_of,
    EntityMetadata, FieldMapping, MetadataRegistry, NavigationMapping,
};
pub use value::{DateTime, EntityReference, FromValue, OptionSetValue};
