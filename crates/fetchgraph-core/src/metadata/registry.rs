//! Resolved entity metadata and the process-wide registry.

use std::any::{Any, TypeId};
use std::sync::{Arc, OnceLock};

use dashmap::DashMap;
use fetchgraph_proto::Value;

use super::entity::{Entity, EntityDef};
use crate::error::{ConfigurationError, Error, MappingError};

pub(crate) type AssignFn =
    Arc<dyn Fn(&mut dyn Any, &Value) -> Result<(), MappingError> + Send + Sync>;
pub(crate) type AttachFn =
    Arc<dyn Fn(&mut dyn Any, Box<dyn Any + Send>) -> Result<(), MappingError> + Send + Sync>;

/// A scalar field bound to a column.
#[derive(Clone)]
pub struct FieldMapping {
    pub(crate) name: String,
    pub(crate) column: String,
    pub(crate) value_type: &'static str,
    pub(crate) primary_key: bool,
    pub(crate) assign: AssignFn,
}

impl FieldMapping {
    /// Field name on the type.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Column in the backing store.
    pub fn column(&self) -> &str {
        &self.column
    }

    /// Declared field type.
    pub fn value_type(&self) -> &'static str {
        self.value_type
    }

    /// Whether this is the primary-key field.
    pub fn is_primary_key(&self) -> bool {
        self.primary_key
    }
}

impl std::fmt::Debug for FieldMapping {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldMapping")
            .field("name", &self.name)
            .field("column", &self.column)
            .field("value_type", &self.value_type)
            .field("primary_key", &self.primary_key)
            .finish()
    }
}

/// A navigation field bound to a lookup column and a related type.
#[derive(Clone)]
pub struct NavigationMapping {
    pub(crate) name: String,
    pub(crate) column: String,
    pub(crate) target: fn() -> Result<Arc<EntityMetadata>, Error>,
    pub(crate) target_type: &'static str,
    pub(crate) attach: AttachFn,
}

impl NavigationMapping {
    /// Field name on the owning type.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Lookup column on the owning entity.
    pub fn column(&self) -> &str {
        &self.column
    }

    /// Resolve the related type's metadata.
    ///
    /// Resolution is deferred to the first include so that mutually
    /// navigating types can be declared.
    pub fn target(&self) -> Result<Arc<EntityMetadata>, Error> {
        (self.target)()
    }

    /// Assign a constructed target instance to the field on `parent`.
    pub(crate) fn attach(
        &self,
        parent: &mut dyn Any,
        child: Box<dyn Any + Send>,
    ) -> Result<(), MappingError> {
        (self.attach)(parent, child)
    }
}

impl std::fmt::Debug for NavigationMapping {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NavigationMapping")
            .field("name", &self.name)
            .field("column", &self.column)
            .field("target_type", &self.target_type)
            .finish()
    }
}

/// Resolved metadata of one entity type.
pub struct EntityMetadata {
    type_name: &'static str,
    logical_name: String,
    fields: Vec<FieldMapping>,
    primary_key: usize,
    navigations: Vec<NavigationMapping>,
    instantiate: fn() -> Box<dyn Any + Send>,
}

impl EntityMetadata {
    pub(crate) fn new(
        type_name: &'static str,
        logical_name: String,
        fields: Vec<FieldMapping>,
        primary_key: usize,
        navigations: Vec<NavigationMapping>,
        instantiate: fn() -> Box<dyn Any + Send>,
    ) -> Self {
        Self {
            type_name,
            logical_name,
            fields,
            primary_key,
            navigations,
            instantiate,
        }
    }

    /// Rust type name of the entity.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Logical name in the backing store.
    pub fn logical_name(&self) -> &str {
        &self.logical_name
    }

    /// Scalar fields in declaration order.
    pub fn fields(&self) -> &[FieldMapping] {
        &self.fields
    }

    /// Navigation fields in declaration order.
    pub fn navigations(&self) -> &[NavigationMapping] {
        &self.navigations
    }

    /// Get a scalar field by name.
    pub fn field(&self, name: &str) -> Option<&FieldMapping> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Get a navigation field by name.
    pub fn navigation(&self, name: &str) -> Option<&NavigationMapping> {
        self.navigations.iter().find(|n| n.name == name)
    }

    /// Column bound to a scalar field.
    pub fn column_of(&self, field: &str) -> Result<&str, ConfigurationError> {
        self.field(field)
            .map(|f| f.column.as_str())
            .ok_or_else(|| ConfigurationError::UnknownField {
                entity: self.logical_name.clone(),
                field: field.to_string(),
            })
    }

    /// The primary-key field.
    pub fn primary_key(&self) -> &FieldMapping {
        &self.fields[self.primary_key]
    }

    /// Column of the primary-key field.
    pub fn primary_key_column(&self) -> &str {
        &self.primary_key().column
    }

    /// Every mapped column, in declaration order, without duplicates.
    pub fn mapped_columns(&self) -> Vec<String> {
        let mut columns: Vec<String> = Vec::with_capacity(self.fields.len());
        for field in &self.fields {
            if !columns.contains(&field.column) {
                columns.push(field.column.clone());
            }
        }
        columns
    }

    /// Build an instance from the values `lookup` finds for each mapped column.
    ///
    /// Absent and null values leave the field at its default.
    pub(crate) fn construct<'v>(
        &self,
        lookup: impl Fn(&str) -> Option<&'v Value>,
    ) -> Result<Box<dyn Any + Send>, MappingError> {
        let mut instance = (self.instantiate)();
        for field in &self.fields {
            match lookup(&field.column) {
                Some(value) if !value.is_null() => (field.assign)(&mut *instance, value)?,
                _ => {}
            }
        }
        Ok(instance)
    }
}

impl std::fmt::Debug for EntityMetadata {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityMetadata")
            .field("type_name", &self.type_name)
            .field("logical_name", &self.logical_name)
            .field("fields", &self.fields)
            .field("primary_key", &self.primary_key().name)
            .field("navigations", &self.navigations)
            .finish()
    }
}

/// Memoized metadata, keyed by type.
///
/// Entries are inserted once and never invalidated; lookups after the first
/// resolution only take a shard read lock.
#[derive(Debug, Default)]
pub struct MetadataRegistry {
    entries: DashMap<TypeId, Arc<EntityMetadata>>,
}

impl MetadataRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry.
    pub fn global() -> &'static MetadataRegistry {
        static GLOBAL: OnceLock<MetadataRegistry> = OnceLock::new();
        GLOBAL.get_or_init(MetadataRegistry::new)
    }

    /// Resolve (and memoize) the metadata of `E`.
    pub fn resolve<E: Entity>(&self) -> Result<Arc<EntityMetadata>, ConfigurationError> {
        let key = TypeId::of::<E>();
        if let Some(metadata) = self.entries.get(&key) {
            return Ok(Arc::clone(&metadata));
        }

        // Built outside the map lock; a racing resolver builds an identical copy.
        let metadata = Arc::new(E::describe(EntityDef::new()).build()?);
        tracing::trace!(
            type_name = metadata.type_name(),
            logical_name = metadata.logical_name(),
            fields = metadata.fields().len(),
            navigations = metadata.navigations().len(),
            "registered entity metadata"
        );
        Ok(Arc::clone(&self.entries.entry(key).or_insert(metadata)))
    }

    /// Check whether `E` has been resolved.
    pub fn contains<E: Entity>(&self) -> bool {
        self.entries.contains_key(&TypeId::of::<E>())
    }

    /// Number of resolved types.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if nothing has been resolved yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Metadata of `E` from the process-wide registry.
pub fn metadata_of<E: Entity>() -> Result<Arc<EntityMetadata>, Error> {
    Ok(MetadataRegistry::global().resolve::<E>()?)
}

/// Logical name of `E`.
pub fn logical_name_of<E: Entity>() -> Result<String, Error> {
    Ok(metadata_of::<E>()?.logical_name().to_string())
}

/// Column bound to `field` on `E`.
pub fn column_of<E: Entity>(field: &str) -> Result<String, Error> {
    Ok(metadata_of::<E>()?.column_of(field)?.to_string())
}

/// Primary-key column of `E`.
pub fn primary_key_column_of<E: Entity>() -> Result<String, Error> {
    Ok(metadata_of::<E>()?.primary_key_column().to_string())
}

/// Every mapped column of `E`, in declaration order.
pub fn mapped_columns_of<E: Entity>() -> Result<Vec<String>, Error> {
    Ok(metadata_of::<E>()?.mapped_columns())
}
