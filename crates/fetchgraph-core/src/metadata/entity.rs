//! Entity declarations.

use std::any::Any;
use std::marker::PhantomData;
use std::sync::Arc;

use fetchgraph_proto::Value;

use super::registry::{metadata_of, EntityMetadata, FieldMapping, NavigationMapping};
use super::value::FromValue;
use crate::error::{ConfigurationError, MappingError};

/// A typed record of the backing store.
///
/// Implementors declare their logical name, column bindings, primary key, and
/// navigation fields once; the registry resolves the declaration on first use
/// and memoizes it for the life of the process.
///
/// # Example
///
/// ```ignore
/// #[derive(Default)]
/// struct Contact {
///     id: [u8; 16],
///     full_name: String,
/// }
///
/// impl Entity for Contact {
///     fn describe(def: EntityDef<Self>) -> EntityDef<Self> {
///         def.logical_name("contact")
///             .primary_key("id", "contactid", |c: &mut Self, v| c.id = v)
///             .field("full_name", "fullname", |c: &mut Self, v| c.full_name = v)
///     }
/// }
/// ```
pub trait Entity: Default + Send + 'static {
    /// Declare the type's metadata.
    fn describe(def: EntityDef<Self>) -> EntityDef<Self>;
}

/// Builder for an entity's metadata declaration.
pub struct EntityDef<E> {
    logical_name: Option<String>,
    fields: Vec<FieldMapping>,
    navigations: Vec<NavigationMapping>,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> Default for EntityDef<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Entity> EntityDef<E> {
    /// Create an empty declaration.
    pub fn new() -> Self {
        Self {
            logical_name: None,
            fields: Vec::new(),
            navigations: Vec::new(),
            _entity: PhantomData,
        }
    }

    /// Set the logical name in the backing store.
    pub fn logical_name(mut self, name: impl Into<String>) -> Self {
        self.logical_name = Some(name.into());
        self
    }

    /// Bind a field to a column.
    pub fn field<T, F>(self, name: impl Into<String>, column: impl Into<String>, setter: F) -> Self
    where
        T: FromValue + 'static,
        F: Fn(&mut E, T) + Send + Sync + 'static,
    {
        self.push_field(name.into(), column.into(), false, setter)
    }

    /// Bind the primary-key field to its column.
    pub fn primary_key<T, F>(
        self,
        name: impl Into<String>,
        column: impl Into<String>,
        setter: F,
    ) -> Self
    where
        T: FromValue + 'static,
        F: Fn(&mut E, T) + Send + Sync + 'static,
    {
        self.push_field(name.into(), column.into(), true, setter)
    }

    /// Declare a navigation field populated by includes.
    ///
    /// `column` is the lookup column on this entity that holds the related
    /// record's primary key.
    pub fn navigation<T, F>(
        mut self,
        name: impl Into<String>,
        column: impl Into<String>,
        setter: F,
    ) -> Self
    where
        T: Entity,
        F: Fn(&mut E, T) + Send + Sync + 'static,
    {
        let name = name.into();
        let field = name.clone();
        let attach = move |parent: &mut dyn Any, child: Box<dyn Any + Send>| {
            let parent = parent.downcast_mut::<E>().ok_or_else(|| {
                MappingError::new(field.clone(), std::any::type_name::<E>(), "foreign instance")
            })?;
            let child = child.downcast::<T>().map_err(|_| {
                MappingError::new(field.clone(), std::any::type_name::<T>(), "foreign instance")
            })?;
            setter(parent, *child);
            Ok::<(), MappingError>(())
        };
        self.navigations.push(NavigationMapping {
            name,
            column: column.into(),
            target: metadata_of::<T>,
            target_type: std::any::type_name::<T>(),
            attach: Arc::new(attach),
        });
        self
    }

    fn push_field<T, F>(
        mut self,
        name: String,
        column: String,
        primary_key: bool,
        setter: F,
    ) -> Self
    where
        T: FromValue + 'static,
        F: Fn(&mut E, T) + Send + Sync + 'static,
    {
        let field = name.clone();
        let assign = move |target: &mut dyn Any, value: &Value| -> Result<(), MappingError> {
            let entity = target.downcast_mut::<E>().ok_or_else(|| {
                MappingError::new(field.clone(), std::any::type_name::<E>(), "foreign instance")
            })?;
            let converted = T::from_value(value)
                .ok_or_else(|| MappingError::new(field.clone(), T::TYPE_NAME, value.type_name()))?;
            setter(entity, converted);
            Ok(())
        };
        self.fields.push(FieldMapping {
            name,
            column,
            value_type: T::TYPE_NAME,
            primary_key,
            assign: Arc::new(assign),
        });
        self
    }

    /// Validate the declaration.
    pub(crate) fn build(self) -> Result<EntityMetadata, ConfigurationError> {
        let type_name = std::any::type_name::<E>();
        let logical_name = self
            .logical_name
            .ok_or(ConfigurationError::MissingLogicalName { type_name })?;

        let mut seen: Vec<&str> = Vec::new();
        for name in self
            .fields
            .iter()
            .map(|f| f.name.as_str())
            .chain(self.navigations.iter().map(|n| n.name.as_str()))
        {
            if seen.contains(&name) {
                return Err(ConfigurationError::DuplicateField {
                    type_name,
                    field: name.to_string(),
                });
            }
            seen.push(name);
        }

        let keys: Vec<usize> = self
            .fields
            .iter()
            .enumerate()
            .filter(|(_, f)| f.primary_key)
            .map(|(index, _)| index)
            .collect();
        let primary_key = match keys.as_slice() {
            [] => return Err(ConfigurationError::MissingPrimaryKey { type_name }),
            [index] => *index,
            _ => {
                return Err(ConfigurationError::AmbiguousPrimaryKey {
                    type_name,
                    fields: keys.iter().map(|&i| self.fields[i].name.clone()).collect(),
                })
            }
        };

        Ok(EntityMetadata::new(
            type_name,
            logical_name,
            self.fields,
            primary_key,
            self.navigations,
            instantiate::<E>,
        ))
    }
}

fn instantiate<E: Entity>() -> Box<dyn Any + Send> {
    Box::new(E::default())
}
