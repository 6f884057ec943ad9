//! Core error types.

use thiserror::Error;

/// Engine errors.
#[derive(Debug, Error)]
pub enum Error {
    /// Entity metadata is missing or inconsistent.
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// A stored value does not fit the destination field.
    #[error("mapping error: {0}")]
    Mapping(#[from] MappingError),

    /// The data service failed.
    #[error("data service error: {0}")]
    DataService(#[from] DataServiceError),

    /// Malformed builder usage.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// Metadata declaration errors, raised while a query is being built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// The type declares no logical name.
    #[error("type `{type_name}` declares no logical name")]
    MissingLogicalName { type_name: &'static str },

    /// The type declares no primary key.
    #[error("type `{type_name}` declares no primary key")]
    MissingPrimaryKey { type_name: &'static str },

    /// The type declares more than one primary key.
    #[error("type `{type_name}` declares more than one primary key: {fields:?}")]
    AmbiguousPrimaryKey {
        type_name: &'static str,
        fields: Vec<String>,
    },

    /// A field name is declared twice.
    #[error("type `{type_name}` declares field `{field}` twice")]
    DuplicateField {
        type_name: &'static str,
        field: String,
    },

    /// A referenced field has no column binding.
    #[error("entity `{entity}` has no column binding for field `{field}`")]
    UnknownField { entity: String, field: String },

    /// A referenced navigation field is not declared.
    #[error("entity `{entity}` has no navigation field `{navigation}`")]
    UnknownNavigation { entity: String, navigation: String },

    /// Two nodes of one query claim the same alias.
    #[error("alias `{0}` is used by more than one link")]
    DuplicateAlias(String),
}

/// A stored value whose runtime type does not match the destination field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("field `{field}` expects {expected} but the row holds {actual}")]
pub struct MappingError {
    /// Destination field name.
    pub field: String,
    /// Declared type of the field.
    pub expected: &'static str,
    /// Runtime type of the stored value.
    pub actual: &'static str,
}

impl MappingError {
    /// Create a new mapping error.
    pub fn new(field: impl Into<String>, expected: &'static str, actual: &'static str) -> Self {
        Self {
            field: field.into(),
            expected,
            actual,
        }
    }
}

/// Failure reported by a [`DataService`](crate::service::DataService),
/// carried unchanged.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct DataServiceError(Box<dyn std::error::Error + Send + Sync>);

impl DataServiceError {
    /// Wrap a boundary failure.
    pub fn new(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self(source.into())
    }

    /// Borrow the boundary's own error type.
    pub fn downcast_ref<T: std::error::Error + 'static>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }

    /// Take the boundary's error back.
    pub fn into_inner(self) -> Box<dyn std::error::Error + Send + Sync> {
        self.0
    }
}

/// Result alias for engine operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;
