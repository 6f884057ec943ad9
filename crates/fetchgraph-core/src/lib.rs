//! fetchgraph core - typed query construction and result materialization.
//!
//! Entity types declare their metadata once through [`Entity`]. Queries are
//! built with [`RawQuery`] (raw names, raw rows) or [`Query`] (typed fields,
//! materialized entities), compiled into a flat `QueryExpression`, and run
//! against any [`DataService`].

pub mod error;
pub mod metadata;
pub mod query;
pub mod service;

pub use error::{ConfigurationError, DataServiceError, Error, MappingError, Result};
pub use metadata::{
    column_of, logical_name_of, mapped_columns_of, metadata_of, primary_key_column_of, DateTime,
    Entity, EntityDef, EntityMetadata, EntityReference, FromValue, MetadataRegistry,
    OptionSetValue,
};
pub use query::{
    Conditions, FilterBuilder, FilterTree, IncludeBuilder, IncludeNode, JoinBuilder, JoinNode,
    LinkNode, Materialized, Projection, Query, RawQuery, TypedFilterBuilder,
};
pub use service::{retrieve_entity, DataService, InMemoryDataService, InMemoryError};

/// Re-export protocol types.
pub use fetchgraph_proto as proto;
