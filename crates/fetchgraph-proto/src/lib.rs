//! fetchgraph wire types.
//!
//! This crate defines what crosses the data-service boundary: compiled query
//! expressions, the flat rows that come back, and single-record requests.
//!
//! # Modules
//!
//! - [`value`] - Attribute values
//! - [`operator`] - Condition, logical, join, and order operators
//! - [`query`] - Compiled query expressions (flat filter and link arenas)
//! - [`result`] - Alias-prefixed rows and entity collections
//! - [`record`] - Create/retrieve/update/delete requests
//! - [`message`] - Request/response envelopes
//! - [`codec`] - rkyv encoding of the envelopes
//! - [`error`] - Protocol error types

pub mod codec;
pub mod error;
pub mod message;
pub mod operator;
pub mod query;
pub mod record;
pub mod result;
pub mod value;

pub use error::Error;

// Re-export commonly used types at crate root
pub use message::{error_codes, Operation, Request, Response, ResponsePayload, Status};
pub use operator::{ConditionOperator, JoinOperator, LogicalOperator, OrderType};
pub use query::{ColumnSet, Condition, FilterNode, LinkEntity, OrderExpression, QueryExpression};
pub use record::{RecordRequest, RecordResult};
pub use result::{aliased_key, split_key, Attribute, EntityCollection, Row, ALIAS_SEPARATOR};
pub use value::Value;
