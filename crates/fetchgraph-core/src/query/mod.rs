//! Query construction, compilation, and materialization.
//!
//! Queries are assembled through nested closures. A root ([`RawQuery`] or
//! [`Query`]) owns a filter tree and a list of join or include nodes, each of
//! which can carry its own filter and further children to any depth. The
//! compiler flattens the whole tree into a `QueryExpression` and the
//! materializer turns the returned rows back into typed object graphs.

mod compile;
mod conditions;
mod filter;
mod include;
mod join;
mod materialize;
mod node;
mod projection;
mod root;

pub use conditions::Conditions;
pub use filter::{FilterBuilder, FilterTree, TypedFilterBuilder};
pub use include::{IncludeBuilder, IncludeNode};
pub use join::{JoinBuilder, JoinNode};
pub use materialize::Materialized;
pub use node::LinkNode;
pub use projection::Projection;
pub use root::{Query, RawQuery};

pub(crate) use materialize::downcast_entity;
