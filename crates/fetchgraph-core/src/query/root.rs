//! Query roots: the raw and typed entry points.

use std::marker::PhantomData;
use std::sync::Arc;

use fetchgraph_proto::{ColumnSet, EntityCollection, OrderExpression, OrderType, QueryExpression};

use super::compile::{compile, RootSpec};
use super::filter::{scalar_column, FilterBuilder, FilterTree, TypedFilterBuilder};
use super::include::{build_include, IncludeBuilder};
use super::join::{JoinBuilder, JoinNode};
use super::materialize::Materialized;
use super::node::{Link, LinkRef};
use super::projection::Projection;
use crate::error::Result;
use crate::metadata::{metadata_of, Entity, EntityMetadata};
use crate::service::DataService;

/// A query over raw entity and column names, returning raw rows.
///
/// # Example
///
/// ```ignore
/// let rows = RawQuery::new("flight")
///     .filter(|f| f.equal("completed", true).greater_than("duration", 5))
///     .join("passengers_in_flight", "flightid", "flightid", |j| {
///         j.join("contact", "contactid", "contactid", |j| {
///             j.alias("passenger").columns(ColumnSet::All)
///         })
///     })
///     .top(50)
///     .execute(&service)
///     .await?;
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RawQuery {
    entity_name: String,
    columns: ColumnSet,
    filter: Option<FilterTree>,
    joins: Vec<JoinNode>,
    orders: Vec<OrderExpression>,
    top: Option<u32>,
    distinct: bool,
}

impl RawQuery {
    /// Query `entity_name`, projecting every column.
    pub fn new(entity_name: impl Into<String>) -> Self {
        Self {
            entity_name: entity_name.into(),
            columns: ColumnSet::All,
            filter: None,
            joins: Vec::new(),
            orders: Vec::new(),
            top: None,
            distinct: false,
        }
    }

    /// Logical name of the root entity.
    pub fn entity_name(&self) -> &str {
        &self.entity_name
    }

    /// Set the root projection.
    pub fn columns(mut self, columns: ColumnSet) -> Self {
        self.columns = columns;
        self
    }

    /// Filter the root entity. Repeated calls extend the same tree.
    pub fn filter(mut self, configure: impl FnOnce(FilterBuilder) -> FilterBuilder) -> Self {
        let existing = self.filter.take().unwrap_or_default();
        self.filter = Some(configure(FilterBuilder::from_tree(existing)).build());
        self
    }

    /// Join `entity_name` where `root.from_column = entity_name.to_column`.
    pub fn join(
        mut self,
        entity_name: impl Into<String>,
        from_column: impl Into<String>,
        to_column: impl Into<String>,
        configure: impl FnOnce(JoinBuilder) -> JoinBuilder,
    ) -> Self {
        let join = configure(JoinBuilder::new(entity_name, from_column, to_column));
        self.joins.push(join.build());
        self
    }

    /// Limit the number of rows.
    pub fn top(mut self, top: u32) -> Self {
        self.top = Some(top);
        self
    }

    /// Order by a root column.
    pub fn order(mut self, column: impl Into<String>, order: OrderType) -> Self {
        self.orders.push(OrderExpression {
            column: column.into(),
            order,
        });
        self
    }

    /// Remove duplicate rows.
    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    /// Compile into the data service's request shape.
    pub fn compile(&self) -> Result<QueryExpression> {
        compile(RootSpec {
            entity_name: &self.entity_name,
            columns: &self.columns,
            filter: self.filter.as_ref(),
            links: self.joins.iter().map(LinkRef::Join).collect(),
            orders: &self.orders,
            top: self.top,
            distinct: self.distinct,
        })
    }

    /// Compile and run the query, returning the raw rows.
    pub async fn execute(self, service: &dyn DataService) -> Result<EntityCollection> {
        let expression = self.compile()?;
        let collection = service.retrieve_multiple(&expression).await?;
        tracing::debug!(
            entity = %expression.entity_name,
            rows = collection.rows.len(),
            more_records = collection.more_records,
            "executed raw query"
        );
        Ok(collection)
    }
}

/// A query over the fields of `E`, returning materialized entities.
///
/// Configuration calls that name fields return `Err` as soon as a name fails
/// to resolve.
pub struct Query<E> {
    metadata: Arc<EntityMetadata>,
    columns: ColumnSet,
    filter: Option<FilterTree>,
    links: Vec<Link>,
    orders: Vec<OrderExpression>,
    top: Option<u32>,
    distinct: bool,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> Query<E> {
    /// Query `E`, projecting every declared field.
    pub fn new() -> Result<Self> {
        let metadata = metadata_of::<E>()?;
        let columns = Projection::DefinedOnly.resolve(&metadata)?;
        Ok(Self {
            metadata,
            columns,
            filter: None,
            links: Vec::new(),
            orders: Vec::new(),
            top: None,
            distinct: false,
            _entity: PhantomData,
        })
    }

    /// Metadata of the root type.
    pub fn metadata(&self) -> &EntityMetadata {
        &self.metadata
    }

    /// Set the root projection.
    pub fn columns(mut self, projection: Projection) -> Result<Self> {
        self.columns = projection.resolve(&self.metadata)?;
        Ok(self)
    }

    /// Filter the root entity by its fields. Repeated calls extend the same tree.
    pub fn filter(
        mut self,
        configure: impl FnOnce(TypedFilterBuilder) -> TypedFilterBuilder,
    ) -> Result<Self> {
        let existing = self.filter.take().unwrap_or_default();
        let builder = TypedFilterBuilder::new(Arc::clone(&self.metadata), existing);
        self.filter = Some(configure(builder).build()?);
        Ok(self)
    }

    /// Eagerly load a navigation field of `E`.
    pub fn include(
        mut self,
        navigation: &str,
        configure: impl FnOnce(IncludeBuilder) -> IncludeBuilder,
    ) -> Result<Self> {
        let node = build_include(&self.metadata, navigation, configure)?;
        self.links.push(Link::Include(node));
        Ok(self)
    }

    /// Join an entity by raw names, where `root.from_column = entity_name.to_column`.
    ///
    /// Joined columns stay in the rows but are not materialized; use this to
    /// filter by records that no navigation field reaches.
    pub fn join(
        mut self,
        entity_name: impl Into<String>,
        from_column: impl Into<String>,
        to_column: impl Into<String>,
        configure: impl FnOnce(JoinBuilder) -> JoinBuilder,
    ) -> Self {
        let join = configure(JoinBuilder::new(entity_name, from_column, to_column));
        self.links.push(Link::Join(join.build()));
        self
    }

    /// Limit the number of rows.
    pub fn top(mut self, top: u32) -> Self {
        self.top = Some(top);
        self
    }

    /// Order by a field of `E`.
    pub fn order(mut self, field: &str, order: OrderType) -> Result<Self> {
        let column = scalar_column(&self.metadata, field)?;
        self.orders.push(OrderExpression { column, order });
        Ok(self)
    }

    /// Remove duplicate rows.
    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    /// Compile into the data service's request shape.
    pub fn compile(&self) -> Result<QueryExpression> {
        compile(RootSpec {
            entity_name: self.metadata.logical_name(),
            columns: &self.columns,
            filter: self.filter.as_ref(),
            links: self.links.iter().map(Link::borrowed).collect(),
            orders: &self.orders,
            top: self.top,
            distinct: self.distinct,
        })
    }

    /// Compile and run the query, materializing one `E` per row.
    pub async fn execute(self, service: &dyn DataService) -> Result<Materialized<E>> {
        let expression = self.compile()?;
        let collection = service.retrieve_multiple(&expression).await?;
        tracing::debug!(
            entity = %expression.entity_name,
            rows = collection.rows.len(),
            links = self.links.len(),
            "executed typed query"
        );
        Ok(Materialized::new(
            self.metadata,
            &self.links,
            &expression,
            collection,
        ))
    }
}

impl<E> std::fmt::Debug for Query<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Query")
            .field("entity", &self.metadata.logical_name())
            .field("columns", &self.columns)
            .field("filter", &self.filter)
            .field("links", &self.links)
            .field("orders", &self.orders)
            .field("top", &self.top)
            .field("distinct", &self.distinct)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ConfigurationError, Error};
    use crate::metadata::EntityDef;
    use crate::query::Conditions;
    use fetchgraph_proto::{ConditionOperator, JoinOperator};
    use pretty_assertions::assert_eq;

    #[derive(Default)]
    struct Airport;

    #[derive(Default)]
    struct Route {
        origin: Option<Airport>,
        destination: Option<Airport>,
    }

    impl Entity for Airport {
        fn describe(def: EntityDef<Self>) -> EntityDef<Self> {
            def.logical_name("airport")
                .primary_key("id", "airportid", |_: &mut Self, _: [u8; 16]| {})
                .field("code", "iatacode", |_: &mut Self, _: String| {})
        }
    }

    impl Entity for Route {
        fn describe(def: EntityDef<Self>) -> EntityDef<Self> {
            def.logical_name("route")
                .primary_key("id", "routeid", |_: &mut Self, _: [u8; 16]| {})
                .field("distance", "distancekm", |_: &mut Self, _: i32| {})
                .navigation("origin", "originid", |r: &mut Self, a| r.origin = Some(a))
                .navigation("destination", "destinationid", |r: &mut Self, a| {
                    r.destination = Some(a)
                })
        }
    }

    #[test]
    fn test_raw_defaults() {
        let expression = RawQuery::new("flight").compile().unwrap();
        assert_eq!(expression.columns, ColumnSet::All);
        assert!(expression.filter_nodes.is_empty());
        assert!(expression.link_entities.is_empty());
        assert_eq!(expression.top, None);
    }

    #[test]
    fn test_raw_filter_calls_extend_one_tree() {
        let expression = RawQuery::new("flight")
            .filter(|f| f.equal("completed", true))
            .filter(|f| f.not_null("aircraftid"))
            .order("createdon", OrderType::Descending)
            .compile()
            .unwrap();
        assert_eq!(expression.filter_nodes.len(), 1);
        assert_eq!(
            expression.condition_pairs(),
            vec![
                ("completed", ConditionOperator::Equal),
                ("aircraftid", ConditionOperator::NotNull),
            ]
        );
        assert_eq!(expression.orders[0].column, "createdon");
    }

    #[test]
    fn test_typed_sibling_includes_of_one_type() {
        let expression = Query::<Route>::new()
            .unwrap()
            .include("origin", |i| i)
            .unwrap()
            .include("destination", |i| i.operator(JoinOperator::Inner))
            .unwrap()
            .order("distance", OrderType::Ascending)
            .unwrap()
            .compile()
            .unwrap();

        assert_eq!(
            expression.columns,
            ColumnSet::columns(["routeid", "distancekm", "originid", "destinationid"])
        );
        let aliases: Vec<_> = expression
            .link_entities
            .iter()
            .map(|l| (l.alias.as_str(), l.from_column.as_str(), l.join_operator))
            .collect();
        assert_eq!(
            aliases,
            vec![
                ("airport", "originid", JoinOperator::LeftOuter),
                ("airport2", "destinationid", JoinOperator::Inner),
            ]
        );
        assert_eq!(expression.orders[0].column, "distancekm");
    }

    #[test]
    fn test_typed_errors_surface_at_build_time() {
        let err = Query::<Route>::new()
            .unwrap()
            .filter(|f| f.equal("distance", 10).equal("runway", 2))
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Configuration(ConfigurationError::UnknownField { .. })
        ));

        let err = Query::<Route>::new()
            .unwrap()
            .include("distance", |i| i)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));

        let err = Query::<Route>::new()
            .unwrap()
            .order("origin", OrderType::Ascending)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }
}
