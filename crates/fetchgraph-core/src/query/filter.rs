//! Filter trees and the builders that grow them.

use std::sync::Arc;

use fetchgraph_proto::{Condition, ConditionOperator, LogicalOperator, Value};

use super::conditions::Conditions;
use crate::error::{Error, Result};
use crate::metadata::EntityMetadata;

/// A boolean filter node: conditions and child nodes combined under one
/// logical operator.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FilterTree {
    /// How conditions and children combine.
    pub operator: LogicalOperator,
    /// Leaf conditions, in declaration order.
    pub conditions: Vec<Condition>,
    /// Nested filter nodes, in declaration order.
    pub children: Vec<FilterTree>,
}

impl FilterTree {
    /// Create an empty node.
    pub fn new(operator: LogicalOperator) -> Self {
        Self {
            operator,
            conditions: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Number of nodes in the tree, this one included.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(FilterTree::node_count).sum::<usize>()
    }

    /// Number of leaf conditions across the whole tree.
    pub fn condition_count(&self) -> usize {
        self.conditions.len()
            + self
                .children
                .iter()
                .map(FilterTree::condition_count)
                .sum::<usize>()
    }
}

/// Builds a filter over raw column names.
#[derive(Debug, Clone, Default)]
pub struct FilterBuilder {
    tree: FilterTree,
}

impl FilterBuilder {
    /// Start an empty node combined under `operator`.
    pub fn new(operator: LogicalOperator) -> Self {
        Self {
            tree: FilterTree::new(operator),
        }
    }

    /// Continue building an existing tree.
    pub fn from_tree(tree: FilterTree) -> Self {
        Self { tree }
    }

    /// Change how this node combines its conditions and children.
    pub fn operator(mut self, operator: LogicalOperator) -> Self {
        self.tree.operator = operator;
        self
    }

    /// Add a child node combined under `operator`.
    pub fn nested(
        mut self,
        operator: LogicalOperator,
        configure: impl FnOnce(FilterBuilder) -> FilterBuilder,
    ) -> Self {
        let child = configure(FilterBuilder::new(operator));
        self.tree.children.push(child.tree);
        self
    }

    /// Add a child AND node.
    pub fn and(self, configure: impl FnOnce(FilterBuilder) -> FilterBuilder) -> Self {
        self.nested(LogicalOperator::And, configure)
    }

    /// Add a child OR node.
    pub fn or(self, configure: impl FnOnce(FilterBuilder) -> FilterBuilder) -> Self {
        self.nested(LogicalOperator::Or, configure)
    }

    /// Finish the tree.
    pub fn build(self) -> FilterTree {
        self.tree
    }
}

impl Conditions for FilterBuilder {
    fn condition(mut self, field: &str, operator: ConditionOperator, values: Vec<Value>) -> Self {
        self.tree
            .conditions
            .push(Condition::new(field, operator, values));
        self
    }
}

/// Builds a filter over the fields of one entity.
///
/// Field names are resolved to columns through the entity's metadata as each
/// condition is added. The first failure is kept and the rest of the chain
/// becomes a no-op; the configuring call on the query or include returns it.
#[derive(Debug)]
pub struct TypedFilterBuilder {
    metadata: Arc<EntityMetadata>,
    tree: FilterTree,
    error: Option<Error>,
}

impl TypedFilterBuilder {
    pub(crate) fn new(metadata: Arc<EntityMetadata>, tree: FilterTree) -> Self {
        Self {
            metadata,
            tree,
            error: None,
        }
    }

    /// Metadata the field names resolve against.
    pub fn metadata(&self) -> &EntityMetadata {
        &self.metadata
    }

    /// Change how this node combines its conditions and children.
    pub fn operator(mut self, operator: LogicalOperator) -> Self {
        self.tree.operator = operator;
        self
    }

    /// Add a child node combined under `operator`.
    pub fn nested(
        mut self,
        operator: LogicalOperator,
        configure: impl FnOnce(TypedFilterBuilder) -> TypedFilterBuilder,
    ) -> Self {
        if self.error.is_some() {
            return self;
        }
        let child = configure(TypedFilterBuilder::new(
            Arc::clone(&self.metadata),
            FilterTree::new(operator),
        ));
        match child.error {
            Some(err) => self.error = Some(err),
            None => self.tree.children.push(child.tree),
        }
        self
    }

    /// Add a child AND node.
    pub fn and(self, configure: impl FnOnce(TypedFilterBuilder) -> TypedFilterBuilder) -> Self {
        self.nested(LogicalOperator::And, configure)
    }

    /// Add a child OR node.
    pub fn or(self, configure: impl FnOnce(TypedFilterBuilder) -> TypedFilterBuilder) -> Self {
        self.nested(LogicalOperator::Or, configure)
    }

    /// Finish the tree, or return the first resolution failure.
    pub fn build(self) -> Result<FilterTree> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.tree),
        }
    }
}

impl Conditions for TypedFilterBuilder {
    fn condition(mut self, field: &str, operator: ConditionOperator, values: Vec<Value>) -> Self {
        if self.error.is_some() {
            return self;
        }
        match scalar_column(&self.metadata, field) {
            Ok(column) => {
                let condition = Condition::new(column, operator, values);
                self.tree.conditions.push(condition);
            }
            Err(err) => self.error = Some(err),
        }
        self
    }
}

/// Resolve a scalar field to its column.
///
/// Navigation fields and blank names are argument errors; unknown names are
/// configuration errors.
pub(crate) fn scalar_column(metadata: &EntityMetadata, field: &str) -> Result<String> {
    if field.trim().is_empty() {
        return Err(Error::InvalidArgument(format!(
            "empty field name on `{}`",
            metadata.logical_name()
        )));
    }
    if metadata.navigation(field).is_some() {
        return Err(Error::InvalidArgument(format!(
            "`{field}` is a navigation field of `{}` and does not map to a column",
            metadata.logical_name()
        )));
    }
    Ok(metadata.column_of(field)?.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigurationError;
    use crate::metadata::{metadata_of, Entity, EntityDef};
    use pretty_assertions::assert_eq;

    #[derive(Default)]
    struct Flight {
        completed: bool,
        duration: i32,
        aircraft: Option<Aircraft>,
    }

    #[derive(Default)]
    struct Aircraft {
        id: [u8; 16],
    }

    impl Entity for Aircraft {
        fn describe(def: EntityDef<Self>) -> EntityDef<Self> {
            def.logical_name("aircraft")
                .primary_key("id", "aircraftid", |a: &mut Self, v| a.id = v)
        }
    }

    impl Entity for Flight {
        fn describe(def: EntityDef<Self>) -> EntityDef<Self> {
            def.logical_name("flight")
                .primary_key("id", "flightid", |_: &mut Self, _: [u8; 16]| {})
                .field("completed", "completed", |f: &mut Self, v| f.completed = v)
                .field("duration", "duration", |f: &mut Self, v| f.duration = v)
                .navigation("aircraft", "aircraftid", |f: &mut Self, a| f.aircraft = Some(a))
        }
    }

    fn typed() -> TypedFilterBuilder {
        TypedFilterBuilder::new(metadata_of::<Flight>().unwrap(), FilterTree::default())
    }

    #[test]
    fn test_or_keeps_conditions_as_siblings() {
        let tree = FilterBuilder::new(LogicalOperator::Or)
            .equal("a", 1)
            .equal("b", 2)
            .build();

        assert_eq!(tree.operator, LogicalOperator::Or);
        assert_eq!(tree.conditions.len(), 2);
        assert!(tree.children.is_empty());
    }

    #[test]
    fn test_nested_nodes() {
        let tree = FilterBuilder::default()
            .equal("statecode", 0)
            .or(|f| f.null("closedon").and(|f| f.greater_than("duration", 5)))
            .build();

        assert_eq!(tree.node_count(), 3);
        assert_eq!(tree.condition_count(), 3);
        assert_eq!(tree.children[0].operator, LogicalOperator::Or);
        assert_eq!(tree.children[0].children[0].operator, LogicalOperator::And);
    }

    #[test]
    fn test_typed_resolves_columns() {
        let tree = typed()
            .equal("completed", true)
            .greater_than("duration", 5)
            .build()
            .unwrap();

        assert_eq!(
            tree.conditions,
            vec![
                Condition::new("completed", ConditionOperator::Equal, vec![true.into()]),
                Condition::new("duration", ConditionOperator::GreaterThan, vec![5.into()]),
            ]
        );
    }

    #[test]
    fn test_typed_unknown_field() {
        let err = typed().equal("pilot", "x").build().unwrap_err();
        assert!(matches!(
            err,
            Error::Configuration(ConfigurationError::UnknownField { .. })
        ));
    }

    #[test]
    fn test_typed_rejects_navigation_field() {
        let err = typed().not_null("aircraft").build().unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn test_typed_nested_error_surfaces() {
        let err = typed()
            .equal("completed", true)
            .or(|f| f.equal("", 1))
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }
}
