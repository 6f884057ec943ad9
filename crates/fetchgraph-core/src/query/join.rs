//! Raw join nodes over entity and column names.

use fetchgraph_proto::{ColumnSet, JoinOperator};

use super::filter::{FilterBuilder, FilterTree};
use super::node::LinkNode;

/// A join to a related entity, addressed by raw names.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinNode {
    entity_name: String,
    from_column: String,
    to_column: String,
    operator: JoinOperator,
    alias: Option<String>,
    columns: ColumnSet,
    filter: Option<FilterTree>,
    children: Vec<JoinNode>,
}

impl LinkNode for JoinNode {
    fn entity_name(&self) -> &str {
        &self.entity_name
    }

    fn from_column(&self) -> &str {
        &self.from_column
    }

    fn to_column(&self) -> &str {
        &self.to_column
    }

    fn join_operator(&self) -> JoinOperator {
        self.operator
    }

    fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    fn columns(&self) -> &ColumnSet {
        &self.columns
    }

    fn filter(&self) -> Option<&FilterTree> {
        self.filter.as_ref()
    }

    fn children(&self) -> &[Self] {
        &self.children
    }
}

/// Configures one [`JoinNode`].
///
/// Defaults: inner join, no projected columns, alias taken from the entity
/// name at compile time.
#[derive(Debug, Clone)]
pub struct JoinBuilder {
    node: JoinNode,
}

impl JoinBuilder {
    /// Join `entity_name` where `parent.from_column = entity_name.to_column`.
    pub fn new(
        entity_name: impl Into<String>,
        from_column: impl Into<String>,
        to_column: impl Into<String>,
    ) -> Self {
        Self {
            node: JoinNode {
                entity_name: entity_name.into(),
                from_column: from_column.into(),
                to_column: to_column.into(),
                operator: JoinOperator::Inner,
                alias: None,
                columns: ColumnSet::None,
                filter: None,
                children: Vec::new(),
            },
        }
    }

    /// Set the projected columns.
    pub fn columns(mut self, columns: ColumnSet) -> Self {
        self.node.columns = columns;
        self
    }

    /// Set the alias prefixing this node's columns in rows.
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.node.alias = Some(alias.into());
        self
    }

    /// Set the join operator.
    pub fn operator(mut self, operator: JoinOperator) -> Self {
        self.node.operator = operator;
        self
    }

    /// Filter the joined entity. Repeated calls extend the same tree.
    pub fn filter(mut self, configure: impl FnOnce(FilterBuilder) -> FilterBuilder) -> Self {
        let existing = self.node.filter.take().unwrap_or_default();
        self.node.filter = Some(configure(FilterBuilder::from_tree(existing)).build());
        self
    }

    /// Join a further entity under this one.
    pub fn join(
        mut self,
        entity_name: impl Into<String>,
        from_column: impl Into<String>,
        to_column: impl Into<String>,
        configure: impl FnOnce(JoinBuilder) -> JoinBuilder,
    ) -> Self {
        let child = configure(JoinBuilder::new(entity_name, from_column, to_column));
        self.node.children.push(child.build());
        self
    }

    /// Finish the node.
    pub fn build(self) -> JoinNode {
        self.node
    }
}
