//! Compiled query expression types.
//!
//! Note: To avoid recursive type issues with rkyv, filter trees and link
//! trees are stored as flat pre-order arenas. Every node names its parent by
//! index, so a parent always precedes its children and siblings keep the
//! order in which they were declared.

use crate::operator::{ConditionOperator, JoinOperator, LogicalOperator, OrderType};
use crate::value::Value;
use rkyv::{Archive, Deserialize, Serialize};
use serde::{Deserialize as SerdeDeserialize, Serialize as SerdeSerialize};

/// Columns projected from an entity.
#[derive(
    Debug, Clone, PartialEq, Eq, Default, Archive, Serialize, Deserialize, SerdeSerialize,
    SerdeDeserialize,
)]
pub enum ColumnSet {
    /// Every column of the entity.
    All,
    /// No columns.
    #[default]
    None,
    /// The listed columns, in order.
    Columns(Vec<String>),
}

impl ColumnSet {
    /// Create an explicit column set.
    pub fn columns<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ColumnSet::Columns(columns.into_iter().map(Into::into).collect())
    }

    /// Check whether a column is projected.
    pub fn contains(&self, column: &str) -> bool {
        match self {
            ColumnSet::All => true,
            ColumnSet::None => false,
            ColumnSet::Columns(columns) => columns.iter().any(|c| c == column),
        }
    }

    /// Make sure `column` is projected, appending it when missing.
    ///
    /// `All` already covers it; `None` becomes a single-column set.
    pub fn ensure(&mut self, column: &str) {
        match self {
            ColumnSet::All => {}
            ColumnSet::None => *self = ColumnSet::Columns(vec![column.to_string()]),
            ColumnSet::Columns(columns) => {
                if !columns.iter().any(|c| c == column) {
                    columns.push(column.to_string());
                }
            }
        }
    }
}

/// A single `(column, operator, operands)` condition.
#[derive(
    Debug, Clone, PartialEq, Archive, Serialize, Deserialize, SerdeSerialize, SerdeDeserialize,
)]
pub struct Condition {
    /// Column the condition applies to.
    pub column: String,
    /// Comparison operator.
    pub operator: ConditionOperator,
    /// Operands (zero for null checks, two for ranges, many for sets).
    pub values: Vec<Value>,
}

impl Condition {
    /// Create a new condition.
    pub fn new(column: impl Into<String>, operator: ConditionOperator, values: Vec<Value>) -> Self {
        Self {
            column: column.into(),
            operator,
            values,
        }
    }
}

/// One node of a flattened filter tree.
#[derive(
    Debug, Clone, PartialEq, Archive, Serialize, Deserialize, SerdeSerialize, SerdeDeserialize,
)]
pub struct FilterNode {
    /// Link entity this filter is scoped to (`None` for the root entity).
    pub link: Option<u32>,
    /// Parent filter node within the same scope (`None` for a scope's top filter).
    pub parent: Option<u32>,
    /// How conditions and child nodes combine.
    pub operator: LogicalOperator,
    /// Leaf conditions, in declaration order.
    pub conditions: Vec<Condition>,
}

/// One node of a flattened link (join) tree.
#[derive(
    Debug, Clone, PartialEq, Archive, Serialize, Deserialize, SerdeSerialize, SerdeDeserialize,
)]
pub struct LinkEntity {
    /// Parent link (`None` when linked directly to the root entity).
    pub parent: Option<u32>,
    /// Entity the parent links from.
    pub from_entity: String,
    /// Column on the parent entity.
    pub from_column: String,
    /// Entity being linked.
    pub to_entity: String,
    /// Column on the linked entity.
    pub to_column: String,
    /// Join semantics.
    pub join_operator: JoinOperator,
    /// Alias prefixing this link's columns in returned rows.
    pub alias: String,
    /// Projected columns of the linked entity.
    pub columns: ColumnSet,
}

/// Sort order on a root column.
#[derive(
    Debug, Clone, PartialEq, Eq, Archive, Serialize, Deserialize, SerdeSerialize, SerdeDeserialize,
)]
pub struct OrderExpression {
    /// Column to order by.
    pub column: String,
    /// Sort direction.
    pub order: OrderType,
}

/// A compiled query against one root entity.
#[derive(
    Debug, Clone, PartialEq, Archive, Serialize, Deserialize, SerdeSerialize, SerdeDeserialize,
)]
pub struct QueryExpression {
    /// Logical name of the root entity.
    pub entity_name: String,
    /// Root projection.
    pub columns: ColumnSet,
    /// Flattened filter trees (root scope and link scopes).
    pub filter_nodes: Vec<FilterNode>,
    /// Flattened link tree.
    pub link_entities: Vec<LinkEntity>,
    /// Ordering on root columns.
    pub orders: Vec<OrderExpression>,
    /// Maximum number of rows to return.
    pub top: Option<u32>,
    /// Remove duplicate rows.
    pub distinct: bool,
}

impl QueryExpression {
    /// Create an empty expression for an entity.
    pub fn new(entity_name: impl Into<String>) -> Self {
        Self {
            entity_name: entity_name.into(),
            columns: ColumnSet::None,
            filter_nodes: vec![],
            link_entities: vec![],
            orders: vec![],
            top: None,
            distinct: false,
        }
    }

    /// Indices of the links whose parent is `parent` (`None` for top-level links).
    pub fn link_children(&self, parent: Option<u32>) -> Vec<u32> {
        self.link_entities
            .iter()
            .enumerate()
            .filter(|(_, link)| link.parent == parent)
            .map(|(index, _)| index as u32)
            .collect()
    }

    /// Index of the top filter node of a scope (`None` scope is the root entity).
    pub fn scope_filter(&self, link: Option<u32>) -> Option<u32> {
        self.filter_nodes
            .iter()
            .position(|node| node.link == link && node.parent.is_none())
            .map(|index| index as u32)
    }

    /// Indices of the filter nodes whose parent is `parent`.
    pub fn filter_children(&self, parent: u32) -> Vec<u32> {
        self.filter_nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| node.parent == Some(parent))
            .map(|(index, _)| index as u32)
            .collect()
    }

    /// Nesting depth of a link (1 for top-level links).
    pub fn link_depth(&self, index: u32) -> usize {
        let mut depth = 1;
        let mut current = self.link_entities.get(index as usize).and_then(|l| l.parent);
        while let Some(parent) = current {
            depth += 1;
            current = self.link_entities.get(parent as usize).and_then(|l| l.parent);
        }
        depth
    }

    /// Find a link by alias.
    pub fn link_by_alias(&self, alias: &str) -> Option<&LinkEntity> {
        self.link_entities.iter().find(|link| link.alias == alias)
    }

    /// Every `(column, operator)` pair across all filter nodes, in arena order.
    pub fn condition_pairs(&self) -> Vec<(&str, ConditionOperator)> {
        self.filter_nodes
            .iter()
            .flat_map(|node| node.conditions.iter())
            .map(|c| (c.column.as_str(), c.operator))
            .collect()
    }
}
