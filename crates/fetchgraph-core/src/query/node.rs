//! The shape shared by join and include nodes.

use fetchgraph_proto::{ColumnSet, JoinOperator};

use super::filter::FilterTree;
use super::include::IncludeNode;
use super::join::JoinNode;

/// A node of a link tree, as the compiler sees it.
///
/// Raw joins and typed includes both implement this, so one compiler walks
/// either tree to any depth.
pub trait LinkNode: Sized {
    /// Logical name of the linked entity.
    fn entity_name(&self) -> &str;

    /// Column on the parent entity.
    fn from_column(&self) -> &str;

    /// Column on the linked entity.
    fn to_column(&self) -> &str;

    /// Join semantics.
    fn join_operator(&self) -> JoinOperator;

    /// Explicit alias, if one was set.
    fn alias(&self) -> Option<&str>;

    /// Projected columns, before join columns are added.
    fn columns(&self) -> &ColumnSet;

    /// Filter scoped to the linked entity.
    fn filter(&self) -> Option<&FilterTree>;

    /// Nested links, in declaration order.
    fn children(&self) -> &[Self];

    /// Number of nodes in this subtree, this one included.
    fn node_count(&self) -> usize {
        1 + self.children().iter().map(LinkNode::node_count).sum::<usize>()
    }
}

/// A top-level link of a typed query, in declaration order.
#[derive(Debug, Clone)]
pub(crate) enum Link {
    Join(JoinNode),
    Include(IncludeNode),
}

impl Link {
    pub(crate) fn borrowed(&self) -> LinkRef<'_> {
        match self {
            Link::Join(node) => LinkRef::Join(node),
            Link::Include(node) => LinkRef::Include(node),
        }
    }
}

/// A borrowed top-level link, as handed to the compiler.
#[derive(Debug, Clone, Copy)]
pub(crate) enum LinkRef<'a> {
    Join(&'a JoinNode),
    Include(&'a IncludeNode),
}

impl<'a> LinkRef<'a> {
    pub(crate) fn from_column(self) -> &'a str {
        match self {
            LinkRef::Join(node) => node.from_column(),
            LinkRef::Include(node) => node.from_column(),
        }
    }
}
