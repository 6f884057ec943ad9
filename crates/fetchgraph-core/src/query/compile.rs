//! Transliteration of a built query tree into a [`QueryExpression`].
//!
//! Trees are emitted in pre-order, so node count, sibling order, and every
//! `(column, operator, operands)` triple survive unchanged. The only
//! additions are join columns forced into projections and the aliases the
//! allocator picks for nodes that did not name one.

use std::collections::HashSet;
use std::slice;

use fetchgraph_proto::{
    ColumnSet, FilterNode, LinkEntity, OrderExpression, QueryExpression, ALIAS_SEPARATOR,
};

use super::filter::FilterTree;
use super::node::{LinkNode, LinkRef};
use crate::error::{ConfigurationError, Error, Result};

/// The root of a tree about to be compiled.
pub(crate) struct RootSpec<'a> {
    pub entity_name: &'a str,
    pub columns: &'a ColumnSet,
    pub filter: Option<&'a FilterTree>,
    pub links: Vec<LinkRef<'a>>,
    pub orders: &'a [OrderExpression],
    pub top: Option<u32>,
    pub distinct: bool,
}

/// Compile a root and its link tree.
///
/// Blank entity, column, and join names are rejected here, before any request
/// is sent.
pub(crate) fn compile(root: RootSpec<'_>) -> Result<QueryExpression> {
    require_name("root entity", root.entity_name)?;
    let aliases = AliasAllocator::assign(&root.links)?;

    let mut expression = QueryExpression::new(root.entity_name);
    expression.columns = root.columns.clone();
    for link in &root.links {
        expression.columns.ensure(link.from_column());
    }
    if let Some(filter) = root.filter {
        push_filter(filter, None, None, &mut expression.filter_nodes)?;
    }

    let mut aliases = aliases.into_iter();
    for link in &root.links {
        match *link {
            LinkRef::Join(node) => {
                push_link(node, None, root.entity_name, &mut aliases, &mut expression)?
            }
            LinkRef::Include(node) => {
                push_link(node, None, root.entity_name, &mut aliases, &mut expression)?
            }
        }
    }

    expression.orders = root.orders.to_vec();
    expression.top = root.top;
    expression.distinct = root.distinct;

    tracing::debug!(
        entity = %expression.entity_name,
        filter_nodes = expression.filter_nodes.len(),
        link_entities = expression.link_entities.len(),
        "compiled query"
    );
    Ok(expression)
}

fn require_name(what: &str, name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::InvalidArgument(format!("empty {what} name")));
    }
    Ok(())
}

fn push_filter(
    tree: &FilterTree,
    link: Option<u32>,
    parent: Option<u32>,
    out: &mut Vec<FilterNode>,
) -> Result<()> {
    for condition in &tree.conditions {
        require_name("condition column", &condition.column)?;
    }
    let index = out.len() as u32;
    out.push(FilterNode {
        link,
        parent,
        operator: tree.operator,
        conditions: tree.conditions.clone(),
    });
    for child in &tree.children {
        push_filter(child, link, Some(index), out)?;
    }
    Ok(())
}

fn push_link<N: LinkNode>(
    node: &N,
    parent: Option<u32>,
    from_entity: &str,
    aliases: &mut impl Iterator<Item = String>,
    expression: &mut QueryExpression,
) -> Result<()> {
    require_name("linked entity", node.entity_name())?;
    require_name("join from-column", node.from_column())?;
    require_name("join to-column", node.to_column())?;

    let index = expression.link_entities.len() as u32;

    let mut columns = node.columns().clone();
    columns.ensure(node.to_column());
    for child in node.children() {
        columns.ensure(child.from_column());
    }

    expression.link_entities.push(LinkEntity {
        parent,
        from_entity: from_entity.to_string(),
        from_column: node.from_column().to_string(),
        to_entity: node.entity_name().to_string(),
        to_column: node.to_column().to_string(),
        join_operator: node.join_operator(),
        alias: aliases.next().unwrap_or_default(),
        columns,
    });
    if let Some(filter) = node.filter() {
        push_filter(filter, Some(index), None, &mut expression.filter_nodes)?;
    }
    for child in node.children() {
        push_link(child, Some(index), node.entity_name(), aliases, expression)?;
    }
    Ok(())
}

/// Assigns one alias per link node.
///
/// Row keys are flat, so aliases are unique across the whole tree, not just
/// among siblings. Explicit aliases are reserved first; a node without one
/// takes its entity name, suffixed `2`, `3`, ... when that name is taken.
#[derive(Debug, Default)]
pub(crate) struct AliasAllocator {
    taken: HashSet<String>,
}

impl AliasAllocator {
    /// Aliases for every node under `links`, in pre-order.
    pub(crate) fn assign(links: &[LinkRef<'_>]) -> Result<Vec<String>> {
        let mut explicit = Vec::new();
        for link in links {
            match *link {
                LinkRef::Join(node) => collect_explicit(slice::from_ref(node), &mut explicit),
                LinkRef::Include(node) => collect_explicit(slice::from_ref(node), &mut explicit),
            }
        }

        let mut allocator = AliasAllocator::default();
        for alias in explicit {
            validate_alias(alias)?;
            if !allocator.taken.insert(alias.to_string()) {
                return Err(ConfigurationError::DuplicateAlias(alias.to_string()).into());
            }
        }

        let mut assigned = Vec::new();
        for link in links {
            match *link {
                LinkRef::Join(node) => {
                    allocator.assign_defaults(slice::from_ref(node), &mut assigned)
                }
                LinkRef::Include(node) => {
                    allocator.assign_defaults(slice::from_ref(node), &mut assigned)
                }
            }
        }
        Ok(assigned)
    }

    fn assign_defaults<N: LinkNode>(&mut self, links: &[N], out: &mut Vec<String>) {
        for link in links {
            let alias = match link.alias() {
                Some(alias) => alias.to_string(),
                None => self.claim(link.entity_name()),
            };
            out.push(alias);
            self.assign_defaults(link.children(), out);
        }
    }

    fn claim(&mut self, base: &str) -> String {
        if self.taken.insert(base.to_string()) {
            return base.to_string();
        }
        let mut suffix = 2;
        loop {
            let candidate = format!("{base}{suffix}");
            if self.taken.insert(candidate.clone()) {
                tracing::debug!(
                    entity = base,
                    alias = %candidate,
                    "default alias taken, suffixed"
                );
                return candidate;
            }
            suffix += 1;
        }
    }
}

fn collect_explicit<'a, N: LinkNode>(links: &'a [N], out: &mut Vec<&'a str>) {
    for link in links {
        if let Some(alias) = link.alias() {
            out.push(alias);
        }
        collect_explicit(link.children(), out);
    }
}

fn validate_alias(alias: &str) -> Result<()> {
    if alias.is_empty() || alias.contains(ALIAS_SEPARATOR) {
        return Err(Error::InvalidArgument(format!(
            "alias `{alias}` must be non-empty and free of `{ALIAS_SEPARATOR}`"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{Conditions, FilterBuilder, JoinBuilder, JoinNode};
    use fetchgraph_proto::{ConditionOperator, LogicalOperator};
    use pretty_assertions::assert_eq;

    fn compile_links(links: &[JoinNode]) -> Result<QueryExpression> {
        compile(RootSpec {
            entity_name: "flight",
            columns: &ColumnSet::None,
            filter: None,
            links: links.iter().map(LinkRef::Join).collect(),
            orders: &[],
            top: None,
            distinct: false,
        })
    }

    fn join(entity: &str) -> JoinBuilder {
        JoinBuilder::new(entity, format!("{entity}id"), format!("{entity}id"))
    }

    #[test]
    fn test_filter_preorder() {
        let filter = FilterBuilder::default()
            .equal("a", 1)
            .or(|f| f.equal("b", 2).and(|f| f.null("c")))
            .and(|f| f.greater_than("d", 3))
            .build();
        let expression = compile(RootSpec {
            entity_name: "flight",
            columns: &ColumnSet::All,
            filter: Some(&filter),
            links: Vec::new(),
            orders: &[],
            top: Some(5),
            distinct: true,
        })
        .unwrap();

        assert_eq!(expression.filter_nodes.len(), filter.node_count());
        let parents: Vec<_> = expression.filter_nodes.iter().map(|n| n.parent).collect();
        assert_eq!(parents, vec![None, Some(0), Some(1), Some(0)]);
        assert_eq!(expression.filter_nodes[1].operator, LogicalOperator::Or);
        assert_eq!(
            expression.condition_pairs(),
            vec![
                ("a", ConditionOperator::Equal),
                ("b", ConditionOperator::Equal),
                ("c", ConditionOperator::Null),
                ("d", ConditionOperator::GreaterThan),
            ]
        );
        assert_eq!(expression.top, Some(5));
        assert!(expression.distinct);
    }

    #[test]
    fn test_join_columns_are_forced() {
        let links = vec![join("trip")
            .columns(ColumnSet::columns(["name"]))
            .join("contact", "passengerid", "contactid", |j| j)
            .build()];
        let expression = compile_links(&links).unwrap();

        assert_eq!(expression.columns, ColumnSet::columns(["tripid"]));
        assert_eq!(
            expression.link_entities[0].columns,
            ColumnSet::columns(["name", "tripid", "passengerid"])
        );
        assert_eq!(
            expression.link_entities[1].columns,
            ColumnSet::columns(["contactid"])
        );
        assert_eq!(expression.link_entities[1].from_entity, "trip");
    }

    #[test]
    fn test_link_filters_are_scoped() {
        let links = vec![
            join("a").build(),
            join("b")
                .filter(|f| f.equal("x", 1).or(|f| f.null("y")))
                .build(),
        ];
        let expression = compile_links(&links).unwrap();

        assert_eq!(expression.scope_filter(Some(1)), Some(0));
        assert_eq!(expression.filter_nodes[1].link, Some(1));
        assert_eq!(expression.filter_nodes[1].parent, Some(0));
        assert_eq!(expression.scope_filter(None), None);
    }

    #[test]
    fn test_default_aliases_are_suffixed() {
        let links = vec![
            join("contact").build(),
            join("contact").build(),
            join("account").join("contact", "x", "y", |j| j).build(),
        ];
        let expression = compile_links(&links).unwrap();
        let aliases: Vec<_> = expression
            .link_entities
            .iter()
            .map(|l| l.alias.as_str())
            .collect();
        assert_eq!(aliases, vec!["contact", "contact2", "account", "contact3"]);
    }

    #[test]
    fn test_explicit_aliases_are_reserved_first() {
        let links = vec![join("contact").build(), join("lead").alias("contact").build()];
        let expression = compile_links(&links).unwrap();
        assert_eq!(expression.link_entities[0].alias, "contact2");
        assert_eq!(expression.link_entities[1].alias, "contact");
    }

    #[test]
    fn test_duplicate_explicit_alias() {
        let links = vec![
            join("contact").alias("p").build(),
            join("account").join("lead", "a", "b", |j| j.alias("p")).build(),
        ];
        let err = compile_links(&links).unwrap_err();
        assert!(matches!(
            err,
            Error::Configuration(ConfigurationError::DuplicateAlias(alias)) if alias == "p"
        ));
    }

    #[test]
    fn test_alias_with_separator() {
        let links = vec![join("contact").alias("a.b").build()];
        assert!(matches!(
            compile_links(&links),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_blank_names_are_rejected() {
        let links = vec![JoinBuilder::new("contact", "", "contactid").build()];
        assert!(matches!(
            compile_links(&links),
            Err(Error::InvalidArgument(message)) if message.contains("from-column")
        ));

        let links = vec![JoinBuilder::new(" ", "contactid", "contactid").build()];
        assert!(matches!(
            compile_links(&links),
            Err(Error::InvalidArgument(_))
        ));

        let links = vec![join("trip")
            .join("contact", "passengerid", "contactid", |j| {
                j.filter(|f| f.or(|f| f.equal("", 1)))
            })
            .build()];
        assert!(matches!(
            compile_links(&links),
            Err(Error::InvalidArgument(message)) if message.contains("condition column")
        ));

        let filter = FilterBuilder::default().not_null("").build();
        let err = compile(RootSpec {
            entity_name: "flight",
            columns: &ColumnSet::All,
            filter: Some(&filter),
            links: Vec::new(),
            orders: &[],
            top: None,
            distinct: false,
        })
        .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }
}
