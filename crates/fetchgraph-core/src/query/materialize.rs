//! Reconstruction of typed object graphs from alias-prefixed rows.

use std::any::Any;
use std::marker::PhantomData;
use std::sync::Arc;

use fetchgraph_proto::{EntityCollection, QueryExpression, Row};

use super::include::IncludeNode;
use super::node::{Link, LinkNode};
use crate::error::{MappingError, Result};
use crate::metadata::{Entity, EntityMetadata, NavigationMapping};

/// Where one include node's attributes live in a row, and how to attach them.
#[derive(Debug, Clone)]
struct IncludePlan {
    alias: String,
    navigation: NavigationMapping,
    target: Arc<EntityMetadata>,
    children: Vec<IncludePlan>,
}

impl IncludePlan {
    /// Pair include nodes with the aliases compiled for them.
    ///
    /// Link entities are emitted in the same pre-order the include tree is
    /// walked in, so the n-th node visited owns the n-th alias.
    fn from_nodes<'a>(
        nodes: &[IncludeNode],
        aliases: &mut impl Iterator<Item = &'a str>,
    ) -> Vec<IncludePlan> {
        nodes
            .iter()
            .map(|node| {
                let alias = aliases.next().unwrap_or_default().to_string();
                IncludePlan {
                    alias,
                    navigation: node.navigation().clone(),
                    target: Arc::clone(node.target()),
                    children: IncludePlan::from_nodes(node.children(), aliases),
                }
            })
            .collect()
    }
}

/// Typed entities materialized lazily from a row collection.
///
/// Each call to `next` materializes one row; a row that fails yields `Err`
/// and iteration may continue with the next one.
pub struct Materialized<E> {
    root: Arc<EntityMetadata>,
    plans: Vec<IncludePlan>,
    rows: std::vec::IntoIter<Row>,
    more_records: bool,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> Materialized<E> {
    pub(crate) fn new(
        root: Arc<EntityMetadata>,
        links: &[Link],
        expression: &QueryExpression,
        collection: EntityCollection,
    ) -> Self {
        let mut aliases = expression.link_entities.iter().map(|l| l.alias.as_str());
        let mut plans = Vec::new();
        for link in links {
            match link {
                // Raw joins own one alias per node and are not materialized.
                Link::Join(node) => {
                    for _ in 0..node.node_count() {
                        aliases.next();
                    }
                }
                Link::Include(node) => plans.extend(IncludePlan::from_nodes(
                    std::slice::from_ref(node),
                    &mut aliases,
                )),
            }
        }
        Self {
            root,
            plans,
            rows: collection.rows.into_iter(),
            more_records: collection.more_records,
            _entity: PhantomData,
        }
    }

    /// Whether the data service holds more rows than it returned.
    pub fn more_records(&self) -> bool {
        self.more_records
    }

    fn materialize(&self, row: &Row) -> Result<E> {
        let mut root = self.root.construct(|column| row.get(column))?;
        attach_includes(&mut *root, &self.plans, row)?;
        Ok(downcast_entity(&self.root, root)?)
    }
}

impl<E: Entity> Iterator for Materialized<E> {
    type Item = Result<E>;

    fn next(&mut self) -> Option<Self::Item> {
        let row = self.rows.next()?;
        Some(self.materialize(&row))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.rows.size_hint()
    }
}

impl<E: Entity> ExactSizeIterator for Materialized<E> {}

impl<E> std::fmt::Debug for Materialized<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Materialized")
            .field("root", &self.root.logical_name())
            .field("remaining", &self.rows.len())
            .field("more_records", &self.more_records)
            .finish()
    }
}

/// Populate the navigation fields of `parent` from the row.
///
/// A node whose aliased attributes are all absent or null is skipped and the
/// field keeps its default.
fn attach_includes(
    parent: &mut dyn Any,
    plans: &[IncludePlan],
    row: &Row,
) -> std::result::Result<(), MappingError> {
    for plan in plans {
        if !row.has_alias(&plan.alias) {
            continue;
        }
        let mut child = plan
            .target
            .construct(|column| row.get_aliased(&plan.alias, column))?;
        attach_includes(&mut *child, &plan.children, row)?;
        plan.navigation.attach(parent, child)?;
    }
    Ok(())
}

/// Unbox a constructed instance as `E`.
pub(crate) fn downcast_entity<E: Entity>(
    metadata: &EntityMetadata,
    instance: Box<dyn Any + Send>,
) -> std::result::Result<E, MappingError> {
    instance
        .downcast::<E>()
        .map(|entity| *entity)
        .map_err(|_| {
            MappingError::new(
                metadata.logical_name(),
                std::any::type_name::<E>(),
                metadata.type_name(),
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{metadata_of, EntityDef};
    use crate::query::include::build_include;
    use crate::query::Query;
    use crate::Error;
    use fetchgraph_proto::Value;

    #[derive(Debug, Default, PartialEq)]
    struct Crew {
        id: [u8; 16],
        name: String,
    }

    #[derive(Debug, Default, PartialEq)]
    struct Leg {
        id: [u8; 16],
        gate: String,
        captain: Option<Crew>,
    }

    impl Entity for Crew {
        fn describe(def: EntityDef<Self>) -> EntityDef<Self> {
            def.logical_name("crew")
                .primary_key("id", "crewid", |c: &mut Self, v| c.id = v)
                .field("name", "name", |c: &mut Self, v| c.name = v)
        }
    }

    impl Entity for Leg {
        fn describe(def: EntityDef<Self>) -> EntityDef<Self> {
            def.logical_name("leg")
                .primary_key("id", "legid", |l: &mut Self, v| l.id = v)
                .field("gate", "gate", |l: &mut Self, v| l.gate = v)
                .navigation("captain", "captainid", |l: &mut Self, c| l.captain = Some(c))
        }
    }

    fn materialized(rows: Vec<Row>) -> Materialized<Leg> {
        let leg = metadata_of::<Leg>().unwrap();
        let links = vec![Link::Include(
            build_include(&leg, "captain", |i| i.alias("cpt")).unwrap(),
        )];
        let expression = Query::<Leg>::new()
            .unwrap()
            .include("captain", |i| i.alias("cpt"))
            .unwrap()
            .compile()
            .unwrap();
        Materialized::new(leg, &links, &expression, EntityCollection::new("leg", rows))
    }

    #[test]
    fn test_rows_become_entities() {
        let rows = vec![
            Row::new()
                .with("gate", "B12")
                .with("cpt.name", "Okafor")
                .with("cpt.crewid", [4u8; 16]),
            Row::new().with("gate", "C3").with("cpt.name", Value::Null),
        ];
        let legs: Vec<Leg> = materialized(rows).collect::<Result<_>>().unwrap();

        assert_eq!(legs.len(), 2);
        assert_eq!(
            legs[0].captain,
            Some(Crew {
                id: [4; 16],
                name: "Okafor".into()
            })
        );
        assert_eq!(legs[1].gate, "C3");
        assert_eq!(legs[1].captain, None);
    }

    #[test]
    fn test_failed_row_does_not_stop_iteration() {
        let rows = vec![
            Row::new().with("gate", 12),
            Row::new().with("gate", "A1"),
        ];
        let mut legs = materialized(rows);
        assert_eq!(legs.len(), 2);

        let err = legs.next().unwrap().unwrap_err();
        assert!(matches!(err, Error::Mapping(ref m) if m.field == "gate"));
        assert_eq!(legs.next().unwrap().unwrap().gate, "A1");
        assert!(legs.next().is_none());
    }
}
