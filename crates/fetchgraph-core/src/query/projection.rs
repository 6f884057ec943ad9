//! Column projection policies for typed nodes.

use fetchgraph_proto::ColumnSet;

use super::filter::scalar_column;
use crate::error::Result;
use crate::metadata::EntityMetadata;

/// Which columns a typed node selects.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Projection {
    /// Every column of the entity.
    All,
    /// No columns beyond the ones needed to join.
    None,
    /// Every column bound to a declared field.
    #[default]
    DefinedOnly,
    /// The listed fields.
    Explicit(Vec<String>),
}

impl Projection {
    /// Select the listed fields.
    pub fn fields<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Projection::Explicit(fields.into_iter().map(Into::into).collect())
    }

    /// Resolve field names against `metadata`.
    pub fn resolve(&self, metadata: &EntityMetadata) -> Result<ColumnSet> {
        Ok(match self {
            Projection::All => ColumnSet::All,
            Projection::None => ColumnSet::None,
            Projection::DefinedOnly => ColumnSet::Columns(metadata.mapped_columns()),
            Projection::Explicit(fields) => {
                let mut columns = ColumnSet::Columns(Vec::with_capacity(fields.len()));
                for field in fields {
                    columns.ensure(&scalar_column(metadata, field)?);
                }
                columns
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::metadata::{metadata_of, Entity, EntityDef};
    use pretty_assertions::assert_eq;

    #[derive(Default)]
    struct Contact;

    impl Entity for Contact {
        fn describe(def: EntityDef<Self>) -> EntityDef<Self> {
            def.logical_name("contact")
                .field("last_name", "lastname", |_: &mut Self, _: String| {})
                .field("first_name", "firstname", |_: &mut Self, _: String| {})
                .primary_key("id", "contactid", |_: &mut Self, _: [u8; 16]| {})
                .field("birth_date", "birthdate", |_: &mut Self, _: Option<i64>| {})
        }
    }

    #[test]
    fn test_defined_only_yields_every_mapped_column() {
        let metadata = metadata_of::<Contact>().unwrap();
        let columns = Projection::DefinedOnly.resolve(&metadata).unwrap();
        assert_eq!(
            columns,
            ColumnSet::columns(["lastname", "firstname", "contactid", "birthdate"])
        );
    }

    #[test]
    fn test_explicit_fields() {
        let metadata = metadata_of::<Contact>().unwrap();
        let columns = Projection::fields(["first_name", "id", "first_name"])
            .resolve(&metadata)
            .unwrap();
        assert_eq!(columns, ColumnSet::columns(["firstname", "contactid"]));

        let err = Projection::fields(["nickname"])
            .resolve(&metadata)
            .unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }
}
