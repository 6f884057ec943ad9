//! Typed include nodes driven by navigation fields.

use std::sync::Arc;

use fetchgraph_proto::{ColumnSet, JoinOperator};

use super::filter::{FilterTree, TypedFilterBuilder};
use super::node::LinkNode;
use super::projection::Projection;
use crate::error::{ConfigurationError, Error, Result};
use crate::metadata::{EntityMetadata, NavigationMapping};

/// An eager load of a navigation field.
///
/// The node carries the navigation mapping and the target metadata, so a
/// subtree resolves and materializes itself without knowing the Rust types
/// above or below it.
#[derive(Debug, Clone)]
pub struct IncludeNode {
    navigation: NavigationMapping,
    target: Arc<EntityMetadata>,
    operator: JoinOperator,
    alias: Option<String>,
    columns: ColumnSet,
    filter: Option<FilterTree>,
    children: Vec<IncludeNode>,
}

impl IncludeNode {
    /// The navigation field this node populates.
    pub fn navigation(&self) -> &NavigationMapping {
        &self.navigation
    }

    /// Metadata of the included type.
    pub fn target(&self) -> &Arc<EntityMetadata> {
        &self.target
    }
}

impl LinkNode for IncludeNode {
    fn entity_name(&self) -> &str {
        self.target.logical_name()
    }

    fn from_column(&self) -> &str {
        self.navigation.column()
    }

    fn to_column(&self) -> &str {
        self.target.primary_key_column()
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

/// Configures one [`IncludeNode`].
///
/// Defaults: left-outer join, `DefinedOnly` projection, alias taken from the
/// target's logical name at compile time.
#[derive(Debug)]
pub struct IncludeBuilder {
    navigation: NavigationMapping,
    target: Arc<EntityMetadata>,
    operator: JoinOperator,
    alias: Option<String>,
    projection: Projection,
    filter: Option<FilterTree>,
    children: Vec<IncludeNode>,
    error: Option<Error>,
}

impl IncludeBuilder {
    /// Start an include of `navigation` on `owner`.
    pub(crate) fn new(owner: &EntityMetadata, navigation: &str) -> Result<Self> {
        if navigation.trim().is_empty() {
            return Err(Error::InvalidArgument(format!(
                "empty navigation name on `{}`",
                owner.logical_name()
            )));
        }
        let Some(mapping) = owner.navigation(navigation) else {
            if owner.field(navigation).is_some() {
                return Err(Error::InvalidArgument(format!(
                    "`{navigation}` is a scalar field of `{}` and cannot be included",
                    owner.logical_name()
                )));
            }
            return Err(ConfigurationError::UnknownNavigation {
                entity: owner.logical_name().to_string(),
                navigation: navigation.to_string(),
            }
            .into());
        };

        Ok(Self {
            navigation: mapping.clone(),
            target: mapping.target()?,
            operator: JoinOperator::LeftOuter,
            alias: None,
            projection: Projection::DefinedOnly,
            filter: None,
            children: Vec::new(),
            error: None,
        })
    }

    /// Metadata of the included type.
    pub fn target(&self) -> &EntityMetadata {
        &self.target
    }

    /// Set the projected fields.
    pub fn columns(mut self, projection: Projection) -> Self {
        self.projection = projection;
        self
    }

    /// Set the alias prefixing this node's columns in rows.
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Set the join operator.
    pub fn operator(mut self, operator: JoinOperator) -> Self {
        self.operator = operator;
        self
    }

    /// Filter the included entity by its own fields.
    pub fn filter(
        mut self,
        configure: impl FnOnce(TypedFilterBuilder) -> TypedFilterBuilder,
    ) -> Self {
        if self.error.is_some() {
            return self;
        }
        let existing = self.filter.take().unwrap_or_default();
        let builder = TypedFilterBuilder::new(Arc::clone(&self.target), existing);
        match configure(builder).build() {
            Ok(tree) => self.filter = Some(tree),
            Err(err) => self.error = Some(err),
        }
        self
    }

    /// Include a navigation field of the included type.
    pub fn then_include(
        mut self,
        navigation: &str,
        configure: impl FnOnce(IncludeBuilder) -> IncludeBuilder,
    ) -> Self {
        if self.error.is_some() {
            return self;
        }
        match build_include(&self.target, navigation, configure) {
            Ok(node) => self.children.push(node),
            Err(err) => self.error = Some(err),
        }
        self
    }

    /// Finish the node, or return the first failure recorded while configuring it.
    pub fn build(self) -> Result<IncludeNode> {
        if let Some(err) = self.error {
            return Err(err);
        }
        let columns = self.projection.resolve(&self.target)?;
        Ok(IncludeNode {
            navigation: self.navigation,
            target: self.target,
            operator: self.operator,
            alias: self.alias,
            columns,
            filter: self.filter,
            children: self.children,
        })
    }
}

/// Resolve, configure, and finish an include of `navigation` on `owner`.
pub(crate) fn build_include(
    owner: &EntityMetadata,
    navigation: &str,
    configure: impl FnOnce(IncludeBuilder) -> IncludeBuilder,
) -> Result<IncludeNode> {
    configure(IncludeBuilder::new(owner, navigation)?).build()
}
