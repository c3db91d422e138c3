//! Location resolution
//!
//! Finds the declaration a [`Location`] points at inside an
//! [`ArtifactDeclaration`]. The global name selects a global element by
//! `refName`; each following part descends one level:
//!
//! | Part                  | Descends into                                  |
//! |-----------------------|------------------------------------------------|
//! | `connection`          | the connection of a configuration              |
//! | `source`              | the message source of a flow or component      |
//! | `processors/<n>`      | the n-th nested component, sources excluded    |
//! | `errorHandler/<n>`    | the n-th error handling component              |
//! | any other name        | a parameter group, then a parameter by name    |
//!
//! A path that leads nowhere yields `None`.

use serde::Serialize;

use crate::declaration::{
    ArtifactDeclaration, ComponentContainer, ComponentDeclaration, ConfigurationDeclaration,
    ConnectionDeclaration, ConstructDeclaration, DeclarationKind, ElementDeclaration,
    GlobalElementDeclaration, ParameterGroupDeclaration, ParameterizedElement,
    TopLevelParameterDeclaration,
};
use crate::error::Result;
use crate::location::{Location, LocationBuilder, PathSegment};
use crate::value::ParameterValue;

/// A borrowed node of a declaration tree
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "declaration", rename_all = "camelCase")]
pub enum DeclarationRef<'a> {
    /// Extension configuration
    Configuration(&'a ConfigurationDeclaration),
    /// Connection of a configuration
    Connection(&'a ConnectionDeclaration),
    /// Flow-like construct
    Construct(&'a ConstructDeclaration),
    /// Global object parameter
    TopLevelParameter(&'a TopLevelParameterDeclaration),
    /// Nested component
    Component(&'a ComponentDeclaration),
    /// Parameter group
    ParameterGroup(&'a ParameterGroupDeclaration),
    /// Single parameter
    Parameter {
        /// Parameter name
        name: &'a str,
        /// Parameter value
        value: &'a ParameterValue,
    },
}

impl<'a> DeclarationRef<'a> {
    /// Role of the referenced node
    pub fn kind(&self) -> DeclarationKind {
        match self {
            Self::Configuration(_) => DeclarationKind::Configuration,
            Self::Connection(_) => DeclarationKind::Connection,
            Self::Construct(_) => DeclarationKind::Construct,
            Self::TopLevelParameter(_) => DeclarationKind::TopLevelParameter,
            Self::Component(c) => DeclarationKind::Component(c.kind()),
            Self::ParameterGroup(_) => DeclarationKind::ParameterGroup,
            Self::Parameter { .. } => DeclarationKind::Parameter,
        }
    }

    /// Name of the referenced node
    pub fn name(&self) -> &'a str {
        match *self {
            Self::Configuration(c) => c.name(),
            Self::Connection(c) => c.name(),
            Self::Construct(c) => c.name(),
            Self::TopLevelParameter(p) => p.name(),
            Self::Component(c) => c.name(),
            Self::ParameterGroup(g) => g.name(),
            Self::Parameter { name, .. } => name,
        }
    }

    /// The referenced component, if this is one
    pub fn as_component(&self) -> Option<&'a ComponentDeclaration> {
        match *self {
            Self::Component(c) => Some(c),
            _ => None,
        }
    }

    fn container(self) -> Option<&'a dyn ComponentContainer> {
        match self {
            Self::Construct(c) => Some(c),
            Self::Component(c) => Some(c),
            _ => None,
        }
    }

    fn parameterized(self) -> Option<&'a dyn ParameterizedElement> {
        match self {
            Self::Configuration(c) => Some(c),
            Self::Connection(c) => Some(c),
            Self::Construct(c) => Some(c),
            Self::Component(c) => Some(c),
            _ => None,
        }
    }

    fn connection(self) -> Option<Self> {
        match self {
            Self::Configuration(c) => c.connection().map(Self::Connection),
            _ => None,
        }
    }

    fn named_child(self, name: &str) -> Option<Self> {
        if let Some(element) = self.parameterized() {
            let groups = element.parameter_groups();
            if let Some(group) = groups.iter().find(|g| g.name() == name) {
                return Some(Self::ParameterGroup(group));
            }
            return groups
                .iter()
                .find_map(|g| g.parameters().get_key_value(name))
                .map(parameter_ref);
        }
        let parameters = match self {
            Self::ParameterGroup(g) => g.parameters(),
            Self::TopLevelParameter(p) => p.value().parameters(),
            Self::Parameter { value, .. } => value.as_object()?.parameters(),
            _ => return None,
        };
        parameters.get_key_value(name).map(parameter_ref)
    }
}

fn parameter_ref<'a>((name, value): (&'a String, &'a ParameterValue)) -> DeclarationRef<'a> {
    DeclarationRef::Parameter {
        name: name.as_str(),
        value,
    }
}

impl<'a> From<&'a GlobalElementDeclaration> for DeclarationRef<'a> {
    fn from(element: &'a GlobalElementDeclaration) -> Self {
        match element {
            GlobalElementDeclaration::Configuration(c) => Self::Configuration(c),
            GlobalElementDeclaration::Construct(c) => Self::Construct(c),
            GlobalElementDeclaration::TopLevelParameter(p) => Self::TopLevelParameter(p),
        }
    }
}

/// Find the declaration at `location`.
///
/// Runs in one pass over the location parts. Returns `None` when any step
/// has no matching child.
pub fn find<'a>(artifact: &'a ArtifactDeclaration, location: &Location) -> Option<DeclarationRef<'a>> {
    let Some(global) = artifact.global_element(location.global_name()) else {
        tracing::debug!("No global element with refName '{}'", location.global_name());
        return None;
    };

    let mut current = DeclarationRef::from(global);
    let mut segments = location.segments();
    while let Some(segment) = segments.next() {
        let next = match segment {
            PathSegment::Connection => current.connection(),
            PathSegment::Source => current
                .container()
                .and_then(|c| c.source())
                .map(DeclarationRef::Component),
            PathSegment::Processors => match (current.container(), segments.next()) {
                (Some(container), Some(PathSegment::Index(index))) => {
                    container.processor(index).map(DeclarationRef::Component)
                }
                _ => None,
            },
            PathSegment::ErrorHandler => match (current.container(), segments.next()) {
                (Some(container), Some(PathSegment::Index(index))) => container
                    .error_handlers()
                    .get(index)
                    .map(DeclarationRef::Component),
                _ => None,
            },
            PathSegment::Index(_) => None,
            PathSegment::Name(name) => current.named_child(name),
        };

        match next {
            Some(node) => {
                tracing::trace!("{:?} '{}' resolved at '{}'", node.kind(), node.name(), location);
                current = node;
            }
            None => {
                tracing::debug!(
                    "Location '{}' has no match below {:?} '{}'",
                    location,
                    current.kind(),
                    current.name()
                );
                return None;
            }
        }
    }
    Some(current)
}

impl ArtifactDeclaration {
    /// Find the declaration at `location`, see [`find`]
    pub fn find_element(&self, location: &Location) -> Option<DeclarationRef<'_>> {
        find(self, location)
    }

    /// Locations of every addressable element, in tree order.
    ///
    /// Covers global elements with a `refName`, connections, sources,
    /// processors and error handlers. Each returned location resolves back
    /// to its declaration with [`find`].
    pub fn locations(&self) -> Result<Vec<(Location, DeclarationRef<'_>)>> {
        let mut found = Vec::new();
        for element in &self.global_elements {
            let Some(ref_name) = element.ref_name() else {
                continue;
            };
            let root = Location::builder().global_name(ref_name)?;
            let node = DeclarationRef::from(element);
            found.push((root.build()?, node));
            collect_locations(&root, node, &mut found)?;
        }
        Ok(found)
    }
}

fn collect_locations<'a>(
    path: &LocationBuilder,
    node: DeclarationRef<'a>,
    found: &mut Vec<(Location, DeclarationRef<'a>)>,
) -> Result<()> {
    if let Some(connection) = node.connection() {
        found.push((path.add_connection_part()?.build()?, connection));
    }
    let Some(container) = node.container() else {
        return Ok(());
    };

    if let Some(source) = container.source() {
        found.push((path.add_source_part()?.build()?, DeclarationRef::Component(source)));
    }
    let processors = path.add_processors_part()?;
    for (index, component) in container.processors().into_iter().enumerate() {
        let child = processors.add_index_part(index)?;
        let node = DeclarationRef::Component(component);
        found.push((child.build()?, node));
        collect_locations(&child, node, found)?;
    }
    let handlers = path.add_error_handler_part()?;
    for (index, component) in container.error_handlers().iter().enumerate() {
        let child = handlers.add_index_part(index)?;
        let node = DeclarationRef::Component(component);
        found.push((child.build()?, node));
        collect_locations(&child, node, found)?;
    }
    Ok(())
}
