//! Fluent builders for declarations
//!
//! An [`ElementDeclarer`] is bound to one extension namespace and stamps it on
//! every declaration it creates. Builders own the declaration they assemble,
//! are consumed by value and finish with `build()`.
//!
//! # Example
//!
//! ```rust
//! use weftline_core::declarer::{DeclarationBuilder, ElementDeclarer, ParameterizedBuilder};
//! use weftline_core::ParameterValue;
//!
//! let core = ElementDeclarer::for_extension("mule");
//!
//! let flow = core
//!     .new_construct("flow")
//!     .with_ref_name("bridge")
//!     .with_component(
//!         core.new_operation("logger")
//!             .with_parameter_group("General", |g| {
//!                 g.with_parameter("message", ParameterValue::simple("#[payload]"))
//!             })
//!             .build(),
//!     )
//!     .build();
//!
//! let artifact = ElementDeclarer::new_artifact()
//!     .with_name("app")
//!     .with_global_element(flow)?
//!     .build();
//! assert_eq!(artifact.global_elements().len(), 1);
//! # Ok::<(), weftline_core::Error>(())
//! ```

use crate::declaration::{
    ArtifactDeclaration, ComponentDeclaration, ComponentKind, ConfigurationDeclaration,
    ConnectionDeclaration, ConstructDeclaration, ElementAttributes, GlobalElementDeclaration,
    ParameterDeclaration, ParameterGroupDeclaration, TopLevelParameterDeclaration,
};
use crate::error::{Error, Result};
use crate::value::{ListValueBuilder, ObjectValue, ObjectValueBuilder, ParameterValue};

/// Factory for declarations of one extension
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementDeclarer {
    extension: String,
}

impl ElementDeclarer {
    /// Create a declarer for the extension with the given namespace
    pub fn for_extension(extension: impl Into<String>) -> Self {
        Self {
            extension: extension.into(),
        }
    }

    /// The namespace stamped on created declarations
    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Start a configuration
    pub fn new_configuration(&self, name: impl Into<String>) -> ConfigurationBuilder {
        ConfigurationBuilder {
            declaration: ConfigurationDeclaration {
                attributes: ElementAttributes::new(&self.extension, name),
                ..Default::default()
            },
        }
    }

    /// Start a connection
    pub fn new_connection(&self, name: impl Into<String>) -> ConnectionBuilder {
        ConnectionBuilder {
            declaration: ConnectionDeclaration {
                attributes: ElementAttributes::new(&self.extension, name),
                ..Default::default()
            },
        }
    }

    /// Start a construct such as a flow
    pub fn new_construct(&self, name: impl Into<String>) -> ConstructBuilder {
        ConstructBuilder {
            declaration: ConstructDeclaration {
                attributes: ElementAttributes::new(&self.extension, name),
                ..Default::default()
            },
        }
    }

    /// Start a top-level parameter
    pub fn new_global_parameter(&self, name: impl Into<String>) -> TopLevelParameterBuilder {
        TopLevelParameterBuilder {
            declaration: TopLevelParameterDeclaration {
                attributes: ElementAttributes::new(&self.extension, name),
                ..Default::default()
            },
        }
    }

    /// Start an operation
    pub fn new_operation(&self, name: impl Into<String>) -> ComponentBuilder {
        self.new_component(ComponentKind::Operation, name)
    }

    /// Start a message source
    pub fn new_source(&self, name: impl Into<String>) -> ComponentBuilder {
        self.new_component(ComponentKind::Source, name)
    }

    /// Start a router
    pub fn new_router(&self, name: impl Into<String>) -> ComponentBuilder {
        self.new_component(ComponentKind::Router, name)
    }

    /// Start a scope
    pub fn new_scope(&self, name: impl Into<String>) -> ComponentBuilder {
        self.new_component(ComponentKind::Scope, name)
    }

    /// Start a route
    pub fn new_route(&self, name: impl Into<String>) -> ComponentBuilder {
        self.new_component(ComponentKind::Route, name)
    }

    fn new_component(&self, kind: ComponentKind, name: impl Into<String>) -> ComponentBuilder {
        ComponentBuilder {
            declaration: ComponentDeclaration::new(kind, &self.extension, name),
        }
    }

    /// Start an artifact
    pub fn new_artifact() -> ArtifactBuilder {
        ArtifactBuilder::default()
    }

    /// Start a parameter group
    pub fn new_parameter_group(name: impl Into<String>) -> ParameterGroupBuilder {
        ParameterGroupBuilder {
            declaration: ParameterGroupDeclaration {
                name: name.into(),
                ..Default::default()
            },
        }
    }

    /// Start a list value
    pub fn new_list_value() -> ListValueBuilder {
        ListValueBuilder::new()
    }

    /// Start an object value
    pub fn new_object_value() -> ObjectValueBuilder {
        ObjectValueBuilder::new()
    }
}

// ============================================================================
// Shared builder behavior
// ============================================================================

/// Mutators available on every declaration builder
pub trait DeclarationBuilder: Sized {
    /// Mutable access to the shared attributes
    fn attributes_mut(&mut self) -> &mut ElementAttributes;

    /// Attach an opaque metadata property
    fn with_metadata_property(
        mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.attributes_mut()
            .metadata_properties
            .insert(key.into(), value.into());
        self
    }

    /// Attach a parameter the extension does not model
    fn with_custom_parameter(
        mut self,
        name: impl Into<String>,
        value: impl Into<ParameterValue>,
    ) -> Self {
        self.attributes_mut()
            .custom_parameters
            .push(ParameterDeclaration::new(name, value));
        self
    }
}

/// Mutators for builders of declarations with parameter groups
pub trait ParameterizedBuilder: DeclarationBuilder {
    /// Mutable access to the parameter groups
    fn parameter_groups_mut(&mut self) -> &mut Vec<ParameterGroupDeclaration>;

    /// Build a group with `enricher` and append it. Groups with a repeated
    /// name are appended as well.
    fn with_parameter_group(
        self,
        name: impl Into<String>,
        enricher: impl FnOnce(ParameterGroupBuilder) -> ParameterGroupBuilder,
    ) -> Self {
        let group = enricher(ElementDeclarer::new_parameter_group(name)).build();
        self.with_parameter_group_declaration(group)
    }

    /// Append an already built group
    fn with_parameter_group_declaration(mut self, group: ParameterGroupDeclaration) -> Self {
        self.parameter_groups_mut().push(group);
        self
    }
}

// ============================================================================
// Builders
// ============================================================================

/// Builds an [`ArtifactDeclaration`]
#[derive(Debug, Default)]
pub struct ArtifactBuilder {
    declaration: ArtifactDeclaration,
}

impl ArtifactBuilder {
    /// Set the artifact name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.declaration.attributes.name = name.into();
        self
    }

    /// Append a global element. Reference names must be unique and usable
    /// as a location global name; nesting must stay within
    /// [`MAX_COMPONENT_DEPTH`](crate::declaration::MAX_COMPONENT_DEPTH) and
    /// [`MAX_VALUE_DEPTH`](crate::declaration::MAX_VALUE_DEPTH).
    pub fn with_global_element(mut self, element: impl Into<GlobalElementDeclaration>) -> Result<Self> {
        let element = element.into();
        element.validate()?;
        if let Some(ref_name) = element.ref_name()
            && self.declaration.global_element(ref_name).is_some()
        {
            return Err(Error::DuplicateRefName {
                ref_name: ref_name.to_string(),
            });
        }
        self.declaration.global_elements.push(element);
        Ok(self)
    }

    /// Finish the artifact
    pub fn build(self) -> ArtifactDeclaration {
        self.declaration
    }
}

impl DeclarationBuilder for ArtifactBuilder {
    fn attributes_mut(&mut self) -> &mut ElementAttributes {
        &mut self.declaration.attributes
    }
}

/// Builds a [`ConfigurationDeclaration`]
#[derive(Debug)]
pub struct ConfigurationBuilder {
    declaration: ConfigurationDeclaration,
}

impl ConfigurationBuilder {
    /// Set the reference name
    pub fn with_ref_name(mut self, ref_name: impl Into<String>) -> Self {
        self.declaration.ref_name = Some(ref_name.into());
        self
    }

    /// Set the connection, replacing any previous one
    pub fn with_connection(mut self, connection: ConnectionDeclaration) -> Self {
        if let Some(previous) = &self.declaration.connection {
            tracing::debug!(
                "Replacing connection '{}' of configuration '{}'",
                previous.attributes.name,
                self.declaration.attributes.name
            );
        }
        self.declaration.connection = Some(connection);
        self
    }

    /// Finish the configuration
    pub fn build(self) -> ConfigurationDeclaration {
        self.declaration
    }
}

impl DeclarationBuilder for ConfigurationBuilder {
    fn attributes_mut(&mut self) -> &mut ElementAttributes {
        &mut self.declaration.attributes
    }
}

impl ParameterizedBuilder for ConfigurationBuilder {
    fn parameter_groups_mut(&mut self) -> &mut Vec<ParameterGroupDeclaration> {
        &mut self.declaration.parameter_groups
    }
}

/// Builds a [`ConnectionDeclaration`]
#[derive(Debug)]
pub struct ConnectionBuilder {
    declaration: ConnectionDeclaration,
}

impl ConnectionBuilder {
    /// Finish the connection
    pub fn build(self) -> ConnectionDeclaration {
        self.declaration
    }
}

impl DeclarationBuilder for ConnectionBuilder {
    fn attributes_mut(&mut self) -> &mut ElementAttributes {
        &mut self.declaration.attributes
    }
}

impl ParameterizedBuilder for ConnectionBuilder {
    fn parameter_groups_mut(&mut self) -> &mut Vec<ParameterGroupDeclaration> {
        &mut self.declaration.parameter_groups
    }
}

/// Builds a [`ConstructDeclaration`]
#[derive(Debug)]
pub struct ConstructBuilder {
    declaration: ConstructDeclaration,
}

impl ConstructBuilder {
    /// Set the reference name
    pub fn with_ref_name(mut self, ref_name: impl Into<String>) -> Self {
        self.declaration.ref_name = Some(ref_name.into());
        self
    }

    /// Append a nested component
    pub fn with_component(mut self, component: ComponentDeclaration) -> Self {
        self.declaration.components.push(component);
        self
    }

    /// Append an error handling component
    pub fn with_error_handler(mut self, component: ComponentDeclaration) -> Self {
        self.declaration.error_handlers.push(component);
        self
    }

    /// Finish the construct
    pub fn build(self) -> ConstructDeclaration {
        self.declaration
    }
}

impl DeclarationBuilder for ConstructBuilder {
    fn attributes_mut(&mut self) -> &mut ElementAttributes {
        &mut self.declaration.attributes
    }
}

impl ParameterizedBuilder for ConstructBuilder {
    fn parameter_groups_mut(&mut self) -> &mut Vec<ParameterGroupDeclaration> {
        &mut self.declaration.parameter_groups
    }
}

/// Builds a [`TopLevelParameterDeclaration`]
#[derive(Debug)]
pub struct TopLevelParameterBuilder {
    declaration: TopLevelParameterDeclaration,
}

impl TopLevelParameterBuilder {
    /// Set the reference name
    pub fn with_ref_name(mut self, ref_name: impl Into<String>) -> Self {
        self.declaration.ref_name = Some(ref_name.into());
        self
    }

    /// Set the object value
    pub fn with_value(mut self, value: ObjectValue) -> Self {
        self.declaration.value = value;
        self
    }

    /// Finish the parameter
    pub fn build(self) -> TopLevelParameterDeclaration {
        self.declaration
    }
}

impl DeclarationBuilder for TopLevelParameterBuilder {
    fn attributes_mut(&mut self) -> &mut ElementAttributes {
        &mut self.declaration.attributes
    }
}

/// Builds a [`ComponentDeclaration`] of any role
#[derive(Debug)]
pub struct ComponentBuilder {
    declaration: ComponentDeclaration,
}

impl ComponentBuilder {
    /// Set the configuration this component uses
    pub fn with_config(mut self, config_ref: impl Into<String>) -> Self {
        self.declaration.config_ref = Some(config_ref.into());
        self
    }

    /// Append a nested component. A route cannot receive another route, and
    /// nesting is bounded by
    /// [`MAX_COMPONENT_DEPTH`](crate::declaration::MAX_COMPONENT_DEPTH).
    pub fn with_component(mut self, component: ComponentDeclaration) -> Result<Self> {
        self.declaration.check_child(&component)?;
        self.declaration.components.push(component);
        Ok(self)
    }

    /// Build a route in this component's namespace with `enricher` and
    /// append it as a nested component.
    pub fn with_route(
        self,
        name: impl Into<String>,
        enricher: impl FnOnce(ComponentBuilder) -> Result<ComponentBuilder>,
    ) -> Result<Self> {
        let route = ElementDeclarer::for_extension(&self.declaration.attributes.declaring_extension)
            .new_route(name);
        let route = enricher(route)?.build();
        self.with_component(route)
    }

    /// Append an error handling component, under the same rules as
    /// [`with_component`](Self::with_component)
    pub fn with_error_handler(mut self, component: ComponentDeclaration) -> Result<Self> {
        self.declaration.check_child(&component)?;
        self.declaration.error_handlers.push(component);
        Ok(self)
    }

    /// Finish the component
    pub fn build(self) -> ComponentDeclaration {
        self.declaration
    }
}

impl DeclarationBuilder for ComponentBuilder {
    fn attributes_mut(&mut self) -> &mut ElementAttributes {
        &mut self.declaration.attributes
    }
}

impl ParameterizedBuilder for ComponentBuilder {
    fn parameter_groups_mut(&mut self) -> &mut Vec<ParameterGroupDeclaration> {
        &mut self.declaration.parameter_groups
    }
}

/// Builds a [`ParameterGroupDeclaration`]
#[derive(Debug)]
pub struct ParameterGroupBuilder {
    declaration: ParameterGroupDeclaration,
}

impl ParameterGroupBuilder {
    /// Set a parameter; a later value for the same name replaces the earlier one
    pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<ParameterValue>) -> Self {
        self.declaration.parameters.insert(name.into(), value.into());
        self
    }

    /// Finish the group
    pub fn build(self) -> ParameterGroupDeclaration {
        self.declaration
    }
}
