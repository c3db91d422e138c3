//! Declaration tree
//!
//! An [`ArtifactDeclaration`] is the complete configuration of one
//! application. It owns global elements, which in turn own parameter groups,
//! connections and nested components:
//!
//! ```text
//! Artifact
//! ├── Configuration ── Connection
//! ├── TopLevelParameter (object value)
//! └── Construct (flow)
//!     ├── Source
//!     ├── Operation
//!     ├── Router
//!     │   ├── Route ── components...
//!     │   └── Route ── components...
//!     ├── Scope ── components...
//!     └── error handlers...
//! ```
//!
//! Declarations are produced by the builders in [`crate::declarer`] and are
//! read-only afterwards.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use crate::error::{Error, Result};
use crate::location::validate_global_name;
use crate::value::{ObjectValue, ParameterValue};

/// Deepest nesting of components below a global element
pub const MAX_COMPONENT_DEPTH: usize = 32;

/// Deepest nesting of a parameter value or metadata property value
pub const MAX_VALUE_DEPTH: usize = 16;

/// Attributes carried by every declaration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementAttributes {
    pub(crate) name: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub(crate) declaring_extension: String,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub(crate) metadata_properties: BTreeMap<String, serde_json::Value>,

    #[serde(
        default,
        rename = "customConfigurationParameters",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub(crate) custom_parameters: Vec<ParameterDeclaration>,
}

impl ElementAttributes {
    pub(crate) fn new(extension: &str, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            declaring_extension: extension.to_string(),
            ..Default::default()
        }
    }
}

/// A single named parameter outside of any group
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParameterDeclaration {
    pub(crate) name: String,
    pub(crate) value: ParameterValue,
}

impl ParameterDeclaration {
    /// Create a parameter
    pub fn new(name: impl Into<String>, value: impl Into<ParameterValue>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Parameter name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parameter value
    pub fn value(&self) -> &ParameterValue {
        &self.value
    }
}

/// A named bundle of parameters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterGroupDeclaration {
    pub(crate) name: String,
    #[serde(default)]
    pub(crate) parameters: BTreeMap<String, ParameterValue>,
}

impl ParameterGroupDeclaration {
    /// Group name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// All parameters of the group
    pub fn parameters(&self) -> &BTreeMap<String, ParameterValue> {
        &self.parameters
    }

    /// Look up a parameter by name
    pub fn parameter(&self, name: &str) -> Option<&ParameterValue> {
        self.parameters.get(name)
    }
}

// ============================================================================
// Shared behavior
// ============================================================================

/// Accessors common to every declaration
pub trait ElementDeclaration {
    /// The shared attributes
    fn attributes(&self) -> &ElementAttributes;

    /// Element name, e.g. `flow` or `logger`
    fn name(&self) -> &str {
        &self.attributes().name
    }

    /// Namespace of the extension that declared this element
    fn declaring_extension(&self) -> &str {
        &self.attributes().declaring_extension
    }

    /// Opaque metadata attached to the element
    fn metadata_properties(&self) -> &BTreeMap<String, serde_json::Value> {
        &self.attributes().metadata_properties
    }

    /// Look up one metadata property
    fn metadata_property(&self, key: &str) -> Option<&serde_json::Value> {
        self.attributes().metadata_properties.get(key)
    }

    /// Parameters not modelled by the declaring extension
    fn custom_parameters(&self) -> &[ParameterDeclaration] {
        &self.attributes().custom_parameters
    }
}

/// Declarations that carry parameter groups
pub trait ParameterizedElement: ElementDeclaration {
    /// All parameter groups, in declaration order. Names may repeat.
    fn parameter_groups(&self) -> &[ParameterGroupDeclaration];

    /// The first parameter group with the given name
    fn parameter_group(&self, name: &str) -> Option<&ParameterGroupDeclaration> {
        self.parameter_groups().iter().find(|g| g.name == name)
    }

    /// A parameter inside the first group with the given name
    fn parameter(&self, group: &str, name: &str) -> Option<&ParameterValue> {
        self.parameter_group(group)?.parameter(name)
    }

    /// The first parameter with the given name across all groups
    fn find_parameter(&self, name: &str) -> Option<&ParameterValue> {
        self.parameter_groups()
            .iter()
            .find_map(|group| group.parameter(name))
    }
}

/// Declarations that own nested components
pub trait ComponentContainer: ElementDeclaration {
    /// Nested components, in declaration order
    fn components(&self) -> &[ComponentDeclaration];

    /// Error handling components, in declaration order
    fn error_handlers(&self) -> &[ComponentDeclaration];

    /// The message source, if one was declared
    fn source(&self) -> Option<&ComponentDeclaration> {
        self.components()
            .iter()
            .find(|c| c.kind == ComponentKind::Source)
    }

    /// The nested components excluding the message source
    fn processors(&self) -> Vec<&ComponentDeclaration> {
        self.components()
            .iter()
            .filter(|c| c.kind != ComponentKind::Source)
            .collect()
    }

    /// The processor at a zero-based position
    fn processor(&self, index: usize) -> Option<&ComponentDeclaration> {
        self.components()
            .iter()
            .filter(|c| c.kind != ComponentKind::Source)
            .nth(index)
    }
}

// ============================================================================
// Artifact and global elements
// ============================================================================

/// The complete configuration unit of one application
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactDeclaration {
    #[serde(flatten)]
    pub(crate) attributes: ElementAttributes,

    #[serde(default)]
    pub(crate) global_elements: Vec<GlobalElementDeclaration>,
}

impl ArtifactDeclaration {
    /// Global elements, in declaration order
    pub fn global_elements(&self) -> &[GlobalElementDeclaration] {
        &self.global_elements
    }

    /// The global element with the given reference name
    pub fn global_element(&self, ref_name: &str) -> Option<&GlobalElementDeclaration> {
        self.global_elements
            .iter()
            .find(|e| e.ref_name() == Some(ref_name))
    }

    /// Configurations, in declaration order
    pub fn configurations(&self) -> impl Iterator<Item = &ConfigurationDeclaration> {
        self.global_elements.iter().filter_map(|e| match e {
            GlobalElementDeclaration::Configuration(c) => Some(c),
            _ => None,
        })
    }

    /// Constructs (flows and similar), in declaration order
    pub fn constructs(&self) -> impl Iterator<Item = &ConstructDeclaration> {
        self.global_elements.iter().filter_map(|e| match e {
            GlobalElementDeclaration::Construct(c) => Some(c),
            _ => None,
        })
    }

    /// Top-level parameters, in declaration order
    pub fn top_level_parameters(&self) -> impl Iterator<Item = &TopLevelParameterDeclaration> {
        self.global_elements.iter().filter_map(|e| match e {
            GlobalElementDeclaration::TopLevelParameter(p) => Some(p),
            _ => None,
        })
    }

    /// Check the ownership rules of the whole tree.
    ///
    /// Builders already enforce these; documents read from text are checked
    /// here.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for element in &self.global_elements {
            if let Some(ref_name) = element.ref_name()
                && !seen.insert(ref_name)
            {
                return Err(Error::DuplicateRefName {
                    ref_name: ref_name.to_string(),
                });
            }
            element.validate()?;
        }
        check_attributes(&self.attributes)
    }
}

impl ElementDeclaration for ArtifactDeclaration {
    fn attributes(&self) -> &ElementAttributes {
        &self.attributes
    }
}

/// A top-level, independently addressable declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum GlobalElementDeclaration {
    /// Extension configuration
    Configuration(ConfigurationDeclaration),
    /// Flow-like construct owning components
    Construct(ConstructDeclaration),
    /// Global object parameter
    TopLevelParameter(TopLevelParameterDeclaration),
}

impl GlobalElementDeclaration {
    /// Reference name used to address the element
    pub fn ref_name(&self) -> Option<&str> {
        match self {
            Self::Configuration(c) => c.ref_name.as_deref(),
            Self::Construct(c) => c.ref_name.as_deref(),
            Self::TopLevelParameter(p) => p.ref_name.as_deref(),
        }
    }

    /// The role of this element
    pub fn kind(&self) -> DeclarationKind {
        match self {
            Self::Configuration(_) => DeclarationKind::Configuration,
            Self::Construct(_) => DeclarationKind::Construct,
            Self::TopLevelParameter(_) => DeclarationKind::TopLevelParameter,
        }
    }

    /// Check the rules of this element on its own: an addressable
    /// `refName`, nesting bounds and routes.
    pub(crate) fn validate(&self) -> Result<()> {
        if let Some(ref_name) = self.ref_name() {
            validate_global_name(ref_name)?;
        }
        check_attributes(self.attributes())?;
        match self {
            Self::Configuration(config) => {
                check_groups(&config.attributes.name, &config.parameter_groups)?;
                if let Some(connection) = &config.connection {
                    check_attributes(&connection.attributes)?;
                    check_groups(&connection.attributes.name, &connection.parameter_groups)?;
                }
            }
            Self::Construct(construct) => {
                check_groups(&construct.attributes.name, &construct.parameter_groups)?;
                for component in construct.components.iter().chain(&construct.error_handlers) {
                    if component.nesting_depth() > MAX_COMPONENT_DEPTH {
                        return Err(too_deep_error(&construct.attributes.name));
                    }
                    component.validate()?;
                }
            }
            Self::TopLevelParameter(parameter) => {
                if parameter.value.depth() > MAX_VALUE_DEPTH {
                    return Err(value_too_deep_error(&parameter.attributes.name, "value"));
                }
            }
        }
        Ok(())
    }
}

impl ElementDeclaration for GlobalElementDeclaration {
    fn attributes(&self) -> &ElementAttributes {
        match self {
            Self::Configuration(c) => &c.attributes,
            Self::Construct(c) => &c.attributes,
            Self::TopLevelParameter(p) => &p.attributes,
        }
    }
}

impl From<ConfigurationDeclaration> for GlobalElementDeclaration {
    fn from(value: ConfigurationDeclaration) -> Self {
        Self::Configuration(value)
    }
}

impl From<ConstructDeclaration> for GlobalElementDeclaration {
    fn from(value: ConstructDeclaration) -> Self {
        Self::Construct(value)
    }
}

impl From<TopLevelParameterDeclaration> for GlobalElementDeclaration {
    fn from(value: TopLevelParameterDeclaration) -> Self {
        Self::TopLevelParameter(value)
    }
}

/// Configuration of an extension, owning at most one connection
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigurationDeclaration {
    #[serde(flatten)]
    pub(crate) attributes: ElementAttributes,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) ref_name: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub(crate) parameter_groups: Vec<ParameterGroupDeclaration>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) connection: Option<ConnectionDeclaration>,
}

impl ConfigurationDeclaration {
    /// Reference name
    pub fn ref_name(&self) -> Option<&str> {
        self.ref_name.as_deref()
    }

    /// The connection, if declared
    pub fn connection(&self) -> Option<&ConnectionDeclaration> {
        self.connection.as_ref()
    }
}

impl ElementDeclaration for ConfigurationDeclaration {
    fn attributes(&self) -> &ElementAttributes {
        &self.attributes
    }
}

impl ParameterizedElement for ConfigurationDeclaration {
    fn parameter_groups(&self) -> &[ParameterGroupDeclaration] {
        &self.parameter_groups
    }
}

/// Connection owned by a configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionDeclaration {
    #[serde(flatten)]
    pub(crate) attributes: ElementAttributes,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub(crate) parameter_groups: Vec<ParameterGroupDeclaration>,
}

impl ElementDeclaration for ConnectionDeclaration {
    fn attributes(&self) -> &ElementAttributes {
        &self.attributes
    }
}

impl ParameterizedElement for ConnectionDeclaration {
    fn parameter_groups(&self) -> &[ParameterGroupDeclaration] {
        &self.parameter_groups
    }
}

/// Flow-like global element owning a chain of components
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConstructDeclaration {
    #[serde(flatten)]
    pub(crate) attributes: ElementAttributes,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) ref_name: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub(crate) parameter_groups: Vec<ParameterGroupDeclaration>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub(crate) components: Vec<ComponentDeclaration>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub(crate) error_handlers: Vec<ComponentDeclaration>,
}

impl ConstructDeclaration {
    /// Reference name
    pub fn ref_name(&self) -> Option<&str> {
        self.ref_name.as_deref()
    }
}

impl ElementDeclaration for ConstructDeclaration {
    fn attributes(&self) -> &ElementAttributes {
        &self.attributes
    }
}

impl ParameterizedElement for ConstructDeclaration {
    fn parameter_groups(&self) -> &[ParameterGroupDeclaration] {
        &self.parameter_groups
    }
}

impl ComponentContainer for ConstructDeclaration {
    fn components(&self) -> &[ComponentDeclaration] {
        &self.components
    }

    fn error_handlers(&self) -> &[ComponentDeclaration] {
        &self.error_handlers
    }
}

/// Global parameter holding a single object value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopLevelParameterDeclaration {
    #[serde(flatten)]
    pub(crate) attributes: ElementAttributes,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) ref_name: Option<String>,

    #[serde(default)]
    pub(crate) value: ObjectValue,
}

impl TopLevelParameterDeclaration {
    /// Reference name
    pub fn ref_name(&self) -> Option<&str> {
        self.ref_name.as_deref()
    }

    /// The parameter value
    pub fn value(&self) -> &ObjectValue {
        &self.value
    }
}

impl ElementDeclaration for TopLevelParameterDeclaration {
    fn attributes(&self) -> &ElementAttributes {
        &self.attributes
    }
}

// ============================================================================
// Components
// ============================================================================

/// Role of a component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ComponentKind {
    /// Processor executing one operation
    Operation,
    /// Message source starting a flow
    Source,
    /// Component dispatching to routes
    Router,
    /// Component wrapping a nested chain
    Scope,
    /// Branch of a router
    Route,
}

/// Role of any declaration in the tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DeclarationKind {
    /// The artifact root
    Artifact,
    /// Extension configuration
    Configuration,
    /// Connection owned by a configuration
    Connection,
    /// Flow-like construct
    Construct,
    /// Global object parameter
    TopLevelParameter,
    /// Nested component of the given role
    Component(ComponentKind),
    /// Parameter group
    ParameterGroup,
    /// Single parameter value
    Parameter,
}

/// A processing unit nested inside a construct or another component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentDeclaration {
    pub(crate) kind: ComponentKind,

    #[serde(flatten)]
    pub(crate) attributes: ElementAttributes,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) config_ref: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub(crate) parameter_groups: Vec<ParameterGroupDeclaration>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub(crate) components: Vec<ComponentDeclaration>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub(crate) error_handlers: Vec<ComponentDeclaration>,
}

impl ComponentDeclaration {
    pub(crate) fn new(kind: ComponentKind, extension: &str, name: impl Into<String>) -> Self {
        Self {
            kind,
            attributes: ElementAttributes::new(extension, name),
            config_ref: None,
            parameter_groups: Vec::new(),
            components: Vec::new(),
            error_handlers: Vec::new(),
        }
    }

    /// Role of the component
    pub fn kind(&self) -> ComponentKind {
        self.kind
    }

    /// Name of the configuration this component uses
    pub fn config_ref(&self) -> Option<&str> {
        self.config_ref.as_deref()
    }

    /// Routes owned by this component
    pub fn routes(&self) -> impl Iterator<Item = &ComponentDeclaration> {
        self.components
            .iter()
            .filter(|c| c.kind == ComponentKind::Route)
    }

    /// Levels of components in this subtree, counting this one
    pub fn nesting_depth(&self) -> usize {
        1 + self
            .components
            .iter()
            .chain(&self.error_handlers)
            .map(ComponentDeclaration::nesting_depth)
            .max()
            .unwrap_or(0)
    }

    fn validate(&self) -> Result<()> {
        check_attributes(&self.attributes)?;
        check_groups(&self.attributes.name, &self.parameter_groups)?;
        for child in self.components.iter().chain(&self.error_handlers) {
            self.check_child(child)?;
            child.validate()?;
        }
        Ok(())
    }

    /// Check that `child` may be nested in this component, as a component or
    /// as an error handler.
    pub(crate) fn check_child(&self, child: &ComponentDeclaration) -> Result<()> {
        if self.kind == ComponentKind::Route && child.kind == ComponentKind::Route {
            return Err(Error::InvalidStructure {
                element: self.attributes.name.clone(),
                message: format!(
                    "a route cannot contain the nested route '{}'",
                    child.attributes.name
                ),
            });
        }
        if child.nesting_depth() >= MAX_COMPONENT_DEPTH {
            return Err(too_deep_error(&self.attributes.name));
        }
        Ok(())
    }
}

fn too_deep_error(element: &str) -> Error {
    Error::InvalidStructure {
        element: element.to_string(),
        message: format!("components are nested deeper than {MAX_COMPONENT_DEPTH} levels"),
    }
}

fn value_too_deep_error(element: &str, what: &str) -> Error {
    Error::InvalidStructure {
        element: element.to_string(),
        message: format!("{what} is nested deeper than {MAX_VALUE_DEPTH} levels"),
    }
}

fn check_attributes(attributes: &ElementAttributes) -> Result<()> {
    for (key, value) in &attributes.metadata_properties {
        if json_depth(value) > MAX_VALUE_DEPTH {
            return Err(value_too_deep_error(
                &attributes.name,
                &format!("metadata property '{key}'"),
            ));
        }
    }
    for parameter in &attributes.custom_parameters {
        if parameter.value.depth() > MAX_VALUE_DEPTH {
            return Err(value_too_deep_error(
                &attributes.name,
                &format!("custom parameter '{}'", parameter.name),
            ));
        }
    }
    Ok(())
}

fn check_groups(element: &str, groups: &[ParameterGroupDeclaration]) -> Result<()> {
    for group in groups {
        for (name, value) in &group.parameters {
            if value.depth() > MAX_VALUE_DEPTH {
                return Err(value_too_deep_error(element, &format!("parameter '{name}'")));
            }
        }
    }
    Ok(())
}

fn json_depth(value: &serde_json::Value) -> usize {
    match value {
        serde_json::Value::Array(values) => 1 + values.iter().map(json_depth).max().unwrap_or(0),
        serde_json::Value::Object(map) => 1 + map.values().map(json_depth).max().unwrap_or(0),
        _ => 1,
    }
}

impl ElementDeclaration for ComponentDeclaration {
    fn attributes(&self) -> &ElementAttributes {
        &self.attributes
    }
}

impl ParameterizedElement for ComponentDeclaration {
    fn parameter_groups(&self) -> &[ParameterGroupDeclaration] {
        &self.parameter_groups
    }
}

impl ComponentContainer for ComponentDeclaration {
    fn components(&self) -> &[ComponentDeclaration] {
        &self.components
    }

    fn error_handlers(&self) -> &[ComponentDeclaration] {
        &self.error_handlers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn component(kind: ComponentKind, name: &str) -> ComponentDeclaration {
        ComponentDeclaration::new(kind, "mule", name)
    }

    fn construct(ref_name: &str, components: Vec<ComponentDeclaration>) -> GlobalElementDeclaration {
        GlobalElementDeclaration::Construct(ConstructDeclaration {
            attributes: ElementAttributes::new("mule", "flow"),
            ref_name: Some(ref_name.to_string()),
            components,
            ..Default::default()
        })
    }

    #[test]
    fn test_processors_skip_source() {
        let flow = ConstructDeclaration {
            attributes: ElementAttributes::new("mule", "flow"),
            components: vec![
                component(ComponentKind::Source, "listener"),
                component(ComponentKind::Operation, "logger"),
                component(ComponentKind::Operation, "set-payload"),
            ],
            ..Default::default()
        };
        assert_eq!(flow.source().unwrap().name(), "listener");
        assert_eq!(flow.processors().len(), 2);
        assert_eq!(flow.processor(1).unwrap().name(), "set-payload");
        assert!(flow.processor(2).is_none());
    }

    #[test]
    fn test_parameter_group_lookup_is_first_wins() {
        let op = ComponentDeclaration {
            parameter_groups: vec![
                ParameterGroupDeclaration {
                    name: "General".to_string(),
                    parameters: [("message".to_string(), ParameterValue::simple("first"))]
                        .into_iter()
                        .collect(),
                },
                ParameterGroupDeclaration {
                    name: "General".to_string(),
                    parameters: [("message".to_string(), ParameterValue::simple("second"))]
                        .into_iter()
                        .collect(),
                },
            ],
            ..component(ComponentKind::Operation, "logger")
        };
        assert_eq!(op.parameter_groups().len(), 2);
        assert_eq!(
            op.parameter("General", "message"),
            Some(&ParameterValue::simple("first"))
        );
        assert_eq!(
            op.find_parameter("message"),
            Some(&ParameterValue::simple("first"))
        );
        assert!(op.parameter("Advanced", "message").is_none());
    }

    #[test]
    fn test_validate_rejects_duplicate_ref_names() {
        let artifact = ArtifactDeclaration {
            global_elements: vec![construct("main", vec![]), construct("main", vec![])],
            ..Default::default()
        };
        assert!(matches!(
            artifact.validate(),
            Err(Error::DuplicateRefName { ref_name }) if ref_name == "main"
        ));
    }

    #[test]
    fn test_validate_rejects_route_in_route() {
        let mut outer = component(ComponentKind::Route, "when");
        outer.components.push(component(ComponentKind::Route, "otherwise"));
        let mut router = component(ComponentKind::Router, "choice");
        router.components.push(outer);

        let artifact = ArtifactDeclaration {
            global_elements: vec![construct("main", vec![router])],
            ..Default::default()
        };
        let err = artifact.validate().unwrap_err();
        assert!(matches!(err, Error::InvalidStructure { .. }));
        assert!(err.to_string().contains("otherwise"));
    }

    #[test]
    fn test_validate_accepts_routes_under_router() {
        let mut router = component(ComponentKind::Router, "choice");
        router.components.push(component(ComponentKind::Route, "when"));
        router.components.push(component(ComponentKind::Route, "otherwise"));
        assert_eq!(router.routes().count(), 2);

        let artifact = ArtifactDeclaration {
            global_elements: vec![construct("main", vec![router])],
            ..Default::default()
        };
        assert!(artifact.validate().is_ok());
    }

    #[test]
    fn test_global_element_lookup() {
        let artifact = ArtifactDeclaration {
            global_elements: vec![construct("a", vec![]), construct("b", vec![])],
            ..Default::default()
        };
        assert_eq!(artifact.global_element("b").unwrap().ref_name(), Some("b"));
        assert!(artifact.global_element("B").is_none());
        assert_eq!(artifact.constructs().count(), 2);
        assert_eq!(artifact.configurations().count(), 0);
    }
}
