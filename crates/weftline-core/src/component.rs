//! Runtime component boundary
//!
//! Read-only data the hosting runtime attaches to live components: where the
//! component was declared and an open bag of annotations. Nothing here is
//! interpreted by the declaration model; [`ComponentLocation::to_location`]
//! bridges back to a validated [`Location`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::location::{Location, PARTS_SEPARATOR};

/// Namespace assumed when an identifier has no prefix
pub const DEFAULT_NAMESPACE: &str = "mule";

// ============================================================================
// Identifiers
// ============================================================================

/// `namespace:name` identifier of a component type
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ComponentIdentifier {
    /// Extension namespace
    pub namespace: String,
    /// Element name
    pub name: String,
}

impl ComponentIdentifier {
    /// Create an identifier
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for ComponentIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.name)
    }
}

impl FromStr for ComponentIdentifier {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (namespace, name) = s.split_once(':').unwrap_or((DEFAULT_NAMESPACE, s));
        if namespace.is_empty() || name.is_empty() {
            return Err(Error::InvalidStructure {
                element: s.to_string(),
                message: "component identifier must look like 'namespace:name'".to_string(),
            });
        }
        Ok(Self::new(namespace, name))
    }
}

/// Runtime role of a component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComponentType {
    /// Flow-like container
    Flow,
    /// Message source
    Source,
    /// Processor executing an operation
    Operation,
    /// Dispatcher to routes
    Router,
    /// Wrapper around a nested chain
    Scope,
    /// Branch of a router
    Route,
    /// Chain of processors
    Chain,
    /// Error handler container
    ErrorHandler,
    /// Single error handling strategy
    OnError,
    /// Role not known to the runtime
    Unknown,
}

/// Identifier paired with the component's role
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypedComponentIdentifier {
    /// The component identifier
    pub identifier: ComponentIdentifier,
    /// The component role
    pub component_type: ComponentType,
}

// ============================================================================
// Component location
// ============================================================================

/// One step of a [`ComponentLocation`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationPart {
    /// Textual path part, e.g. `processors` or `0`
    pub part_path: String,
    /// The component at this step, when the step is a component
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub part_identifier: Option<TypedComponentIdentifier>,
}

impl LocationPart {
    /// A step without component information
    pub fn path(part_path: impl Into<String>) -> Self {
        Self {
            part_path: part_path.into(),
            part_identifier: None,
        }
    }

    /// A step pointing at a component
    pub fn component(
        part_path: impl Into<String>,
        identifier: ComponentIdentifier,
        component_type: ComponentType,
    ) -> Self {
        Self {
            part_path: part_path.into(),
            part_identifier: Some(TypedComponentIdentifier {
                identifier,
                component_type,
            }),
        }
    }
}

/// Where a live component was declared
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentLocation {
    /// Path text, `global/part/...`
    pub location: String,
    /// Source file of the declaration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    /// 1-based line in the source file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_in_file: Option<u32>,
    /// 1-based column in the source file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_column: Option<u32>,
    /// The steps of the path, the first one being the root container
    #[serde(default)]
    pub parts: Vec<LocationPart>,
}

impl ComponentLocation {
    /// Assemble a location from its steps. The path text is derived from the
    /// steps.
    pub fn from_parts(parts: Vec<LocationPart>) -> Self {
        let separator = PARTS_SEPARATOR.to_string();
        let location = parts
            .iter()
            .map(|p| p.part_path.as_str())
            .collect::<Vec<_>>()
            .join(separator.as_str());
        Self {
            location,
            file_name: None,
            line_in_file: None,
            start_column: None,
            parts,
        }
    }

    /// Attach the source position
    pub fn at(mut self, file_name: impl Into<String>, line: u32, column: u32) -> Self {
        self.file_name = Some(file_name.into());
        self.line_in_file = Some(line);
        self.start_column = Some(column);
        self
    }

    /// Name of the global element containing the component
    pub fn root_container_name(&self) -> &str {
        self.location
            .split(PARTS_SEPARATOR)
            .next()
            .unwrap_or_default()
    }

    /// Identifier of the component itself, taken from the last step
    pub fn component_identifier(&self) -> Option<&TypedComponentIdentifier> {
        self.parts.iter().rev().find_map(|p| p.part_identifier.as_ref())
    }

    /// Validate the path text and convert it to a [`Location`]
    pub fn to_location(&self) -> Result<Location> {
        Location::builder_from_string_representation(&self.location)?.build()
    }
}

// ============================================================================
// Annotations
// ============================================================================

/// Namespaced annotation key
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QualifiedName {
    /// Namespace URI or prefix
    pub namespace: String,
    /// Local name
    pub local: String,
}

impl QualifiedName {
    /// Create a qualified name
    pub fn new(namespace: impl Into<String>, local: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            local: local.into(),
        }
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}}}{}", self.namespace, self.local)
    }
}

/// Ordered annotation bag. Values are opaque.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Annotations {
    entries: Vec<(QualifiedName, serde_json::Value)>,
}

impl Annotations {
    /// An empty bag
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an annotation. An existing key keeps its position.
    pub fn insert(&mut self, name: QualifiedName, value: impl Into<serde_json::Value>) {
        let value = value.into();
        match self.entries.iter_mut().find(|(key, _)| *key == name) {
            Some((_, existing)) => *existing = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Look up an annotation
    pub fn get(&self, name: &QualifiedName) -> Option<&serde_json::Value> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    /// Annotations in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&QualifiedName, &serde_json::Value)> {
        self.entries.iter().map(|(key, value)| (key, value))
    }

    /// Number of annotations
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the bag is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ============================================================================
// Components
// ============================================================================

/// A live component as seen by the runtime
pub trait Component {
    /// All annotations
    fn annotations(&self) -> &Annotations;

    /// Where the component was declared, if known
    fn location(&self) -> Option<&ComponentLocation>;

    /// One annotation
    fn annotation(&self, name: &QualifiedName) -> Option<&serde_json::Value> {
        self.annotations().get(name)
    }

    /// Location of the global element containing this component
    fn root_container_location(&self) -> Result<Option<Location>> {
        self.location()
            .map(|l| Location::builder().global_name(l.root_container_name())?.build())
            .transpose()
    }
}

/// Plain [`Component`] carrying externally supplied data
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotatedComponent {
    #[serde(default)]
    annotations: Annotations,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    location: Option<ComponentLocation>,
}

impl AnnotatedComponent {
    /// A component with no annotations and no location
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach the declaration location
    pub fn with_location(mut self, location: ComponentLocation) -> Self {
        self.location = Some(location);
        self
    }

    /// Attach an annotation
    pub fn with_annotation(mut self, name: QualifiedName, value: impl Into<serde_json::Value>) -> Self {
        self.annotations.insert(name, value);
        self
    }
}

impl Component for AnnotatedComponent {
    fn annotations(&self) -> &Annotations {
        &self.annotations
    }

    fn location(&self) -> Option<&ComponentLocation> {
        self.location.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn foreach_location() -> ComponentLocation {
        ComponentLocation::from_parts(vec![
            LocationPart::component(
                "bridge",
                ComponentIdentifier::new("mule", "flow"),
                ComponentType::Flow,
            ),
            LocationPart::path("processors"),
            LocationPart::component(
                "1",
                ComponentIdentifier::new("mule", "foreach"),
                ComponentType::Scope,
            ),
        ])
        .at("bridge.xml", 14, 9)
    }

    #[rstest]
    #[case("http:listener", "http", "listener")]
    #[case("logger", "mule", "logger")]
    fn test_identifier_parsing(#[case] text: &str, #[case] namespace: &str, #[case] name: &str) {
        let id: ComponentIdentifier = text.parse().unwrap();
        assert_eq!(id, ComponentIdentifier::new(namespace, name));
    }

    #[rstest]
    #[case(":listener")]
    #[case("http:")]
    #[case("")]
    fn test_identifier_parsing_rejects_empty_halves(#[case] text: &str) {
        assert!(text.parse::<ComponentIdentifier>().is_err());
    }

    #[test]
    fn test_component_location_from_parts() {
        let location = foreach_location();
        assert_eq!(location.location, "bridge/processors/1");
        assert_eq!(location.root_container_name(), "bridge");
        assert_eq!(location.line_in_file, Some(14));
        assert_eq!(
            location.component_identifier().unwrap().identifier.to_string(),
            "mule:foreach"
        );
    }

    #[test]
    fn test_to_location() {
        let location = foreach_location().to_location().unwrap();
        let expected = Location::builder()
            .global_name("bridge")
            .unwrap()
            .add_processors_part()
            .unwrap()
            .add_index_part(1)
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(location, expected);
    }

    #[test]
    fn test_to_location_rejects_invalid_text() {
        let location = ComponentLocation::from_parts(vec![
            LocationPart::path("bridge"),
            LocationPart::path("processors"),
            LocationPart::path("logger"),
        ]);
        assert!(matches!(
            location.to_location(),
            Err(Error::NonNumericProcessorIndex { .. })
        ));
    }

    #[test]
    fn test_annotations_keep_insertion_order() {
        let doc = QualifiedName::new("http://www.mulesoft.org/schema/mule/documentation", "name");
        let id = QualifiedName::new("http://www.mulesoft.org/schema/mule/documentation", "id");

        let mut annotations = Annotations::new();
        annotations.insert(doc.clone(), "Log payload");
        annotations.insert(id.clone(), "a1b2");
        annotations.insert(doc.clone(), "Log it");

        let keys: Vec<&str> = annotations.iter().map(|(k, _)| k.local.as_str()).collect();
        assert_eq!(keys, vec!["name", "id"]);
        assert_eq!(annotations.get(&doc), Some(&serde_json::json!("Log it")));
        assert_eq!(annotations.len(), 2);
    }

    #[test]
    fn test_annotated_component() {
        let name = QualifiedName::new("doc", "name");
        let component = AnnotatedComponent::new()
            .with_annotation(name.clone(), "Loop")
            .with_location(foreach_location());

        assert_eq!(component.annotation(&name), Some(&serde_json::json!("Loop")));
        assert!(component.annotation(&QualifiedName::new("doc", "id")).is_none());
        assert_eq!(
            component.root_container_location().unwrap().unwrap().to_string(),
            "bridge"
        );
        assert!(AnnotatedComponent::new().root_container_location().unwrap().is_none());
    }

    #[test]
    fn test_component_location_json_shape() {
        let json = serde_json::to_value(foreach_location()).unwrap();
        assert_eq!(json["fileName"], "bridge.xml");
        assert_eq!(json["parts"][2]["partIdentifier"]["componentType"], "SCOPE");
        assert!(json["parts"][1].get("partIdentifier").is_none());
    }
}
