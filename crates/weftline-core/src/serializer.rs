//! Artifact serialization
//!
//! Converts an [`ArtifactDeclaration`] to text and back. JSON is the primary
//! format; YAML uses the same document shape. Deserialized artifacts are
//! validated before they are returned, so a caller never receives a tree that
//! the builders would have rejected.

use sha2::{Digest, Sha256};
use std::path::Path;
use std::str::FromStr;

use crate::declaration::ArtifactDeclaration;
use crate::error::{Error, Result};

/// Converts artifacts to and from text
pub trait ArtifactSerializer {
    /// Render an artifact
    fn serialize(&self, artifact: &ArtifactDeclaration) -> Result<String>;

    /// Parse and validate an artifact
    fn deserialize(&self, text: &str) -> Result<ArtifactDeclaration>;
}

/// JSON serializer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JsonArtifactSerializer {
    /// Indent the output
    pub pretty: bool,
}

impl JsonArtifactSerializer {
    /// Serializer producing indented output
    pub fn pretty() -> Self {
        Self { pretty: true }
    }

    /// Serializer producing single-line output
    pub fn compact() -> Self {
        Self { pretty: false }
    }
}

impl Default for JsonArtifactSerializer {
    fn default() -> Self {
        Self::pretty()
    }
}

impl ArtifactSerializer for JsonArtifactSerializer {
    fn serialize(&self, artifact: &ArtifactDeclaration) -> Result<String> {
        let text = if self.pretty {
            serde_json::to_string_pretty(artifact)?
        } else {
            serde_json::to_string(artifact)?
        };
        tracing::debug!(
            "Serialized artifact '{}' to {} bytes of JSON",
            artifact.attributes.name,
            text.len()
        );
        Ok(text)
    }

    fn deserialize(&self, text: &str) -> Result<ArtifactDeclaration> {
        let artifact: ArtifactDeclaration = serde_json::from_str(text)
            .map_err(|e| malformed(text, e.line(), e.column(), e.to_string()))?;
        checked(artifact)
    }
}

/// YAML serializer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct YamlArtifactSerializer;

impl ArtifactSerializer for YamlArtifactSerializer {
    fn serialize(&self, artifact: &ArtifactDeclaration) -> Result<String> {
        let text = serde_yaml::to_string(artifact)?;
        tracing::debug!(
            "Serialized artifact '{}' to {} bytes of YAML",
            artifact.attributes.name,
            text.len()
        );
        Ok(text)
    }

    fn deserialize(&self, text: &str) -> Result<ArtifactDeclaration> {
        let artifact: ArtifactDeclaration = serde_yaml::from_str(text).map_err(|e| {
            let (line, column) = e
                .location()
                .map(|l| (l.line(), l.column()))
                .unwrap_or_default();
            malformed(text, line, column, e.to_string())
        })?;
        checked(artifact)
    }
}

/// Characters of the failing line kept in `Error::Malformed::fragment`
const FRAGMENT_WIDTH: usize = 40;

fn malformed(text: &str, line: usize, column: usize, message: String) -> Error {
    let source_line = line
        .checked_sub(1)
        .and_then(|index| text.lines().nth(index))
        .unwrap_or_default();
    let start = column.saturating_sub(1 + FRAGMENT_WIDTH / 2);
    let fragment = source_line
        .chars()
        .skip(start)
        .take(FRAGMENT_WIDTH)
        .collect::<String>()
        .trim()
        .to_string();
    tracing::debug!("Malformed artifact at {}:{}: {}", line, column, message);
    Error::Malformed {
        line,
        column,
        message,
        fragment,
    }
}

fn checked(artifact: ArtifactDeclaration) -> Result<ArtifactDeclaration> {
    artifact.validate()?;
    tracing::debug!(
        "Deserialized artifact '{}' with {} global elements",
        artifact.attributes.name,
        artifact.global_elements.len()
    );
    Ok(artifact)
}

// ============================================================================
// Formats
// ============================================================================

/// Supported text formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SerializationFormat {
    /// JSON document
    Json,
    /// YAML document
    Yaml,
}

impl SerializationFormat {
    /// Pick the format from a file extension, `None` when unrecognised
    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        let extension = path.as_ref().extension()?.to_str()?;
        extension.parse().ok()
    }

    /// Preferred file extension
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Yaml => "yaml",
        }
    }

    /// A serializer for this format
    pub fn serializer(&self, pretty: bool) -> Box<dyn ArtifactSerializer + Send + Sync> {
        match self {
            Self::Json => Box::new(JsonArtifactSerializer { pretty }),
            Self::Yaml => Box::new(YamlArtifactSerializer),
        }
    }
}

impl FromStr for SerializationFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            other => Err(format!("unknown artifact format '{other}'")),
        }
    }
}

/// SHA-256 hex digest of the compact JSON form of an artifact
pub fn fingerprint(artifact: &ArtifactDeclaration) -> Result<String> {
    let text = serde_json::to_string(artifact)?;
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    Ok(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::declarer::{DeclarationBuilder, ElementDeclarer, ParameterizedBuilder};
    use crate::value::ParameterValue;
    use rstest::rstest;

    fn artifact() -> ArtifactDeclaration {
        let core = ElementDeclarer::for_extension("mule");
        let flow = core
            .new_construct("flow")
            .with_ref_name("main")
            .with_component(
                core.new_operation("logger")
                    .with_parameter_group("General", |g| {
                        g.with_parameter("message", ParameterValue::simple("<![CDATA[a < b]]>"))
                    })
                    .with_metadata_property("line", 12)
                    .build(),
            )
            .build();
        ElementDeclarer::new_artifact()
            .with_name("app")
            .with_global_element(flow)
            .unwrap()
            .build()
    }

    #[test]
    fn test_json_round_trip() {
        let original = artifact();
        for serializer in [JsonArtifactSerializer::pretty(), JsonArtifactSerializer::compact()] {
            let text = serializer.serialize(&original).unwrap();
            assert_eq!(serializer.deserialize(&text).unwrap(), original);
        }
    }

    #[test]
    fn test_yaml_round_trip() {
        let original = artifact();
        let text = YamlArtifactSerializer.serialize(&original).unwrap();
        assert_eq!(YamlArtifactSerializer.deserialize(&text).unwrap(), original);
    }

    #[test]
    fn test_json_document_shape() {
        let text = JsonArtifactSerializer::compact().serialize(&artifact()).unwrap();
        let doc: serde_json::Value = serde_json::from_str(&text).unwrap();
        let flow = &doc["globalElements"][0];
        assert_eq!(flow["kind"], "construct");
        assert_eq!(flow["refName"], "main");
        assert_eq!(flow["declaringExtension"], "mule");
        let logger = &flow["components"][0];
        assert_eq!(logger["kind"], "operation");
        assert_eq!(logger["metadataProperties"]["line"], 12);
        assert_eq!(
            logger["parameterGroups"][0]["parameters"]["message"],
            serde_json::json!({"type": "cdata", "value": "a < b"})
        );
        assert!(flow.get("errorHandlers").is_none());
    }

    #[test]
    fn test_malformed_json_reports_position() {
        let text = "{\n  \"name\": \"app\",\n  \"globalElements\": [ oops ]\n}";
        match JsonArtifactSerializer::default().deserialize(text) {
            Err(Error::Malformed { line, column, fragment, .. }) => {
                assert_eq!(line, 3);
                assert!(column > 0);
                assert_eq!(fragment, "\"globalElements\": [ oops ]");
            }
            other => panic!("Expected Malformed error, got {:?}", other),
        }
    }

    #[test]
    fn test_malformed_yaml() {
        let text = "name: app\nglobalElements: [\n";
        assert!(matches!(
            YamlArtifactSerializer.deserialize(text),
            Err(Error::Malformed { .. })
        ));
    }

    #[test]
    fn test_deserialize_rejects_duplicate_ref_names() {
        let text = r#"{"name":"app","globalElements":[
            {"kind":"construct","name":"flow","refName":"main"},
            {"kind":"construct","name":"flow","refName":"main"}]}"#;
        assert!(matches!(
            JsonArtifactSerializer::default().deserialize(text),
            Err(Error::DuplicateRefName { .. })
        ));
    }

    #[test]
    fn test_deserialize_rejects_route_in_route() {
        let text = r#"{"name":"app","globalElements":[
            {"kind":"construct","name":"flow","refName":"main","components":[
              {"kind":"router","name":"choice","components":[
                {"kind":"route","name":"when","components":[
                  {"kind":"route","name":"otherwise"}]}]}]}]}"#;
        let err = JsonArtifactSerializer::default().deserialize(text).unwrap_err();
        assert!(matches!(err, Error::InvalidStructure { .. }));
        assert!(err.is_structural());
    }

    #[test]
    fn test_missing_collections_default_to_empty() {
        let text = r#"{"name":"app"}"#;
        let artifact = JsonArtifactSerializer::default().deserialize(text).unwrap();
        assert!(artifact.global_elements().is_empty());
    }

    #[rstest]
    #[case("artifact.json", Some(SerializationFormat::Json))]
    #[case("artifact.yaml", Some(SerializationFormat::Yaml))]
    #[case("dir/artifact.YML", Some(SerializationFormat::Yaml))]
    #[case("artifact.xml", None)]
    #[case("artifact", None)]
    fn test_format_from_path(#[case] path: &str, #[case] expected: Option<SerializationFormat>) {
        assert_eq!(SerializationFormat::from_path(path), expected);
    }

    #[test]
    fn test_format_serializer_round_trip() {
        let original = artifact();
        for format in [SerializationFormat::Json, SerializationFormat::Yaml] {
            let serializer = format.serializer(true);
            let text = serializer.serialize(&original).unwrap();
            assert_eq!(serializer.deserialize(&text).unwrap(), original);
        }
    }

    #[test]
    fn test_fingerprint_ignores_pretty_printing() {
        let original = artifact();
        let pretty = JsonArtifactSerializer::pretty().serialize(&original).unwrap();
        let reparsed = JsonArtifactSerializer::compact().deserialize(&pretty).unwrap();

        let digest = fingerprint(&original).unwrap();
        assert_eq!(digest.len(), 64);
        assert_eq!(digest, fingerprint(&reparsed).unwrap());

        let renamed = ElementDeclarer::new_artifact().with_name("other").build();
        assert_ne!(digest, fingerprint(&renamed).unwrap());
    }

    #[test]
    fn test_malformed_fragment_is_clipped_around_column() {
        let filler = "x".repeat(200);
        let text = format!(r#"{{"name":"{filler}","globalElements":[oops]}}"#);
        match JsonArtifactSerializer::compact().deserialize(&text) {
            Err(Error::Malformed { line, fragment, .. }) => {
                assert_eq!(line, 1);
                assert!(fragment.chars().count() <= FRAGMENT_WIDTH);
                assert!(fragment.contains("[oops"), "fragment was {fragment:?}");
            }
            other => panic!("Expected Malformed error, got {:?}", other),
        }
    }

    #[test]
    fn test_deserialize_rejects_route_in_route_error_handler() {
        let text = r#"{"name":"app","globalElements":[
            {"kind":"construct","name":"flow","refName":"main","components":[
              {"kind":"router","name":"choice","components":[
                {"kind":"route","name":"when","errorHandlers":[
                  {"kind":"route","name":"inner"}]}]}]}]}"#;
        assert!(matches!(
            JsonArtifactSerializer::default().deserialize(text),
            Err(Error::InvalidStructure { .. })
        ));
    }

    #[test]
    fn test_deserialize_rejects_unaddressable_ref_name() {
        let text = r#"{"name":"app","globalElements":[
            {"kind":"construct","name":"flow","refName":"good"},
            {"kind":"construct","name":"flow","refName":"orders/v1"}]}"#;
        assert!(matches!(
            JsonArtifactSerializer::default().deserialize(text),
            Err(Error::ReservedCharacter { character: '/', .. })
        ));
    }
}
