//! Hierarchical locations
//!
//! A [`Location`] addresses one node of a declared artifact: a global element
//! name followed by path parts, rendered as `global/part/part/...`.
//!
//! ```text
//! bridge/processors/1/processors/0
//! └─┬──┘ └───┬────┘ │ └───┬────┘ │
//!  global   token  index  token  index
//! ```
//!
//! Locations are built with a [`LocationBuilder`]. Each builder call returns a
//! new builder that shares the parts of its predecessor, so a builder can be
//! branched freely:
//!
//! ```rust
//! use weftline_core::Location;
//!
//! let flow = Location::builder().global_name("bridge")?.add_processors_part()?;
//! let first = flow.add_index_part(0)?.build()?;
//! let second = flow.add_index_part(1)?.build()?;
//! assert_eq!(first.to_string(), "bridge/processors/0");
//! assert_eq!(second.to_string(), "bridge/processors/1");
//! # Ok::<(), weftline_core::Error>(())
//! ```

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::{Error, Result};

/// Separator between the parts of a location string
pub const PARTS_SEPARATOR: char = '/';

/// Part pointing at the message source of a flow
pub const SOURCE: &str = "source";

/// Part pointing at the connection of a configuration
pub const CONNECTION: &str = "connection";

/// Part preceding the index of a nested processor
pub const PROCESSORS: &str = "processors";

/// Part preceding the index of an error handler
pub const ERROR_HANDLER: &str = "errorHandler";

/// Characters that may not appear in a global name or part
pub const RESERVED_CHARACTERS: [char; 6] = ['/', '[', ']', '{', '}', '#'];

// A placeholder may not contain the separator, so its rendering parses back.
static PLACEHOLDER_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\A\$\{[^/]+\}\z").expect("placeholder pattern is a valid regex"));

/// An immutable path to a declaration inside an artifact
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Location {
    global_name: Arc<str>,
    parts: Arc<[String]>,
}

/// A classified view of one location part
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathSegment<'a> {
    /// `source`
    Source,
    /// `connection`
    Connection,
    /// `processors`
    Processors,
    /// `errorHandler`
    ErrorHandler,
    /// A non-negative position
    Index(usize),
    /// Any other name
    Name(&'a str),
}

impl<'a> PathSegment<'a> {
    /// Classify a textual part
    pub fn classify(part: &'a str) -> Self {
        match part {
            SOURCE => Self::Source,
            CONNECTION => Self::Connection,
            PROCESSORS => Self::Processors,
            ERROR_HANDLER => Self::ErrorHandler,
            _ if is_numeric(part) => part
                .parse()
                .map(Self::Index)
                .unwrap_or(Self::Name(part)),
            _ => Self::Name(part),
        }
    }
}

impl Location {
    /// Start building a location
    pub fn builder() -> LocationBuilder {
        LocationBuilder::default()
    }

    /// Create a builder pre-populated from `global/part/part` text.
    ///
    /// Equivalent to calling [`LocationBuilder::global_name`] with the first
    /// token and [`LocationBuilder::add_part`] with each remaining one.
    pub fn builder_from_string_representation(text: &str) -> Result<LocationBuilder> {
        let mut tokens = text.split(PARTS_SEPARATOR);
        let global_name = tokens.next().unwrap_or_default();
        let mut builder = Self::builder().global_name(global_name)?;
        for token in tokens {
            builder = builder.add_part(token)?;
        }
        Ok(builder)
    }

    /// Name of the global element anchoring this location
    pub fn global_name(&self) -> &str {
        &self.global_name
    }

    /// The parts following the global name, as text
    pub fn parts(&self) -> &[String] {
        &self.parts
    }

    /// The parts following the global name, classified
    pub fn segments(&self) -> impl Iterator<Item = PathSegment<'_>> + '_ {
        self.parts.iter().map(|part| PathSegment::classify(part))
    }

    /// Whether this location addresses a global element itself
    pub fn is_global(&self) -> bool {
        self.parts.is_empty()
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.global_name)?;
        for part in self.parts.iter() {
            write!(f, "{PARTS_SEPARATOR}{part}")?;
        }
        Ok(())
    }
}

impl FromStr for Location {
    type Err = Error;

    fn from_str(text: &str) -> Result<Self> {
        Self::builder_from_string_representation(text)?.build()
    }
}

impl Serialize for Location {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Location {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// Builder
// ============================================================================

#[derive(Debug)]
struct PartNode {
    part: String,
    previous: Option<Arc<PartNode>>,
}

/// Persistent builder for [`Location`]
///
/// Every method borrows the receiver and returns a new builder, leaving the
/// receiver untouched.
#[derive(Debug, Clone, Default)]
pub struct LocationBuilder {
    global_name: Option<Arc<str>>,
    last: Option<Arc<PartNode>>,
    len: usize,
}

impl LocationBuilder {
    /// Set the global element name. Allowed once, before any part.
    pub fn global_name(&self, name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if let Some(current) = &self.global_name {
            return Err(Error::GlobalNameAlreadySet {
                current: current.to_string(),
            });
        }
        validate_global_name(&name)?;
        Ok(Self {
            global_name: Some(name.into()),
            last: None,
            len: 0,
        })
    }

    /// Append a named part. After `processors` the part must be numeric.
    pub fn add_part(&self, part: impl Into<String>) -> Result<Self> {
        let part = part.into();
        self.require_global_name("adding a part")?;
        validate_text("part", &part)?;
        match self.last_part() {
            Some(PROCESSORS) if !is_numeric(&part) => {
                return Err(Error::NonNumericProcessorIndex { part });
            }
            Some(previous) if is_numeric(&part) && is_numeric(previous) => {
                return Err(Error::ConsecutiveIndex {
                    index: part,
                    previous: previous.to_string(),
                });
            }
            _ => {}
        }
        Ok(self.push(part))
    }

    /// Append the `source` part
    pub fn add_source_part(&self) -> Result<Self> {
        self.add_token(SOURCE)
    }

    /// Append the `connection` part
    pub fn add_connection_part(&self) -> Result<Self> {
        self.add_token(CONNECTION)
    }

    /// Append the `processors` part
    pub fn add_processors_part(&self) -> Result<Self> {
        self.add_token(PROCESSORS)
    }

    /// Append the `errorHandler` part
    pub fn add_error_handler_part(&self) -> Result<Self> {
        self.add_token(ERROR_HANDLER)
    }

    /// Append an index part. Two indexes may not be adjacent.
    pub fn add_index_part(&self, index: usize) -> Result<Self> {
        self.require_global_name("adding an index part")?;
        if let Some(previous) = self.last_part().filter(|p| is_numeric(p)) {
            return Err(Error::ConsecutiveIndex {
                index: index.to_string(),
                previous: previous.to_string(),
            });
        }
        Ok(self.push(index.to_string()))
    }

    /// Finish the location
    pub fn build(&self) -> Result<Location> {
        let global_name = self.require_global_name("building")?.clone();

        let mut parts = Vec::with_capacity(self.len);
        let mut node = self.last.as_deref();
        while let Some(current) = node {
            parts.push(current.part.clone());
            node = current.previous.as_deref();
        }
        parts.reverse();

        Ok(Location {
            global_name,
            parts: parts.into(),
        })
    }

    fn add_token(&self, token: &str) -> Result<Self> {
        self.require_global_name(&format!("adding the '{token}' part"))?;
        Ok(self.push(token.to_string()))
    }

    fn require_global_name(&self, operation: &str) -> Result<&Arc<str>> {
        self.global_name
            .as_ref()
            .ok_or_else(|| Error::MissingGlobalName {
                operation: operation.to_string(),
            })
    }

    fn last_part(&self) -> Option<&str> {
        self.last.as_deref().map(|node| node.part.as_str())
    }

    fn push(&self, part: String) -> Self {
        Self {
            global_name: self.global_name.clone(),
            last: Some(Arc::new(PartNode {
                part,
                previous: self.last.clone(),
            })),
            len: self.len + 1,
        }
    }
}

fn is_numeric(text: &str) -> bool {
    !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit())
}

/// Check a global element name: not empty, no reserved characters unless it
/// is a `${...}` placeholder.
pub(crate) fn validate_global_name(name: &str) -> Result<()> {
    if PLACEHOLDER_PATTERN.is_match(name) {
        return Ok(());
    }
    validate_text("global name", name)
}

fn validate_text(what: &str, text: &str) -> Result<()> {
    if text.is_empty() {
        return Err(Error::EmptyLocationPart {
            what: what.to_string(),
        });
    }
    if let Some(character) = text.chars().find(|c| RESERVED_CHARACTERS.contains(c)) {
        return Err(Error::ReservedCharacter {
            part: text.to_string(),
            character,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_connection_part_after_global_name() {
        let location = Location::builder()
            .global_name("f")
            .unwrap()
            .add_connection_part()
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(location.to_string(), "f/connection");
    }

    #[test]
    fn test_consecutive_index_rejected() {
        let builder = Location::builder()
            .global_name("f")
            .unwrap()
            .add_index_part(0)
            .unwrap();
        let err = builder.add_index_part(1).unwrap_err();
        assert!(matches!(err, Error::ConsecutiveIndex { .. }));
    }

    #[test]
    fn test_numeric_part_counts_as_index() {
        let builder = Location::builder()
            .global_name("f")
            .unwrap()
            .add_processors_part()
            .unwrap()
            .add_part("3")
            .unwrap();
        assert!(builder.add_index_part(0).is_err());
        assert!(builder.add_part("4").is_err());
    }

    #[test]
    fn test_build_without_global_name() {
        let err = Location::builder().build().unwrap_err();
        assert!(matches!(err, Error::MissingGlobalName { .. }));
        assert!(err.is_structural());
    }

    #[rstest]
    #[case(SOURCE)]
    #[case(CONNECTION)]
    #[case(PROCESSORS)]
    #[case(ERROR_HANDLER)]
    #[case("index")]
    #[case("named")]
    fn test_parts_require_global_name(#[case] part: &str) {
        let empty = Location::builder();
        let result = match part {
            SOURCE => empty.add_source_part(),
            CONNECTION => empty.add_connection_part(),
            PROCESSORS => empty.add_processors_part(),
            ERROR_HANDLER => empty.add_error_handler_part(),
            "index" => empty.add_index_part(0),
            other => empty.add_part(other),
        };
        assert!(matches!(result, Err(Error::MissingGlobalName { .. })));
    }

    #[test]
    fn test_global_name_set_once() {
        let builder = Location::builder().global_name("a").unwrap();
        assert!(matches!(
            builder.global_name("b"),
            Err(Error::GlobalNameAlreadySet { .. })
        ));
    }

    #[rstest]
    #[case("a/b", '/')]
    #[case("a[0]", '[')]
    #[case("x]", ']')]
    #[case("{x", '{')]
    #[case("y}", '}')]
    #[case("a#b", '#')]
    fn test_reserved_characters_rejected(#[case] text: &str, #[case] expected: char) {
        match Location::builder().global_name(text) {
            Err(Error::ReservedCharacter { character, .. }) => assert_eq!(character, expected),
            other => panic!("expected reserved character error, got {other:?}"),
        }
        let anchored = Location::builder().global_name("flow").unwrap();
        assert!(anchored.add_part(text).is_err());
    }

    #[test]
    fn test_placeholder_global_name_allowed() {
        let location = Location::builder()
            .global_name("${flow.name}")
            .unwrap()
            .add_processors_part()
            .unwrap()
            .add_index_part(0)
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(location.global_name(), "${flow.name}");
        assert_eq!(location.to_string(), "${flow.name}/processors/0");
    }

    #[test]
    fn test_placeholder_part_rejected() {
        let anchored = Location::builder().global_name("flow").unwrap();
        assert!(anchored.add_part("${x}").is_err());
    }

    #[test]
    fn test_placeholder_with_separator_rejected() {
        assert!(matches!(
            Location::builder().global_name("${a/b}"),
            Err(Error::ReservedCharacter { .. })
        ));
    }

    #[test]
    fn test_placeholder_location_serde_round_trip() {
        let location = Location::builder()
            .global_name("${app.flow}")
            .unwrap()
            .add_source_part()
            .unwrap()
            .build()
            .unwrap();
        let json = serde_json::to_string(&location).unwrap();
        assert_eq!(json, "\"${app.flow}/source\"");
        let restored: Location = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, location);
    }

    #[test]
    fn test_non_numeric_after_processors() {
        let builder = Location::builder()
            .global_name("flow")
            .unwrap()
            .add_processors_part()
            .unwrap();
        let err = builder.add_part("logger").unwrap_err();
        assert!(matches!(err, Error::NonNumericProcessorIndex { .. }));
        assert!(builder.add_part("12").is_ok());
    }

    #[test]
    fn test_empty_parts_rejected() {
        assert!(Location::builder().global_name("").is_err());
        assert!("flow//processors".parse::<Location>().is_err());
    }

    #[test]
    fn test_branching_builders_are_independent() {
        let base = Location::builder().global_name("flow").unwrap();
        let left = base.add_part("x").unwrap();
        let right = base.add_part("x").unwrap();

        let left_extended = left.add_part("left").unwrap().build().unwrap();
        let right_built = right.build().unwrap();
        let base_built = base.build().unwrap();

        assert_eq!(left_extended.to_string(), "flow/x/left");
        assert_eq!(right_built.to_string(), "flow/x");
        assert_eq!(base_built.to_string(), "flow");
        assert!(base_built.is_global());
    }

    #[test]
    fn test_parse_and_display_round_trip() {
        let text = "bridge/processors/1/processors/0";
        let location: Location = text.parse().unwrap();
        assert_eq!(location.global_name(), "bridge");
        assert_eq!(location.parts(), ["processors", "1", "processors", "0"]);
        assert_eq!(location.to_string(), text);
    }

    #[test]
    fn test_parsed_equals_built() {
        let parsed: Location = "bridge/processors/1".parse().unwrap();
        let built = Location::builder()
            .global_name("bridge")
            .unwrap()
            .add_processors_part()
            .unwrap()
            .add_index_part(1)
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(parsed, built);
    }

    #[test]
    fn test_segments_are_classified() {
        let location: Location = "cfg/connection/pool/source/errorHandler/2"
            .parse()
            .unwrap();
        let segments: Vec<_> = location.segments().collect();
        assert_eq!(
            segments,
            vec![
                PathSegment::Connection,
                PathSegment::Name("pool"),
                PathSegment::Source,
                PathSegment::ErrorHandler,
                PathSegment::Index(2),
            ]
        );
    }

    #[test]
    fn test_location_serializes_as_string() {
        let location: Location = "flow/processors/0".parse().unwrap();
        let json = serde_json::to_string(&location).unwrap();
        assert_eq!(json, r#""flow/processors/0""#);
        let back: Location = serde_json::from_str(&json).unwrap();
        assert_eq!(back, location);
        assert!(serde_json::from_str::<Location>(r#""flow/processors/x""#).is_err());
    }

    #[test]
    fn test_location_is_thread_safe() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Location>();
        assert_send_sync::<LocationBuilder>();

        let location: Location = "flow/processors/0".parse().unwrap();
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let shared = location.clone();
                std::thread::spawn(move || shared.to_string())
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), "flow/processors/0");
        }
    }
}
