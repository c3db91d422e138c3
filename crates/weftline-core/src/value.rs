//! Parameter values
//!
//! Every configured parameter holds one of three value shapes:
//!
//! - [`SimpleValue`] - plain text, or text that was wrapped in a CDATA section
//! - [`ListValue`] - an ordered sequence of values
//! - [`ObjectValue`] - a set of named values with an optional type id
//!
//! The set is closed. Consumers dispatch with an exhaustive `match` on
//! [`ParameterValue`].
//!
//! # Serialized form
//!
//! ```json
//! "plain text"
//! {"type": "cdata", "value": "<xml/>"}
//! ["a", "b"]
//! {"type": "object", "typeId": "com.acme.Pojo", "parameters": {"k": "v"}}
//! ```

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

const CDATA_PREFIX: &str = "<![CDATA[";
const CDATA_SUFFIX: &str = "]]>";

static CDATA_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)\A<!\[CDATA\[(.*)\]\]>\z").expect("CDATA pattern is a valid regex")
});

/// A configured parameter value
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ParameterValue {
    /// Plain or CDATA text
    Simple(SimpleValue),
    /// Ordered list of values
    List(ListValue),
    /// Named values with an optional type id
    Object(ObjectValue),
}

/// Discriminant of a [`ParameterValue`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// [`ParameterValue::Simple`]
    Simple,
    /// [`ParameterValue::List`]
    List,
    /// [`ParameterValue::Object`]
    Object,
}

/// Text value, optionally flagged as CDATA
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SimpleValue {
    text: String,
    cdata: bool,
}

/// Ordered list of values
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ListValue {
    values: Vec<ParameterValue>,
}

/// Named values with an optional type id
///
/// Equality ignores the order parameters were added in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ObjectValue {
    type_id: Option<String>,
    parameters: BTreeMap<String, ParameterValue>,
}

impl ParameterValue {
    /// Create a text value.
    ///
    /// Text that is entirely wrapped in `<![CDATA[ ... ]]>` becomes a CDATA
    /// value with the wrapper removed.
    pub fn simple(text: impl Into<String>) -> Self {
        let text = text.into();
        match CDATA_PATTERN.captures(&text) {
            Some(captures) => Self::Simple(SimpleValue {
                text: captures[1].to_string(),
                cdata: true,
            }),
            None => Self::Simple(SimpleValue { text, cdata: false }),
        }
    }

    /// Create a CDATA value, stripping one leading `<![CDATA[` and one
    /// trailing `]]>` if present.
    pub fn cdata(text: impl Into<String>) -> Self {
        let text = text.into();
        let inner = text.strip_prefix(CDATA_PREFIX).unwrap_or(&text);
        let inner = inner.strip_suffix(CDATA_SUFFIX).unwrap_or(inner);
        Self::Simple(SimpleValue {
            text: inner.to_string(),
            cdata: true,
        })
    }

    /// Create a list value
    pub fn list(values: impl IntoIterator<Item = ParameterValue>) -> Self {
        Self::List(ListValue {
            values: values.into_iter().collect(),
        })
    }

    /// Create an object value
    pub fn object<K: Into<String>>(
        type_id: Option<&str>,
        parameters: impl IntoIterator<Item = (K, ParameterValue)>,
    ) -> Self {
        Self::Object(ObjectValue {
            type_id: type_id.map(str::to_string),
            parameters: parameters
                .into_iter()
                .map(|(k, v)| (k.into(), v))
                .collect(),
        })
    }

    /// The shape of this value
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Simple(_) => ValueKind::Simple,
            Self::List(_) => ValueKind::List,
            Self::Object(_) => ValueKind::Object,
        }
    }

    /// Levels of nesting, a simple value being one level
    pub fn depth(&self) -> usize {
        match self {
            Self::Simple(_) => 1,
            Self::List(list) => 1 + list.values.iter().map(Self::depth).max().unwrap_or(0),
            Self::Object(object) => object.depth(),
        }
    }

    /// Borrow as a simple value
    pub fn as_simple(&self) -> Option<&SimpleValue> {
        match self {
            Self::Simple(v) => Some(v),
            _ => None,
        }
    }

    /// Borrow as a list value
    pub fn as_list(&self) -> Option<&ListValue> {
        match self {
            Self::List(v) => Some(v),
            _ => None,
        }
    }

    /// Borrow as an object value
    pub fn as_object(&self) -> Option<&ObjectValue> {
        match self {
            Self::Object(v) => Some(v),
            _ => None,
        }
    }
}

impl From<&str> for ParameterValue {
    fn from(text: &str) -> Self {
        Self::simple(text)
    }
}

impl From<String> for ParameterValue {
    fn from(text: String) -> Self {
        Self::simple(text)
    }
}

impl From<ListValue> for ParameterValue {
    fn from(value: ListValue) -> Self {
        Self::List(value)
    }
}

impl From<ObjectValue> for ParameterValue {
    fn from(value: ObjectValue) -> Self {
        Self::Object(value)
    }
}

impl SimpleValue {
    /// The text, without any CDATA wrapper
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Whether the text is a CDATA section
    pub fn is_cdata(&self) -> bool {
        self.cdata
    }
}

impl ListValue {
    /// The values, in order
    pub fn values(&self) -> &[ParameterValue] {
        &self.values
    }

    /// Number of values
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the list is empty
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl ObjectValue {
    /// Fully qualified type of the object, if declared
    pub fn type_id(&self) -> Option<&str> {
        self.type_id.as_deref()
    }

    /// Named parameters
    pub fn parameters(&self) -> &BTreeMap<String, ParameterValue> {
        &self.parameters
    }

    /// Look up one parameter by name
    pub fn parameter(&self, name: &str) -> Option<&ParameterValue> {
        self.parameters.get(name)
    }

    /// Levels of nesting, counting this object
    pub fn depth(&self) -> usize {
        1 + self
            .parameters
            .values()
            .map(ParameterValue::depth)
            .max()
            .unwrap_or(0)
    }
}

impl fmt::Display for ParameterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Simple(v) if v.cdata => write!(f, "{CDATA_PREFIX}{}{CDATA_SUFFIX}", v.text),
            Self::Simple(v) => f.write_str(&v.text),
            Self::List(list) => {
                f.write_str("[")?;
                for (i, value) in list.values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{value}")?;
                }
                f.write_str("]")
            }
            Self::Object(object) => {
                f.write_str("{")?;
                if let Some(type_id) = &object.type_id {
                    write!(f, "<{type_id}>")?;
                }
                for (i, (name, value)) in object.parameters.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{name}={value}")?;
                }
                f.write_str("}")
            }
        }
    }
}

// ============================================================================
// Builders
// ============================================================================

/// Accumulates the items of a [`ListValue`]
#[derive(Debug, Default)]
pub struct ListValueBuilder {
    values: Vec<ParameterValue>,
}

impl ListValueBuilder {
    /// Create an empty list builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a value
    pub fn with_value(mut self, value: impl Into<ParameterValue>) -> Self {
        self.values.push(value.into());
        self
    }

    /// Finish the list
    pub fn build(self) -> ParameterValue {
        ParameterValue::List(ListValue {
            values: self.values,
        })
    }
}

/// Accumulates the parameters of an [`ObjectValue`]
#[derive(Debug, Default)]
pub struct ObjectValueBuilder {
    type_id: Option<String>,
    parameters: BTreeMap<String, ParameterValue>,
}

impl ObjectValueBuilder {
    /// Create an untyped, empty object builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the object type id
    pub fn of_type(mut self, type_id: impl Into<String>) -> Self {
        self.type_id = Some(type_id.into());
        self
    }

    /// Set a named parameter; a later value for the same name replaces the earlier one
    pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<ParameterValue>) -> Self {
        self.parameters.insert(name.into(), value.into());
        self
    }

    /// Finish the object, keeping it typed as [`ObjectValue`]
    pub fn build_object(self) -> ObjectValue {
        ObjectValue {
            type_id: self.type_id,
            parameters: self.parameters,
        }
    }

    /// Finish the object
    pub fn build(self) -> ParameterValue {
        ParameterValue::Object(self.build_object())
    }
}

// ============================================================================
// Serde representation
// ============================================================================

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum ParameterValueRepr {
    Plain(String),
    List(Vec<ParameterValueRepr>),
    Tagged(TaggedRepr),
}

#[derive(Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
enum TaggedRepr {
    Cdata {
        value: String,
    },
    #[serde(rename_all = "camelCase")]
    Object {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        type_id: Option<String>,
        #[serde(default)]
        parameters: BTreeMap<String, ParameterValueRepr>,
    },
}

impl From<&ParameterValue> for ParameterValueRepr {
    fn from(value: &ParameterValue) -> Self {
        match value {
            ParameterValue::Simple(v) if v.cdata => Self::Tagged(TaggedRepr::Cdata {
                value: v.text.clone(),
            }),
            ParameterValue::Simple(v) => Self::Plain(v.text.clone()),
            ParameterValue::List(list) => Self::List(list.values.iter().map(Self::from).collect()),
            ParameterValue::Object(object) => Self::Tagged(TaggedRepr::Object {
                type_id: object.type_id.clone(),
                parameters: object
                    .parameters
                    .iter()
                    .map(|(k, v)| (k.clone(), Self::from(v)))
                    .collect(),
            }),
        }
    }
}

impl From<ParameterValueRepr> for ParameterValue {
    fn from(repr: ParameterValueRepr) -> Self {
        match repr {
            ParameterValueRepr::Plain(text) => ParameterValue::simple(text),
            ParameterValueRepr::List(values) => {
                ParameterValue::List(ListValue {
                    values: values.into_iter().map(Self::from).collect(),
                })
            }
            // Stored text is already unwrapped; do not strip a second time.
            ParameterValueRepr::Tagged(TaggedRepr::Cdata { value }) => {
                ParameterValue::Simple(SimpleValue {
                    text: value,
                    cdata: true,
                })
            }
            ParameterValueRepr::Tagged(TaggedRepr::Object {
                type_id,
                parameters,
            }) => ParameterValue::Object(ObjectValue {
                type_id,
                parameters: parameters
                    .into_iter()
                    .map(|(k, v)| (k, Self::from(v)))
                    .collect(),
            }),
        }
    }
}

impl Serialize for ParameterValue {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        ParameterValueRepr::from(self).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ParameterValue {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        ParameterValueRepr::deserialize(deserializer).map(Self::from)
    }
}

impl Serialize for ObjectValue {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        ParameterValueRepr::from(&ParameterValue::Object(self.clone())).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ObjectValue {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match ParameterValue::deserialize(deserializer)? {
            ParameterValue::Object(object) => Ok(object),
            other => Err(serde::de::Error::custom(format!(
                "expected an object value, found a {:?} value",
                other.kind()
            ))),
        }
    }
}
