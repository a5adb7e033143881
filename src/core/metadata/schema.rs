//! core::metadata::schema
//!
//! Metadata value model.
//!
//! # Values
//!
//! A metadata value is recursively one of:
//! - null
//! - string
//! - sequence of values
//! - mapping from string keys to values (insertion ordered)
//!
//! There are no numbers, booleans, or dates. Bare YAML scalars are kept as
//! the exact text written in the file (see [`super::yaml`]).
//!
//! # Blocks and records
//!
//! - [`MetadataBlock`] - field name to value, for one item
//! - [`MetaFileRecord`] - item path to block, for one metadata file

use indexmap::IndexMap;
use serde::Serialize;

use crate::core::paths::RelPath;

/// An ordered mapping from field name to value describing one item.
pub type MetadataBlock = IndexMap<String, MetaValue>;

/// The parsed content of one metadata file: the blocks it assigns, by item.
pub type MetaFileRecord = IndexMap<RelPath, MetadataBlock>;

/// A metadata value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum MetaValue {
    /// An explicit null (`~`, `null`, or an empty value).
    Null,
    /// A scalar, as written.
    String(String),
    /// A sequence of values.
    Sequence(Vec<MetaValue>),
    /// An ordered mapping of string keys to values.
    Mapping(IndexMap<String, MetaValue>),
}

impl MetaValue {
    /// Convenience constructor for string values.
    pub fn string(value: impl Into<String>) -> Self {
        Self::String(value.into())
    }

    /// Whether this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// The string content, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// The elements, if this is a sequence.
    pub fn as_sequence(&self) -> Option<&[MetaValue]> {
        match self {
            Self::Sequence(items) => Some(items),
            _ => None,
        }
    }

    /// The entries, if this is a mapping.
    pub fn as_mapping(&self) -> Option<&IndexMap<String, MetaValue>> {
        match self {
            Self::Mapping(map) => Some(map),
            _ => None,
        }
    }

    /// Consume the value, returning the mapping if it is one.
    pub fn into_mapping(self) -> Option<IndexMap<String, MetaValue>> {
        match self {
            Self::Mapping(map) => Some(map),
            _ => None,
        }
    }

    /// Short name of the value's kind, for log messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::String(_) => "string",
            Self::Sequence(_) => "sequence",
            Self::Mapping(_) => "mapping",
        }
    }
}

impl From<&str> for MetaValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for MetaValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl<T: Into<MetaValue>> From<Option<T>> for MetaValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Self::Null)
    }
}

impl From<Vec<MetaValue>> for MetaValue {
    fn from(value: Vec<MetaValue>) -> Self {
        Self::Sequence(value)
    }
}

impl std::fmt::Display for MetaValue {
    /// Strings print bare, null prints `~`, composites print as inline JSON.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Null => f.write_str("~"),
            Self::String(s) => f.write_str(s),
            composite => {
                let json = serde_json::to_string(composite).map_err(|_| std::fmt::Error)?;
                f.write_str(&json)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessors() {
        let value = MetaValue::string("Rock");
        assert_eq!(value.as_str(), Some("Rock"));
        assert!(value.as_sequence().is_none());
        assert_eq!(value.kind(), "string");

        assert!(MetaValue::Null.is_null());
        assert_eq!(MetaValue::from(None::<&str>), MetaValue::Null);
    }

    #[test]
    fn into_mapping() {
        let mut map = IndexMap::new();
        map.insert("genre".to_string(), MetaValue::string("Rock"));
        let value = MetaValue::Mapping(map.clone());

        assert_eq!(value.as_mapping(), Some(&map));
        assert_eq!(value.into_mapping(), Some(map));
        assert_eq!(MetaValue::Null.into_mapping(), None);
    }

    #[test]
    fn json_shape() {
        let mut map = IndexMap::new();
        map.insert("b".to_string(), MetaValue::Null);
        map.insert("a".to_string(), MetaValue::string("x"));
        let value = MetaValue::Sequence(vec![MetaValue::Mapping(map), MetaValue::string("y")]);

        let json = serde_json::to_string(&value).unwrap();
        assert_eq!(json, r#"[{"b":null,"a":"x"},"y"]"#);
    }

    #[test]
    fn display() {
        assert_eq!(MetaValue::Null.to_string(), "~");
        assert_eq!(MetaValue::string("plain").to_string(), "plain");
        assert_eq!(
            MetaValue::Sequence(vec!["a".into(), MetaValue::Null]).to_string(),
            r#"["a",null]"#
        );
    }
}
