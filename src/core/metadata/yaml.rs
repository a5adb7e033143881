//! core::metadata::yaml
//!
//! YAML loading with the scalar restriction.
//!
//! Bare scalars only ever become strings or null. `1.50`, `true`, `2017-03-01`
//! and `0x1F` all come back exactly as written; `~`, `null`, `Null`, `NULL`
//! and empty values become null. Quoting never changes this.
//!
//! # Architecture
//!
//! Loading is two passes over the same text:
//!
//! 1. Parse into a `serde_yaml_ng::Value` to learn the document's shape and
//!    which scalars are null.
//! 2. Deserialize again, guided by that shape, asking for every non-null
//!    scalar as a string so the deserializer hands back its raw text.
//!
//! Tagged nodes and composite mapping keys are rejected as structural errors.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::de::{self, DeserializeSeed, Deserializer, IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde::Deserialize;
use serde_yaml_ng::Value;
use thiserror::Error;
use tracing::debug;

use super::schema::MetaValue;

/// Errors from loading metadata YAML.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// The text is not valid YAML.
    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    /// The YAML is valid but uses a construct metadata cannot hold.
    #[error("unsupported metadata structure: {0}")]
    Unsupported(String),

    /// The file could not be read.
    #[error("failed to read metadata file '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Parse YAML text into a metadata value.
///
/// # Example
///
/// ```
/// use taggu::core::metadata::yaml::parse_yaml;
/// use taggu::core::metadata::MetaValue;
///
/// let value = parse_yaml("year: 1999\nrating: ~\nlive: true").unwrap();
/// let map = value.as_mapping().unwrap();
/// assert_eq!(map["year"], MetaValue::string("1999"));
/// assert_eq!(map["rating"], MetaValue::Null);
/// assert_eq!(map["live"], MetaValue::string("true"));
/// ```
pub fn parse_yaml(text: &str) -> Result<MetaValue, SchemaError> {
    if text.trim().is_empty() {
        return Ok(MetaValue::Null);
    }

    let shape: Value = serde_yaml_ng::from_str(text)?;
    check_shape(&shape)?;

    if shape.is_null() {
        return Ok(MetaValue::Null);
    }

    let deserializer = serde_yaml_ng::Deserializer::from_str(text);
    Ok(Shaped(&shape).deserialize(deserializer)?)
}

/// Read and parse a YAML file.
///
/// The file is read fully into memory and closed before parsing starts.
pub fn read_yaml_file(path: &Path) -> Result<MetaValue, SchemaError> {
    debug!(path = %path.display(), "opening YAML file");
    let text = fs::read_to_string(path).map_err(|e| SchemaError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    parse_yaml(&text)
}

/// Reject constructs a metadata value cannot represent.
fn check_shape(shape: &Value) -> Result<(), SchemaError> {
    match shape {
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => Ok(()),
        Value::Sequence(items) => items.iter().try_for_each(check_shape),
        Value::Mapping(map) => {
            for (key, value) in map {
                match key {
                    Value::Sequence(_) | Value::Mapping(_) | Value::Tagged(_) => {
                        return Err(SchemaError::Unsupported(
                            "mapping keys must be scalars".to_string(),
                        ));
                    }
                    _ => {}
                }
                check_shape(value)?;
            }
            Ok(())
        }
        Value::Tagged(tagged) => Err(SchemaError::Unsupported(format!(
            "tagged value '{}'",
            tagged.tag
        ))),
    }
}

/// Deserialize one node, guided by its already-parsed shape.
struct Shaped<'s>(&'s Value);

impl<'de, 's> DeserializeSeed<'de> for Shaped<'s> {
    type Value = MetaValue;

    fn deserialize<D>(self, deserializer: D) -> Result<MetaValue, D::Error>
    where
        D: Deserializer<'de>,
    {
        match self.0 {
            Value::Null => {
                IgnoredAny::deserialize(deserializer)?;
                Ok(MetaValue::Null)
            }
            Value::Bool(_) | Value::Number(_) | Value::String(_) => deserializer
                .deserialize_str(RawScalar)
                .map(MetaValue::String),
            Value::Sequence(items) => deserializer.deserialize_seq(SeqShape(items)),
            Value::Mapping(map) => deserializer.deserialize_map(MapShape(map)),
            Value::Tagged(_) => Err(de::Error::custom("tagged values are not supported")),
        }
    }
}

/// Accepts a scalar as its raw text.
struct RawScalar;

impl<'de> Visitor<'de> for RawScalar {
    type Value = String;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a scalar")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<String, E> {
        Ok(v)
    }
}

/// Mapping keys are always taken as raw text.
struct RawKey;

impl<'de> DeserializeSeed<'de> for RawKey {
    type Value = String;

    fn deserialize<D>(self, deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_str(RawScalar)
    }
}

struct SeqShape<'s>(&'s [Value]);

impl<'de, 's> Visitor<'de> for SeqShape<'s> {
    type Value = MetaValue;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "a sequence of {} elements", self.0.len())
    }

    fn visit_seq<A>(self, mut access: A) -> Result<MetaValue, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut items = Vec::with_capacity(self.0.len());
        for shape in self.0 {
            match access.next_element_seed(Shaped(shape))? {
                Some(item) => items.push(item),
                None => return Err(de::Error::invalid_length(items.len(), &self)),
            }
        }
        Ok(MetaValue::Sequence(items))
    }
}

struct MapShape<'s>(&'s serde_yaml_ng::Mapping);

impl<'de, 's> Visitor<'de> for MapShape<'s> {
    type Value = MetaValue;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "a mapping of {} entries", self.0.len())
    }

    fn visit_map<A>(self, mut access: A) -> Result<MetaValue, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut map = IndexMap::with_capacity(self.0.len());
        for (_, value_shape) in self.0 {
            let Some(key) = access.next_key_seed(RawKey)? else {
                return Err(de::Error::invalid_length(map.len(), &self));
            };
            let value = access.next_value_seed(Shaped(value_shape))?;
            map.insert(key, value);
        }
        Ok(MetaValue::Mapping(map))
    }
}
