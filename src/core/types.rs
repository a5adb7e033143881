//! core::types
//!
//! Strong types for core domain concepts.
//!
//! # Types
//!
//! - [`MetaFileName`] - Validated bare file name of a metadata sidecar
//! - [`Label`] - Classification string derived from an item's file name
//! - [`MappingIterStyle`] - How mapping values are iterated when flattened
//! - [`MetaRole`] - Which items a metadata file describes
//!
//! # Validation
//!
//! These types enforce validity at construction time. Invalid values
//! cannot be represented, preventing entire classes of bugs.
//!
//! # Examples
//!
//! ```
//! use taggu::core::types::{Label, MetaFileName};
//!
//! let name = MetaFileName::new("taggu_item.yml").unwrap();
//! assert_eq!(name.as_str(), "taggu_item.yml");
//!
//! assert!(MetaFileName::new("nested/taggu_item.yml").is_err());
//! assert_eq!(Label::from_file_name("TRACK_01.flac").as_str(), "TRACK");
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default name of the metadata file describing the directory containing it.
pub const DEFAULT_SELF_META_FILE: &str = "taggu_self.yml";

/// Default name of the metadata file describing entries of its directory.
pub const DEFAULT_ITEM_META_FILE: &str = "taggu_item.yml";

/// Errors from type validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid metadata file name: {0}")]
    InvalidMetaFileName(String),

    #[error("invalid mapping iteration style: {0}")]
    InvalidMappingIterStyle(String),
}

/// Check whether `name` is a single, well-formed path segment.
///
/// A bare name is non-empty, contains no path separator, and is neither
/// `.` nor `..`. Names written as keys in mapping-style item metadata
/// files must pass this check before they are fuzzy-resolved.
///
/// # Example
///
/// ```
/// use taggu::core::types::is_bare_name;
///
/// assert!(is_bare_name("T01"));
/// assert!(!is_bare_name(""));
/// assert!(!is_bare_name(".."));
/// assert!(!is_bare_name("disc/T01"));
/// assert!(!is_bare_name("T01/"));
/// ```
pub fn is_bare_name(name: &str) -> bool {
    if name.is_empty() || name == "." || name == ".." {
        return false;
    }
    !name.contains('/') && !name.contains(std::path::MAIN_SEPARATOR)
}

/// A validated metadata file name.
///
/// Metadata file names are looked up inside directories, so they must be
/// bare names: no separators, not `.` or `..`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MetaFileName(String);

impl MetaFileName {
    /// Create a new validated metadata file name.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidMetaFileName` if the name is not a bare name.
    pub fn new(name: impl Into<String>) -> Result<Self, TypeError> {
        let name = name.into();
        if !is_bare_name(&name) {
            return Err(TypeError::InvalidMetaFileName(name));
        }
        Ok(Self(name))
    }

    /// The default self-role metadata file name.
    pub fn default_self() -> Self {
        Self(DEFAULT_SELF_META_FILE.to_string())
    }

    /// The default item-role metadata file name.
    pub fn default_item() -> Self {
        Self(DEFAULT_ITEM_META_FILE.to_string())
    }

    /// Get the file name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for MetaFileName {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<MetaFileName> for String {
    fn from(name: MetaFileName) -> Self {
        name.0
    }
}

impl AsRef<str> for MetaFileName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MetaFileName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A short classification string derived from an item's file name.
///
/// Labels only gate which items a query may resolve against; they are
/// never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Label(String);

impl Label {
    /// Wrap an arbitrary string as a label.
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    /// Derive the default label of a file name: its leading alphabetic run.
    ///
    /// # Example
    ///
    /// ```
    /// use taggu::core::types::Label;
    ///
    /// assert_eq!(Label::from_file_name("DISC_02").as_str(), "DISC");
    /// assert_eq!(Label::from_file_name("track7.flac").as_str(), "track");
    /// assert_eq!(Label::from_file_name("01.flac").as_str(), "");
    /// ```
    pub fn from_file_name(file_name: &str) -> Self {
        let run: String = file_name
            .chars()
            .take_while(|c| c.is_alphabetic())
            .collect();
        Self(run)
    }

    /// Get the label as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Label {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How the entries of a mapping are iterated when a field value is flattened.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MappingIterStyle {
    /// Yield the keys of the mapping.
    #[default]
    Keys,
    /// Yield the values of the mapping.
    Values,
    /// Yield `[key, value]` pairs.
    Pairs,
}

impl std::str::FromStr for MappingIterStyle {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "keys" => Ok(Self::Keys),
            "values" | "vals" => Ok(Self::Values),
            "pairs" => Ok(Self::Pairs),
            other => Err(TypeError::InvalidMappingIterStyle(other.to_string())),
        }
    }
}

impl fmt::Display for MappingIterStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Keys => "keys",
            Self::Values => "values",
            Self::Pairs => "pairs",
        };
        f.write_str(s)
    }
}

/// The semantic role of a metadata file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MetaRole {
    /// Describes the directory containing the file.
    #[serde(rename = "self")]
    SelfMeta,
    /// Describes the items listed in the directory containing the file.
    #[serde(rename = "item")]
    ItemMeta,
}

/// Default source priority: self metadata first, then item metadata.
pub const DEFAULT_SOURCE_ORDER: [MetaRole; 2] = [MetaRole::SelfMeta, MetaRole::ItemMeta];

impl fmt::Display for MetaRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SelfMeta => f.write_str("self"),
            Self::ItemMeta => f.write_str("item"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod bare_name {
        use super::*;

        #[test]
        fn accepts_plain_names() {
            assert!(is_bare_name("ALBUM_01"));
            assert!(is_bare_name("T01_7f3a.flac"));
            assert!(is_bare_name(".hidden"));
        }

        #[test]
        fn rejects_dot_segments() {
            assert!(!is_bare_name("."));
            assert!(!is_bare_name(".."));
        }

        #[test]
        fn rejects_separators() {
            assert!(!is_bare_name("a/b"));
            assert!(!is_bare_name("/abs"));
            assert!(!is_bare_name("trailing/"));
        }
    }

    mod meta_file_name {
        use super::*;

        #[test]
        fn valid() {
            let name = MetaFileName::new("taggu_self.yml").unwrap();
            assert_eq!(name.as_str(), "taggu_self.yml");
            assert_eq!(name.to_string(), "taggu_self.yml");
        }

        #[test]
        fn invalid() {
            assert_eq!(
                MetaFileName::new(""),
                Err(TypeError::InvalidMetaFileName(String::new()))
            );
            assert!(MetaFileName::new("..").is_err());
            assert!(MetaFileName::new("meta/item.yml").is_err());
        }

        #[test]
        fn deserialize_validates() {
            let ok: Result<MetaFileName, _> = serde_json::from_str("\"item.yml\"");
            assert!(ok.is_ok());
            let bad: Result<MetaFileName, _> = serde_json::from_str("\"a/item.yml\"");
            assert!(bad.is_err());
        }
    }

    mod label {
        use super::*;

        #[test]
        fn leading_alphabetic_run() {
            assert_eq!(Label::from_file_name("ALBUM_01").as_str(), "ALBUM");
            assert_eq!(Label::from_file_name("SUBTRACK_02.flac").as_str(), "SUBTRACK");
            assert_eq!(Label::from_file_name("Disc").as_str(), "Disc");
        }

        #[test]
        fn no_alphabetic_prefix() {
            assert_eq!(Label::from_file_name("_x").as_str(), "");
            assert_eq!(Label::from_file_name("").as_str(), "");
        }
    }

    mod mapping_iter_style {
        use super::*;

        #[test]
        fn parse() {
            assert_eq!("keys".parse(), Ok(MappingIterStyle::Keys));
            assert_eq!("values".parse(), Ok(MappingIterStyle::Values));
            assert_eq!("vals".parse(), Ok(MappingIterStyle::Values));
            assert_eq!("pairs".parse(), Ok(MappingIterStyle::Pairs));
            assert!("items".parse::<MappingIterStyle>().is_err());
        }

        #[test]
        fn default_is_keys() {
            assert_eq!(MappingIterStyle::default(), MappingIterStyle::Keys);
        }

        #[test]
        fn display_matches_parse() {
            for style in [
                MappingIterStyle::Keys,
                MappingIterStyle::Values,
                MappingIterStyle::Pairs,
            ] {
                assert_eq!(style.to_string().parse(), Ok(style));
            }
        }
    }

    mod meta_role {
        use super::*;

        #[test]
        fn serde_names() {
            let roles: Vec<MetaRole> = serde_json::from_str(r#"["item", "self"]"#).unwrap();
            assert_eq!(roles, vec![MetaRole::ItemMeta, MetaRole::SelfMeta]);
            assert!(serde_json::from_str::<MetaRole>(r#""other""#).is_err());
        }

        #[test]
        fn display() {
            assert_eq!(MetaRole::SelfMeta.to_string(), "self");
            assert_eq!(MetaRole::ItemMeta.to_string(), "item");
        }
    }
}
