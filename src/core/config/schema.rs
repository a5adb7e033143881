//! core::config::schema
//!
//! Configuration schema types.
//!
//! # Library Config
//!
//! Located at (first found wins):
//! 1. `$TAGGU_CONFIG` if set
//! 2. `<root>/.taggu.toml`
//! 3. `$XDG_CONFIG_HOME/taggu/config.toml`
//! 4. `~/.taggu/config.toml`
//!
//! # Validation
//!
//! Config values are validated after parsing to ensure they conform to
//! expected formats (e.g., metadata file names must be bare names).

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::core::types::{MappingIterStyle, MetaFileName, MetaRole, DEFAULT_SOURCE_ORDER};

/// Library configuration.
///
/// # Example
///
/// ```toml
/// self_meta_file = "taggu_self.yml"
/// item_meta_file = "taggu_item.yml"
/// item_extensions = ["flac", "mp3"]
/// source_order = ["self", "item"]
///
/// [query]
/// labels = true
/// max_parent_distance = 3
/// mapping_iter_style = "keys"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct LibraryConfig {
    /// Self-role metadata file name
    pub self_meta_file: Option<String>,

    /// Item-role metadata file name
    pub item_meta_file: Option<String>,

    /// Extensions of files treated as items (directories always are)
    pub item_extensions: Option<Vec<String>>,

    /// Metadata source priority, highest first
    pub source_order: Option<Vec<MetaRole>>,

    /// Query defaults
    pub query: Option<QueryConfig>,
}

impl LibraryConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let self_name = self
            .self_meta_file
            .as_deref()
            .map(MetaFileName::new)
            .transpose()
            .map_err(|e| ConfigError::InvalidValue(format!("self_meta_file: {}", e)))?
            .unwrap_or_else(MetaFileName::default_self);

        let item_name = self
            .item_meta_file
            .as_deref()
            .map(MetaFileName::new)
            .transpose()
            .map_err(|e| ConfigError::InvalidValue(format!("item_meta_file: {}", e)))?
            .unwrap_or_else(MetaFileName::default_item);

        if self_name == item_name {
            return Err(ConfigError::InvalidValue(format!(
                "self_meta_file and item_meta_file must differ, both are '{}'",
                self_name
            )));
        }

        if let Some(extensions) = &self.item_extensions {
            if extensions.is_empty() {
                return Err(ConfigError::InvalidValue(
                    "item_extensions cannot be empty".to_string(),
                ));
            }
            for ext in extensions {
                if ext.is_empty() || ext.contains('.') || ext.contains('/') {
                    return Err(ConfigError::InvalidValue(format!(
                        "invalid item extension '{}', expected a bare extension like 'flac'",
                        ext
                    )));
                }
            }
        }

        if let Some(order) = &self.source_order {
            let distinct: BTreeSet<String> = order.iter().map(ToString::to_string).collect();
            if order.len() != DEFAULT_SOURCE_ORDER.len() || distinct.len() != order.len() {
                return Err(ConfigError::InvalidValue(
                    "source_order must name each of \"self\", \"item\" exactly once".to_string(),
                ));
            }
        }

        Ok(())
    }
}

/// Query defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct QueryConfig {
    /// Whether label filtering is available (default: true)
    pub labels: Option<bool>,

    /// Ancestor levels searched by parent lookups (default: unbounded)
    pub max_parent_distance: Option<usize>,

    /// Depth budget of child lookups (default: unbounded)
    pub max_child_distance: Option<usize>,

    /// Mapping iteration when flattening (default: keys)
    pub mapping_iter_style: Option<MappingIterStyle>,

    /// Flattening depth (default: unbounded)
    pub flatten_limit: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    mod library_config {
        use super::*;

        #[test]
        fn defaults_are_valid() {
            let config = LibraryConfig::default();
            assert!(config.self_meta_file.is_none());
            assert!(config.query.is_none());
            assert!(config.validate().is_ok());
        }

        #[test]
        fn parse_full() {
            let config: LibraryConfig = toml::from_str(
                r#"
                self_meta_file = "album.yml"
                item_meta_file = "tracks.yml"
                item_extensions = ["flac", "mp3"]
                source_order = ["item", "self"]

                [query]
                labels = false
                max_parent_distance = 2
                mapping_iter_style = "pairs"
                flatten_limit = 0
                "#,
            )
            .unwrap();

            assert!(config.validate().is_ok());
            assert_eq!(
                config.source_order,
                Some(vec![MetaRole::ItemMeta, MetaRole::SelfMeta])
            );
            let query = config.query.unwrap();
            assert_eq!(query.labels, Some(false));
            assert_eq!(query.max_parent_distance, Some(2));
            assert_eq!(query.max_child_distance, None);
            assert_eq!(query.mapping_iter_style, Some(MappingIterStyle::Pairs));
            assert_eq!(query.flatten_limit, Some(0));
        }

        #[test]
        fn invalid_meta_file_name() {
            let config = LibraryConfig {
                self_meta_file: Some("meta/self.yml".to_string()),
                ..Default::default()
            };
            assert!(config.validate().is_err());
        }

        #[test]
        fn meta_file_names_must_differ() {
            let config = LibraryConfig {
                self_meta_file: Some("meta.yml".to_string()),
                item_meta_file: Some("meta.yml".to_string()),
                ..Default::default()
            };
            assert!(config.validate().is_err());

            // Clashing with the other role's default also counts.
            let config = LibraryConfig {
                self_meta_file: Some("taggu_item.yml".to_string()),
                ..Default::default()
            };
            assert!(config.validate().is_err());
        }

        #[test]
        fn invalid_extensions() {
            for extensions in [vec![], vec![".flac".to_string()], vec![String::new()]] {
                let config = LibraryConfig {
                    item_extensions: Some(extensions),
                    ..Default::default()
                };
                assert!(config.validate().is_err());
            }
        }

        #[test]
        fn invalid_source_order() {
            let config = LibraryConfig {
                source_order: Some(vec![MetaRole::SelfMeta, MetaRole::SelfMeta]),
                ..Default::default()
            };
            assert!(config.validate().is_err());

            let config = LibraryConfig {
                source_order: Some(vec![MetaRole::ItemMeta]),
                ..Default::default()
            };
            assert!(config.validate().is_err());
        }

        #[test]
        fn unknown_role_rejected() {
            let result: Result<LibraryConfig, _> = toml::from_str(r#"source_order = ["other"]"#);
            assert!(result.is_err());
        }

        #[test]
        fn roundtrip() {
            let config = LibraryConfig {
                self_meta_file: Some("album.yml".to_string()),
                item_meta_file: Some("tracks.yml".to_string()),
                item_extensions: Some(vec!["flac".to_string()]),
                source_order: Some(DEFAULT_SOURCE_ORDER.to_vec()),
                query: Some(QueryConfig {
                    labels: Some(true),
                    max_parent_distance: Some(3),
                    max_child_distance: Some(1),
                    mapping_iter_style: Some(MappingIterStyle::Values),
                    flatten_limit: Some(2),
                }),
            };

            let toml = toml::to_string_pretty(&config).unwrap();
            let parsed: LibraryConfig = toml::from_str(&toml).unwrap();
            assert_eq!(config, parsed);
        }

        #[test]
        fn reject_unknown_fields() {
            let toml = r#"
                self_meta_file = "album.yml"
                unknown_field = true
            "#;

            let result: Result<LibraryConfig, _> = toml::from_str(toml);
            assert!(result.is_err());
        }
    }
}
