//! core::config
//!
//! Configuration schema and loading.
//!
//! # Precedence
//!
//! Configuration values are resolved in this order (later overrides earlier):
//! 1. Default values
//! 2. The first config file found
//! 3. CLI flags (not handled here)
//!
//! # Config Locations
//!
//! Searched in order, first found wins:
//! 1. `$TAGGU_CONFIG` if set
//! 2. `<root>/.taggu.toml`
//! 3. `$XDG_CONFIG_HOME/taggu/config.toml`
//! 4. `~/.taggu/config.toml`
//!
//! # Example
//!
//! ```no_run
//! use taggu::core::config::Config;
//! use std::path::Path;
//!
//! let result = Config::load(Path::new("/music")).unwrap();
//! let config = result.config;
//!
//! let library = config.library(Path::new("/music")).unwrap();
//! println!("Self metadata file: {}", library.self_meta_file());
//! println!("Source order: {:?}", config.source_order());
//! ```

pub mod schema;

pub use schema::{LibraryConfig, QueryConfig};

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::core::paths::{extension_filter, Library, PathError, DEFAULT_ITEM_EXTENSION};
use crate::core::types::{MappingIterStyle, MetaFileName, MetaRole, DEFAULT_SOURCE_ORDER};

/// File name of the library-local config file.
pub const LOCAL_CONFIG_FILE: &str = ".taggu.toml";

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("invalid config value: {0}")]
    InvalidValue(String),

    #[error(transparent)]
    Path(#[from] PathError),
}

/// Warnings generated during config loading.
#[derive(Debug, Clone)]
pub struct ConfigWarning {
    /// The warning message.
    pub message: String,
    /// The path that triggered the warning.
    pub path: PathBuf,
}

/// Result of loading configuration.
#[derive(Debug)]
pub struct ConfigLoadResult {
    /// The loaded configuration.
    pub config: Config,
    /// Any warnings generated during loading.
    pub warnings: Vec<ConfigWarning>,
}

/// Loaded configuration with defaults applied through accessors.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Parsed config file contents
    pub file: LibraryConfig,
    /// Path to the config file (if loaded)
    path: Option<PathBuf>,
}

impl Config {
    /// Load configuration for the library rooted at `root`.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file exists but cannot be parsed or
    /// fails validation. Missing config files are not an error (defaults
    /// are used).
    pub fn load(root: &Path) -> Result<ConfigLoadResult, ConfigError> {
        let mut warnings = Vec::new();

        for path in Self::candidate_paths(root, &mut warnings) {
            if path.is_file() {
                let config = Self::load_from(&path)?;
                return Ok(ConfigLoadResult { config, warnings });
            }
        }

        debug!("no config file found, using defaults");
        Ok(ConfigLoadResult {
            config: Config::default(),
            warnings,
        })
    }

    /// Load configuration from an explicit file.
    pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
        let file = Self::read_config(path)?;
        file.validate()?;
        debug!(path = %path.display(), "loaded config file");

        Ok(Config {
            file,
            path: Some(path.to_path_buf()),
        })
    }

    /// Config file locations, in lookup order.
    fn candidate_paths(root: &Path, warnings: &mut Vec<ConfigWarning>) -> Vec<PathBuf> {
        let mut paths = Vec::new();

        // 1. $TAGGU_CONFIG
        if let Some(path) = std::env::var_os("TAGGU_CONFIG") {
            let path = PathBuf::from(path);
            if !path.is_file() {
                warnings.push(ConfigWarning {
                    message: "TAGGU_CONFIG is set but does not name a file, ignoring".to_string(),
                    path: path.clone(),
                });
            }
            paths.push(path);
        }

        // 2. <root>/.taggu.toml
        paths.push(root.join(LOCAL_CONFIG_FILE));

        // 3. $XDG_CONFIG_HOME/taggu/config.toml
        if let Some(xdg_home) = std::env::var_os("XDG_CONFIG_HOME") {
            paths.push(PathBuf::from(xdg_home).join("taggu/config.toml"));
        }

        // 4. ~/.taggu/config.toml
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".taggu/config.toml"));
        }

        paths
    }

    /// Read and parse a config file.
    fn read_config(path: &Path) -> Result<LibraryConfig, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Build the library rooted at `root` with the configured file names
    /// and item extensions.
    pub fn library(&self, root: &Path) -> Result<Library, ConfigError> {
        let library = Library::builder(root)
            .self_meta_file(self.self_meta_file()?)
            .item_meta_file(self.item_meta_file()?)
            .item_filter(extension_filter(self.item_extensions()))
            .build()?;
        Ok(library)
    }

    // =========================================================================
    // Accessor methods with defaults
    // =========================================================================

    /// Get the self-role metadata file name.
    ///
    /// Defaults to `taggu_self.yml` if not configured.
    pub fn self_meta_file(&self) -> Result<MetaFileName, ConfigError> {
        match &self.file.self_meta_file {
            Some(name) => MetaFileName::new(name.as_str())
                .map_err(|e| ConfigError::InvalidValue(e.to_string())),
            None => Ok(MetaFileName::default_self()),
        }
    }

    /// Get the item-role metadata file name.
    ///
    /// Defaults to `taggu_item.yml` if not configured.
    pub fn item_meta_file(&self) -> Result<MetaFileName, ConfigError> {
        match &self.file.item_meta_file {
            Some(name) => MetaFileName::new(name.as_str())
                .map_err(|e| ConfigError::InvalidValue(e.to_string())),
            None => Ok(MetaFileName::default_item()),
        }
    }

    /// Get the item file extensions.
    ///
    /// Defaults to `["flac"]` if not configured.
    pub fn item_extensions(&self) -> Vec<String> {
        self.file
            .item_extensions
            .clone()
            .unwrap_or_else(|| vec![DEFAULT_ITEM_EXTENSION.to_string()])
    }

    /// Get the metadata source priority order.
    ///
    /// Defaults to self, then item.
    pub fn source_order(&self) -> Vec<MetaRole> {
        self.file
            .source_order
            .clone()
            .unwrap_or_else(|| DEFAULT_SOURCE_ORDER.to_vec())
    }

    /// Check if label filtering is enabled.
    ///
    /// Defaults to `true` if not configured.
    pub fn labels(&self) -> bool {
        self.query().and_then(|q| q.labels).unwrap_or(true)
    }

    /// Get the default ancestor distance for parent lookups.
    pub fn max_parent_distance(&self) -> Option<usize> {
        self.query().and_then(|q| q.max_parent_distance)
    }

    /// Get the default depth budget for child lookups.
    pub fn max_child_distance(&self) -> Option<usize> {
        self.query().and_then(|q| q.max_child_distance)
    }

    /// Get the mapping iteration style.
    ///
    /// Defaults to `keys` if not configured.
    pub fn mapping_iter_style(&self) -> MappingIterStyle {
        self.query()
            .and_then(|q| q.mapping_iter_style)
            .unwrap_or_default()
    }

    /// Get the flattening depth; `None` is unbounded.
    pub fn flatten_limit(&self) -> Option<usize> {
        self.query().and_then(|q| q.flatten_limit)
    }

    /// Get the path to the loaded config file.
    pub fn loaded_from(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn query(&self) -> Option<&QueryConfig> {
        self.file.query.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults() {
        let config = Config::default();

        assert_eq!(config.self_meta_file().unwrap().as_str(), "taggu_self.yml");
        assert_eq!(config.item_meta_file().unwrap().as_str(), "taggu_item.yml");
        assert_eq!(config.item_extensions(), vec!["flac".to_string()]);
        assert_eq!(config.source_order(), DEFAULT_SOURCE_ORDER.to_vec());
        assert!(config.labels());
        assert_eq!(config.max_parent_distance(), None);
        assert_eq!(config.mapping_iter_style(), MappingIterStyle::Keys);
        assert_eq!(config.flatten_limit(), None);
        assert!(config.loaded_from().is_none());
    }

    #[test]
    fn load_from_root_local_file() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join(LOCAL_CONFIG_FILE),
            r#"
            item_meta_file = "tracks.yml"

            [query]
            max_parent_distance = 2
            "#,
        )
        .unwrap();

        let result = Config::load(temp.path()).unwrap();
        let config = result.config;

        assert_eq!(config.item_meta_file().unwrap().as_str(), "tracks.yml");
        assert_eq!(config.max_parent_distance(), Some(2));
        assert_eq!(
            config.loaded_from(),
            Some(temp.path().join(LOCAL_CONFIG_FILE).as_path())
        );
    }

    #[test]
    fn load_from_explicit_path() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("custom.toml");
        fs::write(&path, "source_order = [\"item\", \"self\"]\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(
            config.source_order(),
            vec![MetaRole::ItemMeta, MetaRole::SelfMeta]
        );
    }

    #[test]
    fn missing_explicit_path_is_error() {
        let temp = TempDir::new().unwrap();
        assert!(matches!(
            Config::load_from(&temp.path().join("missing.toml")),
            Err(ConfigError::ReadError { .. })
        ));
    }

    #[test]
    fn invalid_values_rejected() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("bad.toml");
        fs::write(&path, "item_extensions = []\n").unwrap();

        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::InvalidValue(_))
        ));
    }

    #[test]
    fn unknown_fields_rejected() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("bad.toml");
        fs::write(&path, "unknown_field = true\n").unwrap();

        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::ParseError { .. })
        ));
    }

    #[test]
    fn library_uses_configured_names_and_extensions() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("song.mp3"), b"").unwrap();
        fs::write(temp.path().join("song.flac"), b"").unwrap();

        let config = Config {
            file: LibraryConfig {
                self_meta_file: Some("album.yml".to_string()),
                item_extensions: Some(vec!["mp3".to_string()]),
                ..Default::default()
            },
            path: None,
        };

        let library = config.library(temp.path()).unwrap();
        assert_eq!(library.self_meta_file().as_str(), "album.yml");
        let names = library.sorted_eligible_names_in("").unwrap();
        assert_eq!(names, vec!["song.mp3".to_string()]);
    }

    #[test]
    fn library_root_must_exist() {
        let temp = TempDir::new().unwrap();
        let config = Config::default();

        assert!(matches!(
            config.library(&temp.path().join("missing")),
            Err(ConfigError::Path(PathError::RootNotFound(_)))
        ));
    }
}
