//! engine::discovery
//!
//! Mapping between items and the metadata files that describe them.
//!
//! # Roles
//!
//! Each metadata source has a role that fixes which items its file describes:
//!
//! - [`MetaRole::SelfMeta`] - lives inside a directory and describes that directory
//! - [`MetaRole::ItemMeta`] - lives inside a directory and describes the items listed in it
//!
//! The order of the configured sources is their priority order: when two
//! files both carry a field for the same item, the earlier source wins.
//!
//! # Directions
//!
//! - [`Discovery::meta_files_for`] - item path to the metadata files that could describe it
//! - [`Discovery::items_described_by`] - metadata file to the `(item, block)` pairs it yields
//!
//! # Soft failures
//!
//! An unknown metadata file name, a missing metadata file, a count mismatch
//! between a sequence payload and the directory listing, and invalid or
//! unclaimed mapping keys are logged as warnings and produce partial results.
//! A mapping key that matches no entry, or several, is one of those invalid
//! keys. Path-safety violations and unreadable directories are errors.

use std::collections::BTreeSet;
use std::path::Path;

use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::core::metadata::{read_yaml_file, MetaValue, MetadataBlock, SchemaError};
use crate::core::paths::{Library, PathError, RelPath};
use crate::core::types::{is_bare_name, MetaFileName, MetaRole, DEFAULT_SOURCE_ORDER};

/// Errors from discovery operations.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// A path was rejected by the path authority.
    #[error(transparent)]
    Path(#[from] PathError),

    /// A metadata file could not be read or parsed.
    #[error("failed to load metadata file '{path}': {source}")]
    Schema {
        /// The metadata file
        path: RelPath,
        /// The underlying error
        source: SchemaError,
    },

    /// The configured source order is unusable.
    #[error("invalid source order: {0}")]
    InvalidSourceOrder(String),
}

/// One configured metadata source: a role and the file name that carries it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaSource {
    pub role: MetaRole,
    pub file_name: MetaFileName,
}

/// Discovery engine over one library.
#[derive(Debug, Clone)]
pub struct Discovery {
    library: Library,
    sources: Vec<MetaSource>,
}

impl Discovery {
    /// Create a discovery engine using the default source order.
    pub fn new(library: Library) -> Self {
        let sources = Self::sources_for(&library, &DEFAULT_SOURCE_ORDER);
        Self { library, sources }
    }

    /// Create a discovery engine with an explicit source priority order.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError::InvalidSourceOrder`] unless `order` names
    /// each role exactly once.
    pub fn with_order(library: Library, order: &[MetaRole]) -> Result<Self, DiscoveryError> {
        let distinct: BTreeSet<String> = order.iter().map(ToString::to_string).collect();
        if order.len() != DEFAULT_SOURCE_ORDER.len() || distinct.len() != order.len() {
            return Err(DiscoveryError::InvalidSourceOrder(format!(
                "expected each of self, item exactly once, got [{}]",
                order
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", ")
            )));
        }

        let sources = Self::sources_for(&library, order);
        Ok(Self { library, sources })
    }

    fn sources_for(library: &Library, order: &[MetaRole]) -> Vec<MetaSource> {
        order
            .iter()
            .map(|role| MetaSource {
                role: *role,
                file_name: match role {
                    MetaRole::SelfMeta => library.self_meta_file().clone(),
                    MetaRole::ItemMeta => library.item_meta_file().clone(),
                },
            })
            .collect()
    }

    /// The library this engine discovers in.
    pub fn library(&self) -> &Library {
        &self.library
    }

    /// The metadata sources, highest priority first.
    pub fn sources(&self) -> &[MetaSource] {
        &self.sources
    }

    /// The role of a metadata file name, if it matches a configured source.
    pub fn role_of(&self, file_name: &str) -> Option<MetaRole> {
        self.sources
            .iter()
            .find(|source| source.file_name.as_str() == file_name)
            .map(|source| source.role)
    }

    /// Metadata files that could describe `item`, in priority order.
    ///
    /// Only files that exist on disk are returned.
    pub fn meta_files_for(&self, item: impl AsRef<Path>) -> Result<Vec<RelPath>, DiscoveryError> {
        let (item, _) = self.library.normalize(item)?;
        let mut found = Vec::new();

        for source in &self.sources {
            let meta_dir = match source.role {
                MetaRole::SelfMeta => self.library.contains_directory(item.as_path())?,
                MetaRole::ItemMeta => self.library.sibling_directory(item.as_path())?,
            };
            let Some(meta_dir) = meta_dir else {
                continue;
            };

            let meta_file = self.library.child(&meta_dir, source.file_name.as_str())?;
            if self.library.abs_path(&meta_file).is_file() {
                info!(meta_file = %meta_file, item = %item, role = %source.role, "found meta file");
                found.push(meta_file);
            } else {
                debug!(meta_file = %meta_file, item = %item, "meta file does not exist");
            }
        }

        Ok(found)
    }

    /// Metadata files for several items, in item order then priority order.
    pub fn meta_files_for_items<I, P>(&self, items: I) -> Result<Vec<RelPath>, DiscoveryError>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut all = Vec::new();
        for item in items {
            all.extend(self.meta_files_for(item)?);
        }
        Ok(all)
    }

    /// The `(item, block)` pairs a metadata file yields.
    ///
    /// The file is read and closed before any pair is produced.
    pub fn items_described_by(
        &self,
        meta_file: impl AsRef<Path>,
    ) -> Result<Vec<(RelPath, MetadataBlock)>, DiscoveryError> {
        let (meta_file, abs_meta_file) = self.library.normalize(meta_file)?;

        if !abs_meta_file.is_file() {
            error!(meta_file = %meta_file, "meta file does not exist, or is not a file");
            return Ok(Vec::new());
        }

        let file_name = meta_file.file_name().unwrap_or_default();
        let Some(role) = self.role_of(file_name) else {
            warn!(meta_file = %meta_file, "unknown meta file name, skipping");
            return Ok(Vec::new());
        };

        let dir = meta_file
            .parent()
            .unwrap_or_else(|| self.library.root_path());

        let payload = read_yaml_file(&abs_meta_file).map_err(|e| DiscoveryError::Schema {
            path: meta_file.clone(),
            source: e,
        })?;

        let pairs = match role {
            MetaRole::SelfMeta => self.self_meta_pairs(payload, dir),
            MetaRole::ItemMeta => match payload {
                MetaValue::Sequence(blocks) => self.sequence_item_pairs(blocks, &dir)?,
                MetaValue::Mapping(blocks) => self.mapping_item_pairs(blocks, &dir)?,
                other => {
                    warn!(
                        meta_file = %meta_file,
                        kind = other.kind(),
                        "item meta file is neither a sequence nor a mapping, ignoring"
                    );
                    Vec::new()
                }
            },
        };

        debug!(meta_file = %meta_file, items = pairs.len(), "processed meta file");
        Ok(pairs)
    }

    /// Pairs for several metadata files, in the order given.
    pub fn items_described_by_all<I, P>(
        &self,
        meta_files: I,
    ) -> Result<Vec<(RelPath, MetadataBlock)>, DiscoveryError>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut all = Vec::new();
        for meta_file in meta_files {
            all.extend(self.items_described_by(meta_file)?);
        }
        Ok(all)
    }

    /// Self metadata targets exactly the containing directory.
    fn self_meta_pairs(&self, payload: MetaValue, dir: RelPath) -> Vec<(RelPath, MetadataBlock)> {
        match payload {
            MetaValue::Mapping(block) => vec![(dir, block)],
            other => {
                debug!(dir = %dir, kind = other.kind(), "self meta payload is not a mapping, ignoring");
                Vec::new()
            }
        }
    }

    /// Assign blocks positionally to the sorted eligible items of `dir`.
    fn sequence_item_pairs(
        &self,
        blocks: Vec<MetaValue>,
        dir: &RelPath,
    ) -> Result<Vec<(RelPath, MetadataBlock)>, DiscoveryError> {
        let names = self.library.sorted_eligible_names_in(dir.as_path())?;

        if names.len() != blocks.len() {
            warn!(
                dir = %dir,
                items = names.len(),
                blocks = blocks.len(),
                "counts of items in directory and metadata blocks do not match"
            );
        }

        let mut pairs = Vec::with_capacity(names.len().min(blocks.len()));
        for (name, block) in names.iter().zip(blocks) {
            let item = self.library.child(dir, name)?;
            match block_of(block) {
                Some(block) => pairs.push((item, block)),
                None => warn!(item = %item, "metadata block is not a mapping, skipping"),
            }
        }
        Ok(pairs)
    }

    /// Assign blocks by fuzzy-resolved name.
    fn mapping_item_pairs(
        &self,
        blocks: indexmap::IndexMap<String, MetaValue>,
        dir: &RelPath,
    ) -> Result<Vec<(RelPath, MetadataBlock)>, DiscoveryError> {
        let eligible = self.library.eligible_names_in(dir.as_path())?;
        let mut claimed: BTreeSet<String> = BTreeSet::new();
        let mut pairs = Vec::new();

        for (key, block) in blocks {
            if !is_bare_name(&key) {
                warn!(dir = %dir, name = %key, "item name is not valid, skipping");
                continue;
            }

            let name = match self.library.fuzzy_resolve(dir.as_path(), &key) {
                Ok(name) => name,
                Err(PathError::NonUniqueFuzzyFileLookup { found, .. }) => {
                    warn!(
                        dir = %dir,
                        prefix = %key,
                        found,
                        "item name does not match exactly one entry, skipping"
                    );
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            if claimed.contains(&name) {
                warn!(dir = %dir, item = %name, "item was already processed for this directory, skipping");
                continue;
            }

            if !eligible.contains(&name) {
                warn!(dir = %dir, item = %name, "item not found in eligible item names, skipping");
                continue;
            }

            let item = self.library.child(dir, &name)?;
            claimed.insert(name);
            match block_of(block) {
                Some(block) => pairs.push((item, block)),
                None => warn!(item = %item, "metadata block is not a mapping, skipping"),
            }
        }

        let unclaimed: Vec<&String> = eligible.difference(&claimed).collect();
        if !unclaimed.is_empty() {
            warn!(
                dir = %dir,
                count = unclaimed.len(),
                items = ?unclaimed,
                "eligible items remaining not referenced in metadata"
            );
        }

        Ok(pairs)
    }
}

/// A mapping is a block, null is an empty block, anything else is not a block.
fn block_of(value: MetaValue) -> Option<MetadataBlock> {
    match value {
        MetaValue::Mapping(block) => Some(block),
        MetaValue::Null => Some(MetadataBlock::new()),
        _ => None,
    }
}
