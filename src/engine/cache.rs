//! engine::cache
//!
//! Memoized metadata file parses.
//!
//! # Architecture
//!
//! The cache owns the [`Discovery`] engine it populates from and maps each
//! metadata file path to the [`MetaFileRecord`] discovery produced for it.
//! Entries never expire on their own; they leave the cache only through
//! [`MetaCache::invalidate`] or a forced [`MetaCache::ensure`].
//!
//! A file that yields nothing is still cached, as an empty record, so
//! repeated misses cost one parse.
//!
//! # Concurrency
//!
//! The cache is plain single-threaded state behind `&mut self`. Sharing it
//! across threads requires wrapping it so that each key is populated at most
//! once.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use super::discovery::{Discovery, DiscoveryError};
use crate::core::metadata::{MetaFileRecord, MetadataBlock};
use crate::core::paths::{Library, PathError, RelPath};

/// Errors from cache operations.
#[derive(Debug, Error)]
pub enum CacheError {
    /// A metadata file was looked up before being ensured.
    #[error("metadata file '{0}' is not cached")]
    NotCached(RelPath),

    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    #[error(transparent)]
    Path(#[from] PathError),
}

/// Counters for cache activity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Metadata files parsed through discovery.
    pub parses: usize,
    /// `ensure` calls answered from the cache.
    pub hits: usize,
}

/// Which cached entries to drop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invalidate {
    /// One metadata file.
    One(PathBuf),
    /// Several metadata files.
    Many(Vec<PathBuf>),
    /// Every metadata file at or below a directory.
    Subtree(PathBuf),
    /// Everything.
    All,
}

/// Cache of parsed metadata files, keyed by metadata file path.
#[derive(Debug)]
pub struct MetaCache {
    discovery: Discovery,
    entries: HashMap<RelPath, MetaFileRecord>,
    stats: CacheStats,
}

impl MetaCache {
    /// Create an empty cache populated through `discovery`.
    pub fn new(discovery: Discovery) -> Self {
        Self {
            discovery,
            entries: HashMap::new(),
            stats: CacheStats::default(),
        }
    }

    pub fn discovery(&self) -> &Discovery {
        &self.discovery
    }

    pub fn library(&self) -> &Library {
        self.discovery.library()
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    /// Number of cached metadata files.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Make sure `meta_file` is cached, re-parsing it if `force` is set.
    pub fn ensure(&mut self, meta_file: impl AsRef<Path>, force: bool) -> Result<(), CacheError> {
        let (meta_file, _) = self.library().normalize(meta_file)?;
        self.ensure_rel(meta_file, force)
    }

    fn ensure_rel(&mut self, meta_file: RelPath, force: bool) -> Result<(), CacheError> {
        if !force && self.entries.contains_key(&meta_file) {
            self.stats.hits += 1;
            debug!(meta_file = %meta_file, "meta file already cached");
            return Ok(());
        }

        self.entries.remove(&meta_file);

        let record: MetaFileRecord = self
            .discovery
            .items_described_by(meta_file.as_path())?
            .into_iter()
            .collect();
        self.stats.parses += 1;

        debug!(meta_file = %meta_file, items = record.len(), force, "cached meta file");
        self.entries.insert(meta_file, record);
        Ok(())
    }

    /// Ensure several metadata files, in order.
    pub fn ensure_many<I, P>(&mut self, meta_files: I, force: bool) -> Result<(), CacheError>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        for meta_file in meta_files {
            self.ensure(meta_file, force)?;
        }
        Ok(())
    }

    /// Ensure every candidate metadata file of `item`.
    ///
    /// Returns the candidate files in priority order.
    pub fn ensure_for_item(
        &mut self,
        item: impl AsRef<Path>,
        force: bool,
    ) -> Result<Vec<RelPath>, CacheError> {
        let meta_files = self.discovery.meta_files_for(item)?;
        for meta_file in &meta_files {
            self.ensure_rel(meta_file.clone(), force)?;
        }
        Ok(meta_files)
    }

    /// Ensure the candidate metadata files of several items.
    ///
    /// Files shared between items are processed once, even when forced.
    pub fn ensure_for_items<I, P>(&mut self, items: I, force: bool) -> Result<(), CacheError>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut seen: HashSet<RelPath> = HashSet::new();
        for meta_file in self.discovery.meta_files_for_items(items)? {
            if seen.insert(meta_file.clone()) {
                self.ensure_rel(meta_file, force)?;
            }
        }
        Ok(())
    }

    /// The cached record of `meta_file`.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::NotCached`] if the file was never ensured.
    pub fn lookup(&self, meta_file: impl AsRef<Path>) -> Result<&MetaFileRecord, CacheError> {
        let (meta_file, _) = self.library().normalize(meta_file)?;
        self.entries
            .get(&meta_file)
            .ok_or(CacheError::NotCached(meta_file))
    }

    /// The block describing `item`, from its highest priority metadata file.
    ///
    /// Candidate files are ensured first. An item no file describes has no
    /// metadata, which is not an error.
    pub fn item_metadata(
        &mut self,
        item: impl AsRef<Path>,
    ) -> Result<Option<&MetadataBlock>, CacheError> {
        let (item, _) = self.library().normalize(item)?;
        let meta_files = self.ensure_for_item(item.as_path(), false)?;

        Ok(meta_files
            .iter()
            .filter_map(|meta_file| self.entries.get(meta_file))
            .find_map(|record| record.get(&item)))
    }

    /// Whether `meta_file` is cached.
    pub fn contains(&self, meta_file: impl AsRef<Path>) -> bool {
        self.library()
            .normalize(meta_file)
            .map(|(meta_file, _)| self.entries.contains_key(&meta_file))
            .unwrap_or(false)
    }

    /// Whether any cached candidate metadata file of `item` describes it.
    ///
    /// Never populates the cache.
    pub fn contains_item(&self, item: impl AsRef<Path>) -> Result<bool, CacheError> {
        let (item, _) = self.library().normalize(item)?;
        Ok(self
            .discovery
            .meta_files_for(item.as_path())?
            .iter()
            .filter_map(|meta_file| self.entries.get(meta_file))
            .any(|record| record.contains_key(&item)))
    }

    /// Drop cached entries. Returns how many were removed.
    pub fn invalidate(&mut self, scope: Invalidate) -> Result<usize, CacheError> {
        let before = self.entries.len();

        match scope {
            Invalidate::One(meta_file) => {
                let (meta_file, _) = self.library().normalize(meta_file)?;
                self.entries.remove(&meta_file);
            }
            Invalidate::Many(meta_files) => {
                for meta_file in meta_files {
                    let (meta_file, _) = self.library().normalize(meta_file)?;
                    self.entries.remove(&meta_file);
                }
            }
            Invalidate::Subtree(dir) => {
                let (dir, _) = self.library().normalize(dir)?;
                self.entries.retain(|meta_file, _| !meta_file.starts_with(&dir));
            }
            Invalidate::All => self.entries.clear(),
        }

        let removed = before - self.entries.len();
        debug!(removed, remaining = self.entries.len(), "invalidated cache entries");
        Ok(removed)
    }

    /// Drop the candidate metadata files of the given items.
    pub fn invalidate_items<I, P>(&mut self, items: I) -> Result<usize, CacheError>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let meta_files = self.discovery.meta_files_for_items(items)?;
        let before = self.entries.len();
        for meta_file in &meta_files {
            self.entries.remove(meta_file);
        }
        Ok(before - self.entries.len())
    }
}
