//! core::paths
//!
//! Path authority for a media library rooted at one directory.
//!
//! # Architecture
//!
//! Every path the rest of the crate touches is expressed relative to the
//! library root and routed through [`Library::normalize`]. Normalization
//! joins the relative path to the root, collapses `.` and `..` lexically,
//! and re-derives the relative form from the result.
//!
//! **Hard rule:** a [`RelPath`] can only be obtained from this module. Its
//! constructor is private, so any `RelPath` in circulation has passed the
//! co-normalization check and is guaranteed to resolve inside the root.
//!
//! # Example
//!
//! ```no_run
//! use taggu::core::paths::Library;
//!
//! let library = Library::builder("/music").build().unwrap();
//!
//! let (rel, abs) = library.normalize("ALBUM_01/./DISC_01/../DISC_02").unwrap();
//! assert_eq!(rel.to_string(), "ALBUM_01/DISC_02");
//! assert_eq!(abs, std::path::PathBuf::from("/music/ALBUM_01/DISC_02"));
//!
//! assert!(library.normalize("../escape").is_err());
//! assert!(library.normalize("/absolute").is_err());
//! ```

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use serde::{Serialize, Serializer};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use super::types::MetaFileName;

/// Default extension of eligible item files.
pub const DEFAULT_ITEM_EXTENSION: &str = "flac";

/// Predicate deciding whether a filesystem entry (given by absolute path) is an item.
pub type ItemFilter = Arc<dyn Fn(&Path) -> bool + Send + Sync>;

/// Deterministic ordering of item names within one directory.
pub type ItemOrder = Arc<dyn Fn(&str, &str) -> Ordering + Send + Sync>;

/// Errors from path operations.
#[derive(Debug, Error)]
pub enum PathError {
    /// The input path was already absolute.
    #[error("sub path '{0}' is not a relative path")]
    AbsoluteSubpath(PathBuf),

    /// The normalized path is not a descendant of the library root.
    #[error("normalized path '{0}' is not a sub path of the library root")]
    EscapingSubpath(PathBuf),

    /// A fuzzy lookup matched zero or several entries.
    #[error(
        "incorrect number of matches for fuzzy lookup of '{prefix}' in directory '{dir}'; \
         expected: {expected}, found: {found}"
    )]
    NonUniqueFuzzyFileLookup {
        /// The prefix that was looked up
        prefix: String,
        /// The directory searched
        dir: RelPath,
        /// The number of matches required
        expected: usize,
        /// The number of matches found
        found: usize,
    },

    /// The configured library root does not exist or is not a directory.
    #[error("library root '{0}' does not exist or is not a directory")]
    RootNotFound(PathBuf),

    /// A fuzzy lookup prefix could not be turned into a pattern.
    #[error("invalid fuzzy lookup pattern: {0}")]
    InvalidPattern(String),

    /// Reading a directory failed.
    #[error("failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// A path relative to the library root.
///
/// Always normalized: no `.` segments, no `..` segments, no trailing
/// separator. The root itself is the empty path and displays as `.`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RelPath(PathBuf);

impl RelPath {
    /// The library root itself.
    pub(crate) fn root() -> Self {
        Self(PathBuf::new())
    }

    /// Whether this path names the library root.
    pub fn is_root(&self) -> bool {
        self.0.as_os_str().is_empty()
    }

    /// The parent directory, or `None` at the root.
    pub fn parent(&self) -> Option<RelPath> {
        if self.is_root() {
            return None;
        }
        Some(Self(
            self.0.parent().map(Path::to_path_buf).unwrap_or_default(),
        ))
    }

    /// The final path segment, or `None` at the root.
    pub fn file_name(&self) -> Option<&str> {
        self.0.file_name().and_then(|n| n.to_str())
    }

    /// Number of segments below the root.
    pub fn depth(&self) -> usize {
        self.0.components().count()
    }

    /// Whether `self` equals `prefix` or lies beneath it.
    pub fn starts_with(&self, prefix: &RelPath) -> bool {
        self.0.starts_with(&prefix.0)
    }

    /// Borrow the underlying relative path.
    pub fn as_path(&self) -> &Path {
        &self.0
    }
}

impl AsRef<Path> for RelPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl fmt::Display for RelPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            f.write_str(".")
        } else {
            write!(f, "{}", self.0.display())
        }
    }
}

impl Serialize for RelPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Collapse `.` and `..` components lexically, without touching the filesystem.
///
/// `..` at the filesystem root stays at the root, mirroring how absolute
/// paths behave on POSIX systems.
fn collapse(path: &Path) -> PathBuf {
    let mut out: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.last() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(component),
            },
            other => out.push(other),
        }
    }
    out.iter().collect()
}

/// Expand a leading `~` and make the path absolute and collapsed.
fn absolutize(path: &Path) -> Result<PathBuf, PathError> {
    let expanded = match path.strip_prefix("~") {
        Ok(rest) => match dirs::home_dir() {
            Some(home) => home.join(rest),
            None => path.to_path_buf(),
        },
        Err(_) => path.to_path_buf(),
    };

    if expanded.is_absolute() {
        return Ok(collapse(&expanded));
    }

    let cwd = std::env::current_dir().map_err(|e| PathError::Io {
        path: expanded.clone(),
        source: e,
    })?;
    Ok(collapse(&cwd.join(expanded)))
}

/// Build the default item filter: directories, plus files with one of `extensions`.
///
/// # Example
///
/// ```no_run
/// use taggu::core::paths::extension_filter;
/// use std::path::Path;
///
/// let filter = extension_filter(vec!["flac".to_string()]);
/// assert!(filter(Path::new("/music/ALBUM_01/TRACK_01.flac")));
/// ```
pub fn extension_filter(extensions: Vec<String>) -> ItemFilter {
    Arc::new(move |abs_path: &Path| {
        if abs_path.is_dir() {
            return true;
        }
        if !abs_path.is_file() {
            return false;
        }
        abs_path
            .extension()
            .and_then(|e| e.to_str())
            .map(|ext| extensions.iter().any(|allowed| allowed == ext))
            .unwrap_or(false)
    })
}

/// The default item ordering: byte-wise by name.
pub fn name_order() -> ItemOrder {
    Arc::new(|a: &str, b: &str| a.cmp(b))
}

/// Builder for [`Library`].
pub struct LibraryBuilder {
    root: PathBuf,
    item_filter: Option<ItemFilter>,
    item_order: Option<ItemOrder>,
    self_meta_file: Option<MetaFileName>,
    item_meta_file: Option<MetaFileName>,
}

impl LibraryBuilder {
    /// Use a custom item-eligibility predicate.
    pub fn item_filter(mut self, filter: ItemFilter) -> Self {
        self.item_filter = Some(filter);
        self
    }

    /// Use a custom item ordering.
    pub fn item_order(mut self, order: ItemOrder) -> Self {
        self.item_order = Some(order);
        self
    }

    /// Name of the self-role metadata file.
    pub fn self_meta_file(mut self, name: MetaFileName) -> Self {
        self.self_meta_file = Some(name);
        self
    }

    /// Name of the item-role metadata file.
    pub fn item_meta_file(mut self, name: MetaFileName) -> Self {
        self.item_meta_file = Some(name);
        self
    }

    /// Build the library.
    ///
    /// # Errors
    ///
    /// Returns [`PathError::RootNotFound`] if the root is not an existing directory.
    pub fn build(self) -> Result<Library, PathError> {
        let root = absolutize(&self.root)?;
        if !root.is_dir() {
            error!(root = %root.display(), "library root is not a directory");
            return Err(PathError::RootNotFound(root));
        }

        Ok(Library {
            root,
            item_filter: self
                .item_filter
                .unwrap_or_else(|| extension_filter(vec![DEFAULT_ITEM_EXTENSION.to_string()])),
            item_order: self.item_order.unwrap_or_else(name_order),
            self_meta_file: self
                .self_meta_file
                .unwrap_or_else(MetaFileName::default_self),
            item_meta_file: self
                .item_meta_file
                .unwrap_or_else(MetaFileName::default_item),
        })
    }
}

/// A media library: its root directory and the rules for finding items in it.
///
/// Created once at startup and immutable thereafter.
///
/// # Invariants
///
/// - `root` is absolute and collapsed
/// - Every [`RelPath`] handed out resolves inside `root`
#[derive(Clone)]
pub struct Library {
    root: PathBuf,
    item_filter: ItemFilter,
    item_order: ItemOrder,
    self_meta_file: MetaFileName,
    item_meta_file: MetaFileName,
}

impl fmt::Debug for Library {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Library")
            .field("root", &self.root)
            .field("self_meta_file", &self.self_meta_file)
            .field("item_meta_file", &self.item_meta_file)
            .finish_non_exhaustive()
    }
}

impl Library {
    /// Start building a library rooted at `root`.
    pub fn builder(root: impl Into<PathBuf>) -> LibraryBuilder {
        LibraryBuilder {
            root: root.into(),
            item_filter: None,
            item_order: None,
            self_meta_file: None,
            item_meta_file: None,
        }
    }

    /// The absolute root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Name of the self-role metadata file.
    pub fn self_meta_file(&self) -> &MetaFileName {
        &self.self_meta_file
    }

    /// Name of the item-role metadata file.
    pub fn item_meta_file(&self) -> &MetaFileName {
        &self.item_meta_file
    }

    /// The library root as a relative path.
    pub fn root_path(&self) -> RelPath {
        RelPath::root()
    }

    /// Normalize a relative path against the root.
    ///
    /// Returns the re-derived relative path and the absolute path.
    ///
    /// # Errors
    ///
    /// - [`PathError::AbsoluteSubpath`] if `rel_path` is absolute
    /// - [`PathError::EscapingSubpath`] if the collapsed path leaves the root
    pub fn normalize(&self, rel_path: impl AsRef<Path>) -> Result<(RelPath, PathBuf), PathError> {
        let rel_path = rel_path.as_ref();
        if rel_path.is_absolute() || rel_path.has_root() {
            error!(path = %rel_path.display(), "sub path is not a relative path");
            return Err(PathError::AbsoluteSubpath(rel_path.to_path_buf()));
        }

        let abs_path = collapse(&self.root.join(rel_path));
        match abs_path.strip_prefix(&self.root) {
            Ok(rel) => Ok((RelPath(rel.to_path_buf()), abs_path)),
            Err(_) => {
                error!(
                    path = %abs_path.display(),
                    root = %self.root.display(),
                    "normalized path is not a sub path of the library root"
                );
                Err(PathError::EscapingSubpath(abs_path))
            }
        }
    }

    /// Absolute location of an already-normalized path.
    pub fn abs_path(&self, rel_path: &RelPath) -> PathBuf {
        if rel_path.is_root() {
            self.root.clone()
        } else {
            self.root.join(&rel_path.0)
        }
    }

    /// Join a single entry name onto a directory path, re-normalizing the result.
    pub fn child(&self, dir: &RelPath, name: &str) -> Result<RelPath, PathError> {
        self.normalize(dir.0.join(name)).map(|(rel, _)| rel)
    }

    /// Yield the path itself iff it names an existing directory.
    ///
    /// Self-role metadata only ever applies to directories.
    pub fn contains_directory(
        &self,
        rel_path: impl AsRef<Path>,
    ) -> Result<Option<RelPath>, PathError> {
        let (rel, abs) = self.normalize(rel_path)?;
        Ok(abs.is_dir().then_some(rel))
    }

    /// Yield the parent of the path, unless the path is the root.
    ///
    /// Item-role metadata applies to entries listed by their parent.
    pub fn sibling_directory(
        &self,
        rel_path: impl AsRef<Path>,
    ) -> Result<Option<RelPath>, PathError> {
        let (rel, _) = self.normalize(rel_path)?;
        Ok(rel.parent())
    }

    /// Ancestors of `item`, nearest first, ending with the root.
    ///
    /// The root itself has no ancestors.
    pub fn ancestors(&self, item: &RelPath) -> Vec<RelPath> {
        let mut out = Vec::new();
        let mut current = item.parent();
        while let Some(path) = current {
            current = path.parent();
            out.push(path);
        }
        out
    }

    /// Whether the entry at `abs_path` passes the item-eligibility predicate.
    pub fn is_item(&self, abs_path: &Path) -> bool {
        (self.item_filter)(abs_path)
    }

    /// Compare two item names using the configured ordering.
    pub fn compare_names(&self, a: &str, b: &str) -> Ordering {
        (self.item_order)(a, b)
    }

    /// Names of eligible items directly inside `dir`.
    ///
    /// A missing or non-directory `dir` yields the empty set.
    pub fn eligible_names_in(&self, dir: impl AsRef<Path>) -> Result<BTreeSet<String>, PathError> {
        let (rel_dir, abs_dir) = self.normalize(dir)?;
        let mut names = BTreeSet::new();

        if !abs_dir.is_dir() {
            debug!(dir = %rel_dir, "not a directory, no eligible items");
            return Ok(names);
        }

        let entries = fs::read_dir(&abs_dir).map_err(|e| PathError::Io {
            path: abs_dir.clone(),
            source: e,
        })?;

        let mut seen = 0usize;
        for entry in entries {
            let entry = entry.map_err(|e| PathError::Io {
                path: abs_dir.clone(),
                source: e,
            })?;
            seen += 1;

            let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
                warn!(dir = %rel_dir, entry = ?entry.file_name(), "skipping non UTF-8 entry name");
                continue;
            };

            if self.is_item(&entry.path()) {
                debug!(dir = %rel_dir, item = %name, "item passed filter, marking as eligible");
                names.insert(name);
            } else {
                debug!(dir = %rel_dir, item = %name, "item failed filter, skipping");
            }
        }

        info!(
            dir = %rel_dir,
            eligible = names.len(),
            total = seen,
            "found eligible items"
        );
        Ok(names)
    }

    /// Eligible item names in `dir`, sorted by the item ordering.
    pub fn sorted_eligible_names_in(&self, dir: impl AsRef<Path>) -> Result<Vec<String>, PathError> {
        let mut names: Vec<String> = self.eligible_names_in(dir)?.into_iter().collect();
        names.sort_by(|a, b| self.compare_names(a, b));
        Ok(names)
    }

    /// Eligible item paths in `dir`, sorted by the item ordering.
    pub fn sorted_items_in(&self, dir: &RelPath) -> Result<Vec<RelPath>, PathError> {
        self.sorted_eligible_names_in(dir.as_path())?
            .iter()
            .map(|name| self.child(dir, name))
            .collect()
    }

    /// Resolve a name prefix to the single entry of `dir` starting with it.
    ///
    /// # Errors
    ///
    /// Returns [`PathError::NonUniqueFuzzyFileLookup`] unless exactly one
    /// entry of `dir` matches `prefix*`.
    pub fn fuzzy_resolve(&self, dir: impl AsRef<Path>, prefix: &str) -> Result<String, PathError> {
        let (rel_dir, abs_dir) = self.normalize(dir)?;

        let pattern = glob::Pattern::new(&format!("{}*", glob::Pattern::escape(prefix)))
            .map_err(|e| PathError::InvalidPattern(e.to_string()))?;
        let options = glob::MatchOptions {
            case_sensitive: true,
            require_literal_separator: true,
            require_literal_leading_dot: false,
        };

        let mut matches: Vec<String> = Vec::new();
        if abs_dir.is_dir() {
            let entries = fs::read_dir(&abs_dir).map_err(|e| PathError::Io {
                path: abs_dir.clone(),
                source: e,
            })?;
            for entry in entries {
                let entry = entry.map_err(|e| PathError::Io {
                    path: abs_dir.clone(),
                    source: e,
                })?;
                let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
                    warn!(dir = %rel_dir, entry = ?entry.file_name(), "skipping non UTF-8 entry name");
                    continue;
                };
                if pattern.matches_with(&name, options) {
                    matches.push(name);
                }
            }
        }

        if matches.len() != 1 {
            error!(
                prefix,
                dir = %rel_dir,
                found = matches.len(),
                "incorrect number of matches for fuzzy lookup"
            );
            return Err(PathError::NonUniqueFuzzyFileLookup {
                prefix: prefix.to_string(),
                dir: rel_dir,
                expected: 1,
                found: matches.len(),
            });
        }

        Ok(matches.remove(0))
    }
}
