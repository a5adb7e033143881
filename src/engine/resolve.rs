//! engine::resolve
//!
//! Field resolution: direct lookup, ancestor fallback, descendant aggregation.
//!
//! # Lookups
//!
//! - [`Resolver::field`] - the item's own metadata, first source carrying the field wins
//! - [`Resolver::parent_fields`] - the nearest ancestor that has the field
//! - [`Resolver::child_fields`] - every descendant that has the field, pre-order
//!
//! All three return lazy iterators of `Result<MetaValue, QueryError>`.
//! Metadata files are parsed as the iterator reaches them, through the
//! [`MetaCache`]. The first error is yielded once and the iterator then ends.
//!
//! # Labels
//!
//! When a query passes a label set and a label extractor is configured, an
//! item whose label is not in the set resolves to nothing. The check applies
//! to the queried item and to every ancestor or child visited on its behalf.
//!
//! # Limitations
//!
//! [`Resolver::child_fields`] does not detect directory cycles. A symlink
//! loop is walked until the depth budget runs out, or forever without one.

use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::vec;

use thiserror::Error;
use tracing::{debug, info};

use super::cache::{CacheError, MetaCache};
use super::flatten::{flatten, Flattened};
use crate::core::config::Config;
use crate::core::metadata::MetaValue;
use crate::core::paths::{PathError, RelPath};
use crate::core::types::{Label, MappingIterStyle};

/// Errors from field resolution.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error(transparent)]
    Path(#[from] PathError),
}

/// Derives the label of an item.
pub type LabelExtractor = Arc<dyn Fn(&RelPath) -> Label + Send + Sync>;

/// The default label extractor: the leading alphabetic run of the file name.
///
/// The root has no file name and gets the empty label.
pub fn default_label_extractor() -> LabelExtractor {
    Arc::new(|item: &RelPath| Label::from_file_name(item.file_name().unwrap_or_default()))
}

/// Tunables for field resolution.
#[derive(Clone)]
pub struct QueryOptions {
    /// Label extractor; `None` disables label filtering entirely.
    pub label_extractor: Option<LabelExtractor>,
    /// Default ancestor distance cap for [`Resolver::parent_fields`].
    pub max_parent_distance: Option<usize>,
    /// Default depth budget for [`Resolver::child_fields`].
    pub max_child_distance: Option<usize>,
    pub mapping_iter_style: MappingIterStyle,
    /// Flattening depth, `None` for unbounded. Field values always expand
    /// at least one level.
    pub flatten_limit: Option<usize>,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            label_extractor: Some(default_label_extractor()),
            max_parent_distance: None,
            max_child_distance: None,
            mapping_iter_style: MappingIterStyle::default(),
            flatten_limit: None,
        }
    }
}

impl QueryOptions {
    /// Options from loaded configuration.
    pub fn from_config(config: &Config) -> Self {
        Self {
            label_extractor: config.labels().then(default_label_extractor),
            max_parent_distance: config.max_parent_distance(),
            max_child_distance: config.max_child_distance(),
            mapping_iter_style: config.mapping_iter_style(),
            flatten_limit: config.flatten_limit(),
        }
    }
}

impl fmt::Debug for QueryOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryOptions")
            .field("labels", &self.label_extractor.is_some())
            .field("max_parent_distance", &self.max_parent_distance)
            .field("max_child_distance", &self.max_child_distance)
            .field("mapping_iter_style", &self.mapping_iter_style)
            .field("flatten_limit", &self.flatten_limit)
            .finish()
    }
}

/// Answers field queries over a metadata cache.
///
/// Holds no state of its own between calls besides its options.
///
/// # Example
///
/// ```no_run
/// use taggu::core::paths::Library;
/// use taggu::engine::{Discovery, MetaCache, QueryOptions, Resolver};
///
/// let library = Library::builder("/music").build().unwrap();
/// let mut cache = MetaCache::new(Discovery::new(library));
/// let mut resolver = Resolver::new(&mut cache, QueryOptions::default());
///
/// for value in resolver.parent_fields("ALBUM_01/TRACK_01.flac", "genre", None, Some(2)) {
///     println!("{}", value.unwrap());
/// }
/// ```
pub struct Resolver<'c> {
    cache: &'c mut MetaCache,
    options: QueryOptions,
}

impl<'c> Resolver<'c> {
    pub fn new(cache: &'c mut MetaCache, options: QueryOptions) -> Self {
        Self { cache, options }
    }

    pub fn options(&self) -> &QueryOptions {
        &self.options
    }

    /// The underlying cache, e.g. to invalidate entries between queries.
    pub fn cache_mut(&mut self) -> &mut MetaCache {
        &mut *self.cache
    }

    /// Values of field `name` from the item's own metadata.
    ///
    /// Candidate metadata files are tried in priority order. The first block
    /// for `item` that carries `name` supplies every value; later files are
    /// not consulted.
    pub fn field(
        &mut self,
        item: impl AsRef<Path>,
        name: &str,
        labels: Option<&[Label]>,
    ) -> FieldValues {
        let result = self
            .normalize(item)
            .and_then(|item| self.raw_field(&item, name, labels));

        match result {
            Ok(Some(value)) => FieldValues::values(self.expand(value)),
            Ok(None) => FieldValues::empty(),
            Err(e) => FieldValues::error(e),
        }
    }

    /// Values of field `name` from the nearest ancestor that has any.
    ///
    /// Ancestors are tried nearest first, the root last, up to `max_distance`
    /// levels (default: the configured parent distance). Values from two
    /// different levels are never combined.
    pub fn parent_fields(
        &mut self,
        item: impl AsRef<Path>,
        name: &str,
        labels: Option<&[Label]>,
        max_distance: Option<usize>,
    ) -> ParentFields<'_, 'c> {
        let max_distance = max_distance.or(self.options.max_parent_distance);
        let mut fields = ParentFields {
            name: name.to_string(),
            labels: labels.map(<[Label]>::to_vec),
            ancestors: Vec::new().into_iter(),
            current: None,
            pending_error: None,
            done: false,
            resolver: self,
        };

        match fields.resolver.normalize(item) {
            Ok(item) if fields.resolver.admits(&item, labels) => {
                let mut ancestors = fields.resolver.cache.library().ancestors(&item);
                if let Some(max) = max_distance {
                    ancestors.truncate(max);
                }
                debug!(item = %item, ancestors = ancestors.len(), field = name, "searching parents");
                fields.ancestors = ancestors.into_iter();
            }
            Ok(_) => fields.done = true,
            Err(e) => fields.pending_error = Some(e),
        }

        fields
    }

    /// Values of field `name` from the item's descendants, in pre-order.
    ///
    /// Children are visited in item order. A child that yields values is not
    /// descended into; one that yields nothing is, if it is a directory and
    /// the depth budget `max_distance` (default: the configured child
    /// distance) allows. Each subtree spends its own budget.
    pub fn child_fields(
        &mut self,
        item: impl AsRef<Path>,
        name: &str,
        labels: Option<&[Label]>,
        max_distance: Option<usize>,
    ) -> ChildFields<'_, 'c> {
        let max_distance = max_distance.or(self.options.max_child_distance);
        let mut fields = ChildFields {
            name: name.to_string(),
            labels: labels.map(<[Label]>::to_vec),
            stack: Vec::new(),
            current: None,
            pending_error: None,
            done: false,
            resolver: self,
        };

        match fields.resolver.normalize(item) {
            Ok(item) if fields.resolver.admits(&item, labels) => {
                debug!(item = %item, field = name, "searching children");
                if let Err(e) = fields.descend(&item, max_distance) {
                    fields.pending_error = Some(e);
                }
            }
            Ok(_) => fields.done = true,
            Err(e) => fields.pending_error = Some(e),
        }

        fields
    }

    fn normalize(&self, item: impl AsRef<Path>) -> Result<RelPath, QueryError> {
        let (item, _) = self.cache.library().normalize(item)?;
        Ok(item)
    }

    /// Whether `item` passes the label gate.
    fn admits(&self, item: &RelPath, labels: Option<&[Label]>) -> bool {
        let (Some(labels), Some(extract)) = (labels, &self.options.label_extractor) else {
            return true;
        };

        let label = extract(item);
        let admitted = labels.contains(&label);
        if !admitted {
            info!(item = %item, label = %label, "item did not match any expected labels, skipping");
        }
        admitted
    }

    /// The raw value of `name` for `item`, from the first source that has it.
    fn raw_field(
        &mut self,
        item: &RelPath,
        name: &str,
        labels: Option<&[Label]>,
    ) -> Result<Option<MetaValue>, QueryError> {
        if !self.admits(item, labels) {
            return Ok(None);
        }

        let meta_files = self.cache.ensure_for_item(item.as_path(), false)?;
        for meta_file in &meta_files {
            let record = self.cache.lookup(meta_file.as_path())?;
            let Some(block) = record.get(item) else {
                debug!(item = %item, meta_file = %meta_file, "item not described by meta file");
                continue;
            };

            if let Some(value) = block.get(name) {
                debug!(item = %item, field = name, meta_file = %meta_file, "found field");
                return Ok(Some(value.clone()));
            }
            debug!(
                item = %item,
                field = name,
                meta_file = %meta_file,
                "field not in meta file, trying next meta file"
            );
        }

        Ok(None)
    }

    fn expand(&self, value: MetaValue) -> Flattened {
        let limit = self.options.flatten_limit.map(|l| l.max(1));
        flatten(value, limit, self.options.mapping_iter_style)
    }
}

/// Iterator returned by [`Resolver::field`].
#[derive(Debug)]
pub struct FieldValues {
    values: Option<Flattened>,
    error: Option<QueryError>,
}

impl FieldValues {
    fn values(values: Flattened) -> Self {
        Self {
            values: Some(values),
            error: None,
        }
    }

    fn empty() -> Self {
        Self {
            values: None,
            error: None,
        }
    }

    fn error(error: QueryError) -> Self {
        Self {
            values: None,
            error: Some(error),
        }
    }
}

impl Iterator for FieldValues {
    type Item = Result<MetaValue, QueryError>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(e) = self.error.take() {
            return Some(Err(e));
        }
        self.values.as_mut()?.next().map(Ok)
    }
}

/// Iterator returned by [`Resolver::parent_fields`].
pub struct ParentFields<'r, 'c> {
    resolver: &'r mut Resolver<'c>,
    name: String,
    labels: Option<Vec<Label>>,
    ancestors: vec::IntoIter<RelPath>,
    /// Values of the ancestor being drained.
    current: Option<Flattened>,
    pending_error: Option<QueryError>,
    done: bool,
}

impl Iterator for ParentFields<'_, '_> {
    type Item = Result<MetaValue, QueryError>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(e) = self.pending_error.take() {
            self.done = true;
            return Some(Err(e));
        }

        loop {
            if self.done {
                return None;
            }

            if let Some(current) = self.current.as_mut() {
                // Once one level has produced values, it is the only level.
                let value = current.next();
                if value.is_none() {
                    self.done = true;
                }
                return value.map(Ok);
            }

            let Some(ancestor) = self.ancestors.next() else {
                self.done = true;
                return None;
            };

            match self
                .resolver
                .raw_field(&ancestor, &self.name, self.labels.as_deref())
            {
                Ok(Some(value)) => {
                    let mut values = self.resolver.expand(value);
                    // An empty composite produces nothing; keep climbing.
                    if let Some(first) = values.next() {
                        debug!(ancestor = %ancestor, field = %self.name, "found field in ancestor");
                        self.current = Some(values);
                        return Some(Ok(first));
                    }
                }
                Ok(None) => {}
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            }
        }
    }
}

/// One directory level of the child walk.
struct Frame {
    children: vec::IntoIter<RelPath>,
    /// Budget this level was entered with; never `Some(0)`.
    budget: Option<usize>,
}

/// Iterator returned by [`Resolver::child_fields`].
pub struct ChildFields<'r, 'c> {
    resolver: &'r mut Resolver<'c>,
    name: String,
    labels: Option<Vec<Label>>,
    stack: Vec<Frame>,
    /// Values of the child being drained.
    current: Option<Flattened>,
    pending_error: Option<QueryError>,
    done: bool,
}

impl ChildFields<'_, '_> {
    /// Push the children of `dir` if it is a directory and `budget` allows.
    fn descend(&mut self, dir: &RelPath, budget: Option<usize>) -> Result<(), QueryError> {
        if budget == Some(0) {
            return Ok(());
        }

        let library = self.resolver.cache.library();
        if !library.abs_path(dir).is_dir() {
            return Ok(());
        }

        let children = library.sorted_items_in(dir)?;
        self.stack.push(Frame {
            children: children.into_iter(),
            budget,
        });
        Ok(())
    }
}

impl Iterator for ChildFields<'_, '_> {
    type Item = Result<MetaValue, QueryError>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(e) = self.pending_error.take() {
            self.done = true;
            return Some(Err(e));
        }

        loop {
            if self.done {
                return None;
            }

            if let Some(current) = self.current.as_mut() {
                if let Some(value) = current.next() {
                    return Some(Ok(value));
                }
                self.current = None;
            }

            let Some(frame) = self.stack.last_mut() else {
                self.done = true;
                return None;
            };
            let budget = frame.budget;
            let Some(child) = frame.children.next() else {
                self.stack.pop();
                continue;
            };

            let found = match self
                .resolver
                .raw_field(&child, &self.name, self.labels.as_deref())
            {
                Ok(Some(value)) => {
                    let mut values = self.resolver.expand(value);
                    values.next().map(|first| (first, values))
                }
                Ok(None) => None,
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            };

            match found {
                Some((first, rest)) => {
                    debug!(child = %child, field = %self.name, "found field in child");
                    self.current = Some(rest);
                    return Some(Ok(first));
                }
                None => {
                    if let Err(e) = self.descend(&child, budget.map(|b| b - 1)) {
                        self.done = true;
                        return Some(Err(e));
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::paths::Library;
    use crate::engine::discovery::Discovery;
    use std::fs;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn cache_for(temp: &TempDir) -> MetaCache {
        let library = Library::builder(temp.path()).build().unwrap();
        MetaCache::new(Discovery::new(library))
    }

    fn strings<I>(values: I) -> Vec<String>
    where
        I: Iterator<Item = Result<MetaValue, QueryError>>,
    {
        values.map(|v| v.unwrap().to_string()).collect()
    }

    /// D/{A,B,C}.flac with item and self metadata.
    fn flat_dir() -> TempDir {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        for name in ["A", "B", "C"] {
            write(root, &format!("D/{name}.flac"), "");
        }
        write(root, "D/taggu_item.yml", "- {t: x}\n- {t: y}\n- {t: z, genre: Pop}\n");
        write(root, "D/taggu_self.yml", "genre: Rock\nt: self\n");
        temp
    }

    mod field {
        use super::*;

        #[test]
        fn positional_item_metadata() {
            let temp = flat_dir();
            let mut cache = cache_for(&temp);
            let mut resolver = Resolver::new(&mut cache, QueryOptions::default());

            assert_eq!(strings(resolver.field("D/B.flac", "t", None)), vec!["y"]);
        }

        #[test]
        fn self_metadata() {
            let temp = flat_dir();
            let mut cache = cache_for(&temp);
            let mut resolver = Resolver::new(&mut cache, QueryOptions::default());

            assert_eq!(strings(resolver.field("D", "genre", None)), vec!["Rock"]);
        }

        #[test]
        fn missing_field_is_empty() {
            let temp = flat_dir();
            let mut cache = cache_for(&temp);
            let mut resolver = Resolver::new(&mut cache, QueryOptions::default());

            assert!(strings(resolver.field("D/A.flac", "nope", None)).is_empty());
            assert!(strings(resolver.field("D/missing.flac", "t", None)).is_empty());
        }

        #[test]
        fn first_source_with_field_wins() {
            let temp = TempDir::new().unwrap();
            write(temp.path(), "D/taggu_self.yml", "genre: Rock\n");
            write(temp.path(), "taggu_item.yml", "D: {genre: Jazz, year: '1999'}\n");
            let mut cache = cache_for(&temp);
            let mut resolver = Resolver::new(&mut cache, QueryOptions::default());

            assert_eq!(strings(resolver.field("D", "genre", None)), vec!["Rock"]);
            // Field absent from the self block falls through to the item block.
            assert_eq!(strings(resolver.field("D", "year", None)), vec!["1999"]);
        }

        #[test]
        fn null_and_sequence_values() {
            let temp = TempDir::new().unwrap();
            write(temp.path(), "D/A.flac", "");
            write(
                temp.path(),
                "D/taggu_item.yml",
                "- {rating: ~, artists: [X, Y], credits: {mix: M, master: N}}\n",
            );
            let mut cache = cache_for(&temp);
            let mut resolver = Resolver::new(&mut cache, QueryOptions::default());

            let rating: Vec<MetaValue> = resolver
                .field("D/A.flac", "rating", None)
                .collect::<Result<_, _>>()
                .unwrap();
            assert_eq!(rating, vec![MetaValue::Null]);
            assert_eq!(strings(resolver.field("D/A.flac", "artists", None)), vec!["X", "Y"]);
            assert_eq!(
                strings(resolver.field("D/A.flac", "credits", None)),
                vec!["mix", "master"]
            );
        }

        #[test]
        fn zero_flatten_limit_still_expands_one_level() {
            let temp = TempDir::new().unwrap();
            write(temp.path(), "D/A.flac", "");
            write(temp.path(), "D/taggu_item.yml", "- {artists: [X, [Y, Z]]}\n");
            let mut cache = cache_for(&temp);
            let options = QueryOptions {
                flatten_limit: Some(0),
                ..QueryOptions::default()
            };
            let mut resolver = Resolver::new(&mut cache, options);

            assert_eq!(
                strings(resolver.field("D/A.flac", "artists", None)),
                vec!["X", r#"["Y","Z"]"#]
            );
        }

        #[test]
        fn unbounded_flatten_and_pairs() {
            let temp = TempDir::new().unwrap();
            write(temp.path(), "D/A.flac", "");
            write(temp.path(), "D/taggu_item.yml", "- {credits: {mix: [M1, M2]}}\n");
            let mut cache = cache_for(&temp);
            let options = QueryOptions {
                flatten_limit: None,
                mapping_iter_style: MappingIterStyle::Pairs,
                ..QueryOptions::default()
            };
            let mut resolver = Resolver::new(&mut cache, options);

            assert_eq!(
                strings(resolver.field("D/A.flac", "credits", None)),
                vec!["mix", "M1", "M2"]
            );
        }

        #[test]
        fn escaping_item_yields_error_once() {
            let temp = flat_dir();
            let mut cache = cache_for(&temp);
            let mut resolver = Resolver::new(&mut cache, QueryOptions::default());

            let mut values = resolver.field("../D", "t", None);
            assert!(matches!(
                values.next(),
                Some(Err(QueryError::Path(PathError::EscapingSubpath(_))))
            ));
            assert!(values.next().is_none());
        }

        #[test]
        fn parses_each_file_once_across_queries() {
            let temp = flat_dir();
            let mut cache = cache_for(&temp);
            {
                let mut resolver = Resolver::new(&mut cache, QueryOptions::default());
                for item in ["D/A.flac", "D/B.flac", "D/C.flac"] {
                    assert_eq!(strings(resolver.field(item, "t", None)).len(), 1);
                }
            }
            assert_eq!(cache.stats().parses, 1);
        }
    }

    mod labels {
        use super::*;

        #[test]
        fn excluded_label_yields_nothing() {
            let temp = flat_dir();
            let mut cache = cache_for(&temp);
            let mut resolver = Resolver::new(&mut cache, QueryOptions::default());
            let unused = [Label::new("UNUSED")];

            assert!(strings(resolver.field("D/B.flac", "t", Some(&unused))).is_empty());
            assert!(strings(resolver.parent_fields("D/B.flac", "genre", Some(&unused), None)).is_empty());
            assert!(strings(resolver.child_fields("D", "t", Some(&unused), None)).is_empty());
        }

        #[test]
        fn matching_label_resolves() {
            let temp = flat_dir();
            let mut cache = cache_for(&temp);
            let mut resolver = Resolver::new(&mut cache, QueryOptions::default());
            let labels = [Label::new("B")];

            assert_eq!(strings(resolver.field("D/B.flac", "t", Some(&labels))), vec!["y"]);
            assert!(strings(resolver.field("D/A.flac", "t", Some(&labels))).is_empty());
        }

        #[test]
        fn no_extractor_ignores_labels() {
            let temp = flat_dir();
            let mut cache = cache_for(&temp);
            let options = QueryOptions {
                label_extractor: None,
                ..QueryOptions::default()
            };
            let mut resolver = Resolver::new(&mut cache, options);
            let unused = [Label::new("UNUSED")];

            assert_eq!(strings(resolver.field("D/B.flac", "t", Some(&unused))), vec!["y"]);
        }

        #[test]
        fn children_filtered_individually() {
            let temp = flat_dir();
            let mut cache = cache_for(&temp);
            let mut resolver = Resolver::new(&mut cache, QueryOptions::default());
            let labels = [Label::new("D"), Label::new("A"), Label::new("C")];

            assert_eq!(
                strings(resolver.child_fields("D", "t", Some(&labels), None)),
                vec!["x", "z"]
            );
        }
    }

    mod parents {
        use super::*;

        /// ROOT self: genre Metal. ALBUM self: genre Rock. ALBUM/DISC/TRACK.flac
        fn tree() -> TempDir {
            let temp = TempDir::new().unwrap();
            let root = temp.path();
            write(root, "taggu_self.yml", "genre: Metal\nlabel: Acme\n");
            write(root, "ALBUM/taggu_self.yml", "genre: [Rock, Blues]\n");
            write(root, "ALBUM/DISC/TRACK.flac", "");
            write(root, "ALBUM/DISC/taggu_item.yml", "- {title: T}\n");
            temp
        }

        #[test]
        fn nearest_level_only() {
            let temp = tree();
            let mut cache = cache_for(&temp);
            let mut resolver = Resolver::new(&mut cache, QueryOptions::default());

            assert_eq!(
                strings(resolver.parent_fields("ALBUM/DISC/TRACK.flac", "genre", None, None)),
                vec!["Rock", "Blues"]
            );
        }

        #[test]
        fn falls_back_to_root() {
            let temp = tree();
            let mut cache = cache_for(&temp);
            let mut resolver = Resolver::new(&mut cache, QueryOptions::default());

            assert_eq!(
                strings(resolver.parent_fields("ALBUM/DISC/TRACK.flac", "label", None, None)),
                vec!["Acme"]
            );
        }

        #[test]
        fn distance_caps_search() {
            let temp = tree();
            let mut cache = cache_for(&temp);
            let mut resolver = Resolver::new(&mut cache, QueryOptions::default());

            let track = "ALBUM/DISC/TRACK.flac";
            assert!(strings(resolver.parent_fields(track, "genre", None, Some(1))).is_empty());
            assert_eq!(
                strings(resolver.parent_fields(track, "genre", None, Some(2))),
                vec!["Rock", "Blues"]
            );
            assert!(strings(resolver.parent_fields(track, "label", None, Some(2))).is_empty());
            assert!(strings(resolver.parent_fields(track, "genre", None, Some(0))).is_empty());
        }

        #[test]
        fn configured_distance_is_default() {
            let temp = tree();
            let mut cache = cache_for(&temp);
            let options = QueryOptions {
                max_parent_distance: Some(1),
                ..QueryOptions::default()
            };
            let mut resolver = Resolver::new(&mut cache, options);

            let track = "ALBUM/DISC/TRACK.flac";
            assert!(strings(resolver.parent_fields(track, "genre", None, None)).is_empty());
            assert_eq!(
                strings(resolver.parent_fields(track, "genre", None, Some(3))),
                vec!["Rock", "Blues"]
            );
        }

        #[test]
        fn root_has_no_parents() {
            let temp = tree();
            let mut cache = cache_for(&temp);
            let mut resolver = Resolver::new(&mut cache, QueryOptions::default());

            assert!(strings(resolver.parent_fields(".", "genre", None, None)).is_empty());
        }

        #[test]
        fn stops_parsing_when_consumer_stops() {
            let temp = tree();
            let mut cache = cache_for(&temp);
            {
                let mut resolver = Resolver::new(&mut cache, QueryOptions::default());
                let first = resolver
                    .parent_fields("ALBUM/DISC/TRACK.flac", "genre", None, None)
                    .next();
                assert!(first.is_some());
            }
            // The root self file was never reached.
            assert!(!cache.contains("taggu_self.yml"));
        }
    }

    mod children {
        use super::*;

        /// ALBUM/
        ///   DISC_01/ (self: artist Solo) TRACK_01, TRACK_02 (item: artist per track)
        ///   DISC_02/ TRACK_01 (no artist), SUB/TRACK_09 (item: artist Deep)
        fn tree() -> TempDir {
            let temp = TempDir::new().unwrap();
            let root = temp.path();
            write(root, "ALBUM/DISC_01/taggu_self.yml", "artist: Solo\n");
            write(root, "ALBUM/DISC_01/TRACK_01.flac", "");
            write(root, "ALBUM/DISC_01/TRACK_02.flac", "");
            write(
                root,
                "ALBUM/DISC_01/taggu_item.yml",
                "- {artist: First}\n- {artist: Second}\n",
            );
            write(root, "ALBUM/DISC_02/TRACK_01.flac", "");
            write(root, "ALBUM/DISC_02/taggu_item.yml", "TRACK_01: {title: T}\n");
            write(root, "ALBUM/DISC_02/SUB/TRACK_09.flac", "");
            write(root, "ALBUM/DISC_02/SUB/taggu_item.yml", "- {artist: Deep}\n");
            temp
        }

        #[test]
        fn found_children_are_not_descended() {
            let temp = tree();
            let mut cache = cache_for(&temp);
            let mut resolver = Resolver::new(&mut cache, QueryOptions::default());

            assert_eq!(
                strings(resolver.child_fields("ALBUM", "artist", None, None)),
                vec!["Solo", "Deep"]
            );
        }

        #[test]
        fn pre_order_within_directory() {
            let temp = tree();
            let mut cache = cache_for(&temp);
            let mut resolver = Resolver::new(&mut cache, QueryOptions::default());

            assert_eq!(
                strings(resolver.child_fields("ALBUM/DISC_01", "artist", None, None)),
                vec!["First", "Second"]
            );
        }

        #[test]
        fn depth_budget_per_subtree() {
            let temp = tree();
            let mut cache = cache_for(&temp);
            let mut resolver = Resolver::new(&mut cache, QueryOptions::default());

            assert_eq!(
                strings(resolver.child_fields("ALBUM", "artist", None, Some(1))),
                vec!["Solo"]
            );
            assert_eq!(
                strings(resolver.child_fields("ALBUM", "artist", None, Some(2))),
                vec!["Solo"]
            );
            assert_eq!(
                strings(resolver.child_fields("ALBUM", "artist", None, Some(3))),
                vec!["Solo", "Deep"]
            );
            assert!(strings(resolver.child_fields("ALBUM", "artist", None, Some(0))).is_empty());
        }

        #[test]
        fn file_has_no_children() {
            let temp = tree();
            let mut cache = cache_for(&temp);
            let mut resolver = Resolver::new(&mut cache, QueryOptions::default());

            assert!(strings(resolver.child_fields(
                "ALBUM/DISC_01/TRACK_01.flac",
                "artist",
                None,
                None
            ))
            .is_empty());
        }
    }
}
