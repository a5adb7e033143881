//! engine
//!
//! Metadata discovery, caching, and field resolution.
//!
//! # Architecture
//!
//! The engine is layered leaf-first on top of [`crate::core::paths`]:
//!
//! 1. **Discovery**: Map items to candidate metadata files, and metadata files
//!    to the `(item, block)` pairs they yield
//! 2. **Cache**: Memoize each metadata file's pairs until explicitly invalidated
//! 3. **Resolve**: Answer field queries for an item, its ancestors, or its descendants
//!
//! # Invariants
//!
//! - Every path crossing an engine boundary has been normalized by the [`Library`]
//! - A metadata file is parsed at most once until it is invalidated or forced
//! - Resolution holds no state between calls beyond the cache it is given
//!
//! # Example
//!
//! ```no_run
//! use taggu::core::paths::Library;
//! use taggu::engine::{Discovery, MetaCache, QueryOptions, Resolver};
//!
//! let library = Library::builder("/music").build()?;
//! let mut cache = MetaCache::new(Discovery::new(library));
//! let mut resolver = Resolver::new(&mut cache, QueryOptions::default());
//!
//! let titles: Vec<_> = resolver
//!     .field("ALBUM_01/TRACK_01.flac", "title", None)
//!     .collect::<Result<_, _>>()?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! [`Library`]: crate::core::paths::Library

pub mod cache;
pub mod discovery;
pub mod flatten;
pub mod resolve;

// Re-exports for convenience
pub use cache::{CacheError, CacheStats, Invalidate, MetaCache};
pub use discovery::{Discovery, DiscoveryError, MetaSource};
pub use flatten::{flatten, Flattened};
pub use resolve::{
    default_label_extractor, ChildFields, FieldValues, LabelExtractor, ParentFields, QueryError,
    QueryOptions, Resolver,
};
