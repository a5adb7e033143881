//! Taggu - Hierarchical sidecar-YAML metadata for file-tree media libraries
//!
//! A library is a directory tree of media items. Metadata lives next to the
//! items in small YAML files: a self metadata file inside a directory
//! describes that directory, and an item metadata file describes the items
//! that sit beside it. Taggu finds those files, caches what they say, and
//! answers field queries against an item, its ancestors, or its descendants.
//!
//! # Architecture
//!
//! The codebase follows a strict layered architecture:
//!
//! - [`cli`] - Command-line interface layer (parses args, delegates to engine)
//! - [`engine`] - Discovery, caching, flattening, and field resolution
//! - [`core`] - Domain types, path handling, YAML schema, configuration
//! - [`ui`] - User-facing output
//!
//! # Example
//!
//! ```no_run
//! use taggu::core::paths::Library;
//! use taggu::engine::{Discovery, MetaCache, QueryOptions, Resolver};
//!
//! # fn main() -> anyhow::Result<()> {
//! let library = Library::builder("/music").build()?;
//! let mut cache = MetaCache::new(Discovery::new(library));
//! let mut resolver = Resolver::new(&mut cache, QueryOptions::default());
//!
//! for genre in resolver.parent_fields("ALBUM_01/TRACK_01.flac", "genre", None, None) {
//!     println!("{}", genre?);
//! }
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod core;
pub mod engine;
pub mod ui;
