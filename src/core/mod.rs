//! core
//!
//! Core domain types, schemas, and path handling for taggu.
//!
//! # Modules
//!
//! - [`types`] - Strong types: MetaFileName, Label, MetaRole, etc.
//! - [`paths`] - Path authority: normalization, listing, fuzzy lookup
//! - [`metadata`] - Metadata value model and YAML loading
//! - [`config`] - Configuration schema and loading
//!
//! # Design Principles
//!
//! - Strong typing prevents invalid states at compile time
//! - Every path is anchored to the library root before use
//! - Metadata scalars are never reinterpreted

pub mod config;
pub mod metadata;
pub mod paths;
pub mod types;
