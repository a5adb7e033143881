//! core::metadata
//!
//! Metadata values and YAML loading.
//!
//! # Modules
//!
//! - [`schema`] - Value model: `MetaValue`, `MetadataBlock`, `MetaFileRecord`
//! - [`yaml`] - YAML loading restricted to string and null scalars
//!
//! # Example
//!
//! ```
//! use taggu::core::metadata::{parse_yaml, MetaValue};
//!
//! let value = parse_yaml("- {title: One}\n- {title: Two}").unwrap();
//! let blocks = value.as_sequence().unwrap();
//! assert_eq!(blocks[1].as_mapping().unwrap()["title"], MetaValue::string("Two"));
//! ```

pub mod schema;
pub mod yaml;

pub use schema::{MetaFileRecord, MetaValue, MetadataBlock};
pub use yaml::{parse_yaml, read_yaml_file, SchemaError};
