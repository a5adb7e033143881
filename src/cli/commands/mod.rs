//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each command handler:
//! 1. Validates command-specific arguments
//! 2. Calls the engine to answer the query
//! 3. Formats and displays output (plain text, or JSON with `--json`)
//!
//! Handlers never write to the library.

mod completion;
mod describe;
mod field;
mod meta_files;

// Re-export command functions for testing and direct invocation
pub use completion::completion;
pub use describe::describe;
pub use field::{field, Lookup};
pub use meta_files::meta_files;

use super::args::Command;
use super::Context;
use anyhow::Result;

/// Dispatch a parsed command to its handler.
pub fn dispatch(command: Command, ctx: &Context) -> Result<()> {
    match command {
        Command::Field {
            item,
            field: name,
            parents,
            children,
            labels,
            max_distance,
        } => {
            let lookup = if parents {
                Lookup::Parents
            } else if children {
                Lookup::Children
            } else {
                Lookup::Direct
            };
            field(ctx, &item, &name, lookup, &labels, max_distance)
        }
        Command::MetaFiles { item } => meta_files(ctx, &item),
        Command::Describe { meta_file } => describe(ctx, &meta_file),
        Command::Completion { shell } => completion(shell),
    }
}
