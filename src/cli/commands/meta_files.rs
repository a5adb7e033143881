//! meta-files command - List the metadata files for an item

use std::path::Path;

use anyhow::{Context as _, Result};

use crate::cli::Context;
use crate::ui::output;

/// Print the existing metadata files for `item`, highest priority first.
pub fn meta_files(ctx: &Context, item: &Path) -> Result<()> {
    let cache = ctx.cache()?;
    let files = cache
        .discovery()
        .meta_files_for(item)
        .with_context(|| format!("failed to find meta files for '{}'", item.display()))?;

    if ctx.json {
        output::json(&files)?;
        return Ok(());
    }

    if files.is_empty() {
        output::print(
            format!("No metadata files describe '{}'", item.display()),
            ctx.verbosity,
        );
    } else {
        println!("{}", output::format_list(&files, ""));
    }

    Ok(())
}
