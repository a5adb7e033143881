//! describe command - Show what a metadata file assigns

use std::path::Path;

use anyhow::{Context as _, Result};
use serde::Serialize;

use crate::cli::Context;
use crate::core::metadata::{MetaValue, MetadataBlock};
use crate::core::paths::RelPath;
use crate::ui::output;

#[derive(Serialize)]
struct DescribedItem<'a> {
    item: &'a RelPath,
    metadata: &'a MetadataBlock,
}

/// Print every item `meta_file` describes, with its block.
pub fn describe(ctx: &Context, meta_file: &Path) -> Result<()> {
    let cache = ctx.cache()?;
    let pairs = cache
        .discovery()
        .items_described_by(meta_file)
        .with_context(|| format!("failed to read '{}'", meta_file.display()))?;

    if ctx.json {
        let described: Vec<_> = pairs
            .iter()
            .map(|(item, metadata)| DescribedItem { item, metadata })
            .collect();
        output::json(&described)?;
        return Ok(());
    }

    if pairs.is_empty() {
        output::print(
            format!("'{}' describes no items", meta_file.display()),
            ctx.verbosity,
        );
        return Ok(());
    }

    for (item, block) in &pairs {
        println!("{}", item);
        if block.is_empty() {
            println!("  (no fields)");
        }
        for (name, value) in block {
            println!("  {}: {}", name, display_value(value));
        }
    }

    Ok(())
}

fn display_value(value: &MetaValue) -> String {
    match value {
        MetaValue::Sequence(items) => {
            let items: Vec<String> = items.iter().map(display_value).collect();
            format!("[{}]", items.join(", "))
        }
        MetaValue::Mapping(map) => {
            let entries: Vec<String> = map
                .iter()
                .map(|(k, v)| format!("{}: {}", k, display_value(v)))
                .collect();
            format!("{{{}}}", entries.join(", "))
        }
        scalar => scalar.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;

    #[test]
    fn nested_values_render_inline() {
        let mut map = IndexMap::new();
        map.insert("name".to_string(), MetaValue::string("Opeth"));
        map.insert(
            "roles".to_string(),
            MetaValue::Sequence(vec![MetaValue::string("guitar"), MetaValue::Null]),
        );

        assert_eq!(
            display_value(&MetaValue::Mapping(map)),
            "{name: Opeth, roles: [guitar, ~]}"
        );
        assert_eq!(display_value(&MetaValue::Mapping(IndexMap::new())), "{}");
    }
}
