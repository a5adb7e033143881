//! field command - Resolve a metadata field for an item

use std::path::Path;

use anyhow::{Context as _, Result};

use crate::cli::Context;
use crate::core::metadata::MetaValue;
use crate::core::types::Label;
use crate::engine::{QueryError, Resolver};
use crate::ui::output;

/// Where a field value may come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    /// The item's own metadata.
    Direct,
    /// The nearest ancestor that has the field.
    Parents,
    /// Every descendant that has the field.
    Children,
}

/// Resolve and print a field.
pub fn field(
    ctx: &Context,
    item: &Path,
    name: &str,
    lookup: Lookup,
    labels: &[String],
    max_distance: Option<usize>,
) -> Result<()> {
    let mut cache = ctx.cache()?;
    let mut resolver = Resolver::new(&mut cache, ctx.query_options());

    let labels: Vec<Label> = labels.iter().map(|l| Label::new(l.as_str())).collect();
    let labels = (!labels.is_empty()).then_some(labels.as_slice());

    if lookup == Lookup::Direct && max_distance.is_some() {
        output::warn(
            "--max-distance only applies with --parents or --children, ignoring",
            ctx.verbosity,
        );
    }

    let values: Result<Vec<MetaValue>, QueryError> = match lookup {
        Lookup::Direct => resolver.field(item, name, labels).collect(),
        Lookup::Parents => resolver
            .parent_fields(item, name, labels, max_distance)
            .collect(),
        Lookup::Children => resolver
            .child_fields(item, name, labels, max_distance)
            .collect(),
    };
    let values = values
        .with_context(|| format!("failed to resolve '{}' for '{}'", name, item.display()))?;

    output::debug(
        format!("{} value(s) for '{}'", values.len(), name),
        ctx.verbosity,
    );

    if ctx.json {
        output::json(&values)?;
    } else {
        output::values(&values);
    }

    Ok(())
}
