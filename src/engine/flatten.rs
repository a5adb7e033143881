//! engine::flatten
//!
//! Expansion of composite field values into a flat value sequence.
//!
//! Each level of expansion replaces a sequence by its elements and a mapping
//! by its keys, values, or `[key, value]` pairs depending on the
//! [`MappingIterStyle`]. A limit of `Some(0)` yields the value unchanged;
//! `None` expands until only scalars remain. Scalars are never expanded.
//!
//! ```
//! use taggu::core::metadata::MetaValue;
//! use taggu::core::types::MappingIterStyle;
//! use taggu::engine::flatten::flatten;
//!
//! let value = MetaValue::Sequence(vec![
//!     "a".into(),
//!     MetaValue::Sequence(vec!["b".into(), "c".into()]),
//! ]);
//!
//! let one: Vec<_> = flatten(value.clone(), Some(1), MappingIterStyle::Keys).collect();
//! assert_eq!(one.len(), 2);
//!
//! let all: Vec<_> = flatten(value, None, MappingIterStyle::Keys).collect();
//! assert_eq!(
//!     all,
//!     vec![MetaValue::string("a"), MetaValue::string("b"), MetaValue::string("c")]
//! );
//! ```

use crate::core::metadata::MetaValue;
use crate::core::types::MappingIterStyle;

/// Lazily flatten `value` up to `limit` levels.
pub fn flatten(value: MetaValue, limit: Option<usize>, style: MappingIterStyle) -> Flattened {
    Flattened {
        stack: vec![(value, limit)],
        style,
    }
}

/// Iterator returned by [`flatten`]. Yields values in pre-order.
#[derive(Debug, Clone)]
pub struct Flattened {
    /// Pending values with their remaining expansion budget, next on top.
    stack: Vec<(MetaValue, Option<usize>)>,
    style: MappingIterStyle,
}

impl Flattened {
    fn push_children(&mut self, children: Vec<MetaValue>, limit: Option<usize>) {
        let remaining = limit.map(|l| l - 1);
        self.stack
            .extend(children.into_iter().rev().map(|child| (child, remaining)));
    }
}

impl Iterator for Flattened {
    type Item = MetaValue;

    fn next(&mut self) -> Option<MetaValue> {
        loop {
            let (value, limit) = self.stack.pop()?;

            if limit == Some(0) {
                return Some(value);
            }

            match value {
                MetaValue::Sequence(items) => self.push_children(items, limit),
                MetaValue::Mapping(map) => {
                    let children = match self.style {
                        MappingIterStyle::Keys => map.into_keys().map(MetaValue::String).collect(),
                        MappingIterStyle::Values => map.into_values().collect(),
                        MappingIterStyle::Pairs => map
                            .into_iter()
                            .map(|(k, v)| MetaValue::Sequence(vec![MetaValue::String(k), v]))
                            .collect(),
                    };
                    self.push_children(children, limit);
                }
                scalar => return Some(scalar),
            }
        }
    }
}
