//! Deterministic key ordering for string-keyed mappings.

use indexmap::IndexMap;

/// Direction for keys outside the specified group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

/// Where the unspecified ("rest") keys land relative to the specified group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RestPlacement {
    Before,
    #[default]
    After,
}

/// Options for [`sort_keys`].
#[derive(Debug, Clone, Default)]
pub struct SortOptions {
    /// Keys emitted in exactly this order. Keys not present in the input are
    /// skipped, never inserted.
    pub specify_keys: Vec<String>,
    /// Direction for the rest keys.
    pub rest_order: SortOrder,
    /// Placement of the rest group.
    pub rest_placement: RestPlacement,
}

impl SortOptions {
    /// Options that pin the listed keys first and sort the rest ascending
    /// after them.
    pub fn with_specified<S: Into<String>>(keys: impl IntoIterator<Item = S>) -> Self {
        Self {
            specify_keys: keys.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }
}

/// Return a mapping with the same entries, reordered: specified keys first in
/// their listed order (or last, per `rest_placement`), all other keys sorted
/// among themselves.
///
/// The input is never mutated, and the function is idempotent: re-sorting an
/// already-sorted mapping with the same options yields the same key order.
pub fn sort_keys<V: Clone>(mapping: &IndexMap<String, V>, options: &SortOptions) -> IndexMap<String, V> {
    let (mut specified, mut rest): (Vec<(&String, &V)>, Vec<(&String, &V)>) = mapping
        .iter()
        .partition(|(key, _)| options.specify_keys.contains(*key));

    specified.sort_by_key(|(key, _)| {
        options
            .specify_keys
            .iter()
            .position(|specified_key| specified_key == *key)
    });
    rest.sort_by(|(a, _), (b, _)| match options.rest_order {
        SortOrder::Ascending => a.cmp(b),
        SortOrder::Descending => b.cmp(a),
    });

    let (first, second) = match options.rest_placement {
        RestPlacement::Before => (rest, specified),
        RestPlacement::After => (specified, rest),
    };
    first
        .into_iter()
        .chain(second)
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}
