//! Filter option construction.
//!
//! Pure functions, no I/O: column maps become dropdown options, raw aggregate
//! value lists become bounded candidate lists.

use super::types::{FilterOption, OrderedMap};
use crate::sql;

/// How distinct values are turned into SQL literals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LiteralQuoting {
    /// `'value'` as-is. Embedded quotes are not escaped.
    #[default]
    Raw,
    /// `'value'` with embedded quotes doubled.
    Escaped,
}

impl LiteralQuoting {
    pub fn quote(&self, value: &str) -> String {
        match self {
            LiteralQuoting::Raw => sql::quote_literal(value),
            LiteralQuoting::Escaped => sql::quote_literal_escaped(value),
        }
    }
}

/// Human-readable label for a column: `lane_mark_width` -> `Lane Mark Width`.
///
/// Underscores become spaces. A letter is upper-cased when it starts a run of
/// letters and lower-cased otherwise, so `lane_0_width` -> `Lane 0 Width` and
/// `v2x_state` -> `V2X State`. Other separators are left in place.
pub fn column_label(column: &str) -> String {
    let mut label = String::with_capacity(column.len());
    let mut in_word = false;
    for ch in column.chars() {
        if ch == '_' {
            label.push(' ');
            in_word = false;
        } else if ch.is_alphabetic() {
            if in_word {
                label.extend(ch.to_lowercase());
            } else {
                label.extend(ch.to_uppercase());
            }
            in_word = true;
        } else {
            label.push(ch);
            in_word = false;
        }
    }
    label
}

/// One option per column, in map order. The value is the raw column name.
pub fn build_filter_options<V>(columns: &OrderedMap<V>) -> Vec<FilterOption> {
    columns
        .keys()
        .map(|name| FilterOption::new(column_label(name), name))
        .collect()
}

/// Candidate values for one string column.
///
/// Each raw value is trimmed, the list is cut to the first `max_values`
/// entries, and every entry becomes `{label: trimmed, value: quoted}`.
pub fn distinct_value_options<I, S>(
    raw: I,
    max_values: usize,
    quoting: LiteralQuoting,
) -> Vec<FilterOption>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    raw.into_iter()
        .take(max_values)
        .map(|value| {
            let trimmed = value.as_ref().trim();
            FilterOption::new(trimmed, quoting.quote(trimmed))
        })
        .collect()
}
