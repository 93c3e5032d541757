//! Environment filter parser
//!
//! # Grammar
//!
//! ```text
//! filter := "all" | name ("," name)*
//! ```
//!
//! Names are trimmed; empty entries are dropped. A filter that names no
//! environment at all matches everything, like `all`.

use std::collections::BTreeSet;
use crate::filter::evaluator::EnvironmentFilter;

/// Parse a filter string such as `all` or `SIT,UAT`
pub fn parse_filter(spec: &str) -> EnvironmentFilter {
    let spec = spec.trim();
    if spec.eq_ignore_ascii_case("all") {
        return EnvironmentFilter::All;
    }
    parse_filter_names(spec.split(','))
}

/// Build a filter from separate names (e.g. repeated `--env` flags)
pub fn parse_filter_names<'a, I>(names: I) -> EnvironmentFilter
where
    I: IntoIterator<Item = &'a str>,
{
    let names: BTreeSet<String> = names
        .into_iter()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect();

    if names.is_empty() || names.iter().any(|name| name.eq_ignore_ascii_case("all")) {
        EnvironmentFilter::All
    } else {
        EnvironmentFilter::Only(names)
    }
}
