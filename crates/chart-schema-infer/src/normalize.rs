//! Canonical form of matched value paths

use once_cell::sync::Lazy;
use regex::Regex;

static ARRAY_INDEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[\d+\]").unwrap());

/// Punctuation that may trail a path when it ends a sentence or expression
const TRAILING_PUNCTUATION: &[char] = &['.', ',', ';', ':', '!', '?'];

/// Normalize a raw path: trim trailing punctuation and collapse numeric array
/// indices to the generic `[]` marker
///
/// `items[3].name` becomes `items[].name`. Normalization is idempotent.
pub fn normalize_path(path: &str) -> String {
    let trimmed = path.trim_end_matches(TRAILING_PUNCTUATION);
    ARRAY_INDEX.replace_all(trimmed, "[]").into_owned()
}

/// Every proper, non-empty dotted prefix of `path`, shortest first
///
/// `a.b.c` yields `a` then `a.b`.
pub(crate) fn proper_prefixes(path: &str) -> impl Iterator<Item = &str> {
    path.match_indices('.')
        .map(move |(idx, _)| &path[..idx])
        .filter(|prefix| !prefix.is_empty())
}
