//! Canonicalization of slash-delimited configuration references.
//!
//! Every table in the crate is keyed by the canonical form of a reference:
//! its last `/`-delimited segment, lower-cased. All lookups go through
//! [`canonical_key`] so that builders and resolvers agree on the rule.

/// Last `/`-delimited segment of `reference`, or the whole string when it
/// has no separator.
pub fn last_segment(reference: &str) -> &str {
    reference.rsplit('/').next().unwrap_or(reference)
}

/// Second-to-last segment, `None` when `reference` has fewer than two
/// segments.
pub fn second_to_last_segment(reference: &str) -> Option<&str> {
    let mut parts = reference.rsplit('/');
    parts.next()?;
    parts.next()
}

/// Lookup key for a reference: last segment, lower-cased.
pub fn canonical_key(reference: &str) -> String {
    last_segment(reference).to_lowercase()
}

/// Lookup key built from an already extracted name.
pub fn canonical_name(name: &str) -> String {
    name.to_lowercase()
}

/// Suffix rule used by the system signal mapping: `key` matches when it
/// ends with the full `reference`, not just its last segment.
pub fn matches_suffix(key: &str, reference: &str) -> bool {
    !reference.is_empty() && key.ends_with(reference)
}

/// Case-insensitive path prefix test, used to check that a deployment
/// reference lives under its service interface.
pub fn is_under(reference: &str, parent: &str) -> bool {
    reference.to_lowercase().starts_with(&parent.to_lowercase())
}
