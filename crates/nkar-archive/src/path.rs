//! Entry-name path helpers.
//!
//! Entry names are forward-slash paths. Depth comparisons count a trailing
//! slash as one extra segment, so `lib/` (a directory marker) has the same
//! depth as `lib/timer.js`, and the child directory `lib/sub/` sits one
//! level below both.

/// Prefix marking a name resolved by suffix-plus-depth matching.
pub const WILDCARD_PREFIX: char = '*';

/// Count the segments of an entry path.
///
/// Empty components are ignored; a trailing `/` contributes one segment.
pub fn segment_count(path: &str) -> usize {
    let components = path.split('/').filter(|s| !s.is_empty()).count();
    if path.len() > 1 && path.ends_with('/') {
        components + 1
    } else {
        components
    }
}

/// The final non-empty segment of a path, ignoring a trailing `/`.
pub fn last_segment(path: &str) -> &str {
    path.trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default()
}

/// Ensure a folder name ends with `/`.
pub fn as_folder(name: &str) -> String {
    if name.ends_with('/') {
        name.to_string()
    } else {
        format!("{name}/")
    }
}

/// Split a `*suffix` wildcard into its suffix, or `None` for plain names.
pub fn wildcard_suffix(name: &str) -> Option<&str> {
    name.strip_prefix(WILDCARD_PREFIX)
}

/// Whether `candidate` satisfies a wildcard lookup for `suffix`:
/// a case-insensitive suffix match at exactly `depth` segments.
pub fn matches_wildcard(candidate: &str, suffix_lower: &str, depth: usize) -> bool {
    candidate.to_lowercase().ends_with(suffix_lower) && segment_count(candidate) == depth
}

/// Whether `candidate` is an immediate child directory of `folder_lower`
/// (which must already end with `/` and be lowercase).
pub fn is_child_folder(candidate: &str, folder_lower: &str, depth: usize) -> bool {
    candidate.ends_with('/')
        && segment_count(candidate) == depth
        && candidate.to_lowercase().starts_with(folder_lower)
}
