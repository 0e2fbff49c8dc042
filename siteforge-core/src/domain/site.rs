//! Site file set types

use std::collections::BTreeMap;

/// Generated source files: relative path -> text content
pub type SourceFileSet = BTreeMap<String, String>;

/// Harvested build output: relative path (forward slashes) -> text content
pub type ArtifactSet = BTreeMap<String, String>;

/// Maximum length of a site slug
pub const MAX_SLUG_LEN: usize = 48;

/// Turns a business or site name into a filesystem-safe slug
///
/// Lowercases ASCII letters, collapses every run of non-alphanumeric
/// characters into a single `-` and trims separators from both ends.
/// Falls back to `site` when nothing usable is left.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;

    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }

    slug.truncate(MAX_SLUG_LEN);
    let slug = slug.trim_end_matches('-');

    if slug.is_empty() {
        "site".to_string()
    } else {
        slug.to_string()
    }
}
