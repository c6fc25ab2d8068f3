//! Slug derivation from page titles.

use sha2::{Digest, Sha256};

/// Derive a URL slug from a page title.
///
/// ASCII-lowercases the title and collapses every run of non-alphanumeric
/// characters into a single `-`. Titles that leave nothing behind (for
/// example, titles written entirely in punctuation) fall back to a stable
/// `page-` prefix plus the first 8 hex characters of the title's SHA-256,
/// so equal titles always map to equal slugs.
#[must_use]
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_dash = false;

    for ch in title.chars() {
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

    if slug.is_empty() {
        let digest = Sha256::digest(title.as_bytes());
        return format!("page-{}", &hex::encode(digest)[..8]);
    }

    slug
}
