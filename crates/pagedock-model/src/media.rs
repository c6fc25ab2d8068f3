//! Attachment references and deferred media downloads.

use serde::{Deserialize, Serialize};

/// Reference to a page attachment.
///
/// An attachment is a reference only; bytes are materialized later by an
/// asset store collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    /// Source URL.
    pub url: String,
    /// Attachment filename.
    pub filename: String,
    /// MIME type, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
    /// Size in bytes, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

/// Deferred media download work item.
///
/// Registered during parsing whenever a page references remote media; an
/// asset store collaborator consumes these after the page set is persisted.
/// The same URL may be registered more than once across pages — whether
/// duplicates are collapsed is an importer configuration choice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaDownload {
    /// Source URL to fetch.
    pub url: String,
    /// Filename to store the media under.
    pub target_filename: String,
    /// Slug of the page that referenced the media.
    pub page_slug: String,
}
