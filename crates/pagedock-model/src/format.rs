//! Root container and page types for one import run.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::block::ContentBlock;
use crate::media::{Attachment, MediaDownload};
use crate::slug::slugify;

/// Normalized representation of one import run.
///
/// Built incrementally while parsing; handed to an exporter as a read-only
/// value once the run is complete.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IntermediateFormat {
    /// Imported pages, in discovery order.
    pub pages: Vec<IntermediatePage>,
    /// Source navigation structure, carried through untouched.
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub navigation: serde_json::Value,
    /// Deferred media download work items.
    pub media_downloads: Vec<MediaDownload>,
    /// Language tag applied to all pages.
    pub language: String,
}

impl Default for IntermediateFormat {
    fn default() -> Self {
        Self::new("en")
    }
}

impl IntermediateFormat {
    /// Create an empty format for the given language.
    #[must_use]
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            pages: Vec::new(),
            navigation: serde_json::Value::Null,
            media_downloads: Vec::new(),
            language: language.into(),
        }
    }

    /// Append a page.
    pub fn add_page(&mut self, page: IntermediatePage) {
        self.pages.push(page);
    }

    /// Register a deferred media download.
    pub fn add_media_download(&mut self, media: MediaDownload) {
        self.media_downloads.push(media);
    }

    /// Look up a page by its source file path.
    #[must_use]
    pub fn page_by_source_file(&self, source_file: &str) -> Option<&IntermediatePage> {
        self.pages
            .iter()
            .find(|page| page.source_file.as_deref() == Some(source_file))
    }
}

/// A single page in intermediate format.
///
/// Mutated only by appending blocks and attachments during parsing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntermediatePage {
    /// Page title.
    pub title: String,
    /// URL slug derived from the title.
    pub slug: String,
    /// Language tag.
    pub language: String,
    /// Stable identifier, assigned at creation and never reassigned.
    pub unique_id: String,
    /// Slug of the parent page, empty when the page is a root.
    #[serde(default)]
    pub parent_slug: String,
    /// `unique_id` of the parent page; a back-reference, not ownership.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_unique_id: Option<String>,
    /// Original source path, used only for hierarchy matching.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_file: Option<String>,
    /// Ordered content blocks; insertion order is rendering order.
    pub content_blocks: Vec<ContentBlock>,
    /// Referenced attachments.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
    /// Created/modified/author plus importer-specific hints.
    #[serde(default)]
    pub metadata: PageMetadata,
}

impl IntermediatePage {
    /// Create a page with a freshly generated `unique_id` and a slug derived
    /// from the title.
    #[must_use]
    pub fn new(title: impl Into<String>, language: impl Into<String>) -> Self {
        let title = title.into();
        let slug = slugify(&title);
        Self {
            title,
            slug,
            language: language.into(),
            unique_id: format!("page-{}", Uuid::new_v4()),
            parent_slug: String::new(),
            parent_unique_id: None,
            source_file: None,
            content_blocks: Vec::new(),
            attachments: Vec::new(),
            metadata: PageMetadata::default(),
        }
    }

    /// Append a content block.
    pub fn add_content_block(&mut self, block: ContentBlock) {
        self.content_blocks.push(block);
    }

    /// Append an attachment reference.
    pub fn add_attachment(&mut self, attachment: Attachment) {
        self.attachments.push(attachment);
    }
}

/// Page metadata captured during import.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMetadata {
    /// Creation timestamp from the source system.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    /// Last-modified timestamp from the source system.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified: Option<String>,
    /// Author display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// Ordinal position of the page in the source export.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_order: Option<usize>,
    /// Importer-specific extra keys.
    #[serde(flatten)]
    pub extra: BTreeMap<String, String>,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_new_page_derives_slug_and_unique_id() {
        let page = IntermediatePage::new("Getting Started", "en");
        assert_eq!(page.slug, "getting-started");
        assert!(page.unique_id.starts_with("page-"));
        // "page-" plus a hyphenated UUID
        assert_eq!(page.unique_id.len(), "page-".len() + 36);
    }

    #[test]
    fn test_unique_ids_differ_between_pages() {
        let a = IntermediatePage::new("Same Title", "en");
        let b = IntermediatePage::new("Same Title", "en");
        assert_eq!(a.slug, b.slug);
        assert_ne!(a.unique_id, b.unique_id);
    }

    #[test]
    fn test_block_order_is_insertion_order() {
        let mut page = IntermediatePage::new("Order", "en");
        page.add_content_block(ContentBlock::Heading {
            level: 1,
            text: "First".to_owned(),
        });
        page.add_content_block(ContentBlock::Divider);
        assert_eq!(page.content_blocks.len(), 2);
        assert_eq!(page.content_blocks[1], ContentBlock::Divider);
    }

    #[test]
    fn test_page_by_source_file() {
        let mut format = IntermediateFormat::new("en");
        let mut page = IntermediatePage::new("Linked", "en");
        page.source_file = Some("space/linked.html".to_owned());
        format.add_page(page);

        assert!(format.page_by_source_file("space/linked.html").is_some());
        assert!(format.page_by_source_file("space/other.html").is_none());
    }
}
