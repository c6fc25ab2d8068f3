//! Destination page and widget structures.

use pagedock_model::PageMetadata;
use serde::Serialize;

/// A page ready for persistence by the hosting application.
#[derive(Debug, Clone, Serialize)]
pub struct DestinationPage {
    /// Stable identifier carried over from the intermediate page.
    pub unique_id: String,
    /// Page title.
    pub title: String,
    /// URL slug.
    pub slug: String,
    /// Language tag.
    pub language: String,
    /// Parent page identifier, carried through unresolved; the page store
    /// maps it to its own parent references.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_unique_id: Option<String>,
    /// Source metadata (created/modified/author/ordinal).
    pub metadata: PageMetadata,
    /// Ordered widgets.
    pub widgets: Vec<Widget>,
}

/// One widget on a destination page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Widget {
    /// Position within the page, 0-based and reset per page.
    pub order: u32,
    /// Widget payload.
    #[serde(flatten)]
    pub kind: WidgetKind,
}

/// Widget payload variants understood by the hosting application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum WidgetKind {
    /// Section heading.
    Heading {
        /// Heading level (1-6).
        level: u8,
        /// Plain heading text.
        text: String,
    },
    /// Rich text rendered from HTML content.
    Text {
        /// Sanitized HTML markup.
        content: String,
    },
    /// Embedded image.
    Image {
        /// Stored filename or source basename.
        src: String,
        /// Alternative text.
        alt: String,
    },
    /// Horizontal rule.
    Divider,
}
