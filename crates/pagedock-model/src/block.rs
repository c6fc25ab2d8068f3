//! Content block variants.

use serde::{Deserialize, Serialize};

/// Panel styling category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PanelType {
    /// Informational panel.
    Info,
    /// Note panel.
    Note,
    /// Warning panel.
    Warning,
    /// Tip panel.
    Tip,
    /// Error panel.
    Error,
}

impl PanelType {
    /// CSS-friendly name of the panel type.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Note => "note",
            Self::Warning => "warning",
            Self::Tip => "tip",
            Self::Error => "error",
        }
    }
}

/// A single renderable unit of page content.
///
/// Blocks carry only the data needed to re-render them. Their order within
/// [`IntermediatePage::content_blocks`](crate::IntermediatePage) is the sole
/// source of rendering order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentBlock {
    /// Section heading, level 1-6.
    Heading {
        /// Heading level (1-6).
        level: u8,
        /// Plain heading text.
        text: String,
    },
    /// Raw (sanitized) HTML fragment.
    Html {
        /// Sanitized HTML markup.
        content: String,
        /// Optional wrapper CSS class.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        css_class: Option<String>,
    },
    /// Embedded image reference.
    Image {
        /// Source URL or attachment reference.
        url: String,
        /// Alternative text.
        alt: String,
        /// Local target filename, if resolved.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        filename: Option<String>,
        /// Optional title/caption.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
    },
    /// Source code listing.
    Code {
        /// Verbatim code text.
        code: String,
        /// Normalized language identifier.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        language: Option<String>,
        /// Whether line numbers should be displayed.
        #[serde(default)]
        line_numbers: bool,
    },
    /// Styled admonition panel.
    Panel {
        /// Panel styling category.
        panel_type: PanelType,
        /// Panel body HTML.
        content: String,
        /// Optional panel title.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
    },
    /// Horizontal rule.
    Divider,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_panel_type_names() {
        assert_eq!(PanelType::Info.as_str(), "info");
        assert_eq!(PanelType::Error.as_str(), "error");
    }

    #[test]
    fn test_block_serializes_with_type_tag() {
        let block = ContentBlock::Heading {
            level: 2,
            text: "Overview".to_owned(),
        };
        let json = serde_json::to_value(&block).unwrap();
        assert_eq!(json["type"], "heading");
        assert_eq!(json["level"], 2);
    }

    #[test]
    fn test_divider_round_trip() {
        let json = serde_json::to_string(&ContentBlock::Divider).unwrap();
        let back: ContentBlock = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ContentBlock::Divider);
    }
}
