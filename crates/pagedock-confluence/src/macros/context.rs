//! Shared state and helpers for macro conversion.

use crate::storage_format::{TreeNode, serializer};

/// A media reference discovered during conversion.
///
/// Becomes a [`pagedock_model::MediaDownload`] once the owning page's slug is
/// known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingMedia {
    /// Source URL to fetch.
    pub url: String,
    /// Filename to store the media under.
    pub filename: String,
}

/// Conversion context threaded through macro handlers.
///
/// Carries the source instance coordinates and collects media references;
/// one context lives per page, so registered media never leaks across pages.
#[derive(Debug, Default)]
pub struct ConversionContext {
    base_url: String,
    space_key: Option<String>,
    media: Vec<PendingMedia>,
}

impl ConversionContext {
    /// Create a context for the given source instance.
    #[must_use]
    pub fn new(base_url: impl Into<String>, space_key: Option<String>) -> Self {
        Self {
            base_url: base_url.into(),
            space_key,
            media: Vec::new(),
        }
    }

    /// Base URL of the source Confluence instance (may be empty for exports).
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Space key of the imported space, when known.
    #[must_use]
    pub fn space_key(&self) -> Option<&str> {
        self.space_key.as_deref()
    }

    /// Register a media reference for deferred download.
    pub fn register_media_download(
        &mut self,
        url: impl Into<String>,
        filename: impl Into<String>,
    ) {
        self.media.push(PendingMedia {
            url: url.into(),
            filename: filename.into(),
        });
    }

    /// Drain the media references collected so far.
    pub fn take_media(&mut self) -> Vec<PendingMedia> {
        std::mem::take(&mut self.media)
    }
}

/// Value of a named macro parameter (`ac:parameter ac:name="..."`).
#[must_use]
pub fn parameter<'a>(macro_node: &'a TreeNode, name: &str) -> Option<&'a TreeNode> {
    macro_node
        .descendants("parameter")
        .into_iter()
        .find(|param| param.attr("ac:name") == Some(name))
}

/// Text value of a named macro parameter, `None` when absent or blank.
#[must_use]
pub fn parameter_text(macro_node: &TreeNode, name: &str) -> Option<String> {
    let text = parameter(macro_node, name)?.text_content();
    let text = text.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_owned())
    }
}

/// Macro body content.
///
/// Prefers the rich-text body (returned as inner HTML), falling back to the
/// plain-text body (returned as raw text). `None` when the macro has no body.
#[must_use]
pub fn macro_body(macro_node: &TreeNode) -> Option<String> {
    if let Some(rich) = macro_node.find_descendant("rich-text-body") {
        return Some(serializer::inner_html(rich));
    }
    macro_node
        .find_descendant("plain-text-body")
        .map(TreeNode::text_content)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::storage_format::StorageXmlParser;

    fn first_macro(fragment: &str) -> TreeNode {
        StorageXmlParser::new().parse(fragment).unwrap().children.remove(0)
    }

    #[test]
    fn test_parameter_lookup_by_name() {
        let node = first_macro(
            r#"<ac:structured-macro ac:name="code"><ac:parameter ac:name="language">rust</ac:parameter><ac:parameter ac:name="linenumbers">true</ac:parameter></ac:structured-macro>"#,
        );
        assert_eq!(parameter_text(&node, "language").as_deref(), Some("rust"));
        assert_eq!(parameter_text(&node, "linenumbers").as_deref(), Some("true"));
        assert_eq!(parameter_text(&node, "title"), None);
    }

    #[test]
    fn test_macro_body_prefers_rich_text() {
        let node = first_macro(
            r#"<ac:structured-macro ac:name="info"><ac:rich-text-body><p>Rich</p></ac:rich-text-body></ac:structured-macro>"#,
        );
        assert_eq!(macro_body(&node).as_deref(), Some("<p>Rich</p>"));
    }

    #[test]
    fn test_macro_body_falls_back_to_plain_text() {
        let node = first_macro(
            "<ac:structured-macro ac:name=\"code\"><ac:plain-text-body><![CDATA[plain]]></ac:plain-text-body></ac:structured-macro>",
        );
        assert_eq!(macro_body(&node).as_deref(), Some("plain"));
    }

    #[test]
    fn test_media_registration_drains() {
        let mut ctx = ConversionContext::new("https://wiki.example.com", None);
        ctx.register_media_download("diagram.png", "diagram.png");
        assert_eq!(ctx.take_media().len(), 1);
        assert!(ctx.take_media().is_empty());
    }
}
