//! Confluence storage-format parsing.
//!
//! Storage format is XHTML with two vendor namespaces: `ac:` for content
//! extensions (macros, images) and `ri:` for resource identifiers. A strict
//! namespace-aware XML pass is attempted first; fragments the XML parser
//! rejects are re-parsed leniently as HTML so malformed pages still import.

mod entities;
mod lenient;
pub mod serializer;
mod tree;
mod xml;

pub use tree::TreeNode;
pub use xml::StorageXmlParser;

use html_escape::encode_text;
use pagedock_model::ContentBlock;
use tracing::debug;

use crate::error::ParseError;
use crate::html::HtmlConverter;
use crate::macros::{ConversionContext, MacroDispatcher, resolve_image};

/// Parser for storage-format page bodies.
///
/// Both ingestion paths (extracted HTML exports and REST responses) hand
/// their markup to this parser, so macro handling and sanitization behave
/// identically regardless of source.
pub struct StorageFormatParser {
    strict: StorageXmlParser,
    dispatcher: MacroDispatcher,
    html: HtmlConverter,
}

impl StorageFormatParser {
    /// Create a parser with the built-in macro handler registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            strict: StorageXmlParser::new(),
            dispatcher: MacroDispatcher::new(),
            html: HtmlConverter::new(),
        }
    }

    /// Parse a storage-format fragment into content blocks.
    ///
    /// Media references discovered along the way are registered on `ctx`.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::NoContent`] when a non-blank fragment survives
    /// neither parsing pass with any usable content. Blank fragments yield an
    /// empty block list.
    pub fn parse(
        &self,
        fragment: &str,
        ctx: &mut ConversionContext,
    ) -> Result<Vec<ContentBlock>, ParseError> {
        if fragment.trim().is_empty() {
            return Ok(Vec::new());
        }

        let root = match self.strict.parse(fragment) {
            Ok(root) => root,
            Err(err) => {
                debug!(error = %err, "strict XML parse failed, falling back to HTML parser");
                lenient::parse(fragment)
            }
        };

        if root.children.is_empty() && root.text.trim().is_empty() {
            return Err(ParseError::NoContent);
        }

        Ok(self.blocks_from_children(&root, ctx))
    }

    /// Convert the children of a container node into content blocks.
    ///
    /// Namespaced `ac:` elements are routed to the macro dispatcher or image
    /// resolution; runs of plain markup between them are serialized back to
    /// HTML and handed to the block converter in one piece so inline content
    /// keeps merging naturally.
    fn blocks_from_children(
        &self,
        node: &TreeNode,
        ctx: &mut ConversionContext,
    ) -> Vec<ContentBlock> {
        let mut blocks = Vec::new();
        let mut buffer = String::new();
        if !node.text.trim().is_empty() {
            buffer.push_str(&encode_text(&node.text));
        }

        for child in &node.children {
            if child.is_ac() {
                self.flush_html(&mut buffer, &mut blocks);

                if child.is_structured_macro() {
                    blocks.extend(self.dispatcher.convert(child, ctx));
                } else if child.local_name() == "image" {
                    blocks.extend(resolve_image(child, ctx));
                } else {
                    // Layout containers and other ac wrappers: recurse
                    blocks.extend(self.blocks_from_children(child, ctx));
                }
            } else {
                buffer.push_str(&serializer::outer_html(child));
            }
            if !child.tail.trim().is_empty() {
                buffer.push_str(&encode_text(&child.tail));
            }
        }

        self.flush_html(&mut buffer, &mut blocks);
        blocks
    }

    fn flush_html(&self, buffer: &mut String, blocks: &mut Vec<ContentBlock>) {
        if !buffer.trim().is_empty() {
            blocks.extend(self.html.to_blocks(buffer));
        }
        buffer.clear();
    }
}

impl Default for StorageFormatParser {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use pagedock_model::PanelType;
    use pretty_assertions::assert_eq;

    use super::*;

    fn parse(fragment: &str) -> Vec<ContentBlock> {
        let mut ctx = ConversionContext::default();
        StorageFormatParser::new().parse(fragment, &mut ctx).unwrap()
    }

    #[test]
    fn test_blank_fragment_yields_no_blocks() {
        assert_eq!(parse("   \n  "), Vec::new());
    }

    #[test]
    fn test_plain_html_goes_through_converter() {
        let blocks = parse("<h2>Section</h2><p>Body text</p>");
        assert_eq!(
            blocks[0],
            ContentBlock::Heading {
                level: 2,
                text: "Section".to_owned()
            }
        );
        assert!(matches!(&blocks[1], ContentBlock::Html { content, .. } if content.contains("Body text")));
    }

    #[test]
    fn test_panel_macro_dispatch() {
        let blocks = parse(
            r#"<ac:structured-macro ac:name="warning"><ac:rich-text-body><p>Careful</p></ac:rich-text-body></ac:structured-macro>"#,
        );
        assert_eq!(blocks.len(), 1);
        match &blocks[0] {
            ContentBlock::Panel {
                panel_type,
                content,
                ..
            } => {
                assert_eq!(*panel_type, PanelType::Warning);
                assert!(content.contains("Careful"));
            }
            other => panic!("expected panel, got {other:?}"),
        }
    }

    #[test]
    fn test_layout_containers_are_recursed() {
        let blocks = parse(
            r#"<ac:layout><ac:layout-section><ac:layout-cell><p>Nested</p></ac:layout-cell></ac:layout-section></ac:layout>"#,
        );
        assert!(matches!(&blocks[0], ContentBlock::Html { content, .. } if content.contains("Nested")));
    }

    #[test]
    fn test_inline_runs_merge_across_siblings() {
        let blocks = parse("Intro <strong>bold</strong> and <em>emphasis</em> text");
        assert_eq!(blocks.len(), 1);
        assert!(matches!(&blocks[0], ContentBlock::Html { content, .. }
            if content.contains("bold") && content.contains("emphasis")));
    }

    #[test]
    fn test_malformed_markup_degrades_to_lenient_parse() {
        // Unclosed <br> fails strict XML but parses as HTML
        let blocks = parse("<p>Line one<br>Line two</p>");
        assert_eq!(blocks.len(), 1);
        assert!(matches!(&blocks[0], ContentBlock::Html { content, .. }
            if content.contains("Line one") && content.contains("Line two")));
    }

    #[test]
    fn test_image_element_registers_media_download() {
        let mut ctx = ConversionContext::default();
        let blocks = StorageFormatParser::new()
            .parse(
                r#"<ac:image ac:alt="Diagram"><ri:attachment ri:filename="diagram.png" /></ac:image>"#,
                &mut ctx,
            )
            .unwrap();

        assert_eq!(
            blocks[0],
            ContentBlock::Image {
                url: "diagram.png".to_owned(),
                alt: "Diagram".to_owned(),
                filename: Some("diagram.png".to_owned()),
                title: None,
            }
        );
        let media = ctx.take_media();
        assert_eq!(media.len(), 1);
        assert_eq!(media[0].filename, "diagram.png");
    }
}
