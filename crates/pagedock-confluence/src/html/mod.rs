//! Conversion of plain HTML fragments into content blocks.
//!
//! Used for both the HTML-export ingestion path and the non-namespaced
//! passthrough of the storage-format parser. Top-level block elements become
//! dedicated blocks; runs of inline content and bare text accumulate into a
//! buffer that flushes as one sanitized [`ContentBlock::Html`].

mod sanitize;

pub use sanitize::sanitize;

use std::sync::LazyLock;

use html_escape::encode_text;
use kuchikikiki::{NodeRef, parse_html};
use pagedock_model::{ContentBlock, PanelType};
use regex::Regex;
use tendril::TendrilSink;

use sanitize::{sanitize_children, sanitize_node};

/// Pattern for panel classes on exported divs.
static PANEL_CLASS_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"confluence-panel-(\w+)").expect("invalid panel class regex"));

/// Pattern for code language classes.
static LANGUAGE_CLASS_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"language-(\w+)").expect("invalid language class regex"));

/// Block-level elements that become dedicated blocks.
const BLOCK_LEVEL_TAGS: &[&str] = &[
    "h1", "h2", "h3", "h4", "h5", "h6",
    "p", "div", "blockquote",
    "ul", "ol", "table",
    "hr", "img", "pre", "details",
];

/// Converter from HTML fragments to content blocks.
pub struct HtmlConverter;

impl HtmlConverter {
    /// Create a new converter.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Convert an HTML fragment into content blocks.
    #[must_use]
    #[allow(clippy::unused_self)] // &self keeps the call sites uniform with the parsers
    pub fn to_blocks(&self, html: &str) -> Vec<ContentBlock> {
        if html.trim().is_empty() {
            return Vec::new();
        }

        let document = parse_html().one(html);
        let Ok(body) = document.select_first("body") else {
            return Vec::new();
        };

        let mut blocks = Vec::new();
        let mut buffer = String::new();

        for child in body.as_node().children() {
            if let Some(element) = child.as_element() {
                let tag: &str = &element.name.local;
                if BLOCK_LEVEL_TAGS.contains(&tag) {
                    flush_buffer(&mut buffer, &mut blocks);
                    convert_block_element(tag, &child, &mut blocks);
                } else {
                    // Inline element - add to buffer
                    buffer.push_str(&sanitize_node(&child));
                }
            } else if let Some(text) = child.as_text() {
                let text = text.borrow();
                if !text.trim().is_empty() {
                    buffer.push_str(&encode_text(text.as_str()));
                }
            }
        }

        flush_buffer(&mut buffer, &mut blocks);
        blocks
    }
}

impl Default for HtmlConverter {
    fn default() -> Self {
        Self::new()
    }
}

/// Flush accumulated inline content as one HTML block.
fn flush_buffer(buffer: &mut String, blocks: &mut Vec<ContentBlock>) {
    if !buffer.trim().is_empty() {
        blocks.push(ContentBlock::Html {
            content: std::mem::take(buffer),
            css_class: None,
        });
    }
    buffer.clear();
}

/// Convert a block-level element into its dedicated block.
fn convert_block_element(tag: &str, node: &NodeRef, blocks: &mut Vec<ContentBlock>) {
    match tag {
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
            let level = tag[1..].parse().unwrap_or(1);
            blocks.push(ContentBlock::Heading {
                level,
                text: node.text_contents().trim().to_owned(),
            });
        }
        "hr" => blocks.push(ContentBlock::Divider),
        "img" => {
            if let Some(block) = convert_image(node) {
                blocks.push(block);
            }
        }
        "pre" => blocks.push(convert_pre(node)),
        "details" => blocks.push(ContentBlock::Html {
            content: sanitize_node(node),
            css_class: Some("confluence-expand".to_owned()),
        }),
        "div" => blocks.push(convert_div(node)),
        _ => blocks.push(ContentBlock::Html {
            content: sanitize_node(node),
            css_class: None,
        }),
    }
}

fn convert_image(node: &NodeRef) -> Option<ContentBlock> {
    let element = node.as_element()?;
    let attributes = element.attributes.borrow();

    let url = attributes.get("src").unwrap_or_default().to_owned();
    let alt = attributes.get("alt").unwrap_or_default().to_owned();
    let title = attributes
        .get("title")
        .filter(|title| !title.is_empty())
        .map(ToOwned::to_owned);

    Some(ContentBlock::Image {
        url,
        alt,
        filename: None,
        title,
    })
}

/// A `pre` containing a `code` child becomes a code block; other `pre`
/// elements stay raw HTML.
fn convert_pre(node: &NodeRef) -> ContentBlock {
    if let Ok(code_ref) = node.select_first("code") {
        let code_node = code_ref.as_node();
        let language = code_ref
            .attributes
            .borrow()
            .get("class")
            .and_then(|class| LANGUAGE_CLASS_PATTERN.captures(class))
            .map(|captures| captures[1].to_owned());

        return ContentBlock::Code {
            code: code_node.text_contents(),
            language,
            line_numbers: false,
        };
    }

    ContentBlock::Html {
        content: sanitize_node(node),
        css_class: None,
    }
}

/// Divs carrying an exported panel class decompose back into panels.
fn convert_div(node: &NodeRef) -> ContentBlock {
    let class = node
        .as_element()
        .and_then(|element| element.attributes.borrow().get("class").map(ToOwned::to_owned))
        .unwrap_or_default();

    let Some(captures) = PANEL_CLASS_PATTERN.captures(&class) else {
        return ContentBlock::Html {
            content: sanitize_node(node),
            css_class: None,
        };
    };
    let panel_type = parse_panel_type(&captures[1]);

    let mut title = None;
    let mut content = String::new();

    for child in node.children() {
        let Some(element) = child.as_element() else {
            continue;
        };
        let child_class = element
            .attributes
            .borrow()
            .get("class")
            .unwrap_or_default()
            .to_owned();

        if child_class.contains("confluence-panel-title") {
            title = Some(child.text_contents().trim().to_owned());
        } else if child_class.contains("confluence-panel-body") {
            content = sanitize_children(&child);
        }
    }

    if content.trim().is_empty() {
        // No recognizable sub-structure: the whole inner HTML is the body
        content = sanitize_children(node);
    }

    ContentBlock::Panel {
        panel_type,
        content,
        title,
    }
}

fn parse_panel_type(name: &str) -> PanelType {
    match name {
        "note" => PanelType::Note,
        "warning" => PanelType::Warning,
        "tip" => PanelType::Tip,
        "error" => PanelType::Error,
        _ => PanelType::Info,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn to_blocks(html: &str) -> Vec<ContentBlock> {
        HtmlConverter::new().to_blocks(html)
    }

    #[test]
    fn test_heading_levels() {
        let blocks = to_blocks("<h3>Deep Dive</h3>");
        assert_eq!(
            blocks,
            vec![ContentBlock::Heading {
                level: 3,
                text: "Deep Dive".to_owned()
            }]
        );
    }

    #[test]
    fn test_inline_content_accumulates_until_block_boundary() {
        let blocks = to_blocks("intro <em>text</em><h2>Title</h2><span>after</span>");
        assert_eq!(blocks.len(), 3);
        assert!(matches!(&blocks[0], ContentBlock::Html { content, .. }
            if content.contains("intro") && content.contains("<em>text</em>")));
        assert!(matches!(&blocks[1], ContentBlock::Heading { level: 2, .. }));
        assert!(matches!(&blocks[2], ContentBlock::Html { content, .. }
            if content.contains("after")));
    }

    #[test]
    fn test_hr_becomes_divider() {
        assert_eq!(to_blocks("<hr>"), vec![ContentBlock::Divider]);
    }

    #[test]
    fn test_img_becomes_image_block() {
        let blocks = to_blocks(r#"<img src="chart.png" alt="A chart" title="Chart">"#);
        assert_eq!(
            blocks,
            vec![ContentBlock::Image {
                url: "chart.png".to_owned(),
                alt: "A chart".to_owned(),
                filename: None,
                title: Some("Chart".to_owned()),
            }]
        );
    }

    #[test]
    fn test_pre_with_code_child_sniffs_language() {
        let blocks = to_blocks(r#"<pre><code class="language-python">print(1)</code></pre>"#);
        assert_eq!(
            blocks,
            vec![ContentBlock::Code {
                code: "print(1)".to_owned(),
                language: Some("python".to_owned()),
                line_numbers: false,
            }]
        );
    }

    #[test]
    fn test_pre_without_code_child_stays_html() {
        let blocks = to_blocks("<pre>preformatted</pre>");
        assert!(matches!(&blocks[0], ContentBlock::Html { content, .. }
            if content.contains("<pre>preformatted</pre>")));
    }

    #[test]
    fn test_panel_div_decomposes_with_title_and_body() {
        let blocks = to_blocks(
            r#"<div class="confluence-panel confluence-panel-warning"><div class="confluence-panel-title">Careful</div><div class="confluence-panel-body"><p>Body</p></div></div>"#,
        );
        assert_eq!(
            blocks,
            vec![ContentBlock::Panel {
                panel_type: PanelType::Warning,
                content: "<p>Body</p>".to_owned(),
                title: Some("Careful".to_owned()),
            }]
        );
    }

    #[test]
    fn test_panel_div_without_substructure_uses_inner_html() {
        let blocks = to_blocks(r#"<div class="confluence-panel-info"><p>Just body</p></div>"#);
        assert_eq!(
            blocks,
            vec![ContentBlock::Panel {
                panel_type: PanelType::Info,
                content: "<p>Just body</p>".to_owned(),
                title: None,
            }]
        );
    }

    #[test]
    fn test_plain_div_stays_html() {
        let blocks = to_blocks(r#"<div class="layout">content</div>"#);
        assert!(matches!(&blocks[0], ContentBlock::Html { content, .. }
            if content.contains("layout")));
    }

    #[test]
    fn test_details_preserved_with_marker_class() {
        let blocks = to_blocks("<details><summary>More</summary>hidden</details>");
        assert!(matches!(&blocks[0], ContentBlock::Html { css_class: Some(class), .. }
            if class == "confluence-expand"));
    }

    #[test]
    fn test_unsafe_markup_sanitized_on_every_path() {
        let blocks = to_blocks(
            r#"<p onclick="x()">para</p><span onmouseover="y()">inline</span><script>z()</script>"#,
        );
        for block in &blocks {
            if let ContentBlock::Html { content, .. } = block {
                assert!(!content.contains("onclick"));
                assert!(!content.contains("onmouseover"));
                assert!(!content.contains("script"));
            }
        }
    }

    #[test]
    fn test_blank_fragment_yields_no_blocks() {
        assert_eq!(to_blocks(" \n "), Vec::new());
    }
}
