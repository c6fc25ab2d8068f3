//! Handler for the Confluence expand macro.

use html_escape::encode_text;
use pagedock_model::ContentBlock;

use super::{ConversionContext, MacroHandler, macro_body, parameter_text};
use crate::html::sanitize;
use crate::storage_format::TreeNode;

/// CSS marker class for collapsible content.
const EXPAND_CLASS: &str = "confluence-expand";

/// Converts `expand` macros to native `<details>`/`<summary>` markup.
pub struct ExpandMacroHandler;

impl MacroHandler for ExpandMacroHandler {
    fn supports(&self, macro_name: &str) -> bool {
        macro_name == "expand"
    }

    fn convert(&self, macro_node: &TreeNode, _ctx: &mut ConversionContext) -> Vec<ContentBlock> {
        let title =
            parameter_text(macro_node, "title").unwrap_or_else(|| "Click to expand...".to_owned());

        let Some(body) = macro_body(macro_node) else {
            return Vec::new();
        };
        let body = sanitize(&body);
        if body.trim().is_empty() {
            return Vec::new();
        }

        let content = format!(
            "<details class=\"{EXPAND_CLASS}\"><summary>{}</summary>\
             <div class=\"{EXPAND_CLASS}-content\">{body}</div></details>",
            encode_text(&title)
        );

        vec![ContentBlock::Html {
            content,
            css_class: Some(EXPAND_CLASS.to_owned()),
        }]
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::storage_format::StorageXmlParser;

    fn convert(fragment: &str) -> Vec<ContentBlock> {
        let node = StorageXmlParser::new().parse(fragment).unwrap().children.remove(0);
        ExpandMacroHandler.convert(&node, &mut ConversionContext::default())
    }

    #[test]
    fn test_expand_with_title() {
        let blocks = convert(
            r#"<ac:structured-macro ac:name="expand"><ac:parameter ac:name="title">Details</ac:parameter><ac:rich-text-body><p>Hidden</p></ac:rich-text-body></ac:structured-macro>"#,
        );
        match &blocks[0] {
            ContentBlock::Html { content, css_class } => {
                assert!(content.starts_with("<details class=\"confluence-expand\">"));
                assert!(content.contains("<summary>Details</summary>"));
                assert!(content.contains("Hidden"));
                assert_eq!(css_class.as_deref(), Some("confluence-expand"));
            }
            other => panic!("expected html block, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_title_gets_generic_summary() {
        let blocks = convert(
            r#"<ac:structured-macro ac:name="expand"><ac:rich-text-body><p>x</p></ac:rich-text-body></ac:structured-macro>"#,
        );
        assert!(matches!(&blocks[0], ContentBlock::Html { content, .. }
            if content.contains("<summary>Click to expand...</summary>")));
    }

    #[test]
    fn test_empty_body_produces_zero_blocks() {
        let blocks = convert(r#"<ac:structured-macro ac:name="expand" />"#);
        assert_eq!(blocks, Vec::new());
    }
}
