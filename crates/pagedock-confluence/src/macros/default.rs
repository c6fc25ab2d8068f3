//! Fallback handler for unsupported Confluence macros.

use html_escape::encode_text;
use pagedock_model::ContentBlock;
use tracing::warn;

use super::{ConversionContext, MacroHandler, macro_body, macro_name};
use crate::storage_format::TreeNode;

/// Catch-all handler producing a visible placeholder block.
///
/// Supports every macro name, so the dispatcher can never drop a macro
/// silently. Recoverable body text is preserved (escaped) inside the
/// placeholder for auditability.
pub struct DefaultMacroHandler;

impl MacroHandler for DefaultMacroHandler {
    fn supports(&self, _macro_name: &str) -> bool {
        true
    }

    fn convert(&self, macro_node: &TreeNode, _ctx: &mut ConversionContext) -> Vec<ContentBlock> {
        let name = macro_name(macro_node).unwrap_or("unknown");

        warn!(macro_name = name, "unsupported Confluence macro");

        let mut content = format!(
            "<div class=\"confluence-unsupported-macro\"><p><em>\u{26a0}\u{fe0f} Unsupported \
             Confluence macro: <code>{}</code></em></p>",
            encode_text(name)
        );

        if let Some(body) = macro_body(macro_node).filter(|body| !body.trim().is_empty()) {
            content.push_str(&format!(
                "<div class=\"macro-body\">{}</div>",
                encode_text(&body)
            ));
        }

        content.push_str("</div>");

        vec![ContentBlock::Html {
            content,
            css_class: None,
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
        DefaultMacroHandler.convert(&node, &mut ConversionContext::default())
    }

    #[test]
    fn test_placeholder_names_the_macro() {
        let blocks = convert(r#"<ac:structured-macro ac:name="jira" />"#);
        assert_eq!(blocks.len(), 1);
        assert!(matches!(&blocks[0], ContentBlock::Html { content, .. }
            if content.contains("<code>jira</code>")));
    }

    #[test]
    fn test_body_text_is_preserved_escaped() {
        let blocks = convert(
            r#"<ac:structured-macro ac:name="chart"><ac:rich-text-body><p>Raw data</p></ac:rich-text-body></ac:structured-macro>"#,
        );
        match &blocks[0] {
            ContentBlock::Html { content, .. } => {
                assert!(content.contains("macro-body"));
                // Markup from the body is escaped, not interpreted
                assert!(content.contains("&lt;p&gt;Raw data&lt;/p&gt;"));
            }
            other => panic!("expected html block, got {other:?}"),
        }
    }

    #[test]
    fn test_always_exactly_one_block() {
        for fragment in [
            r#"<ac:structured-macro ac:name="gadget" />"#,
            r#"<ac:structured-macro ac:name="livesearch"><ac:parameter ac:name="spaceKey">X</ac:parameter></ac:structured-macro>"#,
        ] {
            assert_eq!(convert(fragment).len(), 1);
        }
    }
}
