//! Handler for Confluence panel macros (info, note, warning, tip, error).

use pagedock_model::{ContentBlock, PanelType};

use super::{ConversionContext, MacroHandler, macro_body, macro_name, parameter_text};
use crate::html::sanitize;
use crate::storage_format::TreeNode;

const SUPPORTED_MACROS: &[&str] = &["info", "note", "warning", "tip", "error", "panel"];

/// Converts panel macros to [`ContentBlock::Panel`].
pub struct PanelMacroHandler;

impl MacroHandler for PanelMacroHandler {
    fn supports(&self, macro_name: &str) -> bool {
        SUPPORTED_MACROS.contains(&macro_name)
    }

    fn convert(&self, macro_node: &TreeNode, _ctx: &mut ConversionContext) -> Vec<ContentBlock> {
        let name = macro_name(macro_node).unwrap_or_default();
        let title = parameter_text(macro_node, "title");

        let Some(body) = macro_body(macro_node) else {
            return Vec::new();
        };
        let content = sanitize(&body);
        if content.trim().is_empty() {
            // No content, skip
            return Vec::new();
        }

        vec![ContentBlock::Panel {
            panel_type: map_panel_type(name),
            content,
            title,
        }]
    }
}

/// Map a Confluence macro name to a panel type.
fn map_panel_type(macro_name: &str) -> PanelType {
    match macro_name {
        "note" | "panel" => PanelType::Note,
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
    use crate::storage_format::StorageXmlParser;

    fn convert(fragment: &str) -> Vec<ContentBlock> {
        let node = StorageXmlParser::new().parse(fragment).unwrap().children.remove(0);
        PanelMacroHandler.convert(&node, &mut ConversionContext::default())
    }

    #[test]
    fn test_info_panel_with_title() {
        let blocks = convert(
            r#"<ac:structured-macro ac:name="info"><ac:parameter ac:name="title">Heads up</ac:parameter><ac:rich-text-body><p>Body</p></ac:rich-text-body></ac:structured-macro>"#,
        );
        assert_eq!(blocks.len(), 1);
        match &blocks[0] {
            ContentBlock::Panel {
                panel_type,
                content,
                title,
            } => {
                assert_eq!(*panel_type, PanelType::Info);
                assert!(content.contains("Body"));
                assert_eq!(title.as_deref(), Some("Heads up"));
            }
            other => panic!("expected panel, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_body_produces_zero_blocks() {
        let blocks = convert(
            r#"<ac:structured-macro ac:name="info"><ac:rich-text-body></ac:rich-text-body></ac:structured-macro>"#,
        );
        assert_eq!(blocks, Vec::new());
    }

    #[test]
    fn test_missing_body_produces_zero_blocks() {
        let blocks = convert(r#"<ac:structured-macro ac:name="info" />"#);
        assert_eq!(blocks, Vec::new());
    }

    #[test]
    fn test_generic_panel_maps_to_note() {
        let blocks = convert(
            r#"<ac:structured-macro ac:name="panel"><ac:rich-text-body><p>x</p></ac:rich-text-body></ac:structured-macro>"#,
        );
        assert!(matches!(
            &blocks[0],
            ContentBlock::Panel {
                panel_type: PanelType::Note,
                ..
            }
        ));
    }

    #[test]
    fn test_body_is_sanitized() {
        let blocks = convert(
            r#"<ac:structured-macro ac:name="warning"><ac:rich-text-body><p>ok</p><script>alert(1)</script></ac:rich-text-body></ac:structured-macro>"#,
        );
        match &blocks[0] {
            ContentBlock::Panel { content, .. } => {
                assert!(content.contains("ok"));
                assert!(!content.contains("script"));
            }
            other => panic!("expected panel, got {other:?}"),
        }
    }
}
