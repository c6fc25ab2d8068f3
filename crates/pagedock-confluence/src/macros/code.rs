//! Handler for the Confluence code macro.

use pagedock_model::ContentBlock;

use super::{ConversionContext, MacroHandler, macro_body, parameter_text};
use crate::storage_format::TreeNode;

/// Converts `code` macros to [`ContentBlock::Code`].
pub struct CodeMacroHandler;

impl MacroHandler for CodeMacroHandler {
    fn supports(&self, macro_name: &str) -> bool {
        macro_name == "code"
    }

    fn convert(&self, macro_node: &TreeNode, _ctx: &mut ConversionContext) -> Vec<ContentBlock> {
        let Some(code) = macro_body(macro_node) else {
            return Vec::new();
        };
        if code.trim().is_empty() {
            return Vec::new();
        }

        let language = parameter_text(macro_node, "language")
            .as_deref()
            .map(normalize_language);

        let line_numbers = parameter_text(macro_node, "linenumbers").as_deref() == Some("true");

        vec![ContentBlock::Code {
            code,
            language,
            line_numbers,
        }]
    }
}

/// Normalize a Confluence language name for syntax highlighting.
///
/// Confluence uses its own vocabulary; recognized names map to common
/// highlighter identifiers, everything else passes through lowercased.
fn normalize_language(confluence_language: &str) -> String {
    let lang = confluence_language.to_lowercase();
    let mapped = match lang.as_str() {
        "actionscript3" => "actionscript",
        "c#" => "csharp",
        "c++" => "cpp",
        "coldfusion" => "cfm",
        "delphi" => "pascal",
        "html/xml" => "html",
        "javafx" => "java",
        "js" => "javascript",
        "vb" => "vbnet",
        _ => return lang,
    };
    mapped.to_owned()
}
