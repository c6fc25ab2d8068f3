//! Handler for attachment-related macros and `ac:image` elements.

use html_escape::encode_text;
use pagedock_model::ContentBlock;

use super::{ConversionContext, MacroHandler, macro_name, parameter, parameter_text};
use crate::storage_format::TreeNode;

/// Converts `attachments`, `viewfile` and `image` macros.
///
/// The attachments listing and file viewer get placeholder markup; actual
/// attachment materialization happens through the page's attachment list
/// after import. Embedded `ac:image` elements are resolved separately via
/// [`resolve_image`], which the storage-format walker calls directly.
pub struct AttachmentMacroHandler;

impl MacroHandler for AttachmentMacroHandler {
    fn supports(&self, macro_name: &str) -> bool {
        matches!(macro_name, "attachments" | "viewfile" | "image")
    }

    fn convert(&self, macro_node: &TreeNode, _ctx: &mut ConversionContext) -> Vec<ContentBlock> {
        match macro_name(macro_node).unwrap_or_default() {
            "attachments" => convert_attachments_list(),
            "viewfile" => convert_view_file(macro_node),
            // <ac:image> elements are processed by the main parser walk
            _ => Vec::new(),
        }
    }
}

/// The attachments macro lists all page attachments; emit a note instead of
/// duplicating a listing the destination renders itself.
fn convert_attachments_list() -> Vec<ContentBlock> {
    vec![ContentBlock::Html {
        content: "<div class=\"confluence-attachments\"><p><em>Page attachments will be \
                  imported separately</em></p></div>"
            .to_owned(),
        css_class: None,
    }]
}

/// The viewfile macro embeds a single file; emit a download-link placeholder.
fn convert_view_file(macro_node: &TreeNode) -> Vec<ContentBlock> {
    let filename = parameter_text(macro_node, "name").or_else(|| {
        // The name parameter may hold a resource identifier instead of text
        parameter(macro_node, "name")
            .and_then(|param| param.find_descendant("attachment"))
            .and_then(|attachment| attachment.attr("ri:filename"))
            .map(ToOwned::to_owned)
    });

    let Some(filename) = filename else {
        return Vec::new();
    };

    vec![ContentBlock::Html {
        content: format!(
            "<p><a href=\"#\" download>\u{1f4c4} {}</a></p>",
            encode_text(&filename)
        ),
        css_class: None,
    }]
}

/// Resolve an `ac:image` element into an image block.
///
/// Attachment references use the bare filename as the URL; the actual bytes
/// are fetched later through the registered media download. External URL
/// references derive a target filename from the URL path.
pub fn resolve_image(image_node: &TreeNode, ctx: &mut ConversionContext) -> Vec<ContentBlock> {
    let alt = image_node.attr("ac:alt").unwrap_or_default().to_owned();
    let title = image_node.attr("ac:title").map(ToOwned::to_owned);

    if let Some(attachment) = image_node.find_descendant("attachment") {
        let Some(filename) = attachment.attr("ri:filename").filter(|name| !name.is_empty())
        else {
            return Vec::new();
        };

        ctx.register_media_download(filename, filename);
        return vec![ContentBlock::Image {
            url: filename.to_owned(),
            alt,
            filename: Some(filename.to_owned()),
            title,
        }];
    }

    if let Some(url_ref) = image_node.find_descendant("url") {
        let Some(url) = url_ref.attr("ri:value").filter(|value| !value.is_empty()) else {
            return Vec::new();
        };

        let filename = filename_from_url(url);
        ctx.register_media_download(url, &filename);
        return vec![ContentBlock::Image {
            url: url.to_owned(),
            alt,
            filename: Some(filename),
            title,
        }];
    }

    Vec::new()
}

/// Derive a target filename from the final path segment of a URL.
fn filename_from_url(url: &str) -> String {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    path.rsplit('/').next().unwrap_or(path).to_owned()
}
