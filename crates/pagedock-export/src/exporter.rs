//! Conversion from the intermediate model to destination pages.

use html_escape::{encode_double_quoted_attribute, encode_text};
use pagedock_model::{ContentBlock, IntermediateFormat, IntermediatePage, PanelType};

use crate::destination::{DestinationPage, Widget, WidgetKind};

/// Convert an import run into destination pages.
///
/// Pure function, no I/O: one destination page per intermediate page, one
/// widget per content block. Widget order restarts at zero for every page;
/// page order is the intermediate page order.
#[must_use]
pub fn to_destination(format: &IntermediateFormat) -> Vec<DestinationPage> {
    format.pages.iter().map(convert_page).collect()
}

fn convert_page(page: &IntermediatePage) -> DestinationPage {
    // Explicit per-page counter, threaded through the block conversion
    let mut order = 0_u32;
    let widgets = page
        .content_blocks
        .iter()
        .map(|block| {
            let widget = Widget {
                order,
                kind: convert_block(block),
            };
            order += 1;
            widget
        })
        .collect();

    DestinationPage {
        unique_id: page.unique_id.clone(),
        title: page.title.clone(),
        slug: page.slug.clone(),
        language: page.language.clone(),
        parent_unique_id: page.parent_unique_id.clone(),
        metadata: page.metadata.clone(),
        widgets,
    }
}

fn convert_block(block: &ContentBlock) -> WidgetKind {
    match block {
        ContentBlock::Heading { level, text } => WidgetKind::Heading {
            level: *level,
            text: text.clone(),
        },
        ContentBlock::Html { content, css_class } => WidgetKind::Text {
            content: css_class.as_ref().map_or_else(
                || content.clone(),
                |class| {
                    format!(
                        "<div class=\"{}\">{content}</div>",
                        encode_double_quoted_attribute(class)
                    )
                },
            ),
        },
        ContentBlock::Code {
            code,
            language,
            line_numbers,
        } => WidgetKind::Text {
            content: render_code(code, language.as_deref(), *line_numbers),
        },
        ContentBlock::Panel {
            panel_type,
            content,
            title,
        } => WidgetKind::Text {
            content: render_panel(*panel_type, content, title.as_deref()),
        },
        ContentBlock::Image { url, filename, alt, .. } => WidgetKind::Image {
            src: filename
                .clone()
                .unwrap_or_else(|| basename(url).to_owned()),
            alt: alt.clone(),
        },
        ContentBlock::Divider => WidgetKind::Divider,
    }
}

fn render_code(code: &str, language: Option<&str>, line_numbers: bool) -> String {
    let mut pre_class = "confluence-code-block".to_owned();
    if line_numbers {
        pre_class.push_str(" line-numbers");
    }

    let code_class = language.map_or(String::new(), |language| {
        format!(
            " class=\"language-{}\"",
            encode_double_quoted_attribute(language)
        )
    });

    format!(
        "<pre class=\"{pre_class}\"><code{code_class}>{}</code></pre>",
        encode_text(code)
    )
}

fn render_panel(panel_type: PanelType, content: &str, title: Option<&str>) -> String {
    let mut html = format!(
        "<div class=\"confluence-panel confluence-panel-{}\">",
        panel_type.as_str()
    );

    if let Some(title) = title {
        html.push_str(&format!(
            "<div class=\"confluence-panel-title\">{}</div>",
            encode_text(title)
        ));
    }

    html.push_str(&format!(
        "<div class=\"confluence-panel-body\">{content}</div></div>"
    ));
    html
}

fn basename(url: &str) -> &str {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    path.rsplit('/').next().unwrap_or(path)
}
