//! HTML sanitization for imported content.
//!
//! Imported markup is untrusted; every HTML block passes through this
//! sanitizer regardless of which ingestion path produced it. The transform
//! is pure: the input is parsed, and a new string is emitted containing only
//! allow-listed elements and attributes. Disallowed elements are removed
//! together with their entire subtree, not merely unwrapped.

use std::fmt::Write;

use html_escape::{encode_double_quoted_attribute, encode_text};
use kuchikikiki::{NodeRef, parse_html};
use tendril::TendrilSink;

/// Allowed HTML tags.
const ALLOWED_TAGS: &[&str] = &[
    "p", "h1", "h2", "h3", "h4", "h5", "h6",
    "strong", "em", "u", "s", "code", "pre",
    "ul", "ol", "li", "a", "blockquote",
    "table", "thead", "tbody", "tr", "th", "td",
    "br", "hr", "span", "div",
    "img", "video", "iframe",
    "details", "summary",
];

/// Allowed HTML attributes.
const ALLOWED_ATTRIBUTES: &[&str] = &[
    "href", "src", "alt", "title", "class", "id",
    "width", "height", "style",
    "colspan", "rowspan",
    "target", "rel",
];

/// Elements serialized without a closing tag.
const VOID_TAGS: &[&str] = &["br", "hr", "img"];

/// Sanitize an HTML fragment.
///
/// Idempotent: sanitizing already-sanitized output yields the same string.
#[must_use]
pub fn sanitize(html: &str) -> String {
    if html.trim().is_empty() {
        return String::new();
    }

    let document = parse_html().one(html);
    let Ok(body) = document.select_first("body") else {
        return String::new();
    };

    sanitize_children(body.as_node())
}

/// Emit the sanitized outer HTML of a single DOM node.
#[must_use]
pub(crate) fn sanitize_node(node: &NodeRef) -> String {
    let mut out = String::new();
    emit(node, &mut out);
    out
}

/// Emit the sanitized inner HTML of a DOM node.
#[must_use]
pub(crate) fn sanitize_children(node: &NodeRef) -> String {
    let mut out = String::new();
    for child in node.children() {
        emit(&child, &mut out);
    }
    out
}

fn emit(node: &NodeRef, out: &mut String) {
    if let Some(text) = node.as_text() {
        out.push_str(&encode_text(text.borrow().as_str()));
        return;
    }

    let Some(element) = node.as_element() else {
        // Comments and other non-content nodes are dropped
        return;
    };

    let tag: &str = &element.name.local;
    if !ALLOWED_TAGS.contains(&tag) {
        // Removed with its whole subtree
        return;
    }

    out.push('<');
    out.push_str(tag);

    // BTreeMap keys give a stable attribute order
    for (name, attribute) in &element.attributes.borrow().map {
        let attr_name: &str = &name.local;
        if ALLOWED_ATTRIBUTES.contains(&attr_name) {
            write!(
                out,
                r#" {attr_name}="{}""#,
                encode_double_quoted_attribute(&attribute.value)
            )
            .expect("write to String");
        }
    }
    out.push('>');

    if VOID_TAGS.contains(&tag) {
        return;
    }

    for child in node.children() {
        emit(&child, out);
    }

    write!(out, "</{tag}>").expect("write to String");
}
