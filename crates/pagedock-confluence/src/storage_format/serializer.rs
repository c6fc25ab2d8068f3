//! Serialization of [`TreeNode`] subtrees back to HTML text.
//!
//! Used to hand non-namespaced storage-format elements and rich macro bodies
//! to the HTML-to-block converter as plain markup.

use std::fmt::Write;

use super::tree::TreeNode;

/// Serialize the children of a node to an HTML string (inner HTML).
#[must_use]
pub fn inner_html(node: &TreeNode) -> String {
    let mut out = String::with_capacity(256);
    if !node.text.is_empty() {
        out.push_str(&escape_text(&node.text));
    }
    for child in &node.children {
        serialize_node(child, &mut out);
    }
    out
}

/// Serialize a node including its own tag to an HTML string (outer HTML).
///
/// The node's tail text is intentionally not included.
#[must_use]
pub fn outer_html(node: &TreeNode) -> String {
    let mut out = String::with_capacity(256);
    serialize_element(node, &mut out);
    out
}

/// Serialize a single node recursively, tail included.
fn serialize_node(node: &TreeNode, out: &mut String) {
    serialize_element(node, out);
    if !node.tail.is_empty() {
        out.push_str(&escape_text(&node.tail));
    }
}

fn serialize_element(node: &TreeNode, out: &mut String) {
    // Opening tag
    out.push('<');
    out.push_str(&node.tag);

    // Attributes
    for (key, value) in &node.attrs {
        write!(out, r#" {}="{}""#, key, escape_attr(value)).expect("write to String");
    }

    if node.children.is_empty() && node.text.is_empty() {
        // Self-closing tag
        out.push_str(" />");
    } else {
        out.push('>');

        if !node.text.is_empty() {
            out.push_str(&escape_text(&node.text));
        }

        for child in &node.children {
            serialize_node(child, out);
        }

        write!(out, "</{}>", node.tag).expect("write to String");
    }
}

/// Escape text for XML content.
fn escape_text(text: &str) -> String {
    escape_xml(text, false)
}

/// Escape text for XML attribute values.
fn escape_attr(text: &str) -> String {
    escape_xml(text, true)
}

/// Escape XML special characters.
fn escape_xml(text: &str, escape_quotes: bool) -> String {
    let mut result = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' if escape_quotes => result.push_str("&quot;"),
            '\'' if escape_quotes => result.push_str("&apos;"),
            _ => result.push(ch),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_outer_html_simple() {
        let node = TreeNode::new("p").with_text("Hello");
        assert_eq!(outer_html(&node), "<p>Hello</p>");
    }

    #[test]
    fn test_outer_html_with_children_and_tail() {
        let strong = TreeNode::new("strong").with_text("Bold").with_tail(" text");
        let p = TreeNode::new("p").with_children(vec![strong]);
        assert_eq!(outer_html(&p), "<p><strong>Bold</strong> text</p>");
    }

    #[test]
    fn test_outer_html_self_closing() {
        let br = TreeNode::new("br").with_tail("After");
        let p = TreeNode::new("p").with_text("Before").with_children(vec![br]);
        assert_eq!(outer_html(&p), "<p>Before<br />After</p>");
    }

    #[test]
    fn test_outer_html_with_attributes() {
        let mut attrs = BTreeMap::new();
        attrs.insert("href".to_owned(), "page.html".to_owned());
        let a = TreeNode::new("a").with_attrs(attrs).with_text("link");
        assert_eq!(outer_html(&a), r#"<a href="page.html">link</a>"#);
    }

    #[test]
    fn test_inner_html_skips_own_tag() {
        let strong = TreeNode::new("strong").with_text("Bold").with_tail(" tail");
        let body = TreeNode::new("ac:rich-text-body")
            .with_text("Lead ")
            .with_children(vec![strong]);
        assert_eq!(inner_html(&body), "Lead <strong>Bold</strong> tail");
    }

    #[test]
    fn test_escapes_special_chars() {
        let p = TreeNode::new("p").with_text("a < b & c > d");
        assert_eq!(outer_html(&p), "<p>a &lt; b &amp; c &gt; d</p>");
    }
}
