//! Lenient HTML fallback parsing of storage-format fragments.
//!
//! When the strict XML pass rejects a fragment, the same text is parsed as
//! HTML and converted into the [`TreeNode`] shape the rest of the pipeline
//! expects. Namespaced tags survive as literal `ac:*`/`ri:*` names because
//! the HTML parser treats the colon as part of the tag name.

use kuchikikiki::{NodeRef, parse_html};
use tendril::TendrilSink;

use super::tree::TreeNode;

/// Parse a fragment leniently into a synthetic root [`TreeNode`].
#[must_use]
pub fn parse(fragment: &str) -> TreeNode {
    let document = parse_html().one(fragment);
    let mut root = TreeNode::new("root");

    if let Ok(body) = document.select_first("body") {
        for child in body.as_node().children() {
            convert_into(&child, &mut root);
        }
    }

    root
}

/// Convert a DOM node and append it (or its text) to the parent tree node.
fn convert_into(node: &NodeRef, parent: &mut TreeNode) {
    if let Some(text) = node.as_text() {
        append_text(parent, &text.borrow());
        return;
    }

    let Some(element) = node.as_element() else {
        // Comments, processing instructions and the like
        return;
    };

    let tag: &str = &element.name.local;
    let mut tree_node = TreeNode::new(tag);
    for (name, attribute) in &element.attributes.borrow().map {
        let attr_name: &str = &name.local;
        tree_node
            .attrs
            .insert(attr_name.to_owned(), attribute.value.clone());
    }

    for child in node.children() {
        convert_into(&child, &mut tree_node);
    }

    parent.children.push(tree_node);
}

/// Append text to node's text or last child's tail.
fn append_text(node: &mut TreeNode, text: &str) {
    if let Some(last_child) = node.children.last_mut() {
        last_child.tail.push_str(text);
    } else {
        node.text.push_str(text);
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_recovers_unclosed_tags() {
        let root = parse("<p>Unclosed<br>After</p>");

        let p_node = &root.children[0];
        assert_eq!(p_node.tag, "p");
        assert_eq!(p_node.text, "Unclosed");
        assert_eq!(p_node.children[0].tag, "br");
        assert_eq!(p_node.children[0].tail, "After");
    }

    #[test]
    fn test_namespaced_tags_survive_literally() {
        let root = parse(
            r#"<ac:structured-macro ac:name="info"><ac:rich-text-body><p>x</p></ac:rich-text-body></ac:structured-macro>"#,
        );

        let macro_node = &root.children[0];
        assert!(macro_node.is_structured_macro());
        assert_eq!(macro_node.attr("ac:name"), Some("info"));
        assert!(macro_node.find_descendant("rich-text-body").is_some());
    }

    #[test]
    fn test_text_and_tails() {
        let root = parse("lead <em>mid</em> tail");

        assert_eq!(root.text, "lead ");
        assert_eq!(root.children[0].tag, "em");
        assert_eq!(root.children[0].text, "mid");
        assert_eq!(root.children[0].tail, " tail");
    }

    #[test]
    fn test_empty_fragment_yields_empty_root() {
        let root = parse("");
        assert!(root.children.is_empty());
        assert!(root.text.trim().is_empty());
    }
}
