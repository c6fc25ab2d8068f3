//! Tree node representation for parsed storage-format markup.

use std::collections::BTreeMap;

/// Prefix used by Confluence content elements.
pub const AC_PREFIX: &str = "ac:";

/// Node in a parsed markup tree.
///
/// Mirrors the XML shape: direct text, trailing tail text, attributes and
/// ordered children. Namespaced tags keep their literal prefix (`ac:image`),
/// regardless of which parsing pass produced the node.
#[derive(Debug, Clone, Default)]
pub struct TreeNode {
    /// Element tag name, possibly with a namespace prefix.
    pub tag: String,
    /// Direct text content.
    pub text: String,
    /// Text after the element (XML tail).
    pub tail: String,
    /// Element attributes.
    pub attrs: BTreeMap<String, String>,
    /// Child nodes.
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    /// Create a new tree node with the given tag.
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }

    /// Set text content.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Set tail content.
    #[must_use]
    pub fn with_tail(mut self, tail: impl Into<String>) -> Self {
        self.tail = tail.into();
        self
    }

    /// Set attributes.
    #[must_use]
    pub fn with_attrs(mut self, attrs: BTreeMap<String, String>) -> Self {
        self.attrs = attrs;
        self
    }

    /// Set children.
    #[must_use]
    pub fn with_children(mut self, children: Vec<TreeNode>) -> Self {
        self.children = children;
        self
    }

    /// Tag name without its namespace prefix.
    #[must_use]
    pub fn local_name(&self) -> &str {
        self.tag
            .split_once(':')
            .map_or(self.tag.as_str(), |(_, local)| local)
    }

    /// Whether this node is a Confluence `ac:` element.
    #[must_use]
    pub fn is_ac(&self) -> bool {
        self.tag.starts_with(AC_PREFIX)
    }

    /// Whether this node is `ac:structured-macro`.
    #[must_use]
    pub fn is_structured_macro(&self) -> bool {
        self.is_ac() && self.local_name() == "structured-macro"
    }

    /// Attribute lookup that accepts both prefixed and bare names.
    ///
    /// `attr("ac:name")` also matches a bare `name` attribute, which the
    /// lenient parsing pass can produce for malformed input.
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        if let Some(value) = self.attrs.get(name) {
            return Some(value.as_str());
        }
        name.split_once(':')
            .and_then(|(_, local)| self.attrs.get(local))
            .map(String::as_str)
    }

    /// First descendant (depth first, self excluded) with the given local
    /// name, ignoring namespace prefixes.
    #[must_use]
    pub fn find_descendant(&self, local_name: &str) -> Option<&TreeNode> {
        for child in &self.children {
            if child.local_name() == local_name {
                return Some(child);
            }
            if let Some(found) = child.find_descendant(local_name) {
                return Some(found);
            }
        }
        None
    }

    /// All descendants (depth first, self excluded) with the given local
    /// name.
    #[must_use]
    pub fn descendants(&self, local_name: &str) -> Vec<&TreeNode> {
        let mut found = Vec::new();
        self.collect_descendants(local_name, &mut found);
        found
    }

    fn collect_descendants<'a>(&'a self, local_name: &str, found: &mut Vec<&'a TreeNode>) {
        for child in &self.children {
            if child.local_name() == local_name {
                found.push(child);
            }
            child.collect_descendants(local_name, found);
        }
    }

    /// Concatenated text of this node and all descendants, in document order.
    #[must_use]
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        out.push_str(&self.text);
        for child in &self.children {
            child.collect_text(out);
            out.push_str(&child.tail);
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_local_name_strips_prefix() {
        assert_eq!(TreeNode::new("ac:structured-macro").local_name(), "structured-macro");
        assert_eq!(TreeNode::new("p").local_name(), "p");
    }

    #[test]
    fn test_is_structured_macro() {
        assert!(TreeNode::new("ac:structured-macro").is_structured_macro());
        assert!(!TreeNode::new("ac:image").is_structured_macro());
        assert!(!TreeNode::new("structured-macro").is_structured_macro());
    }

    #[test]
    fn test_attr_accepts_bare_fallback() {
        let mut attrs = BTreeMap::new();
        attrs.insert("name".to_owned(), "info".to_owned());
        let node = TreeNode::new("ac:structured-macro").with_attrs(attrs);
        assert_eq!(node.attr("ac:name"), Some("info"));

        let mut attrs = BTreeMap::new();
        attrs.insert("ac:name".to_owned(), "code".to_owned());
        let node = TreeNode::new("ac:structured-macro").with_attrs(attrs);
        assert_eq!(node.attr("ac:name"), Some("code"));
    }

    #[test]
    fn test_find_descendant_depth_first() {
        let inner = TreeNode::new("ri:attachment");
        let param = TreeNode::new("ac:parameter").with_children(vec![inner]);
        let node = TreeNode::new("ac:structured-macro").with_children(vec![param]);

        assert_eq!(node.find_descendant("attachment").unwrap().tag, "ri:attachment");
        assert!(node.find_descendant("url").is_none());
    }

    #[test]
    fn test_text_content_includes_tails() {
        let strong = TreeNode::new("strong").with_text("Bold").with_tail(" text");
        let node = TreeNode::new("p").with_text("Say: ").with_children(vec![strong]);
        assert_eq!(node.text_content(), "Say: Bold text");
    }
}
