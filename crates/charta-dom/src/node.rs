//! Node-level helpers shared across the pipeline.
//!
//! Everything here operates on [`kuchiki::NodeRef`] directly so callers can
//! mix these helpers with plain tree traversal.

use kuchiki::traits::TendrilSink;
use kuchiki::{NodeRef, Selectors};

/// Trimmed concatenated text content of a node's subtree.
#[must_use]
pub fn trimmed_text(node: &NodeRef) -> String {
    node.text_contents().trim().to_owned()
}

/// Value of an attribute on an element node.
#[must_use]
pub fn attr(node: &NodeRef, name: &str) -> Option<String> {
    let element = node.as_element()?;
    let attributes = element.attributes.borrow();
    attributes.get(name).map(str::to_owned)
}

/// Set an attribute on an element node. Non-element nodes are ignored.
pub fn set_attr(node: &NodeRef, name: &str, value: &str) {
    if let Some(element) = node.as_element() {
        element
            .attributes
            .borrow_mut()
            .insert(name, value.to_owned());
    }
}

/// Remove an attribute from an element node.
pub fn remove_attr(node: &NodeRef, name: &str) {
    if let Some(element) = node.as_element() {
        element.attributes.borrow_mut().remove(name);
    }
}

/// Whether an element node carries the attribute.
#[must_use]
pub fn has_attr(node: &NodeRef, name: &str) -> bool {
    node.as_element()
        .is_some_and(|element| element.attributes.borrow().contains(name))
}

/// Whether the node or any of its ancestors carries the attribute.
#[must_use]
pub fn has_attr_on_self_or_ancestor(node: &NodeRef, name: &str) -> bool {
    node.inclusive_ancestors().any(|n| has_attr(&n, name))
}

/// Toggle the HTML `hidden` attribute.
pub fn set_hidden(node: &NodeRef, hidden: bool) {
    if hidden {
        set_attr(node, "hidden", "");
    } else {
        remove_attr(node, "hidden");
    }
}

/// Whether the element carries the HTML `hidden` attribute.
#[must_use]
pub fn is_hidden(node: &NodeRef) -> bool {
    has_attr(node, "hidden")
}

/// Nearest inclusive ancestor matching the compiled selector list.
#[must_use]
pub fn closest(node: &NodeRef, selectors: &Selectors) -> Option<NodeRef> {
    node.inclusive_ancestors().find(|candidate| {
        candidate
            .clone()
            .into_element_ref()
            .is_some_and(|element| selectors.matches(&element))
    })
}

/// First element (not text/comment) child of a node.
#[must_use]
pub fn first_element_child(node: &NodeRef) -> Option<NodeRef> {
    node.children().find(|child| child.as_element().is_some())
}

/// Escape text for embedding into an HTML fragment template.
///
/// After the fragment is parsed back, the resulting text node compares equal
/// to the input byte-for-byte, which is what the hidden source region relies
/// on.
#[must_use]
pub fn escape_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Parse an HTML fragment into its top-level nodes.
///
/// The fragment is run through the document parser and the children of the
/// resulting `<body>` are detached and returned, preserving order.
#[must_use]
pub fn parse_fragment(html: &str) -> Vec<NodeRef> {
    let document = kuchiki::parse_html().one(html);
    let Ok(body) = document.select_first("body") else {
        return Vec::new();
    };
    let children: Vec<NodeRef> = body.as_node().children().collect();
    for child in &children {
        child.detach();
    }
    children
}

/// Parse an HTML fragment expected to contain exactly one top-level element.
#[must_use]
pub fn parse_single_element(html: &str) -> Option<NodeRef> {
    parse_fragment(html)
        .into_iter()
        .find(|n| n.as_element().is_some())
}
