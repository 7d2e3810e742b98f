// ABOUTME: Small DOM helpers shared by the transformer and the controllers.
// ABOUTME: Attachment checks, sibling insertion and attribute snapshots for exact restore.

use dom_query::{Document, NodeId, NodeRef};

/// Resolves an id against the document tree.
pub fn node(doc: &Document, id: NodeId) -> Option<NodeRef<'_>> {
    doc.tree.get(&id)
}

/// True when `node` is still reachable from the document root.
pub fn is_attached(node: &NodeRef) -> bool {
    let mut current = node.parent();
    while let Some(parent) = current {
        if parent.is_document() {
            return true;
        }
        current = parent.parent();
    }
    false
}

/// Resolves `id` and returns it only while attached to the document.
pub fn attached(doc: &Document, id: NodeId) -> Option<NodeRef<'_>> {
    node(doc, id).filter(|n| is_attached(n))
}

/// Inserts `new_node` directly after `anchor`.
pub fn insert_after(anchor: &NodeRef, new_node: &NodeRef) {
    new_node.remove_from_parent();
    if let Some(next) = anchor.next_sibling() {
        next.insert_before(new_node);
    } else if let Some(parent) = anchor.parent() {
        parent.append_child(new_node);
    }
}

/// Sets or clears a boolean attribute.
pub fn set_flag(node: &NodeRef, name: &str, on: bool) {
    if on {
        node.set_attr(name, "");
    } else {
        node.remove_attr(name);
    }
}

/// Adds or removes a single class.
pub fn toggle_class(node: &NodeRef, class: &str, on: bool) {
    if on {
        if !node.has_class(class) {
            node.add_class(class);
        }
    } else if node.has_class(class) {
        node.remove_class(class);
    }
}

/// Previous values of a set of attributes on one node.
///
/// `None` records that the attribute was absent, so restoring removes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttrSnapshot {
    pub node: NodeId,
    values: Vec<(String, Option<String>)>,
}

impl AttrSnapshot {
    pub fn capture(node: &NodeRef, names: &[&str]) -> Self {
        Self {
            node: node.id,
            values: names
                .iter()
                .map(|name| (name.to_string(), node.attr(name).map(|v| v.to_string())))
                .collect(),
        }
    }

    /// Writes the captured values back. Returns false if the node no longer exists.
    pub fn restore(&self, doc: &Document) -> bool {
        let Some(target) = node(doc, self.node) else {
            return false;
        };
        for (name, value) in &self.values {
            match value {
                Some(v) => target.set_attr(name, v),
                None => target.remove_attr(name),
            }
        }
        true
    }
}
