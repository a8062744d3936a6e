//! Tree operations - parent/child structure and document fragments.
//!
//! Every structural change produces exactly one child-list
//! [`MutationRecord`], delivered after the tree has been updated.

use crate::error::{Error, Result};
use crate::types::{MutationRecord, NodeId};

use super::mutation;
use super::registry::{with_node, with_node_mut};

// =============================================================================
// Lookups
// =============================================================================

/// Parent of a node, if attached.
pub fn parent(id: NodeId) -> Option<NodeId> {
    with_node(id, |node| node.parent).ok().flatten()
}

/// Children of a node, in order.
pub fn children(id: NodeId) -> Result<Vec<NodeId>> {
    with_node(id, |node| node.children.clone())
}

/// True if `ancestor` is `id` itself or one of its ancestors.
fn is_inclusive_ancestor(ancestor: NodeId, id: NodeId) -> bool {
    let mut current = Some(id);
    while let Some(node) = current {
        if node == ancestor {
            return true;
        }
        current = parent(node);
    }
    false
}

/// Detach `child` from its current parent, if any. Returns the old parent.
fn detach(child: NodeId) -> Result<Option<NodeId>> {
    let old_parent = with_node_mut(child, |node| node.parent.take())?;
    if let Some(old_parent) = old_parent {
        with_node_mut(old_parent, |node| node.children.retain(|c| *c != child))?;
    }
    Ok(old_parent)
}

// =============================================================================
// Mutations
// =============================================================================

/// Append `child` to `parent`, moving it out of any previous parent.
pub fn append_child(parent: NodeId, child: NodeId) -> Result<()> {
    with_node(parent, |_| ())?;
    with_node(child, |_| ())?;
    if is_inclusive_ancestor(child, parent) {
        return Err(Error::HierarchyRequest {
            parent,
            child,
            reason: "node is an ancestor of the new parent",
        });
    }

    if let Some(old_parent) = detach(child)? {
        mutation::notify(MutationRecord::child_list(old_parent, Vec::new(), vec![child]));
    }

    with_node_mut(child, |node| node.parent = Some(parent))?;
    with_node_mut(parent, |node| node.children.push(child))?;

    mutation::notify(MutationRecord::child_list(parent, vec![child], Vec::new()));
    Ok(())
}

/// Remove `child` from `parent`. The child stays allocated.
pub fn remove_child(parent: NodeId, child: NodeId) -> Result<()> {
    if super::parent(child) != Some(parent) {
        return Err(Error::HierarchyRequest {
            parent,
            child,
            reason: "node is not a child of this parent",
        });
    }

    detach(child)?;
    mutation::notify(MutationRecord::child_list(parent, Vec::new(), vec![child]));
    Ok(())
}

/// Detach every child of `parent`. Returns the removed nodes.
pub fn clear_children(parent: NodeId) -> Result<Vec<NodeId>> {
    replace_children(parent, DocumentFragment::new())
}

/// Replace all children of `parent` with the fragment's nodes in one write.
///
/// Produces a single child-list record listing both the added and the
/// removed nodes. The removed nodes are returned detached but allocated.
pub fn replace_children(parent: NodeId, fragment: DocumentFragment) -> Result<Vec<NodeId>> {
    with_node(parent, |_| ())?;
    for &node in &fragment.nodes {
        if is_inclusive_ancestor(node, parent) {
            return Err(Error::HierarchyRequest {
                parent,
                child: node,
                reason: "fragment contains an ancestor of the target",
            });
        }
    }

    let removed = with_node_mut(parent, |node| std::mem::take(&mut node.children))?;
    for &old in &removed {
        with_node_mut(old, |node| node.parent = None)?;
    }

    for &new in &fragment.nodes {
        with_node_mut(new, |node| node.parent = Some(parent))?;
    }
    with_node_mut(parent, |node| node.children = fragment.nodes.clone())?;

    mutation::notify(MutationRecord::child_list(parent, fragment.nodes, removed.clone()));
    Ok(removed)
}

// =============================================================================
// Document Fragment
// =============================================================================

/// Off-document container used to batch node insertion.
///
/// Nodes collected in a fragment are not attached anywhere until the
/// fragment is handed to [`replace_children`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentFragment {
    nodes: Vec<NodeId>,
}

impl DocumentFragment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a detached node to the fragment.
    pub fn append(&mut self, node: NodeId) -> Result<()> {
        if with_node(node, |n| n.parent)?.is_some() {
            return Err(Error::HierarchyRequest {
                parent: node,
                child: node,
                reason: "fragment nodes must be detached",
            });
        }
        if !self.nodes.contains(&node) {
            self.nodes.push(node);
        }
        Ok(())
    }

    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{create_element, create_input, observe, reset_dom};
    use crate::types::{MutationFlags, MutationKind};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn record_mutations(node: NodeId) -> (Rc<RefCell<Vec<MutationRecord>>>, crate::types::Cleanup) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_clone = seen.clone();
        let cleanup = observe(node, MutationFlags::CHILD_LIST, move |records| {
            seen_clone.borrow_mut().extend_from_slice(records);
        });
        (seen, cleanup)
    }

    #[test]
    fn test_append_and_remove() {
        reset_dom();

        let form = create_element("form");
        let input = create_input("");

        append_child(form, input).unwrap();
        assert_eq!(children(form).unwrap(), vec![input]);
        assert_eq!(parent(input), Some(form));

        remove_child(form, input).unwrap();
        assert!(children(form).unwrap().is_empty());
        assert_eq!(parent(input), None);
    }

    #[test]
    fn test_append_moves_between_parents() {
        reset_dom();

        let first = create_element("div");
        let second = create_element("div");
        let input = create_input("");

        append_child(first, input).unwrap();
        append_child(second, input).unwrap();

        assert!(children(first).unwrap().is_empty());
        assert_eq!(children(second).unwrap(), vec![input]);
    }

    #[test]
    fn test_append_rejects_cycles() {
        reset_dom();

        let outer = create_element("div");
        let inner = create_element("div");
        append_child(outer, inner).unwrap();

        assert!(matches!(append_child(inner, outer), Err(Error::HierarchyRequest { .. })));
        assert!(matches!(append_child(outer, outer), Err(Error::HierarchyRequest { .. })));
    }

    #[test]
    fn test_remove_child_requires_parent() {
        reset_dom();

        let form = create_element("form");
        let input = create_input("");
        assert!(remove_child(form, input).is_err());
    }

    #[test]
    fn test_replace_children_single_record() {
        reset_dom();

        let list = create_element("ul");
        let old = create_element("li");
        append_child(list, old).unwrap();

        let (seen, _cleanup) = record_mutations(list);

        let mut fragment = DocumentFragment::new();
        let a = create_element("li");
        let b = create_element("li");
        fragment.append(a).unwrap();
        fragment.append(b).unwrap();
        assert_eq!(fragment.len(), 2);

        let removed = replace_children(list, fragment).unwrap();

        assert_eq!(removed, vec![old]);
        assert_eq!(children(list).unwrap(), vec![a, b]);
        assert_eq!(parent(old), None);

        let seen = seen.borrow();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].kind, MutationKind::ChildList);
        assert_eq!(seen[0].added_nodes, vec![a, b]);
        assert_eq!(seen[0].removed_nodes, vec![old]);
    }

    #[test]
    fn test_fragment_rejects_attached_nodes() {
        reset_dom();

        let list = create_element("ul");
        let item = create_element("li");
        append_child(list, item).unwrap();

        let mut fragment = DocumentFragment::new();
        assert!(fragment.append(item).is_err());
        assert!(fragment.is_empty());
    }

    #[test]
    fn test_clear_children_reports_removed() {
        reset_dom();

        let list = create_element("ul");
        let item = create_element("li");
        append_child(list, item).unwrap();

        let (seen, _cleanup) = record_mutations(list);
        assert_eq!(clear_children(list).unwrap(), vec![item]);
        assert_eq!(seen.borrow().len(), 1);
    }
}
