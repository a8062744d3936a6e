//! Suppression flags - one-shot echo markers.
//!
//! A flag on a node means "the next change observed on this node came from
//! the engine and must not be propagated again". Flags live in a set owned
//! by the pairing, keyed by node, never on the node itself.

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use crate::types::NodeId;

/// Shared set of armed nodes. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct SuppressionFlags {
    armed: Rc<RefCell<HashSet<NodeId>>>,
}

impl SuppressionFlags {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the next change on `node` as an engine echo.
    pub fn arm(&self, node: NodeId) {
        self.armed.borrow_mut().insert(node);
    }

    /// Consume the flag. Returns true if it was armed.
    pub fn consume(&self, node: NodeId) -> bool {
        self.armed.borrow_mut().remove(&node)
    }

    pub fn is_armed(&self, node: NodeId) -> bool {
        self.armed.borrow().contains(&node)
    }

    /// Drop the flag without treating it as consumed.
    pub fn disarm(&self, node: NodeId) {
        self.armed.borrow_mut().remove(&node);
    }

    pub fn disarm_all(&self) {
        self.armed.borrow_mut().clear();
    }

    pub fn armed_count(&self) -> usize {
        self.armed.borrow().len()
    }
}
