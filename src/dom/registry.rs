//! Node Registry - Slot allocation for DOM host nodes.
//!
//! Manages the lifecycle of nodes:
//! - Thread-local arena addressed by [`NodeId`]
//! - Free slot pool for O(1) reuse
//! - Recursive release (children first)
//! - Destroy callbacks per node
//!
//! There is one arena per thread. Event delivery and mutation callbacks run
//! synchronously on the thread that owns the nodes.

use std::cell::RefCell;
use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::types::{Cleanup, NodeId, OptionRecord};

use super::{events, mutation};

// =============================================================================
// Node Storage
// =============================================================================

/// Everything the host knows about a single node.
#[derive(Debug, Clone, Default)]
pub(crate) struct NodeData {
    /// Lowercase tag name ("input", "select", "option", "div", ...).
    pub tag_name: String,
    pub multiple: bool,
    /// Raw value. Selects derive theirs from their options instead.
    pub value: String,
    pub text: String,
    pub disabled: bool,
    pub selected: bool,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

impl NodeData {
    fn new(tag_name: &str) -> Self {
        Self {
            tag_name: tag_name.to_ascii_lowercase(),
            ..Self::default()
        }
    }

    pub fn is(&self, tag_name: &str) -> bool {
        self.tag_name == tag_name
    }
}

thread_local! {
    /// Node slots. `None` marks a released slot.
    static NODES: RefCell<Vec<Option<NodeData>>> = const { RefCell::new(Vec::new()) };

    /// Pool of released slots for reuse.
    static FREE_SLOTS: RefCell<Vec<usize>> = const { RefCell::new(Vec::new()) };

    /// Destroy callbacks registered per node.
    static DESTROY_CALLBACKS: RefCell<DestroyCallbacks> = RefCell::new(DestroyCallbacks::default());
}

type DestroyCallback = Box<dyn FnOnce()>;

#[derive(Default)]
struct DestroyCallbacks {
    callbacks: HashMap<NodeId, Vec<(usize, DestroyCallback)>>,
    next_id: usize,
}

/// Read a node. Never call back into the host from `f`.
pub(crate) fn with_node<R>(id: NodeId, f: impl FnOnce(&NodeData) -> R) -> Result<R> {
    NODES.with(|nodes| {
        let nodes = nodes.borrow();
        nodes
            .get(id.0)
            .and_then(Option::as_ref)
            .map(f)
            .ok_or(Error::UnknownNode(id))
    })
}

/// Mutate a node. Never call back into the host from `f`.
pub(crate) fn with_node_mut<R>(id: NodeId, f: impl FnOnce(&mut NodeData) -> R) -> Result<R> {
    NODES.with(|nodes| {
        let mut nodes = nodes.borrow_mut();
        nodes
            .get_mut(id.0)
            .and_then(Option::as_mut)
            .map(f)
            .ok_or(Error::UnknownNode(id))
    })
}

fn allocate(data: NodeData) -> NodeId {
    let reused = FREE_SLOTS.with(|free| free.borrow_mut().pop());
    NODES.with(|nodes| {
        let mut nodes = nodes.borrow_mut();
        match reused {
            Some(slot) => {
                nodes[slot] = Some(data);
                NodeId(slot)
            }
            None => {
                nodes.push(Some(data));
                NodeId(nodes.len() - 1)
            }
        }
    })
}

// =============================================================================
// Node Creation
// =============================================================================

/// Create a detached element with the given tag name.
pub fn create_element(tag_name: &str) -> NodeId {
    allocate(NodeData::new(tag_name))
}

/// Create a detached `<input>` holding `value`.
pub fn create_input(value: &str) -> NodeId {
    let mut data = NodeData::new("input");
    data.value = value.to_string();
    allocate(data)
}

/// Create a detached, empty `<select>`.
pub fn create_select(multiple: bool) -> NodeId {
    let mut data = NodeData::new("select");
    data.multiple = multiple;
    allocate(data)
}

/// Create a detached `<option>` from a record.
pub fn create_option(record: &OptionRecord) -> NodeId {
    let mut data = NodeData::new("option");
    data.text = record.text.clone();
    data.value = record.value.clone();
    data.disabled = record.disabled;
    data.selected = record.selected;
    allocate(data)
}

/// Create a `<select>` already populated with options.
pub fn create_select_with_options(multiple: bool, records: &[OptionRecord]) -> Result<NodeId> {
    let select = create_select(multiple);
    for record in records {
        let option = create_option(record);
        super::append_child(select, option)?;
    }
    Ok(select)
}

// =============================================================================
// Release
// =============================================================================

/// Release a node and its whole subtree.
///
/// Runs destroy callbacks, drops listeners and observers, and detaches the
/// node from its parent without producing a mutation record.
pub fn release_node(id: NodeId) {
    let Ok((parent, children)) = with_node(id, |node| (node.parent, node.children.clone())) else {
        return;
    };

    for child in children {
        release_node(child);
    }

    run_destroy_callbacks(id);
    events::remove_listeners(id);
    mutation::remove_observers(id);

    if let Some(parent) = parent {
        if let Err(error) = with_node_mut(parent, |node| node.children.retain(|c| *c != id)) {
            tracing::warn!(%error, node = %id, "failed to detach released node");
        }
    }

    NODES.with(|nodes| {
        if let Some(slot) = nodes.borrow_mut().get_mut(id.0) {
            *slot = None;
        }
    });
    FREE_SLOTS.with(|free| free.borrow_mut().push(id.0));
}

/// Register a callback to run when `id` is released.
/// Returns cleanup function that unregisters it.
pub fn on_destroy(id: NodeId, callback: impl FnOnce() + 'static) -> Cleanup {
    let key = DESTROY_CALLBACKS.with(|registry| {
        let mut registry = registry.borrow_mut();
        let key = registry.next_id;
        registry.next_id += 1;
        registry
            .callbacks
            .entry(id)
            .or_default()
            .push((key, Box::new(callback)));
        key
    });

    Box::new(move || {
        DESTROY_CALLBACKS.with(|registry| {
            let mut registry = registry.borrow_mut();
            if let Some(list) = registry.callbacks.get_mut(&id) {
                list.retain(|(k, _)| *k != key);
                if list.is_empty() {
                    registry.callbacks.remove(&id);
                }
            }
        });
    })
}

/// Number of destroy callbacks pending on `id`.
pub fn destroy_callback_count(id: NodeId) -> usize {
    DESTROY_CALLBACKS.with(|registry| registry.borrow().callbacks.get(&id).map_or(0, Vec::len))
}

fn run_destroy_callbacks(id: NodeId) {
    let callbacks = DESTROY_CALLBACKS.with(|registry| registry.borrow_mut().callbacks.remove(&id));
    if let Some(callbacks) = callbacks {
        for (_, callback) in callbacks {
            callback();
        }
    }
}

// =============================================================================
// Lookups
// =============================================================================

/// Check if a node is currently allocated.
pub fn is_allocated(id: NodeId) -> bool {
    with_node(id, |_| ()).is_ok()
}

/// Count of live nodes.
pub fn node_count() -> usize {
    NODES.with(|nodes| nodes.borrow().iter().filter(|slot| slot.is_some()).count())
}

// =============================================================================
// Reset (for testing)
// =============================================================================

/// Drop every node, listener and observer on this thread.
pub fn reset_dom() {
    NODES.with(|nodes| nodes.borrow_mut().clear());
    FREE_SLOTS.with(|free| free.borrow_mut().clear());
    DESTROY_CALLBACKS.with(|registry| *registry.borrow_mut() = DestroyCallbacks::default());
    events::reset_events();
    mutation::reset_observers();
}
