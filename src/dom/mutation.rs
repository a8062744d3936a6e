//! Mutation Observers - structural change notification.
//!
//! Observers subscribe to a node with a set of [`MutationFlags`]. Records are
//! delivered synchronously, once per mutating operation, after the tree has
//! been updated. `SUBTREE` observers also see records from descendants.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::types::{Cleanup, MutationFlags, MutationRecord, NodeId};

use super::tree::parent;

/// Observer callback.
pub type MutationCallback = Rc<dyn Fn(&[MutationRecord])>;

struct Observer {
    id: usize,
    flags: MutationFlags,
    callback: MutationCallback,
}

struct ObserverRegistry {
    observers: HashMap<NodeId, Vec<Observer>>,
    next_id: usize,
}

thread_local! {
    static REGISTRY: RefCell<ObserverRegistry> = RefCell::new(ObserverRegistry {
        observers: HashMap::new(),
        next_id: 0,
    });
}

/// Observe mutations on `node` matching `flags`.
/// Returns cleanup function.
pub fn observe<F>(node: NodeId, flags: MutationFlags, callback: F) -> Cleanup
where
    F: Fn(&[MutationRecord]) + 'static,
{
    let id = REGISTRY.with(|reg| {
        let mut reg = reg.borrow_mut();
        let id = reg.next_id;
        reg.next_id += 1;
        reg.observers.entry(node).or_default().push(Observer {
            id,
            flags,
            callback: Rc::new(callback),
        });
        id
    });

    Box::new(move || {
        REGISTRY.with(|reg| {
            let mut reg = reg.borrow_mut();
            if let Some(list) = reg.observers.get_mut(&node) {
                list.retain(|o| o.id != id);
                if list.is_empty() {
                    reg.observers.remove(&node);
                }
            }
        });
    })
}

/// Deliver a record to every interested observer.
pub(crate) fn notify(record: MutationRecord) {
    let kind = record.kind.flag();

    let mut interested: Vec<MutationCallback> = Vec::new();
    let mut current = Some(record.target);
    let mut is_target = true;
    REGISTRY.with(|reg| {
        let reg = reg.borrow();
        while let Some(node) = current {
            if let Some(list) = reg.observers.get(&node) {
                interested.extend(
                    list.iter()
                        .filter(|o| o.flags.contains(kind))
                        .filter(|o| is_target || o.flags.contains(MutationFlags::SUBTREE))
                        .map(|o| o.callback.clone()),
                );
            }
            is_target = false;
            current = parent(node);
        }
    });

    let records = [record];
    for callback in interested {
        callback(&records);
    }
}

/// Number of observers attached to `node`.
pub fn observer_count(node: NodeId) -> usize {
    REGISTRY.with(|reg| reg.borrow().observers.get(&node).map_or(0, Vec::len))
}

/// Drop every observer on `node`.
pub fn remove_observers(node: NodeId) {
    REGISTRY.with(|reg| {
        reg.borrow_mut().observers.remove(&node);
    });
}

/// Reset observer state (for testing)
pub fn reset_observers() {
    REGISTRY.with(|reg| {
        let mut reg = reg.borrow_mut();
        reg.observers.clear();
        reg.next_id = 0;
    });
}
