//! Events - Listener registry and synchronous dispatch.
//!
//! # API
//!
//! - `add_event_listener(node, type, fn)` - Subscribe to one event type on a node
//! - `dispatch_event(node, event)` - Deliver an event, bubbling when requested
//! - `last_event` - Most recently dispatched event (reactive)
//!
//! # Example
//!
//! ```ignore
//! use spark_formsync::dom;
//! use spark_formsync::types::{Event, EventType};
//!
//! let cleanup = dom::add_event_listener(input, EventType::Change, |event| {
//!     println!("changed: {:?}", event.target);
//! });
//!
//! dom::dispatch_event(input, Event::bubbling(EventType::Change))?;
//! cleanup();
//! ```

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use spark_signals::{signal, Signal};

use crate::error::{Error, Result};
use crate::types::{Cleanup, Event, EventType, NodeId};

use super::registry::is_allocated;
use super::tree::parent;

/// Listener callback. Shared so dispatch can run it without holding the registry.
pub type EventHandler = Rc<dyn Fn(&Event)>;

// =============================================================================
// STATE
// =============================================================================

thread_local! {
    static LAST_EVENT: Signal<Option<Event>> = signal(None);
}

/// Get the most recently dispatched event
pub fn last_event() -> Option<Event> {
    LAST_EVENT.with(|s| s.get())
}

// =============================================================================
// LISTENER REGISTRY
// =============================================================================

struct Listener {
    id: usize,
    event_type: EventType,
    handler: EventHandler,
}

struct ListenerRegistry {
    listeners: HashMap<NodeId, Vec<Listener>>,
    next_id: usize,
}

impl ListenerRegistry {
    fn new() -> Self {
        Self {
            listeners: HashMap::new(),
            next_id: 0,
        }
    }

    fn next_id(&mut self) -> usize {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn is_registered(&self, node: NodeId, id: usize) -> bool {
        self.listeners
            .get(&node)
            .is_some_and(|list| list.iter().any(|l| l.id == id))
    }
}

thread_local! {
    static REGISTRY: RefCell<ListenerRegistry> = RefCell::new(ListenerRegistry::new());
}

// =============================================================================
// PUBLIC API
// =============================================================================

/// Subscribe to `event_type` events reaching `node`.
/// Returns cleanup function.
pub fn add_event_listener<F>(node: NodeId, event_type: EventType, handler: F) -> Cleanup
where
    F: Fn(&Event) + 'static,
{
    let id = REGISTRY.with(|reg| {
        let mut reg = reg.borrow_mut();
        let id = reg.next_id();
        reg.listeners.entry(node).or_default().push(Listener {
            id,
            event_type,
            handler: Rc::new(handler),
        });
        id
    });

    Box::new(move || {
        REGISTRY.with(|reg| {
            let mut reg = reg.borrow_mut();
            if let Some(list) = reg.listeners.get_mut(&node) {
                list.retain(|l| l.id != id);
                if list.is_empty() {
                    reg.listeners.remove(&node);
                }
            }
        });
    })
}

/// Dispatch an event on `node`.
///
/// Listeners on the target run first, then listeners on each ancestor when
/// the event bubbles. Handlers are snapshotted per node, so a handler may
/// dispatch further events or remove listeners; a listener removed before
/// its turn is skipped. Returns the number of handlers invoked.
pub fn dispatch_event(node: NodeId, mut event: Event) -> Result<usize> {
    if !is_allocated(node) {
        return Err(Error::UnknownNode(node));
    }
    event.target = Some(node);
    LAST_EVENT.with(|s| s.set(Some(event.clone())));

    let mut path = vec![node];
    if event.bubbles {
        let mut current = parent(node);
        while let Some(ancestor) = current {
            path.push(ancestor);
            current = parent(ancestor);
        }
    }

    let mut invoked = 0;
    for current in path {
        event.current_target = Some(current);
        for (id, handler) in snapshot(current, &event.event_type) {
            let live = REGISTRY.with(|reg| reg.borrow().is_registered(current, id));
            if live {
                handler(&event);
                invoked += 1;
            }
        }
    }
    Ok(invoked)
}

fn snapshot(node: NodeId, event_type: &EventType) -> Vec<(usize, EventHandler)> {
    REGISTRY.with(|reg| {
        reg.borrow()
            .listeners
            .get(&node)
            .map(|list| {
                list.iter()
                    .filter(|l| &l.event_type == event_type)
                    .map(|l| (l.id, l.handler.clone()))
                    .collect()
            })
            .unwrap_or_default()
    })
}

/// Number of listeners registered directly on `node`.
pub fn listener_count(node: NodeId) -> usize {
    REGISTRY.with(|reg| reg.borrow().listeners.get(&node).map_or(0, Vec::len))
}

/// Drop every listener on `node`.
/// Called when a node is released to prevent leaks.
pub fn remove_listeners(node: NodeId) {
    REGISTRY.with(|reg| {
        reg.borrow_mut().listeners.remove(&node);
    });
}

/// Reset listener state (for testing)
pub fn reset_events() {
    REGISTRY.with(|reg| {
        let mut reg = reg.borrow_mut();
        reg.listeners.clear();
        reg.next_id = 0;
    });
    LAST_EVENT.with(|s| s.set(None));
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{append_child, create_element, create_input, release_node, reset_dom};
    use std::cell::Cell;

    fn setup() {
        reset_dom();
    }

    #[test]
    fn test_initial_state() {
        setup();
        assert!(last_event().is_none());
    }

    #[test]
    fn test_listener_receives_matching_type() {
        setup();

        let input = create_input("");
        let count = Rc::new(Cell::new(0));
        let count_clone = count.clone();

        let cleanup = add_event_listener(input, EventType::Change, move |event| {
            assert_eq!(event.event_type, EventType::Change);
            count_clone.set(count_clone.get() + 1);
        });

        dispatch_event(input, Event::new(EventType::Keyup)).unwrap();
        assert_eq!(count.get(), 0);

        dispatch_event(input, Event::new(EventType::Change)).unwrap();
        assert_eq!(count.get(), 1);

        cleanup();

        dispatch_event(input, Event::new(EventType::Change)).unwrap();
        assert_eq!(count.get(), 1);
        assert_eq!(listener_count(input), 0);
    }

    #[test]
    fn test_dispatch_sets_target_and_last_event() {
        setup();

        let input = create_input("");
        dispatch_event(input, Event::new(EventType::Input)).unwrap();

        let last = last_event().unwrap();
        assert_eq!(last.event_type, EventType::Input);
        assert_eq!(last.target, Some(input));
    }

    #[test]
    fn test_bubbling() {
        setup();

        let form = create_element("form");
        let input = create_input("");
        append_child(form, input).unwrap();

        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_clone = seen.clone();
        let _cleanup = add_event_listener(form, EventType::Change, move |event| {
            seen_clone.borrow_mut().push((event.target, event.current_target));
        });

        dispatch_event(input, Event::new(EventType::Change)).unwrap();
        assert!(seen.borrow().is_empty());

        dispatch_event(input, Event::bubbling(EventType::Change)).unwrap();
        assert_eq!(*seen.borrow(), vec![(Some(input), Some(form))]);
    }

    #[test]
    fn test_handlers_can_dispatch() {
        setup();

        let a = create_input("");
        let b = create_input("");
        let hits = Rc::new(Cell::new(0));
        let hits_clone = hits.clone();

        let _c1 = add_event_listener(a, EventType::Change, move |_| {
            dispatch_event(b, Event::new(EventType::Change)).unwrap();
        });
        let _c2 = add_event_listener(b, EventType::Change, move |_| {
            hits_clone.set(hits_clone.get() + 1);
        });

        assert_eq!(dispatch_event(a, Event::new(EventType::Change)).unwrap(), 1);
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn test_removed_listener_is_skipped() {
        setup();

        let input = create_input("");
        let late = Rc::new(Cell::new(false));
        let late_clone = late.clone();

        let second: Rc<RefCell<Option<Cleanup>>> = Rc::new(RefCell::new(None));
        let second_clone = second.clone();
        let _first = add_event_listener(input, EventType::Change, move |_| {
            if let Some(cleanup) = second_clone.borrow_mut().take() {
                cleanup();
            }
        });
        *second.borrow_mut() = Some(add_event_listener(input, EventType::Change, move |_| {
            late_clone.set(true);
        }));

        assert_eq!(dispatch_event(input, Event::new(EventType::Change)).unwrap(), 1);
        assert!(!late.get());
    }

    #[test]
    fn test_release_drops_listeners() {
        setup();

        let input = create_input("");
        let _cleanup = add_event_listener(input, EventType::Change, |_| {});
        assert_eq!(listener_count(input), 1);

        release_node(input);
        assert_eq!(listener_count(input), 0);
        assert_eq!(
            dispatch_event(input, Event::new(EventType::Change)),
            Err(Error::UnknownNode(input))
        );
    }
}
