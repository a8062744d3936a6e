//! DOM Host - In-memory element tree the sync engine runs against.
//!
//! The host covers exactly what form synchronization needs:
//! - Registry: node allocation, release, destroy callbacks
//! - Tree: parent/child structure, document fragments
//! - Element: values, text, option selection state
//! - Events: listener registry, bubbling dispatch
//! - Mutation: synchronous mutation observers
//!
//! # Architecture
//!
//! Nodes are NOT objects. They are [`NodeId`](crate::types::NodeId) handles
//! into a thread-local arena:
//!
//! ```text
//! #0: select (multiple, children=[#1, #2])
//! #1: option (value="1", selected=true)
//! #2: option (value="2", selected=false)
//! ```
//!
//! Everything is single-threaded and synchronous. A mutation or dispatch
//! has been fully delivered by the time the call returns.

mod registry;
mod tree;
mod element;
mod events;
mod mutation;

pub use registry::*;
pub use tree::*;
pub use element::*;
pub use events::*;
pub use mutation::*;
