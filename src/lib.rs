//! # spark-formsync
//!
//! Two-way synchronization of paired form controls.
//!
//! Two inputs, two selects or two multi-selects are kept mirrored: an edit
//! on either side is copied to the other in exactly one hop, and the
//! engine's own writes never bounce back. Multi-selects additionally
//! propagate structural changes (rebuilt option lists) through mutation
//! observers, either by mirroring the option list or by emitting a
//! `change:selectOnly` notification.
//!
//! ## Architecture
//!
//! ```text
//! pair() → classify → Replicator ⇄ Replicator
//!                   → (multi-select) ObserverBridge ⇄ ObserverBridge → Projector
//! ```
//!
//! The engine runs against the in-memory [`dom`] host. Multi-select state is
//! read and written through the injectable [`MultiSelectAccess`] trait.
//!
//! ## Modules
//!
//! - [`types`] - Node handles, events, mutation records
//! - [`dom`] - In-memory element tree, events, mutation observers
//! - [`sync`] - Classifier, replicators, bridges, projector, pairing
//! - [`error`] - Error type and `Result` alias

pub mod dom;
pub mod error;
pub mod sync;
pub mod types;

// Re-export commonly used items
pub use types::*;

pub use error::{Error, Result};

pub use sync::{
    classify, pair, pair_with, DomMultiSelect, MultiSelectAccess, PairOptions, Pairing,
};
