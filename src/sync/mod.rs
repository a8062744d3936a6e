//! Sync Engine - two-way mirroring of paired form controls.
//!
//! - **Classify** - input / select / multi-select / unsupported
//! - **Replicator** - change and keyup driven value propagation
//! - **Observer bridge** - child-list driven propagation for multi-selects
//! - **Projector** - mirror or notify projection of multi-select state
//! - **Multi-select** - injectable extractor/applier and DOM helpers
//! - **Pairing** - `pair()` / `unpair()`
//!
//! # Echo suppression
//!
//! Each direction runs `IDLE → APPLYING → IDLE`. Before the engine writes
//! to a recipient it arms the recipient's one-shot suppression flag; the
//! recipient's own listener consumes the flag instead of propagating back.
//! Delivery is synchronous on one thread, so two APPLYING states for the
//! same pairing never overlap.

mod classify;
mod diagnostics;
mod multi_select;
mod observer_bridge;
mod pairing;
mod projector;
mod replicator;
mod suppression;

pub use classify::classify;
pub use diagnostics::{diagnostics, report, reset_diagnostics, take_diagnostics};
pub use multi_select::{
    clear_selected_options, option_values, selected_values, set_selected_values,
    DomMultiSelect, MultiSelectAccess,
};
pub use pairing::{pair, pair_with, PairOptions, Pairing};
pub use projector::{mirror, notify, project};
pub use replicator::push_value;
pub use suppression::SuppressionFlags;
