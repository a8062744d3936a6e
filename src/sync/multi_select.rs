//! Multi-select value extraction and application.
//!
//! The engine reaches multi-select state only through [`MultiSelectAccess`],
//! so hosts with their own select semantics can inject a different
//! implementation. [`DomMultiSelect`] is the default, backed by the helper
//! functions in this module.

use crate::dom;
use crate::error::Result;
use crate::types::{Event, EventType, NodeId};

/// Reads and writes the selected-value list of a multi-select.
pub trait MultiSelectAccess {
    /// Selected values, in option order.
    fn extract_selected_values(&self, select: NodeId) -> Result<Vec<String>>;

    /// Select exactly the options whose values are in `values`.
    /// Dispatches `change` on the select unless `mute_event`.
    fn apply_selected_values(
        &self,
        select: NodeId,
        values: &[String],
        mute_event: bool,
    ) -> Result<()>;
}

/// [`MultiSelectAccess`] over the DOM host.
#[derive(Debug, Clone, Copy, Default)]
pub struct DomMultiSelect;

impl MultiSelectAccess for DomMultiSelect {
    fn extract_selected_values(&self, select: NodeId) -> Result<Vec<String>> {
        selected_values(select)
    }

    fn apply_selected_values(
        &self,
        select: NodeId,
        values: &[String],
        mute_event: bool,
    ) -> Result<()> {
        set_selected_values(select, values, mute_event)
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Values of the selected options, in option order.
pub fn selected_values(select: NodeId) -> Result<Vec<String>> {
    dom::selected_options(select)?.into_iter().map(dom::value).collect()
}

/// Values of every option, in option order.
pub fn option_values(select: NodeId) -> Result<Vec<String>> {
    dom::options(select)?.into_iter().map(dom::value).collect()
}

/// Deselect every option. Returns true if anything was selected.
///
/// Dispatches `change` only when something changed and the event is not muted.
pub fn clear_selected_options(select: NodeId, mute_event: bool) -> Result<bool> {
    let selected = dom::selected_options(select)?;
    for option in &selected {
        dom::set_selected(*option, false)?;
    }

    let changed = !selected.is_empty();
    if changed && !mute_event {
        dom::dispatch_event(select, Event::new(EventType::Change))?;
    }
    Ok(changed)
}

/// Select exactly the options whose value appears in `values`.
///
/// Clears the current selection, then scans the options once and stops as
/// soon as every requested value has been matched. Values with no matching
/// option are ignored. Dispatches `change` unless `mute_event`.
pub fn set_selected_values(select: NodeId, values: &[String], mute_event: bool) -> Result<()> {
    let options = dom::options(select)?;
    let mut pending: Vec<&str> = values.iter().map(String::as_str).collect();

    clear_selected_options(select, true)?;

    for option in options {
        if pending.is_empty() {
            break;
        }
        let value = dom::value(option)?;
        if values.iter().any(|v| *v == value) {
            dom::set_selected(option, true)?;
            if let Some(pos) = pending.iter().position(|p| *p == value) {
                pending.remove(pos);
            }
        }
    }

    if !mute_event {
        dom::dispatch_event(select, Event::new(EventType::Change))?;
    }
    Ok(())
}
