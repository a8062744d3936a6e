//! Element properties - values, text, selection and option state.
//!
//! `selected` and `value` behave like DOM properties: writing them never
//! produces a mutation record. `disabled` and `multiple` are attributes and
//! are reported to attribute observers; `text` is character data.

use crate::error::{Error, Result};
use crate::types::{MutationRecord, NodeId, OptionRecord};

use super::mutation;
use super::registry::{with_node, with_node_mut};

// =============================================================================
// Tag Queries
// =============================================================================

/// Lowercase tag name, or `None` for unknown nodes.
pub fn tag_name(id: NodeId) -> Option<String> {
    with_node(id, |node| node.tag_name.clone()).ok()
}

pub fn is_select(id: NodeId) -> bool {
    with_node(id, |node| node.is("select")).unwrap_or(false)
}

pub fn is_option(id: NodeId) -> bool {
    with_node(id, |node| node.is("option")).unwrap_or(false)
}

pub fn is_multiple(id: NodeId) -> bool {
    with_node(id, |node| node.multiple).unwrap_or(false)
}

pub fn set_multiple(id: NodeId, multiple: bool) -> Result<()> {
    let changed = with_node_mut(id, |node| {
        let changed = node.multiple != multiple;
        node.multiple = multiple;
        changed
    })?;
    if changed {
        mutation::notify(MutationRecord::attribute(id, "multiple"));
    }
    Ok(())
}

// =============================================================================
// Value
// =============================================================================

/// Current value.
///
/// A select reports the value of its first selected option, or an empty
/// string when nothing is selected.
pub fn value(id: NodeId) -> Result<String> {
    if is_select(id) {
        let selected = selected_options(id)?;
        return match selected.first() {
            Some(option) => with_node(*option, |node| node.value.clone()),
            None => Ok(String::new()),
        };
    }
    with_node(id, |node| node.value.clone())
}

/// Write a value.
///
/// On a select this selects the first option whose value matches and
/// deselects every other option.
pub fn set_value(id: NodeId, value: &str) -> Result<()> {
    if is_select(id) {
        let mut matched = false;
        for option in options(id)? {
            with_node_mut(option, |node| {
                node.selected = !matched && node.value == value;
                matched |= node.selected;
            })?;
        }
        return Ok(());
    }
    with_node_mut(id, |node| node.value = value.to_string())
}

// =============================================================================
// Text
// =============================================================================

pub fn text(id: NodeId) -> Result<String> {
    with_node(id, |node| node.text.clone())
}

pub fn set_text(id: NodeId, text: &str) -> Result<()> {
    with_node_mut(id, |node| node.text = text.to_string())?;
    mutation::notify(MutationRecord::character_data(id));
    Ok(())
}

// =============================================================================
// Option State
// =============================================================================

pub fn is_selected(id: NodeId) -> bool {
    with_node(id, |node| node.selected).unwrap_or(false)
}

/// Select or deselect an option.
///
/// Selecting an option inside a single select deselects its siblings.
pub fn set_selected(option: NodeId, selected: bool) -> Result<()> {
    let parent = with_node(option, |node| node.is("option").then_some(node.parent))?
        .ok_or(Error::NotAnOption(option))?;

    with_node_mut(option, |node| node.selected = selected)?;

    if let Some(select) = parent.filter(|p| selected && is_select(*p) && !is_multiple(*p)) {
        for sibling in options(select)? {
            if sibling != option {
                with_node_mut(sibling, |node| node.selected = false)?;
            }
        }
    }
    Ok(())
}

pub fn is_disabled(id: NodeId) -> bool {
    with_node(id, |node| node.disabled).unwrap_or(false)
}

pub fn set_disabled(id: NodeId, disabled: bool) -> Result<()> {
    let changed = with_node_mut(id, |node| {
        let changed = node.disabled != disabled;
        node.disabled = disabled;
        changed
    })?;
    if changed {
        mutation::notify(MutationRecord::attribute(id, "disabled"));
    }
    Ok(())
}

// =============================================================================
// Select Options
// =============================================================================

fn ensure_select(id: NodeId) -> Result<()> {
    if with_node(id, |node| node.is("select"))? {
        Ok(())
    } else {
        Err(Error::NotASelect(id))
    }
}

/// Option children of a select, in document order.
pub fn options(select: NodeId) -> Result<Vec<NodeId>> {
    ensure_select(select)?;
    let children = with_node(select, |node| node.children.clone())?;
    Ok(children.into_iter().filter(|c| is_option(*c)).collect())
}

/// Selected option children of a select, in document order.
pub fn selected_options(select: NodeId) -> Result<Vec<NodeId>> {
    Ok(options(select)?.into_iter().filter(|o| is_selected(*o)).collect())
}

/// Snapshot an option's (text, value, disabled, selected) state.
pub fn option_record(option: NodeId) -> Result<OptionRecord> {
    let record = with_node(option, |node| {
        node.is("option").then(|| OptionRecord {
            text: node.text.clone(),
            value: node.value.clone(),
            disabled: node.disabled,
            selected: node.selected,
        })
    })?;
    record.ok_or(Error::NotAnOption(option))
}

/// Snapshot every option of a select, in order.
pub fn option_records(select: NodeId) -> Result<Vec<OptionRecord>> {
    options(select)?.into_iter().map(option_record).collect()
}
