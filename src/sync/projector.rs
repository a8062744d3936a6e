//! Multi-Select State Projector.
//!
//! Carries a multi-select's full state across a pairing in one of two modes:
//!
//! - **Mirror**: the recipient's children are discarded and replaced, in a
//!   single write, by fresh options copying each source option's text,
//!   value, disabled and selected state.
//! - **Notify**: the recipient is left untouched; `change:selectOnly` with
//!   the source's selected values is dispatched on the source instead.

use crate::dom::{self, DocumentFragment};
use crate::error::{Error, Result};
use crate::types::{Event, NodeId, ProjectionMode};

use super::multi_select::MultiSelectAccess;

/// Project `source` onto `recipient` using `mode`.
pub fn project(
    source: NodeId,
    recipient: NodeId,
    mode: ProjectionMode,
    access: &dyn MultiSelectAccess,
) -> Result<()> {
    match mode {
        ProjectionMode::Mirror => mirror(source, recipient),
        ProjectionMode::Notify => notify(source, access),
    }
}

/// Rebuild `recipient`'s option list from `source`.
pub fn mirror(source: NodeId, recipient: NodeId) -> Result<()> {
    if !dom::is_select(recipient) {
        return Err(Error::NotASelect(recipient));
    }
    let records = dom::option_records(source)?;

    let mut fragment = DocumentFragment::new();
    for record in &records {
        fragment.append(dom::create_option(record))?;
    }

    let discarded = dom::replace_children(recipient, fragment)?;
    for node in discarded {
        dom::release_node(node);
    }

    tracing::debug!(%source, %recipient, options = records.len(), "mirrored option list");
    Ok(())
}

/// Emit `change:selectOnly` on `source` with its selected values.
pub fn notify(source: NodeId, access: &dyn MultiSelectAccess) -> Result<()> {
    let selected = access.extract_selected_values(source)?;
    tracing::debug!(%source, ?selected, "emitting select-only notification");
    dom::dispatch_event(source, Event::select_only(selected))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{
        add_event_listener, create_input, create_select_with_options, node_count, option_records,
        reset_dom,
    };
    use crate::sync::multi_select::DomMultiSelect;
    use crate::types::{EventType, OptionRecord};
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn source_records() -> Vec<OptionRecord> {
        vec![
            OptionRecord::new("One", "1").with_selected(true),
            OptionRecord::new("Two", "2").with_disabled(true),
            OptionRecord::new("Three", "3").with_selected(true),
        ]
    }

    #[test]
    fn test_mirror_copies_every_field() {
        reset_dom();

        let source = create_select_with_options(true, &source_records()).unwrap();
        let old = [OptionRecord::new("Old", "old")];
        let recipient = create_select_with_options(true, &old).unwrap();

        mirror(source, recipient).unwrap();
        assert_eq!(option_records(recipient).unwrap(), source_records());
    }

    #[test]
    fn test_mirror_releases_discarded_options() {
        reset_dom();

        let source = create_select_with_options(true, &source_records()).unwrap();
        let recipient = create_select_with_options(true, &source_records()).unwrap();
        let before = node_count();

        mirror(source, recipient).unwrap();
        assert_eq!(node_count(), before);
    }

    #[test]
    fn test_mirror_requires_select_recipient() {
        reset_dom();

        let source = create_select_with_options(true, &source_records()).unwrap();
        let input = create_input("");
        assert_eq!(mirror(source, input), Err(Error::NotASelect(input)));
    }

    #[test]
    fn test_notify_leaves_recipient_alone() {
        reset_dom();

        let source = create_select_with_options(true, &source_records()).unwrap();
        let keep = [OptionRecord::new("Keep", "keep")];
        let recipient = create_select_with_options(true, &keep).unwrap();
        let recipient_options = dom::children(recipient).unwrap();

        let payloads = Rc::new(RefCell::new(Vec::new()));
        let payloads_clone = payloads.clone();
        let _cleanup = add_event_listener(source, EventType::select_only(), move |event| {
            payloads_clone.borrow_mut().push(event.selected().map(<[String]>::to_vec));
        });

        project(source, recipient, ProjectionMode::Notify, &DomMultiSelect).unwrap();

        assert_eq!(*payloads.borrow(), vec![Some(vec!["1".to_string(), "3".to_string()])]);
        assert_eq!(dom::children(recipient).unwrap(), recipient_options);
    }
}
