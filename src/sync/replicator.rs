//! Change Replicator - value propagation driven by change/keyup events.
//!
//! One replicator listens on one source for one [`Trigger`]. When it fires:
//!
//! 1. An armed suppression flag on the source means this event is the echo
//!    of the engine's own write. The flag is consumed and nothing else happens.
//! 2. Otherwise the source's value is copied onto the recipient, the
//!    recipient's flag is armed, and the trigger event is re-dispatched on
//!    the recipient so its other listeners still run. In key tracking mode
//!    an `input` event follows.
//!
//! Multi-selects in a notify-mode direction never write the recipient; the
//! source emits `change:selectOnly` instead.

use std::rc::Rc;

use crate::dom;
use crate::error::{Error, Result};
use crate::types::{Cleanup, ElementKind, Event, EventType, NodeId, ProjectionMode, Trigger};

use super::multi_select::MultiSelectAccess;
use super::projector;
use super::suppression::SuppressionFlags;

/// One direction of value propagation for one trigger.
#[derive(Clone)]
pub(crate) struct Replication {
    pub source: NodeId,
    pub recipient: NodeId,
    pub kind: ElementKind,
    pub trigger: Trigger,
    pub mode: ProjectionMode,
    pub key_tracking: bool,
    pub flags: SuppressionFlags,
    pub access: Rc<dyn MultiSelectAccess>,
}

impl Replication {
    /// Copy the source's state across as if the user had just edited it.
    pub fn propagate(&self) -> Result<()> {
        if self.kind == ElementKind::MultiSelect && self.mode == ProjectionMode::Notify {
            return projector::notify(self.source, self.access.as_ref());
        }
        self.push()
    }

    /// Write the recipient and re-dispatch the trigger there, whatever the mode.
    pub fn push(&self) -> Result<()> {
        push_value(self.source, self.recipient, self.kind, self.access.as_ref())?;

        self.flags.arm(self.recipient);
        if let Err(err) = self.dispatch_on_recipient() {
            self.flags.disarm(self.recipient);
            return Err(err);
        }

        tracing::debug!(
            source = %self.source,
            recipient = %self.recipient,
            trigger = ?self.trigger,
            "propagated value"
        );
        Ok(())
    }

    fn dispatch_on_recipient(&self) -> Result<()> {
        dom::dispatch_event(self.recipient, Event::bubbling(self.trigger.event_type()))?;
        if self.key_tracking {
            dom::dispatch_event(self.recipient, Event::bubbling(EventType::Input))?;
        }
        Ok(())
    }

    fn on_trigger(&self) {
        if self.flags.consume(self.source) {
            tracing::trace!(node = %self.source, trigger = ?self.trigger, "suppressed echo");
            return;
        }
        if let Err(error) = self.propagate() {
            tracing::warn!(%error, source = %self.source, "value propagation failed");
        }
    }
}

/// Attach the replicator to its source. Returns cleanup function.
pub(crate) fn install(replication: Replication) -> Cleanup {
    let source = replication.source;
    let event_type = replication.trigger.event_type();
    dom::add_event_listener(source, event_type, move |_event| replication.on_trigger())
}

/// Copy `source`'s current value onto `recipient` without dispatching.
///
/// Inputs and selects copy the scalar value; multi-selects copy the ordered
/// selected-value list through `access`, muted.
pub fn push_value(
    source: NodeId,
    recipient: NodeId,
    kind: ElementKind,
    access: &dyn MultiSelectAccess,
) -> Result<()> {
    match kind {
        ElementKind::Input | ElementKind::Select => {
            let value = dom::value(source)?;
            dom::set_value(recipient, &value)
        }
        ElementKind::MultiSelect => {
            let values = access.extract_selected_values(source)?;
            access.apply_selected_values(recipient, &values, true)
        }
        ElementKind::Unsupported => Err(Error::UnsupportedElementType {
            node: source,
            tag: dom::tag_name(source).unwrap_or_default(),
        }),
    }
}
