//! Mutation Observer Bridge - structural change channel for multi-selects.
//!
//! Selection changes made by rebuilding a select's options do not reliably
//! raise `change`. The bridge observes child-list mutations on the source
//! and projects the source's full state onto the recipient.
//!
//! An armed flag on the source marks the mutation as the engine's own
//! rebuild and is consumed. The recipient's flag is armed only in mirror
//! mode, because only mirror mode writes to the recipient.

use std::rc::Rc;

use crate::dom;
use crate::error::Result;
use crate::types::{Cleanup, MutationFlags, NodeId, ProjectionMode};

use super::multi_select::MultiSelectAccess;
use super::projector;
use super::suppression::SuppressionFlags;

/// One direction of structural propagation.
#[derive(Clone)]
pub(crate) struct Bridge {
    pub source: NodeId,
    pub recipient: NodeId,
    pub mode: ProjectionMode,
    pub flags: SuppressionFlags,
    pub access: Rc<dyn MultiSelectAccess>,
}

impl Bridge {
    fn on_mutation(&self) {
        if self.flags.consume(self.source) {
            tracing::trace!(node = %self.source, "suppressed rebuild echo");
            return;
        }
        if let Err(error) = self.project() {
            tracing::warn!(%error, source = %self.source, "structural propagation failed");
        }
    }

    fn project(&self) -> Result<()> {
        let writes_recipient = self.mode == ProjectionMode::Mirror;
        if writes_recipient {
            self.flags.arm(self.recipient);
        }

        let access = self.access.as_ref();
        let result = projector::project(self.source, self.recipient, self.mode, access);
        if result.is_err() && writes_recipient {
            self.flags.disarm(self.recipient);
        }
        result
    }
}

/// Start observing the bridge's source. Returns cleanup function.
pub(crate) fn install(bridge: Bridge) -> Cleanup {
    let source = bridge.source;
    dom::observe(source, MutationFlags::CHILD_LIST, move |_records| bridge.on_mutation())
}
