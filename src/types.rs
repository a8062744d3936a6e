//! Core types for spark-formsync.
//!
//! These types define the vocabulary shared by the DOM host and the sync
//! engine: node handles, element kinds, events and mutation records.

use std::fmt;

use serde::{Deserialize, Serialize};

// =============================================================================
// Node Handles
// =============================================================================

/// Handle to a node in the DOM host.
///
/// Handles are slot indices. A released slot is reused by the next node
/// created, so a handle must not outlive the node it names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Raw slot index.
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Cleanup function returned by listeners, observers and pairings.
///
/// Call this to detach and release resources.
pub type Cleanup = Box<dyn FnOnce()>;

// =============================================================================
// Element Kind
// =============================================================================

/// What kind of form control a node is, as far as synchronization cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Input,
    Select,
    MultiSelect,
    Unsupported,
}

impl ElementKind {
    pub fn is_supported(self) -> bool {
        self != Self::Unsupported
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Input => "input",
            Self::Select => "select",
            Self::MultiSelect => "multiSelect",
            Self::Unsupported => "unsupported",
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Option Record
// =============================================================================

/// State of a single `<option>`, copied verbatim when a list is mirrored.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OptionRecord {
    pub text: String,
    pub value: String,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default)]
    pub selected: bool,
}

impl OptionRecord {
    /// Enabled, unselected option.
    pub fn new(text: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            value: value.into(),
            disabled: false,
            selected: false,
        }
    }

    pub fn with_selected(mut self, selected: bool) -> Self {
        self.selected = selected;
        self
    }

    pub fn with_disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }
}

// =============================================================================
// Events
// =============================================================================

/// Name of the custom event emitted in notify mode.
pub const SELECT_ONLY_EVENT: &str = "change:selectOnly";

/// Event type names understood by the host.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EventType {
    Change,
    Keyup,
    Input,
    Custom(String),
}

impl EventType {
    /// The notify-mode `change:selectOnly` event.
    pub fn select_only() -> Self {
        Self::Custom(SELECT_ONLY_EVENT.to_string())
    }

    /// Map an event name to a type. Unknown names become `Custom`.
    pub fn from_name(name: &str) -> Self {
        match name {
            "change" => Self::Change,
            "keyup" => Self::Keyup,
            "input" => Self::Input,
            other => Self::Custom(other.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Change => "change",
            Self::Keyup => "keyup",
            Self::Input => "input",
            Self::Custom(name) => name,
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Payload carried by custom events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EventDetail {
    /// `change:selectOnly` payload: the source's selected values, in order.
    SelectOnly { selected: Vec<String> },
}

/// An event travelling through the host.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub event_type: EventType,
    /// Node the event was dispatched on. Set by dispatch.
    pub target: Option<NodeId>,
    /// Node whose listeners are currently running. Set by dispatch.
    pub current_target: Option<NodeId>,
    pub bubbles: bool,
    pub detail: Option<EventDetail>,
}

impl Event {
    /// Non-bubbling event.
    pub fn new(event_type: EventType) -> Self {
        Self {
            event_type,
            target: None,
            current_target: None,
            bubbles: false,
            detail: None,
        }
    }

    /// Event that bubbles to ancestors.
    pub fn bubbling(event_type: EventType) -> Self {
        Self {
            bubbles: true,
            ..Self::new(event_type)
        }
    }

    /// `change:selectOnly` carrying the selected values.
    pub fn select_only(selected: Vec<String>) -> Self {
        Self {
            detail: Some(EventDetail::SelectOnly { selected }),
            ..Self::new(EventType::select_only())
        }
    }

    /// Selected values from a `change:selectOnly` payload.
    pub fn selected(&self) -> Option<&[String]> {
        match &self.detail {
            Some(EventDetail::SelectOnly { selected }) => Some(selected),
            None => None,
        }
    }
}

// =============================================================================
// Synchronization Vocabulary
// =============================================================================

/// Which event drives a change replicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Trigger {
    /// `change`: programmatic and blur-triggered updates.
    OnChange,
    /// `keyup`: live mirroring while typing.
    OnKeyup,
}

impl Trigger {
    pub fn event_type(self) -> EventType {
        match self {
            Self::OnChange => EventType::Change,
            Self::OnKeyup => EventType::Keyup,
        }
    }
}

/// How multi-select state crosses from source to recipient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProjectionMode {
    /// Rebuild the recipient's option list from the source.
    #[default]
    Mirror,
    /// Leave the recipient alone and emit `change:selectOnly` on the source.
    Notify,
}

impl ProjectionMode {
    pub fn from_emit_on_back(emit_on_back: bool) -> Self {
        if emit_on_back { Self::Notify } else { Self::Mirror }
    }
}

/// One of the two propagation directions of a pairing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Element A to element B.
    Forward,
    /// Element B to element A.
    Back,
}

// =============================================================================
// Mutations
// =============================================================================

bitflags::bitflags! {
    /// What a mutation observer wants to hear about.
    ///
    /// Combine with bitwise OR: `MutationFlags::CHILD_LIST | MutationFlags::SUBTREE`
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct MutationFlags: u8 {
        const CHILD_LIST = 1 << 0;
        const ATTRIBUTES = 1 << 1;
        const CHARACTER_DATA = 1 << 2;
        const SUBTREE = 1 << 3;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    ChildList,
    Attributes,
    CharacterData,
}

impl MutationKind {
    /// Flag an observer needs to receive this kind.
    pub fn flag(self) -> MutationFlags {
        match self {
            Self::ChildList => MutationFlags::CHILD_LIST,
            Self::Attributes => MutationFlags::ATTRIBUTES,
            Self::CharacterData => MutationFlags::CHARACTER_DATA,
        }
    }
}

/// One structural change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationRecord {
    pub kind: MutationKind,
    pub target: NodeId,
    pub added_nodes: Vec<NodeId>,
    pub removed_nodes: Vec<NodeId>,
    pub attribute_name: Option<String>,
}

impl MutationRecord {
    pub fn child_list(
        target: NodeId,
        added_nodes: Vec<NodeId>,
        removed_nodes: Vec<NodeId>,
    ) -> Self {
        Self {
            kind: MutationKind::ChildList,
            target,
            added_nodes,
            removed_nodes,
            attribute_name: None,
        }
    }

    pub fn attribute(target: NodeId, name: &str) -> Self {
        Self {
            kind: MutationKind::Attributes,
            target,
            added_nodes: Vec::new(),
            removed_nodes: Vec::new(),
            attribute_name: Some(name.to_string()),
        }
    }

    pub fn character_data(target: NodeId) -> Self {
        Self {
            kind: MutationKind::CharacterData,
            target,
            added_nodes: Vec::new(),
            removed_nodes: Vec::new(),
            attribute_name: None,
        }
    }
}
