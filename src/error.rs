//! Error types for spark-formsync.

use crate::types::{ElementKind, NodeId};

/// Everything that can go wrong while pairing or touching the DOM host.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Node is not an input, select or multi-select
    #[error("unsupported element type: {node} <{tag}> cannot be synchronized")]
    UnsupportedElementType { node: NodeId, tag: String },

    /// Multi-selects can only pair with multi-selects
    #[error("mismatched element types: {a} is {kind_a}, {b} is {kind_b}")]
    MismatchedElementTypes {
        a: NodeId,
        kind_a: ElementKind,
        b: NodeId,
        kind_b: ElementKind,
    },

    /// Both sides of a pairing are the same node
    #[error("cannot pair {0} with itself")]
    SelfPairing(NodeId),

    /// Node was never allocated or has been released
    #[error("unknown node {0}")]
    UnknownNode(NodeId),

    #[error("{0} is not a select element")]
    NotASelect(NodeId),

    #[error("{0} is not an option element")]
    NotAnOption(NodeId),

    /// Tree operation would break the hierarchy
    #[error("cannot place {child} under {parent}: {reason}")]
    HierarchyRequest {
        parent: NodeId,
        child: NodeId,
        reason: &'static str,
    },

    /// Pair options could not be parsed
    #[error("invalid pair options: {0}")]
    InvalidOptions(String),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
