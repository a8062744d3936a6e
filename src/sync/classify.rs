//! Element Type Classifier.

use crate::dom;
use crate::types::{ElementKind, NodeId};

/// Categorize a node by tag and `multiple`.
///
/// Unknown or released nodes are `Unsupported`.
pub fn classify(node: NodeId) -> ElementKind {
    let Some(tag) = dom::tag_name(node) else {
        return ElementKind::Unsupported;
    };
    match tag.as_str() {
        "input" => ElementKind::Input,
        "select" if dom::is_multiple(node) => ElementKind::MultiSelect,
        "select" => ElementKind::Select,
        _ => ElementKind::Unsupported,
    }
}
