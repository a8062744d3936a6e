//! Pairing Controller - the entry point of the sync engine.
//!
//! `pair(a, b, options)` classifies both elements and wires, in both
//! directions:
//! - a change replicator (and a keyup replicator in key tracking mode)
//! - for multi-selects, a mutation observer bridge
//!
//! Wiring is all-or-nothing: an unsupported, mismatched or self pair reports
//! a diagnostic and attaches nothing.
//!
//! Releasing either element tears the whole pairing down.
//!
//! # Initial state
//!
//! Only A is inspected at setup. If A holds a value, it is written to B once
//! and `change` is re-dispatched on B, in every projection mode. B's initial
//! value never flows to A.
//!
//! # Example
//!
//! ```ignore
//! use spark_formsync::{dom, pair, PairOptions};
//!
//! let a = dom::create_input("");
//! let b = dom::create_input("hello");
//!
//! let pairing = pair(a, b, PairOptions::new().with_key_tracking(true))?;
//! // ... edits on either side now mirror to the other ...
//! pairing.unpair();
//! ```

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::dom;
use crate::error::{Error, Result};
use crate::types::{Cleanup, Direction, ElementKind, NodeId, ProjectionMode, Trigger};

use super::classify::classify;
use super::diagnostics;
use super::multi_select::{DomMultiSelect, MultiSelectAccess};
use super::observer_bridge::{self, Bridge};
use super::replicator::{self, Replication};
use super::suppression::SuppressionFlags;

// =============================================================================
// Options
// =============================================================================

/// Pairing configuration.
///
/// Deserializes from camelCase JSON; missing keys take their defaults:
///
/// ```json
/// { "emitOnBack": true, "listenToKeyChanges": false }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PairOptions {
    /// Multi-select projection: notify (true) or mirror (false).
    pub emit_on_back: bool,
    /// Also mirror on `keyup`, and fire `input` after each propagated event.
    pub listen_to_key_changes: bool,
    /// Override the A → B projection mode.
    pub forward_mode: Option<ProjectionMode>,
    /// Override the B → A projection mode.
    pub back_mode: Option<ProjectionMode>,
}

impl PairOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_emit_on_back(mut self, emit_on_back: bool) -> Self {
        self.emit_on_back = emit_on_back;
        self
    }

    pub fn with_key_tracking(mut self, listen_to_key_changes: bool) -> Self {
        self.listen_to_key_changes = listen_to_key_changes;
        self
    }

    /// Use different projection modes per direction.
    pub fn with_modes(mut self, forward: ProjectionMode, back: ProjectionMode) -> Self {
        self.forward_mode = Some(forward);
        self.back_mode = Some(back);
        self
    }

    /// Projection mode used in `direction`.
    pub fn mode(&self, direction: Direction) -> ProjectionMode {
        let explicit = match direction {
            Direction::Forward => self.forward_mode,
            Direction::Back => self.back_mode,
        };
        explicit.unwrap_or(ProjectionMode::from_emit_on_back(self.emit_on_back))
    }

    /// Parse options from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::InvalidOptions(e.to_string()))
    }

    fn triggers(&self) -> &'static [Trigger] {
        if self.listen_to_key_changes {
            &[Trigger::OnChange, Trigger::OnKeyup]
        } else {
            &[Trigger::OnChange]
        }
    }
}

// =============================================================================
// Pairing
// =============================================================================

/// Cleanups shared between the handle and the destroy hooks.
type SharedCleanups = Rc<RefCell<Vec<Cleanup>>>;

/// Run and forget every cleanup. False if there were none left.
fn run_cleanups(cleanups: &SharedCleanups) -> bool {
    let drained: Vec<Cleanup> = cleanups.borrow_mut().drain(..).collect();
    if drained.is_empty() {
        return false;
    }
    for cleanup in drained {
        cleanup();
    }
    true
}

/// A live pairing of two form controls.
///
/// Dropping the handle releases every listener and observer the pairing
/// installed, exactly like [`Pairing::unpair`]. Releasing either element
/// does the same.
#[must_use = "dropping a Pairing unpairs the elements"]
pub struct Pairing {
    element_a: NodeId,
    element_b: NodeId,
    kind: ElementKind,
    options: PairOptions,
    flags: SuppressionFlags,
    cleanups: SharedCleanups,
}

impl Pairing {
    pub fn element_a(&self) -> NodeId {
        self.element_a
    }

    pub fn element_b(&self) -> NodeId {
        self.element_b
    }

    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    pub fn options(&self) -> PairOptions {
        self.options
    }

    /// True while `node` carries an unconsumed suppression flag.
    pub fn is_suppressed(&self, node: NodeId) -> bool {
        self.flags.is_armed(node)
    }

    /// False once unpaired or once either element has been released.
    pub fn is_active(&self) -> bool {
        !self.cleanups.borrow().is_empty()
    }

    /// Detach both directions.
    pub fn unpair(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if !run_cleanups(&self.cleanups) {
            return;
        }
        self.flags.disarm_all();
        tracing::debug!(a = %self.element_a, b = %self.element_b, "unpaired");
    }
}

impl Drop for Pairing {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for Pairing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pairing")
            .field("element_a", &self.element_a)
            .field("element_b", &self.element_b)
            .field("kind", &self.kind)
            .field("options", &self.options)
            .field("installed", &self.cleanups.borrow().len())
            .finish()
    }
}

// =============================================================================
// Pair
// =============================================================================

/// Pair two elements using the DOM-backed multi-select access.
pub fn pair(element_a: NodeId, element_b: NodeId, options: PairOptions) -> Result<Pairing> {
    pair_with(element_a, element_b, options, Rc::new(DomMultiSelect))
}

/// Pair two elements with an injected multi-select extractor/applier.
pub fn pair_with(
    element_a: NodeId,
    element_b: NodeId,
    options: PairOptions,
    access: Rc<dyn MultiSelectAccess>,
) -> Result<Pairing> {
    let kind = match resolve_kind(element_a, element_b) {
        Ok(kind) => kind,
        Err(error) => {
            diagnostics::report(&error);
            return Err(error);
        }
    };

    let flags = SuppressionFlags::new();
    let mut cleanups: Vec<Cleanup> = Vec::new();

    let directions = [
        (element_a, element_b, Direction::Forward),
        (element_b, element_a, Direction::Back),
    ];

    if kind == ElementKind::MultiSelect {
        for (source, recipient, direction) in directions {
            cleanups.push(observer_bridge::install(Bridge {
                source,
                recipient,
                mode: options.mode(direction),
                flags: flags.clone(),
                access: access.clone(),
            }));
        }
    }

    let replication =
        |source: NodeId, recipient: NodeId, direction: Direction, trigger: Trigger| Replication {
            source,
            recipient,
            kind,
            trigger,
            mode: options.mode(direction),
            key_tracking: options.listen_to_key_changes,
            flags: flags.clone(),
            access: access.clone(),
        };

    for &trigger in options.triggers() {
        for (source, recipient, direction) in directions {
            let wiring = replication(source, recipient, direction, trigger);
            cleanups.push(replicator::install(wiring));
        }
    }

    let initial = replication(element_a, element_b, Direction::Forward, Trigger::OnChange);

    let cleanups: SharedCleanups = Rc::new(RefCell::new(cleanups));
    for node in [element_a, element_b] {
        let shared = cleanups.clone();
        let flags = flags.clone();
        let hook = dom::on_destroy(node, move || {
            if run_cleanups(&shared) {
                tracing::debug!(%node, "paired element released, unpaired");
            }
            flags.disarm_all();
        });
        cleanups.borrow_mut().push(hook);
    }

    let pairing = Pairing {
        element_a,
        element_b,
        kind,
        options,
        flags,
        cleanups,
    };
    tracing::debug!(a = %element_a, b = %element_b, %kind, ?options, "paired");

    if let Err(error) = initial_sync(&initial) {
        diagnostics::report(&error);
        return Err(error);
    }
    Ok(pairing)
}

/// Push A's non-empty value to B, ignoring the projection mode.
fn initial_sync(initial: &Replication) -> Result<()> {
    if has_initial_value(initial.source, initial.kind, initial.access.as_ref())? {
        initial.push()?;
    }
    Ok(())
}

/// Classify both sides. Multi-selects only pair with multi-selects.
fn resolve_kind(a: NodeId, b: NodeId) -> Result<ElementKind> {
    if a == b {
        return Err(Error::SelfPairing(a));
    }

    let kind_a = classify(a);
    let kind_b = classify(b);

    for (node, kind) in [(a, kind_a), (b, kind_b)] {
        if !kind.is_supported() {
            return Err(Error::UnsupportedElementType {
                node,
                tag: dom::tag_name(node).unwrap_or_default(),
            });
        }
    }

    let multi_a = kind_a == ElementKind::MultiSelect;
    let multi_b = kind_b == ElementKind::MultiSelect;
    if multi_a != multi_b {
        return Err(Error::MismatchedElementTypes { a, kind_a, b, kind_b });
    }
    Ok(kind_a)
}

fn has_initial_value(
    node: NodeId,
    kind: ElementKind,
    access: &dyn MultiSelectAccess,
) -> Result<bool> {
    if kind == ElementKind::MultiSelect {
        Ok(!access.extract_selected_values(node)?.is_empty())
    } else {
        Ok(!dom::value(node)?.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{
        create_element, create_input, create_select, destroy_callback_count, listener_count,
        observer_count, reset_dom,
    };
    use crate::sync::diagnostics::{diagnostics, reset_diagnostics};
    use crate::types::{Event, EventType};

    fn setup() {
        reset_dom();
        reset_diagnostics();
    }

    #[test]
    fn test_options_defaults() {
        let options = PairOptions::new();
        assert!(!options.emit_on_back);
        assert!(!options.listen_to_key_changes);
        assert_eq!(options.mode(Direction::Forward), ProjectionMode::Mirror);
        assert_eq!(options.mode(Direction::Back), ProjectionMode::Mirror);
    }

    #[test]
    fn test_options_modes() {
        let notify = PairOptions::new().with_emit_on_back(true);
        assert_eq!(notify.mode(Direction::Forward), ProjectionMode::Notify);
        assert_eq!(notify.mode(Direction::Back), ProjectionMode::Notify);

        let mixed = notify.with_modes(ProjectionMode::Mirror, ProjectionMode::Notify);
        assert_eq!(mixed.mode(Direction::Forward), ProjectionMode::Mirror);
        assert_eq!(mixed.mode(Direction::Back), ProjectionMode::Notify);
    }

    #[test]
    fn test_options_from_json() {
        let json = r#"{"emitOnBack": true, "listenToKeyChanges": true}"#;
        let options = PairOptions::from_json(json).unwrap();
        assert_eq!(options, PairOptions::new().with_emit_on_back(true).with_key_tracking(true));

        let partial = PairOptions::from_json(r#"{"backMode": "notify"}"#).unwrap();
        assert_eq!(partial.mode(Direction::Forward), ProjectionMode::Mirror);
        assert_eq!(partial.mode(Direction::Back), ProjectionMode::Notify);

        assert!(matches!(PairOptions::from_json("[1, 2]"), Err(Error::InvalidOptions(_))));
    }

    #[test]
    fn test_listener_layout() {
        setup();

        let a = create_input("");
        let b = create_input("");
        let pairing = pair(a, b, PairOptions::new()).unwrap();
        assert_eq!(pairing.kind(), ElementKind::Input);
        assert_eq!((listener_count(a), listener_count(b)), (1, 1));
        drop(pairing);

        let keyed = pair(a, b, PairOptions::new().with_key_tracking(true)).unwrap();
        assert_eq!((listener_count(a), listener_count(b)), (2, 2));
        assert_eq!((observer_count(a), observer_count(b)), (0, 0));
        keyed.unpair();

        assert_eq!((listener_count(a), listener_count(b)), (0, 0));
    }

    #[test]
    fn test_multi_select_installs_observers() {
        setup();

        let a = create_select(true);
        let b = create_select(true);
        let pairing = pair(a, b, PairOptions::new()).unwrap();

        assert_eq!((observer_count(a), observer_count(b)), (1, 1));
        pairing.unpair();
        assert_eq!((observer_count(a), observer_count(b)), (0, 0));
    }

    #[test]
    fn test_unsupported_reports_once_and_wires_nothing() {
        setup();

        let div = create_element("div");
        let input = create_input("x");

        let result = pair(div, input, PairOptions::new());
        assert!(matches!(result, Err(Error::UnsupportedElementType { node, .. }) if node == div));
        assert_eq!(diagnostics().len(), 1);
        assert_eq!(listener_count(div) + listener_count(input), 0);
        assert_eq!(dom::value(input).unwrap(), "x");
    }

    #[test]
    fn test_unsupported_recipient() {
        setup();

        let input = create_input("x");
        let div = create_element("div");

        assert!(pair(input, div, PairOptions::new()).is_err());
        assert_eq!(listener_count(input), 0);
        assert_eq!(diagnostics().len(), 1);
    }

    #[test]
    fn test_mismatched_multi_select() {
        setup();

        let multi = create_select(true);
        let single = create_select(false);

        assert!(matches!(
            pair(multi, single, PairOptions::new()),
            Err(Error::MismatchedElementTypes { .. })
        ));
        assert_eq!(observer_count(multi), 0);
    }

    #[test]
    fn test_input_and_select_can_pair() {
        setup();

        let input = create_input("");
        let records = [
            crate::types::OptionRecord::new("One", "1"),
            crate::types::OptionRecord::new("Two", "2"),
        ];
        let select = crate::dom::create_select_with_options(false, &records).unwrap();
        let _pairing = pair(input, select, PairOptions::new()).unwrap();

        dom::set_value(input, "2").unwrap();
        dom::dispatch_event(input, Event::new(EventType::Change)).unwrap();
        assert_eq!(dom::value(select).unwrap(), "2");
    }

    #[test]
    fn test_initial_push_leaves_no_flag() {
        setup();

        let a = create_input("start");
        let b = create_input("");
        let pairing = pair(a, b, PairOptions::new()).unwrap();

        assert_eq!(dom::value(b).unwrap(), "start");
        assert!(!pairing.is_suppressed(a));
        assert!(!pairing.is_suppressed(b));
    }

    #[test]
    fn test_released_node_drops_flag() {
        setup();

        let a = create_input("");
        let b = create_input("");
        let pairing = pair(a, b, PairOptions::new()).unwrap();

        pairing.flags.arm(a);
        pairing.flags.arm(b);
        dom::release_node(b);
        assert!(!pairing.is_suppressed(a));
        assert!(!pairing.is_suppressed(b));
        assert!(!pairing.is_active());
        assert_eq!(listener_count(a), 0);
        assert_eq!(destroy_callback_count(a), 0);
    }

    #[test]
    fn test_self_pairing_rejected() {
        setup();

        let a = create_input("x");
        assert_eq!(pair(a, a, PairOptions::new()).unwrap_err(), Error::SelfPairing(a));
        assert_eq!(diagnostics(), vec![Error::SelfPairing(a)]);
        assert_eq!(listener_count(a), 0);
        assert_eq!(destroy_callback_count(a), 0);
    }

    #[test]
    fn test_unpair_drops_destroy_hooks() {
        setup();

        let a = create_input("");
        let b = create_input("");
        for _ in 0..10 {
            let pairing = pair(a, b, PairOptions::new()).unwrap();
            assert_eq!((destroy_callback_count(a), destroy_callback_count(b)), (1, 1));
            pairing.unpair();
        }
        assert_eq!((destroy_callback_count(a), destroy_callback_count(b)), (0, 0));
    }
}
