//! Diagnostics channel for non-fatal pairing conditions.
//!
//! Conditions such as an unsupported element type do not panic. They are
//! logged through `tracing` and kept here so callers and tests can inspect
//! what was reported on this thread.

use std::cell::RefCell;

use crate::error::Error;

thread_local! {
    static DIAGNOSTICS: RefCell<Vec<Error>> = const { RefCell::new(Vec::new()) };
}

/// Report a condition once.
pub fn report(error: &Error) {
    tracing::error!(%error, "form sync diagnostic");
    DIAGNOSTICS.with(|d| d.borrow_mut().push(error.clone()));
}

/// Everything reported so far.
pub fn diagnostics() -> Vec<Error> {
    DIAGNOSTICS.with(|d| d.borrow().clone())
}

/// Drain the reported conditions.
pub fn take_diagnostics() -> Vec<Error> {
    DIAGNOSTICS.with(|d| std::mem::take(&mut *d.borrow_mut()))
}

/// Reset diagnostics (for testing)
pub fn reset_diagnostics() {
    DIAGNOSTICS.with(|d| d.borrow_mut().clear());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NodeId;

    #[test]
    fn test_report_and_take() {
        reset_diagnostics();

        report(&Error::UnknownNode(NodeId(7)));
        assert_eq!(diagnostics(), vec![Error::UnknownNode(NodeId(7))]);

        assert_eq!(take_diagnostics().len(), 1);
        assert!(diagnostics().is_empty());
    }
}
