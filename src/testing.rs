//! Thread-local record of internal events of the coordinator.
//!
//! Blur runs record which path they took, so tests can check it
//! without relying on timing.
use std::cell::RefCell;

thread_local!(static EVENTS: RefCell<Vec<String>> = const { RefCell::new(Vec::new()) });

pub fn log_message(msg: &str) {
    EVENTS.with(|events| events.borrow_mut().push(msg.to_owned()));
}

pub fn logs_contain(msg: &str) -> bool {
    EVENTS.with(|events| events.borrow().iter().any(|line| line.contains(msg)))
}

/// Recorded events in the order they happened.
pub fn logged_messages() -> Vec<String> {
    EVENTS.with(|events| events.borrow().clone())
}

pub fn clear_log() {
    EVENTS.with(|events| events.borrow_mut().clear());
}
