//! Request/response capture for troubleshooting.
//!
//! The executor reports every attempted payload and every raw response to a
//! [`DiagnosticSink`]. The default sink keeps them in a slot owned by the
//! calling thread, readable with [`last_request`] and [`last_response`]
//! until the next call on the same thread overwrites them.

use std::cell::RefCell;

/// Most recent request payload and raw response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    pub last_request: Option<String>,
    pub last_response: Option<String>,
}

/// Receives what the executor sends and gets back.
pub trait DiagnosticSink: Send + Sync {
    /// Called before the request is sent.
    fn record_request(&self, payload: &str);

    /// Called only when a raw response was received.
    fn record_response(&self, response: &str);
}

thread_local! {
    static SLOT: RefCell<Diagnostics> = RefCell::new(Diagnostics::default());
}

/// Writes into the calling thread's diagnostic slot.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadLocalSink;

impl DiagnosticSink for ThreadLocalSink {
    fn record_request(&self, payload: &str) {
        SLOT.with(|slot| slot.borrow_mut().last_request = Some(payload.to_string()));
    }

    fn record_response(&self, response: &str) {
        SLOT.with(|slot| slot.borrow_mut().last_response = Some(response.to_string()));
    }
}

/// Last payload sent from this thread.
pub fn last_request() -> Option<String> {
    SLOT.with(|slot| slot.borrow().last_request.clone())
}

/// Last raw response received on this thread.
pub fn last_response() -> Option<String> {
    SLOT.with(|slot| slot.borrow().last_response.clone())
}

/// Both values for this thread.
pub fn snapshot() -> Diagnostics {
    SLOT.with(|slot| slot.borrow().clone())
}

/// Reset this thread's slot.
pub fn clear() {
    SLOT.with(|slot| *slot.borrow_mut() = Diagnostics::default());
}
