//! Tracks outstanding data-transmission requests so their eventual
//! `DataTxIndication` can be matched back to the caller that requested the
//! send (§4.4, §9).
//!
//! The original keys this by `pduid`, a 16-bit value the node echoes back
//! in the indication. A second send reusing a `pduid` still pending from an
//! earlier one overwrites its entry (§9 open question): the original takes
//! the same position and so does this port, since the node itself would
//! not reuse an id before resolving it in well-behaved operation.

use std::{
    collections::HashMap,
    sync::Mutex,
};

/// Invoked once, from the dispatcher thread, when the matching
/// `DataTxIndication` arrives.
pub type OnSentCallback = Box<dyn FnOnce(dualmcu_proto::payloads::dsap::DataTxIndication) + Send>;

/// A table of callbacks awaiting their data-transmission outcome, keyed by
/// `pduid`.
#[derive(Default)]
pub struct PendingTxTable {
    callbacks: Mutex<HashMap<u16, OnSentCallback>>,
}

impl PendingTxTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `callback` to run when `pdu_id`'s outcome indication
    /// arrives. Replaces any callback already registered for that id.
    pub fn register(&self, pdu_id: u16, callback: OnSentCallback) {
        let mut callbacks = self.callbacks.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        callbacks.insert(pdu_id, callback);
    }

    /// Removes and returns the callback for `pdu_id`, if one is
    /// registered. Consumes the entry: a given `pduid` fires at most once.
    #[must_use]
    pub fn take(&self, pdu_id: u16) -> Option<OnSentCallback> {
        let mut callbacks = self.callbacks.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        callbacks.remove(&pdu_id)
    }

    /// Number of sends still awaiting their outcome.
    #[must_use]
    pub fn len(&self) -> usize {
        let callbacks = self.callbacks.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        callbacks.len()
    }

    /// Whether any sends are still awaiting their outcome.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dualmcu_proto::payloads::dsap::DataTxIndication;
    use std::sync::{Arc, Mutex as StdMutex};

    fn indication(pdu_id: u16) -> DataTxIndication {
        DataTxIndication { pdu_id, status: 0 }
    }

    #[test]
    fn register_then_take_fires_once() {
        let table = PendingTxTable::new();
        let seen = Arc::new(StdMutex::new(None));
        let seen2 = seen.clone();
        table.register(7, Box::new(move |ind| *seen2.lock().unwrap() = Some(ind.pdu_id)));

        let cb = table.take(7).expect("callback present");
        cb(indication(7));
        assert_eq!(*seen.lock().unwrap(), Some(7));

        assert!(table.take(7).is_none());
    }

    #[test]
    fn unregistered_id_yields_none() {
        let table = PendingTxTable::new();
        assert!(table.take(42).is_none());
    }

    #[test]
    fn reregistering_overwrites_prior_entry() {
        let table = PendingTxTable::new();
        table.register(1, Box::new(|_| ()));
        table.register(1, Box::new(|_| ()));
        assert_eq!(table.len(), 1);
    }
}
