//! The bounded indication queue (§3, §4.3, §4.4): the single hand-off
//! point between the pump thread (sole producer) and the dispatcher thread
//! (sole consumer).

use std::{
    collections::VecDeque,
    sync::{Condvar, Mutex},
    time::{Duration, Instant},
};

use dualmcu_proto::Frame;

/// A received indication together with the timestamp captured immediately
/// after its bytes were read, before dispatch (§3).
#[derive(Debug, Clone)]
pub struct IndicationEnvelope {
    /// The decoded indication frame.
    pub frame: Frame,
    /// Milliseconds since the Unix epoch, captured right after reception.
    pub timestamp_ms_epoch: u64,
}

struct Inner {
    items: VecDeque<IndicationEnvelope>,
    closed: bool,
}

/// A ring of bounded capacity shared between the pump and the dispatcher.
///
/// The spec describes this as a fixed-size ring with a read/write cursor
/// and an `empty` flag disambiguating `read == write`; a `VecDeque` with a
/// capacity cap gives the same externally observable behaviour (FIFO,
/// bounded, empty/full distinguishable) without hand-rolling the cursor
/// arithmetic.
pub struct IndicationQueue {
    capacity: usize,
    inner: Mutex<Inner>,
    not_empty: Condvar,
}

impl IndicationQueue {
    /// Creates an empty queue with room for `capacity` envelopes.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            inner: Mutex::new(Inner { items: VecDeque::with_capacity(capacity), closed: false }),
            not_empty: Condvar::new(),
        }
    }

    /// Total capacity this queue was built with.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Free slots available right now. The pump caps a poll's drain count
    /// to this value (§4.3 step 1).
    #[must_use]
    pub fn free_space(&self) -> usize {
        let inner = self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        self.capacity.saturating_sub(inner.items.len())
    }

    /// Pushes one envelope. Returns `false` if the queue was already at
    /// capacity (the pump never calls this more often than `free_space`
    /// allowed at poll time, so this is a last-resort guard, not the
    /// normal back-pressure mechanism).
    pub fn push(&self, envelope: IndicationEnvelope) -> bool {
        let mut inner = self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        if inner.items.len() >= self.capacity {
            return false;
        }
        inner.items.push_back(envelope);
        drop(inner);
        self.not_empty.notify_one();
        true
    }

    /// Blocks until an envelope is available, the queue is closed, or
    /// `timeout` elapses.
    pub fn pop_blocking(&self, timeout: Duration) -> Option<IndicationEnvelope> {
        let mut inner = self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(item) = inner.items.pop_front() {
                return Some(item);
            }
            if inner.closed {
                return None;
            }
            let now = Instant::now();
            if now >= deadline {
                return None;
            }
            let (guard, _timeout_result) =
                self.not_empty.wait_timeout(inner, deadline - now).unwrap_or_else(std::sync::PoisonError::into_inner);
            inner = guard;
        }
    }

    /// Wakes any thread blocked in [`Self::pop_blocking`] and marks the
    /// queue closed so future calls return `None` immediately (shutdown,
    /// §5).
    pub fn close(&self) {
        let mut inner = self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        inner.closed = true;
        drop(inner);
        self.not_empty.notify_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn envelope(id: u8) -> IndicationEnvelope {
        IndicationEnvelope {
            frame: Frame::new(0x21, id, vec![]).unwrap(),
            timestamp_ms_epoch: u64::from(id),
        }
    }

    #[test]
    fn fifo_order_preserved() {
        let q = IndicationQueue::new(4);
        for i in 0..3 {
            assert!(q.push(envelope(i)));
        }
        for i in 0..3 {
            let got = q.pop_blocking(Duration::from_millis(10)).unwrap();
            assert_eq!(got.frame.frame_id, i);
        }
    }

    #[test]
    fn push_fails_once_full() {
        let q = IndicationQueue::new(2);
        assert!(q.push(envelope(0)));
        assert!(q.push(envelope(1)));
        assert!(!q.push(envelope(2)));
        assert_eq!(q.free_space(), 0);
    }

    #[test]
    fn pop_blocking_times_out_when_empty() {
        let q = IndicationQueue::new(2);
        assert!(q.pop_blocking(Duration::from_millis(20)).is_none());
    }

    #[test]
    fn close_wakes_blocked_pop() {
        let q = std::sync::Arc::new(IndicationQueue::new(2));
        let q2 = q.clone();
        let handle = std::thread::spawn(move || q2.pop_blocking(Duration::from_secs(5)));
        std::thread::sleep(Duration::from_millis(20));
        q.close();
        assert!(handle.join().unwrap().is_none());
    }
}
