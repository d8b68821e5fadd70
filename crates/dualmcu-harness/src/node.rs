//! A deterministic, in-process stand-in for the radio node: answers
//! requests from a registered handler table and emits indications queued
//! by the test on the next poll, exactly as spec.md §4.2/§4.3 describe the
//! real node's side of the exchange.
//!
//! Grounded in `dualmcu-core::framed_io::FrameIo`, reused here rather than
//! re-implementing SLIP/CRC framing a second time: the mock node is just
//! another `FrameIo` user, on the opposite end of a [`crate::DuplexTransport`].

use std::{
    collections::VecDeque,
    sync::{
        atomic::{AtomicU8, Ordering},
        Arc, Mutex,
    },
    thread::JoinHandle,
    time::{Duration, Instant},
};

use dualmcu_core::framed_io::FrameIo;
use dualmcu_proto::{payloads::msap::GenericConfirm, primitive::Primitive, Frame};

use crate::duplex::DuplexTransport;

/// A request handler: given the request frame's payload, returns the bytes
/// of the matching confirm's payload.
pub type RequestHandler = Box<dyn Fn(&Frame) -> Vec<u8> + Send>;

const POLL_REQUEST_ID: u8 = 0x07; // Primitive::MsapIndicationPoll.request_id()

struct Shared {
    handlers: Mutex<std::collections::HashMap<u8, RequestHandler>>,
    pending_indications: Mutex<VecDeque<(u8, Vec<u8>)>>,
    indication_frame_id: AtomicU8,
    max_indications_per_poll: usize,
    shutdown: std::sync::atomic::AtomicBool,
}

/// A mock dual-MCU node driven by a test: answers requests via a
/// programmable handler table, and delivers indications queued with
/// [`MockNode::push_indication`] the next time the host polls.
pub struct MockNode {
    shared: Arc<Shared>,
    thread: Option<JoinHandle<()>>,
}

impl MockNode {
    /// Starts a node thread on its end of `transport`. `max_indications_per_poll`
    /// mirrors the node-side cap named in spec.md §4.3 (`MAX_IND_PER_POLL`).
    #[must_use]
    pub fn spawn(transport: DuplexTransport, max_indications_per_poll: usize) -> Self {
        let shared = Arc::new(Shared {
            handlers: Mutex::new(std::collections::HashMap::new()),
            pending_indications: Mutex::new(VecDeque::new()),
            indication_frame_id: AtomicU8::new(0),
            max_indications_per_poll,
            shutdown: std::sync::atomic::AtomicBool::new(false),
        });

        let worker_shared = shared.clone();
        let thread = std::thread::Builder::new()
            .name("dualmcu-mock-node".into())
            .spawn(move || run(transport, worker_shared))
            .expect("spawning the mock node thread");

        Self { shared, thread: Some(thread) }
    }

    /// Registers a handler for `primitive_id`'s request. Replaces any
    /// handler already registered for that primitive.
    pub fn on_request(&self, primitive_id: u8, handler: RequestHandler) {
        let mut handlers = self.shared.handlers.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        handlers.insert(primitive_id, handler);
    }

    /// Convenience for [`Self::on_request`] keyed by a well-known
    /// [`Primitive`] rather than a bare byte.
    pub fn on(&self, primitive: Primitive, handler: RequestHandler) {
        self.on_request(primitive.request_id(), handler);
    }

    /// Queues an indication (by its indication-primitive id and encoded
    /// payload) to be delivered on the next poll the host issues.
    pub fn push_indication(&self, primitive_id: u8, payload: Vec<u8>) {
        let mut pending = self.shared.pending_indications.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        pending.push_back((primitive_id, payload));
    }

    /// Number of indications still queued, not yet delivered.
    #[must_use]
    pub fn pending_indication_count(&self) -> usize {
        let pending = self.shared.pending_indications.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        pending.len()
    }

    /// Signals the node thread to stop and joins it.
    pub fn shutdown(mut self) {
        self.shared.shutdown.store(true, Ordering::SeqCst);
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for MockNode {
    fn drop(&mut self) {
        self.shared.shutdown.store(true, Ordering::SeqCst);
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
    }
}

fn run(transport: DuplexTransport, shared: Arc<Shared>) {
    let Ok(mut io) = FrameIo::new(transport) else { return };
    let tick = Duration::from_millis(20);

    while !shared.shutdown.load(Ordering::SeqCst) {
        let deadline = Instant::now() + tick;
        let Ok(request) = io.read_frame(deadline) else { continue };

        if request.primitive_id == POLL_REQUEST_ID {
            handle_poll(&mut io, &shared);
            continue;
        }

        let confirm_payload = {
            let handlers = shared.handlers.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
            handlers.get(&request.primitive_id).map(|h| h(&request))
        };
        let Some(payload) = confirm_payload else { continue };
        let confirm_id = dualmcu_proto::confirm_of(request.primitive_id);
        if let Ok(confirm) = Frame::new(confirm_id, request.frame_id, payload) {
            let _ = io.write_frame(&confirm);
        }
    }
}

fn handle_poll(io: &mut FrameIo<DuplexTransport>, shared: &Arc<Shared>) {
    let batch: Vec<(u8, Vec<u8>)> = {
        let mut pending = shared.pending_indications.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        let n = pending.len().min(shared.max_indications_per_poll);
        pending.drain(..n).collect()
    };

    let result = u8::from(!batch.is_empty());
    let confirm = Frame::new(dualmcu_proto::confirm_of(POLL_REQUEST_ID), 0, GenericConfirm { result }.encode())
        .expect("poll confirm payload fits");
    if io.write_frame(&confirm).is_err() {
        return;
    }

    let batch_len = batch.len();
    let remaining_after = |sent: usize| -> u8 {
        let pending = shared.pending_indications.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        let left_in_batch = batch_len - sent - 1;
        u8::try_from(pending.len() + left_in_batch).unwrap_or(u8::MAX)
    };

    for (i, (primitive_id, mut payload)) in batch.into_iter().enumerate() {
        if payload.is_empty() {
            payload.push(0);
        }
        payload[0] = remaining_after(i);

        let frame_id = shared.indication_frame_id.fetch_add(1, Ordering::Relaxed);
        let Ok(frame) = Frame::new(primitive_id, frame_id, payload) else { continue };
        if io.write_frame(&frame).is_err() {
            return;
        }

        // Drain the host's acknowledging RESPONSE frame before sending the
        // next indication, matching the request/response lockstep §4.3
        // describes.
        let deadline = Instant::now() + Duration::from_millis(500);
        let _ = io.read_frame(deadline);
    }
}
