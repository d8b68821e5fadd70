//! The request/confirm engine, indication pump, and dispatcher (§4.2,
//! §4.3, §4.4): everything that turns a [`Transport`] plus
//! [`dualmcu_proto`]'s codec into a usable node connection.
//!
//! Grounded directly in `wpc_internal.c`'s `send_request_locked`,
//! `get_indication_locked`, `handle_indication`, and `dispatch_indication`.
//! The original runs this single-threaded with one caller at a time behind
//! a request mutex and a background "platform" thread driving
//! `get_indication`; this port keeps the same shape but makes the pump and
//! the dispatcher their own `std::thread`s (§2 item 7, rather than the
//! teacher's async runtime: the spec calls for blocking OS threads so that
//! a consumer can drive the client from any execution model, not just one
//! bound to an async reactor).

use std::{
    sync::{
        atomic::{AtomicBool, AtomicU8, Ordering},
        Arc, Mutex,
    },
    thread::JoinHandle,
    time::{Duration, Instant, SystemTime, UNIX_EPOCH},
};

use dualmcu_proto::{
    confirm_of, response_of,
    payloads::{dsap::DataRxInd, msap::{AppConfigRxInd, ConfigDataItemRxInd, GenericConfirm, ImageRemoteStatusInd, ScanNeighborsInd, StackStateInd}},
    timing::internal_time_to_ms,
    Frame, Indication as IndicationPrimitive,
};
use tracing::{debug, error, warn};

use crate::{
    callbacks::CallbackRegistry,
    config::EngineConfig,
    error::{EngineError, Result},
    framed_io::FrameIo,
    pending_tx::PendingTxTable,
    queue::{IndicationEnvelope, IndicationQueue},
    reassembly::Reassembler,
    transport::Transport,
    watchdog::Watchdog,
};

/// `MSAP_INDICATION_POLL_REQUEST` primitive id (§4.3). Empty payload.
const MSAP_INDICATION_POLL_REQUEST: u8 = 0x07;

/// Number of mismatched confirms tolerated before declaring the link out
/// of sync (`MAX_CONFIRM_ATTEMPT` in the original).
const MAX_CONFIRM_ATTEMPT: u32 = 50;

/// Number of times a request is resent after the node reports a CRC error
/// on it (`MAX_CRC_REQUEST_ERROR_RETRIES` in the original).
const MAX_CRC_REQUEST_RETRIES: u32 = 3;

/// Timeout waiting for one indication frame after a poll confirm signaled
/// one is pending (`TIMEOUT_INDICATION_MS` in the original).
const TIMEOUT_INDICATION_MS: Duration = Duration::from_millis(500);

fn now_epoch_ms() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_millis() as u64).unwrap_or(0)
}

/// Converts `ind.travel_time` from the wire's node-internal 1/128 s units
/// to milliseconds (§6.4), the unit the `data_rx` callback is documented
/// to deliver.
fn with_travel_time_in_ms(ind: DataRxInd) -> DataRxInd {
    DataRxInd { travel_time: internal_time_to_ms(ind.travel_time), ..ind }
}

/// Owns the link to a node: the serialized request/confirm exchange, the
/// background indication pump, and the dispatcher draining indications to
/// registered callbacks.
pub struct Engine<T: Transport> {
    io: Mutex<FrameIo<T>>,
    frame_id: AtomicU8,
    config: EngineConfig,
    queue: Arc<IndicationQueue>,
    pending_tx: Arc<PendingTxTable>,
    callbacks: Arc<CallbackRegistry>,
    reassembler: Arc<Reassembler>,
    poll_suspended: AtomicBool,
    shutdown: AtomicBool,
    mtu: AtomicU8,
    threads: Mutex<Vec<JoinHandle<()>>>,
}

/// Default node MTU, used until [`Engine::refresh_mtu`] caches the real
/// value read from the node (§9 supplemented feature: MTU caching).
const DEFAULT_MTU: u8 = 102;

impl<T: Transport + 'static> Engine<T> {
    /// Wraps `transport` and spawns the pump and dispatcher threads.
    pub fn open(transport: T, config: EngineConfig) -> Result<Arc<Self>> {
        let io = FrameIo::new(transport)?;
        let engine = Arc::new(Self {
            io: Mutex::new(io),
            frame_id: AtomicU8::new(0),
            queue: Arc::new(IndicationQueue::new(config.ind_queue_capacity)),
            pending_tx: Arc::new(PendingTxTable::new()),
            callbacks: Arc::new(CallbackRegistry::default()),
            reassembler: Arc::new(Reassembler::new(config.max_fragment_retention)),
            poll_suspended: AtomicBool::new(config.disable_poll_request),
            shutdown: AtomicBool::new(false),
            mtu: AtomicU8::new(DEFAULT_MTU),
            config,
            threads: Mutex::new(Vec::new()),
        });

        let pump_engine = engine.clone();
        let pump = std::thread::Builder::new()
            .name("dualmcu-pump".into())
            .spawn(move || pump_engine.pump_loop())
            .map_err(|e| EngineError::Generic(e.to_string()))?;

        let dispatch_engine = engine.clone();
        let dispatcher = std::thread::Builder::new()
            .name("dualmcu-dispatcher".into())
            .spawn(move || dispatch_engine.dispatcher_loop())
            .map_err(|e| EngineError::Generic(e.to_string()))?;

        engine.threads.lock().unwrap_or_else(std::sync::PoisonError::into_inner).extend([pump, dispatcher]);
        Ok(engine)
    }

    /// The callback registry, for installing indication handlers.
    #[must_use]
    pub fn callbacks(&self) -> &CallbackRegistry {
        &self.callbacks
    }

    /// The fragment reassembler, exposed so `dualmcu-client`'s data-rx
    /// handling can pull a complete packet once a fragment completes one.
    #[must_use]
    pub fn reassembler(&self) -> &Reassembler {
        &self.reassembler
    }

    /// The pending-tx-outcome table, for registering a callback against a
    /// `pdu_id` right after a fragmented or tx-indication-wanted send.
    #[must_use]
    pub fn pending_tx(&self) -> &PendingTxTable {
        &self.pending_tx
    }

    /// The configuration this engine was opened with.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Cached node MTU.
    #[must_use]
    pub fn mtu(&self) -> u8 {
        self.mtu.load(Ordering::Relaxed)
    }

    /// Updates the cached MTU (§9 supplemented feature: callers refresh
    /// this after a `CSAP_ATTRIBUTE_READ` of the MTU attribute).
    pub fn set_mtu(&self, mtu: u8) {
        self.mtu.store(mtu, Ordering::Relaxed);
    }

    /// Suspends or resumes the indication poll (§4.3, mirrors
    /// `WPC_Int_disable_poll_request`).
    pub fn disable_poll_request(&self, disabled: bool) {
        self.poll_suspended.store(disabled, Ordering::SeqCst);
    }

    /// Sends `primitive_id`/`payload` as a request and blocks for its
    /// confirm, applying the default confirm timeout.
    pub fn send_request(&self, primitive_id: u8, payload: Vec<u8>) -> Result<Frame> {
        self.send_request_timeout(primitive_id, payload, crate::config::DEFAULT_CONFIRM_TIMEOUT)
    }

    /// Sends `primitive_id`/`payload` as a request and blocks for its
    /// confirm, with a caller-supplied timeout (§4.2).
    pub fn send_request_timeout(&self, primitive_id: u8, payload: Vec<u8>, timeout: Duration) -> Result<Frame> {
        let mut io = self.io.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        self.send_request_locked(&mut io, primitive_id, payload, timeout)
    }

    fn next_frame_id(&self) -> u8 {
        self.frame_id.fetch_add(1, Ordering::Relaxed)
    }

    /// §4.2: send, then loop reading frames until the matching confirm
    /// arrives, a CRC condition is hit, or the attempt budget is spent.
    fn send_request_locked(
        &self,
        io: &mut FrameIo<T>,
        primitive_id: u8,
        payload: Vec<u8>,
        timeout: Duration,
    ) -> Result<Frame> {
        let frame_id = self.next_frame_id();
        let mut request = Frame::new(primitive_id, frame_id, payload)?;
        io.write_frame(&request)?;

        let expected_confirm_id = confirm_of(primitive_id);
        let mut crc_retries = 0u32;
        let mut attempt = 0u32;

        while attempt < MAX_CONFIRM_ATTEMPT {
            let deadline = Instant::now() + timeout;
            match io.read_frame(deadline) {
                Ok(confirm) => {
                    if confirm.primitive_id != expected_confirm_id || confirm.frame_id != request.frame_id {
                        warn!(
                            expected = expected_confirm_id,
                            got = confirm.primitive_id,
                            "mismatched confirm, draining"
                        );
                        attempt += 1;
                        continue;
                    }
                    return Ok(confirm);
                }
                Err(EngineError::WrongCrcFromHost) => {
                    if crc_retries >= MAX_CRC_REQUEST_RETRIES {
                        return Err(EngineError::WrongCrcFromHost);
                    }
                    crc_retries += 1;
                    warn!(attempt = crc_retries, "node reported CRC error on request, resending");
                    request.frame_id = self.next_frame_id();
                    io.write_frame(&request)?;
                }
                Err(EngineError::WrongCrc) => {
                    error!("CRC error on confirm, cannot safely resend request");
                    return Err(EngineError::WrongCrc);
                }
                Err(e) => return Err(e),
            }
        }

        error!("lost sync with node after {MAX_CONFIRM_ATTEMPT} mismatched frames");
        Err(EngineError::SyncError)
    }

    /// One iteration of the pump loop (§4.3): a poll request, then a drain
    /// of up to `max_ind_per_poll` indications. Returns whether at least
    /// one indication was drained, so the caller can back off or retry
    /// immediately.
    fn poll_once(&self) -> Result<bool> {
        if self.poll_suspended.load(Ordering::SeqCst) {
            return Ok(false);
        }

        let free_space = self.queue.free_space();
        if free_space == 0 {
            return Ok(false);
        }

        let mut io = self.io.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        let confirm = self.send_request_locked(
            &mut io,
            MSAP_INDICATION_POLL_REQUEST,
            Vec::new(),
            crate::config::DEFAULT_CONFIRM_TIMEOUT,
        )?;
        let poll_confirm = GenericConfirm::decode(&confirm.payload)?;
        if poll_confirm.result == 0 {
            return Ok(false);
        }

        let max_this_poll = free_space.min(self.config.max_ind_per_poll);
        let mut drained_any = false;
        let mut remaining = 1u32;

        for i in 0..max_this_poll {
            if remaining == 0 {
                break;
            }
            let last_one = i + 1 == max_this_poll;
            let deadline = Instant::now() + TIMEOUT_INDICATION_MS;
            let frame = io.read_frame(deadline)?;
            let timestamp_ms_epoch = now_epoch_ms();

            let indication_status = frame.payload.first().copied().unwrap_or(0);
            remaining = u32::from(indication_status);
            let more_ind = remaining > 0 && !last_one;
            let response = Frame::new(response_of(frame.primitive_id), frame.frame_id, vec![u8::from(more_ind)])?;
            io.write_frame(&response)?;

            if !self.queue.push(IndicationEnvelope { frame, timestamp_ms_epoch }) {
                warn!("indication queue full, dropping indication");
            } else {
                drained_any = true;
            }
        }

        Ok(drained_any)
    }

    fn pump_loop(&self) {
        let mut watchdog = Watchdog::new(self.config.max_poll_fail_duration, self.config.fatal_handler.clone());

        while !self.shutdown.load(Ordering::SeqCst) {
            let last_activity = {
                let io = self.io.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
                io.last_activity()
            };
            if watchdog.check(last_activity) {
                break;
            }

            match self.poll_once() {
                Ok(true) => std::thread::sleep(crate::config::BACK_TO_BACK_POLL_INTERVAL),
                Ok(false) => std::thread::sleep(crate::config::DEFAULT_POLL_INTERVAL),
                Err(EngineError::Timeout) => std::thread::sleep(crate::config::DEFAULT_POLL_INTERVAL),
                Err(e) => {
                    error!(error = %e, "poll failed");
                    std::thread::sleep(crate::config::DEFAULT_POLL_INTERVAL);
                }
            }

            self.reassembler.garbage_collect();
        }
    }

    fn dispatcher_loop(&self) {
        while !self.shutdown.load(Ordering::SeqCst) {
            let Some(envelope) = self.queue.pop_blocking(Duration::from_millis(200)) else { continue };
            self.dispatch(envelope);
        }
    }

    /// Mirrors `dispatch_indication`: decode by `primitive_id`, route to
    /// the matching callback channel, and feed completed fragments through
    /// the reassembler.
    fn dispatch(&self, envelope: IndicationEnvelope) {
        let frame = envelope.frame;
        let id = frame.primitive_id;

        if id == IndicationPrimitive::DataRx.id() || id == IndicationPrimitive::DataRxFragment.id() {
            match DataRxInd::decode(&frame.payload, id == IndicationPrimitive::DataRxFragment.id()) {
                Ok(ind) => self.handle_data_rx(ind),
                Err(e) => error!(error = %e, "failed to decode data-rx indication"),
            }
        } else if id == IndicationPrimitive::StackState.id() {
            match StackStateInd::decode(&frame.payload) {
                Ok(ind) => self.callbacks.invoke_stack_state(ind),
                Err(e) => error!(error = %e, "failed to decode stack-state indication"),
            }
        } else if id == IndicationPrimitive::AppConfigRx.id() {
            match AppConfigRxInd::decode(&frame.payload) {
                Ok(ind) => self.callbacks.invoke_app_config_rx(ind),
                Err(e) => error!(error = %e, "failed to decode app-config-rx indication"),
            }
        } else if id == IndicationPrimitive::ScanNeighborsDone.id() {
            match ScanNeighborsInd::decode(&frame.payload) {
                Ok(ind) => self.callbacks.invoke_scan_neighbors_done(ind),
                Err(e) => error!(error = %e, "failed to decode scan-neighbors indication"),
            }
        } else if id == IndicationPrimitive::ImageRemoteStatus.id() {
            match ImageRemoteStatusInd::decode(&frame.payload) {
                Ok(ind) => self.callbacks.invoke_remote_status(ind),
                Err(e) => error!(error = %e, "failed to decode remote-status indication"),
            }
        } else if id == IndicationPrimitive::ConfigDataItemRx.id() {
            match ConfigDataItemRxInd::decode(&frame.payload) {
                Ok(ind) => self.callbacks.invoke_config_data_item_rx(ind),
                Err(e) => error!(error = %e, "failed to decode config-data-item-rx indication"),
            }
        } else if id == IndicationPrimitive::DataTxIndication.id() {
            use dualmcu_proto::payloads::dsap::DataTxIndication;
            match DataTxIndication::decode(&frame.payload) {
                Ok(ind) => {
                    if let Some(callback) = self.pending_tx.take(ind.pdu_id) {
                        callback(ind);
                    } else {
                        debug!(pdu_id = ind.pdu_id, "tx indication with no registered callback");
                    }
                }
                Err(e) => error!(error = %e, "failed to decode data-tx indication"),
            }
        } else {
            error!(primitive_id = id, "unknown indication");
        }
    }

    fn handle_data_rx(&self, ind: DataRxInd) {
        let Some(fragment_info) = &ind.fragment else {
            self.callbacks.invoke_data_rx(with_travel_time_in_ms(ind));
            return;
        };

        let fragment = crate::reassembly::Fragment {
            src_addr: ind.src_addr,
            packet_id: fragment_info.full_packet_id,
            offset: fragment_info.fragment_offset as usize,
            bytes: ind.apdu.clone(),
            last_fragment: fragment_info.last_fragment,
        };
        let packet_id = fragment.packet_id;
        let src_addr = fragment.src_addr;

        match self.reassembler.add_fragment(fragment) {
            Ok(Some(full_size)) => {
                let mut buffer = vec![0u8; full_size];
                match self.reassembler.take_full(src_addr, packet_id, &mut buffer) {
                    Ok(n) => {
                        buffer.truncate(n);
                        let complete = DataRxInd { apdu: buffer, fragment: None, ..ind };
                        self.callbacks.invoke_data_rx(with_travel_time_in_ms(complete));
                    }
                    Err(e) => error!(error = %e, "failed to reassemble completed packet"),
                }
            }
            Ok(None) => {}
            Err(e) => warn!(error = %e, "duplicate fragment rejected"),
        }
    }

    /// Stops the pump and dispatcher threads and closes the transport.
    pub fn close(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
        self.queue.close();
        let mut threads = self.threads.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        for handle in threads.drain(..) {
            let _ = handle.join();
        }
    }
}
