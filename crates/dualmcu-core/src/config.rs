//! Configuration surface (§6.5) and the per-operation timeout overrides
//! named throughout §4.2.

use std::{sync::Arc, time::Duration};

/// Default confirm timeout for an ordinary request (§4.2).
pub const DEFAULT_CONFIRM_TIMEOUT: Duration = Duration::from_millis(500);
/// Timeout for scratchpad start/clear requests, which may involve erasing
/// flash on the node.
pub const SCRATCHPAD_START_CLEAR_TIMEOUT: Duration = Duration::from_secs(45);
/// Timeout for a single scratchpad block write.
pub const SCRATCHPAD_BLOCK_TIMEOUT: Duration = Duration::from_secs(5);
/// Timeout for the confirm that follows a stack-stop request.
pub const STACK_STOP_TIMEOUT: Duration = Duration::from_secs(60);

/// Default watchdog limit: no response from the node for this long
/// terminates the link (§4.3). `0` disables the watchdog entirely.
pub const DEFAULT_MAX_POLL_FAIL_DURATION: Duration = Duration::from_secs(60);

/// Default cap on indications drained per poll (§4.3).
pub const DEFAULT_MAX_IND_PER_POLL: usize = 30;

/// Default interval between indication polls when nothing is pending.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Sleep between polls when the previous drain left indications pending
/// on the node (§4.3 step 7).
pub const BACK_TO_BACK_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Minimum spacing between two fragment-reassembly garbage collection
/// passes (§4.5).
pub const MIN_GC_PERIOD: Duration = Duration::from_secs(5);

/// Capacity of the indication queue; must be at least twice
/// `max_ind_per_poll` (§3).
pub const DEFAULT_IND_QUEUE_CAP: usize = 2 * DEFAULT_MAX_IND_PER_POLL;

/// Callback invoked when the watchdog trips (§4.3, §7, §9). The default
/// installed by [`EngineConfig::default`] terminates the process, matching
/// the original C implementation's `exit(EXIT_FAILURE)`; the original's own
/// `TODO: don't do this` is the reason this is pluggable rather than
/// hard-coded.
pub type FatalHandler = Arc<dyn Fn() + Send + Sync>;

/// Default fatal handler: terminate the process. This mirrors the
/// original library's behaviour, not a recommendation — callers that want
/// a graceful shutdown should install their own handler via
/// [`EngineConfig::fatal_handler`].
#[must_use]
pub fn exit_process_fatal_handler() -> FatalHandler {
    Arc::new(|| std::process::exit(1))
}

/// Configuration accepted at engine `open()` and at runtime (§6.5).
#[derive(Clone)]
pub struct EngineConfig {
    /// Serial port device name (e.g. `/dev/ttyUSB0`, `COM3`).
    pub port_name: String,
    /// Serial bitrate, in bits per second.
    pub bitrate: u32,
    /// Maximum duration without any byte from the node before the
    /// watchdog trips. `Duration::ZERO` disables the watchdog.
    pub max_poll_fail_duration: Duration,
    /// Maximum duration a partial fragment-reassembly record is kept
    /// without fresh activity before garbage collection drops it.
    /// `Duration::ZERO` disables fragment GC.
    pub max_fragment_retention: Duration,
    /// Maximum number of indications drained in one poll.
    pub max_ind_per_poll: usize,
    /// Capacity of the indication queue.
    pub ind_queue_capacity: usize,
    /// Start the pump with polling suspended (rarely useful; mainly for
    /// tests that want to drive the queue manually).
    pub disable_poll_request: bool,
    /// Workaround (§9 open question): some firmware versions emit no
    /// `stack_started` indication after a successful stack-start request.
    /// When set, the caller thread synthesizes one locally. Off by
    /// default — this masks a firmware quirk rather than fixing it.
    pub synthesize_stack_started_indication: bool,
    /// Invoked by the pump thread's watchdog when the node has been
    /// silent for longer than `max_poll_fail_duration`.
    pub fatal_handler: FatalHandler,
}

impl EngineConfig {
    /// Starts a config with the required fields and every optional one at
    /// its documented default.
    #[must_use]
    pub fn new(port_name: impl Into<String>, bitrate: u32) -> Self {
        Self {
            port_name: port_name.into(),
            bitrate,
            max_poll_fail_duration: DEFAULT_MAX_POLL_FAIL_DURATION,
            max_fragment_retention: Duration::from_secs(60),
            max_ind_per_poll: DEFAULT_MAX_IND_PER_POLL,
            ind_queue_capacity: DEFAULT_IND_QUEUE_CAP,
            disable_poll_request: false,
            synthesize_stack_started_indication: false,
            fatal_handler: exit_process_fatal_handler(),
        }
    }
}

impl std::fmt::Debug for EngineConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineConfig")
            .field("port_name", &self.port_name)
            .field("bitrate", &self.bitrate)
            .field("max_poll_fail_duration", &self.max_poll_fail_duration)
            .field("max_fragment_retention", &self.max_fragment_retention)
            .field("max_ind_per_poll", &self.max_ind_per_poll)
            .field("ind_queue_capacity", &self.ind_queue_capacity)
            .field("disable_poll_request", &self.disable_poll_request)
            .field(
                "synthesize_stack_started_indication",
                &self.synthesize_stack_started_indication,
            )
            .finish_non_exhaustive()
    }
}
