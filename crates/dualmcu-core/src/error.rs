//! Engine-facing error taxonomy (§7).
//!
//! These sit one layer above [`dualmcu_proto::ProtoError`]: framing/CRC
//! failures are folded in, plus the conditions that only make sense once
//! there is a request/confirm protocol on top of the wire (timeouts,
//! desync, the watchdog trip).

use std::io;

use dualmcu_proto::ProtoError;
use thiserror::Error;

/// Result alias for fallible engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors produced by the request/confirm engine, the indication pump, and
/// the dispatcher.
#[derive(Error, Debug)]
pub enum EngineError {
    /// No confirm arrived within the caller-supplied window.
    #[error("timed out waiting for confirm")]
    Timeout,

    /// The confirm's CRC did not verify. Not retried: the node may already
    /// have acted on the request (§4.2 step 5).
    #[error("CRC mismatch on confirm")]
    WrongCrc,

    /// The node reported a CRC error on our request. Retried up to
    /// [`crate::engine::MAX_CRC_REQUEST_RETRIES`] times before this is
    /// surfaced.
    #[error("node rejected request CRC after retries")]
    WrongCrcFromHost,

    /// `MAX_CONFIRM_ATTEMPT` mismatching frames were drained without
    /// finding the expected confirm: the host and node have lost sync.
    #[error("lost sync with node: no matching confirm found")]
    SyncError,

    /// A caller supplied a parameter outside the range its primitive
    /// allows.
    #[error("invalid parameter: {0}")]
    WrongParam(String),

    /// A caller-supplied buffer was too small for the data being copied
    /// into it (e.g. [`crate::reassembly::Reassembler::take_full`]).
    #[error("buffer too small: need {needed}, have {available}")]
    WrongBufferSize {
        /// Bytes required.
        needed: usize,
        /// Bytes available.
        available: usize,
    },

    /// The underlying transport failed (open, read, or write).
    #[error("transport error: {0}")]
    Transport(#[from] io::Error),

    /// Wire framing or payload decode failure.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtoError),

    /// Catch-all for conditions without a dedicated variant.
    #[error("{0}")]
    Generic(String),

    /// The watchdog observed more than the configured
    /// `max_poll_fail_duration` without any byte from the node. Per §4.3,
    /// the default, documented behaviour is that this error is fatal: it
    /// is handed to the configured [`crate::config::FatalHandler`], whose
    /// default terminates the process. An implementer may install a
    /// handler that shuts down gracefully instead (§7, §9).
    #[error("watchdog: no response from node for longer than the configured limit")]
    Fatal,
}
