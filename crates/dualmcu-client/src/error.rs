//! Client-facing error taxonomy (§7): wraps [`EngineError`] and adds the
//! per-primitive node-result-code mapping, because the spec notes the same
//! numeric code means different things in different primitives.

use dualmcu_core::EngineError;
use dualmcu_proto::ProtoError;
use thiserror::Error;

use crate::node_result::NodeResult;

/// Result alias for fallible client operations.
pub type Result<T> = std::result::Result<T, SapError>;

/// Errors produced by the CSAP/MSAP/DSAP/LSAP shims.
#[derive(Error, Debug)]
pub enum SapError {
    /// The request/confirm engine failed before a node result code was
    /// even available (timeout, CRC, desync, transport failure).
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// A confirm payload didn't decode into the shape this primitive
    /// expects (truncated frame, oversized field).
    #[error(transparent)]
    Protocol(#[from] ProtoError),

    /// The confirm arrived but the node's own result code denotes failure.
    /// `primitive` names the operation, for diagnostics; `result` is the
    /// raw byte the node sent.
    #[error("{primitive} failed: {result:?} (raw code {raw})")]
    NodeRejected {
        /// Name of the operation that failed, for diagnostics.
        primitive: &'static str,
        /// Decoded node result.
        result: NodeResult,
        /// Raw result byte, preserved for firmware versions this crate's
        /// mapping does not yet cover.
        raw: u8,
    },

    /// A caller-supplied value does not fit the wire shape (oversized
    /// attribute value, APDU longer than the reassembly limit, etc.).
    #[error("invalid parameter: {0}")]
    WrongParam(String),
}

impl SapError {
    /// Maps a raw node result byte to [`SapError::NodeRejected`] if
    /// non-zero, otherwise `Ok(())`.
    pub(crate) fn check(primitive: &'static str, raw: u8) -> Result<()> {
        if raw == 0 {
            return Ok(());
        }
        Err(SapError::NodeRejected { primitive, result: NodeResult::from_raw(primitive, raw), raw })
    }
}
