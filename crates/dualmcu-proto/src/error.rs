//! Error types for SLIP framing and payload encoding.
//!
//! These are the lowest-level errors in the stack: malformed wire bytes,
//! CRC mismatches, and payload fields that don't fit the shapes in §6.3.
//! Higher layers (`dualmcu-core`, `dualmcu-client`) wrap these rather than
//! re-deriving them.

use thiserror::Error;

/// Result alias for fallible framing/payload operations.
pub type Result<T> = std::result::Result<T, ProtoError>;

/// Errors produced while framing, unframing or decoding wire bytes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtoError {
    /// A decoded frame is shorter than the minimum valid length (3-byte
    /// header + 2-byte CRC = 5 bytes; anything below is treated as line
    /// noise, not a protocol violation).
    #[error("frame too short: {len} bytes (minimum 5)")]
    FrameTooShort {
        /// Length of the candidate frame body, in bytes.
        len: usize,
    },

    /// The escaped byte stream contained an `ESC` not followed by
    /// `ESC_END` or `ESC_ESC`.
    #[error("malformed escape sequence at offset {offset}")]
    MalformedEscape {
        /// Offset of the stray `ESC` byte within the raw (still escaped)
        /// input.
        offset: usize,
    },

    /// The decoded body exceeds the caller-supplied buffer / maximum
    /// payload size.
    #[error("frame body of {len} bytes exceeds the {max}-byte limit")]
    BufferTooSmall {
        /// Length that would have been produced.
        len: usize,
        /// Configured maximum.
        max: usize,
    },

    /// CRC of a decoded frame does not match the trailing CRC bytes.
    #[error("CRC mismatch")]
    WrongCrc,

    /// The node echoed a confirm whose CRC field is the sentinel
    /// `0xFFFF`, meaning it rejected the CRC of the request we sent.
    #[error("node reported CRC error on the request")]
    WrongCrcFromHost,

    /// A payload field was out of the range its primitive allows.
    #[error("invalid payload field `{field}`: {reason}")]
    WrongParam {
        /// Name of the offending field.
        field: &'static str,
        /// Human-readable explanation.
        reason: String,
    },

    /// Catch-all for conditions that don't have a dedicated variant.
    #[error("{0}")]
    Generic(String),
}
