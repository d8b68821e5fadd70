//! Wire-level SLIP framing, CRC, and primitive payload encoding for the
//! request/confirm/indication/response protocol spoken over a serial link
//! to a mesh network co-processor (§3, §6).
//!
//! This crate has no knowledge of transports, threads, or retry policy: it
//! is a pure codec. [`slip::Reader`] turns an inbound byte stream into
//! escaped-and-CRC'd frame bodies; [`Frame`] turns those bodies into typed
//! `primitive_id`/`frame_id`/`payload` triples; the `payloads` module turns
//! opaque payload bytes into primitive-specific structs.

pub mod error;
pub mod frame;
pub mod payloads;
pub mod primitive;
pub mod slip;
pub mod timing;

pub use error::{ProtoError, Result};
pub use frame::{Frame, MAX_FRAME_PAYLOAD};
pub use primitive::{confirm_of, response_of, Indication, Primitive, CONFIRM_OFFSET, RESPONSE_OFFSET};
pub use timing::{internal_time_to_ms, ms_to_internal_time};
