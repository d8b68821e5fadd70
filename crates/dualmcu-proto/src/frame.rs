//! The three-byte-header frame carried inside SLIP framing (§3, §6.1).

use bytes::{BufMut, Bytes};

use crate::{
    error::{ProtoError, Result},
    slip,
};

/// Upper bound on `payload_length`: the size of the largest payload shape
/// this crate defines (a fragmented data-tx request body), rounded up.
/// `payload_length` is a single byte on the wire, so this can never exceed
/// 255 regardless of the union's real maximum.
pub const MAX_FRAME_PAYLOAD: usize = 255;

/// A decoded protocol frame: `primitive_id`, `frame_id`, and payload.
///
/// # Invariants
///
/// `payload.len() <= MAX_FRAME_PAYLOAD`, enforced by [`Frame::new`] and by
/// [`Frame::decode`]. The trailing CRC is not represented here: it is
/// verified (or computed) by the SLIP layer and never seen by callers of
/// this type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Identifies the primitive this frame carries (request, confirm,
    /// indication, or response variant).
    pub primitive_id: u8,
    /// Caller-assigned sequence number used to match confirms to requests.
    pub frame_id: u8,
    /// Primitive-specific body.
    pub payload: Bytes,
}

impl Frame {
    /// Builds a frame, rejecting payloads that would not fit the one-byte
    /// `payload_length` field.
    pub fn new(primitive_id: u8, frame_id: u8, payload: impl Into<Bytes>) -> Result<Self> {
        let payload = payload.into();
        if payload.len() > MAX_FRAME_PAYLOAD {
            return Err(ProtoError::BufferTooSmall { len: payload.len(), max: MAX_FRAME_PAYLOAD });
        }
        Ok(Self { primitive_id, frame_id, payload })
    }

    /// Encodes this frame's `primitive_id || frame_id || payload_length ||
    /// payload` body and wraps it in SLIP framing, CRC included.
    #[must_use]
    pub fn encode_slip(&self) -> Vec<u8> {
        let mut body = Vec::with_capacity(3 + self.payload.len());
        body.put_u8(self.primitive_id);
        body.put_u8(self.frame_id);
        #[allow(clippy::cast_possible_truncation)]
        body.put_u8(self.payload.len() as u8);
        body.extend_from_slice(&self.payload);
        slip::encode(&body)
    }

    /// Decodes a frame from an already-unescaped, CRC-verified body (the
    /// output of [`slip::unstuff_and_verify`]).
    pub fn decode_body(body: &[u8]) -> Result<Self> {
        let [primitive_id, frame_id, payload_length, rest @ ..] = body else {
            return Err(ProtoError::FrameTooShort { len: body.len() });
        };
        let payload_length = *payload_length as usize;
        if rest.len() < payload_length {
            return Err(ProtoError::BufferTooSmall { len: rest.len(), max: payload_length });
        }
        Ok(Self {
            primitive_id: *primitive_id,
            frame_id: *frame_id,
            payload: Bytes::copy_from_slice(&rest[..payload_length]),
        })
    }

    /// Returns whether this frame's `(primitive_id, frame_id)` matches the
    /// confirm expected for `request`, per §6.2's additive offset.
    #[must_use]
    pub fn is_confirm_of(&self, request: &Self) -> bool {
        self.frame_id == request.frame_id
            && self.primitive_id == crate::primitive::confirm_of(request.primitive_id)
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::slip;

    #[test]
    fn encode_then_unstuff_then_decode_round_trips() {
        let frame = Frame::new(0x0D, 7, vec![1, 2, 3, 4]).unwrap();
        let wire = frame.encode_slip();

        // Strip the three leading and one trailing END, feed through the
        // escape-aware reader to recover the escaped body.
        let mut reader = slip::Reader::new();
        let mut escaped = None;
        for &b in &wire[1..] {
            if let Some(e) = reader.push(b) {
                escaped = Some(e);
            }
        }
        let body = slip::unstuff_and_verify(&escaped.unwrap()).unwrap();
        let decoded = Frame::decode_body(&body).unwrap();
        assert_eq!(decoded, frame);
    }

    #[test]
    fn decode_body_rejects_truncated_payload() {
        let body = [0x0D, 0x00, 0x05, 0x01, 0x02];
        let err = Frame::decode_body(&body).unwrap_err();
        assert!(matches!(err, ProtoError::BufferTooSmall { .. }));
    }

    #[test]
    fn new_rejects_oversized_payload() {
        let payload = vec![0u8; MAX_FRAME_PAYLOAD + 1];
        let err = Frame::new(1, 1, payload).unwrap_err();
        assert!(matches!(err, ProtoError::BufferTooSmall { .. }));
    }

    proptest! {
        #[test]
        fn frame_round_trips_through_wire(
            primitive_id in any::<u8>(),
            frame_id in any::<u8>(),
            payload in prop::collection::vec(any::<u8>(), 0..=MAX_FRAME_PAYLOAD),
        ) {
            let frame = Frame::new(primitive_id, frame_id, payload).unwrap();
            let wire = frame.encode_slip();

            let mut reader = slip::Reader::new();
            let mut escaped = None;
            for &b in &wire[1..] {
                if let Some(e) = reader.push(b) {
                    escaped = Some(e);
                }
            }
            let body = slip::unstuff_and_verify(&escaped.unwrap()).unwrap();
            let decoded = Frame::decode_body(&body).unwrap();
            prop_assert_eq!(decoded, frame);
        }
    }
}
