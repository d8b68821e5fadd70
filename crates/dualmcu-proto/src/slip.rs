//! SLIP byte-stuffing and the CRC that rides inside it.
//!
//! This is framing only: delimiting one message from the next on a byte
//! stream, not IP-over-serial. See RFC 1055 for the general idea; the
//! specifics here (three leading `END`s, a little-endian CRC-16 folded into
//! the escaped body) are this protocol's own convention, not RFC 1055's.

use crc::{Algorithm, Crc};

use crate::error::{ProtoError, Result};

/// Frame delimiter.
pub const END: u8 = 0xC0;
/// Escape byte.
pub const ESC: u8 = 0xDB;
/// Escaped form of [`END`].
pub const ESC_END: u8 = 0xDC;
/// Escaped form of [`ESC`].
pub const ESC_ESC: u8 = 0xDD;

/// Minimum length of a decoded frame body (3-byte header, 2-byte CRC; a
/// zero-length payload is legal).
pub const MIN_FRAME_LEN: usize = 5;

/// CCITT CRC-16 (poly `0x1021`, init `0xFFFF`, no reflect, no final XOR),
/// the same parameters the node firmware's lookup table implements.
const CRC16_CCITT: Algorithm<u16> = crc::CRC_16_IBM_3740;

fn crc16(bytes: &[u8]) -> u16 {
    Crc::<u16>::new(&CRC16_CCITT).checksum(bytes)
}

/// Escapes `END` and `ESC` bytes in `body`, appending to `out`.
fn stuff(body: &[u8], out: &mut Vec<u8>) {
    for &b in body {
        match b {
            END => out.extend_from_slice(&[ESC, ESC_END]),
            ESC => out.extend_from_slice(&[ESC, ESC_ESC]),
            other => out.push(other),
        }
    }
}

/// Encodes `body` (header + payload, unescaped, without CRC) into a
/// complete on-wire frame: three leading `END`s, the escaped body with its
/// little-endian CRC-16 folded in, and one trailing `END`.
#[must_use]
pub fn encode(body: &[u8]) -> Vec<u8> {
    let crc = crc16(body);
    let mut out = Vec::with_capacity(body.len() * 2 + 6);
    out.extend_from_slice(&[END, END, END]);
    stuff(body, &mut out);
    stuff(&crc.to_le_bytes(), &mut out);
    out.push(END);
    out
}

/// Removes SLIP escaping from a body captured between `END` markers
/// (leading/trailing `END`s already stripped by the caller) and verifies
/// its trailing CRC-16.
///
/// Returns the body with the CRC bytes removed. `WRONG_CRC_FROM_HOST` is
/// distinguished from an ordinary CRC mismatch: it is the node's documented
/// sentinel (CRC field `0xFFFF`) for "I rejected your request's CRC."
pub fn unstuff_and_verify(escaped: &[u8]) -> Result<Vec<u8>> {
    let mut decoded = Vec::with_capacity(escaped.len());
    let mut iter = escaped.iter().copied().enumerate();
    while let Some((offset, b)) = iter.next() {
        if b == ESC {
            match iter.next() {
                Some((_, ESC_END)) => decoded.push(END),
                Some((_, ESC_ESC)) => decoded.push(ESC),
                _ => return Err(ProtoError::MalformedEscape { offset }),
            }
        } else {
            decoded.push(b);
        }
    }

    if decoded.len() < MIN_FRAME_LEN {
        return Err(ProtoError::FrameTooShort { len: decoded.len() });
    }

    let crc_offset = decoded.len() - 2;
    let body = &decoded[..crc_offset];
    let received = u16::from_le_bytes([decoded[crc_offset], decoded[crc_offset + 1]]);

    if received == 0xFFFF {
        return Err(ProtoError::WrongCrcFromHost);
    }

    if crc16(body) != received {
        return Err(ProtoError::WrongCrc);
    }

    decoded.truncate(crc_offset);
    Ok(decoded)
}

/// Incrementally reassembles `END`-delimited frames from a byte stream.
///
/// Feed it bytes as they arrive from the transport; each call to
/// [`Reader::push`] returns the escaped body of a completed frame, if any
/// full frame was just closed off. The minimum-length and stray-debug-byte
/// checks happen here, before CRC verification, exactly as in the original
/// frame reader: a too-short capture or one starting with `0x7F` is
/// discarded as line noise rather than surfaced as an error.
#[derive(Debug, Default)]
pub struct Reader {
    buf: Vec<u8>,
    in_frame: bool,
}

impl Reader {
    /// Creates an empty reader.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one byte from the wire. Returns `Some(escaped_body)` when a
    /// complete, plausible frame has just been closed by an `END` byte.
    pub fn push(&mut self, byte: u8) -> Option<Vec<u8>> {
        if byte == END {
            if !self.in_frame {
                self.in_frame = true;
                return None;
            }
            let frame = std::mem::take(&mut self.buf);
            if frame.len() < MIN_FRAME_LEN || frame[0] == 0x7F {
                // Line noise or a stray firmware debug byte: stay "in frame"
                // and keep collecting from here, matching the reference
                // reader's recovery behaviour.
                return None;
            }
            self.in_frame = false;
            return Some(frame);
        }

        if self.in_frame {
            self.buf.push(byte);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn crc_of_empty_is_init_value() {
        assert_eq!(crc16(&[]), 0xFFFF);
    }

    #[test]
    fn encode_has_three_leading_and_one_trailing_end() {
        let framed = encode(&[1, 2, 3]);
        assert_eq!(&framed[..3], &[END, END, END]);
        assert_eq!(*framed.last().unwrap(), END);
    }

    #[test]
    fn round_trip_through_reader() {
        let body = [0x0D, 0x00, 0x02, 0xAA, 0xBB];
        let framed = encode(&body);

        let mut reader = Reader::new();
        let mut got = None;
        for &b in &framed[1..] {
            // Skip the first leading END: it only opens the frame.
            if let Some(escaped) = reader.push(b) {
                got = Some(escaped);
            }
        }
        let escaped = got.expect("frame should have closed");
        let decoded = unstuff_and_verify(&escaped).expect("CRC should verify");
        assert_eq!(decoded, body);
    }

    #[test]
    fn corrupting_any_byte_breaks_the_crc() {
        let body = [0x0D, 0x07, 0x02, 0x10, 0x20];
        let framed = encode(&body);
        for i in 1..framed.len() - 1 {
            if framed[i] == END {
                continue;
            }
            let mut corrupt = framed.clone();
            corrupt[i] ^= 0xFF;

            let mut reader = Reader::new();
            let mut escaped = None;
            for &b in &corrupt[1..] {
                if let Some(e) = reader.push(b) {
                    escaped = Some(e);
                }
            }
            if let Some(escaped) = escaped {
                let result = unstuff_and_verify(&escaped);
                assert!(result.is_err(), "byte {i} corruption should have been caught");
            }
        }
    }

    proptest! {
        #[test]
        fn encode_then_reader_then_verify_round_trips(body in prop::collection::vec(any::<u8>(), 0..300)) {
            let framed = encode(&body);
            let mut reader = Reader::new();
            let mut got = None;
            for &b in &framed[1..] {
                if let Some(escaped) = reader.push(b) {
                    got = Some(escaped);
                }
            }
            let escaped = got.expect("frame should close");
            let decoded = unstuff_and_verify(&escaped).expect("CRC should verify");
            prop_assert_eq!(decoded, body);
        }
    }
}
