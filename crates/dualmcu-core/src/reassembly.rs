//! Fragment reassembly (§4.5), a direct generalization of the C
//! implementation's `reassembly.c`: a map keyed by `(src_addr, packet_id)`
//! accumulating fragments until the last one reveals the full size, at
//! which point the packet is "full" and can be pulled out and assembled.

use std::{
    collections::HashMap,
    sync::Mutex,
    time::{Duration, Instant},
};

/// A single fragment handed to the reassembler as it arrives off the wire.
#[derive(Debug, Clone)]
pub struct Fragment {
    /// Address the fragment was received from.
    pub src_addr: u32,
    /// Full-packet id shared by every fragment of the same original packet.
    pub packet_id: u16,
    /// Byte offset of this fragment within the reassembled packet.
    pub offset: usize,
    /// Fragment payload.
    pub bytes: Vec<u8>,
    /// Set on the fragment carrying the highest offset, revealing the full
    /// packet's total size as `offset + bytes.len()`.
    pub last_fragment: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct PacketKey {
    src_addr: u32,
    packet_id: u16,
}

struct PartialPacket {
    fragments: Vec<(usize, Vec<u8>)>,
    full_size: Option<usize>,
    is_full: bool,
    last_activity: Instant,
}

impl PartialPacket {
    fn new() -> Self {
        Self { fragments: Vec::new(), full_size: None, is_full: false, last_activity: Instant::now() }
    }

    /// Mirrors `add_fragment_to_full_packet`: rejects a duplicate offset,
    /// otherwise appends and, if this is the last fragment, records the
    /// now-known full size.
    fn add(&mut self, offset: usize, bytes: Vec<u8>, last_fragment: bool) -> bool {
        if self.fragments.iter().any(|(o, _)| *o == offset) {
            return false;
        }
        if last_fragment {
            self.full_size = Some(offset + bytes.len());
        }
        self.fragments.push((offset, bytes));
        self.last_activity = Instant::now();
        true
    }

    /// Mirrors `is_packet_full`: once cached, stays full; otherwise sums
    /// received fragment sizes and compares against the known full size.
    fn recompute_is_full(&mut self) -> bool {
        if self.is_full {
            return true;
        }
        let Some(full_size) = self.full_size else { return false };
        let received: usize = self.fragments.iter().map(|(_, b)| b.len()).sum();
        if received == full_size {
            self.is_full = true;
        }
        self.is_full
    }
}

/// Reassembles fragmented packets (§4.5).
///
/// Garbage collection is rate-limited to once every [`MIN_GC_PERIOD`] and,
/// when `max_fragment_retention` is non-zero, drops any partial packet
/// whose last fragment arrived longer ago than that retention window.
pub struct Reassembler {
    packets: Mutex<HashMap<PacketKey, PartialPacket>>,
    max_fragment_retention: Duration,
    last_gc: Mutex<Instant>,
}

/// Minimum spacing between two garbage collection passes.
pub const MIN_GC_PERIOD: Duration = crate::config::MIN_GC_PERIOD;

impl Reassembler {
    /// Creates a reassembler. `max_fragment_retention == Duration::ZERO`
    /// disables garbage collection of stale partial packets.
    #[must_use]
    pub fn new(max_fragment_retention: Duration) -> Self {
        Self {
            packets: Mutex::new(HashMap::new()),
            max_fragment_retention,
            last_gc: Mutex::new(Instant::now() - MIN_GC_PERIOD),
        }
    }

    /// Adds one fragment. Returns `Some(full_size)` once the packet it
    /// belongs to is complete (the fragment that completes it may not be
    /// the one carrying `last_fragment`, if fragments arrived out of
    /// order), `None` while it remains partial, and an error if this
    /// offset was already received for this `(src_addr, packet_id)`.
    pub fn add_fragment(&self, fragment: Fragment) -> Result<Option<usize>, DuplicateFragment> {
        let key = PacketKey { src_addr: fragment.src_addr, packet_id: fragment.packet_id };
        let mut packets = self.packets.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        let entry = packets.entry(key).or_insert_with(PartialPacket::new);

        if !entry.add(fragment.offset, fragment.bytes, fragment.last_fragment) {
            return Err(DuplicateFragment { src_addr: fragment.src_addr, packet_id: fragment.packet_id, offset: fragment.offset });
        }

        Ok(entry.recompute_is_full().then_some(entry.full_size.unwrap_or(0)))
    }

    /// Copies a complete packet's bytes into `buffer` and removes it from
    /// the reassembler. Returns the number of bytes written.
    pub fn take_full(&self, src_addr: u32, packet_id: u16, buffer: &mut [u8]) -> Result<usize, TakeFullError> {
        let key = PacketKey { src_addr, packet_id };
        let mut packets = self.packets.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        let Some(entry) = packets.get(&key) else { return Err(TakeFullError::NotFound) };
        if !entry.is_full {
            return Err(TakeFullError::NotFull);
        }
        let full_size = entry.full_size.unwrap_or(0);
        if buffer.len() < full_size {
            return Err(TakeFullError::BufferTooSmall { needed: full_size, available: buffer.len() });
        }

        let entry = packets.remove(&key).expect("presence checked above");
        for (offset, bytes) in entry.fragments {
            buffer[offset..offset + bytes.len()].copy_from_slice(&bytes);
        }
        Ok(full_size)
    }

    /// Whether any partial or complete packet is currently held.
    #[must_use]
    pub fn is_queue_empty(&self) -> bool {
        let packets = self.packets.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        packets.is_empty()
    }

    /// Drops partial packets that have exceeded `max_fragment_retention`
    /// without fresh activity, at most once per [`MIN_GC_PERIOD`]. Returns
    /// the number of packets dropped.
    pub fn garbage_collect(&self) -> usize {
        if self.max_fragment_retention.is_zero() {
            return 0;
        }
        let mut last_gc = self.last_gc.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        if last_gc.elapsed() < MIN_GC_PERIOD {
            return 0;
        }
        *last_gc = Instant::now();
        drop(last_gc);

        let mut packets = self.packets.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        let before = packets.len();
        packets.retain(|_, p| p.last_activity.elapsed() <= self.max_fragment_retention);
        before - packets.len()
    }
}

/// A fragment arrived at an offset already received for its packet.
#[derive(Debug, Clone, Copy, thiserror::Error)]
#[error("duplicate fragment (src={src_addr}, id={packet_id}, offset={offset})")]
pub struct DuplicateFragment {
    /// Source address of the duplicated packet.
    pub src_addr: u32,
    /// Packet id of the duplicated packet.
    pub packet_id: u16,
    /// Offset that had already been received.
    pub offset: usize,
}

/// Failure modes of [`Reassembler::take_full`].
#[derive(Debug, Clone, Copy, thiserror::Error)]
pub enum TakeFullError {
    /// No record exists for this `(src_addr, packet_id)`.
    #[error("no such packet")]
    NotFound,
    /// The record exists but is not yet complete.
    #[error("packet not yet fully reassembled")]
    NotFull,
    /// The caller's buffer was smaller than the reassembled packet.
    #[error("buffer too small: need {needed}, have {available}")]
    BufferTooSmall {
        /// Bytes required.
        needed: usize,
        /// Bytes available.
        available: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frag(offset: usize, bytes: &[u8], last: bool) -> Fragment {
        Fragment { src_addr: 1, packet_id: 10, offset, bytes: bytes.to_vec(), last_fragment: last }
    }

    #[test]
    fn two_in_order_fragments_become_full() {
        let r = Reassembler::new(Duration::ZERO);
        assert_eq!(r.add_fragment(frag(0, &[1, 2, 3], false)).unwrap(), None);
        assert_eq!(r.add_fragment(frag(3, &[4, 5], true)).unwrap(), Some(5));

        let mut buf = [0u8; 5];
        let n = r.take_full(1, 10, &mut buf).unwrap();
        assert_eq!(n, 5);
        assert_eq!(buf, [1, 2, 3, 4, 5]);
    }

    #[test]
    fn out_of_order_fragments_become_full_on_whichever_completes_them() {
        let r = Reassembler::new(Duration::ZERO);
        assert_eq!(r.add_fragment(frag(3, &[4, 5], true)).unwrap(), None);
        assert_eq!(r.add_fragment(frag(0, &[1, 2, 3], false)).unwrap(), Some(5));
    }

    #[test]
    fn duplicate_offset_rejected() {
        let r = Reassembler::new(Duration::ZERO);
        r.add_fragment(frag(0, &[1, 2], false)).unwrap();
        let err = r.add_fragment(frag(0, &[9, 9], false)).unwrap_err();
        assert_eq!(err.offset, 0);
    }

    #[test]
    fn take_full_on_incomplete_packet_fails() {
        let r = Reassembler::new(Duration::ZERO);
        r.add_fragment(frag(0, &[1, 2], false)).unwrap();
        let mut buf = [0u8; 8];
        assert!(matches!(r.take_full(1, 10, &mut buf), Err(TakeFullError::NotFull)));
    }

    #[test]
    fn take_full_buffer_too_small() {
        let r = Reassembler::new(Duration::ZERO);
        r.add_fragment(frag(0, &[1, 2, 3], true)).unwrap();
        let mut buf = [0u8; 2];
        assert!(matches!(
            r.take_full(1, 10, &mut buf),
            Err(TakeFullError::BufferTooSmall { needed: 3, available: 2 })
        ));
    }

    #[test]
    fn gc_disabled_when_retention_is_zero() {
        let r = Reassembler::new(Duration::ZERO);
        r.add_fragment(frag(0, &[1], false)).unwrap();
        assert_eq!(r.garbage_collect(), 0);
        assert!(!r.is_queue_empty());
    }

    #[test]
    fn empty_queue_reported_correctly() {
        let r = Reassembler::new(Duration::ZERO);
        assert!(r.is_queue_empty());
        r.add_fragment(frag(0, &[1], true)).unwrap();
        assert!(!r.is_queue_empty());
    }
}
