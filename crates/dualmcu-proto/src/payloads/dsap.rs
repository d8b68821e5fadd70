//! Data Service Access Point payloads: application data transmission and
//! reception, plain, with time-to-travel, and fragmented (§6.3).

use super::{Cursor, QosHop, TxOptions};
use crate::error::Result;

/// Maximum APDU length this crate will encode/decode inline. The node's MTU
/// applies per fragment (§4.5); this is just an allocation bound for the
/// payload shapes below, not a protocol limit.
pub const MAX_APDU_LEN: usize = 240;

/// Fragmentation metadata appended to a fragmented data-tx/rx payload
/// (§6.3): `u16 full_packet_id; u16 fragment_offset_flag` where the top bit
/// of `fragment_offset_flag` marks the last fragment and the low 15 bits
/// are the byte offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FragmentInfo {
    /// 12-bit (wire: 16-bit field, 12 bits significant) packet id shared by
    /// all fragments of one logical packet.
    pub full_packet_id: u16,
    /// Byte offset of this fragment within the reassembled packet.
    pub fragment_offset: u16,
    /// Whether this is the last fragment (`full_size = offset + size`).
    pub last_fragment: bool,
}

const LAST_FRAGMENT_BIT: u16 = 0x8000;

impl FragmentInfo {
    fn encode(self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.full_packet_id.to_le_bytes());
        let mut flag = self.fragment_offset & !LAST_FRAGMENT_BIT;
        if self.last_fragment {
            flag |= LAST_FRAGMENT_BIT;
        }
        out.extend_from_slice(&flag.to_le_bytes());
    }

    fn decode(c: &mut Cursor<'_>) -> Result<Self> {
        let full_packet_id = c.u16_le("full_packet_id")?;
        let raw = c.u16_le("fragment_offset_flag")?;
        Ok(Self {
            full_packet_id,
            fragment_offset: raw & !LAST_FRAGMENT_BIT,
            last_fragment: raw & LAST_FRAGMENT_BIT != 0,
        })
    }
}

/// Time-to-travel / buffering-delay field, in the node's 1/128-second
/// internal time unit (§6.4) — this is the wire value. The engine boundary
/// (`dualmcu-client`'s `send_data_with_ttl`/`send_data_fragmented`) accepts
/// and reports this quantity in milliseconds instead, converting with
/// [`crate::timing::ms_to_internal_time`] before a request is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferingDelay(pub u32);

/// A DSAP data-tx request, in any of the three shapes §6.3 describes:
/// plain, with a buffering-delay (time-to-travel), or fragmented (which
/// implies a buffering-delay and appends [`FragmentInfo`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataTxReq {
    /// Application-assigned correlation id for a `tx-sent` callback.
    pub pdu_id: u16,
    /// Source endpoint.
    pub src_ep: u8,
    /// Destination address.
    pub dst_addr: u32,
    /// Destination endpoint.
    pub dst_ep: u8,
    /// Quality of service class.
    pub qos: u8,
    /// Transmission option flags.
    pub tx_options: TxOptions,
    /// Buffering delay, present when this request carries a
    /// time-to-travel or is fragmented.
    pub buffering_delay: Option<BufferingDelay>,
    /// Fragmentation metadata, present for fragmented sends.
    pub fragment: Option<FragmentInfo>,
    /// Application protocol data unit.
    pub apdu: Vec<u8>,
}

impl DataTxReq {
    /// Encodes to the wire representation, selecting plain / TTT /
    /// fragmented shape based on which optional fields are set.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(16 + self.apdu.len());
        out.extend_from_slice(&self.pdu_id.to_le_bytes());
        out.push(self.src_ep);
        out.extend_from_slice(&self.dst_addr.to_le_bytes());
        out.push(self.dst_ep);
        out.push(self.qos);
        out.push(self.tx_options.to_byte());
        if let Some(delay) = self.buffering_delay {
            out.extend_from_slice(&delay.0.to_le_bytes());
        }
        if let Some(frag) = self.fragment {
            frag.encode(&mut out);
        }
        #[allow(clippy::cast_possible_truncation)]
        out.push(self.apdu.len() as u8);
        out.extend_from_slice(&self.apdu);
        out
    }

    /// Decodes a request whose shape is known ahead of time (the wire
    /// format is not self-describing; the caller selects plain/TTT/
    /// fragmented by context, as the original API does).
    pub fn decode(bytes: &[u8], has_buffering_delay: bool, fragmented: bool) -> Result<Self> {
        let mut c = Cursor::new(bytes);
        let pdu_id = c.u16_le("pdu_id")?;
        let src_ep = c.u8("src_ep")?;
        let dst_addr = c.u32_le("dst_addr")?;
        let dst_ep = c.u8("dst_ep")?;
        let qos = c.u8("qos")?;
        let tx_options = TxOptions::from_byte(c.u8("tx_options")?);
        let buffering_delay = if has_buffering_delay || fragmented {
            Some(BufferingDelay(c.u32_le("buffering_delay")?))
        } else {
            None
        };
        let fragment = if fragmented { Some(FragmentInfo::decode(&mut c)?) } else { None };
        let apdu_len = c.u8("apdu_len")? as usize;
        let apdu = c.rest();
        if apdu.len() != apdu_len {
            return Err(crate::error::ProtoError::WrongParam {
                field: "apdu_len",
                reason: format!("claimed {apdu_len}, found {}", apdu.len()),
            });
        }
        Ok(Self {
            pdu_id,
            src_ep,
            dst_addr,
            dst_ep,
            qos,
            tx_options,
            buffering_delay,
            fragment,
            apdu: apdu.to_vec(),
        })
    }
}

/// A DSAP data-rx indication, plain or fragmented.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataRxInd {
    /// Node-level indication status.
    pub indication_status: u8,
    /// Source address.
    pub src_addr: u32,
    /// Source endpoint.
    pub src_ep: u8,
    /// Destination address.
    pub dst_addr: u32,
    /// Destination endpoint.
    pub dst_ep: u8,
    /// QoS class and hop count, packed.
    pub qos_hop: QosHop,
    /// Travel time, node-internal 1/128 s units as decoded off the wire.
    /// `dualmcu-core`'s engine converts this to milliseconds with
    /// [`crate::timing::internal_time_to_ms`] before handing the
    /// indication to the `data_rx` callback (§6.4); this field is the raw
    /// wire value, not yet converted.
    pub travel_time: u32,
    /// Fragmentation metadata, present for `data-rx-frag-ind`.
    pub fragment: Option<FragmentInfo>,
    /// Application protocol data unit (or fragment bytes).
    pub apdu: Vec<u8>,
}

impl DataRxInd {
    /// Decodes a plain or fragmented data-rx indication.
    pub fn decode(bytes: &[u8], fragmented: bool) -> Result<Self> {
        let mut c = Cursor::new(bytes);
        let indication_status = c.u8("indication_status")?;
        let src_addr = c.u32_le("src_add")?;
        let src_ep = c.u8("src_ep")?;
        let dst_addr = c.u32_le("dst_add")?;
        let dst_ep = c.u8("dst_ep")?;
        let qos_hop = QosHop::from_byte(c.u8("qos_hop")?);
        let travel_time = c.u32_le("travel_time")?;
        let fragment = if fragmented { Some(FragmentInfo::decode(&mut c)?) } else { None };
        let apdu_len = c.u8("apdu_len")? as usize;
        let apdu = c.rest();
        if apdu.len() != apdu_len {
            return Err(crate::error::ProtoError::WrongParam {
                field: "apdu_len",
                reason: format!("claimed {apdu_len}, found {}", apdu.len()),
            });
        }
        Ok(Self {
            indication_status,
            src_addr,
            src_ep,
            dst_addr,
            dst_ep,
            qos_hop,
            travel_time,
            fragment,
            apdu: apdu.to_vec(),
        })
    }

    /// Encodes to the wire representation. Mostly useful for tests and the
    /// in-memory harness, which synthesizes indications rather than
    /// receiving them over a real link.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(16 + self.apdu.len());
        out.push(self.indication_status);
        out.extend_from_slice(&self.src_addr.to_le_bytes());
        out.push(self.src_ep);
        out.extend_from_slice(&self.dst_addr.to_le_bytes());
        out.push(self.dst_ep);
        out.push(self.qos_hop.to_byte());
        out.extend_from_slice(&self.travel_time.to_le_bytes());
        if let Some(frag) = self.fragment {
            frag.encode(&mut out);
        }
        #[allow(clippy::cast_possible_truncation)]
        out.push(self.apdu.len() as u8);
        out.extend_from_slice(&self.apdu);
        out
    }
}

/// Node-side confirm to a `data_tx` request: just the node's acceptance
/// result code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataTxConf {
    /// Node result code (0 = accepted for sending).
    pub result: u8,
}

impl DataTxConf {
    /// Decodes from a raw payload.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let mut c = Cursor::new(bytes);
        let result = c.u8("result")?;
        c.finish("DataTxConf")?;
        Ok(Self { result })
    }

    /// Encodes to the wire representation.
    #[must_use]
    pub fn encode(self) -> Vec<u8> {
        vec![self.result]
    }
}

/// `data_tx_indication`: delivered once the node has finished attempting
/// to send a PDU for which `tx_indication_wanted` was set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataTxIndication {
    /// Correlation id matching the original request's `pdu_id`.
    pub pdu_id: u16,
    /// Outcome of the send attempt (node result code).
    pub status: u8,
}

impl DataTxIndication {
    /// Decodes from a raw payload.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let mut c = Cursor::new(bytes);
        let pdu_id = c.u16_le("pdu_id")?;
        let status = c.u8("status")?;
        c.finish("DataTxIndication")?;
        Ok(Self { pdu_id, status })
    }

    /// Encodes to the wire representation.
    #[must_use]
    pub fn encode(self) -> Vec<u8> {
        let mut out = self.pdu_id.to_le_bytes().to_vec();
        out.push(self.status);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tx(buffering_delay: bool, fragmented: bool) -> DataTxReq {
        DataTxReq {
            pdu_id: 7,
            src_ep: 1,
            dst_addr: 0x1234_5678,
            dst_ep: 2,
            qos: 1,
            tx_options: TxOptions { tx_indication_wanted: true, unack_csma_ca: false, hop_limit: 3 },
            buffering_delay: buffering_delay.then_some(BufferingDelay(128)),
            fragment: fragmented.then_some(FragmentInfo {
                full_packet_id: 42,
                fragment_offset: 100,
                last_fragment: true,
            }),
            apdu: vec![1, 2, 3, 4, 5],
        }
    }

    #[test]
    fn plain_tx_round_trips() {
        let req = sample_tx(false, false);
        let decoded = DataTxReq::decode(&req.encode(), false, false).unwrap();
        assert_eq!(req, decoded);
    }

    #[test]
    fn ttt_tx_round_trips() {
        let req = sample_tx(true, false);
        let decoded = DataTxReq::decode(&req.encode(), true, false).unwrap();
        assert_eq!(req, decoded);
    }

    #[test]
    fn fragmented_tx_round_trips() {
        let req = sample_tx(true, true);
        let decoded = DataTxReq::decode(&req.encode(), true, true).unwrap();
        assert_eq!(req, decoded);
        assert!(decoded.fragment.unwrap().last_fragment);
    }

    #[test]
    fn data_rx_ind_round_trips() {
        let ind = DataRxInd {
            indication_status: 0,
            src_addr: 5,
            src_ep: 1,
            dst_addr: 9,
            dst_ep: 2,
            qos_hop: QosHop { qos: true, hop_count: 2 },
            travel_time: 1000,
            fragment: Some(FragmentInfo { full_packet_id: 42, fragment_offset: 0, last_fragment: false }),
            apdu: vec![0xAA; 100],
        };
        let decoded = DataRxInd::decode(&ind.encode(), true).unwrap();
        assert_eq!(ind, decoded);
    }

    #[test]
    fn apdu_len_mismatch_is_rejected() {
        let mut bytes = sample_tx(false, false).encode();
        let last = bytes.len() - 1;
        bytes.truncate(last);
        assert!(DataTxReq::decode(&bytes, false, false).is_err());
    }
}
