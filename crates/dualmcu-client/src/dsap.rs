//! Data Service Access Point: application data transmission, plain, with
//! time-to-travel, and fragmented (§6.3).
//!
//! Grounded in `wpc.h`'s `WPC_send_data*` family and `dsap.c`'s fragment
//! chunking loop: a send whose APDU fits the node's MTU goes out as one
//! `data_tx` request; a longer one is split into MTU-sized fragments that
//! share a `full_packet_id`, each sent as its own request/confirm
//! round-trip, matching how the node's own reassembler expects them.

use std::sync::atomic::{AtomicU16, Ordering};

use dualmcu_core::Transport;
use dualmcu_proto::payloads::dsap::{BufferingDelay, DataTxConf, DataTxIndication, DataTxReq, FragmentInfo};
use dualmcu_proto::payloads::TxOptions;
use dualmcu_proto::primitive::Primitive;

use crate::{client::Client, error::Result};

/// 12 significant bits (§6.3: the wire field is 16 bits wide but only the
/// low 12 carry the packet id; the top nibble is unused by the node).
const PACKET_ID_MASK: u16 = 0x0FFF;

/// Generates packet ids for fragmented sends, wrapping within the wire
/// field's 12 significant bits. One counter per process is sufficient: the
/// node only needs uniqueness among packets concurrently in flight from
/// this source address, and older ids will long since have been
/// reassembled or garbage-collected by the time the counter wraps.
static NEXT_PACKET_ID: AtomicU16 = AtomicU16::new(0);

fn next_packet_id() -> u16 {
    NEXT_PACKET_ID.fetch_add(1, Ordering::Relaxed) & PACKET_ID_MASK
}

impl<T: Transport + 'static> Client<T> {
    /// Sends `apdu` as a single, unfragmented PDU. Fails with
    /// [`crate::error::SapError::WrongParam`] if `apdu` is longer than the
    /// node's cached MTU ([`Self::mtu`]) — call [`Self::send_data_fragmented`]
    /// for longer payloads instead of truncating silently.
    #[allow(clippy::too_many_arguments)]
    pub fn send_data(
        &self,
        pdu_id: u16,
        src_ep: u8,
        dst_addr: u32,
        dst_ep: u8,
        qos: u8,
        tx_options: TxOptions,
        apdu: &[u8],
    ) -> Result<()> {
        if apdu.len() > self.mtu() as usize {
            return Err(crate::error::SapError::WrongParam(format!(
                "apdu of {} bytes exceeds mtu of {}",
                apdu.len(),
                self.mtu()
            )));
        }
        let req = DataTxReq {
            pdu_id,
            src_ep,
            dst_addr,
            dst_ep,
            qos,
            tx_options,
            buffering_delay: None,
            fragment: None,
            apdu: apdu.to_vec(),
        };
        self.send_data_tx(req, tx_options.tx_indication_wanted, None)
    }

    /// Sends `apdu` with a time-to-travel (buffering delay) budget,
    /// `buffering_delay_ms` given in milliseconds as the public API does
    /// (`wpc.h`'s `WPC_send_data`); converted to the node's 1/128-second
    /// internal units (§6.4) only when the request is built.
    #[allow(clippy::too_many_arguments)]
    pub fn send_data_with_ttl(
        &self,
        pdu_id: u16,
        src_ep: u8,
        dst_addr: u32,
        dst_ep: u8,
        qos: u8,
        tx_options: TxOptions,
        buffering_delay_ms: u32,
        apdu: &[u8],
    ) -> Result<()> {
        let buffering_delay = BufferingDelay(dualmcu_proto::timing::ms_to_internal_time(buffering_delay_ms));
        let req = DataTxReq {
            pdu_id,
            src_ep,
            dst_addr,
            dst_ep,
            qos,
            tx_options,
            buffering_delay: Some(buffering_delay),
            fragment: None,
            apdu: apdu.to_vec(),
        };
        self.send_data_tx(req, tx_options.tx_indication_wanted, None)
    }

    /// Sends `apdu` of any length, splitting it across as many MTU-sized
    /// fragments as needed and sending each as its own
    /// `data-tx-frag-req`/confirm round-trip. `buffering_delay_ms`, given
    /// in milliseconds, applies to every fragment (fragmented sends always
    /// carry one, §6.3) and is converted to the node's internal units once
    /// (§6.4), not per fragment.
    ///
    /// `on_sent` fires once, for the *last* fragment's outcome indication
    /// only — matching `WPC_send_data_frag`'s behaviour of reporting
    /// completion once the final fragment is accepted, not once per
    /// fragment.
    #[allow(clippy::too_many_arguments)]
    pub fn send_data_fragmented(
        &self,
        pdu_id: u16,
        src_ep: u8,
        dst_addr: u32,
        dst_ep: u8,
        qos: u8,
        mut tx_options: TxOptions,
        buffering_delay_ms: u32,
        apdu: &[u8],
        mut on_sent: Option<Box<dyn FnOnce(DataTxIndication) + Send>>,
    ) -> Result<()> {
        let buffering_delay = BufferingDelay(dualmcu_proto::timing::ms_to_internal_time(buffering_delay_ms));
        let mtu = self.mtu().max(1) as usize;
        let full_packet_id = next_packet_id();
        let chunks: Vec<_> = apdu.chunks(mtu).collect();
        let last = chunks.len().saturating_sub(1);
        let wants_indication = tx_options.tx_indication_wanted;
        tx_options.tx_indication_wanted = false;

        for (i, chunk) in chunks.iter().enumerate() {
            let is_last = i == last;
            let req = DataTxReq {
                pdu_id,
                src_ep,
                dst_addr,
                dst_ep,
                qos,
                tx_options: TxOptions { tx_indication_wanted: is_last && wants_indication, ..tx_options },
                buffering_delay: Some(buffering_delay),
                fragment: Some(FragmentInfo {
                    full_packet_id,
                    #[allow(clippy::cast_possible_truncation)]
                    fragment_offset: (i * mtu) as u16,
                    last_fragment: is_last,
                }),
                apdu: chunk.to_vec(),
            };
            let callback = if is_last && wants_indication { on_sent.take() } else { None };
            self.send_data_tx(req, is_last && wants_indication, callback)?;
        }
        Ok(())
    }

    fn send_data_tx(
        &self,
        req: DataTxReq,
        register_callback: bool,
        on_sent: Option<Box<dyn FnOnce(DataTxIndication) + Send>>,
    ) -> Result<()> {
        let pdu_id = req.pdu_id;
        if register_callback {
            if let Some(callback) = on_sent {
                self.engine().pending_tx().register(pdu_id, callback);
            }
        }
        let confirm = self.engine().send_request(Primitive::DsapDataTx.request_id(), req.encode())?;
        let conf = DataTxConf::decode(&confirm.payload)?;
        crate::error::SapError::check("dsap_data_tx", conf.result)
    }
}
