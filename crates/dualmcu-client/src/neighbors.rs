//! Neighbor discovery: request a scan, wait for the asynchronous
//! `scan_neighbors_done` indication, then pull the resulting table.
//!
//! Grounded in `msap.c`'s `msap_scan_nbors_request`/
//! `msap_get_nbors_request` pair: the scan itself runs on the node over
//! several seconds and only the confirm's "scan accepted" bit is
//! synchronous — completion is reported via indication, same pattern as
//! scratchpad remote-status.

use dualmcu_core::Transport;
use dualmcu_proto::{payloads::msap::{GenericConfirm, GetNeighborsConf, NeighborInfo}, primitive::Primitive};

use crate::{client::Client, error::Result};

impl<T: Transport + 'static> Client<T> {
    /// Requests the node start scanning for neighbors. Completion is
    /// reported asynchronously via the `scan_neighbors_done` channel
    /// (register with [`Client::callbacks`]'s `on_scan_neighbors_done`);
    /// call [`Self::get_neighbors`] once that fires.
    pub fn scan_neighbors(&self) -> Result<()> {
        let confirm = self.engine().send_request(Primitive::MsapScanNeighbors.request_id(), Vec::new())?;
        let conf = GenericConfirm::decode(&confirm.payload)?;
        crate::error::SapError::check("msap_scan_neighbors", conf.result)
    }

    /// Reads the neighbor table populated by the most recent completed
    /// scan.
    pub fn get_neighbors(&self) -> Result<Vec<NeighborInfo>> {
        let confirm = self.engine().send_request(Primitive::MsapGetNeighbors.request_id(), Vec::new())?;
        Ok(GetNeighborsConf::decode(&confirm.payload)?.neighbors)
    }
}
