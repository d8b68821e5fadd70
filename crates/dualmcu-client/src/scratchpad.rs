//! Scratchpad (OTAP) upload and status, local and remote (§6.2, "Out of
//! scope" carve-out excludes firmware-side processing only — the host
//! side of writing, checking, and triggering an update is fully in
//! scope).
//!
//! Grounded in `msap.c`'s `msap_image_*` functions. Block writes use the
//! longer [`dualmcu_core::config::SCRATCHPAD_BLOCK_TIMEOUT`]; start/clear
//! use [`dualmcu_core::config::SCRATCHPAD_START_CLEAR_TIMEOUT`], since
//! both may trigger a flash erase on the node (§4.2).

use dualmcu_core::{config::{SCRATCHPAD_BLOCK_TIMEOUT, SCRATCHPAD_START_CLEAR_TIMEOUT}, Transport};
use dualmcu_proto::payloads::msap::{
    GenericConfirm, ScratchpadBlockReq, ScratchpadRemoteStatusReq, ScratchpadRemoteUpdateReq, ScratchpadStartReq,
    ScratchpadStatusConf, ScratchpadTarget, ScratchpadTargetReadConf, MAX_SCRATCHPAD_BLOCK_LEN,
};
use dualmcu_proto::primitive::Primitive;

use crate::{client::Client, error::Result};

impl<T: Transport + 'static> Client<T> {
    /// `WPC_start_scratchpad_update` (host side): announces the total
    /// image length and sequence number before any blocks are sent.
    /// `scratchpad_length` must be a multiple of 16 (node flash-page
    /// alignment requirement, not checked client-side — the node rejects
    /// a bad value via its own result code).
    pub fn scratchpad_start(&self, scratchpad_length: u32, scratchpad_sequence_number: u8) -> Result<()> {
        let req = ScratchpadStartReq { scratchpad_length, scratchpad_sequence_number };
        let confirm = self.engine().send_request_timeout(
            Primitive::MsapScratchpadStart.request_id(),
            req.encode(),
            SCRATCHPAD_START_CLEAR_TIMEOUT,
        )?;
        let conf = GenericConfirm::decode(&confirm.payload)?;
        crate::error::SapError::check("msap_scratchpad_start", conf.result)
    }

    /// Writes one scratchpad block at `start_address`. `bytes` must be
    /// 1..=112 long ([`MAX_SCRATCHPAD_BLOCK_LEN`]); split a larger image
    /// across multiple calls via [`Self::scratchpad_upload`].
    pub fn scratchpad_block(&self, start_address: u32, bytes: &[u8]) -> Result<()> {
        let req =
            ScratchpadBlockReq::new(start_address, bytes).map_err(|e| crate::error::SapError::WrongParam(e.to_string()))?;
        let confirm = self.engine().send_request_timeout(
            Primitive::MsapScratchpadBlock.request_id(),
            req.encode(),
            SCRATCHPAD_BLOCK_TIMEOUT,
        )?;
        let conf = GenericConfirm::decode(&confirm.payload)?;
        crate::error::SapError::check("msap_scratchpad_block", conf.result)
    }

    /// Uploads a complete scratchpad image: a `scratchpad_start` followed
    /// by as many `scratchpad_block` writes as needed to cover `image`,
    /// each at most [`MAX_SCRATCHPAD_BLOCK_LEN`] bytes. Does not start,
    /// clear, or update anything beyond the upload itself — callers pick
    /// the sequence number and follow up with [`Self::scratchpad_update`]
    /// or [`Self::scratchpad_target_write`] once the upload completes.
    pub fn scratchpad_upload(&self, image: &[u8], sequence_number: u8) -> Result<()> {
        #[allow(clippy::cast_possible_truncation)]
        self.scratchpad_start(image.len() as u32, sequence_number)?;
        for (i, chunk) in image.chunks(MAX_SCRATCHPAD_BLOCK_LEN).enumerate() {
            #[allow(clippy::cast_possible_truncation)]
            let offset = (i * MAX_SCRATCHPAD_BLOCK_LEN) as u32;
            self.scratchpad_block(offset, chunk)?;
        }
        Ok(())
    }

    /// Reads the stored and currently-processed scratchpad status.
    pub fn scratchpad_status(&self) -> Result<ScratchpadStatusConf> {
        let confirm = self.engine().send_request(Primitive::MsapScratchpadStatus.request_id(), Vec::new())?;
        Ok(ScratchpadStatusConf::decode(&confirm.payload)?)
    }

    /// Tells the node's bootloader to process the uploaded scratchpad
    /// (reboot into the new image). This is the only step with genuine
    /// node-side effects outside the host's control, per spec.md §1's
    /// carve-out of "firmware-side behaviour."
    pub fn scratchpad_update(&self) -> Result<()> {
        let confirm = self.engine().send_request(Primitive::MsapScratchpadUpdate.request_id(), Vec::new())?;
        let conf = GenericConfirm::decode(&confirm.payload)?;
        crate::error::SapError::check("msap_scratchpad_update", conf.result)
    }

    /// Erases the uploaded (not yet processed) scratchpad.
    pub fn scratchpad_clear(&self) -> Result<()> {
        let confirm = self.engine().send_request_timeout(
            Primitive::MsapScratchpadClear.request_id(),
            Vec::new(),
            SCRATCHPAD_START_CLEAR_TIMEOUT,
        )?;
        let conf = GenericConfirm::decode(&confirm.payload)?;
        crate::error::SapError::check("msap_scratchpad_clear", conf.result)
    }

    /// Reads the currently configured processing target (sequence, CRC,
    /// action, delay parameter).
    pub fn scratchpad_target_read(&self) -> Result<ScratchpadTarget> {
        let confirm = self.engine().send_request(Primitive::MsapScratchpadTargetRead.request_id(), Vec::new())?;
        let conf = ScratchpadTargetReadConf::decode(&confirm.payload)?;
        crate::error::SapError::check("msap_scratchpad_target_read", conf.result)?;
        Ok(conf.target)
    }

    /// Sets the processing target the node should apply once it reboots
    /// into the uploaded scratchpad.
    pub fn scratchpad_target_write(&self, target: ScratchpadTarget) -> Result<()> {
        let confirm = self.engine().send_request(Primitive::MsapScratchpadTargetWrite.request_id(), target.encode())?;
        let conf = GenericConfirm::decode(&confirm.payload)?;
        crate::error::SapError::check("msap_scratchpad_target_write", conf.result)
    }

    /// Reads back one stored scratchpad block, mirroring
    /// [`Self::scratchpad_block`]'s shape for verification after upload.
    /// Confirm shape: `u8 result; u8 bytes[number_of_bytes];` — the node
    /// only echoes the bytes actually requested, unlike the fixed-size
    /// attribute payloads.
    pub fn scratchpad_block_read(&self, start_address: u32, number_of_bytes: u8) -> Result<Vec<u8>> {
        let mut payload = start_address.to_le_bytes().to_vec();
        payload.push(number_of_bytes);
        let confirm = self.engine().send_request(Primitive::MsapScratchpadBlockRead.request_id(), payload)?;
        let result = confirm.payload.first().copied().unwrap_or(0);
        crate::error::SapError::check("msap_scratchpad_block_read", result)?;
        Ok(confirm.payload.get(1..).map(<[u8]>::to_vec).unwrap_or_default())
    }

    /// Queries a remote node's scratchpad status via the mesh (result
    /// arrives asynchronously as an `image_remote_status` indication,
    /// §4.4 — register via [`Client::callbacks`]'s `on_remote_status`).
    pub fn scratchpad_remote_status(&self, target: u32) -> Result<()> {
        let confirm = self
            .engine()
            .send_request(Primitive::MsapRemoteScratchpadStatus.request_id(), ScratchpadRemoteStatusReq { target }.encode())?;
        let conf = GenericConfirm::decode(&confirm.payload)?;
        crate::error::SapError::check("msap_remote_scratchpad_status", conf.result)
    }

    /// Requests a remote node apply scratchpad `seq` after `delay_s`
    /// seconds (`delay_s = 0` cancels a pending remote update).
    pub fn scratchpad_remote_update(&self, target: u32, seq: u8, delay_s: u16) -> Result<()> {
        let req = ScratchpadRemoteUpdateReq { target, seq, delay_s };
        let confirm = self.engine().send_request(Primitive::MsapRemoteScratchpadUpdate.request_id(), req.encode())?;
        let conf = GenericConfirm::decode(&confirm.payload)?;
        crate::error::SapError::check("msap_remote_scratchpad_update", conf.result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_chunk_count_matches_block_size() {
        let image = vec![0xAAu8; MAX_SCRATCHPAD_BLOCK_LEN * 3 + 1];
        let chunks: Vec<_> = image.chunks(MAX_SCRATCHPAD_BLOCK_LEN).collect();
        assert_eq!(chunks.len(), 4);
        assert_eq!(chunks.last().unwrap().len(), 1);
    }
}
