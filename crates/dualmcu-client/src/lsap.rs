//! Local Service Access Point: attributes that apply to the host-side link
//! itself rather than the node's mesh configuration.
//!
//! Grounded in `lsap.h`, which defines a single attribute and otherwise
//! forwards straight to the same shared `attribute_read_request`/
//! `attribute_write_request` funnel CSAP and MSAP use.

use dualmcu_core::Transport;
use dualmcu_proto::primitive::Primitive;

use crate::{client::Client, error::Result};

/// `L_WAKEUP_TIME`.
pub const ATTR_WAKEUP_TIME: u16 = 1;

impl<T: Transport + 'static> Client<T> {
    /// Reads a raw LSAP attribute.
    pub fn lsap_attribute_read_raw(&self, attr_id: u16) -> Result<Vec<u8>> {
        let conf = crate::attribute::read(
            self.engine(),
            Primitive::LsapAttributeRead.request_id(),
            "lsap_attribute_read",
            attr_id,
        )?;
        Ok(conf.value().to_vec())
    }

    /// Writes a raw LSAP attribute.
    pub fn lsap_attribute_write_raw(&self, attr_id: u16, value: &[u8]) -> Result<()> {
        crate::attribute::write(
            self.engine(),
            Primitive::LsapAttributeWrite.request_id(),
            "lsap_attribute_write",
            attr_id,
            value,
        )
    }

    /// The node's wakeup time, in its own internal units.
    pub fn wakeup_time(&self) -> Result<u32> {
        let raw = self.lsap_attribute_read_raw(ATTR_WAKEUP_TIME)?;
        let mut buf = [0u8; 4];
        let n = raw.len().min(4);
        buf[..n].copy_from_slice(&raw[..n]);
        Ok(u32::from_le_bytes(buf))
    }

    /// Sets the node's wakeup time.
    pub fn set_wakeup_time(&self, wakeup_time: u32) -> Result<()> {
        self.lsap_attribute_write_raw(ATTR_WAKEUP_TIME, &wakeup_time.to_le_bytes())
    }
}
