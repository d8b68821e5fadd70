//! Configuration Service Access Point: node-wide attributes (address,
//! network, radio channel, MTU, version) and factory reset.
//!
//! Attribute ids are grounded verbatim in `csap.h`'s `C_*_ID` defines — the
//! node's own public attribute table, not invented here.

use dualmcu_core::Transport;
use dualmcu_proto::{payloads::attribute::FactoryResetReq, primitive::Primitive};

use crate::{client::Client, error::Result};

/// `C_NODE_ADDRESS_ID`.
pub const ATTR_NODE_ADDRESS: u16 = 1;
/// `C_NETWORK_ADDRESS_ID`.
pub const ATTR_NETWORK_ADDRESS: u16 = 2;
/// `C_NETWORK_CHANNEL_ID`.
pub const ATTR_NETWORK_CHANNEL: u16 = 3;
/// `C_NODE_ROLE_ID`.
pub const ATTR_NODE_ROLE: u16 = 4;
/// `C_MTU_ID`.
pub const ATTR_MTU: u16 = 5;
/// `C_PDU_BUFFER_SIZE_ID`.
pub const ATTR_PDU_BUFFER_SIZE: u16 = 6;
/// `C_SCRATCHPAD_SEQUENCE_ID`.
pub const ATTR_SCRATCHPAD_SEQUENCE: u16 = 7;
/// `C_MESH_API_VER_ID`.
pub const ATTR_MESH_API_VERSION: u16 = 8;
/// `C_FIRMWARE_MAJOR_ID`.
pub const ATTR_FIRMWARE_MAJOR: u16 = 9;
/// `C_FIRMWARE_MINOR_ID`.
pub const ATTR_FIRMWARE_MINOR: u16 = 10;
/// `C_FIRMWARE_MAINT_ID`.
pub const ATTR_FIRMWARE_MAINT: u16 = 11;
/// `C_FIRMWARE_DEV_ID`.
pub const ATTR_FIRMWARE_DEV: u16 = 12;
/// `C_CIPHER_KEY_ID`. Write-only on the node; the engine treats key
/// material as opaque bytes (spec.md §1 non-goals).
pub const ATTR_CIPHER_KEY: u16 = 13;
/// `C_AUTH_KEY_ID`. Same opaque-bytes treatment as [`ATTR_CIPHER_KEY`].
pub const ATTR_AUTH_KEY: u16 = 14;
/// `C_CHANNEL_LIM_ID`.
pub const ATTR_CHANNEL_LIMITS: u16 = 15;
/// `C_APP_CONFIG_DATA_SIZE_ID`.
pub const ATTR_APP_CONFIG_DATA_SIZE: u16 = 16;
/// `C_HW_MAGIC`.
pub const ATTR_HW_MAGIC: u16 = 17;
/// `C_STACK_PROFILE`.
pub const ATTR_STACK_PROFILE: u16 = 18;
/// `C_CHANNEL_MAP`.
pub const ATTR_CHANNEL_MAP: u16 = 21;

/// The key value the node's firmware requires on a factory-reset request
/// before it will wipe persistent attributes (`csap_factory_reset_request`
/// in the original hard-codes this same constant).
pub const FACTORY_RESET_KEY: u32 = 0xDEAD_BEEF;

impl<T: Transport + 'static> Client<T> {
    /// Reads a raw CSAP attribute. Most callers want one of the typed
    /// accessors below; this is the escape hatch for attribute ids this
    /// crate doesn't name yet.
    pub fn csap_attribute_read_raw(&self, attr_id: u16) -> Result<Vec<u8>> {
        let conf = crate::attribute::read(
            self.engine(),
            Primitive::CsapAttributeRead.request_id(),
            "csap_attribute_read",
            attr_id,
        )?;
        Ok(conf.value().to_vec())
    }

    /// Writes a raw CSAP attribute.
    pub fn csap_attribute_write_raw(&self, attr_id: u16, value: &[u8]) -> Result<()> {
        crate::attribute::write(
            self.engine(),
            Primitive::CsapAttributeWrite.request_id(),
            "csap_attribute_write",
            attr_id,
            value,
        )
    }

    /// `WPC_get_node_address`.
    pub fn node_address(&self) -> Result<u32> {
        Ok(u32_from(&self.csap_attribute_read_raw(ATTR_NODE_ADDRESS)?))
    }

    /// `WPC_set_node_address`.
    pub fn set_node_address(&self, address: u32) -> Result<()> {
        self.csap_attribute_write_raw(ATTR_NODE_ADDRESS, &address.to_le_bytes())
    }

    /// `WPC_get_network_address`.
    pub fn network_address(&self) -> Result<u32> {
        Ok(u32_from(&self.csap_attribute_read_raw(ATTR_NETWORK_ADDRESS)?))
    }

    /// `WPC_set_network_address`.
    pub fn set_network_address(&self, address: u32) -> Result<()> {
        self.csap_attribute_write_raw(ATTR_NETWORK_ADDRESS, &address.to_le_bytes())
    }

    /// `WPC_get_network_channel`.
    pub fn network_channel(&self) -> Result<u8> {
        Ok(self.csap_attribute_read_raw(ATTR_NETWORK_CHANNEL)?.first().copied().unwrap_or(0))
    }

    /// `WPC_set_network_channel`.
    pub fn set_network_channel(&self, channel: u8) -> Result<()> {
        self.csap_attribute_write_raw(ATTR_NETWORK_CHANNEL, &[channel])
    }

    /// `WPC_get_role`. The node role byte is treated opaquely (spec.md
    /// GLOSSARY: "Sink/Headnode/Subnode ... treated opaquely by the
    /// engine").
    pub fn node_role(&self) -> Result<u8> {
        Ok(self.csap_attribute_read_raw(ATTR_NODE_ROLE)?.first().copied().unwrap_or(0))
    }

    /// `WPC_set_role`.
    pub fn set_node_role(&self, role: u8) -> Result<()> {
        self.csap_attribute_write_raw(ATTR_NODE_ROLE, &[role])
    }

    /// `WPC_get_firmware_version`: major, minor, maintenance, development.
    pub fn firmware_version(&self) -> Result<(u8, u8, u8, u8)> {
        Ok((
            self.csap_attribute_read_raw(ATTR_FIRMWARE_MAJOR)?.first().copied().unwrap_or(0),
            self.csap_attribute_read_raw(ATTR_FIRMWARE_MINOR)?.first().copied().unwrap_or(0),
            self.csap_attribute_read_raw(ATTR_FIRMWARE_MAINT)?.first().copied().unwrap_or(0),
            self.csap_attribute_read_raw(ATTR_FIRMWARE_DEV)?.first().copied().unwrap_or(0),
        ))
    }

    /// `WPC_get_channel_limits`: first, last usable radio channel.
    pub fn channel_limits(&self) -> Result<(u8, u8)> {
        let raw = self.csap_attribute_read_raw(ATTR_CHANNEL_LIMITS)?;
        Ok((raw.first().copied().unwrap_or(0), raw.get(1).copied().unwrap_or(0)))
    }

    /// `WPC_do_factory_reset`: wipes persistent attributes on the node.
    /// Irreversible — the node forgets its address, keys, and role.
    pub fn factory_reset(&self) -> Result<()> {
        let confirm = self.engine().send_request(
            Primitive::CsapFactoryReset.request_id(),
            FactoryResetReq { reset_key: FACTORY_RESET_KEY }.encode(),
        )?;
        let conf = dualmcu_proto::payloads::msap::GenericConfirm::decode(&confirm.payload)?;
        crate::error::SapError::check("csap_factory_reset", conf.result)
    }
}

fn u32_from(bytes: &[u8]) -> u32 {
    let mut buf = [0u8; 4];
    let n = bytes.len().min(4);
    buf[..n].copy_from_slice(&bytes[..n]);
    u32::from_le_bytes(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn u32_from_short_slice_zero_pads() {
        assert_eq!(u32_from(&[1, 2]), 0x0000_0201);
    }
}
