//! Generic attribute read/write payloads shared by CSAP, MSAP and LSAP
//! (§6.3). The node interprets `attr_id` and `value` according to its own
//! attribute table; this crate treats them opaquely beyond length and
//! encoding.

use super::Cursor;
use crate::error::Result;

/// Maximum attribute value length carried inline in a request/confirm
/// (matches the original `attribute.h` payload union member).
pub const MAX_ATTRIBUTE_VALUE_LEN: usize = 16;

/// `u16 attr_id; u8 len; u8 value[16];`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeWriteReq {
    /// Attribute identifier.
    pub attr_id: u16,
    /// Number of valid bytes in `value`.
    pub len: u8,
    /// Attribute value, zero-padded to [`MAX_ATTRIBUTE_VALUE_LEN`].
    pub value: [u8; MAX_ATTRIBUTE_VALUE_LEN],
}

impl AttributeWriteReq {
    /// Builds a request from a value slice no longer than
    /// [`MAX_ATTRIBUTE_VALUE_LEN`].
    pub fn new(attr_id: u16, value: &[u8]) -> Result<Self> {
        if value.len() > MAX_ATTRIBUTE_VALUE_LEN {
            return Err(crate::error::ProtoError::WrongParam {
                field: "value",
                reason: format!("{} bytes exceeds {MAX_ATTRIBUTE_VALUE_LEN}", value.len()),
            });
        }
        let mut buf = [0u8; MAX_ATTRIBUTE_VALUE_LEN];
        buf[..value.len()].copy_from_slice(value);
        #[allow(clippy::cast_possible_truncation)]
        Ok(Self { attr_id, len: value.len() as u8, value: buf })
    }

    /// Encodes to the wire representation.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(3 + MAX_ATTRIBUTE_VALUE_LEN);
        out.extend_from_slice(&self.attr_id.to_le_bytes());
        out.push(self.len);
        out.extend_from_slice(&self.value);
        out
    }

    /// Decodes from a raw payload.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let mut c = Cursor::new(bytes);
        let attr_id = c.u16_le("attr_id")?;
        let len = c.u8("len")?;
        let value = c.array::<MAX_ATTRIBUTE_VALUE_LEN>("value")?;
        c.finish("AttributeWriteReq")?;
        Ok(Self { attr_id, len, value })
    }

    /// The valid prefix of `value`, per `len`.
    #[must_use]
    pub fn value(&self) -> &[u8] {
        &self.value[..(self.len as usize).min(MAX_ATTRIBUTE_VALUE_LEN)]
    }
}

/// `u16 attr_id;`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeReadReq {
    /// Attribute identifier to read.
    pub attr_id: u16,
}

impl AttributeReadReq {
    /// Encodes to the wire representation.
    #[must_use]
    pub fn encode(self) -> Vec<u8> {
        self.attr_id.to_le_bytes().to_vec()
    }

    /// Decodes from a raw payload.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let mut c = Cursor::new(bytes);
        let attr_id = c.u16_le("attr_id")?;
        c.finish("AttributeReadReq")?;
        Ok(Self { attr_id })
    }
}

/// `u8 result; u16 attr_id; u8 len; u8 value[16];`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeReadConf {
    /// Node result code (0 = success).
    pub result: u8,
    /// Attribute identifier that was read.
    pub attr_id: u16,
    /// Number of valid bytes in `value`.
    pub len: u8,
    /// Attribute value, zero-padded to [`MAX_ATTRIBUTE_VALUE_LEN`].
    pub value: [u8; MAX_ATTRIBUTE_VALUE_LEN],
}

impl AttributeReadConf {
    /// Encodes to the wire representation.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(4 + MAX_ATTRIBUTE_VALUE_LEN);
        out.push(self.result);
        out.extend_from_slice(&self.attr_id.to_le_bytes());
        out.push(self.len);
        out.extend_from_slice(&self.value);
        out
    }

    /// Decodes from a raw payload.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let mut c = Cursor::new(bytes);
        let result = c.u8("result")?;
        let attr_id = c.u16_le("attr_id")?;
        let len = c.u8("len")?;
        let value = c.array::<MAX_ATTRIBUTE_VALUE_LEN>("value")?;
        c.finish("AttributeReadConf")?;
        Ok(Self { result, attr_id, len, value })
    }

    /// The valid prefix of `value`, per `len`.
    #[must_use]
    pub fn value(&self) -> &[u8] {
        &self.value[..(self.len as usize).min(MAX_ATTRIBUTE_VALUE_LEN)]
    }
}

/// `u32 reset_key;` — CSAP factory reset request. The node only honors
/// this with the documented reset key; any other value is rejected with
/// a node result code, same as a malformed attribute write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FactoryResetReq {
    /// Confirmation key the node's firmware expects before wiping
    /// persistent attributes.
    pub reset_key: u32,
}

impl FactoryResetReq {
    /// Encodes to the wire representation.
    #[must_use]
    pub fn encode(self) -> Vec<u8> {
        self.reset_key.to_le_bytes().to_vec()
    }

    /// Decodes from a raw payload.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let mut c = Cursor::new(bytes);
        let reset_key = c.u32_le("reset_key")?;
        c.finish("FactoryResetReq")?;
        Ok(Self { reset_key })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factory_reset_round_trips() {
        let req = FactoryResetReq { reset_key: 0xDEAD_BEEF };
        assert_eq!(FactoryResetReq::decode(&req.encode()).unwrap(), req);
    }

    #[test]
    fn write_req_round_trips() {
        let req = AttributeWriteReq::new(13, &[1, 2, 3]).unwrap();
        let decoded = AttributeWriteReq::decode(&req.encode()).unwrap();
        assert_eq!(req, decoded);
        assert_eq!(decoded.value(), &[1, 2, 3]);
    }

    #[test]
    fn write_req_rejects_oversized_value() {
        let value = vec![0u8; MAX_ATTRIBUTE_VALUE_LEN + 1];
        assert!(AttributeWriteReq::new(1, &value).is_err());
    }

    #[test]
    fn read_conf_round_trips() {
        let conf = AttributeReadConf { result: 0, attr_id: 42, len: 2, value: [0; 16] };
        let decoded = AttributeReadConf::decode(&conf.encode()).unwrap();
        assert_eq!(conf, decoded);
    }

    #[test]
    fn read_conf_rejects_truncated_payload() {
        assert!(AttributeReadConf::decode(&[0, 1]).is_err());
    }
}
