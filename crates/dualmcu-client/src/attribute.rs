//! Shared attribute get/set plumbing for CSAP/MSAP/LSAP (§4.6 of spec.md:
//! "every attribute get/set lowers to one request/confirm round-trip").
//!
//! Grounded in `attribute.c`'s `attribute_read_request`/
//! `attribute_write_request`: both CSAP and MSAP (and LSAP) attribute
//! calls funnel through the same two functions, parameterized only by
//! which primitive id to send. This module is that shared funnel.

use dualmcu_core::{Engine, Transport};
use dualmcu_proto::payloads::{
    attribute::{AttributeReadConf, AttributeReadReq, AttributeWriteReq},
    msap::GenericConfirm,
};

use crate::error::{Result, SapError};

/// Reads `attr_id` via `request_primitive`, validating the node result
/// code under `name` before handing back the decoded confirm.
pub(crate) fn read<T: Transport + 'static>(
    engine: &Engine<T>,
    request_primitive: u8,
    name: &'static str,
    attr_id: u16,
) -> Result<AttributeReadConf> {
    let confirm = engine.send_request(request_primitive, AttributeReadReq { attr_id }.encode())?;
    let conf = AttributeReadConf::decode(&confirm.payload)?;
    SapError::check(name, conf.result)?;
    Ok(conf)
}

/// Writes `value` to `attr_id` via `request_primitive`.
pub(crate) fn write<T: Transport + 'static>(
    engine: &Engine<T>,
    request_primitive: u8,
    name: &'static str,
    attr_id: u16,
    value: &[u8],
) -> Result<()> {
    let req = AttributeWriteReq::new(attr_id, value).map_err(|e| SapError::WrongParam(e.to_string()))?;
    let confirm = engine.send_request(request_primitive, req.encode())?;
    let conf = GenericConfirm::decode(&confirm.payload)?;
    SapError::check(name, conf.result)
}
