//! Typed CSAP/MSAP/DSAP/LSAP shims over [`dualmcu_core::Engine`] (§4.6,
//! §6): one request/confirm round-trip per call, node result codes mapped
//! to [`SapError::NodeRejected`], fragmentation and scratchpad chunking
//! handled so callers never touch raw primitive ids.
//!
//! Grounded in `wpc.h`'s public API: this crate is the `WPC_*` function
//! surface, minus the process-global singleton the original makes of it —
//! here every node gets its own [`Client`] value instead.

mod attribute;
mod client;
mod csap;
mod dsap;
mod error;
mod lsap;
mod msap;
mod neighbors;
mod node_result;
mod scratchpad;

pub use client::Client;
pub use csap::{
    ATTR_APP_CONFIG_DATA_SIZE, ATTR_AUTH_KEY, ATTR_CHANNEL_LIMITS, ATTR_CHANNEL_MAP, ATTR_CIPHER_KEY,
    ATTR_FIRMWARE_DEV, ATTR_FIRMWARE_MAINT, ATTR_FIRMWARE_MAJOR, ATTR_FIRMWARE_MINOR, ATTR_HW_MAGIC,
    ATTR_MESH_API_VERSION, ATTR_MTU, ATTR_NETWORK_ADDRESS, ATTR_NETWORK_CHANNEL, ATTR_NODE_ADDRESS, ATTR_NODE_ROLE,
    ATTR_PDU_BUFFER_SIZE, ATTR_SCRATCHPAD_SEQUENCE, ATTR_STACK_PROFILE, FACTORY_RESET_KEY,
};
pub use error::{Result, SapError};
pub use lsap::ATTR_WAKEUP_TIME;
pub use msap::{
    ATTR_ACCESS_CYCLE_LIMITS, ATTR_ACCESS_CYCLE_RANGE, ATTR_AUTOSTART, ATTR_CURRENT_ACCESS_CYCLE, ATTR_ENERGY,
    ATTR_PDU_BUFFER_CAPACITY, ATTR_PDU_BUFFER_USAGE, ATTR_ROUTE_COUNT, ATTR_STACK_STATUS, ATTR_SYSTEM_TIME,
};
pub use node_result::NodeResult;
