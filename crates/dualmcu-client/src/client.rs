//! The top-level handle applications hold: wraps a [`dualmcu_core::Engine`]
//! and exposes the CSAP/MSAP/DSAP/LSAP shims (§4.6) as plain methods.
//!
//! Grounded in `wpc.h`'s `WPC_initialize`/`WPC_close` pair: one call opens
//! the port, spawns the pump and dispatcher, and reads the node's MTU so
//! later fragmented sends know their chunk size without a round-trip.

use std::sync::Arc;

use dualmcu_core::{CallbackRegistry, Engine, EngineConfig, Transport};
use dualmcu_proto::primitive::Primitive;

use crate::{csap::ATTR_MTU, error::Result};

/// Opens and owns a link to a single dual-MCU node.
///
/// Cloning a `Client` is cheap (it's a thin wrapper around an `Arc`'d
/// engine) and every clone shares the same underlying pump, dispatcher,
/// and serial handle — matching spec.md §9's "multiple instances are then
/// simply multiple values."
#[derive(Clone)]
pub struct Client<T: Transport> {
    engine: Arc<Engine<T>>,
}

impl<T: Transport + 'static> Client<T> {
    /// Opens `transport` under `config` and reads the node's MTU once
    /// before returning, so [`Self::mtu`] is immediately meaningful.
    pub fn open(transport: T, config: EngineConfig) -> Result<Self> {
        let engine = Engine::open(transport, config)?;
        let client = Self { engine };
        client.refresh_mtu()?;
        Ok(client)
    }

    /// The underlying engine, for callers that want direct access to the
    /// callback registry, the pending-tx table, or a custom primitive the
    /// client layer doesn't shim yet.
    #[must_use]
    pub fn engine(&self) -> &Arc<Engine<T>> {
        &self.engine
    }

    /// The callback registry, for installing indication handlers.
    #[must_use]
    pub fn callbacks(&self) -> &CallbackRegistry {
        self.engine.callbacks()
    }

    /// The node's cached MTU, applying to a single non-fragmented PDU.
    #[must_use]
    pub fn mtu(&self) -> u8 {
        self.engine.mtu()
    }

    /// Re-reads `C_MTU_ID` from the node and updates the cached value.
    /// Call this after any operation that might change the node's link
    /// budget (none currently do, but the original re-reads it
    /// defensively on reconnect).
    pub fn refresh_mtu(&self) -> Result<u8> {
        let conf = crate::attribute::read(
            &self.engine,
            Primitive::CsapAttributeRead.request_id(),
            "csap_attribute_read",
            ATTR_MTU,
        )?;
        let mtu = conf.value().first().copied().unwrap_or(self.engine.mtu());
        self.engine.set_mtu(mtu);
        Ok(mtu)
    }

    /// Suspends or resumes the indication poll (§4.3); use before a
    /// deliberate stack-stop/scratchpad-update reboot to avoid the pump
    /// timing out while the node restarts.
    pub fn disable_poll_request(&self, disabled: bool) {
        self.engine.disable_poll_request(disabled);
    }

    /// Stops the pump and dispatcher threads and closes the transport.
    pub fn close(&self) {
        self.engine.close();
    }
}
