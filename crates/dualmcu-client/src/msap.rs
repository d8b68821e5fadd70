//! Management Service Access Point: stack lifecycle, app-config, sink
//! cost, and config-data-items.
//!
//! Scratchpad (OTAP) and neighbor queries are large enough to earn their
//! own modules ([`crate::scratchpad`], [`crate::neighbors`]); everything
//! else MSAP lives here. Attribute ids are grounded in `msap.h`'s
//! `MSAP_*` defines.

use dualmcu_core::Transport;
use dualmcu_proto::payloads::msap::{
    AppConfigReadConf, AppConfigWriteReq, ConfigDataItemGetConf, ConfigDataItemGetReq, ConfigDataItemListConf,
    ConfigDataItemSetReq, GenericConfirm, SinkCostReadConf, SinkCostWriteReq, StackStartReq, StackStateInd,
    MAX_APP_CONFIG_LEN,
};
use dualmcu_proto::primitive::Primitive;
use tracing::info;

use crate::{client::Client, error::Result};

/// `MSAP_STACK_STATUS`.
pub const ATTR_STACK_STATUS: u16 = 1;
/// `MSAP_PDU_BUFFER_USAGE`.
pub const ATTR_PDU_BUFFER_USAGE: u16 = 2;
/// `MSAP_PDU_BUFFER_CAPACITY`.
pub const ATTR_PDU_BUFFER_CAPACITY: u16 = 3;
/// `MSAP_ENERGY`.
pub const ATTR_ENERGY: u16 = 5;
/// `MSAP_AUTOSTART`.
pub const ATTR_AUTOSTART: u16 = 6;
/// `MSAP_ROUTE_COUNT`.
pub const ATTR_ROUTE_COUNT: u16 = 7;
/// `MSAP_SYSTEM_TIME`.
pub const ATTR_SYSTEM_TIME: u16 = 8;
/// `MSAP_ACCESS_CYCLE_RANGE`.
pub const ATTR_ACCESS_CYCLE_RANGE: u16 = 9;
/// `MSAP_ACCESS_CYCLE_LIMITS`.
pub const ATTR_ACCESS_CYCLE_LIMITS: u16 = 10;
/// `MSAP_CURRENT_ACCESS_CYCLE`.
pub const ATTR_CURRENT_ACCESS_CYCLE: u16 = 11;

impl<T: Transport + 'static> Client<T> {
    /// Reads a raw MSAP attribute.
    pub fn msap_attribute_read_raw(&self, attr_id: u16) -> Result<Vec<u8>> {
        let conf = crate::attribute::read(
            self.engine(),
            Primitive::MsapAttributeRead.request_id(),
            "msap_attribute_read",
            attr_id,
        )?;
        Ok(conf.value().to_vec())
    }

    /// Writes a raw MSAP attribute.
    pub fn msap_attribute_write_raw(&self, attr_id: u16, value: &[u8]) -> Result<()> {
        crate::attribute::write(
            self.engine(),
            Primitive::MsapAttributeWrite.request_id(),
            "msap_attribute_write",
            attr_id,
            value,
        )
    }

    /// `WPC_get_stack_status_byte`: bitfield the node uses for stack state
    /// and boot diagnostics; treated opaquely here, same as node role.
    pub fn stack_status(&self) -> Result<u8> {
        Ok(self.msap_attribute_read_raw(ATTR_STACK_STATUS)?.first().copied().unwrap_or(0))
    }

    /// `WPC_start_stack`: starts the mesh stack with the given start
    /// option flags (usually `0`).
    ///
    /// If [`dualmcu_core::EngineConfig::synthesize_stack_started_indication`]
    /// is set, this also invokes the `stack_state` callback locally with a
    /// synthetic "started" indication on a successful confirm (§9 open
    /// question: a workaround for firmware versions that skip the real
    /// indication, off by default).
    pub fn start_stack(&self, start_option: u8) -> Result<()> {
        let confirm = self
            .engine()
            .send_request(Primitive::MsapStackStart.request_id(), StackStartReq { start_option }.encode())?;
        let conf = GenericConfirm::decode(&confirm.payload)?;
        crate::error::SapError::check("msap_stack_start", conf.result)?;

        if self.engine().config().synthesize_stack_started_indication {
            info!("synthesizing stack_started indication (firmware workaround)");
            self.callbacks().invoke_stack_state(StackStateInd { indication_status: 0, status: 1 });
        }
        Ok(())
    }

    /// `WPC_stop_stack`: uses the longer stop-follow-up timeout (§4.2),
    /// since the node may be mid-transmission when asked to stop.
    pub fn stop_stack(&self) -> Result<()> {
        let confirm = self.engine().send_request_timeout(
            Primitive::MsapStackStop.request_id(),
            Vec::new(),
            dualmcu_core::config::STACK_STOP_TIMEOUT,
        )?;
        let conf = GenericConfirm::decode(&confirm.payload)?;
        crate::error::SapError::check("msap_stack_stop", conf.result)
    }

    /// `WPC_set_app_config_data`. `app_config_data` longer than
    /// [`MAX_APP_CONFIG_LEN`] is truncated with zero-padding applied past
    /// its end, matching the wire shape's fixed-size field.
    pub fn write_app_config(&self, sequence_number: u8, diag_data_interval: u16, app_config_data: &[u8]) -> Result<()> {
        let mut data = [0u8; MAX_APP_CONFIG_LEN];
        let n = app_config_data.len().min(MAX_APP_CONFIG_LEN);
        data[..n].copy_from_slice(&app_config_data[..n]);
        let req = AppConfigWriteReq { sequence_number, diag_data_interval, app_config_data: data };
        let confirm = self.engine().send_request(Primitive::MsapAppConfigWrite.request_id(), req.encode())?;
        let conf = GenericConfirm::decode(&confirm.payload)?;
        crate::error::SapError::check("msap_app_config_write", conf.result)
    }

    /// `WPC_get_app_config_data`.
    pub fn read_app_config(&self) -> Result<AppConfigReadConf> {
        let confirm = self.engine().send_request(Primitive::MsapAppConfigRead.request_id(), Vec::new())?;
        let conf = AppConfigReadConf::decode(&confirm.payload)?;
        crate::error::SapError::check("msap_app_config_read", conf.result)?;
        Ok(conf)
    }

    /// `WPC_set_stack_size` (sink-only): sets this sink's initial routing
    /// cost.
    pub fn write_sink_cost(&self, cost: u8) -> Result<()> {
        let confirm =
            self.engine().send_request(Primitive::MsapSinkCostWrite.request_id(), SinkCostWriteReq { cost }.encode())?;
        let conf = GenericConfirm::decode(&confirm.payload)?;
        crate::error::SapError::check("msap_sink_cost_write", conf.result)
    }

    /// Reads the sink's initial routing cost. Fails with
    /// [`crate::node_result::NodeResult::NotASink`] on a non-sink node.
    pub fn read_sink_cost(&self) -> Result<u8> {
        let confirm = self.engine().send_request(Primitive::MsapSinkCostRead.request_id(), Vec::new())?;
        let conf = SinkCostReadConf::decode(&confirm.payload)?;
        crate::error::SapError::check("msap_sink_cost_read", conf.result)?;
        Ok(conf.cost)
    }

    /// Gets a config-data-item by id (§6.2: named in the primitive
    /// enumeration, shaped per §4.6's generic attribute-read-alike rule).
    pub fn config_data_item_get(&self, item_id: u16) -> Result<ConfigDataItemGetConf> {
        let confirm = self.engine().send_request(
            Primitive::MsapConfigDataItemGet.request_id(),
            ConfigDataItemGetReq { item_id }.encode(),
        )?;
        let conf = ConfigDataItemGetConf::decode(&confirm.payload)?;
        crate::error::SapError::check("msap_config_data_item_get", conf.result)?;
        Ok(conf)
    }

    /// Sets a config-data-item's value.
    pub fn config_data_item_set(&self, item_id: u16, value: &[u8]) -> Result<()> {
        let req = ConfigDataItemSetReq::new(item_id, value).map_err(|e| crate::error::SapError::WrongParam(e.to_string()))?;
        let confirm = self.engine().send_request(Primitive::MsapConfigDataItemSet.request_id(), req.encode())?;
        let conf = GenericConfirm::decode(&confirm.payload)?;
        crate::error::SapError::check("msap_config_data_item_set", conf.result)
    }

    /// Lists every config-data-item id the node holds.
    pub fn config_data_item_list(&self) -> Result<ConfigDataItemListConf> {
        let confirm = self.engine().send_request(Primitive::MsapConfigDataItemList.request_id(), Vec::new())?;
        Ok(ConfigDataItemListConf::decode(&confirm.payload)?)
    }
}
