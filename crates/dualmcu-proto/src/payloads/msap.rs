//! Management Service Access Point payloads: stack control, app-config,
//! scratchpad (OTAP), neighbor queries, sink cost and config-data-items
//! (§6.2, §6.3).

use super::Cursor;
use crate::error::Result;

/// Maximum app-config payload this crate encodes/decodes inline.
pub const MAX_APP_CONFIG_LEN: usize = 80;
/// Maximum scratchpad block payload per `msap_image_block_req`.
pub const MAX_SCRATCHPAD_BLOCK_LEN: usize = 112;
/// Maximum neighbors reported by a single `get_neighbors` confirm.
pub const MAX_NEIGHBORS: usize = 8;
/// Maximum config-data-item value length.
pub const MAX_CONFIG_ITEM_VALUE_LEN: usize = 16;
/// Maximum number of item ids a `config_data_item_list` confirm reports.
pub const MAX_CONFIG_ITEM_IDS: usize = 16;

/// A bare node result code, used by confirms whose only content is
/// success/failure (stack start/stop, scratchpad update/clear, sink-cost
/// write, config-data-item set).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenericConfirm {
    /// Node result code (0 = success).
    pub result: u8,
}

impl GenericConfirm {
    /// Decodes from a raw payload.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let mut c = Cursor::new(bytes);
        let result = c.u8("result")?;
        c.finish("GenericConfirm")?;
        Ok(Self { result })
    }

    /// Encodes to the wire representation.
    #[must_use]
    pub fn encode(self) -> Vec<u8> {
        vec![self.result]
    }
}

/// `u8 start_option;`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StackStartReq {
    /// Node-defined start option flags.
    pub start_option: u8,
}

impl StackStartReq {
    /// Encodes to the wire representation.
    #[must_use]
    pub fn encode(self) -> Vec<u8> {
        vec![self.start_option]
    }

    /// Decodes from a raw payload.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let mut c = Cursor::new(bytes);
        let start_option = c.u8("start_option")?;
        c.finish("StackStartReq")?;
        Ok(Self { start_option })
    }
}

/// `u8 indication_status; u8 status;`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StackStateInd {
    /// Node-level indication status.
    pub indication_status: u8,
    /// New stack state value.
    pub status: u8,
}

impl StackStateInd {
    /// Decodes from a raw payload.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let mut c = Cursor::new(bytes);
        let indication_status = c.u8("indication_status")?;
        let status = c.u8("status")?;
        c.finish("StackStateInd")?;
        Ok(Self { indication_status, status })
    }

    /// Encodes to the wire representation.
    #[must_use]
    pub fn encode(self) -> Vec<u8> {
        vec![self.indication_status, self.status]
    }
}

/// `u8 sequence_number; u16 diag_data_interval; u8 app_config_data[80];`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfigWriteReq {
    /// App-config sequence number.
    pub sequence_number: u8,
    /// Diagnostics reporting interval.
    pub diag_data_interval: u16,
    /// App-config payload, zero-padded to [`MAX_APP_CONFIG_LEN`].
    pub app_config_data: [u8; MAX_APP_CONFIG_LEN],
}

impl AppConfigWriteReq {
    /// Encodes to the wire representation.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(3 + MAX_APP_CONFIG_LEN);
        out.push(self.sequence_number);
        out.extend_from_slice(&self.diag_data_interval.to_le_bytes());
        out.extend_from_slice(&self.app_config_data);
        out
    }

    /// Decodes from a raw payload.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let mut c = Cursor::new(bytes);
        let sequence_number = c.u8("sequence_number")?;
        let diag_data_interval = c.u16_le("diag_data_interval")?;
        let app_config_data = c.array::<MAX_APP_CONFIG_LEN>("app_config_data")?;
        c.finish("AppConfigWriteReq")?;
        Ok(Self { sequence_number, diag_data_interval, app_config_data })
    }
}

/// `u8 result; u8 sequence_number; u16 diag_data_interval; u8
/// app_config_data[80];`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfigReadConf {
    /// Node result code.
    pub result: u8,
    /// App-config sequence number.
    pub sequence_number: u8,
    /// Diagnostics reporting interval.
    pub diag_data_interval: u16,
    /// App-config payload, zero-padded to [`MAX_APP_CONFIG_LEN`].
    pub app_config_data: [u8; MAX_APP_CONFIG_LEN],
}

impl AppConfigReadConf {
    /// Decodes from a raw payload.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let mut c = Cursor::new(bytes);
        let result = c.u8("result")?;
        let sequence_number = c.u8("sequence_number")?;
        let diag_data_interval = c.u16_le("diag_data_interval")?;
        let app_config_data = c.array::<MAX_APP_CONFIG_LEN>("app_config_data")?;
        c.finish("AppConfigReadConf")?;
        Ok(Self { result, sequence_number, diag_data_interval, app_config_data })
    }

    /// Encodes to the wire representation.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(4 + MAX_APP_CONFIG_LEN);
        out.push(self.result);
        out.push(self.sequence_number);
        out.extend_from_slice(&self.diag_data_interval.to_le_bytes());
        out.extend_from_slice(&self.app_config_data);
        out
    }
}

/// `u8 indication_status; u8 sequence_number; u16 diag_data_interval; u8
/// app_config_data[80];`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfigRxInd {
    /// Node-level indication status.
    pub indication_status: u8,
    /// App-config sequence number now in effect.
    pub sequence_number: u8,
    /// Diagnostics reporting interval.
    pub diag_data_interval: u16,
    /// App-config payload, zero-padded to [`MAX_APP_CONFIG_LEN`].
    pub app_config_data: [u8; MAX_APP_CONFIG_LEN],
}

impl AppConfigRxInd {
    /// Decodes from a raw payload.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let mut c = Cursor::new(bytes);
        let indication_status = c.u8("indication_status")?;
        let sequence_number = c.u8("sequence_number")?;
        let diag_data_interval = c.u16_le("diag_data_interval")?;
        let app_config_data = c.array::<MAX_APP_CONFIG_LEN>("app_config_data")?;
        c.finish("AppConfigRxInd")?;
        Ok(Self { indication_status, sequence_number, diag_data_interval, app_config_data })
    }
}

/// `u32 scratchpad_length; u8 scratchpad_sequence_number;`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScratchpadStartReq {
    /// Total scratchpad image length in bytes; must be a multiple of 16.
    pub scratchpad_length: u32,
    /// Sequence number identifying this scratchpad image.
    pub scratchpad_sequence_number: u8,
}

impl ScratchpadStartReq {
    /// Encodes to the wire representation.
    #[must_use]
    pub fn encode(self) -> Vec<u8> {
        let mut out = self.scratchpad_length.to_le_bytes().to_vec();
        out.push(self.scratchpad_sequence_number);
        out
    }

    /// Decodes from a raw payload.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let mut c = Cursor::new(bytes);
        let scratchpad_length = c.u32_le("scratchpad_length")?;
        let scratchpad_sequence_number = c.u8("scratchpad_sequence_number")?;
        c.finish("ScratchpadStartReq")?;
        Ok(Self { scratchpad_length, scratchpad_sequence_number })
    }
}

/// `u32 start_add; u8 number_of_bytes; u8 bytes[112];`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScratchpadBlockReq {
    /// Byte offset of this block within the scratchpad image.
    pub start_address: u32,
    /// Number of valid bytes in `bytes` (1..=112).
    pub number_of_bytes: u8,
    /// Block payload.
    pub bytes: Vec<u8>,
}

impl ScratchpadBlockReq {
    /// Builds a block request, rejecting blocks over
    /// [`MAX_SCRATCHPAD_BLOCK_LEN`].
    pub fn new(start_address: u32, bytes: &[u8]) -> Result<Self> {
        if bytes.is_empty() || bytes.len() > MAX_SCRATCHPAD_BLOCK_LEN {
            return Err(crate::error::ProtoError::WrongParam {
                field: "bytes",
                reason: format!("block length {} outside 1..={MAX_SCRATCHPAD_BLOCK_LEN}", bytes.len()),
            });
        }
        #[allow(clippy::cast_possible_truncation)]
        Ok(Self { start_address, number_of_bytes: bytes.len() as u8, bytes: bytes.to_vec() })
    }

    /// Encodes to the wire representation.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(5 + self.bytes.len());
        out.extend_from_slice(&self.start_address.to_le_bytes());
        out.push(self.number_of_bytes);
        out.extend_from_slice(&self.bytes);
        out
    }

    /// Decodes from a raw payload.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let mut c = Cursor::new(bytes);
        let start_address = c.u32_le("start_add")?;
        let number_of_bytes = c.u8("number_of_bytes")?;
        let body = c.rest();
        if body.len() != number_of_bytes as usize {
            return Err(crate::error::ProtoError::WrongParam {
                field: "number_of_bytes",
                reason: format!("claimed {number_of_bytes}, found {}", body.len()),
            });
        }
        Ok(Self { start_address, number_of_bytes, bytes: body.to_vec() })
    }
}

/// `u32 scrat_len; u16 scrat_crc; u8 scrat_seq_number; u8 scrat_type; u8
/// scrat_status; u32 processed_scrat_len; u16 processed_scrat_crc; u8
/// processed_scrat_seq_number; u32 firmware_memory_area_id; u8
/// firmware_major_ver; u8 firmware_minor_ver; u8 firmware_maint_ver; u8
/// firmware_dev_ver;`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScratchpadStatusConf {
    /// Length of the stored scratchpad image.
    pub scrat_len: u32,
    /// CRC of the stored scratchpad image.
    pub scrat_crc: u16,
    /// Sequence number of the stored scratchpad image.
    pub scrat_seq_number: u8,
    /// Stored scratchpad type.
    pub scrat_type: u8,
    /// Stored scratchpad status.
    pub scrat_status: u8,
    /// Length of the currently-processed scratchpad image.
    pub processed_scrat_len: u32,
    /// CRC of the currently-processed scratchpad image.
    pub processed_scrat_crc: u16,
    /// Sequence number of the currently-processed scratchpad image.
    pub processed_scrat_seq_number: u8,
    /// Firmware memory area id currently running.
    pub firmware_memory_area_id: u32,
    /// Firmware major version.
    pub firmware_major_ver: u8,
    /// Firmware minor version.
    pub firmware_minor_ver: u8,
    /// Firmware maintenance version.
    pub firmware_maint_ver: u8,
    /// Firmware development version.
    pub firmware_dev_ver: u8,
}

impl ScratchpadStatusConf {
    /// Encoded length in bytes.
    pub const ENCODED_LEN: usize = 22;

    fn decode_from(c: &mut Cursor<'_>) -> Result<Self> {
        Ok(Self {
            scrat_len: c.u32_le("scrat_len")?,
            scrat_crc: c.u16_le("scrat_crc")?,
            scrat_seq_number: c.u8("scrat_seq_number")?,
            scrat_type: c.u8("scrat_type")?,
            scrat_status: c.u8("scrat_status")?,
            processed_scrat_len: c.u32_le("processed_scrat_len")?,
            processed_scrat_crc: c.u16_le("processed_scrat_crc")?,
            processed_scrat_seq_number: c.u8("processed_scrat_seq_number")?,
            firmware_memory_area_id: c.u32_le("firmware_memory_area_id")?,
            firmware_major_ver: c.u8("firmware_major_ver")?,
            firmware_minor_ver: c.u8("firmware_minor_ver")?,
            firmware_maint_ver: c.u8("firmware_maint_ver")?,
            firmware_dev_ver: c.u8("firmware_dev_ver")?,
        })
    }

    fn encode_into(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.scrat_len.to_le_bytes());
        out.extend_from_slice(&self.scrat_crc.to_le_bytes());
        out.push(self.scrat_seq_number);
        out.push(self.scrat_type);
        out.push(self.scrat_status);
        out.extend_from_slice(&self.processed_scrat_len.to_le_bytes());
        out.extend_from_slice(&self.processed_scrat_crc.to_le_bytes());
        out.push(self.processed_scrat_seq_number);
        out.extend_from_slice(&self.firmware_memory_area_id.to_le_bytes());
        out.push(self.firmware_major_ver);
        out.push(self.firmware_minor_ver);
        out.push(self.firmware_maint_ver);
        out.push(self.firmware_dev_ver);
    }

    /// Decodes from a raw payload.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let mut c = Cursor::new(bytes);
        let conf = Self::decode_from(&mut c)?;
        c.finish("ScratchpadStatusConf")?;
        Ok(conf)
    }

    /// Encodes to the wire representation.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(Self::ENCODED_LEN);
        self.encode_into(&mut out);
        out
    }
}

/// `u8 target_sequence; u16 target_crc; u8 action; u8 param;` shared by
/// scratchpad target-write (request body) and target-read (confirm body,
/// prefixed with a result byte).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScratchpadTarget {
    /// Target scratchpad sequence number.
    pub target_sequence: u8,
    /// Target scratchpad CRC.
    pub target_crc: u16,
    /// Action to perform once the target is reached.
    pub action: u8,
    /// Action-specific parameter.
    pub param: u8,
}

impl ScratchpadTarget {
    fn encode_into(self, out: &mut Vec<u8>) {
        out.push(self.target_sequence);
        out.extend_from_slice(&self.target_crc.to_le_bytes());
        out.push(self.action);
        out.push(self.param);
    }

    fn decode_from(c: &mut Cursor<'_>) -> Result<Self> {
        Ok(Self {
            target_sequence: c.u8("target_sequence")?,
            target_crc: c.u16_le("target_crc")?,
            action: c.u8("action")?,
            param: c.u8("param")?,
        })
    }

    /// Encodes the bare target (request-side shape).
    #[must_use]
    pub fn encode(self) -> Vec<u8> {
        let mut out = Vec::with_capacity(5);
        self.encode_into(&mut out);
        out
    }

    /// Decodes the bare target (request-side shape).
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let mut c = Cursor::new(bytes);
        let target = Self::decode_from(&mut c)?;
        c.finish("ScratchpadTarget")?;
        Ok(target)
    }
}

/// `u8 result;` followed by [`ScratchpadTarget`]: the target-read confirm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScratchpadTargetReadConf {
    /// Node result code.
    pub result: u8,
    /// Currently configured target.
    pub target: ScratchpadTarget,
}

impl ScratchpadTargetReadConf {
    /// Decodes from a raw payload.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let mut c = Cursor::new(bytes);
        let result = c.u8("result")?;
        let target = ScratchpadTarget::decode_from(&mut c)?;
        c.finish("ScratchpadTargetReadConf")?;
        Ok(Self { result, target })
    }

    /// Encodes to the wire representation.
    #[must_use]
    pub fn encode(self) -> Vec<u8> {
        let mut out = vec![self.result];
        self.target.encode_into(&mut out);
        out
    }
}

/// `u32 target;` — a remote-node address used by scratchpad remote-status
/// and remote-update requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScratchpadRemoteStatusReq {
    /// Remote node address to query.
    pub target: u32,
}

impl ScratchpadRemoteStatusReq {
    /// Encodes to the wire representation.
    #[must_use]
    pub fn encode(self) -> Vec<u8> {
        self.target.to_le_bytes().to_vec()
    }

    /// Decodes from a raw payload.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let mut c = Cursor::new(bytes);
        let target = c.u32_le("target")?;
        c.finish("ScratchpadRemoteStatusReq")?;
        Ok(Self { target })
    }
}

/// `u32 target; u8 seq; u16 delay_s;`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScratchpadRemoteUpdateReq {
    /// Remote node address to update.
    pub target: u32,
    /// Sequence number of the scratchpad to process.
    pub seq: u8,
    /// Delay in seconds before the remote node reboots and processes the
    /// scratchpad; 0 cancels an ongoing update request.
    pub delay_s: u16,
}

impl ScratchpadRemoteUpdateReq {
    /// Encodes to the wire representation.
    #[must_use]
    pub fn encode(self) -> Vec<u8> {
        let mut out = self.target.to_le_bytes().to_vec();
        out.push(self.seq);
        out.extend_from_slice(&self.delay_s.to_le_bytes());
        out
    }

    /// Decodes from a raw payload.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let mut c = Cursor::new(bytes);
        let target = c.u32_le("target")?;
        let seq = c.u8("seq")?;
        let delay_s = c.u16_le("delay_s")?;
        c.finish("ScratchpadRemoteUpdateReq")?;
        Ok(Self { target, seq, delay_s })
    }
}

/// `u8 indication_status; u32 source_address;` followed by
/// [`ScratchpadStatusConf`] and a trailing `u16 update_timeout`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageRemoteStatusInd {
    /// Node-level indication status.
    pub indication_status: u8,
    /// Address of the node this status report concerns.
    pub source_address: u32,
    /// Reported scratchpad status.
    pub status: ScratchpadStatusConf,
    /// Seconds remaining before the reported update takes effect.
    pub update_timeout: u16,
}

impl ImageRemoteStatusInd {
    /// Decodes from a raw payload.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let mut c = Cursor::new(bytes);
        let indication_status = c.u8("indication_status")?;
        let source_address = c.u32_le("source_address")?;
        let status = ScratchpadStatusConf::decode_from(&mut c)?;
        let update_timeout = c.u16_le("update_timeout")?;
        c.finish("ImageRemoteStatusInd")?;
        Ok(Self { indication_status, source_address, status, update_timeout })
    }

    /// Encodes to the wire representation.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(7 + ScratchpadStatusConf::ENCODED_LEN);
        out.push(self.indication_status);
        out.extend_from_slice(&self.source_address.to_le_bytes());
        self.status.encode_into(&mut out);
        out.extend_from_slice(&self.update_timeout.to_le_bytes());
        out
    }
}

/// `u32 add; u8 link_rel; u8 norm_rssi; u8 cost; u8 channel; u8 nbor_type;
/// u8 tx_power; u8 rx_power; u16 last_update;`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NeighborInfo {
    /// Neighbor's network address.
    pub address: u32,
    /// Link reliability.
    pub link_reliability: u8,
    /// Normalized RSSI.
    pub norm_rssi: u8,
    /// Routing cost through this neighbor.
    pub cost: u8,
    /// Radio channel the neighbor was heard on.
    pub channel: u8,
    /// Neighbor type (node role classification).
    pub neighbor_type: u8,
    /// Transmit power used.
    pub tx_power: u8,
    /// Receive power observed.
    pub rx_power: u8,
    /// Age, in node-internal time units, since last update.
    pub last_update: u16,
}

impl NeighborInfo {
    const ENCODED_LEN: usize = 13;

    fn decode_from(c: &mut Cursor<'_>) -> Result<Self> {
        Ok(Self {
            address: c.u32_le("add")?,
            link_reliability: c.u8("link_rel")?,
            norm_rssi: c.u8("norm_rssi")?,
            cost: c.u8("cost")?,
            channel: c.u8("channel")?,
            neighbor_type: c.u8("nbor_type")?,
            tx_power: c.u8("tx_power")?,
            rx_power: c.u8("rx_power")?,
            last_update: c.u16_le("last_update")?,
        })
    }

    fn encode_into(self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.address.to_le_bytes());
        out.push(self.link_reliability);
        out.push(self.norm_rssi);
        out.push(self.cost);
        out.push(self.channel);
        out.push(self.neighbor_type);
        out.push(self.tx_power);
        out.push(self.rx_power);
        out.extend_from_slice(&self.last_update.to_le_bytes());
    }
}

/// `u8 number_of_neighbors; neighbor_info_t nbors[8];`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetNeighborsConf {
    /// Neighbor entries, length `number_of_neighbors`.
    pub neighbors: Vec<NeighborInfo>,
}

impl GetNeighborsConf {
    /// Decodes from a raw payload. The node always pads the neighbor
    /// table to [`MAX_NEIGHBORS`] entries on the wire; only the first
    /// `number_of_neighbors` are kept.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let mut c = Cursor::new(bytes);
        let number_of_neighbors = c.u8("number_of_neighbors")? as usize;
        if number_of_neighbors > MAX_NEIGHBORS {
            return Err(crate::error::ProtoError::WrongParam {
                field: "number_of_neighbors",
                reason: format!("{number_of_neighbors} exceeds {MAX_NEIGHBORS}"),
            });
        }
        let mut neighbors = Vec::with_capacity(number_of_neighbors);
        for i in 0..MAX_NEIGHBORS {
            let entry = NeighborInfo::decode_from(&mut c)?;
            if i < number_of_neighbors {
                neighbors.push(entry);
            }
        }
        c.finish("GetNeighborsConf")?;
        Ok(Self { neighbors })
    }

    /// Encodes to the wire representation, padding to [`MAX_NEIGHBORS`]
    /// entries as the node does.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(1 + MAX_NEIGHBORS * NeighborInfo::ENCODED_LEN);
        #[allow(clippy::cast_possible_truncation)]
        out.push(self.neighbors.len() as u8);
        for i in 0..MAX_NEIGHBORS {
            self.neighbors.get(i).copied().unwrap_or_default().encode_into(&mut out);
        }
        out
    }
}

/// `u8 indication_status; u8 scan_ready;`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanNeighborsInd {
    /// Node-level indication status.
    pub indication_status: u8,
    /// Non-zero once the scan that was requested has completed.
    pub scan_ready: u8,
}

impl ScanNeighborsInd {
    /// Decodes from a raw payload.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let mut c = Cursor::new(bytes);
        let indication_status = c.u8("indication_status")?;
        let scan_ready = c.u8("scan_ready")?;
        c.finish("ScanNeighborsInd")?;
        Ok(Self { indication_status, scan_ready })
    }
}

/// `u8 cost;`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SinkCostWriteReq {
    /// New sink initial cost, 0-254.
    pub cost: u8,
}

impl SinkCostWriteReq {
    /// Encodes to the wire representation.
    #[must_use]
    pub fn encode(self) -> Vec<u8> {
        vec![self.cost]
    }

    /// Decodes from a raw payload.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let mut c = Cursor::new(bytes);
        let cost = c.u8("cost")?;
        c.finish("SinkCostWriteReq")?;
        Ok(Self { cost })
    }
}

/// `u8 result; u8 cost;`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SinkCostReadConf {
    /// Node result code (0 = OK, 1 = not a sink).
    pub result: u8,
    /// Sink initial cost.
    pub cost: u8,
}

impl SinkCostReadConf {
    /// Decodes from a raw payload.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let mut c = Cursor::new(bytes);
        let result = c.u8("result")?;
        let cost = c.u8("cost")?;
        c.finish("SinkCostReadConf")?;
        Ok(Self { result, cost })
    }

    /// Encodes to the wire representation.
    #[must_use]
    pub fn encode(self) -> Vec<u8> {
        vec![self.result, self.cost]
    }
}

/// `u16 item_id;` (config-data-item get request; §6.2 names the primitive,
/// §6.3 does not detail its shape, so this follows the generic
/// attribute-read shape per the rule in §4.6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigDataItemGetReq {
    /// Config data item identifier.
    pub item_id: u16,
}

impl ConfigDataItemGetReq {
    /// Encodes to the wire representation.
    #[must_use]
    pub fn encode(self) -> Vec<u8> {
        self.item_id.to_le_bytes().to_vec()
    }

    /// Decodes from a raw payload.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let mut c = Cursor::new(bytes);
        let item_id = c.u16_le("item_id")?;
        c.finish("ConfigDataItemGetReq")?;
        Ok(Self { item_id })
    }
}

/// `u8 result; u16 item_id; u8 len; u8 value[16];`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigDataItemGetConf {
    /// Node result code.
    pub result: u8,
    /// Config data item identifier that was read.
    pub item_id: u16,
    /// Number of valid bytes in `value`.
    pub len: u8,
    /// Item value, zero-padded to [`MAX_CONFIG_ITEM_VALUE_LEN`].
    pub value: [u8; MAX_CONFIG_ITEM_VALUE_LEN],
}

impl ConfigDataItemGetConf {
    /// Decodes from a raw payload.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let mut c = Cursor::new(bytes);
        let result = c.u8("result")?;
        let item_id = c.u16_le("item_id")?;
        let len = c.u8("len")?;
        let value = c.array::<MAX_CONFIG_ITEM_VALUE_LEN>("value")?;
        c.finish("ConfigDataItemGetConf")?;
        Ok(Self { result, item_id, len, value })
    }

    /// Encodes to the wire representation.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(4 + MAX_CONFIG_ITEM_VALUE_LEN);
        out.push(self.result);
        out.extend_from_slice(&self.item_id.to_le_bytes());
        out.push(self.len);
        out.extend_from_slice(&self.value);
        out
    }
}

/// `u16 item_id; u8 len; u8 value[16];`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigDataItemSetReq {
    /// Config data item identifier.
    pub item_id: u16,
    /// Number of valid bytes in `value`.
    pub len: u8,
    /// Item value, zero-padded to [`MAX_CONFIG_ITEM_VALUE_LEN`].
    pub value: [u8; MAX_CONFIG_ITEM_VALUE_LEN],
}

impl ConfigDataItemSetReq {
    /// Builds a request from a value slice no longer than
    /// [`MAX_CONFIG_ITEM_VALUE_LEN`].
    pub fn new(item_id: u16, value: &[u8]) -> Result<Self> {
        if value.len() > MAX_CONFIG_ITEM_VALUE_LEN {
            return Err(crate::error::ProtoError::WrongParam {
                field: "value",
                reason: format!("{} bytes exceeds {MAX_CONFIG_ITEM_VALUE_LEN}", value.len()),
            });
        }
        let mut buf = [0u8; MAX_CONFIG_ITEM_VALUE_LEN];
        buf[..value.len()].copy_from_slice(value);
        #[allow(clippy::cast_possible_truncation)]
        Ok(Self { item_id, len: value.len() as u8, value: buf })
    }

    /// Encodes to the wire representation.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(3 + MAX_CONFIG_ITEM_VALUE_LEN);
        out.extend_from_slice(&self.item_id.to_le_bytes());
        out.push(self.len);
        out.extend_from_slice(&self.value);
        out
    }

    /// Decodes from a raw payload.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let mut c = Cursor::new(bytes);
        let item_id = c.u16_le("item_id")?;
        let len = c.u8("len")?;
        let value = c.array::<MAX_CONFIG_ITEM_VALUE_LEN>("value")?;
        c.finish("ConfigDataItemSetReq")?;
        Ok(Self { item_id, len, value })
    }
}

/// `u8 count; u16 item_ids[16];`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigDataItemListConf {
    /// Identifiers of every config data item the node holds, up to
    /// [`MAX_CONFIG_ITEM_IDS`].
    pub item_ids: Vec<u16>,
}

impl ConfigDataItemListConf {
    /// Decodes from a raw payload.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let mut c = Cursor::new(bytes);
        let count = c.u8("count")? as usize;
        if count > MAX_CONFIG_ITEM_IDS {
            return Err(crate::error::ProtoError::WrongParam {
                field: "count",
                reason: format!("{count} exceeds {MAX_CONFIG_ITEM_IDS}"),
            });
        }
        let mut item_ids = Vec::with_capacity(count);
        for i in 0..count {
            item_ids.push(c.u16_le("item_ids")?);
            let _ = i;
        }
        c.finish("ConfigDataItemListConf")?;
        Ok(Self { item_ids })
    }

    /// Encodes to the wire representation.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(1 + self.item_ids.len() * 2);
        #[allow(clippy::cast_possible_truncation)]
        out.push(self.item_ids.len() as u8);
        for id in &self.item_ids {
            out.extend_from_slice(&id.to_le_bytes());
        }
        out
    }
}

/// `u8 indication_status; u16 item_id; u8 len; u8 value[16];`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigDataItemRxInd {
    /// Node-level indication status.
    pub indication_status: u8,
    /// Config data item identifier that changed.
    pub item_id: u16,
    /// Number of valid bytes in `value`.
    pub len: u8,
    /// New item value, zero-padded to [`MAX_CONFIG_ITEM_VALUE_LEN`].
    pub value: [u8; MAX_CONFIG_ITEM_VALUE_LEN],
}

impl ConfigDataItemRxInd {
    /// Decodes from a raw payload.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let mut c = Cursor::new(bytes);
        let indication_status = c.u8("indication_status")?;
        let item_id = c.u16_le("item_id")?;
        let len = c.u8("len")?;
        let value = c.array::<MAX_CONFIG_ITEM_VALUE_LEN>("value")?;
        c.finish("ConfigDataItemRxInd")?;
        Ok(Self { indication_status, item_id, len, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stack_start_round_trips() {
        let req = StackStartReq { start_option: 1 };
        assert_eq!(StackStartReq::decode(&req.encode()).unwrap(), req);
    }

    #[test]
    fn app_config_round_trips() {
        let req = AppConfigWriteReq {
            sequence_number: 3,
            diag_data_interval: 60,
            app_config_data: [7u8; MAX_APP_CONFIG_LEN],
        };
        assert_eq!(AppConfigWriteReq::decode(&req.encode()).unwrap(), req);
    }

    #[test]
    fn scratchpad_block_rejects_empty_and_oversized() {
        assert!(ScratchpadBlockReq::new(0, &[]).is_err());
        let big = vec![0u8; MAX_SCRATCHPAD_BLOCK_LEN + 1];
        assert!(ScratchpadBlockReq::new(0, &big).is_err());
    }

    #[test]
    fn scratchpad_block_round_trips() {
        let req = ScratchpadBlockReq::new(16, &[1, 2, 3, 4]).unwrap();
        assert_eq!(ScratchpadBlockReq::decode(&req.encode()).unwrap(), req);
    }

    #[test]
    fn scratchpad_status_round_trips() {
        let conf = ScratchpadStatusConf {
            scrat_len: 1024,
            scrat_crc: 0xBEEF,
            scrat_seq_number: 2,
            scrat_type: 1,
            scrat_status: 0,
            processed_scrat_len: 1024,
            processed_scrat_crc: 0xBEEF,
            processed_scrat_seq_number: 2,
            firmware_memory_area_id: 0x0102_0304,
            firmware_major_ver: 1,
            firmware_minor_ver: 2,
            firmware_maint_ver: 3,
            firmware_dev_ver: 4,
        };
        assert_eq!(ScratchpadStatusConf::decode(&conf.encode()).unwrap(), conf);
    }

    #[test]
    fn image_remote_status_ind_round_trips() {
        let ind = ImageRemoteStatusInd {
            indication_status: 1,
            source_address: 0x1122_3344,
            status: ScratchpadStatusConf {
                scrat_len: 1024,
                scrat_crc: 0xBEEF,
                scrat_seq_number: 2,
                scrat_type: 1,
                scrat_status: 0,
                processed_scrat_len: 1024,
                processed_scrat_crc: 0xBEEF,
                processed_scrat_seq_number: 2,
                firmware_memory_area_id: 7,
                firmware_major_ver: 1,
                firmware_minor_ver: 2,
                firmware_maint_ver: 3,
                firmware_dev_ver: 4,
            },
            update_timeout: 30,
        };
        assert_eq!(ImageRemoteStatusInd::decode(&ind.encode()).unwrap(), ind);
    }

    #[test]
    fn scratchpad_target_round_trips() {
        let target = ScratchpadTarget { target_sequence: 5, target_crc: 0x1234, action: 1, param: 0 };
        assert_eq!(ScratchpadTarget::decode(&target.encode()).unwrap(), target);

        let conf = ScratchpadTargetReadConf { result: 0, target };
        assert_eq!(ScratchpadTargetReadConf::decode(&conf.encode()).unwrap(), conf);
    }

    #[test]
    fn get_neighbors_conf_round_trips_and_pads() {
        let neighbors = vec![
            NeighborInfo { address: 1, cost: 2, ..Default::default() },
            NeighborInfo { address: 2, cost: 4, ..Default::default() },
        ];
        let conf = GetNeighborsConf { neighbors };
        let encoded = conf.encode();
        assert_eq!(encoded.len(), 1 + MAX_NEIGHBORS * NeighborInfo::ENCODED_LEN);
        let decoded = GetNeighborsConf::decode(&encoded).unwrap();
        assert_eq!(decoded, conf);
    }

    #[test]
    fn get_neighbors_conf_rejects_too_many() {
        let bytes = [MAX_NEIGHBORS as u8 + 1];
        assert!(GetNeighborsConf::decode(&bytes).is_err());
    }

    #[test]
    fn sink_cost_round_trips() {
        let conf = SinkCostReadConf { result: 0, cost: 5 };
        assert_eq!(SinkCostReadConf::decode(&conf.encode()).unwrap(), conf);
    }

    #[test]
    fn config_data_item_round_trips() {
        let set_req = ConfigDataItemSetReq::new(9, &[1, 2, 3]).unwrap();
        assert_eq!(ConfigDataItemSetReq::decode(&set_req.encode()).unwrap(), set_req);

        let list = ConfigDataItemListConf { item_ids: vec![1, 2, 3] };
        assert_eq!(ConfigDataItemListConf::decode(&list.encode()).unwrap(), list);
    }

    #[test]
    fn config_data_item_list_rejects_too_many() {
        let bytes = [MAX_CONFIG_ITEM_IDS as u8 + 1];
        assert!(ConfigDataItemListConf::decode(&bytes).is_err());
    }
}
