//! Fuzz target for the primitive payload decoders.
//!
//! Runs arbitrary bytes through every fixed-shape and variable-shape
//! payload decoder dualmcu-proto exposes. Should never panic: malformed
//! input is always an `Err`.

#![no_main]

use dualmcu_proto::payloads::{attribute, dsap, msap};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let _ = attribute::AttributeWriteReq::decode(data);
    let _ = attribute::AttributeReadReq::decode(data);
    let _ = attribute::AttributeReadConf::decode(data);

    let _ = dsap::DataTxReq::decode(data, false, false);
    let _ = dsap::DataTxReq::decode(data, true, false);
    let _ = dsap::DataTxReq::decode(data, true, true);
    let _ = dsap::DataRxInd::decode(data, false);
    let _ = dsap::DataRxInd::decode(data, true);
    let _ = dsap::DataTxConf::decode(data);
    let _ = dsap::DataTxIndication::decode(data);

    let _ = msap::StackStartReq::decode(data);
    let _ = msap::StackStateInd::decode(data);
    let _ = msap::AppConfigWriteReq::decode(data);
    let _ = msap::AppConfigReadConf::decode(data);
    let _ = msap::AppConfigRxInd::decode(data);
    let _ = msap::ScratchpadStartReq::decode(data);
    let _ = msap::ScratchpadBlockReq::decode(data);
    let _ = msap::ScratchpadStatusConf::decode(data);
    let _ = msap::ScratchpadTarget::decode(data);
    let _ = msap::ScratchpadTargetReadConf::decode(data);
    let _ = msap::ScratchpadRemoteStatusReq::decode(data);
    let _ = msap::ScratchpadRemoteUpdateReq::decode(data);
    let _ = msap::ImageRemoteStatusInd::decode(data);
    let _ = msap::GetNeighborsConf::decode(data);
    let _ = msap::ScanNeighborsInd::decode(data);
    let _ = msap::SinkCostWriteReq::decode(data);
    let _ = msap::SinkCostReadConf::decode(data);
    let _ = msap::ConfigDataItemGetReq::decode(data);
    let _ = msap::ConfigDataItemGetConf::decode(data);
    let _ = msap::ConfigDataItemSetReq::decode(data);
    let _ = msap::ConfigDataItemListConf::decode(data);
    let _ = msap::ConfigDataItemRxInd::decode(data);
    let _ = msap::GenericConfirm::decode(data);
});
