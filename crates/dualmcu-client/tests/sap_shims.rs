//! Exercises the CSAP/MSAP/DSAP shims against [`dualmcu_harness::MockNode`],
//! the same in-process double the engine itself is tested against.

use std::time::Duration;

use dualmcu_client::Client;
use dualmcu_core::EngineConfig;
use dualmcu_harness::{pair, MockNode};
use dualmcu_proto::payloads::attribute::{AttributeReadConf, AttributeWriteReq};
use dualmcu_proto::payloads::msap::GenericConfirm;
use dualmcu_proto::payloads::TxOptions;
use dualmcu_proto::primitive::Primitive;

fn open_with_node() -> (Client<dualmcu_harness::DuplexTransport>, MockNode) {
    let (host_end, node_end) = pair();
    let node = MockNode::spawn(node_end, 30);

    // The node's `C_MTU_ID` attribute read, answered for every test so
    // `Client::open`'s initial MTU fetch always succeeds.
    node.on(Primitive::CsapAttributeRead, Box::new(|frame| {
        let req = dualmcu_proto::payloads::attribute::AttributeReadReq::decode(&frame.payload).unwrap();
        AttributeReadConf { result: 0, attr_id: req.attr_id, len: 1, value: {
            let mut v = [0u8; 16];
            v[0] = 102;
            v
        } }.encode()
    }));

    let mut config = EngineConfig::new("mock", 115_200);
    config.max_poll_fail_duration = Duration::ZERO;
    let client = Client::open(host_end, config).expect("client opens against mock node");
    (client, node)
}

#[test]
fn mtu_is_read_on_open() {
    let (client, _node) = open_with_node();
    assert_eq!(client.mtu(), 102);
}

#[test]
fn node_address_round_trips() {
    let (client, node) = open_with_node();
    node.on(Primitive::CsapAttributeRead, Box::new(|frame| {
        let req = dualmcu_proto::payloads::attribute::AttributeReadReq::decode(&frame.payload).unwrap();
        let mut value = [0u8; 16];
        if req.attr_id == dualmcu_client::ATTR_NODE_ADDRESS {
            value[..4].copy_from_slice(&0x1122_3344u32.to_le_bytes());
        }
        AttributeReadConf { result: 0, attr_id: req.attr_id, len: 4, value }.encode()
    }));

    assert_eq!(client.node_address().unwrap(), 0x1122_3344);
}

#[test]
fn set_node_address_writes_attribute() {
    let (client, node) = open_with_node();
    node.on(
        Primitive::CsapAttributeWrite,
        Box::new(|frame| {
            let req = AttributeWriteReq::decode(&frame.payload).unwrap();
            assert_eq!(req.attr_id, dualmcu_client::ATTR_NODE_ADDRESS);
            assert_eq!(req.value(), 0x0000_0042u32.to_le_bytes());
            GenericConfirm { result: 0 }.encode()
        }),
    );

    client.set_node_address(0x42).unwrap();
}

#[test]
fn node_rejected_surfaces_result_code() {
    let (client, node) = open_with_node();
    node.on(
        Primitive::CsapAttributeWrite,
        Box::new(|_frame| GenericConfirm { result: 3 }.encode()),
    );

    let err = client.set_node_address(1).unwrap_err();
    assert!(matches!(err, dualmcu_client::SapError::NodeRejected { raw: 3, .. }));
}

#[test]
fn stack_start_and_stop_round_trip() {
    let (client, node) = open_with_node();
    node.on(Primitive::MsapStackStart, Box::new(|_frame| GenericConfirm { result: 0 }.encode()));
    node.on(Primitive::MsapStackStop, Box::new(|_frame| GenericConfirm { result: 0 }.encode()));

    client.start_stack(0).unwrap();
    client.stop_stack().unwrap();
}

#[test]
fn send_data_rejects_oversized_apdu() {
    let (client, _node) = open_with_node();
    let big = vec![0u8; client.mtu() as usize + 1];
    let err = client
        .send_data(1, 1, 5, 1, 0, TxOptions::default(), &big)
        .unwrap_err();
    assert!(matches!(err, dualmcu_client::SapError::WrongParam(_)));
}

#[test]
fn send_data_plain_round_trips() {
    let (client, node) = open_with_node();
    node.on(Primitive::DsapDataTx, Box::new(|_frame| dualmcu_proto::payloads::dsap::DataTxConf { result: 0 }.encode()));

    client.send_data(1, 1, 5, 1, 0, TxOptions::default(), b"hello").unwrap();
}

#[test]
fn send_data_fragmented_splits_across_mtu() {
    let (client, node) = open_with_node();
    let seen = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
    let seen2 = seen.clone();
    node.on(
        Primitive::DsapDataTx,
        Box::new(move |frame| {
            seen2.lock().unwrap().push(frame.payload.clone());
            dualmcu_proto::payloads::dsap::DataTxConf { result: 0 }.encode()
        }),
    );

    let image = vec![7u8; client.mtu() as usize * 2 + 3];
    client
        .send_data_fragmented(
            1,
            1,
            5,
            1,
            0,
            TxOptions::default(),
            0,
            &image,
            None,
        )
        .unwrap();

    assert_eq!(seen.lock().unwrap().len(), 3);
}

#[test]
fn scan_and_get_neighbors_round_trip() {
    let (client, node) = open_with_node();
    node.on(Primitive::MsapScanNeighbors, Box::new(|_frame| GenericConfirm { result: 0 }.encode()));
    node.on(
        Primitive::MsapGetNeighbors,
        Box::new(|_frame| dualmcu_proto::payloads::msap::GetNeighborsConf { neighbors: Vec::new() }.encode()),
    );

    client.scan_neighbors().unwrap();
    assert!(client.get_neighbors().unwrap().is_empty());
}
