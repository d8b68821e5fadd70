//! Demonstration binary: open a dual-MCU node over a real serial port,
//! print its MTU and node role, register a data-rx handler, then relay
//! one test APDU to a fixed destination address.
//!
//! ```bash
//! dualmcu-cli --port /dev/ttyUSB0 --bitrate 115200 --dest 1
//! ```

use std::time::Duration;

use clap::Parser;
use dualmcu_client::Client;
use dualmcu_core::{EngineConfig, SerialTransport};
use dualmcu_proto::payloads::TxOptions;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Opens a dual-MCU node and relays a test APDU.
#[derive(Parser, Debug)]
#[command(name = "dualmcu-cli")]
#[command(about = "Open a dual-MCU node, print its attributes, relay a test APDU")]
#[command(version)]
struct Args {
    /// Serial port device (e.g. /dev/ttyUSB0, COM3)
    #[arg(short, long)]
    port: String,

    /// Serial bitrate
    #[arg(short, long, default_value = "115200")]
    bitrate: u32,

    /// Destination node address for the test APDU
    #[arg(short, long, default_value = "1")]
    dest: u32,

    /// Destination endpoint for the test APDU
    #[arg(long, default_value = "1")]
    dest_ep: u8,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

    tracing::info!(port = %args.port, bitrate = args.bitrate, "opening dual-MCU node");

    let transport = SerialTransport::open(&args.port, args.bitrate, Duration::from_millis(500))?;
    let config = EngineConfig::new(&args.port, args.bitrate);
    let client = Client::open(transport, config)?;

    client.callbacks().on_data_rx(|ind| {
        tracing::info!(src = ind.src_addr, len = ind.apdu.len(), "data received");
    });
    client.callbacks().on_stack_state(|ind| {
        tracing::info!(status = ind.status, "stack state changed");
    });

    tracing::info!(mtu = client.mtu(), "node mtu");
    tracing::info!(role = client.node_role()?, "node role");
    tracing::info!(address = client.node_address()?, "node address");

    let apdu = b"dualmcu-cli test packet".to_vec();
    client.send_data(
        1,
        1,
        args.dest,
        args.dest_ep,
        0,
        TxOptions { tx_indication_wanted: true, unack_csma_ca: false, hop_limit: 0 },
        &apdu,
    )?;
    tracing::info!(dest = args.dest, bytes = apdu.len(), "test apdu sent");

    std::thread::sleep(Duration::from_secs(2));

    client.close();
    Ok(())
}
