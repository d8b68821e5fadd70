//! The request/confirm engine, indication pump, dispatcher and fragment
//! reassembler for the dual-MCU serial protocol (spec.md §2-§5).
//!
//! This crate knows nothing about what any particular primitive means — it
//! moves frames across a [`transport::Transport`], matches confirms to
//! requests, drains and redistributes indications, and reassembles
//! fragmented application data. `dualmcu-client` builds the CSAP/MSAP/DSAP
//! shims on top of [`Engine`].

pub mod callbacks;
pub mod config;
pub mod engine;
pub mod error;
pub mod framed_io;
pub mod pending_tx;
pub mod queue;
pub mod reassembly;
pub mod transport;
pub mod watchdog;

pub use callbacks::CallbackRegistry;
pub use config::EngineConfig;
pub use engine::Engine;
pub use error::{EngineError, Result};
pub use pending_tx::PendingTxTable;
pub use queue::{IndicationEnvelope, IndicationQueue};
pub use reassembly::Reassembler;
pub use transport::{SerialTransport, Transport};
pub use watchdog::Watchdog;
