//! An in-process mock dual-MCU node, used as a [`dualmcu_core::Transport`]
//! double in integration tests across the workspace.
//!
//! [`duplex::pair`] hands back two connected ends of an in-memory byte
//! pipe; wrap one in [`dualmcu_core::Engine::open`] and the other in
//! [`MockNode::spawn`] to drive full request/confirm/indication exchanges
//! without a real serial port.

pub mod duplex;
pub mod node;

pub use duplex::{pair, DuplexTransport};
pub use node::{MockNode, RequestHandler};
