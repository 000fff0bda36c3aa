//! WebSocket Gateway
//!
//! Real-time communication via WebSocket connections.

pub mod gateway;
pub mod handler;
pub mod messages;
pub mod session;

pub use gateway::{Gateway, Outbound};
pub use handler::ws_handler;
pub use messages::{ClientRequest, GatewayReceive, GatewaySend, OpCode};
pub use session::{ConnectionState, Sequence};
