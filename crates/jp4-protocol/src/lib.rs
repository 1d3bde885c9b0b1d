//! jp4-protocol: wire types and gRPC plumbing for the JP4Agent CLI service.
//!
//! The agent exposes a single unary RPC, `jp4cli.CmdHandler/SendCmd`, that
//! takes a literal command line and returns the agent's textual output.
//! The contract is documented in `proto/jp4cli.proto`.

pub mod message;
pub mod service;

pub use message::{CmdReply, CmdRequest};
pub use service::{CmdHandler, CmdHandlerClient, CmdHandlerServer, SEND_CMD_PATH, SERVICE_NAME};
