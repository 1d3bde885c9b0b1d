//! jp4-dispatch: remote command dispatch for the JP4Agent CLI.
//!
//! The shell talks to the agent through the [`Dispatch`] trait: one command
//! line in, one reply string (or a [`DispatchError`]) out. [`GrpcDispatcher`]
//! is the real transport, [`MockDispatcher`] stands in for it in tests, and
//! [`StubAgent`] is a minimal agent used as test infrastructure.

pub mod error;
pub mod grpc;
pub mod mock;
pub mod stub;

pub use error::{ConnectError, DispatchError, UNAVAILABLE_MESSAGE};
pub use grpc::{ChannelSettings, GrpcDispatcher, DEFAULT_AGENT_ADDRESS};
pub use mock::{MockDispatcher, MockResponse};
pub use stub::{StubAgent, StubReply};

/// Sends a validated command line to the remote agent.
///
/// Calls are synchronous from the caller's point of view and never overlap.
pub trait Dispatch {
    fn send(&mut self, command: &str) -> Result<String, DispatchError>;
}

impl<D: Dispatch + ?Sized> Dispatch for Box<D> {
    fn send(&mut self, command: &str) -> Result<String, DispatchError> {
        (**self).send(command)
    }
}

impl<D: Dispatch + ?Sized> Dispatch for &mut D {
    fn send(&mut self, command: &str) -> Result<String, DispatchError> {
        (**self).send(command)
    }
}
