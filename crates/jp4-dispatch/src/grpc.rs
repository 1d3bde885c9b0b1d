//! gRPC transport to the agent's `jp4cli.CmdHandler` service.

use std::time::{Duration, Instant};

use jp4_protocol::{CmdHandlerClient, CmdRequest};
use log::{debug, warn};
use tokio::runtime::Handle;
use tonic::transport::{Channel, Endpoint};

use crate::error::{ConnectError, DispatchError};
use crate::Dispatch;

pub const DEFAULT_AGENT_ADDRESS: &str = "localhost:53421";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// How to reach the agent and how long to wait for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelSettings {
    /// `host:port`, optionally with an `http://` scheme.
    pub address: String,
    /// Upper bound on one dispatch. `None` waits forever.
    pub timeout: Option<Duration>,
    pub connect_timeout: Duration,
    /// Cancel an in-flight dispatch on Ctrl-C instead of letting it run.
    pub cancel_on_interrupt: bool,
}

impl Default for ChannelSettings {
    fn default() -> Self {
        Self {
            address: DEFAULT_AGENT_ADDRESS.to_string(),
            timeout: Some(DEFAULT_TIMEOUT),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            cancel_on_interrupt: true,
        }
    }
}

impl ChannelSettings {
    pub fn with_address(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            ..Default::default()
        }
    }

    /// The URI handed to tonic. Plain `host:port` gets an `http://` scheme.
    pub fn endpoint_uri(&self) -> String {
        let address = self.address.trim();
        if address.contains("://") {
            address.to_string()
        } else {
            format!("http://{address}")
        }
    }

    fn endpoint(&self) -> Result<Endpoint, ConnectError> {
        let endpoint = Endpoint::from_shared(self.endpoint_uri()).map_err(|source| {
            ConnectError::InvalidAddress {
                address: self.address.clone(),
                source,
            }
        })?;
        Ok(endpoint.connect_timeout(self.connect_timeout))
    }
}

/// Dispatcher backed by a tonic channel.
///
/// Owns a handle to the process's tokio runtime and blocks on it for each
/// call, so the shell loop itself stays synchronous. The channel reconnects
/// on its own after the agent restarts.
pub struct GrpcDispatcher {
    client: CmdHandlerClient,
    runtime: Handle,
    address: String,
    timeout: Option<Duration>,
    cancel_on_interrupt: bool,
}

impl GrpcDispatcher {
    /// Build the channel without touching the network. Connection failures
    /// surface on the first dispatch as [`DispatchError::Unavailable`].
    pub fn connect_lazy(settings: &ChannelSettings, runtime: Handle) -> Result<Self, ConnectError> {
        let endpoint = settings.endpoint()?;
        let channel = {
            let _guard = runtime.enter();
            endpoint.connect_lazy()
        };
        debug!("lazy channel to {}", settings.endpoint_uri());
        Ok(Self::from_channel(channel, settings, runtime))
    }

    /// Connect up front and fail if the agent is not reachable.
    pub fn connect(settings: &ChannelSettings, runtime: Handle) -> Result<Self, ConnectError> {
        let endpoint = settings.endpoint()?;
        let channel = runtime
            .block_on(endpoint.connect())
            .map_err(|source| ConnectError::Unreachable {
                address: settings.address.clone(),
                source,
            })?;
        debug!("connected to {}", settings.endpoint_uri());
        Ok(Self::from_channel(channel, settings, runtime))
    }

    fn from_channel(channel: Channel, settings: &ChannelSettings, runtime: Handle) -> Self {
        Self {
            client: CmdHandlerClient::new(channel),
            runtime,
            address: settings.address.clone(),
            timeout: settings.timeout,
            cancel_on_interrupt: settings.cancel_on_interrupt,
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }
}

impl Dispatch for GrpcDispatcher {
    fn send(&mut self, command: &str) -> Result<String, DispatchError> {
        let client = self.client.clone();
        let request = CmdRequest::new(command);
        let timeout = self.timeout;
        let started = Instant::now();

        debug!("dispatching {command:?} to {}", self.address);
        let result = if self.cancel_on_interrupt {
            self.runtime
                .block_on(exchange_or_cancel(client, request, timeout))
        } else {
            self.runtime.block_on(exchange(client, request, timeout))
        };

        match &result {
            Ok(reply) => debug!(
                "reply ({} bytes) in {} ms",
                reply.len(),
                started.elapsed().as_millis()
            ),
            Err(e) => debug!(
                "dispatch failed after {} ms: {}",
                started.elapsed().as_millis(),
                e.kind()
            ),
        }
        result
    }
}

async fn exchange(
    mut client: CmdHandlerClient,
    request: CmdRequest,
    timeout: Option<Duration>,
) -> Result<String, DispatchError> {
    let call = client.send_cmd(request);
    let reply = match timeout {
        Some(limit) => tokio::time::timeout(limit, call)
            .await
            .map_err(|_| DispatchError::Timeout(limit))??,
        None => call.await?,
    };
    Ok(reply.into_inner().cmdout)
}

async fn exchange_or_cancel(
    client: CmdHandlerClient,
    request: CmdRequest,
    timeout: Option<Duration>,
) -> Result<String, DispatchError> {
    let exchange = exchange(client, request, timeout);
    tokio::pin!(exchange);

    let signal = tokio::select! {
        result = &mut exchange => return result,
        signal = tokio::signal::ctrl_c() => signal,
    };

    match signal {
        Ok(()) => Err(DispatchError::Cancelled),
        Err(e) => {
            warn!("cannot listen for interrupts, waiting for reply: {e}");
            exchange.await
        }
    }
}
