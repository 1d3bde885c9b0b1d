//! Client and server plumbing for the `jp4cli.CmdHandler` service.
//!
//! This is the shape `tonic-build` would emit for `proto/jp4cli.proto`,
//! written out by hand so the workspace builds without `protoc`. Only the one
//! unary method exists, so the client is bound to a concrete [`Channel`].

use std::convert::Infallible;
use std::sync::Arc;
use std::task::{Context, Poll};

use tonic::body::BoxBody;
use tonic::codec::ProstCodec;
use tonic::codegen::http::{self, uri::PathAndQuery, HeaderValue};
use tonic::codegen::{Body, BoxFuture, Service, StdError};
use tonic::server::{Grpc, NamedService, UnaryService};
use tonic::transport::Channel;
use tonic::{IntoRequest, Request, Response, Status};

use crate::message::{CmdReply, CmdRequest};

/// Fully-qualified gRPC service name.
pub const SERVICE_NAME: &str = "jp4cli.CmdHandler";

/// HTTP/2 path of the `SendCmd` method.
pub const SEND_CMD_PATH: &str = "/jp4cli.CmdHandler/SendCmd";

/// gRPC status code for `UNIMPLEMENTED`.
const GRPC_UNIMPLEMENTED: &str = "12";

/// Client for the agent's command service.
#[derive(Debug, Clone)]
pub struct CmdHandlerClient {
    inner: tonic::client::Grpc<Channel>,
}

impl CmdHandlerClient {
    pub fn new(channel: Channel) -> Self {
        Self {
            inner: tonic::client::Grpc::new(channel),
        }
    }

    /// Send one command line and wait for the agent's reply.
    ///
    /// Unlike generated clients, which report a channel that cannot become
    /// ready as `UNKNOWN`, this one reports it as `UNAVAILABLE`, the same
    /// code the transport uses for a refused connection. Callers rely on
    /// that code alone to tell an absent agent from a failed command.
    pub async fn send_cmd(
        &mut self,
        request: impl IntoRequest<CmdRequest>,
    ) -> Result<Response<CmdReply>, Status> {
        self.inner
            .ready()
            .await
            .map_err(|e| Status::unavailable(format!("service was not ready: {e}")))?;
        let codec: ProstCodec<CmdRequest, CmdReply> = ProstCodec::default();
        let path = PathAndQuery::from_static(SEND_CMD_PATH);
        self.inner.unary(request.into_request(), path, codec).await
    }
}

/// Server-side behaviour of the command service.
#[tonic::async_trait]
pub trait CmdHandler: Send + Sync + 'static {
    async fn send_cmd(&self, request: Request<CmdRequest>) -> Result<Response<CmdReply>, Status>;
}

/// Adapts a [`CmdHandler`] into a tower service that `tonic`'s server can route to.
#[derive(Debug)]
pub struct CmdHandlerServer<T> {
    inner: Arc<T>,
}

impl<T: CmdHandler> CmdHandlerServer<T> {
    pub fn new(inner: T) -> Self {
        Self::from_arc(Arc::new(inner))
    }

    pub fn from_arc(inner: Arc<T>) -> Self {
        Self { inner }
    }
}

impl<T> Clone for CmdHandlerServer<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> NamedService for CmdHandlerServer<T> {
    const NAME: &'static str = SERVICE_NAME;
}

struct SendCmdSvc<T>(Arc<T>);

impl<T: CmdHandler> UnaryService<CmdRequest> for SendCmdSvc<T> {
    type Response = CmdReply;
    type Future = BoxFuture<Response<CmdReply>, Status>;

    fn call(&mut self, request: Request<CmdRequest>) -> Self::Future {
        let inner = Arc::clone(&self.0);
        Box::pin(async move { inner.send_cmd(request).await })
    }
}

impl<T, B> Service<http::Request<B>> for CmdHandlerServer<T>
where
    T: CmdHandler,
    B: Body + Send + 'static,
    B::Error: Into<StdError> + Send + 'static,
{
    type Response = http::Response<BoxBody>;
    type Error = Infallible;
    type Future = BoxFuture<Self::Response, Self::Error>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: http::Request<B>) -> Self::Future {
        if req.uri().path() != SEND_CMD_PATH {
            return Box::pin(async move { Ok(unimplemented_response()) });
        }

        let inner = Arc::clone(&self.inner);
        Box::pin(async move {
            let codec: ProstCodec<CmdReply, CmdRequest> = ProstCodec::default();
            let mut grpc = Grpc::new(codec);
            Ok(grpc.unary(SendCmdSvc(inner), req).await)
        })
    }
}

fn unimplemented_response() -> http::Response<BoxBody> {
    let mut response = http::Response::new(tonic::body::empty_body());
    let headers = response.headers_mut();
    headers.insert("grpc-status", HeaderValue::from_static(GRPC_UNIMPLEMENTED));
    headers.insert(
        http::header::CONTENT_TYPE,
        HeaderValue::from_static("application/grpc"),
    );
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::SocketAddr;
    use tokio::net::TcpListener;
    use tokio_stream::wrappers::TcpListenerStream;
    use tonic::transport::{Endpoint, Server};

    struct Echo;

    #[tonic::async_trait]
    impl CmdHandler for Echo {
        async fn send_cmd(
            &self,
            request: Request<CmdRequest>,
        ) -> Result<Response<CmdReply>, Status> {
            let cmd = request.into_inner().cmdstr;
            if cmd == "fail" {
                return Err(Status::invalid_argument("bad command"));
            }
            Ok(Response::new(CmdReply::new(format!("got {cmd}"))))
        }
    }

    async fn spawn_echo() -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(
            Server::builder()
                .add_service(CmdHandlerServer::new(Echo))
                .serve_with_incoming(TcpListenerStream::new(listener)),
        );
        addr
    }

    async fn client_for(addr: SocketAddr) -> CmdHandlerClient {
        let channel = Endpoint::from_shared(format!("http://{addr}"))
            .unwrap()
            .connect()
            .await
            .unwrap();
        CmdHandlerClient::new(channel)
    }

    #[test]
    fn method_path_matches_service_name() {
        assert_eq!(SEND_CMD_PATH, format!("/{SERVICE_NAME}/SendCmd"));
        assert_eq!(
            <CmdHandlerServer<Echo> as NamedService>::NAME,
            "jp4cli.CmdHandler"
        );
    }

    #[tokio::test]
    async fn unary_round_trip() {
        let addr = spawn_echo().await;
        let mut client = client_for(addr).await;

        let reply = client
            .send_cmd(CmdRequest::new("add-route rtt1 10.0.0.0/24 node5"))
            .await
            .unwrap();
        assert_eq!(reply.into_inner().cmdout, "got add-route rtt1 10.0.0.0/24 node5");
    }

    #[tokio::test]
    async fn handler_status_reaches_client() {
        let addr = spawn_echo().await;
        let mut client = client_for(addr).await;

        let status = client.send_cmd(CmdRequest::new("fail")).await.unwrap_err();
        assert_eq!(status.code(), tonic::Code::InvalidArgument);
        assert_eq!(status.message(), "bad command");
    }

    #[tokio::test]
    async fn client_is_reusable_across_calls() {
        let addr = spawn_echo().await;
        let mut client = client_for(addr).await;

        for i in 0..3 {
            let reply = client
                .send_cmd(CmdRequest::new(format!("cmd{i}")))
                .await
                .unwrap();
            assert_eq!(reply.into_inner().cmdout, format!("got cmd{i}"));
        }
    }

    #[tokio::test]
    async fn unreachable_agent_is_unavailable() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let channel = Endpoint::from_shared(format!("http://{addr}"))
            .unwrap()
            .connect_lazy();
        let mut client = CmdHandlerClient::new(channel);
        let status = client
            .send_cmd(CmdRequest::new("show-afi-objects"))
            .await
            .unwrap_err();
        assert_eq!(status.code(), tonic::Code::Unavailable);
    }
}
