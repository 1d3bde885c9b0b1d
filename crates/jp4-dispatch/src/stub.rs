//! A stand-in agent that serves `jp4cli.CmdHandler` without a dataplane.
//!
//! By default it answers every command with `Output for <command>`. Tests can
//! queue fixed replies or error statuses, and inspect what was received.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use jp4_protocol::{CmdHandler, CmdHandlerServer, CmdReply, CmdRequest};
use log::info;
use tokio::net::TcpListener;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::transport::Server;
use tonic::{Code, Request, Response, Status};

/// How the stub answers one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StubReply {
    Echo,
    Text(String),
    Status { code: Code, message: String },
}

#[derive(Debug, Default)]
pub struct StubAgent {
    script: Mutex<VecDeque<StubReply>>,
    received: Mutex<Vec<String>>,
}

impl StubAgent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_replies(replies: Vec<StubReply>) -> Self {
        Self {
            script: Mutex::new(replies.into()),
            received: Mutex::new(Vec::new()),
        }
    }

    /// Queue a reply for a future command.
    pub fn push_reply(&self, reply: StubReply) {
        lock(&self.script).push_back(reply);
    }

    /// Commands received so far, oldest first.
    pub fn received(&self) -> Vec<String> {
        lock(&self.received).clone()
    }

    fn reply_for(&self, cmdstr: &str) -> Result<String, Status> {
        lock(&self.received).push(cmdstr.to_string());
        let reply = lock(&self.script).pop_front().unwrap_or(StubReply::Echo);
        match reply {
            StubReply::Echo => Ok(format!("Output for {cmdstr}")),
            StubReply::Text(text) => Ok(text),
            StubReply::Status { code, message } => Err(Status::new(code, message)),
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[tonic::async_trait]
impl CmdHandler for StubAgent {
    async fn send_cmd(&self, request: Request<CmdRequest>) -> Result<Response<CmdReply>, Status> {
        let cmdstr = request.into_inner().cmdstr;
        info!("Received cmd: {cmdstr}");
        self.reply_for(&cmdstr).map(|text| Response::new(CmdReply::new(text)))
    }
}

/// Serve the stub on an already-bound listener until the task is dropped.
pub async fn serve(listener: TcpListener, agent: Arc<StubAgent>) -> Result<(), tonic::transport::Error> {
    Server::builder()
        .add_service(CmdHandlerServer::from_arc(agent))
        .serve_with_incoming(TcpListenerStream::new(listener))
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn call(agent: &StubAgent, cmd: &str) -> Result<String, Status> {
        agent
            .send_cmd(Request::new(CmdRequest::new(cmd)))
            .await
            .map(|r| r.into_inner().cmdout)
    }

    #[tokio::test]
    async fn echoes_by_default() {
        let agent = StubAgent::new();
        assert_eq!(call(&agent, "add-receive 3 ctx").await.unwrap(), "Output for add-receive 3 ctx");
    }

    #[tokio::test]
    async fn scripted_replies_then_echo() {
        let agent = StubAgent::with_replies(vec![
            StubReply::Text("Route added".to_string()),
            StubReply::Status {
                code: Code::Internal,
                message: "no such table".to_string(),
            },
        ]);

        assert_eq!(call(&agent, "add-route a b c").await.unwrap(), "Route added");
        let status = call(&agent, "add-table-entry t 10.0.0.0 8").await.unwrap_err();
        assert_eq!(status.code(), Code::Internal);
        assert_eq!(status.message(), "no such table");
        assert_eq!(call(&agent, "show-afi-objects").await.unwrap(), "Output for show-afi-objects");
    }

    #[tokio::test]
    async fn records_received_commands() {
        let agent = StubAgent::new();
        call(&agent, "one").await.unwrap();
        agent.push_reply(StubReply::Text("x".to_string()));
        call(&agent, "two").await.unwrap();
        assert_eq!(agent.received(), vec!["one".to_string(), "two".to_string()]);
    }
}
