//! Shared helpers: an in-process stub agent and a shell driven by a script.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use jp4_cli::style::Style;
use jp4_cli::{CommandCatalog, ScriptedReader, Session, ShellExit, ShellOutput};
use jp4_dispatch::stub::serve;
use jp4_dispatch::{ChannelSettings, GrpcDispatcher, StubAgent};
use tokio::net::TcpListener;
use tokio::runtime::Runtime;

pub fn settings(addr: SocketAddr) -> ChannelSettings {
    ChannelSettings {
        address: addr.to_string(),
        timeout: Some(Duration::from_secs(5)),
        connect_timeout: Duration::from_secs(2),
        // the test harness owns SIGINT
        cancel_on_interrupt: false,
    }
}

pub fn start_stub(runtime: &Runtime, agent: Arc<StubAgent>) -> SocketAddr {
    let listener = runtime
        .block_on(TcpListener::bind("127.0.0.1:0"))
        .expect("bind");
    let addr = listener.local_addr().expect("local addr");
    runtime.spawn(serve(listener, agent));
    addr
}

/// An address nothing listens on.
pub fn closed_addr(runtime: &Runtime) -> SocketAddr {
    let listener = runtime
        .block_on(TcpListener::bind("127.0.0.1:0"))
        .expect("bind");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);
    addr
}

pub struct ShellRun {
    pub exit: ShellExit,
    pub output: String,
    pub history: Vec<String>,
}

/// Run a full session over real gRPC with the given input lines.
pub fn run_shell(runtime: &Runtime, addr: SocketAddr, catalog: CommandCatalog, lines: &[&str]) -> ShellRun {
    let dispatcher =
        GrpcDispatcher::connect_lazy(&settings(addr), runtime.handle().clone()).expect("channel");
    let mut session = Session::new(dispatcher, ScriptedReader::from_lines(lines), catalog);
    let mut out = ShellOutput::new(Vec::new(), Style::disabled());
    let exit = session.run(&mut out);

    ShellRun {
        exit,
        output: String::from_utf8(out.writer).expect("utf-8 output"),
        history: session.reader().history().to_vec(),
    }
}
