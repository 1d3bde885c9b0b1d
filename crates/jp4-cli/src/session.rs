//! The read-validate-dispatch-render loop.
//!
//! A `Session` owns everything that lives for one run of the shell: the
//! dispatcher (and through it the RPC channel), the line reader with its
//! history and completion vocabulary, and the catalog. It is generic over
//! both ends so tests can drive it with scripted input and a mock agent.

use std::io::Write;
use std::time::Instant;

use jp4_dispatch::Dispatch;
use log::debug;

use crate::audit::AuditLogger;
use crate::catalog::CommandCatalog;
use crate::command::Input;
use crate::config::DEFAULT_PROMPT;
use crate::editor::{LineReader, ReadOutcome};
use crate::renderer::ShellOutput;

/// Why the loop stopped. Both are clean exits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellExit {
    Quit,
    EndOfInput,
}

impl ShellExit {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShellExit::Quit => "quit",
            ShellExit::EndOfInput => "end_of_input",
        }
    }
}

pub struct Session<D: Dispatch, R: LineReader> {
    dispatcher: D,
    reader: R,
    catalog: CommandCatalog,
    prompt: String,
    audit: AuditLogger,
    dispatches: usize,
}

impl<D: Dispatch, R: LineReader> Session<D, R> {
    pub fn new(dispatcher: D, reader: R, catalog: CommandCatalog) -> Self {
        Self {
            dispatcher,
            reader,
            catalog,
            prompt: DEFAULT_PROMPT.to_string(),
            audit: AuditLogger::noop(),
            dispatches: 0,
        }
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    pub fn with_audit(mut self, audit: AuditLogger) -> Self {
        self.audit = audit;
        self
    }

    pub fn dispatcher(&self) -> &D {
        &self.dispatcher
    }

    pub fn reader(&self) -> &R {
        &self.reader
    }

    pub fn catalog(&self) -> &CommandCatalog {
        &self.catalog
    }

    /// Number of commands forwarded to the agent so far.
    pub fn dispatches(&self) -> usize {
        self.dispatches
    }

    /// Run until quit or end of input, then print the exit notice.
    pub fn run<W: Write>(&mut self, out: &mut ShellOutput<W>) -> ShellExit {
        loop {
            let line = match self.reader.read_line(&self.prompt) {
                ReadOutcome::Line(line) => line,
                ReadOutcome::Interrupted => continue,
                ReadOutcome::EndOfInput => return self.finish(ShellExit::EndOfInput, out),
            };

            if let Some(exit) = self.handle_line(&line, out) {
                return self.finish(exit, out);
            }
        }
    }

    /// Handle one line of input. Returns `Some` when the shell should stop;
    /// the caller is responsible for the exit notice.
    pub fn handle_line<W: Write>(&mut self, line: &str, out: &mut ShellOutput<W>) -> Option<ShellExit> {
        let input = Input::classify(line, &self.catalog);
        if input != Input::Empty {
            self.reader.add_history(line);
        }

        match input {
            Input::Empty => {}
            Input::Help => out.emit_catalog(&self.catalog),
            Input::Quit => return Some(ShellExit::Quit),
            Input::Invalid(verb) => {
                debug!("rejected unknown verb {verb:?}");
                out.emit_invalid(&verb, &self.catalog);
            }
            Input::Dispatch(command) => self.dispatch(&command, out),
        }
        None
    }

    fn dispatch<W: Write>(&mut self, command: &str, out: &mut ShellOutput<W>) {
        let started = Instant::now();
        let result = self.dispatcher.send(command);
        self.dispatches += 1;
        self.audit
            .log_dispatch(command, &result, started.elapsed().as_millis() as u64);

        match &result {
            Ok(reply) => out.emit_reply(self.catalog.output_prefix(), reply),
            Err(e) => out.emit_dispatch_error(e),
        }
    }

    fn finish<W: Write>(&mut self, exit: ShellExit, out: &mut ShellOutput<W>) -> ShellExit {
        out.emit_exit();
        self.audit.log_exit(exit.as_str(), self.dispatches);
        debug!(
            "session ended ({}) after {} dispatches",
            exit.as_str(),
            self.dispatches
        );
        exit
    }
}
