//! Append-only JSONL audit log of dispatched commands.
//!
//! Writes one JSON object per line recording each command sent to the agent
//! and how the dispatch ended.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use jp4_dispatch::DispatchError;

/// Append-only JSONL audit logger.
pub struct AuditLogger {
    writer: Option<BufWriter<File>>,
    session_id: String,
}

impl AuditLogger {
    /// Create a new audit logger that writes to the given path.
    /// Creates parent directories if they don't exist.
    pub fn new(path: &Path) -> io::Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new().create(true).append(true).open(path)?;

        Ok(Self {
            writer: Some(BufWriter::new(file)),
            session_id: generate_session_id(),
        })
    }

    /// Create a no-op logger that discards all events.
    pub fn noop() -> Self {
        Self {
            writer: None,
            session_id: generate_session_id(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.writer.is_some()
    }

    /// Log one dispatch and its outcome.
    pub fn log_dispatch(
        &mut self,
        command: &str,
        result: &Result<String, DispatchError>,
        duration_ms: u64,
    ) {
        let (outcome, detail) = match result {
            Ok(_) => ("ok", None),
            Err(DispatchError::Remote(details)) => ("remote_error", Some(details.as_str())),
            Err(e) => (e.kind(), None),
        };
        self.write_event(serde_json::json!({
            "ts": epoch_secs(),
            "session": self.session_id,
            "type": "dispatch",
            "command": command,
            "outcome": outcome,
            "detail": detail,
            "duration_ms": duration_ms,
        }));
    }

    /// Log the end of a shell session.
    pub fn log_exit(&mut self, reason: &str, dispatches: usize) {
        self.write_event(serde_json::json!({
            "ts": epoch_secs(),
            "session": self.session_id,
            "type": "exit",
            "reason": reason,
            "dispatches": dispatches,
        }));
    }

    fn write_event(&mut self, value: serde_json::Value) {
        if let Some(ref mut writer) = self.writer {
            if let Ok(line) = serde_json::to_string(&value) {
                let _ = writeln!(writer, "{line}");
                let _ = writer.flush();
            }
        }
    }
}

fn epoch_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

fn generate_session_id() -> String {
    let pid = std::process::id();
    let ts = epoch_secs();
    format!("s{:x}", pid ^ (ts as u32))
}
