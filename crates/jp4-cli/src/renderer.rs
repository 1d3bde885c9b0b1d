//! Everything the shell prints goes through `ShellOutput<W: Write>`.
//!
//! Keeping the formatting here lets tests capture the exact operator-visible
//! text in a `Vec<u8>`.

use std::io::Write;

use jp4_dispatch::DispatchError;

use crate::catalog::CommandCatalog;
use crate::style::Style;

pub const EXIT_NOTICE: &str = "Exiting JP4Agent CLI.";

pub struct ShellOutput<W: Write> {
    pub writer: W,
    style: Style,
}

impl<W: Write> ShellOutput<W> {
    pub fn new(writer: W, style: Style) -> Self {
        Self { writer, style }
    }

    pub fn style(&self) -> &Style {
        &self.style
    }

    /// The usage listing shown for `help` and after an invalid command.
    pub fn emit_catalog(&mut self, catalog: &CommandCatalog) {
        let _ = writeln!(
            self.writer,
            "{}Available commands:{}",
            self.style.bold_start(),
            self.style.reset()
        );
        for entry in catalog.entries() {
            if entry.usage.is_empty() {
                let _ = writeln!(self.writer, "  {}", entry.verb);
            } else {
                let _ = writeln!(
                    self.writer,
                    "  {} {}{}{}",
                    entry.verb,
                    self.style.dim_start(),
                    entry.usage,
                    self.style.reset()
                );
            }
        }
        let _ = self.writer.flush();
    }

    pub fn emit_invalid(&mut self, verb: &str, catalog: &CommandCatalog) {
        let _ = writeln!(
            self.writer,
            "{}Invalid command: {}{}",
            self.style.red_start(),
            verb,
            self.style.reset()
        );
        self.emit_catalog(catalog);
    }

    /// An agent reply, behind the catalog's output prefix.
    pub fn emit_reply(&mut self, prefix: &str, text: &str) {
        let _ = writeln!(self.writer, "{prefix}{text}");
        let _ = self.writer.flush();
    }

    /// Dispatch failures print their message with no decoration.
    pub fn emit_dispatch_error(&mut self, err: &DispatchError) {
        let _ = writeln!(self.writer, "{err}");
        let _ = self.writer.flush();
    }

    pub fn emit_exit(&mut self) {
        let _ = writeln!(self.writer, "{EXIT_NOTICE}");
        let _ = self.writer.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn make_output(style: Style) -> ShellOutput<Vec<u8>> {
        ShellOutput::new(Vec::new(), style)
    }

    fn text(out: &ShellOutput<Vec<u8>>) -> String {
        String::from_utf8(out.writer.clone()).unwrap()
    }

    #[test]
    fn catalog_listing_plain() {
        let mut out = make_output(Style::disabled());
        out.emit_catalog(&CommandCatalog::table());
        assert_eq!(
            text(&out),
            "Available commands:\n\
             \x20 add-table <table-name> <key-field> <protocol-num> <default-next-obj> <table-size>\n\
             \x20 add-table-entry <table-name> <prefix> <prefix-length>\n\
             \x20 show-afi-objects\n"
        );
    }

    #[test]
    fn catalog_listing_colored_keeps_text() {
        let mut out = make_output(Style::force_enabled());
        out.emit_catalog(&CommandCatalog::packet());
        let s = text(&out);
        assert!(s.contains("\x1b[1mAvailable commands:\x1b[0m"));
        assert!(s.contains("  add-route \x1b[2m<rtt-token> <prefix> <next-node-token>\x1b[0m"));
    }

    #[test]
    fn invalid_then_listing() {
        let mut out = make_output(Style::disabled());
        out.emit_invalid("frobnicate", &CommandCatalog::packet());
        let s = text(&out);
        assert!(s.starts_with("Invalid command: frobnicate\nAvailable commands:\n"));
        assert_eq!(s.lines().count(), 2 + CommandCatalog::packet().len());
    }

    #[test]
    fn reply_with_prefix() {
        let mut out = make_output(Style::disabled());
        out.emit_reply("Cmd output: ", "Route added");
        assert_eq!(text(&out), "Cmd output: Route added\n");
    }

    #[test]
    fn reply_as_is() {
        let mut out = make_output(Style::disabled());
        out.emit_reply("", "Object name: t1\nObject type: tree\n\n");
        assert_eq!(text(&out), "Object name: t1\nObject type: tree\n\n\n");
    }

    #[test]
    fn unavailable_message_is_exact_even_with_color() {
        let mut out = make_output(Style::force_enabled());
        out.emit_dispatch_error(&DispatchError::Unavailable);
        assert_eq!(
            text(&out),
            "Couldn't connect to JP4Agent. Please ensure JP4Agent is up and running.\n"
        );
    }

    #[test]
    fn remote_and_timeout_messages() {
        let mut out = make_output(Style::disabled());
        out.emit_dispatch_error(&DispatchError::Remote("Invalid add-table cmd.".to_string()));
        out.emit_dispatch_error(&DispatchError::Timeout(Duration::from_millis(30000)));
        assert_eq!(
            text(&out),
            "Invalid add-table cmd.\nJP4Agent did not respond within 30000 ms.\n"
        );
    }

    #[test]
    fn exit_notice() {
        let mut out = make_output(Style::disabled());
        out.emit_exit();
        assert_eq!(text(&out), "Exiting JP4Agent CLI.\n");
    }
}
