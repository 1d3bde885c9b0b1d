//! Line input for the shell: a rustyline editor with verb completion, and a
//! scripted reader for tests.

use std::collections::VecDeque;

use log::warn;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::{CompletionType, Config as EditorConfig, Context, Editor, Helper, Highlighter, Hinter, Validator};

/// Result of one blocking read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    Line(String),
    /// Ctrl-C while typing: drop the line, prompt again.
    Interrupted,
    /// Ctrl-D or closed input: shut down.
    EndOfInput,
}

/// Source of operator input.
pub trait LineReader {
    fn read_line(&mut self, prompt: &str) -> ReadOutcome;
    /// Remember a line for recall with the arrow keys.
    fn add_history(&mut self, line: &str);
}

/// Completes the first word of the line against the catalog verbs.
#[derive(Helper, Hinter, Highlighter, Validator)]
pub struct VerbCompleter {
    verbs: Vec<String>,
}

impl VerbCompleter {
    pub fn new(verbs: Vec<String>) -> Self {
        Self { verbs }
    }

    /// Candidates for the text before `pos`, and where the replacement starts.
    ///
    /// Only the verb position completes; once a space follows the verb there
    /// is nothing to offer.
    pub fn candidates(&self, line: &str, pos: usize) -> (usize, Vec<Pair>) {
        let before = &line[..pos];
        let start = before.len() - before.trim_start().len();
        let word = &before[start..];
        if word.chars().any(char::is_whitespace) {
            return (pos, Vec::new());
        }

        let pairs = self
            .verbs
            .iter()
            .filter(|verb| verb.starts_with(word))
            .map(|verb| Pair {
                display: verb.clone(),
                replacement: verb.clone(),
            })
            .collect();
        (start, pairs)
    }
}

impl Completer for VerbCompleter {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        Ok(self.candidates(line, pos))
    }
}

/// Interactive reader backed by rustyline. History lives in memory only.
pub struct ReadlineReader {
    editor: Editor<VerbCompleter, DefaultHistory>,
}

impl ReadlineReader {
    pub fn new(verbs: Vec<String>) -> rustyline::Result<Self> {
        let config = EditorConfig::builder()
            .auto_add_history(false)
            .max_history_size(usize::MAX)?
            .history_ignore_dups(true)?
            .completion_type(CompletionType::List)
            .build();
        let mut editor = Editor::with_config(config)?;
        editor.set_helper(Some(VerbCompleter::new(verbs)));
        Ok(Self { editor })
    }
}

impl LineReader for ReadlineReader {
    fn read_line(&mut self, prompt: &str) -> ReadOutcome {
        outcome(self.editor.readline(prompt))
    }

    fn add_history(&mut self, line: &str) {
        let _ = self.editor.add_history_entry(line);
    }
}

/// Ctrl-C re-prompts; Ctrl-D and any other input failure shut the shell down.
fn outcome(result: rustyline::Result<String>) -> ReadOutcome {
    match result {
        Ok(line) => ReadOutcome::Line(line),
        Err(ReadlineError::Interrupted) => ReadOutcome::Interrupted,
        Err(ReadlineError::Eof) => ReadOutcome::EndOfInput,
        Err(e) => {
            warn!("input error, treating as end of input: {e}");
            ReadOutcome::EndOfInput
        }
    }
}

/// Replays a fixed sequence of read outcomes, then reports end of input.
#[derive(Debug, Default)]
pub struct ScriptedReader {
    script: VecDeque<ReadOutcome>,
    history: Vec<String>,
    prompts: usize,
}

impl ScriptedReader {
    pub fn new(script: Vec<ReadOutcome>) -> Self {
        Self {
            script: script.into(),
            ..Default::default()
        }
    }

    pub fn from_lines(lines: &[&str]) -> Self {
        Self::new(
            lines
                .iter()
                .map(|line| ReadOutcome::Line((*line).to_string()))
                .collect(),
        )
    }

    pub fn history(&self) -> &[String] {
        &self.history
    }

    /// How many times the prompt was shown.
    pub fn prompts(&self) -> usize {
        self.prompts
    }
}

impl LineReader for ScriptedReader {
    fn read_line(&mut self, _prompt: &str) -> ReadOutcome {
        self.prompts += 1;
        self.script.pop_front().unwrap_or(ReadOutcome::EndOfInput)
    }

    fn add_history(&mut self, line: &str) {
        self.history.push(line.to_string());
    }
}
