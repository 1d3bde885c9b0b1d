//! Classifies one line of operator input.

use crate::catalog::CommandCatalog;

/// Words that print the catalog.
pub const HELP_WORDS: &[&str] = &["help", "h", "?"];

/// Words that end the session.
pub const QUIT_WORDS: &[&str] = &["quit", "exit"];

/// Words the shell handles itself and never forwards to the agent.
pub fn reserved_words() -> impl Iterator<Item = &'static str> {
    HELP_WORDS.iter().chain(QUIT_WORDS).copied()
}

pub fn is_reserved(word: &str) -> bool {
    HELP_WORDS.contains(&word) || QUIT_WORDS.contains(&word)
}

/// What the shell should do with a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// Blank or whitespace-only.
    Empty,
    /// `help`, `h` or `?`.
    Help,
    /// `quit` or `exit`.
    Quit,
    /// Verb not in the catalog.
    Invalid(String),
    /// A catalog verb; carries the full literal line.
    Dispatch(String),
}

impl Input {
    /// Classify `line` against `catalog`.
    ///
    /// Only the verb (first whitespace-delimited token) is inspected, and the
    /// match is exact and case-sensitive. Arguments are never parsed.
    pub fn classify(line: &str, catalog: &CommandCatalog) -> Self {
        let verb = match line.split_whitespace().next() {
            Some(verb) => verb,
            None => return Input::Empty,
        };

        if HELP_WORDS.contains(&verb) {
            Input::Help
        } else if QUIT_WORDS.contains(&verb) {
            Input::Quit
        } else if catalog.contains(verb) {
            Input::Dispatch(line.to_string())
        } else {
            Input::Invalid(verb.to_string())
        }
    }
}
