//! The command vocabulary the shell accepts and forwards.
//!
//! A catalog is plain data: an ordered list of verbs with their usage
//! strings, plus how replies are rendered. Two built-in variants exist; a
//! custom vocabulary can be supplied through the config file.

use std::collections::HashSet;
use std::fmt;

use serde::Deserialize;
use thiserror::Error;

use crate::command;

/// Prefix the packet catalog puts in front of every agent reply.
pub const PACKET_OUTPUT_PREFIX: &str = "Cmd output: ";

const PACKET_COMMANDS: &[(&str, &str)] = &[
    ("inject-l2-pkt", "<sandbox-index> <port-index>"),
    (
        "add-ether-encap",
        "<src-mac> <dst-mac> <inner-vlan-id|0> <outer-vlan-id|0> <output-port-token>",
    ),
    ("set-input-port-next-node", "<port-index> <next-node-token>"),
    ("add-route", "<rtt-token> <prefix> <next-node-token>"),
    ("add-receive", "<receive-code> <context>"),
];

const TABLE_COMMANDS: &[(&str, &str)] = &[
    (
        "add-table",
        "<table-name> <key-field> <protocol-num> <default-next-obj> <table-size>",
    ),
    ("add-table-entry", "<table-name> <prefix> <prefix-length>"),
    ("show-afi-objects", ""),
];

/// Which built-in vocabulary to load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CatalogVariant {
    /// Packet injection and routing commands.
    #[default]
    Packet,
    /// AFI table management commands.
    Table,
}

impl fmt::Display for CatalogVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogVariant::Packet => write!(f, "packet"),
            CatalogVariant::Table => write!(f, "table"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CatalogEntry {
    pub verb: String,
    /// Argument shape, e.g. `<port-index> <next-node-token>`. May be empty.
    #[serde(default)]
    pub usage: String,
}

impl CatalogEntry {
    pub fn new(verb: impl Into<String>, usage: impl Into<String>) -> Self {
        Self {
            verb: verb.into(),
            usage: usage.into(),
        }
    }
}

impl fmt::Display for CatalogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.usage.is_empty() {
            write!(f, "{}", self.verb)
        } else {
            write!(f, "{} {}", self.verb, self.usage)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("catalog has no commands")]
    Empty,
    #[error("catalog verb must be a single non-empty word, got {0:?}")]
    BadVerb(String),
    #[error("catalog verb '{0}' is declared more than once")]
    Duplicate(String),
    #[error("catalog verb '{0}' is reserved by the shell")]
    Reserved(String),
}

/// Ordered, read-only verb → usage mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandCatalog {
    entries: Vec<CatalogEntry>,
    output_prefix: String,
}

impl CommandCatalog {
    /// Build a catalog, rejecting vocabularies the shell could not route.
    pub fn new(
        entries: Vec<CatalogEntry>,
        output_prefix: impl Into<String>,
    ) -> Result<Self, CatalogError> {
        if entries.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut seen = HashSet::new();
        for entry in &entries {
            let verb = entry.verb.as_str();
            if verb.is_empty() || verb.chars().any(char::is_whitespace) {
                return Err(CatalogError::BadVerb(entry.verb.clone()));
            }
            if command::is_reserved(verb) {
                return Err(CatalogError::Reserved(entry.verb.clone()));
            }
            if !seen.insert(verb) {
                return Err(CatalogError::Duplicate(entry.verb.clone()));
            }
        }

        Ok(Self {
            entries,
            output_prefix: output_prefix.into(),
        })
    }

    pub fn builtin(variant: CatalogVariant) -> Self {
        let (commands, prefix) = match variant {
            CatalogVariant::Packet => (PACKET_COMMANDS, PACKET_OUTPUT_PREFIX),
            CatalogVariant::Table => (TABLE_COMMANDS, ""),
        };
        Self {
            entries: commands
                .iter()
                .map(|(verb, usage)| CatalogEntry::new(*verb, *usage))
                .collect(),
            output_prefix: prefix.to_string(),
        }
    }

    pub fn packet() -> Self {
        Self::builtin(CatalogVariant::Packet)
    }

    pub fn table() -> Self {
        Self::builtin(CatalogVariant::Table)
    }

    pub fn contains(&self, verb: &str) -> bool {
        self.lookup(verb).is_some()
    }

    pub fn lookup(&self, verb: &str) -> Option<&CatalogEntry> {
        self.entries.iter().find(|e| e.verb == verb)
    }

    /// Entries in declaration order.
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    /// Completion vocabulary, in declaration order.
    pub fn verbs(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.verb.clone()).collect()
    }

    /// Text placed before each reply when rendering it. Empty means as-is.
    pub fn output_prefix(&self) -> &str {
        &self.output_prefix
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
