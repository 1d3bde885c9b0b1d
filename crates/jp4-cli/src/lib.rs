//! jp4-cli: the interactive operator shell for JP4Agent.
//!
//! Reads commands at a prompt, checks the leading verb against a fixed
//! catalog, forwards accepted lines to the agent and prints the reply.
//! Exposed as a library for integration testing.

pub mod audit;
pub mod catalog;
pub mod cli;
pub mod command;
pub mod config;
pub mod editor;
pub mod renderer;
pub mod session;
pub mod style;

pub use catalog::{CatalogEntry, CatalogError, CatalogVariant, CommandCatalog};
pub use command::Input;
pub use config::Config;
pub use editor::{LineReader, ReadOutcome, ReadlineReader, ScriptedReader};
pub use renderer::ShellOutput;
pub use session::{Session, ShellExit};
