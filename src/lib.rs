//! `pathrewrite` rewrites path-like strings across a directory tree.
//!
//! A search path is matched in four separator encodings (`/`, `//`, `\`, `\\`)
//! and every hit is replaced by the new path written in the same encoding. It
//! provides the core logic for the `prw` command-line tool but can also be
//! used as a standalone library. The main components are:
//!
//! - `variants`: Separator normalization and the four-way variant table.
//! - `rewriter`: The `PathRewriter` engine that walks a tree and matches names
//!   and contents.
//! - `worker`: Runs a rewrite on a dedicated thread and streams events.
//! - `file_renamer`: Optional renaming of matched files and directories.
//! - `backups`: `.bak` copies, `undo` and `clean-backups`.
//! - `config`: For loading rewrite settings from YAML files.

pub mod backups;
pub mod cli;
pub mod config;
pub mod errors;
pub mod file_renamer;
pub mod output_formatter;
pub mod report;
pub mod request;
pub mod rewriter;
pub mod variants;
pub mod worker;

// Re-export main types for easier access by library users.
pub use errors::{Error, Result};
pub use output_formatter::{OutputFormat, OutputFormatter};
pub use report::{MatchKind, MatchRecord, RunEvent, RunResult};
pub use request::ReplacementRequest;
pub use rewriter::PathRewriter;
pub use variants::{normalize, VariantPairs};
