//! Error types for the collaborators around the optimization core.
//!
//! The core itself (`Track::preprocess`, the search routines, the league
//! pipelines) has no recoverable failure mode: a degenerate track just
//! yields an empty route list. Everything fallible lives at the IGC
//! parsing and CLI boundary.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read IGC file: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed IGC B record in {file}: {line}")]
    MalformedFix { file: String, line: String },

    #[error("unknown league {0:?} (expected one of frcfd, uknxcl, ukxcl)")]
    UnknownLeague(String),
}
