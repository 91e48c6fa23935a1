//! Error taxonomy for the file-level diff layer.

use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by pairing, hashing, and diff orchestration.
///
/// Every variant carries enough context (the offending path, the tool's
/// stderr) for the UI layer to render a message rather than a trace.
#[derive(Debug, Error)]
pub enum DiffError {
    /// The external diff tool's output could not be parsed.
    #[error(transparent)]
    Parse(#[from] panediff_codes::ParseError),

    /// A file could not be read.
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Filesystem trouble outside of reading a specific diff side.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The external diff tool could not be spawned at all.
    #[error("diff tool {tool:?} is not available: {source}")]
    ToolUnavailable {
        tool: String,
        source: std::io::Error,
    },

    /// The external diff tool ran but reported a genuine failure.
    ///
    /// Exit code 1 means "differences found" and is not routed here;
    /// this is exit codes >= 2, with whatever the tool wrote to stderr.
    #[error("diff tool failed with {status}: {stderr}")]
    Tool { status: String, stderr: String },

    /// An operation needed a side the pair does not have.
    #[error("file pair has no {side} side")]
    MissingSide { side: &'static str },

    /// The diff tool's output was not valid UTF-8.
    #[error("diff tool produced non-UTF-8 output")]
    ToolOutput(#[from] std::string::FromUtf8Error),
}
