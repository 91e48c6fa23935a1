//! # panediff-codes
//!
//! Text-parsing layer of the panediff core: converts the output of an
//! external diff tool into the typed structures the rest of the system
//! works with.
//!
//! Two third-party wire formats are consumed here, exactly as the tool
//! documents them (never reinvented):
//!
//! - the **unified diff** hunk format, parsed into a sequence of
//!   [`Code`]s — aligned, zero-based, half-open line ranges covering
//!   both versions of one file (see [`diff_to_codes`]);
//! - the **raw diff-summary** format (`git diff --raw`), one record per
//!   changed path with modes, hashes, a status letter, and an optional
//!   similarity score (see [`parse_raw_diff`]).
//!
//! This crate is pure text processing: no filesystem access, no
//! subprocesses. The file-level layer lives in `panediff-core`.

mod codes;
mod raw;
mod unified;

pub use codes::{add_replaces, Code, CodeKind};
pub use raw::{parse_raw_diff, parse_raw_diff_line, RawDiffLine, RawStatus};
pub use unified::{diff_to_codes, read_codes, ParseError};
