//! Parse unified diff output into aligned line-range codes.
//!
//! The input is the text emitted by `git diff` (or any tool producing
//! unified diffs) for a single file pair. Hunk parsing is delegated to
//! `unidiff`; this module turns the parsed hunks into the [`Code`]
//! sequence the two-pane renderer needs, including the `skip` regions
//! for unchanged context elided between hunks.

use crate::codes::{add_replaces, Code};
use thiserror::Error;
use unidiff::{Hunk, PatchSet, PatchedFile};

/// Errors that can occur while converting a diff to codes.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The unified diff itself could not be parsed (malformed hunk
    /// header, truncated hunk body).
    #[error("failed to parse unified diff: {0}")]
    Patch(String),

    /// A hunk body line was missing the line number its type requires.
    /// Indicates a diff that desynchronized its own cursors; never
    /// skipped silently because every later range would be off.
    #[error("hunk line has no {side} line number: {line:?}")]
    Alignment { side: &'static str, line: String },

    /// A raw diff-summary line did not match the documented format.
    #[error("malformed raw diff line: {line:?}")]
    RawLine { line: String },
}

/// Marker git prints instead of hunks when at least one side is binary.
const BINARY_MARKER: &str = "Binary files ";

fn is_binary_diff(diff: &str) -> bool {
    diff.lines()
        .any(|line| line.starts_with(BINARY_MARKER) && line.trim_end().ends_with(" differ"))
}

/// Convert a unified diff to the code sequence for its first file.
///
/// `after_num_lines` is the total line count of the right-hand file,
/// counted independently of the diff. It is needed to emit the trailing
/// `skip` after the last hunk; without it the tail's extent is
/// unknowable from the diff alone and no trailing code is produced.
///
/// Returns `Ok(None)` when the diff reports binary content — the caller
/// decides how to represent that (the orchestrator substitutes a
/// one-line replace placeholder).
///
/// An empty diff means the two files are identical: with
/// `after_num_lines` known this yields a single full-file `equal` code,
/// otherwise an empty sequence. A diff whose hunks cannot all be parsed
/// is a [`ParseError::Patch`], never a shorter code sequence.
pub fn diff_to_codes(
    diff: &str,
    after_num_lines: Option<usize>,
) -> Result<Option<Vec<Code>>, ParseError> {
    if is_binary_diff(diff) {
        return Ok(None);
    }

    let mut patch = PatchSet::new();
    patch
        .parse(diff)
        .map_err(|e| ParseError::Patch(e.to_string()))?;

    // `unidiff` drops hunks whose header it cannot parse instead of
    // erroring. A count mismatch against the hunk headers present in
    // the text means part of the diff was lost, and every range after
    // the lost hunk would be wrong; only hunk-less output (an empty
    // diff, a pure mode change) may take the identical-files path
    // below. Body lines are prefixed, so only headers start with `@@`.
    let declared_hunks = diff.lines().filter(|l| l.starts_with("@@")).count();
    let parsed_hunks: usize = patch.files().iter().map(|f| f.hunks().len()).sum();
    if parsed_hunks != declared_hunks {
        return Err(ParseError::Patch(format!(
            "input has {declared_hunks} hunk headers but {parsed_hunks} parsed"
        )));
    }

    let mut codes = match patch.files().first() {
        Some(file) => add_replaces(&read_codes(file)?),
        None => Vec::new(),
    };

    if codes.is_empty() {
        return Ok(Some(match after_num_lines {
            Some(n) if n > 0 => vec![Code::equal((0, n), (0, n))],
            _ => Vec::new(),
        }));
    }

    if let Some(num_lines) = after_num_lines {
        let (_, before_end) = codes[codes.len() - 1].before;
        let (_, after_end) = codes[codes.len() - 1].after;
        let tail = num_lines.saturating_sub(after_end);
        if tail != 0 {
            codes.push(Code::skip(
                (before_end, before_end + tail),
                (after_end, after_end + tail),
                None,
            ));
        }
    }

    Ok(Some(codes))
}

/// Walk one patched file's hunks and emit the raw code sequence
/// (before replace-merging and trailing-skip computation).
///
/// Cursors are kept 1-based to match hunk numbering: a cursor value of
/// `n` means "line n was the last one consumed", with 0 meaning
/// "nothing consumed yet". All emitted ranges are zero-based half-open.
pub fn read_codes(file: &PatchedFile) -> Result<Vec<Code>, ParseError> {
    let mut out = Vec::new();
    let mut last_source = 0usize;
    let mut last_target = 0usize;

    for hunk in file.hunks() {
        // A zero-length side (zero-context diffs, whole-hunk inserts
        // or deletes) reports the line its changes apply *after*, not
        // a first line of its own; shift it by one so the skip
        // arithmetic sees the same convention on both sides.
        let source_edge = hunk.source_start + usize::from(hunk.source_length == 0);
        let target_edge = hunk.target_start + usize::from(hunk.target_length == 0);
        if source_edge != last_source + 1 {
            let header = match hunk.section_header.trim() {
                "" => None,
                h => Some(h.to_string()),
            };
            out.push(Code::skip(
                (last_source, source_edge.saturating_sub(1)),
                (last_target, target_edge.saturating_sub(1)),
                header,
            ));
            last_source = source_edge.saturating_sub(1);
            last_target = target_edge.saturating_sub(1);
        }

        read_hunk_codes(hunk, &mut out, &mut last_source, &mut last_target)?;
    }

    Ok(out)
}

/// Group a hunk's body into maximal runs of one line type and emit a
/// code per run.
fn read_hunk_codes(
    hunk: &Hunk,
    out: &mut Vec<Code>,
    last_source: &mut usize,
    last_target: &mut usize,
) -> Result<(), ParseError> {
    // Lines of any other type (the "\ No newline at end of file"
    // marker) carry no line numbers and are invisible to alignment.
    let lines: Vec<_> = hunk
        .lines()
        .iter()
        .filter(|l| matches!(l.line_type.as_str(), " " | "+" | "-"))
        .collect();

    let mut i = 0;
    while i < lines.len() {
        let line_type = lines[i].line_type.as_str();
        let mut j = i + 1;
        while j < lines.len() && lines[j].line_type == line_type {
            j += 1;
        }
        let (first, last) = (lines[i], lines[j - 1]);

        let source_span = || -> Result<(usize, usize), ParseError> {
            let start = source_no(first)?;
            let end = source_no(last)?;
            Ok((start - 1, end))
        };
        let target_span = || -> Result<(usize, usize), ParseError> {
            let start = target_no(first)?;
            let end = target_no(last)?;
            Ok((start - 1, end))
        };

        match line_type {
            " " => out.push(Code::equal(source_span()?, target_span()?)),
            "-" => out.push(Code::delete(source_span()?, *last_target)),
            "+" => out.push(Code::insert(*last_source, target_span()?)),
            _ => unreachable!("filtered above"),
        }

        *last_source = last.source_line_no.unwrap_or(*last_source);
        *last_target = last.target_line_no.unwrap_or(*last_target);
        i = j;
    }

    Ok(())
}

fn source_no(line: &unidiff::Line) -> Result<usize, ParseError> {
    line.source_line_no.ok_or_else(|| ParseError::Alignment {
        side: "source",
        line: line.value.clone(),
    })
}

fn target_no(line: &unidiff::Line) -> Result<usize, ParseError> {
    line.target_line_no.ok_or_else(|| ParseError::Alignment {
        side: "target",
        line: line.value.clone(),
    })
}
