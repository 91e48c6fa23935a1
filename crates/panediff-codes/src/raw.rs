//! Parse git's raw diff-summary output (`git diff --raw`).
//!
//! Format, per <https://git-scm.com/docs/git-diff#_raw_output_format>:
//!
//! ```text
//! :<src_mode> <dst_mode> <src_sha> <dst_sha> <status>[<score>]\t<path>[\t<dst_path>]
//! ```
//!
//! The score digits follow the status letter only for renames and
//! copies; `dst_path` is only present for those two statuses as well.

use crate::unified::ParseError;
use serde::Serialize;

/// Status letter of a raw diff-summary record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RawStatus {
    Added,
    Copied,
    Deleted,
    Modified,
    Renamed,
    TypeChanged,
    Unmerged,
    /// `X` or anything undocumented; git's own docs call `X` a bug.
    Unknown,
}

impl RawStatus {
    fn from_letter(letter: char) -> Self {
        match letter {
            'A' => RawStatus::Added,
            'C' => RawStatus::Copied,
            'D' => RawStatus::Deleted,
            'M' => RawStatus::Modified,
            'R' => RawStatus::Renamed,
            'T' => RawStatus::TypeChanged,
            'U' => RawStatus::Unmerged,
            _ => RawStatus::Unknown,
        }
    }
}

/// One parsed record of raw diff-summary output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDiffLine {
    /// e.g. `100644`; `000000` for creation/unmerged.
    pub src_mode: String,
    pub dst_mode: String,
    /// Abbreviated object hash; all zeros for creation/unmerged.
    pub src_sha: String,
    pub dst_sha: String,
    pub status: RawStatus,
    /// Similarity score 0-100; only for renames and copies.
    pub score: Option<u32>,
    pub path: String,
    /// Destination path; only set for renames and copies.
    pub dst_path: Option<String>,
}

/// Parse a single raw diff-summary line.
///
/// A line that does not match the documented format is a
/// [`ParseError::RawLine`] quoting the offending text — never skipped,
/// since a silently dropped record would desynchronize the file list.
pub fn parse_raw_diff_line(line: &str) -> Result<RawDiffLine, ParseError> {
    let malformed = || ParseError::RawLine {
        line: line.to_string(),
    };

    let mut fields = line.split('\t');
    let meta = fields.next().ok_or_else(malformed)?;
    let path = fields.next().ok_or_else(malformed)?;
    let dst_path = fields.next();

    let meta = meta.strip_prefix(':').ok_or_else(malformed)?;
    let mut parts = meta.split(' ');
    let src_mode = parts.next().ok_or_else(malformed)?;
    let dst_mode = parts.next().ok_or_else(malformed)?;
    let src_sha = parts.next().ok_or_else(malformed)?;
    let dst_sha = parts.next().ok_or_else(malformed)?;
    let status_field = parts.next().ok_or_else(malformed)?;
    if parts.next().is_some() || status_field.is_empty() {
        return Err(malformed());
    }

    let mut chars = status_field.chars();
    let status_letter = chars.next().ok_or_else(malformed)?;
    let digits = chars.as_str();
    let score = if digits.is_empty() {
        None
    } else {
        Some(digits.parse::<u32>().map_err(|_| malformed())?)
    };

    Ok(RawDiffLine {
        src_mode: src_mode.to_string(),
        dst_mode: dst_mode.to_string(),
        src_sha: src_sha.to_string(),
        dst_sha: dst_sha.to_string(),
        status: RawStatus::from_letter(status_letter),
        score,
        path: path.to_string(),
        dst_path: dst_path.map(|p| p.to_string()),
    })
}

/// Parse a whole raw diff-summary dump, one record per non-empty line.
///
/// The first malformed line aborts the call.
pub fn parse_raw_diff(output: &str) -> Result<Vec<RawDiffLine>, ParseError> {
    output
        .lines()
        .filter(|line| !line.is_empty())
        .map(parse_raw_diff_line)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_rename_with_score() {
        let line = ":100644 100644 4dc9e64 ccb4941 R90\tleft/huckfinn.txt\tright/huckfinn.md";
        assert_eq!(
            parse_raw_diff_line(line).unwrap(),
            RawDiffLine {
                src_mode: "100644".to_string(),
                dst_mode: "100644".to_string(),
                src_sha: "4dc9e64".to_string(),
                dst_sha: "ccb4941".to_string(),
                status: RawStatus::Renamed,
                score: Some(90),
                path: "left/huckfinn.txt".to_string(),
                dst_path: Some("right/huckfinn.md".to_string()),
            }
        );
    }

    #[test]
    fn parses_no_index_dir_dump() {
        // git diff --no-index --raw left right
        let output = "\
:100644 100644 f00c965 f00c965 R100\tleft/d.txt\tright/a.txt
:100644 100644 0000000 0000000 M\tleft/b.txt
:100644 000000 d95f3ad 0000000 D\tleft/c.txt
:000000 100644 0000000 e69de29 A\tright/e.txt
";
        let lines = parse_raw_diff(output).unwrap();
        assert_eq!(lines.len(), 4);

        assert_eq!(lines[0].status, RawStatus::Renamed);
        assert_eq!(lines[0].score, Some(100));
        assert_eq!(lines[0].dst_path.as_deref(), Some("right/a.txt"));

        assert_eq!(lines[1].status, RawStatus::Modified);
        assert_eq!(lines[1].score, None);
        assert_eq!(lines[1].dst_path, None);

        assert_eq!(lines[2].status, RawStatus::Deleted);
        assert_eq!(lines[3].status, RawStatus::Added);
        assert_eq!(lines[3].src_sha, "0000000");
    }

    #[test]
    fn undocumented_status_letter_is_unknown() {
        let line = ":100644 100644 0000000 0000000 X\tsome/file";
        assert_eq!(parse_raw_diff_line(line).unwrap().status, RawStatus::Unknown);
    }

    #[test]
    fn malformed_line_reports_its_text() {
        let bad = "100644 100644 0000000 0000000 M\tno-leading-colon";
        let err = parse_raw_diff_line(bad).unwrap_err();
        match err {
            ParseError::RawLine { line } => assert_eq!(line, bad),
            other => panic!("unexpected error: {other}"),
        }

        assert!(parse_raw_diff_line(":100644 100644 M\ttoo/few/fields").is_err());
        assert!(parse_raw_diff_line(":100644 100644 0000000 0000000 Rxy\tp\tq").is_err());
    }

    #[test]
    fn empty_output_parses_to_nothing() {
        assert_eq!(parse_raw_diff("").unwrap(), vec![]);
        assert_eq!(parse_raw_diff("\n\n").unwrap(), vec![]);
    }

    #[test]
    fn first_malformed_line_aborts() {
        let output = ":100644 100644 0000000 0000000 M\tok.txt\ngarbage line\n";
        assert!(parse_raw_diff(output).is_err());
    }
}
