//! Aligned line-range codes between two versions of a file.

use serde::Serialize;

/// The kind of alignment a [`Code`] describes.
///
/// Serialized in lowercase; these are the strings the two-pane renderer
/// consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CodeKind {
    /// Lines present and identical on both sides.
    Equal,
    /// Lines present only on the right side.
    Insert,
    /// Lines present only on the left side.
    Delete,
    /// A left range rewritten as a different right range.
    Replace,
    /// An unchanged region elided from the diff input; only its
    /// boundaries are known.
    Skip,
}

/// One contiguous alignment segment between the left and right version
/// of a file.
///
/// Both ranges are zero-based and half-open. The full code sequence for
/// a file tiles `[0, left_line_count)` and `[0, right_line_count)` with
/// no gaps and no overlaps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Code {
    #[serde(rename = "type")]
    pub kind: CodeKind,
    /// Line range on the left side.
    pub before: (usize, usize),
    /// Line range on the right side.
    pub after: (usize, usize),
    /// Section-header text of the hunk following a skipped region.
    /// Only ever set on `Skip` codes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header: Option<String>,
}

impl Code {
    pub fn new(kind: CodeKind, before: (usize, usize), after: (usize, usize)) -> Self {
        Self {
            kind,
            before,
            after,
            header: None,
        }
    }

    pub fn equal(before: (usize, usize), after: (usize, usize)) -> Self {
        Self::new(CodeKind::Equal, before, after)
    }

    /// An insertion: the before range is always empty.
    pub fn insert(at: usize, after: (usize, usize)) -> Self {
        Self::new(CodeKind::Insert, (at, at), after)
    }

    /// A deletion: the after range is always empty.
    pub fn delete(before: (usize, usize), at: usize) -> Self {
        Self::new(CodeKind::Delete, before, (at, at))
    }

    pub fn replace(before: (usize, usize), after: (usize, usize)) -> Self {
        Self::new(CodeKind::Replace, before, after)
    }

    pub fn skip(before: (usize, usize), after: (usize, usize), header: Option<String>) -> Self {
        Self {
            kind: CodeKind::Skip,
            before,
            after,
            header,
        }
    }

    /// Number of lines covered on the left side.
    pub fn before_len(&self) -> usize {
        self.before.1 - self.before.0
    }

    /// Number of lines covered on the right side.
    pub fn after_len(&self) -> usize {
        self.after.1 - self.after.0
    }
}

/// Merge each `Delete` immediately followed by an `Insert` into a
/// single `Replace`.
///
/// The merged code takes the delete's before range and the insert's
/// after range. One pass, left to right, non-recursive: each
/// delete/insert pair is merged exactly once, so the function is
/// idempotent on its own output.
pub fn add_replaces(codes: &[Code]) -> Vec<Code> {
    let mut out = Vec::with_capacity(codes.len());
    let mut i = 0;

    while i < codes.len() {
        if let [code, next, ..] = &codes[i..] {
            if code.kind == CodeKind::Delete && next.kind == CodeKind::Insert {
                out.push(Code::replace(
                    (code.before.0, next.before.1),
                    (code.after.0, next.after.1),
                ));
                i += 2;
                continue;
            }
        }
        out.push(codes[i].clone());
        i += 1;
    }

    out
}
