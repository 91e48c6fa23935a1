//! End-to-end coverage against the real `git` binary: directory
//! comparison through the raw output path, and per-pair code sequences
//! through `git diff --no-index`.

use panediff_core::{
    compute_file_pairs, compute_line_codes, Code, FilePair, HashCache, PairKind,
};
use std::fs;
use std::path::Path;
use std::process::Command;

fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|out| out.status.success())
        .unwrap_or(false)
}

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

const BEFORE_JS: &str = "\
/**
 * Convert a JS date to a string appropriate to display on an axis that
 * is displaying values at the stated granularity.
 * @param {Date} date The date to format
 * @param {number} granularity One of the Dygraph granularity constants
 * @return {string} The formatted date
";

const AFTER_JS: &str = "\
/**
 * Convert a JS date to a string appropriate to display on an axis that
 * @param {Date} date The date to format
 * @param {number} granularity One of the Dygraph granularity constants
 * @return {string} The formatted date
";

#[test]
fn codes_for_single_line_deletion() {
    if !git_available() {
        eprintln!("git not available, skipping");
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "before.js", BEFORE_JS);
    write(dir.path(), "after.js", AFTER_JS);

    let pair = FilePair::both(
        dir.path(),
        dir.path().join("before.js"),
        dir.path(),
        dir.path().join("after.js"),
        false,
    );
    let codes = compute_line_codes(&pair, &[]).unwrap();
    assert_eq!(
        codes,
        vec![
            Code::equal((0, 2), (0, 2)),
            Code::delete((2, 3), 2),
            Code::equal((3, 6), (2, 5)),
        ]
    );
}

#[test]
fn identical_files_collapse_to_one_equal_code() {
    if !git_available() {
        eprintln!("git not available, skipping");
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "a.txt", "one\ntwo\nthree\n");
    write(dir.path(), "b.txt", "one\ntwo\nthree\n");

    let pair = FilePair::both(
        dir.path(),
        dir.path().join("a.txt"),
        dir.path(),
        dir.path().join("b.txt"),
        false,
    );
    assert_eq!(
        compute_line_codes(&pair, &[]).unwrap(),
        vec![Code::equal((0, 3), (0, 3))]
    );
}

#[test]
fn edit_far_from_the_end_leaves_a_trailing_skip() {
    if !git_available() {
        eprintln!("git not available, skipping");
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let left: String = (1..=10).map(|i| format!("line {i}\n")).collect();
    let right = left.replacen("line 2", "line two", 1);
    write(dir.path(), "a.txt", &left);
    write(dir.path(), "b.txt", &right);

    let pair = FilePair::both(
        dir.path(),
        dir.path().join("a.txt"),
        dir.path(),
        dir.path().join("b.txt"),
        false,
    );
    let codes = compute_line_codes(&pair, &[]).unwrap();
    assert_eq!(
        codes,
        vec![
            Code::equal((0, 1), (0, 1)),
            Code::replace((1, 2), (1, 2)),
            Code::equal((2, 5), (2, 5)),
            Code::skip((5, 10), (5, 10), None),
        ]
    );
}

#[test]
fn binary_pair_becomes_the_placeholder_replace() {
    if !git_available() {
        eprintln!("git not available, skipping");
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.bin"), b"\x00\x01\x02old").unwrap();
    fs::write(dir.path().join("b.bin"), b"\x00\x01\x02new").unwrap();

    let pair = FilePair::both(
        dir.path(),
        dir.path().join("a.bin"),
        dir.path(),
        dir.path().join("b.bin"),
        false,
    );
    assert_eq!(
        compute_line_codes(&pair, &[]).unwrap(),
        vec![Code::replace((0, 1), (0, 1))]
    );
}

#[test]
fn raw_path_classifies_adds_deletes_and_renames() {
    if !git_available() {
        eprintln!("git not available, skipping");
        return;
    }
    let left = tempfile::tempdir().unwrap();
    let right = tempfile::tempdir().unwrap();
    write(left.path(), "kept.txt", "kept\n");
    write(right.path(), "kept.txt", "kept, with edits\n");
    write(left.path(), "old-name.txt", "travels under a new name\n");
    write(right.path(), "new-name.txt", "travels under a new name\n");
    write(left.path(), "removed.txt", "going away\n");
    write(right.path(), "brand-new.txt", "hello\n");

    let cache = HashCache::new();
    let pairs = compute_file_pairs(
        left.path(),
        right.path(),
        &["--find-renames".to_string()],
        &cache,
    )
    .unwrap();

    let mut summary: Vec<(Option<String>, Option<String>, PairKind)> = pairs
        .iter()
        .map(|p| (p.left_name(), p.right_name(), p.kind))
        .collect();
    summary.sort_by(|x, y| x.0.cmp(&y.0).then_with(|| x.1.cmp(&y.1)));

    assert_eq!(
        summary,
        vec![
            (None, Some("brand-new.txt".to_string()), PairKind::Add),
            (
                Some("kept.txt".to_string()),
                Some("kept.txt".to_string()),
                PairKind::Change
            ),
            (
                Some("old-name.txt".to_string()),
                Some("new-name.txt".to_string()),
                PairKind::Move
            ),
            (Some("removed.txt".to_string()), None, PairKind::Delete),
        ]
    );
}

#[test]
fn added_pair_from_raw_path_uses_the_insert_convention() {
    if !git_available() {
        eprintln!("git not available, skipping");
        return;
    }
    let left = tempfile::tempdir().unwrap();
    let right = tempfile::tempdir().unwrap();
    write(right.path(), "new.txt", "a\nb\nc\n");

    let cache = HashCache::new();
    let pairs = compute_file_pairs(left.path(), right.path(), &[], &cache).unwrap();
    assert_eq!(pairs.len(), 1);
    assert_eq!(pairs[0].kind, PairKind::Add);

    let codes = compute_line_codes(&pairs[0], &[]).unwrap();
    assert_eq!(codes, vec![Code::insert(0, (0, 4))]);
}

#[test]
fn symlinked_files_are_diffed_by_target_content() {
    if !git_available() {
        eprintln!("git not available, skipping");
        return;
    }
    #[cfg(unix)]
    {
        let left = tempfile::tempdir().unwrap();
        let right = tempfile::tempdir().unwrap();
        write(left.path(), "real.txt", "same content\n");
        std::os::unix::fs::symlink(left.path().join("real.txt"), left.path().join("link.txt"))
            .unwrap();
        write(right.path(), "real.txt", "same content\n");
        write(right.path(), "link.txt", "same content\n");

        let cache = HashCache::new();
        let pairs = compute_file_pairs(left.path(), right.path(), &[], &cache).unwrap();
        // The symlink was materialized, so its content matches and no
        // pair is reported for either file.
        assert_eq!(pairs.len(), 0, "unexpected pairs: {pairs:?}");
    }
}
