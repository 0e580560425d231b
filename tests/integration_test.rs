//! End-to-end REPL scenarios, driven by spawning the built binary with piped
//! stdin/stdout against a real temp file -- matching the literal scenarios
//! the storage core is specified against.

use std::io::Write;
use std::process::{Command, Stdio};

fn run_commands(db_path: &std::path::Path, commands: &[&str]) -> Vec<String> {
    let mut child = Command::new(env!("CARGO_BIN_EXE_minidb"))
        .arg(db_path)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to start minidb");

    let mut stdin = child.stdin.take().unwrap();
    let input = commands.join("\n") + "\n";
    stdin.write_all(input.as_bytes()).unwrap();
    drop(stdin);

    let output = child.wait_with_output().expect("minidb did not exit");
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();

    // Each line of output is preceded by the "db > " prompt with no newline;
    // split on it to recover the REPL's actual result lines.
    stdout
        .split("db > ")
        .skip(1)
        .map(|chunk| chunk.trim_end_matches('\n').to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[test]
fn insert_select_and_reopen_persist_rows() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("test.db");

    let results = run_commands(
        &path,
        &[
            "insert 1 user1 person1@example.com",
            "insert 2 user2 person2@example.com",
            "select",
            ".exit",
        ],
    );
    assert_eq!(results[0], "executed.");
    assert_eq!(results[1], "executed.");
    assert_eq!(
        results[2],
        "(1, user1, person1@example.com)\n(2, user2, person2@example.com)\nexecuted."
    );

    let reopened = run_commands(&path, &["select", ".exit"]);
    assert_eq!(
        reopened[0],
        "(1, user1, person1@example.com)\n(2, user2, person2@example.com)\nexecuted."
    );
}

#[test]
fn duplicate_key_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("test.db");

    let results = run_commands(
        &path,
        &["insert 1 a a@b", "insert 1 c c@d", ".exit"],
    );
    assert_eq!(results[0], "executed.");
    assert_eq!(results[1], "error: duplicate key.");
}

#[test]
fn negative_id_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("test.db");

    let results = run_commands(&path, &["insert -1 a a@b", ".exit"]);
    assert_eq!(results[0], "id must be positive.");
}

#[test]
fn oversized_username_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("test.db");

    let long_username = "a".repeat(33);
    let results = run_commands(
        &path,
        &[&format!("insert 1 {long_username} a@b"), ".exit"],
    );
    assert_eq!(results[0], "string is too long.");
}

#[test]
fn fourteenth_insert_splits_the_root_in_ascending_order() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("test.db");

    let mut commands: Vec<String> = (1..=14)
        .map(|id| format!("insert {id} user{id} person{id}@example.com"))
        .collect();
    commands.push(".btree".to_string());
    commands.push(".exit".to_string());
    let command_refs: Vec<&str> = commands.iter().map(String::as_str).collect();

    let results = run_commands(&path, &command_refs);
    let tree = results.last().unwrap();
    assert!(tree.contains("internal (size 1)"));
    assert!(tree.contains("leaf (size 7)"));
    assert!(tree.matches("leaf (size 7)").count() == 2);
}

#[test]
fn out_of_order_fourteenth_insert_splits_into_the_correct_halves() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("test.db");

    let mut commands: Vec<String> = [1, 2, 3, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14]
        .iter()
        .map(|id| format!("insert {id} user{id} person{id}@example.com"))
        .collect();
    commands.push("insert 4 user4 person4@example.com".to_string());
    commands.push(".btree".to_string());
    commands.push(".exit".to_string());
    let command_refs: Vec<&str> = commands.iter().map(String::as_str).collect();

    let results = run_commands(&path, &command_refs);
    let tree = results.last().unwrap();
    assert!(tree.contains("internal (size 1)"));
    assert!(tree.matches("leaf (size 7)").count() == 2);

    // The left leaf keeps 1-7 and the right leaf takes 8-14 regardless of
    // the order rows were inserted in; the split always redistributes by
    // key, not by insertion position.
    let left_start = tree.find("leaf (size 7)").unwrap();
    let right_start = tree.rfind("leaf (size 7)").unwrap();
    let left_block = &tree[left_start..right_start];
    let right_block = &tree[right_start..];
    for key in 1..=7 {
        assert!(left_block.contains(&format!("- {key}\n")), "left leaf missing {key}");
    }
    for key in 8..=14 {
        assert!(right_block.contains(&format!("- {key}\n")), "right leaf missing {key}");
    }
}

#[test]
fn unrecognized_statement_and_command_are_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("test.db");

    let results = run_commands(&path, &["update 1 a a@b", ".bogus", ".exit"]);
    assert_eq!(results[0], "unrecognized keyword at start of 'update 1 a a@b'.");
    assert_eq!(results[1], "unrecognized command '.bogus'.");
}

#[test]
fn file_length_stays_page_aligned_across_open_and_close() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("test.db");

    run_commands(&path, &["insert 1 a a@b", ".exit"]);
    let len = std::fs::metadata(&path).unwrap().len();
    assert_eq!(len % 4096, 0);
}
