//! Process runner behaviour against real child processes.

#![cfg(unix)]

mod common;

use apk_autosign::signer::runner::NO_EXIT_CODE;
use apk_autosign::signer::{CommandRunner, LineSink, ProcessRunner, ToolCommand};
use common::{EXEC_LOCK, write_script};
use std::time::Duration;

#[tokio::test]
async fn output_lines_keep_their_order() {
    let _guard = EXEC_LOCK.lock().await;
    let dir = tempfile::tempdir().unwrap();
    let script = dir.path().join("count");
    write_script(&script, "i=1\nwhile [ $i -le 500 ]; do echo \"line $i\"; i=$((i+1)); done\n");

    let result = ProcessRunner::new()
        .execute(&ToolCommand::new(&script), dir.path(), &LineSink::discard())
        .await;

    let expected: Vec<String> = (1..=500).map(|i| format!("line {i}")).collect();
    assert_eq!(result.captured_output, expected);
    assert_eq!(result.exit_code, 0);
    assert!(result.spawned);
}

#[tokio::test]
async fn exit_code_and_stderr_are_reported() {
    let _guard = EXEC_LOCK.lock().await;
    let dir = tempfile::tempdir().unwrap();
    let script = dir.path().join("fail");
    write_script(&script, "echo out\necho err >&2\nexit 3\n");

    let result = ProcessRunner::new()
        .execute(&ToolCommand::new(&script), dir.path(), &LineSink::discard())
        .await;

    assert_eq!(result.exit_code, 3);
    assert!(!result.success());
    assert_eq!(result.captured_output, ["out"]);
    assert_eq!(result.stderr_lines, ["err"]);
}

#[tokio::test]
async fn arguments_are_passed_without_a_shell() {
    let _guard = EXEC_LOCK.lock().await;
    let dir = tempfile::tempdir().unwrap();
    let script = dir.path().join("args");
    write_script(&script, "for a in \"$@\"; do echo \"[$a]\"; done\n");

    let command = ToolCommand::new(&script)
        .arg("two words")
        .arg("$HOME;rm -rf /")
        .arg("quote'd");
    let result = ProcessRunner::new()
        .execute(&command, dir.path(), &LineSink::discard())
        .await;

    assert_eq!(
        result.captured_output,
        ["[two words]", "[$HOME;rm -rf /]", "[quote'd]"]
    );
}

#[tokio::test]
async fn runs_in_the_given_directory() {
    let _guard = EXEC_LOCK.lock().await;
    let dir = tempfile::tempdir().unwrap();
    let script = dir.path().join("where");
    write_script(&script, "pwd -P\n");

    let result = ProcessRunner::new()
        .execute(&ToolCommand::new(&script), dir.path(), &LineSink::discard())
        .await;

    let expected = dir.path().canonicalize().unwrap();
    assert_eq!(result.captured_output, [expected.to_string_lossy()]);
}

#[tokio::test]
async fn large_output_on_both_streams_does_not_stall() {
    let _guard = EXEC_LOCK.lock().await;
    let dir = tempfile::tempdir().unwrap();
    let script = dir.path().join("noisy");
    write_script(
        &script,
        "i=0\nwhile [ $i -lt 20000 ]; do echo \"stdout $i\"; echo \"stderr $i\" >&2; i=$((i+1)); done\n",
    );

    let result = tokio::time::timeout(
        Duration::from_secs(60),
        ProcessRunner::new().execute(&ToolCommand::new(&script), dir.path(), &LineSink::discard()),
    )
    .await
    .expect("runner stalled on a full pipe");

    assert_eq!(result.captured_output.len(), 20000);
    assert_eq!(result.stderr_lines.len(), 20000);
    assert_eq!(result.captured_output.last().unwrap(), "stdout 19999");
}

#[tokio::test]
async fn lines_are_forwarded_live() {
    let _guard = EXEC_LOCK.lock().await;
    let dir = tempfile::tempdir().unwrap();
    let script = dir.path().join("three");
    write_script(&script, "echo a\necho b\necho c\n");
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();

    let result = ProcessRunner::new()
        .execute(&ToolCommand::new(&script), dir.path(), &LineSink::channel(tx))
        .await;

    let mut live = Vec::new();
    while let Ok(line) = rx.try_recv() {
        live.push(line);
    }
    assert_eq!(live, result.captured_output);
}

#[tokio::test]
async fn missing_program_is_a_spawn_failure() {
    let _guard = EXEC_LOCK.lock().await;
    let dir = tempfile::tempdir().unwrap();

    let result = ProcessRunner::new()
        .execute(
            &ToolCommand::new(dir.path().join("does-not-exist")),
            dir.path(),
            &LineSink::discard(),
        )
        .await;

    assert!(!result.spawned);
    assert_eq!(result.exit_code, NO_EXIT_CODE);
    assert_eq!(result.captured_output.len(), 1);
    assert!(result.captured_output[0].starts_with("Failed to start"));
}

#[tokio::test]
async fn timeout_kills_the_process() {
    let _guard = EXEC_LOCK.lock().await;
    let dir = tempfile::tempdir().unwrap();
    let script = dir.path().join("slow");
    write_script(&script, "echo started\nexec sleep 30\n");

    let started = std::time::Instant::now();
    let result = ProcessRunner::with_timeout(Duration::from_millis(500))
        .execute(&ToolCommand::new(&script), dir.path(), &LineSink::discard())
        .await;

    assert!(started.elapsed() < Duration::from_secs(20));
    assert!(result.spawned);
    assert_eq!(result.exit_code, NO_EXIT_CODE);
    assert_eq!(result.captured_output[0], "started");
    assert!(result.captured_output.last().unwrap().contains("timed out"));
}

#[tokio::test]
async fn invalid_utf8_does_not_cut_output_short() {
    let _guard = EXEC_LOCK.lock().await;
    let dir = tempfile::tempdir().unwrap();
    let script = dir.path().join("latin1");
    write_script(
        &script,
        "printf 'first\\nbad \\377\\376 line\\nthird\\n'\nprintf 'fourth'\n",
    );

    let result = ProcessRunner::new()
        .execute(&ToolCommand::new(&script), dir.path(), &LineSink::discard())
        .await;

    assert_eq!(result.exit_code, 0);
    assert_eq!(
        result.captured_output,
        ["first", "bad \u{FFFD}\u{FFFD} line", "third", "fourth"]
    );
}
