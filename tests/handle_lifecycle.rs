mod common;

use std::time::Duration;

use procwatch::errors::ProcwatchError;
use procwatch::proc::{ProcessHandle, ProcessSpec};
use procwatch::types::ProcessState;

use common::{init_tracing, quiet_options, with_timeout};

#[tokio::test]
async fn scenario_echo_hello_exits_zero_with_kept_output() {
    init_tracing();

    let spec = ProcessSpec::shell("echo hello").build().unwrap();
    let handle = ProcessHandle::new(spec, quiet_options("hello")).unwrap();

    handle.start().await.unwrap();
    with_timeout(handle.block(Some(Duration::from_millis(5))))
        .await
        .unwrap();

    assert_eq!(handle.state().await, ProcessState::Exited);
    assert_eq!(handle.exit_code().await, Some(0));
    assert_eq!(handle.kept_stdout(), vec!["hello"]);
    assert!(handle.kept_stderr().is_empty());
    assert!(handle.exit_notified());
}

#[tokio::test]
async fn scenario_nonexistent_executable_fails_synchronously() {
    init_tracing();

    let spec = ProcessSpec::argv(["definitely-not-a-real-binary-5b7e1"])
        .build()
        .unwrap();
    let handle = ProcessHandle::new(spec, quiet_options("ghost")).unwrap();

    let err = handle.start().await.unwrap_err();
    assert!(matches!(err, ProcwatchError::SpawnError { .. }));

    // No Running handle was created; the failure is a spawn error, not a
    // short-lived process.
    assert_eq!(handle.state().await, ProcessState::Created);
    assert!(!handle.is_running().await.unwrap());
    assert!(!handle.exit_notified());
}

#[tokio::test]
async fn immediate_nonzero_exit_is_a_normal_transition_not_an_error() {
    init_tracing();

    let spec = ProcessSpec::shell("exit 42").build().unwrap();
    let handle = ProcessHandle::new(spec, quiet_options("failing")).unwrap();

    handle.start().await.unwrap();
    with_timeout(handle.block(Some(Duration::from_millis(5))))
        .await
        .unwrap();

    assert_eq!(handle.state().await, ProcessState::Exited);
    assert_eq!(handle.exit_code().await, Some(42));
}

#[tokio::test]
async fn kept_stdout_preserves_line_order() {
    init_tracing();

    let spec = ProcessSpec::shell("for i in 1 2 3 4 5; do echo line$i; done")
        .build()
        .unwrap();
    let handle = ProcessHandle::new(spec, quiet_options("counter")).unwrap();

    handle.start().await.unwrap();
    with_timeout(handle.block(Some(Duration::from_millis(5))))
        .await
        .unwrap();

    assert_eq!(
        handle.kept_stdout(),
        vec!["line1", "line2", "line3", "line4", "line5"]
    );
}

#[tokio::test]
async fn stdout_and_stderr_are_kept_separately() {
    init_tracing();

    let spec = ProcessSpec::shell("echo out; echo err 1>&2")
        .build()
        .unwrap();
    let handle = ProcessHandle::new(spec, quiet_options("two-streams")).unwrap();

    handle.start().await.unwrap();
    with_timeout(handle.block(Some(Duration::from_millis(5))))
        .await
        .unwrap();

    assert_eq!(handle.kept_stdout(), vec!["out"]);
    assert_eq!(handle.kept_stderr(), vec!["err"]);
}

// Boundary case from the drain design: a final line without a trailing
// newline is delivered by the EOF flush rather than silently dropped.
#[tokio::test]
async fn partial_trailing_line_is_flushed_on_exit() {
    init_tracing();

    let spec = ProcessSpec::shell(r#"printf 'complete\nincomplete'"#)
        .build()
        .unwrap();
    let handle = ProcessHandle::new(spec, quiet_options("partial")).unwrap();

    handle.start().await.unwrap();
    with_timeout(handle.block(Some(Duration::from_millis(5))))
        .await
        .unwrap();

    assert_eq!(handle.kept_stdout(), vec!["complete", "incomplete"]);
}

#[tokio::test]
async fn exit_event_carries_id_and_exit_code() {
    init_tracing();

    let spec = ProcessSpec::shell("exit 7").build().unwrap();
    let handle = ProcessHandle::new(spec, quiet_options("coder")).unwrap();

    let seen = std::sync::Arc::new(std::sync::Mutex::new(None));
    {
        let seen = seen.clone();
        handle.on_exit(move |event| {
            *seen.lock().unwrap() = Some(event.clone());
        });
    }

    handle.start().await.unwrap();
    with_timeout(handle.block(Some(Duration::from_millis(5))))
        .await
        .unwrap();

    let event = seen.lock().unwrap().clone().expect("exit event delivered");
    assert_eq!(event.id, "coder");
    assert_eq!(event.exit_code, 7);
}

#[tokio::test]
async fn argv_form_passes_whitespace_arguments_verbatim() {
    init_tracing();

    let spec = ProcessSpec::argv(["echo", "one two", "three"])
        .build()
        .unwrap();
    let handle = ProcessHandle::new(spec, quiet_options("argv")).unwrap();

    handle.start().await.unwrap();
    with_timeout(handle.block(Some(Duration::from_millis(5))))
        .await
        .unwrap();

    assert_eq!(handle.kept_stdout(), vec!["one two three"]);
}

#[tokio::test]
async fn environment_overrides_reach_the_child() {
    init_tracing();

    let spec = ProcessSpec::shell("echo $PROCWATCH_TEST_VALUE")
        .env("PROCWATCH_TEST_VALUE", "marker-1234")
        .build()
        .unwrap();
    let handle = ProcessHandle::new(spec, quiet_options("env")).unwrap();

    handle.start().await.unwrap();
    with_timeout(handle.block(Some(Duration::from_millis(5))))
        .await
        .unwrap();

    assert_eq!(handle.kept_stdout(), vec!["marker-1234"]);
}

#[tokio::test]
async fn working_directory_is_honoured() {
    init_tracing();

    let dir = tempfile::tempdir().unwrap();
    let canonical = dir.path().canonicalize().unwrap();

    let spec = ProcessSpec::shell("pwd")
        .working_dir(dir.path())
        .build()
        .unwrap();
    let handle = ProcessHandle::new(spec, quiet_options("pwd")).unwrap();

    handle.start().await.unwrap();
    with_timeout(handle.block(Some(Duration::from_millis(5))))
        .await
        .unwrap();

    assert_eq!(
        handle.kept_stdout(),
        vec![canonical.display().to_string()]
    );
}
