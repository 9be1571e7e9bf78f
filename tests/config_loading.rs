mod common;

use std::time::Duration;

use procwatch::collection::ProcessCollection;
use procwatch::config::{default_config_path, load_and_validate};
use procwatch::errors::ProcwatchError;
use procwatch::proc::ProcessHandle;
use procwatch::types::ProcessState;
use procwatch_test_utils::builders::{ConfigFileBuilder, ProcessEntryBuilder};

use common::{init_tracing, with_timeout};

fn write_config(dir: &tempfile::TempDir, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join("Procwatch.toml");
    std::fs::write(&path, contents).unwrap();
    path
}

#[tokio::test]
async fn config_driven_collection_runs_end_to_end() {
    init_tracing();

    let dir = tempfile::tempdir().unwrap();
    let path = write_config(
        &dir,
        r#"
        [config]
        poll_interval_ms = 10

        [process.greeter]
        cmd = "echo hello-from-config"
        print_stdout = false
        keep_stdout = true

        [process.quoted]
        argv = ["echo", "a b"]
        print_stdout = false
        keep_stdout = true
        "#,
    );

    let cfg = load_and_validate(&path).unwrap();
    let mut collection = ProcessCollection::new();
    for (spec, opts) in cfg.supervised().unwrap() {
        collection.push(ProcessHandle::new(spec, opts).unwrap());
    }
    assert_eq!(collection.len(), 2);

    let outcomes = collection.start_all().await;
    assert!(outcomes.iter().all(|o| o.is_ok()));
    with_timeout(collection.block_all(Some(Duration::from_millis(5))))
        .await
        .unwrap();

    // BTreeMap order: "greeter" before "quoted".
    let greeter = collection.get(0).unwrap();
    assert_eq!(greeter.id(), "greeter");
    assert_eq!(greeter.kept_stdout(), vec!["hello-from-config"]);
    assert_eq!(greeter.exit_code().await, Some(0));

    let quoted = collection.get(1).unwrap();
    assert_eq!(quoted.id(), "quoted");
    assert_eq!(quoted.kept_stdout(), vec!["a b"]);
    assert_eq!(quoted.state().await, ProcessState::Exited);
}

#[tokio::test]
async fn options_resolve_defaults_and_overrides() {
    init_tracing();

    let dir = tempfile::tempdir().unwrap();
    let path = write_config(
        &dir,
        r#"
        [config]
        poll_interval_ms = 200
        wrap_columns = 120

        [process.fast]
        cmd = "true"
        poll_interval_ms = 15

        [process.slow]
        cmd = "true"
        "#,
    );

    let cfg = load_and_validate(&path).unwrap();
    let supervised = cfg.supervised().unwrap();

    let (_, fast_opts) = &supervised[0];
    assert_eq!(fast_opts.id, "fast");
    assert_eq!(fast_opts.poll_interval, Duration::from_millis(15));
    assert_eq!(fast_opts.wrap_columns, 120);

    let (_, slow_opts) = &supervised[1];
    assert_eq!(slow_opts.poll_interval, Duration::from_millis(200));
}

#[test]
fn missing_file_is_an_io_error() {
    let err = load_and_validate("/definitely/not/a/real/Procwatch.toml").unwrap_err();
    assert!(matches!(err, ProcwatchError::IoError(_)));
}

#[test]
fn malformed_toml_is_a_toml_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(&dir, "[process.broken\ncmd = ");
    let err = load_and_validate(&path).unwrap_err();
    assert!(matches!(err, ProcwatchError::TomlError(_)));
}

#[test]
fn empty_process_table_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(&dir, "[config]\npoll_interval_ms = 10\n");
    let err = load_and_validate(&path).unwrap_err();
    assert!(matches!(err, ProcwatchError::ConfigError(_)));
}

#[test]
fn builders_produce_a_valid_config() {
    let cfg = ConfigFileBuilder::new()
        .with_poll_interval_ms(25)
        .with_process(
            "pinger",
            ProcessEntryBuilder::shell("ping -c 1 localhost")
                .keep_stdout(true)
                .build(),
        )
        .with_process(
            "lister",
            ProcessEntryBuilder::argv(["ls", "-la"]).cwd("/tmp").build(),
        )
        .build();

    assert_eq!(cfg.config.poll_interval_ms, 25);
    assert_eq!(cfg.process.len(), 2);

    let supervised = cfg.supervised().unwrap();
    assert_eq!(supervised.len(), 2);
    assert_eq!(supervised[0].1.id, "lister");
    assert_eq!(
        supervised[0].1.poll_interval,
        Duration::from_millis(25)
    );
}

#[test]
fn default_config_path_is_procwatch_toml() {
    assert_eq!(
        default_config_path(),
        std::path::PathBuf::from("Procwatch.toml")
    );
}
