use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};

use snapdigest_core::{BackupConfig, Command, FixedClock};
use snapdigest_engine::{EngineClient, EngineError, EngineOutput, OutputMode};
use snapdigest_ops::{BackupCommand, ForgetPruneCommand, OpsError, RestoreSmokeCommand};
use tempfile::TempDir;

type Responder = Box<dyn Fn(&[&str]) -> EngineOutput>;

/// Engine stand-in that records calls and answers through a closure.
struct StubEngine {
    calls: RefCell<Vec<(Vec<String>, OutputMode)>>,
    respond: Responder,
}

impl StubEngine {
    fn new(respond: impl Fn(&[&str]) -> EngineOutput + 'static) -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            respond: Box::new(respond),
        }
    }

    fn ok() -> Self {
        Self::new(|_| EngineOutput::success(""))
    }

    fn args(&self) -> Vec<Vec<String>> {
        self.calls.borrow().iter().map(|(a, _)| a.clone()).collect()
    }
}

impl EngineClient for StubEngine {
    fn run(&self, args: &[&str], mode: OutputMode) -> Result<EngineOutput, EngineError> {
        self.calls
            .borrow_mut()
            .push((args.iter().map(|a| a.to_string()).collect(), mode));
        Ok((self.respond)(args))
    }
}

fn config(report_dir: &Path) -> BackupConfig {
    BackupConfig::builder()
        .restic_repository("/srv/restic")
        .restic_password_command("pass show restic")
        .source_include_file("/etc/snapdigest/sources.txt")
        .source_paths(vec![PathBuf::from("/srv/notes"), PathBuf::from("/srv/repos")])
        .exclude_common_file("/etc/snapdigest/common.exclude")
        .exclude_set_file("/etc/snapdigest/notes-repos.exclude")
        .report_dir(report_dir)
        .keep_daily(7u32)
        .keep_weekly(4u32)
        .keep_monthly(6u32)
        .build()
        .unwrap()
}

fn clock() -> FixedClock {
    FixedClock::new("2026-02-16T01:02:03+00:00", "20260216-010203")
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_backup_runs_tagged_backup_and_writes_log() {
    let temp = TempDir::new().unwrap();
    let engine = StubEngine::new(|args| match args {
        ["backup", ..] => EngineOutput {
            code: Some(0),
            stdout: b"{\"message_type\":\"summary\"}\n".to_vec(),
            stderr: b"warning: skipped socket\n".to_vec(),
        },
        _ => EngineOutput::success(""),
    });

    let status = BackupCommand::new(config(temp.path()), &engine, clock())
        .run()
        .unwrap();
    assert_eq!(status, 0);

    assert_eq!(
        engine.args(),
        vec![
            strings(&["snapshots"]),
            strings(&[
                "backup",
                "--files-from",
                "/etc/snapdigest/sources.txt",
                "--exclude-file",
                "/etc/snapdigest/common.exclude",
                "--exclude-file",
                "/etc/snapdigest/notes-repos.exclude",
                "--tag",
                "hot",
                "--tag",
                "notes-repos",
                "--json",
            ]),
        ]
    );
    assert_eq!(engine.calls.borrow()[1].1, OutputMode::Capture);

    let log = fs::read_to_string(temp.path().join("backup-20260216-010203.log")).unwrap();
    assert_eq!(
        log,
        "Starting backup at 2026-02-16T01:02:03+00:00\n\
         Repo: /srv/restic\n\
         Sources include file: /etc/snapdigest/sources.txt\n\
         {\"message_type\":\"summary\"}\n\
         warning: skipped socket\n\
         Backup completed at 2026-02-16T01:02:03+00:00\n"
    );
}

#[test]
fn test_backup_initializes_missing_repository() {
    let temp = TempDir::new().unwrap();
    let engine = StubEngine::new(|args| match args {
        ["snapshots"] => EngineOutput::failure(10, "Fatal: repository does not exist"),
        _ => EngineOutput::success(""),
    });

    BackupCommand::new(config(temp.path()), &engine, clock())
        .run()
        .unwrap();

    let calls = engine.args();
    assert_eq!(calls[0], strings(&["snapshots"]));
    assert_eq!(calls[1], strings(&["init"]));
    assert_eq!(calls[2][0], "backup");
}

#[test]
fn test_backup_failure_returns_engine_status() {
    let temp = TempDir::new().unwrap();
    let engine = StubEngine::new(|args| match args {
        ["backup", ..] => EngineOutput::failure(3, "incomplete snapshot\n"),
        _ => EngineOutput::success(""),
    });

    let status = BackupCommand::new(config(temp.path()), &engine, clock())
        .run()
        .unwrap();
    assert_eq!(status, 3);

    let log = fs::read_to_string(temp.path().join("backup-20260216-010203.log")).unwrap();
    assert!(log.ends_with("incomplete snapshot\n"));
    assert!(!log.contains("Backup completed"));
}

#[test]
fn test_backup_init_failure_is_fatal() {
    let temp = TempDir::new().unwrap();
    let engine = StubEngine::new(|_| EngineOutput::failure(1, "Fatal: permission denied"));

    let err = BackupCommand::new(config(temp.path()), &engine, clock())
        .run()
        .unwrap_err();
    assert!(matches!(err, OpsError::Engine(EngineError::Failed { .. })));
    assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 0);
}

#[test]
fn test_forget_prune_applies_policy() {
    let temp = TempDir::new().unwrap();
    let engine = StubEngine::ok();

    let status = ForgetPruneCommand::new(config(temp.path()), &engine, clock())
        .run()
        .unwrap();
    assert_eq!(status, 0);
    assert_eq!(
        engine.args(),
        vec![strings(&[
            "forget",
            "--prune",
            "--keep-daily",
            "7",
            "--keep-weekly",
            "4",
            "--keep-monthly",
            "6",
        ])]
    );
    assert_eq!(engine.calls.borrow()[0].1, OutputMode::Inherit);
}

#[test]
fn test_forget_prune_failure_is_fatal() {
    let temp = TempDir::new().unwrap();
    let engine = StubEngine::new(|_| EngineOutput::failure(1, "Fatal: repository is already locked"));

    let err = ForgetPruneCommand::new(config(temp.path()), &engine, clock())
        .run()
        .unwrap_err();
    match err {
        OpsError::Engine(engine_err) => assert_eq!(engine_err.exit_code(), Some(1)),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_restore_smoke_without_snapshots_returns_one() {
    let scratch = TempDir::new().unwrap();
    let engine = StubEngine::new(|_| EngineOutput::failure(1, ""));

    let status = RestoreSmokeCommand::new(config(scratch.path()), &engine, clock())
        .with_scratch_parent(scratch.path())
        .run()
        .unwrap();

    assert_eq!(status, 1);
    assert_eq!(engine.args(), vec![strings(&["snapshots"])]);
    assert_eq!(fs::read_dir(scratch.path()).unwrap().count(), 0);
}

#[test]
fn test_restore_smoke_restores_and_counts_files() {
    let scratch = TempDir::new().unwrap();
    let engine = StubEngine::new(|args| {
        if let ["restore", "latest", "--target", target, ..] = args {
            let target = Path::new(target);
            fs::create_dir_all(target.join("srv/notes")).unwrap();
            fs::write(target.join("srv/notes/a.md"), "a").unwrap();
            fs::write(target.join("srv/notes/b.md"), "b").unwrap();
        }
        EngineOutput::success("")
    });

    let command = RestoreSmokeCommand::new(config(scratch.path()), &engine, clock())
        .with_scratch_parent(scratch.path());
    assert_eq!(command.run().unwrap(), 0);

    let calls = engine.args();
    assert_eq!(calls[0], strings(&["snapshots"]));
    let restore = &calls[1];
    assert_eq!(&restore[..3], &strings(&["restore", "latest", "--target"])[..]);
    assert!(restore[3].ends_with("restore"));
    assert_eq!(
        &restore[4..],
        &strings(&["--include", "/srv/notes", "--include", "/srv/repos", "--verify"])[..]
    );
    assert_eq!(engine.calls.borrow()[1].1, OutputMode::Inherit);

    // Scratch space is gone once the command returns.
    assert!(!Path::new(&restore[3]).exists());
    assert_eq!(fs::read_dir(scratch.path()).unwrap().count(), 0);
}

#[test]
fn test_restore_smoke_missing_target_returns_one() {
    let scratch = TempDir::new().unwrap();
    let engine = StubEngine::new(|args| {
        if let ["restore", "latest", "--target", target, ..] = args {
            fs::remove_dir_all(target).unwrap();
        }
        EngineOutput::success("")
    });

    let status = RestoreSmokeCommand::new(config(scratch.path()), &engine, clock())
        .with_scratch_parent(scratch.path())
        .run()
        .unwrap();
    assert_eq!(status, 1);
}

#[test]
fn test_restore_failure_cleans_up_scratch() {
    let scratch = TempDir::new().unwrap();
    let engine = StubEngine::new(|args| match args {
        ["snapshots"] => EngineOutput::success(""),
        _ => EngineOutput::failure(1, "Fatal: wrong password"),
    });

    let err = RestoreSmokeCommand::new(config(scratch.path()), &engine, clock())
        .with_scratch_parent(scratch.path())
        .run()
        .unwrap_err();
    assert!(matches!(err, OpsError::Engine(_)));
    assert_eq!(fs::read_dir(scratch.path()).unwrap().count(), 0);
}

#[test]
fn test_command_names() {
    let temp = TempDir::new().unwrap();
    let engine = StubEngine::ok();
    assert_eq!(BackupCommand::new(config(temp.path()), &engine, clock()).name(), "backup");
    assert_eq!(
        ForgetPruneCommand::new(config(temp.path()), &engine, clock()).name(),
        "forget-prune"
    );
    assert_eq!(
        RestoreSmokeCommand::new(config(temp.path()), &engine, clock()).name(),
        "restore-smoke"
    );
}
