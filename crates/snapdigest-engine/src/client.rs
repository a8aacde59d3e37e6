//! The engine capability surface.

use std::borrow::Cow;

use tracing::info;

use crate::error::EngineError;
use crate::snapshot::{Snapshot, parse_snapshots};

/// How the engine's output streams are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Collect stdout and stderr into the returned [`EngineOutput`].
    Capture,
    /// Stream stdout and stderr straight to the terminal.
    Inherit,
}

/// Result of one engine invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineOutput {
    /// Exit code, `None` if the process was killed by a signal.
    pub code: Option<i32>,
    /// Raw stdout bytes (empty for [`OutputMode::Inherit`]).
    pub stdout: Vec<u8>,
    /// Raw stderr bytes (empty for [`OutputMode::Inherit`]).
    pub stderr: Vec<u8>,
}

impl EngineOutput {
    /// Output of a successful invocation with the given stdout.
    pub fn success(stdout: impl Into<Vec<u8>>) -> Self {
        Self {
            code: Some(0),
            stdout: stdout.into(),
            stderr: Vec::new(),
        }
    }

    /// Output of a failed invocation.
    pub fn failure(code: i32, stderr: impl Into<Vec<u8>>) -> Self {
        Self {
            code: Some(code),
            stdout: Vec::new(),
            stderr: stderr.into(),
        }
    }

    /// Whether the engine exited with status 0.
    pub fn is_success(&self) -> bool {
        self.code == Some(0)
    }

    /// Stdout decoded as UTF-8, invalid sequences replaced.
    pub fn stdout_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.stdout)
    }

    /// Stderr decoded as UTF-8, invalid sequences replaced.
    pub fn stderr_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.stderr)
    }
}

/// Operations the backup engine supports.
///
/// Only [`run`](EngineClient::run) must be implemented; everything else is
/// expressed in terms of it. All calls block until the engine exits.
pub trait EngineClient {
    /// Run an engine subcommand, returning its output whatever the exit status.
    fn run(&self, args: &[&str], mode: OutputMode) -> Result<EngineOutput, EngineError>;

    /// Human-readable form of a command line, used in errors and logs.
    fn describe(&self, args: &[&str]) -> String {
        std::iter::once("restic")
            .chain(args.iter().copied())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Run a subcommand that must succeed.
    fn run_checked(&self, args: &[&str], mode: OutputMode) -> Result<EngineOutput, EngineError> {
        let output = self.run(args, mode)?;
        if output.is_success() {
            return Ok(output);
        }
        Err(EngineError::Failed {
            command: self.describe(args),
            code: output.code,
            stderr: output.stderr_text().into_owned(),
        })
    }

    /// List snapshots in the engine's order (trusted as oldest first).
    fn list_snapshots(&self) -> Result<Vec<Snapshot>, EngineError> {
        let output = self.run_checked(&["snapshots", "--json"], OutputMode::Capture)?;
        parse_snapshots(&output.stdout)
    }

    /// Raw diff output between two snapshots.
    fn diff(&self, previous: &str, current: &str) -> Result<Vec<u8>, EngineError> {
        let output = self.run_checked(&["diff", previous, current], OutputMode::Capture)?;
        Ok(output.stdout)
    }

    /// Probe whether the repository is readable. Non-zero exit means `false`.
    fn snapshots_exist(&self) -> Result<bool, EngineError> {
        Ok(self.run(&["snapshots"], OutputMode::Capture)?.is_success())
    }

    /// Initialise the repository unless it already exists.
    fn ensure_initialized(&self) -> Result<(), EngineError> {
        if self.snapshots_exist()? {
            return Ok(());
        }
        info!("repository not readable, initializing");
        self.run_checked(&["init"], OutputMode::Inherit)?;
        Ok(())
    }
}

impl<T: EngineClient + ?Sized> EngineClient for &T {
    fn run(&self, args: &[&str], mode: OutputMode) -> Result<EngineOutput, EngineError> {
        (**self).run(args, mode)
    }

    fn describe(&self, args: &[&str]) -> String {
        (**self).describe(args)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;

    /// Replays canned outputs and records every call.
    struct Scripted {
        calls: RefCell<Vec<Vec<String>>>,
        respond: fn(&[&str]) -> EngineOutput,
    }

    impl Scripted {
        fn new(respond: fn(&[&str]) -> EngineOutput) -> Self {
            Self {
                calls: RefCell::new(Vec::new()),
                respond,
            }
        }

        fn calls(&self) -> Vec<Vec<String>> {
            self.calls.borrow().clone()
        }
    }

    impl EngineClient for Scripted {
        fn run(&self, args: &[&str], _mode: OutputMode) -> Result<EngineOutput, EngineError> {
            self.calls
                .borrow_mut()
                .push(args.iter().map(|a| a.to_string()).collect());
            Ok((self.respond)(args))
        }
    }

    #[test]
    fn test_ensure_initialized_when_repo_exists() {
        let engine = Scripted::new(|_| EngineOutput::success(""));
        engine.ensure_initialized().unwrap();
        assert_eq!(engine.calls(), vec![vec!["snapshots"]]);
    }

    #[test]
    fn test_ensure_initialized_runs_init_when_missing() {
        let engine = Scripted::new(|args| match args {
            ["snapshots"] => EngineOutput::failure(1, "Fatal: repository does not exist"),
            _ => EngineOutput::success(""),
        });
        engine.ensure_initialized().unwrap();
        assert_eq!(engine.calls(), vec![vec!["snapshots"], vec!["init"]]);
    }

    #[test]
    fn test_ensure_initialized_propagates_init_failure() {
        let engine = Scripted::new(|_| EngineOutput::failure(1, "nope"));
        let err = engine.ensure_initialized().unwrap_err();
        assert!(matches!(err, EngineError::Failed { .. }));
    }

    #[test]
    fn test_list_snapshots_parses_payload() {
        let engine = Scripted::new(|_| EngineOutput::success(r#"[{"id":"a"},{"id":"b"}]"#));
        let snapshots = engine.list_snapshots().unwrap();
        let ids: Vec<&str> = snapshots.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, ["a", "b"]);
        assert_eq!(engine.calls(), vec![vec!["snapshots", "--json"]]);
    }

    #[test]
    fn test_diff_failure_is_fatal() {
        let engine = Scripted::new(|_| EngineOutput::failure(3, "Fatal: no matching ID"));
        let err = engine.diff("a", "b").unwrap_err();
        assert_eq!(err.exit_code(), Some(3));
        assert!(err.to_string().contains("restic diff a b"));
    }

    #[test]
    fn test_diff_returns_raw_bytes() {
        let engine = Scripted::new(|_| EngineOutput::success(b"+ /x\xff\n".to_vec()));
        assert_eq!(engine.diff("a", "b").unwrap(), b"+ /x\xff\n".to_vec());
    }

    #[test]
    fn test_snapshots_exist_tolerates_failure() {
        let engine = Scripted::new(|_| EngineOutput::failure(10, ""));
        assert!(!engine.snapshots_exist().unwrap());
    }
}
