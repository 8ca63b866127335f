//! Process execution seam.
//!
//! The cstore binary writes decrypted secret values to its stdout, so every
//! runner implementation must capture the child's output streams in memory.
//! Letting the child inherit the parent's stdout or stderr would hand secret
//! material to whatever log collector is watching the console.

use crate::errors::{Error, Result};
use crate::types::CommandArguments;
use async_trait::async_trait;
#[cfg(test)]
use std::collections::HashMap;
use std::path::Path;
#[cfg(test)]
use std::path::PathBuf;
use std::process::Output;
#[cfg(test)]
use std::sync::{Arc, Mutex};

/// Trait for running external commands with captured output
///
/// This abstraction allows for testing without spawning real processes by
/// providing different implementations for production and test environments.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run `program` with `args`, waiting until the process exits.
    ///
    /// Returns the full captured output: exit status plus the in-memory
    /// stdout and stderr buffers. Neither stream is inherited.
    async fn run(&self, program: &Path, args: &CommandArguments) -> Result<Output>;
}

/// Production runner backed by `std::process::Command`
pub struct SystemRunner;

#[async_trait]
impl CommandRunner for SystemRunner {
    async fn run(&self, program: &Path, args: &CommandArguments) -> Result<Output> {
        // output() pipes stdout and stderr and nulls stdin; the call blocks
        // until the child exits.
        std::process::Command::new(program)
            .args(args.as_slice())
            .output()
            .map_err(|e| Error::spawn(program, e))
    }
}

/// Test runner that replays configured responses and records every
/// invocation so tests can assert the exact command line
#[cfg(test)]
#[derive(Clone)]
pub(crate) struct ScriptedRunner {
    responses: Arc<Mutex<HashMap<String, ScriptedResponse>>>,
    calls: Arc<Mutex<Vec<(PathBuf, Vec<String>)>>>,
}

#[cfg(test)]
#[derive(Clone)]
pub(crate) struct ScriptedResponse {
    stdout: Vec<u8>,
    stderr: Vec<u8>,
    status: std::process::ExitStatus,
}

#[cfg(test)]
impl ScriptedResponse {
    pub fn success(stdout: &str) -> Self {
        Self {
            stdout: stdout.as_bytes().to_vec(),
            stderr: Vec::new(),
            status: exit_status::from_code(0),
        }
    }

    pub fn failure(code: i32, stderr: &str) -> Self {
        Self {
            stdout: Vec::new(),
            stderr: stderr.as_bytes().to_vec(),
            status: exit_status::from_code(code),
        }
    }

    #[cfg(unix)]
    pub fn signaled(signal: i32, stderr: &str) -> Self {
        Self {
            stdout: Vec::new(),
            stderr: stderr.as_bytes().to_vec(),
            status: exit_status::from_signal(signal),
        }
    }
}

#[cfg(test)]
impl ScriptedRunner {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(HashMap::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn respond(&self, program: impl AsRef<Path>, args: &[&str], response: ScriptedResponse) {
        let args: Vec<String> = args.iter().map(ToString::to_string).collect();
        let key = Self::key(program.as_ref(), &args);
        self.responses
            .lock()
            .expect("scripted responses poisoned")
            .insert(key, response);
    }

    pub fn respond_ok(&self, program: impl AsRef<Path>, args: &[&str], stdout: &str) {
        self.respond(program, args, ScriptedResponse::success(stdout));
    }

    pub fn respond_err(&self, program: impl AsRef<Path>, args: &[&str], stderr: &str) {
        self.respond(program, args, ScriptedResponse::failure(1, stderr));
    }

    /// Every invocation seen so far, in order
    pub fn calls(&self) -> Vec<(PathBuf, Vec<String>)> {
        self.calls.lock().expect("scripted calls poisoned").clone()
    }

    fn key(program: &Path, args: &[String]) -> String {
        format!("{} {}", program.display(), args.join(" "))
    }
}

#[cfg(test)]
#[async_trait]
impl CommandRunner for ScriptedRunner {
    async fn run(&self, program: &Path, args: &CommandArguments) -> Result<Output> {
        self.calls
            .lock()
            .expect("scripted calls poisoned")
            .push((program.to_path_buf(), args.as_slice().to_vec()));

        let key = Self::key(program, args.as_slice());
        let responses = self.responses.lock().expect("scripted responses poisoned");
        match responses.get(&key) {
            Some(response) => Ok(Output {
                status: response.status,
                stdout: response.stdout.clone(),
                stderr: response.stderr.clone(),
            }),
            None => Err(Error::spawn(
                program,
                std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("no scripted response for: {key}"),
                ),
            )),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn scripted_runner_replays_success_response() {
        let runner = ScriptedRunner::new();
        runner.respond_ok("bin/cstore", &["pull", "-le", "-t", "dev"], "{}");

        let args: CommandArguments = ["pull", "-le", "-t", "dev"].into_iter().collect();
        let output = runner
            .run(Path::new("bin/cstore"), &args)
            .await
            .expect("scripted run failed");
        assert!(output.status.success());
        assert_eq!(output.stdout, b"{}");
        assert!(output.stderr.is_empty());
    }

    #[tokio::test]
    async fn scripted_runner_replays_failure_response() {
        let runner = ScriptedRunner::new();
        runner.respond_err("bin/cstore", &["pull", "-le", "-t", "dev"], "tag not found");

        let args: CommandArguments = ["pull", "-le", "-t", "dev"].into_iter().collect();
        let output = runner
            .run(Path::new("bin/cstore"), &args)
            .await
            .expect("scripted run failed");
        assert!(!output.status.success());
        assert_eq!(output.status.code(), Some(1));
        assert_eq!(output.stderr, b"tag not found");
    }

    #[tokio::test]
    async fn scripted_runner_records_invocations() {
        let runner = ScriptedRunner::new();
        runner.respond_ok("cstore", &["pull", "-le", "-t", "a"], "null");
        runner.respond_ok("cstore", &["pull", "-le", "-t", "b"], "null");

        for tags in ["a", "b"] {
            let args: CommandArguments = ["pull", "-le", "-t", tags].into_iter().collect();
            runner
                .run(Path::new("cstore"), &args)
                .await
                .expect("scripted run failed");
        }

        let calls = runner.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].1, &["pull", "-le", "-t", "a"]);
        assert_eq!(calls[1].1, &["pull", "-le", "-t", "b"]);
    }

    #[tokio::test]
    async fn scripted_runner_rejects_unexpected_commands() {
        let runner = ScriptedRunner::new();

        let args: CommandArguments = ["pull"].into_iter().collect();
        let err = runner
            .run(Path::new("cstore"), &args)
            .await
            .expect_err("expected missing-response error");
        assert!(matches!(err, Error::Spawn { .. }));
        assert!(err.to_string().contains("no scripted response"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn system_runner_captures_stdout_of_real_process() {
        let args: CommandArguments = ["-c", "printf '{\"A\":1}'"].into_iter().collect();
        let output = SystemRunner
            .run(Path::new("/bin/sh"), &args)
            .await
            .expect("failed to run /bin/sh");
        assert!(output.status.success());
        assert_eq!(output.stdout, b"{\"A\":1}");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn system_runner_captures_stderr_and_exit_code() {
        let args: CommandArguments = ["-c", "echo boom >&2; exit 3"].into_iter().collect();
        let output = SystemRunner
            .run(Path::new("/bin/sh"), &args)
            .await
            .expect("failed to run /bin/sh");
        assert_eq!(output.status.code(), Some(3));
        assert_eq!(output.stderr, b"boom\n");
    }

    #[tokio::test]
    async fn system_runner_reports_missing_binary_as_spawn_error() {
        let args = CommandArguments::new();
        let err = SystemRunner
            .run(Path::new("definitely/not/a/real/binary"), &args)
            .await
            .expect_err("expected spawn failure");
        assert!(matches!(err, Error::Spawn { .. }));
    }
}
