//! Pulling tagged configuration from the cstore binary.

use crate::errors::{Error, Result};
use crate::runner::{CommandRunner, SystemRunner};
use crate::types::{CommandArguments, TagFilter};
use serde_json::Value;
use std::collections::HashMap;
use std::path::PathBuf;

/// Per-call switches appended after the fixed `pull -le -t <tags>` prefix
#[derive(Debug, Clone, Default)]
pub struct PullOptions {
    /// Pull a specific stored version (`-v <version>`)
    pub version: Option<String>,
    /// Have cstore inject vault secrets into the pulled configuration (`-i`)
    pub inject_secrets: bool,
    /// Positional path arguments restricting which catalog entries are pulled
    pub paths: Vec<String>,
}

/// Client for the cstore CLI's `pull` operation.
///
/// One call spawns one child process and waits for it to exit. The child's
/// stdout and stderr are captured in memory, never inherited, because the
/// output carries decrypted secret values. The puller holds no mutable
/// state, so concurrent pulls are independent.
pub struct SecretPuller {
    executable: PathBuf,
    runner: Box<dyn CommandRunner>,
}

impl SecretPuller {
    /// Create a puller that runs the cstore binary at `executable`.
    ///
    /// The path may be relative or absolute; it is handed to the OS
    /// unchanged.
    #[must_use]
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self::with_runner(executable, Box::new(SystemRunner))
    }

    /// Create a puller with a custom command runner
    #[must_use]
    pub fn with_runner(executable: impl Into<PathBuf>, runner: Box<dyn CommandRunner>) -> Self {
        Self {
            executable: executable.into(),
            runner,
        }
    }

    /// Pull the configuration entries matching `tags` and decode cstore's
    /// stdout as JSON.
    ///
    /// # Errors
    /// * `Error::CommandFailed` - cstore exited non-zero; the error's
    ///   display text is the captured stderr, verbatim
    /// * `Error::MalformedOutput` - cstore exited cleanly but its stdout
    ///   was not valid JSON
    /// * `Error::Spawn` - the binary could not be started
    pub async fn pull(&self, tags: &TagFilter) -> Result<Value> {
        self.pull_with(tags, &PullOptions::default()).await
    }

    /// Pull with additional options appended to the fixed invocation
    pub async fn pull_with(&self, tags: &TagFilter, options: &PullOptions) -> Result<Value> {
        let args = build_args(tags, options);

        tracing::debug!(
            executable = %self.executable.display(),
            tags = %tags,
            args = args.len(),
            "pulling configuration from cstore"
        );

        let output = self.runner.run(&self.executable, &args).await?;

        if !output.status.success() {
            // Surface the tool's own diagnostic; the exit code itself is
            // not meaningful beyond zero vs non-zero.
            let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
            tracing::warn!(
                executable = %self.executable.display(),
                exit_code = ?output.status.code(),
                stderr_bytes = output.stderr.len(),
                "cstore pull failed"
            );
            return Err(Error::command_failed(stderr, output.status.code()));
        }

        tracing::debug!(stdout_bytes = output.stdout.len(), "cstore pull succeeded");

        let stdout = String::from_utf8_lossy(&output.stdout);
        serde_json::from_str(&stdout).map_err(|e| Error::malformed_output(excerpt(&stdout), e))
    }

    /// Pull entries stored in env format and return them as a variable map.
    ///
    /// cstore emits env-format files as a flat JSON object of strings; any
    /// other shape is reported as malformed output.
    pub async fn pull_env(&self, tags: &TagFilter) -> Result<HashMap<String, String>> {
        let value = self.pull(tags).await?;
        serde_json::from_value(value).map_err(|e| {
            Error::malformed_output("expected a flat JSON object of environment variables", e)
        })
    }
}

/// Assemble the argument vector: the fixed `pull -le -t <tags>` prefix,
/// then option flags, then positional paths.
///
/// The tag filter travels as a single argv element, so the child receives
/// it verbatim with no shell quoting or expansion in between.
fn build_args(tags: &TagFilter, options: &PullOptions) -> CommandArguments {
    let mut args = CommandArguments::new();
    args.push("pull");
    args.push("-le");
    args.push("-t");
    args.push(tags.as_str());

    if options.inject_secrets {
        args.push("-i");
    }
    if let Some(version) = &options.version {
        args.push("-v");
        args.push(version);
    }
    args.extend(options.paths.iter().cloned());

    args
}

/// Bounded, char-safe sample of the offending text for error reporting
fn excerpt(text: &str) -> String {
    const MAX_BYTES: usize = 120;

    if text.trim().is_empty() {
        return "stdout was empty".to_string();
    }
    if text.len() <= MAX_BYTES {
        return text.to_string();
    }
    let mut end = MAX_BYTES;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &text[..end])
}
