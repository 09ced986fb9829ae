//! # Command Runner
//!
//! Executes CumulusCI (`cci`) commands as child processes and reports the
//! outcome as a single human-readable string. Every failure mode — missing
//! executable, non-zero exit, spawn/IO fault, timeout — terminates in a
//! returned diagnostic string; nothing escapes this boundary as an error.

use anyhow::{Context as AnyhowContext, Result, anyhow};
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// The root executable prefixed onto every subcommand.
pub const CCI_BINARY: &str = "cci";

/// Outcome of a completed child process, before rendering to text.
#[derive(Debug)]
pub enum CommandOutcome {
    Success {
        command: String,
        stdout: String,
    },
    Failure {
        command: String,
        code: i32,
        stdout: String,
        stderr: String,
    },
}

impl CommandOutcome {
    fn from_output(command: String, output: std::process::Output) -> Self {
        // Lossy decode: invalid byte sequences become replacement characters
        // instead of failing the whole command report.
        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();

        if output.status.success() {
            CommandOutcome::Success { command, stdout }
        } else {
            CommandOutcome::Failure {
                command,
                // None when killed by a signal.
                code: output.status.code().unwrap_or(-1),
                stdout,
                stderr,
            }
        }
    }

    /// Render the outcome as the string handed back to the agent.
    /// Empty streams are omitted entirely rather than printed as blank lines.
    pub fn render(&self) -> String {
        match self {
            CommandOutcome::Success { command, stdout } => {
                format!("Command '{command}' completed successfully:\n{stdout}")
            }
            CommandOutcome::Failure {
                command,
                code,
                stdout,
                stderr,
            } => {
                let mut message = format!("Command '{command}' failed with return code {code}");
                if !stderr.is_empty() {
                    message.push_str(&format!("\nError: {stderr}"));
                }
                if !stdout.is_empty() {
                    message.push_str(&format!("\nOutput: {stdout}"));
                }
                message
            }
        }
    }
}

/// Runs one external command to completion per call.
///
/// Holds no shared mutable state; concurrent calls each own their child
/// process handle exclusively and release it before returning.
#[derive(Debug, Clone)]
pub struct CommandRunner {
    binary: String,
    cwd: PathBuf,
    timeout: Option<Duration>,
}

impl CommandRunner {
    pub fn new() -> Self {
        Self {
            binary: CCI_BINARY.to_string(),
            cwd: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            timeout: None,
        }
    }

    /// Override the root executable. Used by tests to point at stub binaries.
    pub fn with_binary(mut self, binary: impl Into<String>) -> Self {
        self.binary = binary.into();
        self
    }

    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = cwd.into();
        self
    }

    /// Enforce a deadline on each command. Off unless configured; on timeout
    /// the child is killed and a timeout-flavored failure string is returned.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Run a CCI subcommand (without the `cci` prefix) and report the result.
    ///
    /// The subcommand is appended to the root executable name and the whole
    /// line is handed to the shell as-is; callers are responsible for any
    /// quoting inside the subcommand text.
    pub async fn run(&self, command: &str) -> String {
        if which::which(&self.binary).is_err() {
            return format!(
                "Error: CumulusCI ({}) is not installed or not in PATH",
                self.binary
            );
        }

        let full_command = format!("{} {}", self.binary, command);
        tracing::debug!(command = %full_command, "running cci command");

        match self.spawn_and_wait(&full_command).await {
            Ok(outcome) => outcome.render(),
            Err(err) => format!("Error running command '{full_command}': {err:#}"),
        }
    }

    async fn spawn_and_wait(&self, full_command: &str) -> Result<CommandOutcome> {
        let mut cmd = if cfg!(target_os = "windows") {
            let mut c = Command::new("cmd");
            c.args(["/C", full_command]);
            c
        } else {
            let mut c = Command::new("sh");
            c.args(["-c", full_command]);
            c
        };

        cmd.current_dir(&self.cwd)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = cmd.spawn().context("failed to spawn command shell")?;

        // wait_with_output drains stdout and stderr concurrently, so a child
        // filling one pipe cannot deadlock against us reading the other.
        let output = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, child.wait_with_output())
                .await
                .map_err(|_| {
                    anyhow!(
                        "command timed out after {} seconds and was terminated",
                        limit.as_secs()
                    )
                })??,
            None => child.wait_with_output().await?,
        };

        Ok(CommandOutcome::from_output(
            full_command.to_string(),
            output,
        ))
    }
}

impl Default for CommandRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_executable_reports_without_spawning() {
        let runner = CommandRunner::new().with_binary("definitely-not-a-real-binary-5f21");
        let result = runner.run("org list").await;

        assert!(result.contains("not installed or not in PATH"));
        assert!(result.starts_with("Error:"));
    }

    #[tokio::test]
    async fn test_success_reports_command_and_trimmed_stdout() {
        let runner = CommandRunner::new().with_binary("echo");
        let result = runner.run("hello").await;

        assert_eq!(result, "Command 'echo hello' completed successfully:\nhello");
    }

    #[tokio::test]
    async fn test_failure_reports_code_and_stderr_without_stale_stdout() {
        let runner = CommandRunner::new().with_binary("sh");
        let result = runner.run("-c 'echo bad arg >&2; exit 2'").await;

        assert!(result.contains("failed with return code 2"));
        assert!(result.contains("Error: bad arg"));
        // stdout was empty, so no Output section may appear
        assert!(!result.contains("Output:"));
    }

    #[tokio::test]
    async fn test_stdout_whitespace_is_trimmed() {
        let runner = CommandRunner::new().with_binary("printf");
        let result = runner.run("'  hello\\n\\n'").await;

        assert!(result.ends_with("completed successfully:\nhello"));
    }

    #[tokio::test]
    async fn test_spawn_fault_is_contained() {
        // A deleted working directory makes the spawn itself fail, which
        // exercises the catch-all path without touching PATH.
        let dir = tempfile::tempdir().expect("tempdir");
        let gone = dir.path().to_path_buf();
        drop(dir);

        let runner = CommandRunner::new().with_binary("echo").with_cwd(gone);
        let result = runner.run("hello").await;

        assert!(result.starts_with("Error running command 'echo hello':"));
    }

    #[tokio::test]
    async fn test_concurrent_runs_do_not_cross_talk() {
        let ok = CommandRunner::new().with_binary("echo");
        let fail = CommandRunner::new().with_binary("sh");

        let (a, b) = tokio::join!(ok.run("alpha"), fail.run("-c 'echo beta >&2; exit 3'"));

        assert!(a.contains("completed successfully"));
        assert!(a.contains("alpha"));
        assert!(!a.contains("beta"));

        assert!(b.contains("failed with return code 3"));
        assert!(b.contains("beta"));
        assert!(!b.contains("alpha"));
    }

    #[tokio::test]
    async fn test_timeout_kills_child_and_reports() {
        let runner = CommandRunner::new()
            .with_binary("sleep")
            .with_timeout(Some(Duration::from_millis(100)));
        let result = runner.run("5").await;

        assert!(result.starts_with("Error running command 'sleep 5':"));
        assert!(result.contains("timed out"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_deploy_scenario_with_stub_cci() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().expect("tempdir");
        let stub = dir.path().join("cci");
        std::fs::write(&stub, "#!/bin/sh\necho 'Deployed successfully'\n").expect("write stub");
        std::fs::set_permissions(&stub, std::fs::Permissions::from_mode(0o755))
            .expect("chmod stub");

        let runner = CommandRunner::new().with_binary(stub.to_string_lossy().to_string());
        let result = runner.run("task run deploy --org dev").await;

        assert_eq!(
            result,
            format!(
                "Command '{} task run deploy --org dev' completed successfully:\nDeployed successfully",
                stub.display()
            )
        );
    }

    #[test]
    fn test_render_failure_includes_both_streams_when_present() {
        let outcome = CommandOutcome::Failure {
            command: "cci task run deploy".to_string(),
            code: 1,
            stdout: "partial output".to_string(),
            stderr: "boom".to_string(),
        };

        assert_eq!(
            outcome.render(),
            "Command 'cci task run deploy' failed with return code 1\nError: boom\nOutput: partial output"
        );
    }
}
