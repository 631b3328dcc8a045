//! Local tool executor with policy enforcement
//!
//! Every action is checked by the [`PolicyEngine`] before it touches the
//! system. Denials and execution failures come back as a failed
//! [`ToolResult`]; nothing here returns an error.

use super::ToolResult;
use crate::policy::PolicyEngine;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{info, warn};

/// Wall-clock limit for shell commands when the caller has no preference
pub const DEFAULT_SHELL_TIMEOUT: Duration = Duration::from_secs(60);

/// Executes shell and file actions inside the workspace
#[derive(Debug, Clone)]
pub struct ToolExecutor {
    workspace_root: PathBuf,
    policy: PolicyEngine,
}

impl ToolExecutor {
    pub fn new(workspace_root: impl Into<PathBuf>, policy: PolicyEngine) -> Self {
        Self {
            workspace_root: workspace_root.into(),
            policy,
        }
    }

    /// Executor with the default policy for `workspace_root`
    pub fn for_workspace(workspace_root: impl Into<PathBuf>) -> Self {
        let workspace_root = workspace_root.into();
        let policy = PolicyEngine::new(workspace_root.clone());
        Self::new(workspace_root, policy)
    }

    /// Run an allowlisted shell command in the workspace
    ///
    /// Output is stdout followed by stderr, trimmed. When `timeout` elapses
    /// the shell and everything it started are killed.
    pub async fn run_shell(&self, command: &str, timeout: Duration) -> ToolResult {
        let decision = self.policy.authorize_shell(command);
        if !decision.allowed {
            return ToolResult::from(decision);
        }

        info!(
            command = command,
            workspace_root = %self.workspace_root.display(),
            timeout_ms = timeout.as_millis() as u64,
            "Running shell command"
        );

        let mut cmd = Command::new("sh");
        cmd.arg("-c")
            .arg(command)
            .current_dir(&self.workspace_root)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        // Own process group, so a timeout can take down background children
        #[cfg(unix)]
        cmd.process_group(0);

        let child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) => {
                warn!(command = command, error = %e, "Failed to spawn shell command");
                return ToolResult::failure(format!("failed to spawn command: {}", e));
            }
        };
        let pid = child.id();

        let output = match tokio::time::timeout(timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                warn!(command = command, error = %e, "Failed to collect command output");
                return ToolResult::failure(format!("failed to run command: {}", e));
            }
            Err(_) => {
                if let Some(pid) = pid {
                    kill_process_group(pid).await;
                }
                warn!(
                    command = command,
                    timeout_ms = timeout.as_millis() as u64,
                    "Shell command timed out, killed"
                );
                return ToolResult::failure(format!("command timed out after {:?}", timeout));
            }
        };

        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));
        let text = text.trim().to_string();

        if output.status.success() {
            info!(command = command, "Shell command succeeded");
            return ToolResult::success(text);
        }

        warn!(
            command = command,
            exit_code = ?output.status.code(),
            "Shell command failed"
        );
        if text.is_empty() {
            let status = output
                .status
                .code()
                .map(|code| code.to_string())
                .unwrap_or_else(|| "signal".to_string());
            return ToolResult::failure(format!("command exited with status {}", status));
        }
        ToolResult::failure(text)
    }

    /// Write `content` to a workspace file, creating parent directories
    pub async fn write_file(&self, relative_path: &str, content: &str) -> ToolResult {
        let file_path = self.workspace_root.join(relative_path);
        let decision = self.policy.authorize_path(&file_path);
        if !decision.allowed {
            return ToolResult::from(decision);
        }

        if let Some(parent) = file_path.parent() {
            if let Err(e) = tokio::fs::create_dir_all(parent).await {
                warn!(path = relative_path, error = %e, "Failed to create parent directories");
                return ToolResult::failure(format!("failed to write {}: {}", relative_path, e));
            }
        }

        match tokio::fs::write(&file_path, content).await {
            Ok(()) => {
                info!(path = relative_path, bytes = content.len(), "Wrote file");
                ToolResult::success(format!("wrote {}", relative_path))
            }
            Err(e) => {
                warn!(path = relative_path, error = %e, "Failed to write file");
                ToolResult::failure(format!("failed to write {}: {}", relative_path, e))
            }
        }
    }

    /// Read a workspace file as text
    pub async fn read_file(&self, relative_path: &str) -> ToolResult {
        let file_path = self.workspace_root.join(relative_path);
        let decision = self.policy.authorize_path(&file_path);
        if !decision.allowed {
            return ToolResult::from(decision);
        }

        match tokio::fs::read_to_string(&file_path).await {
            Ok(content) => {
                info!(path = relative_path, bytes = content.len(), "Read file");
                ToolResult::success(content)
            }
            Err(e)
                if matches!(
                    e.kind(),
                    ErrorKind::NotFound | ErrorKind::NotADirectory
                ) =>
            {
                ToolResult::failure("file does not exist")
            }
            Err(e) => {
                warn!(path = relative_path, error = %e, "Failed to read file");
                ToolResult::failure(format!("failed to read {}: {}", relative_path, e))
            }
        }
    }
}

/// SIGKILL every process in the group led by `pgid`
#[cfg(unix)]
async fn kill_process_group(pgid: u32) {
    let result = Command::new("kill")
        .arg("-KILL")
        .arg("--")
        .arg(format!("-{}", pgid))
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await;
    if let Err(e) = result {
        warn!(pgid, error = %e, "Failed to kill process group");
    }
}

#[cfg(not(unix))]
async fn kill_process_group(_pgid: u32) {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use tempfile::tempdir;

    fn executor_with(dir: &Path, commands: &[&str]) -> ToolExecutor {
        let policy = PolicyEngine::with_allowed_commands(dir, commands.iter().copied());
        ToolExecutor::new(dir, policy)
    }

    #[tokio::test]
    async fn run_shell_echo() {
        let dir = tempdir().unwrap();
        let executor = ToolExecutor::for_workspace(dir.path());

        let result = executor
            .run_shell("echo 'Hello, World!'", DEFAULT_SHELL_TIMEOUT)
            .await;

        assert_eq!(result, ToolResult::success("Hello, World!"));
    }

    #[tokio::test]
    async fn run_shell_uses_workspace_as_cwd() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("marker.txt"), "found\n").unwrap();
        let executor = ToolExecutor::for_workspace(dir.path());

        let result = executor.run_shell("cat marker.txt", DEFAULT_SHELL_TIMEOUT).await;

        assert!(result.ok);
        assert_eq!(result.output, "found");
    }

    #[tokio::test]
    async fn run_shell_denied_command_is_not_executed() {
        let dir = tempdir().unwrap();
        let marker = dir.path().join("keep.txt");
        std::fs::write(&marker, "still here").unwrap();
        let executor = ToolExecutor::for_workspace(dir.path());

        let result = executor.run_shell("rm keep.txt", DEFAULT_SHELL_TIMEOUT).await;

        assert_eq!(result, ToolResult::failure("command 'rm' is not allowlisted"));
        assert!(marker.exists());
    }

    #[tokio::test]
    async fn run_shell_combines_stdout_then_stderr() {
        let dir = tempdir().unwrap();
        let executor = ToolExecutor::for_workspace(dir.path());

        let result = executor
            .run_shell("echo out; echo err >&2", DEFAULT_SHELL_TIMEOUT)
            .await;

        assert!(result.ok);
        assert_eq!(result.output, "out\nerr");
    }

    #[tokio::test]
    async fn run_shell_nonzero_exit_fails() {
        let dir = tempdir().unwrap();
        let executor = ToolExecutor::for_workspace(dir.path());

        let result = executor.run_shell("cat missing.txt", DEFAULT_SHELL_TIMEOUT).await;

        assert!(!result.ok);
        assert!(result.output.contains("missing.txt"));
    }

    #[tokio::test]
    async fn run_shell_silent_failure_still_explains() {
        let dir = tempdir().unwrap();
        let executor = executor_with(dir.path(), &["false"]);

        let result = executor.run_shell("false", DEFAULT_SHELL_TIMEOUT).await;

        assert_eq!(result, ToolResult::failure("command exited with status 1"));
    }

    #[tokio::test]
    async fn run_shell_timeout_is_a_failed_result() {
        let dir = tempdir().unwrap();
        let executor = executor_with(dir.path(), &["sleep"]);

        let result = executor
            .run_shell("sleep 10", Duration::from_millis(200))
            .await;

        assert!(!result.ok);
        assert!(result.output.contains("timed out"));
    }

    #[tokio::test]
    async fn write_then_read_round_trip() {
        let dir = tempdir().unwrap();
        let executor = ToolExecutor::for_workspace(dir.path());
        let content = "line one\nline two\n  trailing spaces  \n";

        let written = executor.write_file("notes/today.md", content).await;
        assert_eq!(written, ToolResult::success("wrote notes/today.md"));

        let read = executor.read_file("notes/today.md").await;
        assert_eq!(read, ToolResult::success(content));
    }

    #[tokio::test]
    async fn write_overwrites_existing_file() {
        let dir = tempdir().unwrap();
        let executor = ToolExecutor::for_workspace(dir.path());

        executor.write_file("state.txt", "first").await;
        executor.write_file("state.txt", "second").await;

        assert_eq!(
            std::fs::read_to_string(dir.path().join("state.txt")).unwrap(),
            "second"
        );
    }

    #[tokio::test]
    async fn write_outside_workspace_is_denied() {
        let dir = tempdir().unwrap();
        let workspace = dir.path().join("ws");
        std::fs::create_dir(&workspace).unwrap();
        let executor = ToolExecutor::for_workspace(&workspace);

        let result = executor.write_file("../escape.txt", "nope").await;

        assert_eq!(result, ToolResult::failure("path outside workspace"));
        assert!(!dir.path().join("escape.txt").exists());
    }

    #[tokio::test]
    async fn absolute_path_outside_workspace_is_denied() {
        let dir = tempdir().unwrap();
        let executor = ToolExecutor::for_workspace(dir.path());

        let result = executor.read_file("/etc/hostname").await;

        assert_eq!(result, ToolResult::failure("path outside workspace"));
    }

    #[tokio::test]
    async fn read_missing_file() {
        let dir = tempdir().unwrap();
        let executor = ToolExecutor::for_workspace(dir.path());

        let result = executor.read_file("nope.txt").await;

        assert_eq!(result, ToolResult::failure("file does not exist"));
    }

    #[tokio::test]
    async fn read_directory_fails_with_explanation() {
        let dir = tempdir().unwrap();
        std::fs::create_dir(dir.path().join("subdir")).unwrap();
        let executor = ToolExecutor::for_workspace(dir.path());

        let result = executor.read_file("subdir").await;

        assert!(!result.ok);
        assert!(result.output.starts_with("failed to read subdir"));
    }

    #[tokio::test]
    async fn run_shell_timeout_kills_background_children() {
        let dir = tempdir().unwrap();
        let executor = executor_with(dir.path(), &["echo"]);

        let result = executor
            .run_shell(
                "echo start; (sleep 1; echo late > late.txt) & sleep 30",
                Duration::from_millis(300),
            )
            .await;
        assert!(result.output.contains("timed out"));

        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert!(!dir.path().join("late.txt").exists());
    }

    #[tokio::test]
    async fn read_below_regular_file_does_not_exist() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), "plain").unwrap();
        let executor = ToolExecutor::for_workspace(dir.path());

        let result = executor.read_file("a.txt/b.txt").await;

        assert_eq!(result, ToolResult::failure("file does not exist"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn symlink_dangling_outside_workspace_is_denied() {
        let workspace = tempdir().unwrap();
        let outside = tempdir().unwrap();
        let planted = outside.path().join("planted.txt");
        std::os::unix::fs::symlink(&planted, workspace.path().join("link")).unwrap();
        let executor = ToolExecutor::for_workspace(workspace.path());

        let result = executor.write_file("link", "escaped").await;

        assert_eq!(result, ToolResult::failure("path outside workspace"));
        assert!(!planted.exists());
    }
}
