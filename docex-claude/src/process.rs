use crate::error::ClaudeError;
use crate::types::{RunConfig, RunResult};
use std::process::Stdio;
use std::time::Instant;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::task::JoinHandle;
use tokio::time::timeout;

/// Reads a child pipe to the end on a background task.
fn capture<R>(pipe: Option<R>, name: &str) -> Result<JoinHandle<String>, ClaudeError>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let mut pipe = pipe.ok_or_else(|| ClaudeError::Other(format!("Failed to open {name}")))?;
    Ok(tokio::spawn(async move {
        let mut buf = Vec::new();
        let _ = pipe.read_to_end(&mut buf).await;
        String::from_utf8_lossy(&buf).into_owned()
    }))
}

/// Runs `claude --print` with `prompt` and captures its output.
///
/// # Errors
///
/// Returns `ClaudeError::SpawnFailed` if the process cannot be started and
/// `ClaudeError::Timeout` (after killing it) if it outlives `config.timeout`.
/// A non-zero exit is reported in [`RunResult::exit_code`], not as an error.
pub async fn run_claude(
    path: &std::path::Path,
    prompt: &str,
    config: &RunConfig,
) -> Result<RunResult, ClaudeError> {
    let args = crate::cmd::build_args(prompt, config);
    let start_time = Instant::now();

    let mut cmd = Command::new(path);
    cmd.args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    if let Some(cwd) = &config.cwd {
        cmd.current_dir(cwd);
    }

    for (k, v) in &config.env {
        cmd.env(k, v);
    }

    tracing::debug!(path = %path.display(), prompt_chars = prompt.len(), "Spawning Claude CLI");
    let mut child = cmd.spawn()?;
    let stdout_task = capture(child.stdout.take(), "stdout")?;
    let stderr_task = capture(child.stderr.take(), "stderr")?;

    match timeout(config.timeout, child.wait()).await {
        Ok(status) => {
            let status = status?;
            let stdout = stdout_task.await.unwrap_or_default();
            let stderr = stderr_task.await.unwrap_or_default();
            let duration_ms = u64::try_from(start_time.elapsed().as_millis()).unwrap_or(u64::MAX);

            tracing::debug!(exit_code = ?status.code(), duration_ms, "Claude CLI finished");
            Ok(RunResult {
                stdout,
                stderr,
                exit_code: status.code().unwrap_or(-1),
                duration_ms,
            })
        }
        Err(_) => {
            let _ = child.kill().await;
            stdout_task.abort();
            stderr_task.abort();
            Err(ClaudeError::Timeout(config.timeout))
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;
    use std::time::Duration;
    use tempfile::TempDir;

    /// Writes an executable shell script standing in for `claude`.
    fn fake_claude(dir: &TempDir, body: &str) -> std::path::PathBuf {
        let path = dir.path().join("claude");
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[tokio::test]
    async fn test_captures_stdout_and_exit_code() {
        let dir = TempDir::new().unwrap();
        // Echo the final argument (the prompt) back.
        let bin = fake_claude(&dir, r#"for last; do :; done; printf '%s' "$last""#);

        let result = run_claude(&bin, "hello prompt", &RunConfig::default())
            .await
            .unwrap();
        assert_eq!(result.stdout, "hello prompt");
        assert_eq!(result.exit_code, 0);
    }

    #[tokio::test]
    async fn test_non_zero_exit_is_reported() {
        let dir = TempDir::new().unwrap();
        let bin = fake_claude(&dir, "echo 'bad key' >&2; exit 3");

        let result = run_claude(&bin, "p", &RunConfig::default()).await.unwrap();
        assert_eq!(result.exit_code, 3);
        assert!(result.stderr.contains("bad key"));
    }

    #[tokio::test]
    async fn test_timeout_kills_process() {
        let dir = TempDir::new().unwrap();
        let bin = fake_claude(&dir, "sleep 10");
        let config = RunConfig {
            timeout: Duration::from_millis(200),
            ..RunConfig::default()
        };

        let err = run_claude(&bin, "p", &config).await.unwrap_err();
        assert!(matches!(err, ClaudeError::Timeout(_)));
    }
}
