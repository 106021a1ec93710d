//! Shared data types for Claude CLI adapter configuration and results.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Configuration for a single Claude CLI invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Model name override (e.g. `"sonnet"`).
    pub model: Option<String>,
    /// Disable every built-in tool, so the CLI answers from the prompt alone.
    pub disable_builtin_tools: bool,
    /// Disable session persistence to avoid version-lock conflicts.
    ///
    /// When `true`, adds `--no-session-persistence` to the CLI invocation.
    /// This prevents hanging when another Claude Code session is already
    /// running (which holds a version lock file).
    pub no_session_persistence: bool,
    /// Skip user setting sources (CLAUDE.md, hooks, MCP servers).
    ///
    /// When `true`, adds `--setting-sources ""` so programmatic runs are
    /// isolated from user-level configuration.
    pub isolate_settings: bool,
    /// Maximum wall-clock duration before the process is killed.
    pub timeout: Duration,
    /// Working directory for the subprocess.
    pub cwd: Option<PathBuf>,
    /// Extra environment variables passed to the subprocess.
    pub env: Vec<(String, String)>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            model: None,
            disable_builtin_tools: true,
            no_session_persistence: true,
            isolate_settings: true,
            timeout: Duration::from_secs(300),
            cwd: None,
            env: Vec::new(),
        }
    }
}

/// Result of a completed Claude CLI invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResult {
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
    /// Process exit code (`-1` if unavailable).
    pub exit_code: i32,
    /// Wall-clock duration in milliseconds.
    pub duration_ms: u64,
}
