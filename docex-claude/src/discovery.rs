use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::error::ClaudeError;

/// Environment variable naming the `claude` executable to use.
pub const CLAUDE_BIN_ENV_VAR: &str = "DOCEX_CLAUDE_BIN";

const CLAUDE_BIN_NAME: &str = "claude";

/// Locates the Claude CLI from the process environment.
///
/// An explicit path wins and must exist. Otherwise `DOCEX_CLAUDE_BIN` is tried,
/// then `claude` on `$PATH`.
///
/// # Errors
///
/// Returns `ClaudeError::ExecutableNotFound` listing every location tried.
pub fn discover_claude(explicit_path: Option<PathBuf>) -> Result<PathBuf, ClaudeError> {
    locate_claude(
        explicit_path,
        std::env::var_os(CLAUDE_BIN_ENV_VAR).map(PathBuf::from),
        std::env::var_os("PATH"),
    )
}

/// Resolution behind [`discover_claude`], with the environment passed in.
///
/// # Errors
///
/// Returns `ClaudeError::ExecutableNotFound` listing every location tried.
pub fn locate_claude(
    explicit_path: Option<PathBuf>,
    env_override: Option<PathBuf>,
    search_path: Option<OsString>,
) -> Result<PathBuf, ClaudeError> {
    if let Some(path) = explicit_path {
        return if path.is_file() {
            Ok(path)
        } else {
            Err(ClaudeError::ExecutableNotFound {
                tried: vec![describe("--claude-bin", &path)],
            })
        };
    }

    let mut tried = Vec::new();
    if let Some(path) = env_override.filter(|p| !p.as_os_str().is_empty()) {
        if path.is_file() {
            return Ok(path);
        }
        tracing::debug!(path = %path.display(), "{CLAUDE_BIN_ENV_VAR} does not point at a file");
        tried.push(describe(CLAUDE_BIN_ENV_VAR, &path));
    }

    match which::which_in(CLAUDE_BIN_NAME, search_path, ".") {
        Ok(path) => Ok(path),
        Err(e) => {
            tried.push(format!("`{CLAUDE_BIN_NAME}` on PATH ({e})"));
            Err(ClaudeError::ExecutableNotFound { tried })
        }
    }
}

fn describe(source: &str, path: &Path) -> String {
    format!("{source}={}", path.display())
}
