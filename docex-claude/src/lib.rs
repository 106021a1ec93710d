//! Claude Code CLI gateway for the docex extraction pipeline.
//!
//! [`ClaudeGateway`] implements [`docex::extraction::LlmGateway`] by running
//! `claude --print` as a subprocess for every prompt, with built-in tools
//! disabled and a wall-clock timeout.

/// Command-line argument construction for Claude CLI invocations.
pub mod cmd;
/// Discovery and resolution of the Claude CLI executable path.
pub mod discovery;
/// Error types returned by adapter operations.
pub mod error;
/// Subprocess execution with output capture and timeouts.
pub mod process;
/// Shared data types for configuration and results.
pub mod types;

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use docex::extraction::{GatewayError, LlmGateway, LlmRequest, LlmResponse};

pub use discovery::{discover_claude, locate_claude, CLAUDE_BIN_ENV_VAR};
pub use error::ClaudeError;
pub use process::run_claude;
pub use types::{RunConfig, RunResult};

/// Gateway that answers prompts through the Claude Code CLI.
#[derive(Debug, Clone)]
pub struct ClaudeGateway {
    /// Filesystem path to the `claude` executable.
    pub path: PathBuf,
    /// Base configuration applied to every run.
    pub config: RunConfig,
}

impl ClaudeGateway {
    /// Creates a gateway for an already-resolved executable.
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            config: RunConfig::default(),
        }
    }

    /// Resolves the executable (see [`discover_claude`]) and creates a gateway.
    ///
    /// # Errors
    ///
    /// Returns `ClaudeError::ExecutableNotFound` when no executable is found.
    pub fn discover(explicit_path: Option<PathBuf>) -> Result<Self, ClaudeError> {
        discover_claude(explicit_path).map(Self::new)
    }

    /// Overrides the per-run timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Reports the first line of `claude --version`.
    ///
    /// # Errors
    ///
    /// Returns `ClaudeError` if the executable cannot be run.
    pub async fn version(&self) -> Result<String, ClaudeError> {
        let output = tokio::process::Command::new(&self.path)
            .arg("--version")
            .output()
            .await?;
        Ok(String::from_utf8_lossy(&output.stdout)
            .lines()
            .next()
            .unwrap_or_default()
            .trim()
            .to_string())
    }

    /// Runs a prompt with the gateway's configuration and an optional model.
    ///
    /// # Errors
    ///
    /// Returns `ClaudeError::NonZeroExit` when the CLI fails, besides the
    /// spawn and timeout errors of [`run_claude`].
    pub async fn run(&self, prompt: &str, model: Option<&str>) -> Result<RunResult, ClaudeError> {
        let mut config = self.config.clone();
        if let Some(model) = model.filter(|m| !m.is_empty()) {
            config.model = Some(model.to_string());
        }

        let result = run_claude(&self.path, prompt, &config).await?;
        if result.exit_code != 0 {
            return Err(ClaudeError::NonZeroExit {
                exit_code: result.exit_code,
                stdout: result.stdout,
                stderr: result.stderr,
            });
        }
        Ok(result)
    }
}

#[async_trait]
impl LlmGateway for ClaudeGateway {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, GatewayError> {
        if request.temperature.abs() > f32::EPSILON {
            tracing::debug!(
                temperature = request.temperature,
                "Claude CLI has no temperature control; ignoring"
            );
        }
        let result = self.run(&request.prompt, Some(&request.model)).await?;
        Ok(LlmResponse {
            output_text: result.stdout,
        })
    }
}
