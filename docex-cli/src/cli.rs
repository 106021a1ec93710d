use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use docex::extraction::{ExtractionConfig, DEFAULT_MODEL};

/// Model used with the Claude CLI backend when none is configured.
pub const DEFAULT_CLAUDE_MODEL: &str = "sonnet";

#[derive(Parser, Debug)]
#[command(name = "docex", author, version, about, long_about = None)]
pub struct Cli {
    /// Directory of JSON schema files, keyed by their `$id`
    #[arg(long, env = "DOCEX_SCHEMA_DIR", default_value = "schemas", global = true)]
    pub schemas: PathBuf,

    /// Model identifier (backend default when unset)
    #[arg(long, env = "DOCEX_MODEL", global = true)]
    pub model: Option<String>,

    /// LLM backend to send prompts to
    #[arg(long, env = "DOCEX_BACKEND", value_enum, default_value_t = Backend::Openai, global = true)]
    pub backend: Backend,

    /// Attempts shared by classification, extraction and validation
    #[arg(long, env = "DOCEX_MAX_ATTEMPTS", default_value_t = 2, global = true)]
    pub max_attempts: usize,

    /// Per-call timeout of the backend, in seconds
    #[arg(long, env = "DOCEX_TIMEOUT_SECS", default_value_t = 300, global = true)]
    pub timeout_secs: u64,

    /// Path to the `claude` executable (Claude backend only)
    #[arg(long, env = "DOCEX_CLAUDE_BIN", global = true)]
    pub claude_bin: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Extract schema-validated JSON from a document
    Extract {
        /// Document to read (`-` for stdin)
        input: PathBuf,
        /// Use this schema instead of classifying the document
        #[arg(long)]
        schema: Option<String>,
    },
    /// Print which schema the document is classified as
    Classify {
        /// Document to read (`-` for stdin)
        input: PathBuf,
    },
    /// List the schemas in the registry
    Schemas,
    /// Count the tokens a document occupies for the configured model
    Tokens {
        /// Document to read (`-` for stdin)
        input: PathBuf,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// OpenAI Responses API (`OPENAI_API_KEY`)
    Openai,
    /// Local Claude Code CLI
    Claude,
}

impl Backend {
    /// Model used when `--model` is not given.
    pub const fn default_model(self) -> &'static str {
        match self {
            Self::Openai => DEFAULT_MODEL,
            Self::Claude => DEFAULT_CLAUDE_MODEL,
        }
    }
}

impl Cli {
    /// The configured model, or the backend's default.
    pub fn model(&self) -> String {
        self.model
            .clone()
            .unwrap_or_else(|| self.backend.default_model().to_string())
    }

    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn extraction_config(&self) -> ExtractionConfig {
        ExtractionConfig::default()
            .with_model(self.model())
            .with_max_attempts(self.max_attempts)
    }
}
