use std::path::Path;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use docex::extraction::{classify_document, count_tokens, encoding_for_model, tokens::DEFAULT_ENCODING};
use docex::prelude::*;
use docex_claude::ClaudeGateway;
use docex_openai::OpenAiGateway;
use serde_json::json;
use tokio::io::AsyncReadExt;

use crate::cli::{Backend, Cli, Commands};

pub async fn run(cli: Cli) -> Result<ExitCode> {
    match &cli.command {
        Commands::Extract { input, schema } => run_extract(&cli, input, schema.as_deref()).await,
        Commands::Classify { input } => run_classify(&cli, input).await,
        Commands::Schemas => run_schemas(&cli),
        Commands::Tokens { input } => run_tokens(&cli, input).await,
    }
}

async fn run_extract(cli: &Cli, input: &Path, schema_id: Option<&str>) -> Result<ExitCode> {
    let registry = load_registry(cli)?;
    let schema = schema_id
        .map(|id| {
            registry.get(id).with_context(|| {
                format!(
                    "Unknown schema `{id}`. Known schemas: {}",
                    registry.ids().collect::<Vec<_>>().join(", ")
                )
            })
        })
        .transpose()?;

    let text = read_input(input).await?;
    let gateway = build_gateway(cli)?;
    let orchestrator = ExtractionOrchestrator::with_config(gateway.as_ref(), cli.extraction_config());

    match orchestrator.extract(&text, &registry, schema).await {
        Ok(result) => {
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(ExitCode::SUCCESS)
        }
        Err(ExtractionError::Failed(failure)) => {
            tracing::error!("{failure}");
            eprintln!("{}", serde_json::to_string_pretty(&failure)?);
            Ok(ExitCode::FAILURE)
        }
        Err(e) => Err(e.into()),
    }
}

async fn run_classify(cli: &Cli, input: &Path) -> Result<ExitCode> {
    let registry = load_registry(cli)?;
    let text = read_input(input).await?;
    let gateway = build_gateway(cli)?;

    let classification =
        classify_document(&text, &registry, gateway.as_ref(), &cli.extraction_config())
            .await
            .context("Classification failed")?;

    let output = json!({
        "schema_id": classification.schema_id,
        "schema_version": registry.get(&classification.schema_id).and_then(Schema::version),
        "usage": classification.usage,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(ExitCode::SUCCESS)
}

fn run_schemas(cli: &Cli) -> Result<ExitCode> {
    let registry = load_registry(cli)?;
    let listing: Vec<_> = registry
        .iter()
        .map(|(id, schema)| json!({"id": id, "version": schema.version()}))
        .collect();
    println!("{}", serde_json::to_string_pretty(&listing)?);
    Ok(ExitCode::SUCCESS)
}

async fn run_tokens(cli: &Cli, input: &Path) -> Result<ExitCode> {
    let text = read_input(input).await?;
    let model = cli.model();
    let encoding = encoding_for_model(&model).unwrap_or(DEFAULT_ENCODING);

    let output = json!({
        "model": model,
        "encoding": encoding.name(),
        "tokens": count_tokens(&text, &model),
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(ExitCode::SUCCESS)
}

fn load_registry(cli: &Cli) -> Result<SchemaRegistry> {
    let registry = SchemaRegistry::load_dir(&cli.schemas)
        .with_context(|| format!("Failed to load schemas from {}", cli.schemas.display()))?;
    if registry.is_empty() {
        bail!("No schemas found in {}", cli.schemas.display());
    }
    Ok(registry)
}

async fn read_input(input: &Path) -> Result<String> {
    let text = if input == Path::new("-") {
        let mut text = String::new();
        tokio::io::stdin()
            .read_to_string(&mut text)
            .await
            .context("Failed to read document from stdin")?;
        text
    } else {
        tokio::fs::read_to_string(input)
            .await
            .with_context(|| format!("Failed to read document {}", input.display()))?
    };

    if text.trim().is_empty() {
        tracing::warn!("Input document appears empty.");
    }
    Ok(text)
}

fn build_gateway(cli: &Cli) -> Result<Box<dyn LlmGateway>> {
    match cli.backend {
        Backend::Openai => {
            let gateway = OpenAiGateway::from_env()?.with_timeout(cli.timeout());
            tracing::info!(endpoint = %gateway.endpoint(), "Using OpenAI backend");
            Ok(Box::new(gateway))
        }
        Backend::Claude => {
            let gateway = ClaudeGateway::discover(cli.claude_bin.clone())?.with_timeout(cli.timeout());
            tracing::info!(path = %gateway.path.display(), "Using Claude CLI backend");
            Ok(Box::new(gateway))
        }
    }
}
