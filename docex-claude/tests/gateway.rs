//! Gateway tests for the Claude CLI adapter.
//!
//! Most tests drive a stand-in `claude` shell script. The real-CLI test is
//! marked `#[ignore]`; run it with:
//!
//! ```bash
//! cargo test -p docex-claude -- --ignored
//! ```

#![cfg(unix)]

use docex::prelude::*;
use docex_claude::{discover_claude, ClaudeGateway};
use serde_json::json;
use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;
use tempfile::TempDir;

fn fake_claude(dir: &TempDir, body: &str) -> PathBuf {
    let path = dir.path().join("claude");
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

fn registry() -> SchemaRegistry {
    SchemaRegistry::from_schemas([Schema::new(json!({
        "$id": "invoice",
        "version": 3,
        "type": "object",
        "properties": {"total": {"type": "number"}},
        "required": ["total"]
    }))
    .unwrap()])
    .unwrap()
}

#[tokio::test]
async fn test_gateway_passes_model_and_returns_stdout() {
    let dir = TempDir::new().unwrap();
    // Print the value following --model.
    let bin = fake_claude(
        &dir,
        r#"while [ $# -gt 0 ]; do if [ "$1" = "--model" ]; then printf '%s' "$2"; fi; shift; done"#,
    );
    let gateway = ClaudeGateway::new(bin);

    let request = LlmRequest {
        model: "sonnet".to_string(),
        prompt: "anything".to_string(),
        temperature: 0.0,
    };
    let response = gateway.complete(&request).await.unwrap();
    assert_eq!(response.output_text, "sonnet");
}

#[tokio::test]
async fn test_non_zero_exit_becomes_gateway_error() {
    let dir = TempDir::new().unwrap();
    let bin = fake_claude(&dir, "echo 'Invalid API key' >&2; exit 1");
    let gateway = ClaudeGateway::new(bin);

    let request = LlmRequest {
        model: "sonnet".to_string(),
        prompt: "anything".to_string(),
        temperature: 0.0,
    };
    let err = gateway.complete(&request).await.unwrap_err();
    assert!(matches!(err, GatewayError::Process(msg) if msg.contains("Invalid API key")));
}

#[tokio::test]
async fn test_pipeline_through_cli_gateway() {
    let dir = TempDir::new().unwrap();
    // Classification prompts get the schema id, extraction prompts get fenced JSON.
    let bin = fake_claude(
        &dir,
        r#"for last; do :; done
case "$last" in
  *"Which schema_id"*) echo "invoice" ;;
  *) printf '```json\n{"total": 12.5}\n```\n' ;;
esac"#,
    );
    let gateway = ClaudeGateway::new(bin);

    let result = extract("Invoice total: 12.50", &registry(), &gateway, None, "sonnet")
        .await
        .unwrap();
    assert_eq!(result.doc_type, "invoice");
    assert_eq!(result.schema_version, Some(json!(3)));
    assert_eq!(result.data, json!({"total": 12.5}));
    assert_eq!(result.metrics.len(), 6);
}

#[tokio::test]
async fn test_version_reports_first_line() {
    let dir = TempDir::new().unwrap();
    let bin = fake_claude(&dir, "echo '2.1.0 (Claude Code)'; echo extra");
    let gateway = ClaudeGateway::new(bin);
    assert_eq!(gateway.version().await.unwrap(), "2.1.0 (Claude Code)");
}

/// E2E test against the installed CLI.
#[tokio::test]
#[ignore = "Requires Claude CLI installed"]
async fn e2e_extract_with_real_cli() {
    let Ok(path) = discover_claude(None) else {
        eprintln!("Skipping: Claude CLI not found");
        return;
    };
    let gateway = ClaudeGateway::new(path);

    let result = extract(
        "INVOICE #42. Amount due: 99.00 EUR",
        &registry(),
        &gateway,
        None,
        "sonnet",
    )
    .await
    .unwrap();
    assert_eq!(result.doc_type, "invoice");
    assert!(result.data["total"].is_number());
}
