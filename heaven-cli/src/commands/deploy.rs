//! Deploy command handler
//!
//! Loads configuration, parses the deployment payload, runs the provider
//! and prints the final status.

use anyhow::{Context, Result};
use colored::*;
use heaven_core::domain::deployment::DeploymentRequest;
use heaven_core::dto::deployment::DeploymentPayload;
use heaven_runner::provider::registry;
use heaven_runner::{Config, DeploymentOutcome, connect_capabilities, run_deployment};
use serde_json::{Value as JsonValue, json};
use std::io::Read;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Run one deployment
///
/// # Arguments
/// * `payload_path` - Payload file, or `-` for stdin
/// * `provider` - Registry name of the provider
/// * `dry_run` - Forces dry run on top of `HEAVEN_DRY_RUN`
/// * `json` - Print the status as JSON instead of colored text
pub async fn handle_deploy_command(
    payload_path: &str,
    provider: &str,
    dry_run: bool,
    json: bool,
) -> Result<()> {
    let mut config = Config::from_env().context("Failed to load configuration")?;
    if dry_run {
        config = config.with_dry_run(true);
    }
    config.validate().context("Invalid configuration")?;

    if registry::lookup(provider).is_none() {
        let known: Vec<&str> = registry::names().collect();
        anyhow::bail!(
            "Unknown provider '{}' (available: {})",
            provider,
            known.join(", ")
        );
    }

    let raw = read_payload(payload_path)?;
    let request = parse_payload(&raw)?;
    info!(
        deployment = %request.identifier,
        repository = %request.repository,
        sha = %request.commit_sha,
        dry_run = config.dry_run,
        "deployment request loaded"
    );

    let capabilities = connect_capabilities(&config, request.aws_region())
        .await
        .context("Failed to initialize remote clients")?;

    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupt received, cancelling deployment");
                cancel.cancel();
            }
        }
    });

    let outcome = run_deployment(
        provider,
        request,
        capabilities,
        config.provider_settings(cancel),
    )
    .await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome_json(&outcome))?);
    } else {
        print_outcome(&outcome);
    }

    match outcome.error {
        Some(err) => Err(anyhow::Error::new(err).context("Deployment failed")),
        None => Ok(()),
    }
}

fn read_payload(path: &str) -> Result<String> {
    if path == "-" {
        let mut raw = String::new();
        std::io::stdin()
            .read_to_string(&mut raw)
            .context("Failed to read deployment payload from stdin")?;
        return Ok(raw);
    }

    std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read deployment payload: {}", path))
}

fn parse_payload(raw: &str) -> Result<DeploymentRequest> {
    let payload: DeploymentPayload =
        serde_json::from_str(raw).context("Failed to parse deployment payload")?;
    payload.into_request().context("Invalid deployment payload")
}

fn outcome_json(outcome: &DeploymentOutcome) -> JsonValue {
    json!({
        "provider": outcome.provider,
        "success": outcome.status.success(),
        "log": outcome.status.lines(),
        "output": outcome.status.output(),
        "error": outcome.error.as_ref().map(|err| json!({
            "phase": err.phase,
            "message": format!("{}: {}", err, err.cause),
        })),
    })
}

fn print_outcome(outcome: &DeploymentOutcome) {
    for line in outcome.status.lines() {
        println!("  {} {}", "▸".cyan(), line);
    }
    println!();

    match &outcome.error {
        None => {
            println!("{}", "✓ Deployment succeeded!".green().bold());
            if !outcome.status.output().is_empty() {
                println!("  Output: {}", outcome.status.output().cyan());
            }
        }
        Some(err) => {
            println!("{}", "✗ Deployment failed".red().bold());
            println!("  Phase:  {}", err.phase.to_string().yellow());
            println!("  Reason: {}", err.cause.to_string().dimmed());
        }
    }
}
