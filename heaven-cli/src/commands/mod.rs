//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod deploy;
mod providers;

use anyhow::Result;
use clap::Subcommand;
use heaven_runner::ElasticBeanstalk;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Deploy a commit described by a deployment payload
    Deploy {
        /// Path to the deployment payload JSON, or `-` for stdin
        #[arg(short, long, default_value = "-")]
        payload: String,

        /// Provider to deploy with
        #[arg(long, default_value = ElasticBeanstalk::NAME)]
        provider: String,

        /// Confirm the wiring without any remote operation
        #[arg(long)]
        dry_run: bool,

        /// Print the final status as JSON
        #[arg(long)]
        json: bool,
    },
    /// List the available providers
    Providers,
}

/// Routes the command to its handler module
pub async fn handle_command(command: Commands) -> Result<()> {
    match command {
        Commands::Deploy {
            payload,
            provider,
            dry_run,
            json,
        } => deploy::handle_deploy_command(&payload, &provider, dry_run, json).await,
        Commands::Providers => providers::list_providers(),
    }
}
