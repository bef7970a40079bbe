//! # APIMCTL CLI
//!
//! Command-line interface for the API Management Controller.
//!
//! Reconciles a declarative service document (YAML) against the Azure
//! Resource Manager control plane: apply converges the live service onto
//! the document, read rebuilds a document from the live service and delete
//! tears the service down.
//!
//! ## Usage
//!
//! ```bash
//! # Create or update a service from a document
//! apimctl apply --file service.yaml --output state.yaml
//!
//! # Re-apply, carrying write-only fields over from the last applied state
//! apimctl apply --file service.yaml --prior state.yaml --output state.yaml
//!
//! # Rebuild a document from the live service
//! apimctl read --file state.yaml
//!
//! # Delete the service and purge the soft-deleted remnant
//! apimctl delete --file state.yaml
//!
//! # Print the JSON schema of the document format
//! apimctl schema
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tokio::time::Instant;
use tracing::info;

use api_management_controller::api::rest::ArmClient;
use api_management_controller::{Environment, Reconciler, ServiceDocument};

/// API Management Controller CLI
#[derive(Parser)]
#[command(name = "apimctl")]
#[command(
    about = "API Management Controller CLI",
    long_about = None,
    after_help = "\
Environment variables:
  ARM_ENDPOINT                       Resource Manager endpoint (default: https://management.azure.com)
  ARM_SUBSCRIPTION_ID                Subscription that owns the services (required)
  ARM_ACCESS_TOKEN                   Bearer token presented to the Resource Manager (required)
  APIM_GATEWAY_HOST_NAME_SUFFIX      Default gateway DNS suffix (default: azure-api.net)
  APIM_PURGE_SOFT_DELETE_ON_DESTROY  Purge the soft-deleted remnant after delete (default: true)

Examples:
  apimctl apply --file service.yaml --output state.yaml
  apimctl apply --file service.yaml --prior state.yaml --output state.yaml
  apimctl read --file state.yaml
  apimctl delete --file state.yaml
"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Converge the live service onto a document and print the state read back
    Apply {
        /// Path of the desired service document
        #[arg(short, long, value_name = "FILE")]
        file: PathBuf,

        /// State document from the previous successful apply
        /// Write-only fields (certificate blobs, passwords) are carried over
        /// from it, and omitting it makes apply refuse to overwrite a service
        /// that already exists
        #[arg(long, value_name = "FILE")]
        prior: Option<PathBuf>,

        /// Write the read-back state to this file instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Give up after this many seconds
        /// Service provisioning is slow; a fresh Premium deployment with
        /// additional locations can take well over an hour
        #[arg(long, value_name = "SECONDS", default_value_t = 10_800)]
        timeout: u64,
    },
    /// Rebuild a document from the live service
    Read {
        /// State document naming the service to read
        #[arg(short, long, value_name = "FILE")]
        file: PathBuf,

        /// Write the document to this file instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
    /// Delete the service, purging the soft-deleted remnant when configured
    Delete {
        /// State document naming the service to delete
        #[arg(short, long, value_name = "FILE")]
        file: PathBuf,

        /// Give up after this many seconds
        #[arg(long, value_name = "SECONDS", default_value_t = 3_600)]
        timeout: u64,
    },
    /// Print the JSON schema of the service document format
    Schema,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "apimctl=info,api_management_controller=info".into()),
        )
        .init();

    info!(
        "apimctl {} ({} {})",
        env!("CARGO_PKG_VERSION"),
        env!("BUILD_GIT_HASH"),
        env!("BUILD_DATETIME")
    );

    let cli = Cli::parse();

    match cli.command {
        Commands::Apply {
            file,
            prior,
            output,
            timeout,
        } => {
            let desired = load_document(&file)?;
            let prior = prior.map(|path| load_document(&path)).transpose()?;
            let reconciler = reconciler()?;
            let deadline = Instant::now() + Duration::from_secs(timeout);

            let state = reconciler
                .apply(&desired, prior.as_ref(), deadline)
                .await
                .with_context(|| format!("Failed to apply {}", file.display()))?;
            info!("Reconciled service: {}", reconciler.service_id(&state));
            write_document(&state, output.as_deref())?;
        }
        Commands::Read { file, output } => {
            let document = load_document(&file)?;
            let reconciler = reconciler()?;
            let id = reconciler.service_id(&document);

            match reconciler
                .read(&id, Some(&document))
                .await
                .with_context(|| format!("Failed to read {id}"))?
            {
                Some(state) => write_document(&state, output.as_deref())?,
                None => bail!("Service does not exist: {id}"),
            }
        }
        Commands::Delete { file, timeout } => {
            let document = load_document(&file)?;
            let reconciler = reconciler()?;
            let deadline = Instant::now() + Duration::from_secs(timeout);

            reconciler
                .delete(&document, deadline)
                .await
                .with_context(|| format!("Failed to delete {}", file.display()))?;
            info!("Deleted service: {}", reconciler.service_id(&document));
        }
        Commands::Schema => {
            let schema = schemars::schema_for!(ServiceDocument);
            println!(
                "{}",
                serde_json::to_string_pretty(&schema)
                    .context("Failed to serialize document schema")?
            );
        }
    }

    Ok(())
}

/// Build a reconciler from environment variables.
fn reconciler() -> Result<Reconciler<ArmClient>> {
    let environment = Environment::from_env();
    if environment.subscription_id.is_empty() {
        bail!("ARM_SUBSCRIPTION_ID must be set");
    }
    if environment.credential.is_empty() {
        bail!("ARM_ACCESS_TOKEN must be set");
    }
    let client = ArmClient::new(&environment)?;
    Ok(Reconciler::new(client, environment))
}

/// Parse a service document from a YAML file.
fn load_document(path: &Path) -> Result<ServiceDocument> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read document from {}", path.display()))?;
    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse document from {}", path.display()))
}

/// Print a document as YAML, or write it to `output` when given.
fn write_document(document: &ServiceDocument, output: Option<&Path>) -> Result<()> {
    let content =
        serde_yaml::to_string(document).context("Failed to serialize document")?;
    match output {
        Some(path) => std::fs::write(path, content)
            .with_context(|| format!("Failed to write document to {}", path.display()))?,
        None => print!("{content}"),
    }
    Ok(())
}
