//! RentVault CLI: drive the storage gateway from the command line.
//!
//! Configuration comes from the environment (or a `.env` file); see
//! `Config::from_env` for the variables.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use rentvault_cli::{guess_content_type, init_tracing, log_failure};
use rentvault_core::{Config, UploadMetadata};
use rentvault_services::{StorageGateway, UploadFile};
use serde::Serialize;

#[derive(Parser)]
#[command(name = "rentvault", about = "RentVault storage gateway CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload a file into a context or bucket
    Upload {
        /// Path to the file to upload
        file: PathBuf,
        /// Context tag (e.g. property_images) or bucket name
        #[arg(long)]
        context: String,
        /// Store under this folder instead of the metadata-derived layout
        #[arg(long)]
        folder: Option<String>,
        #[arg(long)]
        user: Option<String>,
        #[arg(long)]
        property: Option<String>,
        #[arg(long)]
        tenant: Option<String>,
        #[arg(long)]
        unit: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        document_type: Option<String>,
        /// Override the content type guessed from the file extension
        #[arg(long)]
        content_type: Option<String>,
    },
    /// Create a signed URL for one object
    Sign {
        path: String,
        #[arg(long)]
        context: String,
        /// Expiry in seconds (defaults to SIGNED_URL_EXPIRY_SECS)
        #[arg(long)]
        expires: Option<u64>,
    },
    /// Create signed URLs for several objects; unsignable paths are skipped
    SignMany {
        #[arg(required = true)]
        paths: Vec<String>,
        #[arg(long)]
        context: String,
        #[arg(long)]
        expires: Option<u64>,
    },
    /// Delete one object
    Delete {
        path: String,
        #[arg(long)]
        context: String,
    },
    /// Show the effective context policies
    Policies,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PolicyView<'a> {
    context: &'a str,
    bucket: &'a str,
    max_size_bytes: u64,
    max_size_mb: u64,
    allowed_content_types: Vec<&'a str>,
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize output")?;
    println!("{}", out);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = Config::from_env().context("Failed to load configuration")?;

    if let Commands::Policies = cli.command {
        let registry = config.policy_registry();
        let views: Vec<PolicyView<'_>> = registry
            .entries()
            .map(|(ctx, policy)| PolicyView {
                context: ctx.as_str(),
                bucket: &policy.bucket,
                max_size_bytes: policy.max_size_bytes,
                max_size_mb: policy.max_size_mb(),
                allowed_content_types: policy
                    .allowed_content_types
                    .iter()
                    .map(String::as_str)
                    .collect(),
            })
            .collect();
        return print_json(&views);
    }

    let gateway = StorageGateway::from_config(&config).await?;

    match cli.command {
        Commands::Upload {
            file,
            context,
            folder,
            user,
            property,
            tenant,
            unit,
            category,
            document_type,
            content_type,
        } => {
            let bytes = tokio::fs::read(&file)
                .await
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let name = file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| file.to_string_lossy().into_owned());
            let content_type =
                content_type.unwrap_or_else(|| guess_content_type(&file).to_string());

            let metadata = user.map(|user| UploadMetadata {
                user_id: Some(user),
                property_id: property,
                tenant_id: tenant,
                unit_id: unit,
                category,
                document_type,
                ..UploadMetadata::default()
            });

            let result = gateway
                .upload_file_to_bucket(
                    UploadFile::new(name, content_type, bytes),
                    &context,
                    folder.as_deref(),
                    metadata,
                )
                .await;
            print_json(&result)?;
            if !result.success {
                log_failure(
                    "upload",
                    &context,
                    &file.display().to_string(),
                    result.error.as_deref().unwrap_or("unknown error"),
                );
                std::process::exit(1);
            }
        }
        Commands::Sign {
            path,
            context,
            expires,
        } => {
            let url = gateway.get_signed_url(&path, &context, expires).await;
            print_json(&serde_json::json!({ "path": path, "signedUrl": url }))?;
            if url.is_none() {
                log_failure("sign", &context, &path, "could not create signed URL");
                std::process::exit(1);
            }
        }
        Commands::SignMany {
            paths,
            context,
            expires,
        } => {
            let urls = gateway
                .get_multiple_signed_urls(&paths, &context, expires)
                .await;
            if urls.len() < paths.len() {
                tracing::warn!(
                    requested = paths.len(),
                    signed = urls.len(),
                    context = %context,
                    "Some paths could not be signed"
                );
            }
            print_json(&serde_json::json!({
                "requested": paths.len(),
                "signedUrls": urls,
            }))?;
        }
        Commands::Delete { path, context } => {
            let deleted = gateway.delete_file(&path, &context).await;
            print_json(&serde_json::json!({ "path": path, "deleted": deleted }))?;
            if !deleted {
                log_failure("delete", &context, &path, "object could not be removed");
                std::process::exit(1);
            }
        }
        Commands::Policies => {}
    }

    Ok(())
}
