//! Ferry CLI
//!
//! Downloads, uploads and inlines Jira issue attachments, printing a JSON
//! result on stdout. Logs go to stderr.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ferry_core::attachment::{AttachmentService, InlineOptions, to_response};
use ferry_jira::JiraClient;
use ferry_shared::AppConfig;

#[derive(Debug, Parser)]
#[command(name = "ferry", version, about = "Move attachments in and out of Jira issues")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Download one attachment URL to a local path
    Download {
        url: String,
        path: PathBuf,
    },
    /// Download every attachment of an issue
    DownloadAll {
        issue_key: String,
        /// Target directory (defaults to transfer.download_dir)
        #[arg(short, long)]
        dir: Option<PathBuf>,
    },
    /// Upload one file to an issue
    Upload {
        issue_key: String,
        file: PathBuf,
    },
    /// Upload several files to an issue
    UploadMany {
        issue_key: String,
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Print attachment contents as base64
    Inline {
        issue_key: String,
        /// Include non-image attachments
        #[arg(long)]
        all_types: bool,
        /// Maximum attachments to fetch
        #[arg(long)]
        max_attachments: Option<usize>,
        /// Maximum bytes read per attachment
        #[arg(long)]
        max_bytes: Option<usize>,
    },
}

impl Command {
    fn issue_key(&self) -> Option<&str> {
        match self {
            Self::Download { .. } => None,
            Self::DownloadAll { issue_key, .. }
            | Self::Upload { issue_key, .. }
            | Self::UploadMany { issue_key, .. }
            | Self::Inline { issue_key, .. } => Some(issue_key),
        }
    }
}

async fn run(command: &Command, config: &AppConfig) -> anyhow::Result<Value> {
    let client = JiraClient::from_config(&config.jira, &config.transfer)
        .context("Failed to create Jira client")?;
    let service = AttachmentService::new(Arc::new(client));
    let issue_key = command.issue_key();

    let response = match command {
        Command::Download { url, path } => {
            to_response(issue_key, &service.download_attachment(url, path).await)
        }
        Command::DownloadAll { issue_key, dir } => {
            let dir = dir.as_ref().unwrap_or(&config.transfer.download_dir);
            to_response(
                Some(issue_key),
                &service.download_issue_attachments(issue_key, dir).await,
            )
        }
        Command::Upload { issue_key, file } => to_response(
            Some(issue_key),
            &service.upload_attachment(issue_key, file).await,
        ),
        Command::UploadMany { issue_key, files } => to_response(
            Some(issue_key),
            &service.upload_attachments(issue_key, files).await,
        ),
        Command::Inline {
            issue_key,
            all_types,
            max_attachments,
            max_bytes,
        } => {
            let mut options = InlineOptions::from(&config.transfer);
            if *all_types {
                options.only_images = false;
            }
            if let Some(max) = max_attachments {
                options.max_attachments = *max;
            }
            if let Some(max) = max_bytes {
                options.max_bytes_per_attachment = *max;
            }
            to_response(
                Some(issue_key),
                &service.get_issue_attachments_content(issue_key, &options).await,
            )
        }
    };

    Ok(response)
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ferry=info,ferry_core=info,ferry_jira=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    // Load configuration
    let config = AppConfig::load().context("Failed to load configuration")?;
    info!(jira = %config.jira.url, "Configuration loaded");

    let response = run(&cli.command, &config).await?;
    println!("{}", serde_json::to_string_pretty(&response)?);

    if response["success"] == Value::Bool(true) {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}
