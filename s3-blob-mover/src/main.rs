/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use aws_smithy_types::error::display::DisplayErrorContext;
use clap::Parser;
use s3_blob_mover::config::{load_dotenv, EnvironmentConfigLoader, TransferOverrides};
use s3_blob_mover::{Error, Mover, TransferOutcome};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{filter::LevelFilter, EnvFilter};

/// Copy one object from Amazon S3 to Azure Blob Storage.
///
/// Connection settings come from the environment (`AZURE_CONN`, `AWS_ROLE_ARN`, `AWS_REGION`),
/// optionally loaded from a `.env` file. Flags override the transfer values read from
/// `S3_BUCKET`, `S3_KEY`, `AZURE_CONTAINER`, `AZURE_BLOB_NAME` and `AZURE_OVERWRITE`.
#[derive(Parser, Debug)]
#[clap(author, version, about)]
struct Args {
    /// Load environment variables from this file instead of `.env`.
    #[arg(long)]
    env_file: Option<PathBuf>,
    /// Source bucket.
    #[arg(long)]
    bucket: Option<String>,
    /// Source object key.
    #[arg(long)]
    key: Option<String>,
    /// Destination container.
    #[arg(long)]
    container: Option<String>,
    /// Destination blob name. Defaults to the last segment of the key.
    #[arg(long)]
    blob_name: Option<String>,
    /// Fail instead of replacing an existing blob.
    #[arg(long)]
    no_overwrite: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .init();

    let args = Args::parse();
    match run(args).await {
        Ok(outcome) => {
            println!(
                "copied {} ({} bytes) to {}",
                outcome.source, outcome.bytes_transferred, outcome.destination
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!(error = %DisplayErrorContext(&err), "transfer failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<TransferOutcome, Error> {
    load_dotenv(args.env_file.as_deref())?;

    let loader = EnvironmentConfigLoader::new();
    let config = loader.mover_config()?;
    let mut settings = loader.transfer_settings()?;
    settings.apply_overrides(TransferOverrides {
        bucket: args.bucket,
        key: args.key,
        container: args.container,
        blob_name: args.blob_name,
        overwrite: args.no_overwrite.then_some(false),
    });
    let request = settings.to_request_builder().build()?;

    let mover = Mover::connect(&config).await?;
    mover.move_single_file(&request).await
}
