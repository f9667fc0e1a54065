//! folder-iam - report and edit IAM bindings on Cloud Resource Manager folders
//!
//! ```text
//! folder-iam -get -org="organizations/27464139858"
//! folder-iam -set -user="user:test@gmail.com" -role="roles/resourcemanager.folderEditor" -folder="folders/345573146175"
//! ```

use anyhow::{Context, Result};
use crm_tools::{
    cli::FolderIamArgs,
    commands::{self, FolderCommands},
    config::Config,
    logging, HttpResourceManager,
};
use std::process::ExitCode;

async fn run(args: &FolderIamArgs) -> Result<()> {
    let config = Config::load(args.common.config.as_deref())?;

    let api = HttpResourceManager::connect(&config)
        .await
        .context("Failed to create Resource Manager client")?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    FolderCommands::run(&api, args, &config, &mut out).await
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = FolderIamArgs::parse_flags(std::env::args_os());
    logging::init(args.common.verbosity());

    match run(&args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{:#}", e);
            if commands::is_permission_error(&e) {
                tracing::warn!("the caller needs folder list and IAM permissions on the organization");
            }
            ExitCode::FAILURE
        }
    }
}
