//! project-search - group active projects by parent

use anyhow::{Context, Result};
use crm_tools::{
    cli::ProjectSearchArgs,
    commands::{self, ProjectCommands},
    config::Config,
    logging,
    projects::SearchOptions,
    HttpResourceManager,
};
use std::process::ExitCode;

async fn run(args: &ProjectSearchArgs) -> Result<()> {
    let config = Config::load(args.common.config.as_deref())?;

    let api = HttpResourceManager::connect(&config)
        .await
        .context("Failed to create Resource Manager client")?;

    let options = SearchOptions {
        query: args.query.clone(),
        all_pages: args.all_pages,
    };

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    ProjectCommands::report(&api, &options, &mut out).await
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = ProjectSearchArgs::parse_flags(std::env::args_os());
    logging::init(args.common.verbosity());

    match run(&args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{:#}", e);
            if commands::is_permission_error(&e) {
                tracing::warn!("the caller needs resourcemanager.projects.get on the projects searched");
            }
            ExitCode::FAILURE
        }
    }
}
