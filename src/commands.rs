//! Tool routines behind the two binaries
//!
//! Each routine takes the service and an output sink so the binaries stay a
//! thin parse/authenticate/exit shell.

use anyhow::{Context, Result};
use std::io::Write;

use crate::api::ResourceManager;
use crate::cli::FolderIamArgs;
use crate::config::Config;
use crate::errors::CrmError;
use crate::folders;
use crate::iam::{self, SetMode, NO_FOLDERS_MESSAGE};
use crate::projects::{self, SearchOptions};

/// Whether the failure chain holds a 401/403 from the API
pub fn is_permission_error(err: &anyhow::Error) -> bool {
    err.chain()
        .filter_map(|cause| cause.downcast_ref::<CrmError>())
        .any(CrmError::is_permission_denied)
}

/// Folder IAM tool routines
pub struct FolderCommands;

/// Project search tool routines
pub struct ProjectCommands;

impl FolderCommands {
    /// Run get and/or set as requested by the flags; get runs first.
    ///
    /// An organization without folders ends the run after get, so set is skipped.
    pub async fn run<A, W>(api: &A, args: &FolderIamArgs, config: &Config, out: &mut W) -> Result<()>
    where
        A: ResourceManager + ?Sized,
        W: Write,
    {
        if !args.get && !args.set {
            tracing::info!("neither -get nor -set given; nothing to do");
        }

        if args.get && !Self::get(api, &args.org, out).await? {
            if args.set {
                tracing::info!("organization has no folders; skipping -set");
            }
            return Ok(());
        }

        if args.set {
            Self::set(
                api,
                &args.folder,
                &args.user,
                &args.role,
                args.set_mode(),
                config.iam.overwrite_policy_version,
            )
            .await?;
        }

        Ok(())
    }

    /// Walk every folder under `org` and print its bindings.
    ///
    /// Returns `false` when the organization has no folders.
    pub async fn get<A, W>(api: &A, org: &str, out: &mut W) -> Result<bool>
    where
        A: ResourceManager + ?Sized,
        W: Write,
    {
        let folders = folders::walk_hierarchy(api, org)
            .await
            .with_context(|| format!("Failed to list folders under '{}'", org))?;

        if folders.is_empty() {
            writeln!(out, "{}", NO_FOLDERS_MESSAGE)?;
            return Ok(false);
        }

        iam::report_folder_policies(api, &folders, out)
            .await
            .context("Failed to report folder IAM policies")?;
        Ok(true)
    }

    /// Grant `role` to `user` on `folder`
    pub async fn set<A>(
        api: &A,
        folder: &str,
        user: &str,
        role: &str,
        mode: SetMode,
        overwrite_version: i32,
    ) -> Result<()>
    where
        A: ResourceManager + ?Sized,
    {
        iam::apply_binding(api, folder, user, role, mode, overwrite_version)
            .await
            .with_context(|| format!("Failed to set IAM policy on '{}'", folder))?;

        let verb = match mode {
            SetMode::Overwrite => "Replaced policy with",
            SetMode::Merge => "Added",
        };
        tracing::info!("{} {} for {} on {}", verb, role, user, folder);
        Ok(())
    }
}

impl ProjectCommands {
    /// Search, group active projects by parent, and print the groups
    pub async fn report<A, W>(api: &A, options: &SearchOptions, out: &mut W) -> Result<()>
    where
        A: ResourceManager + ?Sized,
        W: Write,
    {
        let groups = projects::active_projects_by_parent(api, options)
            .await
            .context("Failed to search projects")?;

        write!(out, "{}", groups)?;
        out.flush()?;
        Ok(())
    }
}
