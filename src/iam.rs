//! Folder IAM policy reporting and editing

use crate::api::{Binding, Policy, ResourceManager};
use crate::errors::Result;
use std::io::Write;

/// Printed in get mode when the organization has no folders
pub const NO_FOLDERS_MESSAGE: &str = "The specified organization does not have any folders";

/// How a new binding is written to a folder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetMode {
    /// Replace the whole policy with a single binding
    Overwrite,
    /// Append the binding to the existing policy
    Merge,
}

/// Policy holding exactly one binding for `member` on `role`
pub fn overwrite_policy(member: &str, role: &str, version: i32) -> Policy {
    Policy {
        version,
        bindings: vec![Binding::new(role, member)],
        ..Policy::default()
    }
}

/// `existing` with one more binding appended.
///
/// Identical bindings already present are not detected; the new one is added regardless.
pub fn merge_binding(mut existing: Policy, member: &str, role: &str) -> Policy {
    existing.bindings.push(Binding::new(role, member));
    existing
}

/// Text block printed for one folder in get mode
pub fn render_bindings(folder: &str, policy: &Policy) -> String {
    let mut out = format!("Bindings for {}:\n", folder);
    for binding in &policy.bindings {
        out.push_str("- members:\n");
        for member in &binding.members {
            out.push_str(&format!("  - {}\n", member));
        }
        out.push_str(&format!("  role: {}\n", binding.role));
    }
    out.push('\n');

    out
}

/// Fetch and print each folder's policy, one folder at a time
pub async fn report_folder_policies<A, W>(api: &A, folders: &[String], out: &mut W) -> Result<()>
where
    A: ResourceManager + ?Sized,
    W: Write,
{
    for folder in folders {
        let policy = api.get_folder_iam_policy(folder).await?;
        tracing::debug!(folder = %folder, bindings = policy.bindings.len(), "fetched policy");

        out.write_all(render_bindings(folder, &policy).as_bytes())?;
        out.flush()?;
    }

    Ok(())
}

/// Grant `role` to `member` on `folder`, returning the policy stored by the service
pub async fn apply_binding<A>(
    api: &A,
    folder: &str,
    member: &str,
    role: &str,
    mode: SetMode,
    overwrite_version: i32,
) -> Result<Policy>
where
    A: ResourceManager + ?Sized,
{
    let policy = match mode {
        SetMode::Overwrite => {
            tracing::warn!(folder, "overwriting IAM policy; existing bindings are discarded");
            overwrite_policy(member, role, overwrite_version)
        }
        SetMode::Merge => {
            let existing = api.get_folder_iam_policy(folder).await?;
            if existing
                .bindings
                .iter()
                .any(|b| b.role == role && b.members.iter().any(|m| m == member))
            {
                tracing::info!(folder, role, member, "binding already present; appending duplicate");
            }
            merge_binding(existing, member, role)
        }
    };

    let stored = api.set_folder_iam_policy(folder, &policy).await?;
    tracing::debug!(folder, bindings = stored.bindings.len(), etag = ?stored.etag, "policy stored");
    Ok(stored)
}
