//! Folder hierarchy walker
//!
//! Breadth-first expansion of an organization's folder tree. Each level is the
//! set of immediate children of the previous level; the walk stops at the
//! first level that comes back empty.

use crate::api::{ListFoldersResponse, ResourceManager};
use crate::errors::Result;

/// Drain every page of `folders.list` for `parent`, calling `on_page` once per page.
pub async fn for_each_folder_page<A, F>(api: &A, parent: &str, mut on_page: F) -> Result<()>
where
    A: ResourceManager + ?Sized,
    F: FnMut(&ListFoldersResponse) -> Result<()>,
{
    let mut page_token: Option<String> = None;

    loop {
        let page = api.list_folders(parent, page_token.as_deref()).await?;
        on_page(&page)?;

        match page.next_page() {
            Some(token) => page_token = Some(token.to_string()),
            None => return Ok(()),
        }
    }
}

/// Immediate child folders of every parent, in parent order then page order
pub async fn child_folders<A>(api: &A, parents: &[String]) -> Result<Vec<String>>
where
    A: ResourceManager + ?Sized,
{
    let mut children = Vec::new();

    for parent in parents {
        for_each_folder_page(api, parent, |page| {
            children.extend(page.folders.iter().map(|folder| folder.name.clone()));
            Ok(())
        })
        .await?;
    }

    Ok(children)
}

/// Every folder below `root`, level by level.
///
/// Returns an empty list when `root` has no folders at all.
pub async fn walk_hierarchy<A>(api: &A, root: &str) -> Result<Vec<String>>
where
    A: ResourceManager + ?Sized,
{
    let mut all_folders: Vec<String> = Vec::new();
    let mut level = vec![root.to_string()];
    let mut depth = 0usize;

    loop {
        let next = child_folders(api, &level).await?;
        if next.is_empty() {
            break;
        }

        depth += 1;
        tracing::debug!(depth, count = next.len(), "discovered folder level");
        all_folders.extend(next.iter().cloned());
        level = next;
    }

    tracing::info!(root, folders = all_folders.len(), levels = depth, "folder walk complete");
    Ok(all_folders)
}
