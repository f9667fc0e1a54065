//! Cloud Resource Manager service seam
//!
//! The tools only ever talk to the service through [`ResourceManager`], so the
//! walker, reporter, mutator and project grouping can run against any backend.

pub mod client;
pub mod types;

use crate::errors::Result;
use async_trait::async_trait;

pub use client::HttpResourceManager;
pub use types::{Binding, Folder, ListFoldersResponse, Policy, Project, ProjectState, SearchProjectsResponse};

/// Remote operations used by the tools
#[async_trait]
pub trait ResourceManager: Send + Sync {
    /// List one page of the immediate child folders of `parent`
    async fn list_folders(&self, parent: &str, page_token: Option<&str>) -> Result<ListFoldersResponse>;

    /// Fetch the IAM policy attached to a folder
    async fn get_folder_iam_policy(&self, folder: &str) -> Result<Policy>;

    /// Replace the IAM policy attached to a folder, returning the stored policy
    async fn set_folder_iam_policy(&self, folder: &str, policy: &Policy) -> Result<Policy>;

    /// Search one page of projects visible to the caller
    async fn search_projects(&self, query: Option<&str>, page_token: Option<&str>) -> Result<SearchProjectsResponse>;
}
