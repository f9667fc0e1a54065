//! In-memory Resource Manager used by the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use crm_tools::api::{
    Binding, Folder, ListFoldersResponse, Policy, Project, ProjectState, ResourceManager,
    SearchProjectsResponse,
};
use crm_tools::{CrmError, Result};
use std::collections::HashMap;
use std::sync::Mutex;

/// A recorded service call
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    ListFolders { parent: String, page_token: Option<String> },
    GetPolicy(String),
    SetPolicy(String, Policy),
    SearchProjects { query: Option<String>, page_token: Option<String> },
}

pub struct FakeResourceManager {
    children: HashMap<String, Vec<String>>,
    folder_page_size: usize,
    policies: Mutex<HashMap<String, Policy>>,
    projects: Vec<Project>,
    project_page_size: usize,
    fail_list_for: Option<String>,
    fail_policy_for: Option<String>,
    calls: Mutex<Vec<Call>>,
}

impl FakeResourceManager {
    pub fn new() -> Self {
        Self {
            children: HashMap::new(),
            folder_page_size: 100,
            policies: Mutex::new(HashMap::new()),
            projects: Vec::new(),
            project_page_size: 100,
            fail_list_for: None,
            fail_policy_for: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_folder(mut self, parent: &str, child: &str) -> Self {
        self.children
            .entry(parent.to_string())
            .or_default()
            .push(child.to_string());
        self
    }

    pub fn with_folder_page_size(mut self, size: usize) -> Self {
        self.folder_page_size = size.max(1);
        self
    }

    pub fn with_policy(self, folder: &str, policy: Policy) -> Self {
        self.policies
            .lock()
            .unwrap()
            .insert(folder.to_string(), policy);
        self
    }

    pub fn with_project(mut self, name: &str, parent: &str, state: ProjectState) -> Self {
        self.projects.push(Project {
            name: name.to_string(),
            parent: parent.to_string(),
            project_id: None,
            display_name: None,
            state,
        });
        self
    }

    pub fn with_project_page_size(mut self, size: usize) -> Self {
        self.project_page_size = size.max(1);
        self
    }

    pub fn failing_list_for(mut self, parent: &str) -> Self {
        self.fail_list_for = Some(parent.to_string());
        self
    }

    pub fn failing_policy_for(mut self, folder: &str) -> Self {
        self.fail_policy_for = Some(folder.to_string());
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn policy(&self, folder: &str) -> Option<Policy> {
        self.policies.lock().unwrap().get(folder).cloned()
    }

    pub fn count_policy_reads(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::GetPolicy(_)))
            .count()
    }

    pub fn count_folder_lists(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::ListFolders { .. }))
            .count()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

/// Slice `items` at the offset encoded in `page_token`.
///
/// The last page carries an empty token, like the real service.
fn paginate<T: Clone>(items: &[T], page_token: Option<&str>, size: usize) -> (Vec<T>, Option<String>) {
    let start = page_token.and_then(|t| t.parse::<usize>().ok()).unwrap_or(0);
    let end = (start + size).min(items.len());
    let page = items.get(start..end).map(|s| s.to_vec()).unwrap_or_default();
    let next = if end < items.len() {
        Some(end.to_string())
    } else {
        Some(String::new())
    };
    (page, next)
}

fn permission_denied(resource: &str) -> CrmError {
    CrmError::Api {
        code: 403,
        status: "PERMISSION_DENIED".to_string(),
        message: format!("The caller does not have permission on {}", resource),
    }
}

#[async_trait]
impl ResourceManager for FakeResourceManager {
    async fn list_folders(&self, parent: &str, page_token: Option<&str>) -> Result<ListFoldersResponse> {
        self.record(Call::ListFolders {
            parent: parent.to_string(),
            page_token: page_token.map(str::to_string),
        });

        if self.fail_list_for.as_deref() == Some(parent) {
            return Err(permission_denied(parent));
        }

        let names = self.children.get(parent).cloned().unwrap_or_default();
        let (page, next_page_token) = paginate(&names, page_token, self.folder_page_size);

        Ok(ListFoldersResponse {
            folders: page
                .into_iter()
                .map(|name| Folder {
                    name,
                    parent: parent.to_string(),
                    display_name: None,
                    lifecycle_state: Some("ACTIVE".to_string()),
                })
                .collect(),
            next_page_token,
        })
    }

    async fn get_folder_iam_policy(&self, folder: &str) -> Result<Policy> {
        self.record(Call::GetPolicy(folder.to_string()));

        if self.fail_policy_for.as_deref() == Some(folder) {
            return Err(permission_denied(folder));
        }

        Ok(self.policy(folder).unwrap_or_else(|| Policy {
            version: 1,
            etag: Some("ACAB".to_string()),
            ..Policy::default()
        }))
    }

    async fn set_folder_iam_policy(&self, folder: &str, policy: &Policy) -> Result<Policy> {
        self.record(Call::SetPolicy(folder.to_string(), policy.clone()));

        let mut stored = policy.clone();
        stored.etag = Some(format!("etag-{}", stored.bindings.len()));
        self.policies
            .lock()
            .unwrap()
            .insert(folder.to_string(), stored.clone());
        Ok(stored)
    }

    async fn search_projects(&self, query: Option<&str>, page_token: Option<&str>) -> Result<SearchProjectsResponse> {
        self.record(Call::SearchProjects {
            query: query.map(str::to_string),
            page_token: page_token.map(str::to_string),
        });

        let (projects, next_page_token) = paginate(&self.projects, page_token, self.project_page_size);
        Ok(SearchProjectsResponse {
            projects,
            next_page_token,
        })
    }
}

/// Policy with one binding per (role, member) pair
pub fn policy_with(bindings: &[(&str, &str)]) -> Policy {
    Policy {
        version: 1,
        bindings: bindings
            .iter()
            .map(|(role, member)| Binding::new(*role, *member))
            .collect(),
        etag: Some("BwXhqDXd0Kk=".to_string()),
        ..Policy::default()
    }
}
