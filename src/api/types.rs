//! Wire types for the Cloud Resource Manager API
//!
//! Folders and IAM policies come from the v2 surface, project search from v3.
//! Fields the tools never interpret are kept in `extra` so that a policy read
//! from the service can be written back without losing anything.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// A folder as returned by `folders.list`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Folder {
    /// Resource name (e.g., "folders/123456")
    pub name: String,

    #[serde(default)]
    pub parent: String,

    #[serde(default)]
    pub display_name: Option<String>,

    #[serde(default)]
    pub lifecycle_state: Option<String>,
}

/// One page of `folders.list`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListFoldersResponse {
    #[serde(default)]
    pub folders: Vec<Folder>,

    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// Association between a role and the identities granted it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Binding {
    /// Role name (e.g., "roles/resourcemanager.folderEditor")
    pub role: String,

    /// Member identities (e.g., "user:alice@example.com")
    #[serde(default)]
    pub members: Vec<String>,

    /// Optional condition, passed through untouched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<Value>,
}

/// IAM policy attached to a resource
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Policy {
    #[serde(default)]
    pub version: i32,

    #[serde(default)]
    pub bindings: Vec<Binding>,

    /// Concurrency token; must be echoed back on set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,

    /// Audit configs and any other fields the service returns
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Body of `getIamPolicy`
#[derive(Debug, Clone, Default, Serialize)]
pub struct GetIamPolicyRequest {}

/// Body of `setIamPolicy`
#[derive(Debug, Clone, Serialize)]
pub struct SetIamPolicyRequest<'a> {
    pub policy: &'a Policy,
}

/// Project lifecycle state
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProjectState {
    Active,
    DeleteRequested,
    #[default]
    StateUnspecified,
    /// Any state this client does not know about
    #[serde(other)]
    Unknown,
}

/// A project as returned by `projects.search`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Resource name (e.g., "projects/415104041262")
    pub name: String,

    #[serde(default)]
    pub parent: String,

    #[serde(default)]
    pub project_id: Option<String>,

    #[serde(default)]
    pub display_name: Option<String>,

    #[serde(default)]
    pub state: ProjectState,
}

/// One page of `projects.search`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchProjectsResponse {
    #[serde(default)]
    pub projects: Vec<Project>,

    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// Error envelope returned on non-success responses
#[derive(Debug, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ErrorStatus,
}

#[derive(Debug, Deserialize)]
pub struct ErrorStatus {
    #[serde(default)]
    pub code: u16,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: String,
}

impl Binding {
    /// Binding granting `role` to a single member
    pub fn new(role: impl Into<String>, member: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            members: vec![member.into()],
            condition: None,
        }
    }
}

impl Project {
    pub fn is_active(&self) -> bool {
        self.state == ProjectState::Active
    }
}

impl ListFoldersResponse {
    /// Token for the next page, if the service returned a non-empty one
    pub fn next_page(&self) -> Option<&str> {
        non_empty(self.next_page_token.as_deref())
    }
}

impl SearchProjectsResponse {
    pub fn next_page(&self) -> Option<&str> {
        non_empty(self.next_page_token.as_deref())
    }
}

fn non_empty(token: Option<&str>) -> Option<&str> {
    token.filter(|t| !t.is_empty())
}

impl fmt::Display for ProjectState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProjectState::Active => "ACTIVE",
            ProjectState::DeleteRequested => "DELETE_REQUESTED",
            ProjectState::StateUnspecified => "STATE_UNSPECIFIED",
            ProjectState::Unknown => "UNKNOWN",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_policy_preserves_unknown_fields() {
        let raw = json!({
            "version": 3,
            "etag": "BwXhqDXd0Kk=",
            "bindings": [
                {"role": "roles/viewer", "members": ["user:a@example.com"]}
            ],
            "auditConfigs": [{"service": "allServices"}]
        });

        let policy: Policy = serde_json::from_value(raw).unwrap();
        assert_eq!(policy.version, 3);
        assert_eq!(policy.etag.as_deref(), Some("BwXhqDXd0Kk="));
        assert!(policy.extra.contains_key("auditConfigs"));

        let back = serde_json::to_value(&policy).unwrap();
        assert_eq!(back["auditConfigs"][0]["service"], "allServices");
        assert_eq!(back["etag"], "BwXhqDXd0Kk=");
    }

    #[test]
    fn test_empty_policy_parses() {
        let policy: Policy = serde_json::from_str(r#"{"etag": "ACAB"}"#).unwrap();
        assert_eq!(policy.version, 0);
        assert!(policy.bindings.is_empty());
    }

    #[test]
    fn test_set_request_wraps_policy() {
        let policy = Policy {
            version: 1,
            bindings: vec![Binding::new("roles/owner", "user:b@example.com")],
            ..Policy::default()
        };
        let body = serde_json::to_value(SetIamPolicyRequest { policy: &policy }).unwrap();
        assert_eq!(body["policy"]["bindings"][0]["members"][0], "user:b@example.com");
        assert!(body["policy"].get("etag").is_none());
        assert!(body["policy"]["bindings"][0].get("condition").is_none());
    }

    #[test]
    fn test_project_state_parsing() {
        let page: SearchProjectsResponse = serde_json::from_value(json!({
            "projects": [
                {"name": "projects/1", "parent": "folders/9", "state": "ACTIVE"},
                {"name": "projects/2", "parent": "folders/9", "state": "DELETE_REQUESTED"},
                {"name": "projects/3", "parent": "folders/9", "state": "PURGING"},
                {"name": "projects/4", "parent": "folders/9"}
            ],
            "nextPageToken": ""
        }))
        .unwrap();

        let states: Vec<ProjectState> = page.projects.iter().map(|p| p.state).collect();
        assert_eq!(
            states,
            vec![
                ProjectState::Active,
                ProjectState::DeleteRequested,
                ProjectState::Unknown,
                ProjectState::StateUnspecified,
            ]
        );
        assert!(page.projects[0].is_active());
        assert!(page.next_page().is_none());
    }

    #[test]
    fn test_folder_page_token() {
        let page: ListFoldersResponse = serde_json::from_value(json!({
            "folders": [{"name": "folders/1", "parent": "organizations/7", "displayName": "eng"}],
            "nextPageToken": "abc"
        }))
        .unwrap();
        assert_eq!(page.folders[0].display_name.as_deref(), Some("eng"));
        assert_eq!(page.next_page(), Some("abc"));

        let empty: ListFoldersResponse = serde_json::from_str("{}").unwrap();
        assert!(empty.folders.is_empty());
        assert!(empty.next_page().is_none());
    }
}
