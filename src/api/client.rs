//! HTTP client for the Cloud Resource Manager REST API
//!
//! Folder listing and folder IAM use the v2 surface; project search uses v3.

use crate::api::types::{
    ErrorEnvelope, GetIamPolicyRequest, ListFoldersResponse, Policy, SearchProjectsResponse,
    SetIamPolicyRequest,
};
use crate::api::ResourceManager;
use crate::auth::{AccessToken, CredentialChain};
use crate::config::Config;
use crate::errors::{CrmError, Result};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Authenticated Resource Manager client
pub struct HttpResourceManager {
    client: Client,
    base_url: String,
    token: AccessToken,
}

impl HttpResourceManager {
    /// Build a client with an already resolved token
    pub fn new(base_url: impl Into<String>, token: AccessToken, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
        })
    }

    /// Resolve Application Default Credentials and build a client
    pub async fn connect(config: &Config) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.api.timeout_secs))
            .build()?;

        let token = CredentialChain::from_config(&config.auth).resolve(&http).await?;
        token.ensure_fresh(Utc::now())?;
        tracing::info!(source = %token.source, endpoint = config.endpoint(), "authenticated");

        Ok(Self {
            client: http,
            base_url: config.endpoint().to_string(),
            token,
        })
    }

    fn folders_url(&self) -> String {
        format!("{}/v2/folders", self.base_url)
    }

    /// `{base}/v2/{resource}:{method}`
    fn resource_method_url(&self, resource: &str, method: &str) -> String {
        format!("{}/v2/{}:{}", self.base_url, resource, method)
    }

    fn projects_search_url(&self) -> String {
        format!("{}/v3/projects:search", self.base_url)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        self.token.ensure_fresh(Utc::now())?;
        let response = request
            .header(reqwest::header::AUTHORIZATION, self.token.bearer())
            .send()
            .await?;

        decode(response).await
    }
}

/// Turn a response into `T`, or into `CrmError::Api` for non-success statuses
async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        return Err(api_error(status.as_u16(), &body));
    }

    Ok(serde_json::from_str(&body)?)
}

fn api_error(code: u16, body: &str) -> CrmError {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => CrmError::Api {
            code: if envelope.error.code == 0 { code } else { envelope.error.code },
            status: envelope.error.status,
            message: envelope.error.message,
        },
        Err(_) => CrmError::Api {
            code,
            status: String::new(),
            message: body.trim().to_string(),
        },
    }
}

#[async_trait]
impl ResourceManager for HttpResourceManager {
    async fn list_folders(&self, parent: &str, page_token: Option<&str>) -> Result<ListFoldersResponse> {
        let mut query: Vec<(&str, &str)> = vec![("parent", parent)];
        if let Some(token) = page_token {
            query.push(("pageToken", token));
        }

        tracing::debug!(parent, ?page_token, "folders.list");
        let request = self.client.get(self.folders_url()).query(&query);
        self.send(request).await
    }

    async fn get_folder_iam_policy(&self, folder: &str) -> Result<Policy> {
        tracing::debug!(folder, "folders.getIamPolicy");
        let request = self
            .client
            .post(self.resource_method_url(folder, "getIamPolicy"))
            .json(&GetIamPolicyRequest::default());
        self.send(request).await
    }

    async fn set_folder_iam_policy(&self, folder: &str, policy: &Policy) -> Result<Policy> {
        tracing::debug!(folder, bindings = policy.bindings.len(), "folders.setIamPolicy");
        let request = self
            .client
            .post(self.resource_method_url(folder, "setIamPolicy"))
            .json(&SetIamPolicyRequest { policy });
        self.send(request).await
    }

    async fn search_projects(&self, query: Option<&str>, page_token: Option<&str>) -> Result<SearchProjectsResponse> {
        let mut params: Vec<(&str, &str)> = Vec::new();
        if let Some(q) = query {
            params.push(("query", q));
        }
        if let Some(token) = page_token {
            params.push(("pageToken", token));
        }

        tracing::debug!(?query, ?page_token, "projects.search");
        let request = self.client.get(self.projects_search_url()).query(&params);
        self.send(request).await
    }
}
