//! HTTP implementation of the workflow backend contract.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::{debug, info};

use greenlight_model::{
    AssociationListResponse, AssociationPayload, WorkflowAssociation, WorkflowDetails,
    WorkflowListResponse, WorkflowPayload,
};

use crate::error::{error_from_response, ClientError, ClientResult};
use crate::{ListQuery, WorkflowStore};

/// Request timeout applied to every call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Reqwest-backed `WorkflowStore`.
#[derive(Debug, Clone)]
pub struct HttpWorkflowClient {
    /// Base URL of the workflow API, without a trailing slash
    base_url: String,

    /// HTTP client
    client: Client,
}

impl HttpWorkflowClient {
    /// Create a new client against `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .default_headers(headers)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Get the URL for the workflow collection
    fn workflows_url(&self) -> String {
        format!("{}/workflows", self.base_url)
    }

    /// Get the URL for a specific workflow
    fn workflow_url(&self, id: &str) -> String {
        format!("{}/{}", self.workflows_url(), id)
    }

    /// Get the URL for the association collection
    fn associations_url(&self) -> String {
        format!("{}/workflow-associations", self.base_url)
    }

    /// Get the URL for a specific association
    fn association_url(&self, id: &str) -> String {
        format!("{}/{}", self.associations_url(), id)
    }

    /// Render a list query as query-string pairs.
    fn query_params(query: &ListQuery) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(limit) = query.limit {
            params.push(("limit", limit.to_string()));
        }
        if let Some(offset) = query.offset {
            params.push(("offset", offset.to_string()));
        }
        if let Some(filter) = &query.filter {
            params.push(("filter", filter.to_string()));
        }
        params
    }
}

#[async_trait]
impl WorkflowStore for HttpWorkflowClient {
    async fn list_workflows(&self, query: &ListQuery) -> ClientResult<WorkflowListResponse> {
        debug!(?query, "Listing workflows");

        let response = self
            .client
            .get(self.workflows_url())
            .query(&Self::query_params(query))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        Ok(response.json().await?)
    }

    async fn add_workflow(&self, payload: &WorkflowPayload) -> ClientResult<WorkflowDetails> {
        info!(name = %payload.name, "Creating workflow");

        let response = self
            .client
            .post(self.workflows_url())
            .json(payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        Ok(response.json().await?)
    }

    async fn get_workflow(&self, id: &str) -> ClientResult<WorkflowDetails> {
        debug!(%id, "Fetching workflow");

        let response = self.client.get(self.workflow_url(id)).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(ClientError::NotFound(format!("Workflow {}", id)));
        }
        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        Ok(response.json().await?)
    }

    async fn update_workflow(
        &self,
        id: &str,
        payload: &WorkflowPayload,
    ) -> ClientResult<WorkflowDetails> {
        info!(%id, name = %payload.name, "Updating workflow");

        let response = self
            .client
            .put(self.workflow_url(id))
            .json(payload)
            .send()
            .await?;

        // Anything other than 200 is a failed update.
        if response.status() != StatusCode::OK {
            return Err(error_from_response(response).await);
        }

        Ok(response.json().await?)
    }

    async fn delete_workflow(&self, id: &str) -> ClientResult<()> {
        info!(%id, "Deleting workflow");

        let response = self.client.delete(self.workflow_url(id)).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(ClientError::NotFound(format!("Workflow {}", id)));
        }
        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        Ok(())
    }

    async fn list_associations(&self, query: &ListQuery) -> ClientResult<AssociationListResponse> {
        debug!(?query, "Listing workflow associations");

        let response = self
            .client
            .get(self.associations_url())
            .query(&Self::query_params(query))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        Ok(response.json().await?)
    }

    async fn add_association(
        &self,
        payload: &AssociationPayload,
    ) -> ClientResult<WorkflowAssociation> {
        info!(
            operation = %payload.operation,
            workflow_id = %payload.workflow_id,
            "Creating workflow association"
        );

        let response = self
            .client
            .post(self.associations_url())
            .json(payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        Ok(response.json().await?)
    }

    async fn delete_association(&self, id: &str) -> ClientResult<()> {
        info!(%id, "Deleting workflow association");

        let response = self.client.delete(self.association_url(id)).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(ClientError::NotFound(format!("Association {}", id)));
        }
        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        Ok(())
    }
}
