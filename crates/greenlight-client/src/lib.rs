//! Greenlight Client
//!
//! Async REST client for the workflow backend. The `WorkflowStore` trait is
//! the contract the console orchestrates against; `HttpWorkflowClient` is
//! the production implementation. Role and user lookups go through the
//! `RoleDirectory`/`UserDirectory` seams so that search and pre-selection
//! logic never depend on a live directory service.

use async_trait::async_trait;
use std::fmt::Debug;

use greenlight_model::{
    AssociationListResponse, AssociationPayload, RoleAudience, RoleSummary, UserStoreSummary,
    UserSummary, WorkflowAssociation, WorkflowDetails, WorkflowListResponse, WorkflowPayload,
};

pub mod directory;
pub mod error;
pub mod filter;
pub mod http;

pub use directory::{HttpRoleDirectory, HttpUserDirectory};
pub use error::{ClientError, ClientResult};
pub use filter::FilterExpression;
pub use http::HttpWorkflowClient;

/// Paging and filtering for list endpoints.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListQuery {
    pub limit: Option<usize>,
    pub offset: Option<usize>,
    pub filter: Option<FilterExpression>,
}

impl ListQuery {
    /// Everything, unpaged and unfiltered.
    pub fn all() -> Self {
        Self::default()
    }

    /// Everything matching `filter`, unpaged.
    pub fn filtered(filter: FilterExpression) -> Self {
        Self {
            filter: Some(filter),
            ..Self::default()
        }
    }

    /// One page of results.
    pub fn page(limit: usize, offset: usize) -> Self {
        Self {
            limit: Some(limit),
            offset: Some(offset),
            filter: None,
        }
    }

    pub fn with_filter(mut self, filter: FilterExpression) -> Self {
        self.filter = Some(filter);
        self
    }
}

/// Contract for the workflow/association backend.
#[async_trait]
pub trait WorkflowStore: Send + Sync + Debug {
    /// `GET /workflows`
    async fn list_workflows(&self, query: &ListQuery) -> ClientResult<WorkflowListResponse>;

    /// `POST /workflows`
    async fn add_workflow(&self, payload: &WorkflowPayload) -> ClientResult<WorkflowDetails>;

    /// `GET /workflows/{id}`
    async fn get_workflow(&self, id: &str) -> ClientResult<WorkflowDetails>;

    /// `PUT /workflows/{id}`
    async fn update_workflow(
        &self,
        id: &str,
        payload: &WorkflowPayload,
    ) -> ClientResult<WorkflowDetails>;

    /// `DELETE /workflows/{id}`
    async fn delete_workflow(&self, id: &str) -> ClientResult<()>;

    /// `GET /workflow-associations`
    async fn list_associations(&self, query: &ListQuery) -> ClientResult<AssociationListResponse>;

    /// `POST /workflow-associations`
    async fn add_association(
        &self,
        payload: &AssociationPayload,
    ) -> ClientResult<WorkflowAssociation>;

    /// `DELETE /workflow-associations/{id}`
    async fn delete_association(&self, id: &str) -> ClientResult<()>;
}

/// Read side of the role directory.
#[async_trait]
pub trait RoleDirectory: Send + Sync + Debug {
    /// Search roles by display name, optionally narrowed to an audience.
    /// Reserved role names are never returned.
    async fn search_roles(
        &self,
        query: &str,
        audience: Option<RoleAudience>,
    ) -> ClientResult<Vec<RoleSummary>>;

    /// Fetch a single role by id.
    async fn get_role(&self, id: &str) -> ClientResult<RoleSummary>;
}

/// Read side of the user directory.
#[async_trait]
pub trait UserDirectory: Send + Sync + Debug {
    /// Search users by username, optionally scoped to a user store domain.
    async fn search_users(
        &self,
        query: &str,
        domain: Option<&str>,
    ) -> ClientResult<Vec<UserSummary>>;

    /// Fetch a single user by id.
    async fn get_user(&self, id: &str) -> ClientResult<UserSummary>;

    /// List the available user store domains.
    async fn list_user_stores(&self) -> ClientResult<Vec<UserStoreSummary>>;
}
