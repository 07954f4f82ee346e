//! HTTP role and user directory clients.
//!
//! Directories are opaque collaborators: paginated resource collections
//! filtered by query-string predicates. Reserved role names are filtered
//! out here so no caller can offer them as approvers.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use greenlight_model::{
    RoleAudience, RoleSummary, UserStoreSummary, UserSummary, RESERVED_ROLE_NAMES,
};

use crate::error::{error_from_response, ClientError, ClientResult};
use crate::filter::FilterExpression;
use crate::{RoleDirectory, UserDirectory};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

fn directory_client() -> Client {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

    Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .default_headers(headers)
        .build()
        .expect("Failed to create HTTP client")
}

/// Envelope for role list responses.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RoleListResponse {
    #[serde(default)]
    roles: Vec<RoleSummary>,
}

/// Envelope for user list responses.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserListResponse {
    #[serde(default)]
    users: Vec<UserSummary>,
}

/// Envelope for user store list responses.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserStoreListResponse {
    #[serde(default)]
    user_stores: Vec<UserStoreSummary>,
}

fn is_reserved_role(role: &RoleSummary) -> bool {
    RESERVED_ROLE_NAMES
        .iter()
        .any(|reserved| role.display_name.eq_ignore_ascii_case(reserved))
}

/// Role directory over HTTP.
#[derive(Debug, Clone)]
pub struct HttpRoleDirectory {
    base_url: String,
    client: Client,
}

impl HttpRoleDirectory {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: directory_client(),
        }
    }

    fn roles_url(&self) -> String {
        format!("{}/roles", self.base_url)
    }

    fn role_url(&self, id: &str) -> String {
        format!("{}/{}", self.roles_url(), id)
    }

    /// Combine the name predicate and the audience predicate when both are
    /// present; either alone otherwise.
    fn search_filter(query: &str, audience: Option<RoleAudience>) -> Option<FilterExpression> {
        let name = (!query.is_empty())
            .then(|| FilterExpression::contains("displayName", query));
        let audience = audience
            .map(|audience| FilterExpression::eq_str("audience.type", &audience.to_string()));

        match (name, audience) {
            (Some(name), Some(audience)) => Some(name.and(audience)),
            (Some(name), None) => Some(name),
            (None, Some(audience)) => Some(audience),
            (None, None) => None,
        }
    }
}

#[async_trait]
impl RoleDirectory for HttpRoleDirectory {
    async fn search_roles(
        &self,
        query: &str,
        audience: Option<RoleAudience>,
    ) -> ClientResult<Vec<RoleSummary>> {
        debug!(%query, ?audience, "Searching roles");

        let mut request = self.client.get(self.roles_url());
        if let Some(filter) = Self::search_filter(query, audience) {
            request = request.query(&[("filter", filter.to_string())]);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let listing: RoleListResponse = response.json().await?;
        Ok(listing
            .roles
            .into_iter()
            .filter(|role| !is_reserved_role(role))
            .collect())
    }

    async fn get_role(&self, id: &str) -> ClientResult<RoleSummary> {
        debug!(%id, "Fetching role");

        let response = self.client.get(self.role_url(id)).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(ClientError::NotFound(format!("Role {}", id)));
        }
        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        Ok(response.json().await?)
    }
}

/// User directory over HTTP.
#[derive(Debug, Clone)]
pub struct HttpUserDirectory {
    base_url: String,
    client: Client,
}

impl HttpUserDirectory {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: directory_client(),
        }
    }

    fn users_url(&self) -> String {
        format!("{}/users", self.base_url)
    }

    fn user_url(&self, id: &str) -> String {
        format!("{}/{}", self.users_url(), id)
    }

    fn user_stores_url(&self) -> String {
        format!("{}/user-stores", self.base_url)
    }
}

#[async_trait]
impl UserDirectory for HttpUserDirectory {
    async fn search_users(
        &self,
        query: &str,
        domain: Option<&str>,
    ) -> ClientResult<Vec<UserSummary>> {
        debug!(%query, ?domain, "Searching users");

        let mut request = self.client.get(self.users_url());
        if !query.is_empty() {
            let filter = FilterExpression::contains("userName", query);
            request = request.query(&[("filter", filter.to_string())]);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let listing: UserListResponse = response.json().await?;
        let users = match domain {
            Some(domain) => listing
                .users
                .into_iter()
                .filter(|user| user.belongs_to_domain(domain))
                .collect(),
            None => listing.users,
        };

        Ok(users)
    }

    async fn get_user(&self, id: &str) -> ClientResult<UserSummary> {
        debug!(%id, "Fetching user");

        let response = self.client.get(self.user_url(id)).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(ClientError::NotFound(format!("User {}", id)));
        }
        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        Ok(response.json().await?)
    }

    async fn list_user_stores(&self) -> ClientResult<Vec<UserStoreSummary>> {
        debug!("Listing user stores");

        let response = self.client.get(self.user_stores_url()).send().await?;
        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let listing: UserStoreListResponse = response.json().await?;
        Ok(listing.user_stores)
    }
}
