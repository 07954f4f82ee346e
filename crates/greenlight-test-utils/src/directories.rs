//! Static role/user directories for tests.

use async_trait::async_trait;

use greenlight_client::{ClientError, ClientResult, RoleDirectory, UserDirectory};
use greenlight_model::{
    RoleAudience, RoleSummary, UserStoreSummary, UserSummary, PRIMARY_USER_STORE_DOMAIN,
    RESERVED_ROLE_NAMES,
};

/// Role directory backed by a fixed list.
#[derive(Debug, Clone, Default)]
pub struct StaticRoleDirectory {
    roles: Vec<RoleSummary>,
}

impl StaticRoleDirectory {
    pub fn new(roles: Vec<RoleSummary>) -> Self {
        Self { roles }
    }
}

#[async_trait]
impl RoleDirectory for StaticRoleDirectory {
    async fn search_roles(
        &self,
        query: &str,
        audience: Option<RoleAudience>,
    ) -> ClientResult<Vec<RoleSummary>> {
        Ok(self
            .roles
            .iter()
            .filter(|role| {
                !RESERVED_ROLE_NAMES
                    .iter()
                    .any(|reserved| role.display_name.eq_ignore_ascii_case(reserved))
            })
            .filter(|role| query.is_empty() || role.display_name.contains(query))
            .filter(|role| audience.is_none() || role.audience == audience)
            .cloned()
            .collect())
    }

    async fn get_role(&self, id: &str) -> ClientResult<RoleSummary> {
        self.roles
            .iter()
            .find(|role| role.id == id)
            .cloned()
            .ok_or_else(|| ClientError::NotFound(format!("Role {}", id)))
    }
}

/// User directory backed by a fixed list. Always exposes the primary user
/// store plus any extra domains configured.
#[derive(Debug, Clone, Default)]
pub struct StaticUserDirectory {
    users: Vec<UserSummary>,
    extra_user_stores: Vec<String>,
}

impl StaticUserDirectory {
    pub fn new(users: Vec<UserSummary>) -> Self {
        Self {
            users,
            extra_user_stores: Vec::new(),
        }
    }

    pub fn with_user_stores(mut self, domains: Vec<String>) -> Self {
        self.extra_user_stores = domains;
        self
    }
}

#[async_trait]
impl UserDirectory for StaticUserDirectory {
    async fn search_users(
        &self,
        query: &str,
        domain: Option<&str>,
    ) -> ClientResult<Vec<UserSummary>> {
        Ok(self
            .users
            .iter()
            .filter(|user| query.is_empty() || user.user_name.contains(query))
            .filter(|user| domain.map_or(true, |domain| user.belongs_to_domain(domain)))
            .cloned()
            .collect())
    }

    async fn get_user(&self, id: &str) -> ClientResult<UserSummary> {
        self.users
            .iter()
            .find(|user| user.id == id)
            .cloned()
            .ok_or_else(|| ClientError::NotFound(format!("User {}", id)))
    }

    async fn list_user_stores(&self) -> ClientResult<Vec<UserStoreSummary>> {
        let mut stores = vec![UserStoreSummary {
            id: PRIMARY_USER_STORE_DOMAIN.to_string(),
            name: PRIMARY_USER_STORE_DOMAIN.to_string(),
        }];
        stores.extend(self.extra_user_stores.iter().map(|domain| UserStoreSummary {
            id: domain.clone(),
            name: domain.clone(),
        }));
        Ok(stores)
    }
}
