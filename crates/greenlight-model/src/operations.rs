//! The closed set of system operations a workflow can govern.
//!
//! Every place that needs the operation catalogue (selector options,
//! association payloads, reconciliation) goes through this registry rather
//! than carrying its own literals.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

/// A system operation type that can be placed under approval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorkflowOperation {
    #[serde(rename = "ADD_USER")]
    AddUser,
    #[serde(rename = "DELETE_USER")]
    DeleteUser,
    #[serde(rename = "ADD_ROLE")]
    AddRole,
    #[serde(rename = "DELETE_ROLE")]
    DeleteRole,
    #[serde(rename = "UPDATE_ROLES_OF_USERS")]
    UpdateRolesOfUsers,
    #[serde(rename = "UPDATE_USERS_OF_ROLES")]
    UpdateUsersOfRoles,
}

impl WorkflowOperation {
    /// Every selectable operation, in presentation order.
    pub const ALL: [WorkflowOperation; 6] = [
        WorkflowOperation::AddUser,
        WorkflowOperation::DeleteUser,
        WorkflowOperation::AddRole,
        WorkflowOperation::DeleteRole,
        WorkflowOperation::UpdateRolesOfUsers,
        WorkflowOperation::UpdateUsersOfRoles,
    ];

    /// The wire value used by the association endpoints.
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowOperation::AddUser => "ADD_USER",
            WorkflowOperation::DeleteUser => "DELETE_USER",
            WorkflowOperation::AddRole => "ADD_ROLE",
            WorkflowOperation::DeleteRole => "DELETE_ROLE",
            WorkflowOperation::UpdateRolesOfUsers => "UPDATE_ROLES_OF_USERS",
            WorkflowOperation::UpdateUsersOfRoles => "UPDATE_USERS_OF_ROLES",
        }
    }

    /// Human-readable label for selector options.
    pub fn label(&self) -> &'static str {
        match self {
            WorkflowOperation::AddUser => "Create User",
            WorkflowOperation::DeleteUser => "Delete User",
            WorkflowOperation::AddRole => "Create Role",
            WorkflowOperation::DeleteRole => "Delete Role",
            WorkflowOperation::UpdateRolesOfUsers => "Update Roles of Users",
            WorkflowOperation::UpdateUsersOfRoles => "Add/Remove Role Members",
        }
    }

    /// Derived name for the association record binding this operation.
    pub fn association_name(&self) -> String {
        format!("Association for {}", self.as_str())
    }

    /// Look up a wire value in the registry.
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|op| op.as_str() == value)
    }
}

impl Display for WorkflowOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
