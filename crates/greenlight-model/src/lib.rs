//! Greenlight Workflow Model
//!
//! Wire types and invariants for multi-step approval workflows. A workflow
//! definition binds a named, ordered approval template to the system
//! operations it governs; each template step names the roles and users that
//! may approve it. This crate owns the canonical shapes and the pure
//! validation rules enforced before anything reaches the network.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

pub mod operations;
pub mod template;
pub mod validation;

pub use operations::WorkflowOperation;
pub use template::{build_template, steps_from_template, validate_steps, ApprovalStep, StepValidation};
pub use validation::{validate_description, validate_name, DescriptionValidationError, NameValidationError};

/// Template identifier understood by the backend workflow engine.
pub const MULTI_STEP_APPROVAL_TEMPLATE: &str = "MultiStepApprovalTemplate";

/// Execution engine identifier. Fixed by the client, not operator-editable.
pub const WORKFLOW_ENGINE: &str = "WorkflowEngine";

/// Role names that must never be offered as approvers.
pub const RESERVED_ROLE_NAMES: [&str; 3] = ["system", "everyone", "selfsignup"];

/// Name of the primary user store. Usernames without a domain prefix
/// belong to this store.
pub const PRIMARY_USER_STORE_DOMAIN: &str = "PRIMARY";

/// The kind of directory entity an approval step option refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Roles,
    Users,
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Roles => write!(f, "roles"),
            EntityKind::Users => write!(f, "users"),
        }
    }
}

/// One entity/values pair inside a template step. Present on the wire only
/// when `values` is non-empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepOption {
    pub entity: EntityKind,
    pub values: Vec<String>,
}

/// One approval step inside a persisted template. `step` is the 1-based
/// sequence number and always matches the step's array position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepDefinition {
    pub step: u32,
    pub options: Vec<StepOption>,
}

/// The approval template carried by a workflow definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowTemplate {
    pub name: String,
    pub steps: Vec<StepDefinition>,
}

/// Request body for creating or updating a workflow definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowPayload {
    pub name: String,
    pub description: String,
    pub engine: String,
    pub template: WorkflowTemplate,
}

/// A persisted workflow definition as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowDetails {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub engine: String,
    pub template: WorkflowTemplate,
}

/// Summary row in a workflow list response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowListItem {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub engine: String,
}

/// Envelope for `GET /workflows`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowListResponse {
    pub total_results: usize,
    pub count: usize,
    #[serde(default)]
    pub workflows: Vec<WorkflowListItem>,
}

/// A persisted link between a workflow definition and one system operation.
///
/// The operation value is kept as the raw wire string so that associations
/// created against operations outside the current registry still take part
/// in reconciliation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowAssociation {
    pub id: String,
    pub association_name: String,
    pub operation: String,
    pub workflow_id: String,
}

impl WorkflowAssociation {
    /// Map the raw operation value onto the registry, if it is a known one.
    pub fn known_operation(&self) -> Option<WorkflowOperation> {
        WorkflowOperation::parse(&self.operation)
    }
}

/// Request body for creating a workflow association.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssociationPayload {
    pub association_name: String,
    pub operation: WorkflowOperation,
    pub workflow_id: String,
}

impl AssociationPayload {
    /// Build the payload for binding `operation` to `workflow_id`, deriving
    /// the human-readable association name.
    pub fn for_operation(workflow_id: &str, operation: WorkflowOperation) -> Self {
        Self {
            association_name: operation.association_name(),
            operation,
            workflow_id: workflow_id.to_string(),
        }
    }
}

/// Envelope for `GET /workflow-associations`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssociationListResponse {
    pub total_results: usize,
    pub count: usize,
    #[serde(default)]
    pub workflow_associations: Vec<WorkflowAssociation>,
}

/// A role as surfaced by the role directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleSummary {
    pub id: String,
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audience: Option<RoleAudience>,
}

/// Audience a role is scoped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoleAudience {
    Application,
    Organization,
}

impl Display for RoleAudience {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoleAudience::Application => write!(f, "Application"),
            RoleAudience::Organization => write!(f, "Organization"),
        }
    }
}

/// A user as surfaced by the user directory. `user_name` may carry a
/// `DOMAIN/` prefix naming its user store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: String,
    pub user_name: String,
}

impl UserSummary {
    /// Whether this user belongs to the given user store domain. A username
    /// without a domain prefix belongs to the primary store; otherwise the
    /// prefix is compared case-insensitively.
    pub fn belongs_to_domain(&self, domain: &str) -> bool {
        match self.user_name.split_once('/') {
            Some((prefix, _)) => prefix.eq_ignore_ascii_case(domain),
            None => domain.eq_ignore_ascii_case(PRIMARY_USER_STORE_DOMAIN),
        }
    }
}

/// A user store domain users can be scoped to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStoreSummary {
    pub id: String,
    pub name: String,
}
