//! In-memory implementation of `WorkflowStore`.
//!
//! This implementation is primarily intended for testing and development
//! purposes. All data is lost when the instance is dropped.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use greenlight_client::{ClientError, ClientResult, ListQuery, WorkflowStore};
use greenlight_model::{
    AssociationListResponse, AssociationPayload, WorkflowAssociation, WorkflowDetails,
    WorkflowListItem, WorkflowListResponse, WorkflowPayload,
};

/// In-memory workflow/association store with failure injection.
///
/// Failure flags make the next matching call fail with a synthetic API
/// error; `delay_visibility` makes `get_workflow` report not-found a fixed
/// number of times before the record becomes readable, mimicking
/// read-after-write lag.
#[derive(Debug, Clone, Default)]
pub struct InMemoryWorkflowStore {
    workflows: Arc<RwLock<HashMap<String, WorkflowDetails>>>,
    associations: Arc<RwLock<HashMap<String, WorkflowAssociation>>>,
    fail_add_association: Arc<RwLock<bool>>,
    fail_delete_association: Arc<RwLock<bool>>,
    fail_add_workflow: Arc<RwLock<bool>>,
    pending_not_found: Arc<RwLock<HashMap<String, u32>>>,
}

impl InMemoryWorkflowStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `add_association` call fail.
    pub async fn set_fail_add_association(&self, fail: bool) {
        *self.fail_add_association.write().await = fail;
    }

    /// Make every subsequent `delete_association` call fail.
    pub async fn set_fail_delete_association(&self, fail: bool) {
        *self.fail_delete_association.write().await = fail;
    }

    /// Make every subsequent `add_workflow` call fail.
    pub async fn set_fail_add_workflow(&self, fail: bool) {
        *self.fail_add_workflow.write().await = fail;
    }

    /// Report not-found for the next `times` reads of `id`.
    pub async fn delay_visibility(&self, id: &str, times: u32) {
        self.pending_not_found
            .write()
            .await
            .insert(id.to_string(), times);
    }

    /// Seed the store with an existing workflow.
    pub async fn insert_workflow(&self, details: WorkflowDetails) {
        self.workflows
            .write()
            .await
            .insert(details.id.clone(), details);
    }

    /// Seed the store with an existing association, bypassing the payload
    /// shape. Useful for operations outside the current registry.
    pub async fn insert_association(&self, association: WorkflowAssociation) {
        self.associations
            .write()
            .await
            .insert(association.id.clone(), association);
    }

    fn synthetic_failure(what: &str) -> ClientError {
        ClientError::Api {
            status: 500,
            message: format!("injected failure: {}", what),
        }
    }

    /// Minimal `attribute op value` matching for the fake: supports `eq`
    /// (exact) and `co` (substring) against quoted or bare operands.
    fn filter_parts(filter: &str) -> Option<(String, String, String)> {
        let mut parts = filter.splitn(3, ' ');
        let attribute = parts.next()?.to_string();
        let op = parts.next()?.to_string();
        let value = parts.next()?.trim_matches('"').to_string();
        Some((attribute, op, value))
    }

    fn matches(attribute_value: &str, op: &str, operand: &str) -> bool {
        match op {
            "eq" => attribute_value == operand,
            "co" => attribute_value.contains(operand),
            _ => false,
        }
    }
}

#[async_trait]
impl WorkflowStore for InMemoryWorkflowStore {
    async fn list_workflows(&self, query: &ListQuery) -> ClientResult<WorkflowListResponse> {
        let store = self.workflows.read().await;

        let mut matched: Vec<&WorkflowDetails> = store
            .values()
            .filter(|workflow| match &query.filter {
                Some(filter) => match Self::filter_parts(filter.as_str()) {
                    Some((attribute, op, operand)) if attribute == "name" => {
                        Self::matches(&workflow.name, &op, &operand)
                    }
                    _ => true,
                },
                None => true,
            })
            .collect();
        matched.sort_by(|a, b| a.name.cmp(&b.name));

        let total_results = matched.len();
        let offset = query.offset.unwrap_or(0).min(total_results);
        let end = query
            .limit
            .map(|limit| (offset + limit).min(total_results))
            .unwrap_or(total_results);

        let workflows: Vec<WorkflowListItem> = matched[offset..end]
            .iter()
            .map(|workflow| WorkflowListItem {
                id: workflow.id.clone(),
                name: workflow.name.clone(),
                description: workflow.description.clone(),
                engine: workflow.engine.clone(),
            })
            .collect();

        Ok(WorkflowListResponse {
            total_results,
            count: workflows.len(),
            workflows,
        })
    }

    async fn add_workflow(&self, payload: &WorkflowPayload) -> ClientResult<WorkflowDetails> {
        if *self.fail_add_workflow.read().await {
            return Err(Self::synthetic_failure("add_workflow"));
        }

        let details = WorkflowDetails {
            id: Uuid::new_v4().to_string(),
            name: payload.name.clone(),
            description: payload.description.clone(),
            engine: payload.engine.clone(),
            template: payload.template.clone(),
        };

        self.workflows
            .write()
            .await
            .insert(details.id.clone(), details.clone());

        Ok(details)
    }

    async fn get_workflow(&self, id: &str) -> ClientResult<WorkflowDetails> {
        {
            let mut pending = self.pending_not_found.write().await;
            if let Some(remaining) = pending.get_mut(id) {
                if *remaining > 0 {
                    *remaining -= 1;
                    return Err(ClientError::NotFound(format!("Workflow {}", id)));
                }
                pending.remove(id);
            }
        }

        let store = self.workflows.read().await;
        store
            .get(id)
            .cloned()
            .ok_or_else(|| ClientError::NotFound(format!("Workflow {}", id)))
    }

    async fn update_workflow(
        &self,
        id: &str,
        payload: &WorkflowPayload,
    ) -> ClientResult<WorkflowDetails> {
        let mut store = self.workflows.write().await;
        let existing = store
            .get_mut(id)
            .ok_or_else(|| ClientError::NotFound(format!("Workflow {}", id)))?;

        existing.name = payload.name.clone();
        existing.description = payload.description.clone();
        existing.engine = payload.engine.clone();
        existing.template = payload.template.clone();

        Ok(existing.clone())
    }

    async fn delete_workflow(&self, id: &str) -> ClientResult<()> {
        let mut store = self.workflows.write().await;
        store
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| ClientError::NotFound(format!("Workflow {}", id)))
    }

    async fn list_associations(&self, query: &ListQuery) -> ClientResult<AssociationListResponse> {
        let store = self.associations.read().await;

        let mut matched: Vec<WorkflowAssociation> = store
            .values()
            .filter(|association| match &query.filter {
                Some(filter) => match Self::filter_parts(filter.as_str()) {
                    Some((attribute, op, operand)) if attribute == "workflowId" => {
                        Self::matches(&association.workflow_id, &op, &operand)
                    }
                    Some((attribute, op, operand)) if attribute == "operation" => {
                        Self::matches(&association.operation, &op, &operand)
                    }
                    _ => true,
                },
                None => true,
            })
            .cloned()
            .collect();
        matched.sort_by(|a, b| a.id.cmp(&b.id));

        let total_results = matched.len();
        let offset = query.offset.unwrap_or(0).min(total_results);
        let end = query
            .limit
            .map(|limit| (offset + limit).min(total_results))
            .unwrap_or(total_results);
        let workflow_associations = matched[offset..end].to_vec();

        Ok(AssociationListResponse {
            total_results,
            count: workflow_associations.len(),
            workflow_associations,
        })
    }

    async fn add_association(
        &self,
        payload: &AssociationPayload,
    ) -> ClientResult<WorkflowAssociation> {
        if *self.fail_add_association.read().await {
            return Err(Self::synthetic_failure("add_association"));
        }

        let association = WorkflowAssociation {
            id: Uuid::new_v4().to_string(),
            association_name: payload.association_name.clone(),
            operation: payload.operation.as_str().to_string(),
            workflow_id: payload.workflow_id.clone(),
        };

        self.associations
            .write()
            .await
            .insert(association.id.clone(), association.clone());

        Ok(association)
    }

    async fn delete_association(&self, id: &str) -> ClientResult<()> {
        if *self.fail_delete_association.read().await {
            return Err(Self::synthetic_failure("delete_association"));
        }

        let mut store = self.associations.write().await;
        store
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| ClientError::NotFound(format!("Association {}", id)))
    }
}
