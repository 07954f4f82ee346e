//! Operation binding: reconciliation of workflow associations.
//!
//! The selected operation set is reconciled against the associations the
//! server already holds by set-difference on the operation value. Applying
//! a plan issues independent create/delete calls; one failure never rolls
//! back the others. Idempotence across repeats requires the caller to
//! refresh the previous associations from the server before reconciling
//! again, never from stale local state.

use futures::future::join_all;
use tracing::{debug, warn};

use greenlight_client::{ClientError, ClientResult, FilterExpression, ListQuery, WorkflowStore};
use greenlight_model::{AssociationPayload, WorkflowAssociation, WorkflowOperation};

/// Adds and removes needed to make the server match the selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcilePlan {
    /// Operations selected but not yet associated.
    pub to_add: Vec<WorkflowOperation>,
    /// Association ids whose operation is no longer selected.
    pub to_remove: Vec<String>,
}

impl ReconcilePlan {
    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }
}

/// Diff the current selection against the previously persisted
/// associations.
pub fn reconcile(
    previous: &[WorkflowAssociation],
    selection: &[WorkflowOperation],
) -> ReconcilePlan {
    let mut to_add = Vec::new();
    for operation in selection {
        let already_bound = previous
            .iter()
            .any(|association| association.operation == operation.as_str());
        if !already_bound && !to_add.contains(operation) {
            to_add.push(*operation);
        }
    }

    let to_remove = previous
        .iter()
        .filter(|association| {
            !selection
                .iter()
                .any(|operation| association.operation == operation.as_str())
        })
        .map(|association| association.id.clone())
        .collect();

    ReconcilePlan { to_add, to_remove }
}

/// What actually happened when a plan was applied.
#[derive(Debug, Default)]
pub struct ReconcileOutcome {
    pub added: Vec<WorkflowAssociation>,
    pub removed: Vec<String>,
    pub failed_adds: Vec<(WorkflowOperation, ClientError)>,
    pub failed_removes: Vec<(String, ClientError)>,
}

impl ReconcileOutcome {
    /// Whether every planned call succeeded.
    pub fn fully_applied(&self) -> bool {
        self.failed_adds.is_empty() && self.failed_removes.is_empty()
    }
}

/// Fetch the associations currently persisted for a workflow.
pub async fn fetch_associations(
    store: &dyn WorkflowStore,
    workflow_id: &str,
) -> ClientResult<Vec<WorkflowAssociation>> {
    let query = ListQuery::filtered(FilterExpression::eq("workflowId", workflow_id));
    let listing = store.list_associations(&query).await?;
    Ok(listing.workflow_associations)
}

/// Apply a reconciliation plan against the store.
///
/// Creates and deletes run concurrently; each call succeeds or fails on
/// its own and failures are collected per item.
pub async fn apply_reconciliation(
    store: &dyn WorkflowStore,
    workflow_id: &str,
    plan: &ReconcilePlan,
) -> ReconcileOutcome {
    debug!(
        %workflow_id,
        adds = plan.to_add.len(),
        removes = plan.to_remove.len(),
        "Applying association reconciliation"
    );

    let mut outcome = ReconcileOutcome::default();

    let adds = join_all(plan.to_add.iter().map(|operation| {
        let payload = AssociationPayload::for_operation(workflow_id, *operation);
        async move { store.add_association(&payload).await }
    }))
    .await;

    for (operation, result) in plan.to_add.iter().zip(adds) {
        match result {
            Ok(association) => outcome.added.push(association),
            Err(err) => {
                warn!(%workflow_id, operation = %operation, %err, "Failed to create association");
                outcome.failed_adds.push((*operation, err));
            }
        }
    }

    let removes = join_all(
        plan.to_remove
            .iter()
            .map(|id| async move { store.delete_association(id).await }),
    )
    .await;

    for (id, result) in plan.to_remove.iter().zip(removes) {
        match result {
            Ok(()) => outcome.removed.push(id.clone()),
            Err(err) => {
                warn!(%workflow_id, association_id = %id, %err, "Failed to delete association");
                outcome.failed_removes.push((id.clone(), err));
            }
        }
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;

    fn association(id: &str, operation: &str) -> WorkflowAssociation {
        WorkflowAssociation {
            id: id.to_string(),
            association_name: format!("Association for {}", operation),
            operation: operation.to_string(),
            workflow_id: "wf-1".to_string(),
        }
    }

    #[test]
    fn reconcile_computes_set_difference() {
        let previous = vec![
            association("assoc-a", "ADD_USER"),
            association("assoc-b", "DELETE_USER"),
        ];
        let selection = vec![WorkflowOperation::DeleteUser, WorkflowOperation::AddRole];

        let plan = reconcile(&previous, &selection);

        assert_eq!(plan.to_add, vec![WorkflowOperation::AddRole]);
        assert_eq!(plan.to_remove, vec!["assoc-a".to_string()]);
    }

    #[test]
    fn reconcile_is_idempotent_after_refresh() {
        // The refreshed server state already matches the selection.
        let previous = vec![
            association("assoc-b", "DELETE_USER"),
            association("assoc-c", "ADD_ROLE"),
        ];
        let selection = vec![WorkflowOperation::DeleteUser, WorkflowOperation::AddRole];

        let plan = reconcile(&previous, &selection);
        assert!(plan.is_empty());
    }

    #[test]
    fn unknown_previous_operations_are_removed_when_deselected() {
        let previous = vec![association("assoc-x", "LEGACY_OP")];
        let plan = reconcile(&previous, &[WorkflowOperation::AddUser]);

        assert_eq!(plan.to_add, vec![WorkflowOperation::AddUser]);
        assert_eq!(plan.to_remove, vec!["assoc-x".to_string()]);
    }

    #[test]
    fn duplicate_selection_entries_produce_one_add() {
        let plan = reconcile(
            &[],
            &[WorkflowOperation::AddUser, WorkflowOperation::AddUser],
        );
        assert_eq!(plan.to_add, vec![WorkflowOperation::AddUser]);
    }
}
