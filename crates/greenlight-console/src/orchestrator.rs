//! Create and edit flows for approval workflows.
//!
//! The create flow is a strict linear wizard: general details, then
//! operations, then configuration, then one submit that creates the
//! workflow and binds its operations. The edit flow is a session over an
//! existing workflow where a single update re-submits whatever changed.
//! Deletion is gated behind an explicit confirmation acknowledgement.

use std::fmt::{self, Display};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use greenlight_client::{FilterExpression, ListQuery, WorkflowStore};
use greenlight_model::{
    build_template, steps_from_template, validate_description, validate_name, validate_steps,
    ApprovalStep, WorkflowDetails, WorkflowOperation, WorkflowPayload, WORKFLOW_ENGINE,
};

use crate::associations::{apply_reconciliation, fetch_associations, reconcile, ReconcileOutcome};
use crate::error::{ConsoleError, ConsoleResult};
use crate::notifications::{Notification, NotificationSink};

/// Bounded retry for reading a just-created workflow back, covering the
/// backend's read-after-write window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total read attempts.
    pub attempts: u32,
    /// Fixed delay between attempts.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 5,
            delay: Duration::from_secs(2),
        }
    }
}

/// Values of the general details form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneralDetails {
    pub name: String,
    pub description: String,
}

/// Proof that the operator explicitly confirmed a destructive action.
///
/// Not `Default`, not `Clone`: the only way to obtain one is
/// `acknowledge()`, called from the confirmation dialog's primary action.
#[derive(Debug)]
pub struct DeleteConfirmation {
    _ack: (),
}

impl DeleteConfirmation {
    pub fn acknowledge() -> Self {
        Self { _ack: () }
    }
}

/// Stage of the create wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardStage {
    GeneralDetails,
    Operations,
    Configuration,
    Submit,
}

impl Display for WizardStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WizardStage::GeneralDetails => write!(f, "general details"),
            WizardStage::Operations => write!(f, "operations"),
            WizardStage::Configuration => write!(f, "configuration"),
            WizardStage::Submit => write!(f, "submit"),
        }
    }
}

/// Entry point for the administrative flows.
#[derive(Debug, Clone)]
pub struct WorkflowConsole {
    store: Arc<dyn WorkflowStore>,
    sink: Arc<dyn NotificationSink>,
    retry: RetryPolicy,
}

impl WorkflowConsole {
    pub fn new(
        store: Arc<dyn WorkflowStore>,
        sink: Arc<dyn NotificationSink>,
        retry: RetryPolicy,
    ) -> Self {
        Self { store, sink, retry }
    }

    /// Start the create wizard.
    pub fn begin_create(&self) -> CreateWorkflowWizard {
        CreateWorkflowWizard {
            store: self.store.clone(),
            sink: self.sink.clone(),
            stage: WizardStage::GeneralDetails,
            general: GeneralDetails::default(),
            operations: Vec::new(),
            steps: Vec::new(),
        }
    }

    /// Open an edit session for an existing workflow.
    ///
    /// The read retries on not-found, so a session can be opened right
    /// after the create flow hands off the new id.
    pub async fn open_edit(&self, workflow_id: &str) -> ConsoleResult<EditWorkflowSession> {
        let details = self.fetch_workflow_with_retry(workflow_id).await?;
        let associations = fetch_associations(self.store.as_ref(), workflow_id).await?;

        let initial_operations = associations
            .iter()
            .filter_map(|association| association.known_operation())
            .collect();

        Ok(EditWorkflowSession {
            store: self.store.clone(),
            sink: self.sink.clone(),
            workflow_id: details.id.clone(),
            engine: details.engine.clone(),
            initial_general: GeneralDetails {
                name: details.name.clone(),
                description: details.description.clone(),
            },
            initial_steps: steps_from_template(&details.template),
            initial_operations,
        })
    }

    /// Validate a candidate name against the live workflow list.
    pub async fn validate_candidate_name(
        &self,
        candidate: &str,
        exclude_id: Option<&str>,
    ) -> ConsoleResult<()> {
        let existing = if candidate.is_empty() {
            Vec::new()
        } else {
            let query =
                ListQuery::filtered(FilterExpression::contains("name", candidate));
            self.store.list_workflows(&query).await?.workflows
        };

        validate_name(candidate, &existing, exclude_id)?;
        Ok(())
    }

    /// Delete a workflow. Callable only with an acknowledged confirmation.
    pub async fn delete_workflow(
        &self,
        workflow_id: &str,
        _confirmation: DeleteConfirmation,
    ) -> ConsoleResult<()> {
        match self.store.delete_workflow(workflow_id).await {
            Ok(()) => {
                info!(%workflow_id, "Workflow deleted");
                self.sink.notify(Notification::success(
                    "Workflow deleted",
                    "The approval workflow was removed.",
                ));
                Ok(())
            }
            Err(err) => {
                self.sink.notify(Notification::error(
                    "Could not delete workflow",
                    err.to_string(),
                ));
                Err(err.into())
            }
        }
    }

    /// Re-run association reconciliation for a workflow against its
    /// desired operation set.
    ///
    /// Always refreshes the persisted associations first, so repeating
    /// after a partial failure neither recreates existing associations nor
    /// deletes already-deleted ones.
    pub async fn retry_associations(
        &self,
        workflow_id: &str,
        desired: &[WorkflowOperation],
    ) -> ConsoleResult<ReconcileOutcome> {
        let previous = fetch_associations(self.store.as_ref(), workflow_id).await?;
        let plan = reconcile(&previous, desired);
        let outcome = apply_reconciliation(self.store.as_ref(), workflow_id, &plan).await;

        notify_reconcile_failures(self.sink.as_ref(), &outcome);
        Ok(outcome)
    }

    async fn fetch_workflow_with_retry(&self, workflow_id: &str) -> ConsoleResult<WorkflowDetails> {
        let attempts = self.retry.attempts.max(1);

        for attempt in 1..=attempts {
            match self.store.get_workflow(workflow_id).await {
                Ok(details) => return Ok(details),
                Err(err) if err.is_not_found() && attempt < attempts => {
                    debug!(
                        %workflow_id,
                        attempt,
                        "Workflow not yet readable, retrying"
                    );
                    tokio::time::sleep(self.retry.delay).await;
                }
                Err(err) if err.is_not_found() => {
                    return Err(ConsoleError::NotYetConsistent {
                        resource: format!("Workflow {}", workflow_id),
                        attempts,
                    });
                }
                Err(err) => return Err(err.into()),
            }
        }

        unreachable!("retry loop returns on the last attempt")
    }
}

/// Outcome of the create flow.
#[derive(Debug)]
pub struct CreateOutcome {
    pub workflow: WorkflowDetails,
    /// Operations whose association create failed. The workflow itself is
    /// not rolled back; `WorkflowConsole::retry_associations` closes the
    /// gap.
    pub failed_operations: Vec<WorkflowOperation>,
}

impl CreateOutcome {
    pub fn fully_bound(&self) -> bool {
        self.failed_operations.is_empty()
    }
}

/// Strict linear create wizard.
#[derive(Debug)]
pub struct CreateWorkflowWizard {
    store: Arc<dyn WorkflowStore>,
    sink: Arc<dyn NotificationSink>,
    stage: WizardStage,
    general: GeneralDetails,
    operations: Vec<WorkflowOperation>,
    steps: Vec<ApprovalStep>,
}

impl CreateWorkflowWizard {
    pub fn stage(&self) -> WizardStage {
        self.stage
    }

    fn ensure_stage(&self, attempted: WizardStage) -> ConsoleResult<()> {
        if self.stage != attempted {
            return Err(ConsoleError::WizardOrder {
                current: self.stage,
                attempted,
            });
        }
        Ok(())
    }

    /// Submit the general details form. Advances to operations on success.
    pub async fn submit_general_details(&mut self, details: GeneralDetails) -> ConsoleResult<()> {
        self.ensure_stage(WizardStage::GeneralDetails)?;

        let existing = if details.name.is_empty() {
            Vec::new()
        } else {
            let query =
                ListQuery::filtered(FilterExpression::contains("name", &details.name));
            self.store.list_workflows(&query).await?.workflows
        };
        validate_name(&details.name, &existing, None)?;
        validate_description(&details.description)?;

        self.general = details;
        self.stage = WizardStage::Operations;
        Ok(())
    }

    /// Submit the operations form. Advances to configuration on success.
    pub fn submit_operations(&mut self, operations: &[WorkflowOperation]) -> ConsoleResult<()> {
        self.ensure_stage(WizardStage::Operations)?;

        self.operations.clear();
        for operation in operations {
            if !self.operations.contains(operation) {
                self.operations.push(*operation);
            }
        }

        self.stage = WizardStage::Configuration;
        Ok(())
    }

    /// Submit the configuration form. Advances to submit on success.
    pub fn submit_configuration(&mut self, steps: Vec<ApprovalStep>) -> ConsoleResult<()> {
        self.ensure_stage(WizardStage::Configuration)?;

        let validation = validate_steps(&steps);
        if !validation.is_valid() {
            return Err(ConsoleError::InvalidSteps(validation.invalid_steps));
        }

        self.steps = steps;
        self.stage = WizardStage::Submit;
        Ok(())
    }

    /// Create the workflow, then bind its operations.
    ///
    /// Association creates run after the workflow create succeeds and are
    /// independent of each other; failures surface per operation and leave
    /// the created workflow in place.
    pub async fn finish(self) -> ConsoleResult<CreateOutcome> {
        if self.stage != WizardStage::Submit {
            return Err(ConsoleError::WizardIncomplete(self.stage));
        }

        let payload = WorkflowPayload {
            name: self.general.name.clone(),
            description: self.general.description.clone(),
            engine: WORKFLOW_ENGINE.to_string(),
            template: build_template(&self.steps),
        };

        let workflow = match self.store.add_workflow(&payload).await {
            Ok(workflow) => workflow,
            Err(err) => {
                self.sink.notify(Notification::error(
                    "Could not create workflow",
                    err.to_string(),
                ));
                return Err(err.into());
            }
        };

        info!(workflow_id = %workflow.id, name = %workflow.name, "Workflow created");
        self.sink.notify(Notification::success(
            "Workflow created",
            format!("The approval workflow {} was created.", workflow.name),
        ));

        let plan = reconcile(&[], &self.operations);
        let outcome = apply_reconciliation(self.store.as_ref(), &workflow.id, &plan).await;
        notify_reconcile_failures(self.sink.as_ref(), &outcome);

        let failed_operations = outcome
            .failed_adds
            .iter()
            .map(|(operation, _)| *operation)
            .collect();

        Ok(CreateOutcome {
            workflow,
            failed_operations,
        })
    }
}

/// Outcome of an edit-session update.
#[derive(Debug)]
pub struct UpdateOutcome {
    pub workflow: WorkflowDetails,
    pub associations: ReconcileOutcome,
}

/// Edit session over an existing workflow.
///
/// All three forms are live at once; `update` re-submits the general
/// details only when they differ from the initial values and always
/// re-submits the configuration and the operation set.
#[derive(Debug)]
pub struct EditWorkflowSession {
    store: Arc<dyn WorkflowStore>,
    sink: Arc<dyn NotificationSink>,
    workflow_id: String,
    engine: String,
    initial_general: GeneralDetails,
    initial_steps: Vec<ApprovalStep>,
    initial_operations: Vec<WorkflowOperation>,
}

impl EditWorkflowSession {
    pub fn workflow_id(&self) -> &str {
        &self.workflow_id
    }

    /// Initial general-details form values.
    pub fn initial_general(&self) -> &GeneralDetails {
        &self.initial_general
    }

    /// Steps hydrated from the persisted template.
    pub fn initial_steps(&self) -> &[ApprovalStep] {
        &self.initial_steps
    }

    /// Operations bound when the session was opened, mapped onto the
    /// registry.
    pub fn initial_operations(&self) -> &[WorkflowOperation] {
        &self.initial_operations
    }

    /// Whether the general details form has pending edits.
    pub fn general_details_edited(&self, general: &GeneralDetails) -> bool {
        *general != self.initial_general
    }

    /// Apply the operator's update.
    pub async fn update(
        &mut self,
        general: GeneralDetails,
        steps: Vec<ApprovalStep>,
        operations: &[WorkflowOperation],
    ) -> ConsoleResult<UpdateOutcome> {
        let validation = validate_steps(&steps);
        if !validation.is_valid() {
            return Err(ConsoleError::InvalidSteps(validation.invalid_steps));
        }

        // General details go through validation only when actually edited;
        // the persisted values are re-sent unchanged otherwise.
        let general = if self.general_details_edited(&general) {
            let existing = if general.name.is_empty() {
                Vec::new()
            } else {
                let query =
                    ListQuery::filtered(FilterExpression::contains("name", &general.name));
                self.store.list_workflows(&query).await?.workflows
            };
            validate_name(&general.name, &existing, Some(&self.workflow_id))?;
            validate_description(&general.description)?;
            general
        } else {
            self.initial_general.clone()
        };

        let payload = WorkflowPayload {
            name: general.name.clone(),
            description: general.description.clone(),
            engine: self.engine.clone(),
            template: build_template(&steps),
        };

        let workflow = match self.store.update_workflow(&self.workflow_id, &payload).await {
            Ok(workflow) => workflow,
            Err(err) => {
                self.sink.notify(Notification::error(
                    "Could not update workflow",
                    err.to_string(),
                ));
                return Err(err.into());
            }
        };

        info!(workflow_id = %self.workflow_id, "Workflow updated");
        self.sink.notify(Notification::success(
            "Workflow updated",
            format!("The approval workflow {} was updated.", workflow.name),
        ));

        // Reconcile against the server's current associations, never the
        // set cached at open time.
        let previous = fetch_associations(self.store.as_ref(), &self.workflow_id).await?;
        let plan = reconcile(&previous, operations);
        let outcome = apply_reconciliation(self.store.as_ref(), &self.workflow_id, &plan).await;
        notify_reconcile_failures(self.sink.as_ref(), &outcome);

        self.initial_general = general;
        self.initial_steps = steps;
        self.initial_operations = operations
            .iter()
            .copied()
            .filter(|operation| {
                // Keep only operations that are actually bound now.
                !outcome
                    .failed_adds
                    .iter()
                    .any(|(failed, _)| failed == operation)
            })
            .collect();

        Ok(UpdateOutcome {
            workflow,
            associations: outcome,
        })
    }
}

fn notify_reconcile_failures(sink: &dyn NotificationSink, outcome: &ReconcileOutcome) {
    for (operation, err) in &outcome.failed_adds {
        warn!(operation = %operation, %err, "Operation binding failed");
        sink.notify(Notification::error(
            "Could not bind operation",
            format!("Binding {} failed: {}", operation.label(), err),
        ));
    }

    for (association_id, err) in &outcome.failed_removes {
        warn!(%association_id, %err, "Operation unbinding failed");
        sink.notify(Notification::error(
            "Could not unbind operation",
            format!("Removing association {} failed: {}", association_id, err),
        ));
    }
}
