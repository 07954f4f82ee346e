//!
//! Greenlight Console - orchestration core for approval-workflow administration
//!
//! This crate drives the administrative flows over the backend contracts:
//! the create wizard, the edit session, gated deletion, step-list editing,
//! entity selection, and association reconciliation. It talks to the
//! backend through `greenlight_client::WorkflowStore` and reports outcomes
//! through an injected `NotificationSink`.

/// Association reconciliation module
pub mod associations;

/// Configuration module
pub mod config;

/// Error module
pub mod error;

/// List paging module
pub mod list;

/// Notification sink module
pub mod notifications;

/// Entity selector module
pub mod selector;

/// Step list manager module
pub mod steps;

/// Orchestrator module
pub mod orchestrator;

// Re-export key types
pub use associations::{apply_reconciliation, fetch_associations, reconcile, ReconcileOutcome, ReconcilePlan};
pub use config::ConsoleConfig;
pub use error::{ConsoleError, ConsoleResult};
pub use list::{ListController, ListPage};
pub use notifications::{Notification, NotificationLevel, NotificationSink, TracingSink};
pub use orchestrator::{
    CreateOutcome, CreateWorkflowWizard, DeleteConfirmation, EditWorkflowSession, GeneralDetails,
    RetryPolicy, UpdateOutcome, WizardStage, WorkflowConsole,
};
pub use selector::{EntitySelection, SearchSequencer, SelectionChange};
pub use steps::{DraftStep, StepListError, StepListManager};

/// Initialize logging
pub fn init_logging(config: &ConsoleConfig) {
    use tracing_subscriber::{fmt, EnvFilter};

    // Create filter based on config
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    // Initialize subscriber
    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}
