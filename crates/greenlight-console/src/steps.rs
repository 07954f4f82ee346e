//! Step list management for the configuration form.
//!
//! The manager is the single source of truth for the draft step collection:
//! every mutation goes through it and `snapshot` always reflects the
//! current state, so submission never reads stale data.

use thiserror::Error;

use greenlight_model::{validate_steps, ApprovalStep};

/// Step list errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StepListError {
    /// The last step has neither roles nor users
    #[error("the last step needs at least one role or user before another step can be added")]
    LastStepEmpty,

    /// Deleting the only remaining step is forbidden
    #[error("a workflow needs at least one approval step")]
    OnlyStep,

    /// No step with the given id
    #[error("no step with id `{0}`")]
    UnknownStep(String),
}

/// One draft approval step.
#[derive(Debug, Clone, PartialEq)]
pub struct DraftStep {
    id: String,
    step_number: u32,
    pub roles: Vec<String>,
    pub users: Vec<String>,
    has_error: bool,
}

impl DraftStep {
    fn new(id: String, step_number: u32) -> Self {
        Self {
            id,
            step_number,
            roles: Vec::new(),
            users: Vec::new(),
            has_error: false,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// 1-based position, always contiguous with the list order.
    pub fn step_number(&self) -> u32 {
        self.step_number
    }

    /// Whether the step is currently flagged in the error state.
    pub fn has_error(&self) -> bool {
        self.has_error
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty() && self.users.is_empty()
    }
}

/// Owner of the ordered draft step collection.
#[derive(Debug, Clone, PartialEq)]
pub struct StepListManager {
    steps: Vec<DraftStep>,
    next_id: usize,
}

impl StepListManager {
    /// A fresh list seeded with one default step.
    pub fn new() -> Self {
        Self {
            steps: vec![DraftStep::new("step-0".to_string(), 1)],
            next_id: 1,
        }
    }

    /// Hydrate from previously persisted steps. An empty slice seeds one
    /// default step instead.
    pub fn hydrate(initial: &[ApprovalStep]) -> Self {
        if initial.is_empty() {
            return Self::new();
        }

        let steps = initial
            .iter()
            .enumerate()
            .map(|(index, step)| {
                let mut draft = DraftStep::new(format!("step-{}", index), index as u32 + 1);
                draft.roles = step.roles.clone();
                draft.users = step.users.clone();
                draft
            })
            .collect();

        Self {
            steps,
            next_id: initial.len(),
        }
    }

    pub fn steps(&self) -> &[DraftStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Append a new empty step.
    ///
    /// Refused while the current last step has neither roles nor users; the
    /// refusal flags only that step, older empty steps stay unflagged.
    pub fn add_step(&mut self) -> Result<&DraftStep, StepListError> {
        if let Some(last) = self.steps.last_mut() {
            if last.is_empty() {
                last.has_error = true;
                return Err(StepListError::LastStepEmpty);
            }
        }

        let id = format!("step-{}", self.next_id);
        self.next_id += 1;
        self.steps
            .push(DraftStep::new(id, self.steps.len() as u32 + 1));

        Ok(self.steps.last().unwrap())
    }

    /// Remove a step and renumber the remainder contiguously from 1.
    pub fn delete_step(&mut self, id: &str) -> Result<(), StepListError> {
        if self.steps.len() == 1 {
            return Err(StepListError::OnlyStep);
        }

        let position = self
            .steps
            .iter()
            .position(|step| step.id == id)
            .ok_or_else(|| StepListError::UnknownStep(id.to_string()))?;

        self.steps.remove(position);
        self.renumber();

        Ok(())
    }

    /// Replace a step's role/user selections. Clears the step's error flag.
    pub fn set_step_entities(
        &mut self,
        id: &str,
        roles: Vec<String>,
        users: Vec<String>,
    ) -> Result<(), StepListError> {
        let step = self
            .steps
            .iter_mut()
            .find(|step| step.id == id)
            .ok_or_else(|| StepListError::UnknownStep(id.to_string()))?;

        step.roles = roles;
        step.users = users;
        step.has_error = false;

        Ok(())
    }

    /// Flag every empty step at once. Used when a workflow-level validation
    /// pass fails at final submit.
    pub fn mark_all_errors(&mut self) {
        let invalid = validate_steps(&self.snapshot()).invalid_steps;
        for index in invalid {
            self.steps[index].has_error = true;
        }
    }

    /// Clear every error flag.
    pub fn clear_errors(&mut self) {
        for step in &mut self.steps {
            step.has_error = false;
        }
    }

    /// Current draft data, in order.
    pub fn snapshot(&self) -> Vec<ApprovalStep> {
        self.steps
            .iter()
            .map(|step| ApprovalStep {
                roles: step.roles.clone(),
                users: step.users.clone(),
            })
            .collect()
    }

    fn renumber(&mut self) {
        for (index, step) in self.steps.iter_mut().enumerate() {
            step.step_number = index as u32 + 1;
        }
    }
}

impl Default for StepListManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn populated(manager: &mut StepListManager, id: &str) {
        manager
            .set_step_entities(id, vec!["role-1".to_string()], vec![])
            .unwrap();
    }

    #[test]
    fn new_list_is_seeded_with_one_step() {
        let manager = StepListManager::new();
        assert_eq!(manager.len(), 1);
        assert_eq!(manager.steps()[0].step_number(), 1);
        assert_eq!(manager.steps()[0].id(), "step-0");
    }

    #[test]
    fn hydration_preserves_selections_and_ids() {
        let manager = StepListManager::hydrate(&[
            ApprovalStep {
                roles: vec!["role-1".to_string()],
                users: vec![],
            },
            ApprovalStep {
                roles: vec![],
                users: vec!["user-1".to_string()],
            },
        ]);

        assert_eq!(manager.len(), 2);
        assert_eq!(manager.steps()[0].id(), "step-0");
        assert_eq!(manager.steps()[1].id(), "step-1");
        assert_eq!(manager.steps()[1].users, vec!["user-1".to_string()]);
        assert_eq!(manager.steps()[1].step_number(), 2);
    }

    #[test]
    fn add_step_is_refused_while_last_step_is_empty() {
        let mut manager = StepListManager::new();

        assert_eq!(manager.add_step(), Err(StepListError::LastStepEmpty));
        assert_eq!(manager.len(), 1);
        assert!(manager.steps()[0].has_error());

        let last_id = manager.steps()[0].id().to_string();
        populated(&mut manager, &last_id);
        assert!(manager.add_step().is_ok());
        assert_eq!(manager.len(), 2);
    }

    #[test]
    fn refusal_flags_only_the_last_step() {
        let mut manager = StepListManager::hydrate(&[
            ApprovalStep::default(),
            ApprovalStep {
                roles: vec!["role-1".to_string()],
                users: vec![],
            },
        ]);

        // Make the last step empty again, then try to add.
        manager
            .set_step_entities("step-1", vec![], vec![])
            .unwrap();
        assert!(manager.add_step().is_err());

        assert!(!manager.steps()[0].has_error());
        assert!(manager.steps()[1].has_error());
    }

    #[test]
    fn delete_renumbers_contiguously() {
        let mut manager = StepListManager::hydrate(&[
            ApprovalStep {
                roles: vec!["a".to_string()],
                users: vec![],
            },
            ApprovalStep {
                roles: vec!["b".to_string()],
                users: vec![],
            },
            ApprovalStep {
                roles: vec!["c".to_string()],
                users: vec![],
            },
        ]);

        manager.delete_step("step-1").unwrap();

        let numbers: Vec<u32> = manager.steps().iter().map(|s| s.step_number()).collect();
        assert_eq!(numbers, vec![1, 2]);
        assert_eq!(manager.steps()[1].roles, vec!["c".to_string()]);
    }

    #[test]
    fn deleting_the_only_step_is_forbidden() {
        let mut manager = StepListManager::new();
        let id = manager.steps()[0].id().to_string();

        assert_eq!(manager.delete_step(&id), Err(StepListError::OnlyStep));
        assert_eq!(manager.len(), 1);
    }

    #[test]
    fn step_ids_stay_unique_after_delete_then_add() {
        let mut manager = StepListManager::new();
        populated(&mut manager, "step-0");
        manager.add_step().unwrap();
        populated(&mut manager, "step-1");
        manager.add_step().unwrap();

        manager.delete_step("step-1").unwrap();
        populated(&mut manager, "step-2");
        manager.add_step().unwrap();

        let mut ids: Vec<&str> = manager.steps().iter().map(|s| s.id()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), manager.len());
    }

    #[test]
    fn mark_all_errors_flags_every_empty_step() {
        let mut manager = StepListManager::hydrate(&[
            ApprovalStep::default(),
            ApprovalStep {
                roles: vec!["role-1".to_string()],
                users: vec![],
            },
            ApprovalStep::default(),
        ]);

        manager.mark_all_errors();

        let flags: Vec<bool> = manager.steps().iter().map(|s| s.has_error()).collect();
        assert_eq!(flags, vec![true, false, true]);

        manager.clear_errors();
        assert!(manager.steps().iter().all(|s| !s.has_error()));
    }

    #[test]
    fn updating_entities_clears_the_error_flag() {
        let mut manager = StepListManager::new();
        assert!(manager.add_step().is_err());
        assert!(manager.steps()[0].has_error());

        populated(&mut manager, "step-0");
        assert!(!manager.steps()[0].has_error());
    }

    #[test]
    fn snapshot_reflects_latest_mutations() {
        let mut manager = StepListManager::new();
        populated(&mut manager, "step-0");
        manager.add_step().unwrap();
        manager
            .set_step_entities("step-1", vec![], vec!["user-9".to_string()])
            .unwrap();

        let snapshot = manager.snapshot();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[1].users, vec!["user-9".to_string()]);
    }
}
