//! Building and validating approval templates.
//!
//! Draft steps hold the operator's role/user selections; `build_template`
//! turns them into the wire shape, `steps_from_template` is the inverse
//! used when an existing workflow is opened for editing.

use crate::{
    EntityKind, StepDefinition, StepOption, WorkflowTemplate, MULTI_STEP_APPROVAL_TEMPLATE,
};

/// An approval step as edited by the operator: the role and user ids that
/// may approve it. Order inside each list is insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApprovalStep {
    pub roles: Vec<String>,
    pub users: Vec<String>,
}

impl ApprovalStep {
    /// A step with neither roles nor users cannot approve anything.
    pub fn is_empty(&self) -> bool {
        self.roles.is_empty() && self.users.is_empty()
    }
}

/// Outcome of validating a step collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepValidation {
    /// Zero-based indices of steps with neither roles nor users.
    pub invalid_steps: Vec<usize>,
}

impl StepValidation {
    pub fn is_valid(&self) -> bool {
        self.invalid_steps.is_empty()
    }
}

/// A step is invalid iff both its role and user selections are empty.
pub fn validate_steps(steps: &[ApprovalStep]) -> StepValidation {
    let invalid_steps = steps
        .iter()
        .enumerate()
        .filter(|(_, step)| step.is_empty())
        .map(|(index, _)| index)
        .collect();

    StepValidation { invalid_steps }
}

/// Assemble the wire template from draft steps.
///
/// Steps are numbered sequentially from 1 in presentation order; an
/// entity entry is emitted only when its values are non-empty.
pub fn build_template(steps: &[ApprovalStep]) -> WorkflowTemplate {
    let steps = steps
        .iter()
        .enumerate()
        .map(|(index, step)| {
            let options = [
                StepOption {
                    entity: EntityKind::Roles,
                    values: step.roles.clone(),
                },
                StepOption {
                    entity: EntityKind::Users,
                    values: step.users.clone(),
                },
            ]
            .into_iter()
            .filter(|option| !option.values.is_empty())
            .collect();

            StepDefinition {
                step: index as u32 + 1,
                options,
            }
        })
        .collect();

    WorkflowTemplate {
        name: MULTI_STEP_APPROVAL_TEMPLATE.to_string(),
        steps,
    }
}

/// Recover draft steps from a persisted template, in step order.
pub fn steps_from_template(template: &WorkflowTemplate) -> Vec<ApprovalStep> {
    template
        .steps
        .iter()
        .map(|definition| {
            let mut step = ApprovalStep::default();
            for option in &definition.options {
                match option.entity {
                    EntityKind::Roles => step.roles = option.values.clone(),
                    EntityKind::Users => step.users = option.values.clone(),
                }
            }
            step
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn step(roles: &[&str], users: &[&str]) -> ApprovalStep {
        ApprovalStep {
            roles: roles.iter().map(|r| r.to_string()).collect(),
            users: users.iter().map(|u| u.to_string()).collect(),
        }
    }

    #[test]
    fn empty_entity_entries_are_omitted() {
        let template = build_template(&[step(&["role-1"], &[])]);

        assert_eq!(template.name, MULTI_STEP_APPROVAL_TEMPLATE);
        assert_eq!(template.steps.len(), 1);
        assert_eq!(template.steps[0].step, 1);
        assert_eq!(
            template.steps[0].options,
            vec![StepOption {
                entity: EntityKind::Roles,
                values: vec!["role-1".to_string()],
            }]
        );
    }

    #[test]
    fn both_entities_produce_exactly_two_options() {
        let template = build_template(&[step(&["role-1"], &["user-1", "user-2"])]);

        let entities: Vec<EntityKind> = template.steps[0]
            .options
            .iter()
            .map(|option| option.entity)
            .collect();
        assert_eq!(entities, vec![EntityKind::Roles, EntityKind::Users]);
    }

    #[test]
    fn steps_are_numbered_from_one_in_order() {
        let template = build_template(&[
            step(&["a"], &[]),
            step(&[], &["b"]),
            step(&["c"], &["d"]),
        ]);

        let numbers: Vec<u32> = template.steps.iter().map(|s| s.step).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
    }

    #[test]
    fn validate_flags_only_fully_empty_steps() {
        let validation = validate_steps(&[
            step(&["role-1"], &[]),
            step(&[], &[]),
            step(&[], &["user-1"]),
            step(&[], &[]),
        ]);

        assert!(!validation.is_valid());
        assert_eq!(validation.invalid_steps, vec![1, 3]);
    }

    #[test]
    fn validate_accepts_all_populated_steps() {
        let validation = validate_steps(&[step(&["r"], &[]), step(&[], &["u"])]);
        assert!(validation.is_valid());
    }

    #[test]
    fn hydration_inverts_building() {
        let drafts = vec![step(&["role-1"], &["user-1"]), step(&[], &["user-2"])];
        let template = build_template(&drafts);

        assert_eq!(steps_from_template(&template), drafts);
    }
}
