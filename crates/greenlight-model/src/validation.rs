//! Name and description validation for workflow definitions.
//!
//! Checks run in a fixed order and only the first failure is reported:
//! required, entirely-symbols, disallowed symbols, template-expression
//! injection, duplicate name. A candidate with no alphanumeric characters
//! reports the entirely-symbols error even when it also contains a
//! disallowed symbol.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::WorkflowListItem;

/// Matches `${...}` template expressions, rejected as injection attempts.
static TEMPLATE_ESCAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\{[^}]*\}").unwrap());

/// Symbols never allowed in a workflow name.
const DISALLOWED_SYMBOLS: [char; 2] = ['_', '/'];

/// First failed check for a candidate workflow name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NameValidationError {
    #[error("a workflow name is required")]
    Required,
    #[error("workflow names must contain at least one alphanumeric character")]
    OnlySymbols,
    #[error("workflow names must not contain `_` or `/`")]
    DisallowedSymbols,
    #[error("workflow names must not contain template expressions")]
    TemplateExpression,
    #[error("a workflow named `{0}` already exists")]
    Duplicate(String),
}

/// Failed check for a workflow description.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DescriptionValidationError {
    #[error("workflow descriptions must not contain template expressions")]
    TemplateExpression,
}

/// Validate a candidate workflow name against the existing definitions.
///
/// Duplicate detection is a case-sensitive comparison against `existing`;
/// pass the workflow's own id as `exclude_id` in edit mode so renaming a
/// workflow to its current name stays valid.
pub fn validate_name(
    candidate: &str,
    existing: &[WorkflowListItem],
    exclude_id: Option<&str>,
) -> Result<(), NameValidationError> {
    if candidate.trim().is_empty() {
        return Err(NameValidationError::Required);
    }

    if !candidate.chars().any(char::is_alphanumeric) {
        return Err(NameValidationError::OnlySymbols);
    }

    if candidate.contains(DISALLOWED_SYMBOLS) {
        return Err(NameValidationError::DisallowedSymbols);
    }

    if TEMPLATE_ESCAPE.is_match(candidate) {
        return Err(NameValidationError::TemplateExpression);
    }

    let duplicate = existing.iter().any(|workflow| {
        workflow.name == candidate && exclude_id != Some(workflow.id.as_str())
    });
    if duplicate {
        return Err(NameValidationError::Duplicate(candidate.to_string()));
    }

    Ok(())
}

/// Validate a workflow description. Only the template-expression pattern
/// is rejected; anything else, including the empty string, is accepted.
pub fn validate_description(candidate: &str) -> Result<(), DescriptionValidationError> {
    if TEMPLATE_ESCAPE.is_match(candidate) {
        return Err(DescriptionValidationError::TemplateExpression);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn existing(entries: &[(&str, &str)]) -> Vec<WorkflowListItem> {
        entries
            .iter()
            .map(|(id, name)| WorkflowListItem {
                id: id.to_string(),
                name: name.to_string(),
                description: String::new(),
                engine: String::new(),
            })
            .collect()
    }

    #[test]
    fn empty_name_is_required_error() {
        assert_eq!(
            validate_name("", &[], None),
            Err(NameValidationError::Required)
        );
        assert_eq!(
            validate_name("   ", &[], None),
            Err(NameValidationError::Required)
        );
    }

    #[test]
    fn all_symbol_name_reports_only_symbols() {
        // Underscores are also disallowed symbols, but a name with no
        // alphanumeric characters reports the only-symbols error.
        assert_eq!(
            validate_name("___", &[], None),
            Err(NameValidationError::OnlySymbols)
        );
        assert_eq!(
            validate_name("!!!", &[], None),
            Err(NameValidationError::OnlySymbols)
        );
    }

    #[test]
    fn disallowed_symbols_are_rejected() {
        assert_eq!(
            validate_name("ok/name", &[], None),
            Err(NameValidationError::DisallowedSymbols)
        );
        assert_eq!(
            validate_name("ok_name", &[], None),
            Err(NameValidationError::DisallowedSymbols)
        );
    }

    #[test]
    fn template_expression_outranks_duplicate() {
        let workflows = existing(&[("wf-1", "${evil}")]);
        assert_eq!(
            validate_name("${evil}", &workflows, None),
            Err(NameValidationError::TemplateExpression)
        );
    }

    #[test]
    fn duplicate_is_case_sensitive() {
        let workflows = existing(&[("wf-1", "Manager Approval")]);

        assert_eq!(
            validate_name("Manager Approval", &workflows, None),
            Err(NameValidationError::Duplicate("Manager Approval".to_string()))
        );
        // Different casing is a different name.
        assert_eq!(validate_name("manager approval", &workflows, None), Ok(()));
    }

    #[test]
    fn own_id_is_excluded_in_edit_mode() {
        let workflows = existing(&[("wf-1", "Manager Approval"), ("wf-2", "Finance Approval")]);

        assert_eq!(
            validate_name("Manager Approval", &workflows, Some("wf-1")),
            Ok(())
        );
        assert_eq!(
            validate_name("Finance Approval", &workflows, Some("wf-1")),
            Err(NameValidationError::Duplicate("Finance Approval".to_string()))
        );
    }

    #[test]
    fn descriptions_allow_anything_but_template_expressions() {
        assert_eq!(validate_description(""), Ok(()));
        assert_eq!(validate_description("plain text / with_symbols"), Ok(()));
        assert_eq!(
            validate_description("uh oh ${jndi}"),
            Err(DescriptionValidationError::TemplateExpression)
        );
    }
}
