//! Filter expressions for list endpoints.
//!
//! The backend accepts a small `attribute op value` grammar in the
//! `filter` query parameter. Identifier operands are unquoted
//! (`workflowId eq wf-1`), string operands are quoted
//! (`displayName co "admin"`), and clauses combine with `and`.

use std::fmt::{self, Display};

/// A rendered filter expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterExpression(String);

impl FilterExpression {
    /// Equality against an identifier operand: `attribute eq value`.
    pub fn eq(attribute: &str, value: &str) -> Self {
        Self(format!("{} eq {}", attribute, value))
    }

    /// Equality against a string operand: `attribute eq "value"`.
    pub fn eq_str(attribute: &str, value: &str) -> Self {
        Self(format!("{} eq \"{}\"", attribute, escape(value)))
    }

    /// Substring match: `attribute co "value"`.
    pub fn contains(attribute: &str, value: &str) -> Self {
        Self(format!("{} co \"{}\"", attribute, escape(value)))
    }

    /// Conjunction of two expressions.
    pub fn and(self, other: FilterExpression) -> Self {
        Self(format!("{} and {}", self.0, other.0))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for FilterExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Escape embedded quotes in string operands.
fn escape(value: &str) -> String {
    value.replace('"', "\\\"")
}
