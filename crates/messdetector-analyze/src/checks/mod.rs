//! Mess detection rules applied to one function or method at a time

mod options;
mod undefined_variable;
mod unreachable_code;

pub use options::RuleOptions;
pub use undefined_variable::UndefinedVariableCheck;
pub use unreachable_code::{Finality, UnreachableCodeCheck};

use crate::issue::Severity;
use messdetector_core::{Node, NodeId, NodeKind};
use std::path::Path;
use thiserror::Error;

/// Context provided to checks during analysis
pub struct CheckContext<'a> {
    /// The file being analyzed
    pub file_path: &'a Path,
    /// Options configured for the running check
    pub options: &'a RuleOptions,
}

/// A single rule violation inside one unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub rule: &'static str,
    pub node: NodeId,
    pub line: usize,
    pub end_line: usize,
    /// Display token substituted into the rule message
    pub token: String,
}

impl Violation {
    pub fn at(rule: &'static str, node: Node<'_>, token: impl Into<String>) -> Self {
        Self {
            rule,
            node: node.id(),
            line: node.begin_line(),
            end_line: node.end_line(),
            token: token.into(),
        }
    }
}

/// The tree handed to a check does not have the shape the check relies on
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuleError {
    #[error("{parent} on line {line} has no {kind} child")]
    MissingChild {
        parent: NodeKind,
        kind: NodeKind,
        line: usize,
    },

    #[error("{node} on line {line} has no parent")]
    MissingParent { node: NodeKind, line: usize },
}

impl RuleError {
    pub(crate) fn missing_child(parent: Node<'_>, kind: NodeKind) -> Self {
        RuleError::MissingChild {
            parent: parent.kind(),
            kind,
            line: parent.begin_line(),
        }
    }

    pub(crate) fn missing_parent(node: Node<'_>) -> Self {
        RuleError::MissingParent {
            node: node.kind(),
            line: node.begin_line(),
        }
    }

    pub fn line(&self) -> usize {
        match self {
            RuleError::MissingChild { line, .. } | RuleError::MissingParent { line, .. } => *line,
        }
    }
}

/// Parent of `node`, or a malformed-tree error
pub(crate) fn parent_of<'t>(node: Node<'t>) -> Result<Node<'t>, RuleError> {
    node.parent().ok_or_else(|| RuleError::missing_parent(node))
}

/// Trait for mess detection rules
///
/// A check is stateless; all working state lives inside one `apply` call,
/// so a single instance may run on many units from many threads.
pub trait Check: Send + Sync {
    /// Rule name as used in configuration and output (e.g., "UndefinedVariable")
    fn id(&self) -> &'static str;

    /// Human-readable description
    fn description(&self) -> &'static str;

    fn severity(&self) -> Severity;

    /// Option names and their defaults, for `--list-rules`
    fn options(&self) -> &'static [(&'static str, &'static str)] {
        &[]
    }

    /// Run the check on one function or method node
    fn apply(&self, unit: Node<'_>, ctx: &CheckContext<'_>) -> Result<Vec<Violation>, RuleError>;

    /// Render the message for a violation token
    fn message(&self, token: &str) -> String;
}

/// Registry of all available checks
#[derive(Default)]
pub struct CheckRegistry {
    checks: Vec<Box<dyn Check>>,
}

impl CheckRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with all built-in checks
    pub fn with_builtin_checks() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(UndefinedVariableCheck));
        registry.register(Box::new(UnreachableCodeCheck));
        registry
    }

    /// Register a check
    pub fn register(&mut self, check: Box<dyn Check>) {
        self.checks.push(check);
    }

    /// Look up a check by rule name (case-insensitive)
    pub fn get(&self, id: &str) -> Option<&dyn Check> {
        self.checks
            .iter()
            .find(|c| c.id().eq_ignore_ascii_case(id))
            .map(|c| c.as_ref())
    }

    /// Get all registered checks
    pub fn all_checks(&self) -> Vec<&dyn Check> {
        self.checks.iter().map(|c| c.as_ref()).collect()
    }

    pub fn ids(&self) -> Vec<&'static str> {
        self.checks.iter().map(|c| c.id()).collect()
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_registry() {
        let registry = CheckRegistry::with_builtin_checks();
        assert_eq!(registry.ids(), vec!["UndefinedVariable", "UnreachableCode"]);
        assert!(registry.get("undefinedvariable").is_some());
        assert!(registry.get("Missing").is_none());
    }

    #[test]
    fn test_rule_error_display() {
        let err = RuleError::MissingChild {
            parent: NodeKind::Function,
            kind: NodeKind::FormalParameters,
            line: 3,
        };
        assert_eq!(err.to_string(), "Function on line 3 has no FormalParameters child");
        assert_eq!(err.line(), 3);
    }
}
