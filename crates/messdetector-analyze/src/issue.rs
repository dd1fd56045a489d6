//! Issue/diagnostic types for mess detection results

use std::path::PathBuf;

/// Severity level for issues
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Error - must be fixed
    Error,
    /// Warning - should be reviewed
    Warning,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// A single issue found during analysis
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    /// The rule that found this issue (e.g., "UndefinedVariable")
    pub rule: String,
    /// Severity level
    pub severity: Severity,
    /// Human-readable message
    pub message: String,
    /// File where the issue was found
    pub file: PathBuf,
    /// First line of the offending node (1-based)
    pub line: usize,
    /// Last line of the offending node (1-based)
    pub end_line: usize,
}

impl Issue {
    /// Create a new error issue
    pub fn error(
        rule: impl Into<String>,
        message: impl Into<String>,
        file: PathBuf,
        line: usize,
    ) -> Self {
        Self {
            rule: rule.into(),
            severity: Severity::Error,
            message: message.into(),
            file,
            line,
            end_line: line,
        }
    }

    /// Create a new warning issue
    pub fn warning(
        rule: impl Into<String>,
        message: impl Into<String>,
        file: PathBuf,
        line: usize,
    ) -> Self {
        Self {
            rule: rule.into(),
            severity: Severity::Warning,
            message: message.into(),
            file,
            line,
            end_line: line,
        }
    }

    pub fn with_end_line(mut self, end_line: usize) -> Self {
        self.end_line = end_line.max(self.line);
        self
    }

    /// Parse and internal errors are not rule violations
    pub fn is_violation(&self) -> bool {
        !self.rule.contains('.')
    }
}

/// Collection of issues from analysis
#[derive(Debug, Default)]
pub struct IssueCollection {
    issues: Vec<Issue>,
}

impl IssueCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, issue: Issue) {
        self.issues.push(issue);
    }

    pub fn extend(&mut self, issues: impl IntoIterator<Item = Issue>) {
        self.issues.extend(issues);
    }

    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    pub fn into_issues(self) -> Vec<Issue> {
        self.issues
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn error_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Error)
            .count()
    }

    pub fn warning_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Warning)
            .count()
    }

    /// Issues raised by a given rule
    pub fn by_rule<'a>(&'a self, rule: &'a str) -> impl Iterator<Item = &'a Issue> + 'a {
        self.issues.iter().filter(move |i| i.rule == rule)
    }

    /// Sort issues by file, then line
    pub fn sort(&mut self) {
        self.issues.sort_by(|a, b| {
            a.file
                .cmp(&b.file)
                .then_with(|| a.line.cmp(&b.line))
                .then_with(|| a.rule.cmp(&b.rule))
        });
    }
}
