//! Raw output format
//!
//! Format: file:line:message
//!
//! One issue per line, no headers, no summary.

use super::Formatter;
use crate::issue::IssueCollection;

pub struct RawFormatter;

impl Formatter for RawFormatter {
    fn format(&self, issues: &IssueCollection) -> String {
        let mut output = String::new();

        let mut sorted_issues: Vec<_> = issues.issues().iter().collect();
        sorted_issues.sort_by(|a, b| {
            a.file
                .cmp(&b.file)
                .then_with(|| a.line.cmp(&b.line))
        });

        for issue in sorted_issues {
            output.push_str(&format!(
                "{}:{}:{}\n",
                issue.file.display(),
                issue.line,
                issue.message
            ));
        }

        output
    }
}
