//! GitHub Actions annotations output format

use super::Formatter;
use crate::issue::{IssueCollection, Severity};

pub struct GithubFormatter;

impl Formatter for GithubFormatter {
    fn format(&self, issues: &IssueCollection) -> String {
        let mut output = String::new();

        for issue in issues.issues() {
            let level = match issue.severity {
                Severity::Error => "error",
                Severity::Warning => "warning",
            };

            // ::error file={name},line={line},endLine={end},title={rule}::{message}
            output.push_str(&format!(
                "::{} file={},line={},endLine={},title={}::{}\n",
                level,
                issue.file.display(),
                issue.line,
                issue.end_line,
                issue.rule,
                escape_message(&issue.message)
            ));
        }

        output
    }
}

/// Escape special characters for GitHub Actions annotations
fn escape_message(message: &str) -> String {
    message
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issue::Issue;
    use std::path::PathBuf;

    #[test]
    fn test_github_format() {
        let mut issues = IssueCollection::new();
        issues.add(
            Issue::warning(
                "UnreachableCode",
                "The code after this 'throw' statement is unreachable.",
                PathBuf::from("src/file.php"),
                10,
            )
            .with_end_line(11),
        );

        let output = GithubFormatter.format(&issues);

        assert_eq!(
            output,
            "::warning file=src/file.php,line=10,endLine=11,title=UnreachableCode::The code after this 'throw' statement is unreachable.\n"
        );
    }

    #[test]
    fn test_escape_message() {
        assert_eq!(escape_message("line1\nline2"), "line1%0Aline2");
        assert_eq!(escape_message("100%"), "100%25");
    }
}
