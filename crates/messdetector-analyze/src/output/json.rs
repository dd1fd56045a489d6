//! JSON output format
//!
//! Violations are grouped per file; parse and internal errors are listed
//! separately under `errors`.

use super::Formatter;
use crate::issue::{Issue, IssueCollection};
use serde::Serialize;
use std::collections::BTreeMap;

pub struct JsonFormatter;

#[derive(Serialize)]
struct JsonOutput {
    version: &'static str,
    totals: Totals,
    files: Vec<FileViolations>,
    errors: Vec<FileError>,
}

#[derive(Serialize)]
struct Totals {
    violations: usize,
    files: usize,
    errors: usize,
}

#[derive(Serialize)]
struct FileViolations {
    file: String,
    violations: Vec<JsonViolation>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonViolation {
    begin_line: usize,
    end_line: usize,
    rule: String,
    severity: String,
    description: String,
}

#[derive(Serialize)]
struct FileError {
    file: String,
    line: usize,
    kind: String,
    message: String,
}

impl Formatter for JsonFormatter {
    fn format(&self, issues: &IssueCollection) -> String {
        let mut files: BTreeMap<String, Vec<&Issue>> = BTreeMap::new();
        let mut errors = Vec::new();

        for issue in issues.issues() {
            let path = issue.file.display().to_string();
            if issue.is_violation() {
                files.entry(path).or_default().push(issue);
            } else {
                errors.push(FileError {
                    file: path,
                    line: issue.line,
                    kind: issue.rule.clone(),
                    message: issue.message.clone(),
                });
            }
        }

        let files: Vec<FileViolations> = files
            .into_iter()
            .map(|(file, file_issues)| FileViolations {
                file,
                violations: file_issues
                    .iter()
                    .map(|issue| JsonViolation {
                        begin_line: issue.line,
                        end_line: issue.end_line,
                        rule: issue.rule.clone(),
                        severity: issue.severity.to_string(),
                        description: issue.message.clone(),
                    })
                    .collect(),
            })
            .collect();

        let output = JsonOutput {
            version: env!("CARGO_PKG_VERSION"),
            totals: Totals {
                violations: files.iter().map(|f| f.violations.len()).sum(),
                files: files.len(),
                errors: errors.len(),
            },
            files,
            errors,
        };

        serde_json::to_string_pretty(&output).unwrap_or_else(|_| "{}".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_json_format() {
        let mut issues = IssueCollection::new();
        issues.add(Issue::error(
            "UndefinedVariable",
            "Avoid using undefined variables such as '$a' which will lead to PHP notices.",
            PathBuf::from("/path/to/file.php"),
            10,
        ));
        issues.add(Issue::error(
            "parse.error",
            "Unexpected token",
            PathBuf::from("/path/to/broken.php"),
            1,
        ));

        let output = JsonFormatter.format(&issues);
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(value["totals"]["violations"], 1);
        assert_eq!(value["totals"]["errors"], 1);
        assert_eq!(value["files"][0]["file"], "/path/to/file.php");
        assert_eq!(value["files"][0]["violations"][0]["beginLine"], 10);
        assert_eq!(value["files"][0]["violations"][0]["rule"], "UndefinedVariable");
        assert_eq!(value["errors"][0]["kind"], "parse.error");
    }
}
