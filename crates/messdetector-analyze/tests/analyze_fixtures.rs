//! End-to-end runs of the analyzer over the PHP fixtures

use messdetector_analyze::config::Config;
use messdetector_analyze::issue::Severity;
use messdetector_analyze::output::{format_issues, OutputFormat};
use messdetector_analyze::{Analyzer, PARSE_ERROR};
use std::path::{Path, PathBuf};

fn fixtures() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures")
}

fn project_analyzer() -> Analyzer {
    let project = fixtures().join("project");
    let (config, _) = Config::load_from(project).unwrap().unwrap();
    Analyzer::new(config)
}

/// (file name, rule, line) triples in report order
fn summary(analyzer: &Analyzer, path: &Path) -> Vec<(String, String, usize)> {
    let issues = analyzer.analyze_paths(&[path]).unwrap();
    issues
        .issues()
        .iter()
        .map(|issue| {
            let name = issue.file.file_name().unwrap().to_string_lossy().into_owned();
            (name, issue.rule.clone(), issue.line)
        })
        .collect()
}

#[test]
fn test_project_report() {
    let analyzer = project_analyzer();
    let found = summary(&analyzer, &fixtures().join("project"));

    let expected: Vec<(String, String, usize)> = vec![
        ("undefined.php", "UndefinedVariable", 10),
        ("undefined.php", "UndefinedVariable", 18),
        ("undefined.php", "UndefinedVariable", 20),
        ("unreachable.php", "UnreachableCode", 8),
        ("unreachable.php", "UnreachableCode", 14),
    ]
    .into_iter()
    .map(|(f, r, l)| (f.to_string(), r.to_string(), l))
    .collect();

    assert_eq!(found, expected);
}

#[test]
fn test_preg_match_output_without_config() {
    let analyzer = Analyzer::with_defaults();
    let clean = fixtures().join("project").join("src").join("clean.php");
    let issues = analyzer.analyze_file(&clean).unwrap();

    assert_eq!(issues.len(), 1);
    let issue = &issues.issues()[0];
    assert_eq!(issue.line, 18);
    assert_eq!(
        issue.message,
        "Avoid using undefined variables such as '$parts' which will lead to PHP notices."
    );
}

#[test]
fn test_vendor_is_analyzed_without_exclude() {
    let analyzer = Analyzer::with_defaults();
    let vendor = fixtures().join("project").join("vendor");
    let found = summary(&analyzer, &vendor);

    assert_eq!(
        found,
        vec![("library.php".to_string(), "UndefinedVariable".to_string(), 5)]
    );
}

#[test]
fn test_parse_error_is_reported_not_fatal() {
    let analyzer = Analyzer::with_defaults();
    let issues = analyzer
        .analyze_paths(&[fixtures().join("broken").as_path()])
        .unwrap();

    let parse_errors: Vec<_> = issues.by_rule(PARSE_ERROR).collect();
    assert_eq!(parse_errors.len(), 1);
    assert_eq!(parse_errors[0].severity, Severity::Error);
    assert!(!parse_errors[0].is_violation());
}

#[test]
fn test_json_report_for_project() {
    let analyzer = project_analyzer();
    let issues = analyzer
        .analyze_paths(&[fixtures().join("project").as_path()])
        .unwrap();

    let output = format_issues(&issues, OutputFormat::Json);
    let value: serde_json::Value = serde_json::from_str(&output).unwrap();

    assert_eq!(value["totals"]["violations"], 5);
    assert_eq!(value["totals"]["files"], 2);
    assert_eq!(value["totals"]["errors"], 0);
}
