//! messdetector-analyze: mess detection rules for PHP
//!
//! This crate runs PHPMD-style rules over the syntax tree built by
//! `messdetector-core`:
//!
//! - `UndefinedVariable`: reads of local variables that were never defined
//! - `UnreachableCode`: statements following a `return` or `throw`
//! - `.messdetector.toml` configuration with per-rule options
//! - Multiple output formats (text, raw, json, github)
//!
//! # Example
//!
//! ```no_run
//! use messdetector_analyze::{Analyzer, config::Config, output::OutputFormat};
//! use std::path::Path;
//!
//! let analyzer = Analyzer::new(Config::default());
//! let issues = analyzer.analyze_paths(&[Path::new("src/")]).unwrap();
//!
//! let output = messdetector_analyze::output::format_issues(&issues, OutputFormat::Table);
//! println!("{}", output);
//! ```

pub mod checks;
pub mod config;
pub mod issue;
pub mod logging;
pub mod output;

use checks::{Check, CheckContext, CheckRegistry, RuleOptions};
use config::Config;
use issue::{Issue, IssueCollection, Severity};
use rayon::prelude::*;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Issue rule id for files that failed to parse
pub const PARSE_ERROR: &str = "parse.error";
/// Issue rule id for units a rule could not process
pub const INTERNAL_ERROR: &str = "internal.error";
/// Issue rule id for files that could not be read
pub const IO_ERROR: &str = "io.error";

/// Main analyzer that runs the enabled rules over PHP files
pub struct Analyzer {
    config: Config,
    registry: CheckRegistry,
    enabled: Vec<&'static str>,
    options: HashMap<&'static str, RuleOptions>,
}

impl Analyzer {
    /// Create a new analyzer with the given configuration
    pub fn new(config: Config) -> Self {
        let registry = CheckRegistry::with_builtin_checks();
        let ids = registry.ids();
        let enabled = config.rules.effective_rules(&ids, &[]);
        let options = ids
            .iter()
            .map(|&id| (id, config.rules.options_for(id)))
            .collect();

        Self {
            config,
            registry,
            enabled,
            options,
        }
    }

    /// Create analyzer with default configuration
    pub fn with_defaults() -> Self {
        Self::new(Config::default())
    }

    /// Restrict the run to the given rules, overriding the configuration
    pub fn set_rules(&mut self, rules: &[String]) {
        let ids = self.registry.ids();
        self.enabled = self.config.rules.effective_rules(&ids, rules);
    }

    /// Override one rule option; unknown rules are ignored
    pub fn set_option(&mut self, rule: &str, name: &str, value: impl Into<toml::Value>) {
        let Some(check) = self.registry.get(rule) else {
            return;
        };
        let value = value.into();
        logging::log_option_override(check.id(), name, &value.to_string());
        self.options
            .entry(check.id())
            .or_insert_with(|| RuleOptions::empty(check.id()))
            .set(name, value);
    }

    /// Get the current configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Ids of the rules that will run, in registry order
    pub fn enabled_rules(&self) -> &[&'static str] {
        &self.enabled
    }

    pub fn registry(&self) -> &CheckRegistry {
        &self.registry
    }

    /// Analyze a single file
    pub fn analyze_file(&self, path: &Path) -> Result<IssueCollection, AnalyzeError> {
        let source = fs::read_to_string(path).map_err(|source| AnalyzeError::IoError {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(self.analyze_source(path, &source))
    }

    /// Analyze source code with a given path
    ///
    /// A parse error is reported as a `parse.error` issue; the rules still
    /// run on whatever part of the file could be lowered.
    pub fn analyze_source(&self, path: &Path, source: &str) -> IssueCollection {
        let (tree, parse_error) = messdetector_core::parse(&path.to_string_lossy(), source);

        let mut issues = IssueCollection::new();

        if let Some(error) = parse_error {
            let message = error.to_string();
            logging::log_parse_error(path, &message);
            issues.add(Issue::error(PARSE_ERROR, message, path.to_path_buf(), 1));
        }

        let checks: Vec<&dyn Check> = self
            .enabled
            .iter()
            .filter_map(|id| self.registry.get(id))
            .collect();

        for unit in tree.units() {
            for check in &checks {
                let empty = RuleOptions::empty(check.id());
                let ctx = CheckContext {
                    file_path: path,
                    options: self.options.get(check.id()).unwrap_or(&empty),
                };

                match check.apply(unit, &ctx) {
                    Ok(violations) => {
                        for violation in violations {
                            let message = check.message(&violation.token);
                            let issue = match check.severity() {
                                Severity::Error => {
                                    Issue::error(check.id(), message, path.to_path_buf(), violation.line)
                                }
                                Severity::Warning => {
                                    Issue::warning(check.id(), message, path.to_path_buf(), violation.line)
                                }
                            };
                            issues.add(issue.with_end_line(violation.end_line));
                        }
                    }
                    Err(error) => {
                        logging::log_rule_error(path, check.id(), unit.image(), &error.to_string());
                        issues.add(Issue::error(
                            INTERNAL_ERROR,
                            format!("{} failed on {}: {}", check.id(), unit.image(), error),
                            path.to_path_buf(),
                            error.line(),
                        ));
                    }
                }
            }
        }

        issues
    }

    /// Collect the PHP files under the given paths, honoring `[paths] exclude`
    pub fn collect_files(&self, paths: &[&Path]) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = Vec::new();

        for path in paths {
            if path.is_file() {
                files.push(path.to_path_buf());
            } else if path.is_dir() {
                for entry in WalkDir::new(path)
                    .follow_links(true)
                    .into_iter()
                    .filter_map(|e| e.ok())
                {
                    let entry_path = entry.path();
                    if entry_path.is_file()
                        && entry_path.extension().map(|e| e == "php").unwrap_or(false)
                    {
                        if self.config.should_exclude(entry_path) {
                            logging::log_excluded(entry_path);
                        } else {
                            files.push(entry_path.to_path_buf());
                        }
                    }
                }
            }
        }

        files.sort();
        files
    }

    /// Analyze multiple paths (files or directories)
    pub fn analyze_paths(&self, paths: &[&Path]) -> Result<IssueCollection, AnalyzeError> {
        let files = self.collect_files(paths);
        logging::log_analysis_start(files.len());

        let results: Vec<_> = files
            .par_iter()
            .map(|file| self.analyze_file(file))
            .collect();

        // An unreadable file is reported and the remaining files still count
        let mut combined = IssueCollection::new();
        for (file, result) in files.iter().zip(results) {
            match result {
                Ok(issues) => combined.extend(issues.into_issues()),
                Err(error) => {
                    let message = error.to_string();
                    logging::log_file_error(file, &message);
                    combined.add(Issue::error(IO_ERROR, message, file.clone(), 1));
                }
            }
        }

        combined.sort();

        let violations = combined.issues().iter().filter(|i| i.is_violation()).count();
        logging::log_analysis_complete(violations, combined.by_rule(INTERNAL_ERROR).count());

        Ok(combined)
    }
}

/// Errors that can occur during analysis
#[derive(Debug, thiserror::Error)]
pub enum AnalyzeError {
    #[error("Failed to read {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    ConfigError(#[from] config::ConfigError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn analyze(analyzer: &Analyzer, source: &str) -> IssueCollection {
        analyzer.analyze_source(Path::new("test.php"), source)
    }

    #[test]
    fn test_analyzer_creation() {
        let analyzer = Analyzer::with_defaults();
        assert_eq!(
            analyzer.enabled_rules(),
            &["UndefinedVariable", "UnreachableCode"]
        );
    }

    #[test]
    fn test_analyze_clean_php() {
        let analyzer = Analyzer::with_defaults();
        let issues = analyze(
            &analyzer,
            "<?php\nfunction greet($name) {\n    $greeting = 'Hello ' . $name;\n    return $greeting;\n}\n",
        );
        assert!(issues.is_empty(), "unexpected issues: {:?}", issues.issues());
    }

    #[test]
    fn test_undefined_variable_issue() {
        let analyzer = Analyzer::with_defaults();
        let issues = analyze(&analyzer, "<?php\nfunction f() {\n    return $x;\n}\n");

        assert_eq!(issues.len(), 1);
        let issue = &issues.issues()[0];
        assert_eq!(issue.rule, "UndefinedVariable");
        assert_eq!(issue.severity, Severity::Error);
        assert_eq!(issue.line, 3);
        assert_eq!(
            issue.message,
            "Avoid using undefined variables such as '$x' which will lead to PHP notices."
        );
    }

    #[test]
    fn test_unreachable_code_issue() {
        let analyzer = Analyzer::with_defaults();
        let issues = analyze(
            &analyzer,
            "<?php\nfunction f() {\n    return 1;\n    echo 'dead';\n}\n",
        );

        assert_eq!(issues.len(), 1);
        let issue = &issues.issues()[0];
        assert_eq!(issue.rule, "UnreachableCode");
        assert_eq!(issue.severity, Severity::Warning);
        assert_eq!(issue.line, 3);
        assert_eq!(
            issue.message,
            "The code after this 'return' statement is unreachable."
        );
    }

    #[test]
    fn test_set_rules_limits_checks() {
        let mut analyzer = Analyzer::with_defaults();
        analyzer.set_rules(&["unreachablecode".to_string()]);

        let issues = analyze(
            &analyzer,
            "<?php\nfunction f() {\n    return $x;\n    echo 'dead';\n}\n",
        );
        assert_eq!(issues.len(), 1);
        assert_eq!(issues.issues()[0].rule, "UnreachableCode");
    }

    #[test]
    fn test_set_option_overrides_config() {
        let source = "<?php\nfunction f($s) {\n    preg_match('/a/', $s, $m);\n    return $m;\n}\n";

        let analyzer = Analyzer::with_defaults();
        assert_eq!(analyze(&analyzer, source).by_rule("UndefinedVariable").count(), 1);

        let mut analyzer = Analyzer::with_defaults();
        analyzer.set_option("UndefinedVariable", "ignorePregMatch", true);
        assert!(analyze(&analyzer, source).is_empty());
    }

    #[test]
    fn test_config_options_are_applied() {
        let config = Config::parse(
            r#"
[rules]
disabled = ["UnreachableCode"]

[rules.UndefinedVariable]
ignorePregMatch = "1"
"#,
        )
        .unwrap();
        let analyzer = Analyzer::new(config);
        assert_eq!(analyzer.enabled_rules(), &["UndefinedVariable"]);

        let issues = analyze(
            &analyzer,
            "<?php\nfunction f($s) {\n    preg_match('/a/', $s, $m);\n    return $m;\n    echo 'dead';\n}\n",
        );
        assert!(issues.is_empty(), "unexpected issues: {:?}", issues.issues());
    }

    #[test]
    fn test_parse_error_is_reported() {
        let analyzer = Analyzer::with_defaults();
        let issues = analyze(&analyzer, "<?php\nfunction f( {\n");

        let parse_errors: Vec<_> = issues.by_rule(PARSE_ERROR).collect();
        assert_eq!(parse_errors.len(), 1);
        assert!(!parse_errors[0].is_violation());
    }

    #[test]
    fn test_analyze_paths_respects_exclude() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src");
        let vendor = temp.path().join("vendor");
        fs::create_dir_all(&src).unwrap();
        fs::create_dir_all(&vendor).unwrap();

        fs::write(src.join("a.php"), "<?php\nfunction a() {\n    return $x;\n}\n").unwrap();
        fs::write(src.join("notes.txt"), "return $x;").unwrap();
        fs::write(vendor.join("b.php"), "<?php\nfunction b() {\n    return $y;\n}\n").unwrap();

        let config = Config::parse("[paths]\nexclude = [\"vendor/\"]\n").unwrap();
        let analyzer = Analyzer::new(config);
        let issues = analyzer.analyze_paths(&[temp.path()]).unwrap();

        assert_eq!(issues.len(), 1);
        assert_eq!(issues.issues()[0].file, src.join("a.php"));
    }

    #[test]
    fn test_unreadable_file_does_not_stop_the_run() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("a.php"), "<?php\nfunction a() {\n    return $x;\n}\n").unwrap();
        fs::write(temp.path().join("b.php"), b"<?php\necho 'caf\xe9';\n").unwrap();

        let analyzer = Analyzer::with_defaults();
        let issues = analyzer.analyze_paths(&[temp.path()]).unwrap();

        let rules: Vec<_> = issues.issues().iter().map(|i| i.rule.as_str()).collect();
        assert_eq!(rules, vec!["UndefinedVariable", IO_ERROR]);

        let io_error = &issues.issues()[1];
        assert_eq!(io_error.file, temp.path().join("b.php"));
        assert!(!io_error.is_violation());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let analyzer = Analyzer::with_defaults();
        let result = analyzer.analyze_file(Path::new("/definitely/not/here.php"));
        assert!(matches!(result, Err(AnalyzeError::IoError { .. })));
    }
}
