//! Debug log for messdetector-analyze
//!
//! A global, mutex-guarded file logger. Every helper is a no-op until
//! [`init_logger`] has been called, so library code can log freely.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Global logger instance
static LOGGER: Mutex<Option<AnalyzeLogger>> = Mutex::new(None);

/// Logger for analyze operations
pub struct AnalyzeLogger {
    file: File,
    path: PathBuf,
}

impl AnalyzeLogger {
    /// Create a new logger writing to the specified path
    pub fn new(log_path: &Path) -> std::io::Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(log_path)?;

        Ok(Self {
            file,
            path: log_path.to_path_buf(),
        })
    }

    /// Write a log message
    pub fn log(&mut self, message: &str) {
        let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
        let _ = writeln!(self.file, "[{}] {}", timestamp, message);
        let _ = self.file.flush();
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Log a section header
    pub fn section(&mut self, title: &str) {
        let separator = "=".repeat(60);
        self.log(&separator);
        self.log(title);
        self.log(&separator);
    }

    /// Log a subsection
    pub fn subsection(&mut self, title: &str) {
        let separator = "-".repeat(40);
        self.log(&separator);
        self.log(title);
        self.log(&separator);
    }
}

/// Initialize the global logger
pub fn init_logger(log_path: Option<&Path>) -> std::io::Result<PathBuf> {
    let path = log_path
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| {
            let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
            std::env::temp_dir().join(format!("messdetector-{}.log", timestamp))
        });

    let logger = AnalyzeLogger::new(&path)?;

    if let Ok(mut guard) = LOGGER.lock() {
        *guard = Some(logger);
    }

    Ok(path)
}

/// Log a message to the global logger
pub fn log(message: &str) {
    if let Ok(mut guard) = LOGGER.lock() {
        if let Some(ref mut logger) = *guard {
            logger.log(message);
        }
    }
}

/// Log a section header
pub fn section(title: &str) {
    if let Ok(mut guard) = LOGGER.lock() {
        if let Some(ref mut logger) = *guard {
            logger.section(title);
        }
    }
}

/// Log a subsection
pub fn subsection(title: &str) {
    if let Ok(mut guard) = LOGGER.lock() {
        if let Some(ref mut logger) = *guard {
            logger.subsection(title);
        }
    }
}

/// Check if logging is enabled
pub fn is_enabled() -> bool {
    if let Ok(guard) = LOGGER.lock() {
        guard.is_some()
    } else {
        false
    }
}

/// Path of the active log file, if logging was initialized
pub fn path() -> Option<PathBuf> {
    LOGGER
        .lock()
        .ok()
        .and_then(|guard| guard.as_ref().map(|logger| logger.path().to_path_buf()))
}

/// Log configuration loading
pub fn log_config_load(path: &Path) {
    section("CONFIGURATION LOADING");
    log(&format!("Loading config from: {}", path.display()));
}

/// Log an option that was overridden from the command line
pub fn log_option_override(rule: &str, option: &str, value: &str) {
    log(&format!("[cli] rules.{}.{} = {}", rule, option, value));
}

/// Log summary of configuration
pub fn log_config_summary(rules: &[&str], paths_count: usize, exclude_count: usize) {
    section("CONFIGURATION SUMMARY");
    log(&format!("Enabled rules: {}", rules.join(", ")));
    log(&format!("Paths to analyze: {}", paths_count));
    log(&format!("Exclude patterns: {}", exclude_count));
}

/// Log a skipped path
pub fn log_excluded(path: &Path) {
    log(&format!("EXCLUDED: {}", path.display()));
}

/// Log analysis start
pub fn log_analysis_start(files_count: usize) {
    section("ANALYSIS START");
    log(&format!("Analyzing {} files", files_count));
}

/// Log a parse error; the recovered tree is still analyzed
pub fn log_parse_error(file: &Path, message: &str) {
    log(&format!("PARSE ERROR: {} - {}", file.display(), message));
}

/// Log a file that could not be read; the run continues without it
pub fn log_file_error(file: &Path, message: &str) {
    log(&format!("READ ERROR: {} - {}", file.display(), message));
}

/// Log a rule that aborted on one unit
pub fn log_rule_error(file: &Path, rule: &str, unit: &str, error: &str) {
    subsection("RULE ERROR");
    log(&format!("File: {}", file.display()));
    log(&format!("Rule: {}", rule));
    log(&format!("Unit: {}", unit));
    log(&format!("  Error: {}", error));
}

/// Log analysis complete
pub fn log_analysis_complete(violations: usize, internal_errors: usize) {
    section("ANALYSIS COMPLETE");
    log(&format!("Violations found: {}", violations));
    log(&format!("Internal errors: {}", internal_errors));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logger_writes_timestamped_lines() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("debug.log");

        let mut logger = AnalyzeLogger::new(&path).unwrap();
        logger.section("TITLE");
        logger.log("hello");
        assert_eq!(logger.path(), path.as_path());

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = contents.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[1].ends_with("] TITLE"));
        assert!(lines[3].starts_with('['));
        assert!(lines[3].ends_with("] hello"));
    }
}
