//! Per-rule options read from `[rules.<Name>]` tables
//!
//! Options are read leniently: a missing or ill-typed value falls back to
//! the rule's default and logs a warning instead of failing the run.

use crate::logging;

/// Option table for one rule
#[derive(Debug, Clone, Default)]
pub struct RuleOptions {
    rule: String,
    table: toml::Table,
}

impl RuleOptions {
    pub fn new(rule: impl Into<String>, table: toml::Table) -> Self {
        Self {
            rule: rule.into(),
            table,
        }
    }

    pub fn empty(rule: impl Into<String>) -> Self {
        Self::new(rule, toml::Table::new())
    }

    /// Override a value (used for CLI flags)
    pub fn set(&mut self, name: &str, value: impl Into<toml::Value>) {
        self.table.insert(name.to_string(), value.into());
    }

    pub fn with(mut self, name: &str, value: impl Into<toml::Value>) -> Self {
        self.set(name, value);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.table.contains_key(name)
    }

    /// Boolean option; accepts `true`/`false`, `"true"`/`"false"`, `"1"`/`"0"` and `1`/`0`
    pub fn bool(&self, name: &str, default: bool) -> bool {
        let Some(value) = self.table.get(name) else {
            return default;
        };
        let parsed = match value {
            toml::Value::Boolean(b) => Some(*b),
            toml::Value::Integer(0) => Some(false),
            toml::Value::Integer(1) => Some(true),
            toml::Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" | "on" => Some(true),
                "false" | "0" | "no" | "off" => Some(false),
                _ => None,
            },
            _ => None,
        };
        parsed.unwrap_or_else(|| {
            self.warn_invalid(name, value, &default.to_string());
            default
        })
    }

    /// String option
    pub fn string(&self, name: &str, default: &str) -> String {
        match self.table.get(name) {
            None => default.to_string(),
            Some(toml::Value::String(s)) => s.clone(),
            Some(value) => {
                self.warn_invalid(name, value, default);
                default.to_string()
            }
        }
    }

    pub(crate) fn warn_invalid(&self, name: &str, value: &toml::Value, default: &str) {
        logging::log(&format!(
            "WARNING: [rules.{}] {} = {} is invalid, using default {}",
            self.rule, name, value, default
        ));
    }
}
