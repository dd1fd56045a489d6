//! The `[rules]` table: rule selection and per-rule option tables

use crate::checks::RuleOptions;
use crate::logging;
use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// If set, only these rules will run
    pub enabled: Option<Vec<String>>,
    /// Rules to exclude (applied after enabled)
    pub disabled: Vec<String>,
    /// `[rules.<Name>]` option tables, kept untyped so bad values can fall back
    #[serde(flatten)]
    pub options: BTreeMap<String, toml::Value>,
}

impl RulesConfig {
    /// Compute the effective set of enabled rules
    ///
    /// Names are matched case-insensitively and returned in the registry's
    /// spelling.
    pub fn effective_rules(&self, all_rules: &[&'static str], cli_rules: &[String]) -> Vec<&'static str> {
        let selected: Option<HashSet<String>> = if !cli_rules.is_empty() {
            Some(cli_rules.iter().map(|r| r.to_lowercase()).collect())
        } else {
            self.enabled
                .as_ref()
                .map(|enabled| enabled.iter().map(|r| r.to_lowercase()).collect())
        };
        let disabled: HashSet<String> = if cli_rules.is_empty() {
            self.disabled.iter().map(|r| r.to_lowercase()).collect()
        } else {
            HashSet::new()
        };

        all_rules
            .iter()
            .copied()
            .filter(|rule| {
                let key = rule.to_lowercase();
                selected.as_ref().map_or(true, |s| s.contains(&key)) && !disabled.contains(&key)
            })
            .collect()
    }

    /// Options for one rule; a missing or non-table entry yields empty options
    pub fn options_for(&self, rule: &str) -> RuleOptions {
        let entry = self
            .options
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(rule))
            .map(|(_, value)| value);

        match entry {
            Some(toml::Value::Table(table)) => RuleOptions::new(rule, table.clone()),
            Some(other) => {
                logging::log(&format!(
                    "WARNING: [rules] {} = {} is not a table, ignoring",
                    rule, other
                ));
                RuleOptions::empty(rule)
            }
            None => RuleOptions::empty(rule),
        }
    }
}
