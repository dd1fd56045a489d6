//! Configuration file support for messdetector
//!
//! Loads `.messdetector.toml` from the current directory or its parents:
//!
//! ```toml
//! [rules]
//! enabled = ["UndefinedVariable", "UnreachableCode"]
//! disabled = []
//!
//! [rules.UndefinedVariable]
//! ignorePregMatch = true
//!
//! [rules.UnreachableCode]
//! finality = "structural"
//!
//! [paths]
//! exclude = ["vendor/"]
//! ```

mod rules;

pub use rules::RulesConfig;

use crate::logging;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the configuration file searched for
pub const CONFIG_FILE_NAME: &str = ".messdetector.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Configuration file structure
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub rules: RulesConfig,
    pub paths: PathsConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Glob patterns to exclude from processing
    pub exclude: Vec<String>,
}

impl Config {
    /// Load config from `.messdetector.toml` searching from the current directory upward
    pub fn load() -> Result<Option<(Config, PathBuf)>, ConfigError> {
        let cwd = std::env::current_dir().map_err(|source| ConfigError::IoError {
            path: PathBuf::from("."),
            source,
        })?;
        Self::load_from(cwd)
    }

    /// Load config searching from the given directory upward
    pub fn load_from(start_dir: PathBuf) -> Result<Option<(Config, PathBuf)>, ConfigError> {
        let mut current = Some(start_dir.as_path());

        while let Some(dir) = current {
            let config_path = dir.join(CONFIG_FILE_NAME);
            if config_path.exists() {
                let config = Self::load_path(&config_path)?;
                return Ok(Some((config, config_path)));
            }
            current = dir.parent();
        }

        Ok(None)
    }

    /// Load config from a specific path
    pub fn load_path(path: &Path) -> Result<Config, ConfigError> {
        logging::log_config_load(path);
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::IoError {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&contents).map_err(|source| ConfigError::ParseError {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn parse(contents: &str) -> Result<Config, toml::de::Error> {
        toml::from_str(contents)
    }

    /// Check if a path should be excluded based on config patterns
    pub fn should_exclude(&self, path: &Path) -> bool {
        let path_str = path.to_string_lossy();

        for pattern in &self.paths.exclude {
            if let Ok(glob_pattern) = glob::Pattern::new(pattern) {
                if glob_pattern.matches(&path_str) {
                    return true;
                }
                if let Some(file_name) = path.file_name() {
                    if glob_pattern.matches(&file_name.to_string_lossy()) {
                        return true;
                    }
                }
            }

            // Directory patterns match any path segment
            if pattern.ends_with('/') {
                let dir_pattern = pattern.trim_end_matches('/');
                if path_str.contains(&format!("/{}/", dir_pattern))
                    || path_str.starts_with(&format!("{}/", dir_pattern))
                {
                    return true;
                }
            }
        }

        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn create_config(dir: &Path, content: &str) {
        fs::write(dir.join(CONFIG_FILE_NAME), content).unwrap();
    }

    #[test]
    fn test_load_basic_config() {
        let temp = TempDir::new().unwrap();
        create_config(
            temp.path(),
            r#"
[rules]
enabled = ["UndefinedVariable"]
disabled = ["UnreachableCode"]

[rules.UndefinedVariable]
ignorePregMatch = true

[paths]
exclude = ["vendor/", "*.generated.php"]
"#,
        );

        let (config, path) = Config::load_from(temp.path().to_path_buf())
            .unwrap()
            .unwrap();

        assert_eq!(path, temp.path().join(CONFIG_FILE_NAME));
        assert_eq!(
            config.rules.enabled,
            Some(vec!["UndefinedVariable".to_string()])
        );
        assert_eq!(config.rules.disabled, vec!["UnreachableCode".to_string()]);
        assert!(config
            .rules
            .options_for("UndefinedVariable")
            .bool("ignorePregMatch", false));
        assert_eq!(
            config.paths.exclude,
            vec!["vendor/".to_string(), "*.generated.php".to_string()]
        );
    }

    #[test]
    fn test_load_from_parent_directory() {
        let temp = TempDir::new().unwrap();
        create_config(temp.path(), "[paths]\nexclude = [\"build/\"]\n");
        let nested = temp.path().join("src").join("Domain");
        fs::create_dir_all(&nested).unwrap();

        let (config, path) = Config::load_from(nested).unwrap().unwrap();
        assert_eq!(path, temp.path().join(CONFIG_FILE_NAME));
        assert_eq!(config.paths.exclude, vec!["build/".to_string()]);
    }

    #[test]
    fn test_load_empty_config() {
        let temp = TempDir::new().unwrap();
        create_config(temp.path(), "");

        let (config, _) = Config::load_from(temp.path().to_path_buf())
            .unwrap()
            .unwrap();

        assert!(config.rules.enabled.is_none());
        assert!(config.rules.disabled.is_empty());
        assert!(config.paths.exclude.is_empty());
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        let temp = TempDir::new().unwrap();
        create_config(temp.path(), "[rules\nenabled = ");

        let result = Config::load_from(temp.path().to_path_buf());
        assert!(matches!(result, Err(ConfigError::ParseError { .. })));
    }

    #[test]
    fn test_should_exclude_glob() {
        let config = Config {
            paths: PathsConfig {
                exclude: vec!["*.generated.php".to_string()],
            },
            ..Default::default()
        };

        assert!(config.should_exclude(Path::new("foo.generated.php")));
        assert!(!config.should_exclude(Path::new("foo.php")));
    }

    #[test]
    fn test_should_exclude_directory() {
        let config = Config {
            paths: PathsConfig {
                exclude: vec!["vendor/".to_string()],
            },
            ..Default::default()
        };

        assert!(config.should_exclude(Path::new("project/vendor/autoload.php")));
        assert!(config.should_exclude(Path::new("vendor/package/file.php")));
        assert!(!config.should_exclude(Path::new("src/vendor.php")));
    }
}
