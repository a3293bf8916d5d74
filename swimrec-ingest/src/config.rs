//! Configuration resolution for swimrec-ingest
//!
//! Settings come from `swimrec.toml` with environment overrides on top.
//! Root folder priority: CLI/ENV → TOML → OS default.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use swimrec_common::config::{
    load_toml_config, locate_config_file, resolve_root_folder, LoggingConfig,
};
use swimrec_common::{Error, Result};

/// Config file name looked up in the user config dir
pub const CONFIG_FILE_NAME: &str = "swimrec.toml";

/// Database file name inside the root folder
pub const DATABASE_FILE_NAME: &str = "swimrec.db";

pub const ROOT_FOLDER_ENV_VAR: &str = "SWIMREC_ROOT_FOLDER";
pub const MAX_INSERT_ATTEMPTS_ENV_VAR: &str = "SWIMREC_MAX_INSERT_ATTEMPTS";
pub const MAX_LOCK_WAIT_MS_ENV_VAR: &str = "SWIMREC_MAX_LOCK_WAIT_MS";

/// On-disk shape of `swimrec.toml`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub root_folder: Option<PathBuf>,
    pub logging: LoggingConfig,
    pub ingest: IngestSettings,
}

/// `[ingest]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestSettings {
    /// Lookup/insert rounds before an insert race becomes an Error
    pub max_insert_attempts: u32,
    /// Total backoff budget for transient storage failures
    pub max_lock_wait_ms: u64,
    /// Error messages kept in the run summary
    pub max_error_samples: usize,
    /// Priority for sources not listed in `source_priorities`
    pub default_source_priority: i64,
    /// Source name → priority (higher wins); names match case-insensitively
    pub source_priorities: HashMap<String, i64>,
}

impl Default for IngestSettings {
    fn default() -> Self {
        Self {
            max_insert_attempts: 3,
            max_lock_wait_ms: 5000,
            max_error_samples: 50,
            default_source_priority: 0,
            source_priorities: HashMap::new(),
        }
    }
}

/// Case-insensitive source priority table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourcePriorities {
    ranks: HashMap<String, i64>,
    default_rank: i64,
}

impl SourcePriorities {
    pub fn new(ranks: &HashMap<String, i64>, default_rank: i64) -> Self {
        Self {
            ranks: ranks
                .iter()
                .map(|(name, rank)| (fold_source_name(name), *rank))
                .collect(),
            default_rank,
        }
    }

    /// Priority of `source`; unknown or blank sources get the default
    pub fn rank(&self, source: &str) -> i64 {
        self.ranks
            .get(&fold_source_name(source))
            .copied()
            .unwrap_or(self.default_rank)
    }
}

fn fold_source_name(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Resolved runtime configuration for one ingest process
/// Resolved ingest settings.
///
/// Loading happens before logging is up, so `load` records where settings
/// came from instead of logging it; see `config_file` and `env_overrides`.
#[derive(Debug, Clone)]
pub struct IngestConfig {
    /// File the settings were read from, if any
    pub config_file: Option<PathBuf>,
    /// `NAME=value` for every override variable that was applied
    pub env_overrides: Vec<String>,
    pub root_folder: PathBuf,
    pub log_level: String,
    pub max_insert_attempts: u32,
    pub max_lock_wait_ms: u64,
    pub max_error_samples: usize,
    pub priorities: SourcePriorities,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self::from_toml(TomlConfig::default(), None)
    }
}

impl IngestConfig {
    /// Load `swimrec.toml` (if any) and apply environment overrides
    pub fn load(cli_root: Option<&str>) -> Result<Self> {
        let path = locate_config_file(CONFIG_FILE_NAME).filter(|p| p.exists());
        let toml_config: TomlConfig = load_toml_config(path.as_deref())?;
        let mut config = Self::from_toml(toml_config, cli_root);
        config.config_file = path;
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Build from parsed TOML without consulting override variables
    /// other than the root folder.
    pub fn from_toml(toml_config: TomlConfig, cli_root: Option<&str>) -> Self {
        let root_folder = resolve_root_folder(
            cli_root,
            ROOT_FOLDER_ENV_VAR,
            toml_config.root_folder.as_deref(),
        );
        let ingest = toml_config.ingest;

        Self {
            config_file: None,
            env_overrides: Vec::new(),
            root_folder,
            log_level: toml_config.logging.level,
            max_insert_attempts: ingest.max_insert_attempts.max(1),
            max_lock_wait_ms: ingest.max_lock_wait_ms,
            max_error_samples: ingest.max_error_samples,
            priorities: SourcePriorities::new(
                &ingest.source_priorities,
                ingest.default_source_priority,
            ),
        }
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Some(attempts) = env_override::<u32>(MAX_INSERT_ATTEMPTS_ENV_VAR)? {
            self.max_insert_attempts = attempts.max(1);
            self.env_overrides
                .push(format!("{}={}", MAX_INSERT_ATTEMPTS_ENV_VAR, attempts));
        }
        if let Some(wait_ms) = env_override::<u64>(MAX_LOCK_WAIT_MS_ENV_VAR)? {
            self.max_lock_wait_ms = wait_ms;
            self.env_overrides
                .push(format!("{}={}", MAX_LOCK_WAIT_MS_ENV_VAR, wait_ms));
        }
        Ok(())
    }

    /// `<root_folder>/swimrec.db`
    pub fn database_path(&self) -> PathBuf {
        database_path_in(&self.root_folder)
    }
}

pub fn database_path_in(root_folder: &Path) -> PathBuf {
    root_folder.join(DATABASE_FILE_NAME)
}

fn env_override<T: std::str::FromStr>(name: &str) -> Result<Option<T>> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => value
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| Error::Config(format!("{} is not a valid number: {:?}", name, value))),
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = IngestSettings::default();
        assert_eq!(settings.max_insert_attempts, 3);
        assert_eq!(settings.max_lock_wait_ms, 5000);
        assert_eq!(settings.max_error_samples, 50);
    }

    #[test]
    fn test_priorities_case_insensitive() {
        let mut ranks = HashMap::new();
        ranks.insert("World Aquatics".to_string(), 10);
        ranks.insert("wikipedia".to_string(), 1);
        let priorities = SourcePriorities::new(&ranks, 5);

        assert_eq!(priorities.rank("WORLD  aquatics"), 10);
        assert_eq!(priorities.rank("Wikipedia"), 1);
        assert_eq!(priorities.rank("unknown"), 5);
        assert_eq!(priorities.rank(""), 5);
    }

    #[test]
    fn test_parse_toml_sections() {
        let toml_text = r#"
root_folder = "/data/swimrec"

[logging]
level = "debug"

[ingest]
max_insert_attempts = 5

[ingest.source_priorities]
"CONSANAT" = 8
"#;
        let parsed: TomlConfig = toml::from_str(toml_text).unwrap();
        let config = IngestConfig::from_toml(parsed, Some("/from/cli"));

        assert_eq!(config.root_folder, PathBuf::from("/from/cli"));
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.max_insert_attempts, 5);
        assert_eq!(config.max_lock_wait_ms, 5000);
        assert_eq!(config.priorities.rank("consanat"), 8);
        assert_eq!(
            config.database_path(),
            PathBuf::from("/from/cli").join("swimrec.db")
        );
    }

    #[test]
    fn test_zero_attempts_clamped() {
        let mut parsed = TomlConfig::default();
        parsed.ingest.max_insert_attempts = 0;
        let config = IngestConfig::from_toml(parsed, Some("/tmp"));
        assert_eq!(config.max_insert_attempts, 1);
    }
}
