//! Configuration loading and root folder resolution

use crate::{Error, Result};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "SWIMREC_CONFIG";

/// Logging section shared by every swimrec TOML file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive when RUST_LOG is unset (e.g. "info", "swimrec_ingest=debug")
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Root folder resolution, highest priority first:
/// 1. Command-line argument
/// 2. Environment variable
/// 3. TOML config value
/// 4. OS-dependent compiled default
pub fn resolve_root_folder(
    cli_arg: Option<&str>,
    env_var_name: &str,
    toml_value: Option<&Path>,
) -> PathBuf {
    if let Some(path) = cli_arg {
        return PathBuf::from(path);
    }

    if let Ok(path) = std::env::var(env_var_name) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    if let Some(path) = toml_value {
        return path.to_path_buf();
    }

    default_root_folder()
}

/// Locate the config file for `file_name`.
///
/// `$SWIMREC_CONFIG` wins when set. Otherwise the user config dir
/// (`~/.config/swimrec/<file_name>` on Linux) and, on Linux, `/etc/swimrec/<file_name>`
/// are tried in order. Returns `None` when no file exists.
pub fn locate_config_file(file_name: &str) -> Option<PathBuf> {
    if let Ok(explicit) = std::env::var(CONFIG_ENV_VAR) {
        if !explicit.trim().is_empty() {
            return Some(PathBuf::from(explicit));
        }
    }

    let user_config = dirs::config_dir().map(|d| d.join("swimrec").join(file_name));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/swimrec").join(file_name);
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

/// Load a TOML config file, falling back to `T::default()` when the file is absent.
///
/// A file that exists but does not parse is an error: silently running with
/// defaults would hide a typo in source priorities.
pub fn load_toml_config<T>(path: Option<&Path>) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    let Some(path) = path else {
        tracing::debug!("No config file found, using defaults");
        return Ok(T::default());
    };

    if !path.exists() {
        tracing::debug!(path = %path.display(), "Config file missing, using defaults");
        return Ok(T::default());
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read TOML failed ({}): {}", path.display(), e)))?;

    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse TOML failed ({}): {}", path.display(), e)))
}

/// Write a TOML config atomically (temp file + rename).
pub fn write_toml_config<T: Serialize>(config: &T, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)
        .map_err(|e| Error::Config(format!("Serialize TOML failed: {}", e)))?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let temp_path = path.with_extension("toml.tmp");
    std::fs::write(&temp_path, content)?;
    std::fs::rename(&temp_path, path)?;

    tracing::debug!(path = %path.display(), "Config written");
    Ok(())
}

/// Get OS-dependent default root folder path
pub fn default_root_folder() -> PathBuf {
    if cfg!(target_os = "linux") {
        // ~/.local/share/swimrec (or /var/lib/swimrec for system-wide)
        dirs::data_local_dir()
            .map(|d| d.join("swimrec"))
            .unwrap_or_else(|| PathBuf::from("/var/lib/swimrec"))
    } else if cfg!(target_os = "macos") {
        dirs::data_dir()
            .map(|d| d.join("swimrec"))
            .unwrap_or_else(|| PathBuf::from("/Library/Application Support/swimrec"))
    } else if cfg!(target_os = "windows") {
        dirs::data_local_dir()
            .map(|d| d.join("swimrec"))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\swimrec"))
    } else {
        PathBuf::from("./swimrec_data")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_arg_wins() {
        let resolved = resolve_root_folder(
            Some("/from/cli"),
            "SWIMREC_TEST_UNSET_ROOT_VAR",
            Some(Path::new("/from/toml")),
        );
        assert_eq!(resolved, PathBuf::from("/from/cli"));
    }

    #[test]
    fn test_toml_used_when_no_cli_or_env() {
        let resolved = resolve_root_folder(
            None,
            "SWIMREC_TEST_UNSET_ROOT_VAR",
            Some(Path::new("/from/toml")),
        );
        assert_eq!(resolved, PathBuf::from("/from/toml"));
    }

    #[test]
    fn test_default_root_folder_named_swimrec() {
        let folder = default_root_folder();
        assert!(folder.to_string_lossy().contains("swimrec"));
    }

    #[test]
    fn test_load_missing_file_gives_default() {
        let loaded: LoggingConfig =
            load_toml_config(Some(Path::new("/nonexistent/swimrec.toml"))).unwrap();
        assert_eq!(loaded, LoggingConfig::default());
    }
}
