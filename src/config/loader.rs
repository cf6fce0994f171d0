// src/config/loader.rs
//! Configuration loader: TOML files layered over defaults, then environment overrides

use crate::config::FeatureConfig;
use crate::error::{FeatureError, FeatureResult};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default environment prefix, e.g. `ICLABEL_PCT_DATA=50`
pub const DEFAULT_ENV_PREFIX: &str = "ICLABEL_";

/// Nested keys are separated by a double underscore, e.g. `ICLABEL_LINE_NOISE__THRESHOLD_DB`
const ENV_NESTING_SEPARATOR: &str = "__";

/// Layered configuration loader
pub struct ConfigLoader {
    config_paths: Vec<PathBuf>,
    env_prefix: Option<String>,
}

impl ConfigLoader {
    /// Loader over the conventional local paths
    pub fn new() -> Self {
        Self {
            config_paths: Self::discover_config_paths(),
            env_prefix: Some(DEFAULT_ENV_PREFIX.to_string()),
        }
    }

    /// Loader with custom paths, later paths take precedence
    pub fn with_paths(paths: Vec<PathBuf>) -> Self {
        Self {
            config_paths: paths,
            env_prefix: Some(DEFAULT_ENV_PREFIX.to_string()),
        }
    }

    /// Replace the environment prefix; `None` disables environment overrides
    pub fn with_env_prefix(mut self, prefix: Option<&str>) -> Self {
        self.env_prefix = prefix.map(str::to_string);
        self
    }

    /// Load, merge and validate the configuration
    pub fn load(&self) -> FeatureResult<FeatureConfig> {
        let mut merged = toml::Value::try_from(FeatureConfig::default())?;

        for config_path in &self.config_paths {
            if !config_path.exists() {
                debug!(path = %config_path.display(), "skipping missing config file");
                continue;
            }
            let file_config = Self::load_config_file(config_path)?;
            merge_toml_values(&mut merged, file_config);
            debug!(path = %config_path.display(), "merged config file");
        }

        if let Some(prefix) = &self.env_prefix {
            apply_environment_overrides(&mut merged, prefix, std::env::vars());
        }

        let config: FeatureConfig = merged.try_into()?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a single file without merging
    pub fn validate_config_file<P: AsRef<Path>>(&self, path: P) -> FeatureResult<FeatureConfig> {
        let value = Self::load_config_file(path.as_ref())?;
        let config: FeatureConfig = value.try_into()?;
        config.validate()?;
        Ok(config)
    }

    /// Write a configuration as pretty TOML
    pub fn export_config<P: AsRef<Path>>(config: &FeatureConfig, path: P) -> FeatureResult<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(config)?;
        std::fs::write(path, content).map_err(|source| FeatureError::ConfigIo {
            path: path.display().to_string(),
            source,
        })
    }

    /// Files layered over the defaults, in load order
    pub fn config_paths(&self) -> &[PathBuf] {
        &self.config_paths
    }

    fn load_config_file(path: &Path) -> FeatureResult<toml::Value> {
        let content = std::fs::read_to_string(path).map_err(|source| FeatureError::ConfigIo {
            path: path.display().to_string(),
            source,
        })?;
        Ok(toml::from_str(&content)?)
    }

    fn discover_config_paths() -> Vec<PathBuf> {
        vec![
            PathBuf::from("config/iclabel.toml"),
            PathBuf::from("iclabel.toml"),
        ]
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn merge_toml_values(base: &mut toml::Value, overlay: toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base_table), toml::Value::Table(overlay_table)) => {
            for (key, value) in overlay_table {
                if let Some(base_value) = base_table.get_mut(&key) {
                    merge_toml_values(base_value, value);
                } else {
                    base_table.insert(key, value);
                }
            }
        }
        (base_value, overlay_value) => {
            *base_value = overlay_value;
        }
    }
}

fn apply_environment_overrides<I>(config: &mut toml::Value, prefix: &str, vars: I)
where
    I: IntoIterator<Item = (String, String)>,
{
    for (key, value) in vars {
        let Some(stripped) = key.strip_prefix(prefix) else {
            continue;
        };
        let path: Vec<String> = stripped
            .to_lowercase()
            .split(ENV_NESTING_SEPARATOR)
            .map(str::to_string)
            .collect();
        debug!(key = %key, "applying environment override");
        set_nested_value(config, &path, parse_env_value(&value));
    }
}

fn parse_env_value(value: &str) -> toml::Value {
    if let Ok(int_val) = value.parse::<i64>() {
        toml::Value::Integer(int_val)
    } else if let Ok(float_val) = value.parse::<f64>() {
        toml::Value::Float(float_val)
    } else if let Ok(bool_val) = value.parse::<bool>() {
        toml::Value::Boolean(bool_val)
    } else if let Ok(array) = toml::from_str::<toml::Table>(&format!("v = {}", value)) {
        array.get("v").cloned().unwrap_or_else(|| toml::Value::String(value.to_string()))
    } else {
        toml::Value::String(value.to_string())
    }
}

fn set_nested_value(config: &mut toml::Value, path: &[String], value: toml::Value) {
    let Some((last, parents)) = path.split_last() else {
        return;
    };

    let mut current = config;
    for part in parents {
        let toml::Value::Table(table) = current else {
            return;
        };
        current = table
            .entry(part.clone())
            .or_insert_with(|| toml::Value::Table(toml::value::Table::new()));
    }

    if let toml::Value::Table(table) = current {
        table.insert(last.clone(), value);
    }
}
