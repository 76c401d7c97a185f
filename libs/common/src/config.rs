//! Dashboard configuration
//!
//! Layered with figment: built-in defaults, then an optional config file
//! (format picked by extension), then `GRIDLOAD_*` environment variables.

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Json, Serialized, Toml, Yaml},
    Figment,
};
use gridload_model::{
    ResampleRule, TargetSelector, TimestampResolver, TopN, ViewDefaults, DEFAULT_SYSTEM_TOTAL_ZONE,
    DEFAULT_TOP_N, DEFAULT_WINDOW_DAYS,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

/// Environment variable prefix, e.g. `GRIDLOAD_TOP_N=7`
pub const ENV_PREFIX: &str = "GRIDLOAD_";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Default dataset path when the CLI is not given one
    pub data_path: Option<PathBuf>,
    /// Zone that already holds the system-wide total
    pub system_total_zone: String,
    /// Zones selected by default when the dataset has them
    pub preferred_zones: Vec<String>,
    pub default_rule: ResampleRule,
    pub default_window_days: i64,
    pub top_n: usize,
    /// Force this column as the timestamp instead of detecting one
    pub timestamp_column: Option<String>,
    pub log_level: String,
    /// Write daily-rolling log files here
    pub log_dir: Option<PathBuf>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        let view = ViewDefaults::default();
        Self {
            data_path: None,
            system_total_zone: DEFAULT_SYSTEM_TOTAL_ZONE.to_string(),
            preferred_zones: view.preferred_zones,
            default_rule: view.rule,
            default_window_days: DEFAULT_WINDOW_DAYS,
            top_n: DEFAULT_TOP_N,
            timestamp_column: None,
            log_level: "info".to_string(),
            log_dir: None,
        }
    }
}

impl DashboardConfig {
    /// Load defaults, then `path` if given, then the environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(DashboardConfig::default()));

        if let Some(path) = path {
            if !path.exists() {
                return Err(Error::Config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            let extension = path
                .extension()
                .and_then(|s| s.to_str())
                .unwrap_or("")
                .to_ascii_lowercase();
            figment = match extension.as_str() {
                "toml" => figment.merge(Toml::file(path)),
                "yaml" | "yml" => figment.merge(Yaml::file(path)),
                "json" => figment.merge(Json::file(path)),
                _ => {
                    return Err(Error::Config(format!(
                        "Unsupported config file format: {}",
                        extension
                    )))
                },
            };
            debug!("Config file: {}", path.display());
        }

        let config: DashboardConfig = figment.merge(Env::prefixed(ENV_PREFIX)).extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Range checks that serde cannot express
    pub fn validate(&self) -> Result<()> {
        if self.system_total_zone.trim().is_empty() {
            return Err(Error::Config("system_total_zone cannot be empty".to_string()));
        }
        if self.default_window_days < 1 {
            return Err(Error::Config(format!(
                "default_window_days must be at least 1, got {}",
                self.default_window_days
            )));
        }
        TopN::new(self.top_n).map_err(|e| Error::Config(e.to_string()))?;
        if self.timestamp_column.as_deref().is_some_and(|c| c.trim().is_empty()) {
            return Err(Error::Config("timestamp_column cannot be blank".to_string()));
        }
        Ok(())
    }

    pub fn view_defaults(&self) -> Result<ViewDefaults> {
        Ok(ViewDefaults {
            window_days: self.default_window_days,
            preferred_zones: self.preferred_zones.clone(),
            rule: self.default_rule,
            top_n: TopN::new(self.top_n)?,
        })
    }

    pub fn target_selector(&self) -> TargetSelector {
        TargetSelector::new(self.system_total_zone.clone())
    }

    pub fn timestamp_resolver(&self) -> TimestampResolver {
        match &self.timestamp_column {
            Some(column) => TimestampResolver::with_explicit_column(column.clone()),
            None => TimestampResolver::new(),
        }
    }

    /// Effective configuration as YAML
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}
