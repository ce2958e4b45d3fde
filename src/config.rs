//! # Planner Configuration Module
//!
//! Runtime settings for the planner binary, read from the environment (a
//! `.env` file is loaded first by the binary).

use std::path::PathBuf;

use crate::error::PlannerError;

// Environment variable names
pub const DATA_PATH_VAR: &str = "PLANNER_DATA_PATH";
pub const UNITS_PATH_VAR: &str = "PLANNER_UNITS_PATH";
pub const ALIASES_PATH_VAR: &str = "PLANNER_ALIASES_PATH";
pub const FRIDGE_ID_VAR: &str = "PLANNER_FRIDGE_ID";
pub const OUTPUT_VAR: &str = "PLANNER_OUTPUT";
pub const LOG_FORMAT_VAR: &str = "PLANNER_LOG_FORMAT";

pub const DEFAULT_DATA_PATH: &str = "planner.json";

/// How the shopping list is printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// How log lines are written to stderr
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

fn parse_format(var: &str, value: &str) -> Result<bool, PlannerError> {
    match value.trim().to_lowercase().as_str() {
        "" | "text" => Ok(false),
        "json" => Ok(true),
        other => Err(PlannerError::Config(format!(
            "{var} must be 'text' or 'json', got '{other}'"
        ))),
    }
}

/// Configuration structure for a planning run
#[derive(Debug, Clone, PartialEq)]
pub struct PlannerConfig {
    /// JSON snapshot holding recipes and fridges
    pub data_path: PathBuf,
    /// Optional JSON unit catalog replacing the builtin one
    pub units_path: Option<PathBuf>,
    /// Optional JSON alias table extending the builtin one
    pub aliases_path: Option<PathBuf>,
    /// Fridge to compare against; the first fridge when unset
    pub fridge_id: Option<String>,
    pub output: OutputFormat,
    pub log_format: LogFormat,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            units_path: None,
            aliases_path: None,
            fridge_id: None,
            output: OutputFormat::default(),
            log_format: LogFormat::default(),
        }
    }
}

impl PlannerConfig {
    /// Read the configuration from process environment variables
    pub fn from_env() -> Result<Self, PlannerError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the configuration through `lookup`, falling back to defaults for
    /// unset or blank variables
    pub fn from_lookup<F>(lookup: F) -> Result<Self, PlannerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let mut config = Self::default();

        if let Some(path) = get(DATA_PATH_VAR) {
            config.data_path = PathBuf::from(path.trim());
        }
        config.units_path = get(UNITS_PATH_VAR).map(|p| PathBuf::from(p.trim()));
        config.aliases_path = get(ALIASES_PATH_VAR).map(|p| PathBuf::from(p.trim()));
        config.fridge_id = get(FRIDGE_ID_VAR).map(|id| id.trim().to_string());

        if let Some(value) = get(OUTPUT_VAR) {
            config.output = if parse_format(OUTPUT_VAR, &value)? {
                OutputFormat::Json
            } else {
                OutputFormat::Text
            };
        }
        if let Some(value) = get(LOG_FORMAT_VAR) {
            config.log_format = if parse_format(LOG_FORMAT_VAR, &value)? {
                LogFormat::Json
            } else {
                LogFormat::Text
            };
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = PlannerConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, PlannerConfig::default());
        assert_eq!(config.data_path, PathBuf::from("planner.json"));
        assert_eq!(config.output, OutputFormat::Text);
    }

    #[test]
    fn test_all_variables() {
        let config = PlannerConfig::from_lookup(lookup_from(&[
            (DATA_PATH_VAR, "/data/kitchen.json"),
            (UNITS_PATH_VAR, "units.json"),
            (ALIASES_PATH_VAR, "aliases.json"),
            (FRIDGE_ID_VAR, " fridge-2 "),
            (OUTPUT_VAR, "JSON"),
            (LOG_FORMAT_VAR, "json"),
        ]))
        .unwrap();
        assert_eq!(config.data_path, PathBuf::from("/data/kitchen.json"));
        assert_eq!(config.units_path, Some(PathBuf::from("units.json")));
        assert_eq!(config.aliases_path, Some(PathBuf::from("aliases.json")));
        assert_eq!(config.fridge_id.as_deref(), Some("fridge-2"));
        assert_eq!(config.output, OutputFormat::Json);
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn test_blank_values_ignored() {
        let config = PlannerConfig::from_lookup(lookup_from(&[(FRIDGE_ID_VAR, "  ")])).unwrap();
        assert_eq!(config.fridge_id, None);
    }

    #[test]
    fn test_invalid_output_format() {
        let result = PlannerConfig::from_lookup(lookup_from(&[(OUTPUT_VAR, "yaml")]));
        assert!(matches!(result, Err(PlannerError::Config(_))));
    }
}
