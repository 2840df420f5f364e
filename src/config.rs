use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

/// Top-level configuration for the voltimeline tool.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Logging verbosity (trace, debug, info, warn, error). Default: "info".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Leading frames dropped from plotted frame-time series. Never affects
    /// summary means. Default: 5.
    #[serde(default = "default_ignore_first_n_frametimes")]
    pub ignore_first_n_frametimes: usize,

    /// Abort the batch on the first failed run instead of skipping it.
    #[serde(default)]
    pub fail_fast: bool,

    /// Largest run file accepted, in bytes. Default: 256MiB.
    #[serde(default = "default_max_run_file_size")]
    pub max_run_file_size: u64,

    /// Output configuration.
    #[serde(default)]
    pub output: OutputConfig,
}

/// Output configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Output format. Default: text.
    #[serde(default)]
    pub format: OutputFormat,

    /// Pretty-print JSON output. Default: true.
    #[serde(default = "default_true")]
    pub pretty_json: bool,
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

// --- Defaults ---

fn default_log_level() -> String {
    "info".to_string()
}

fn default_ignore_first_n_frametimes() -> usize {
    5
}

fn default_max_run_file_size() -> u64 {
    256 * 1024 * 1024
}

fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            ignore_first_n_frametimes: default_ignore_first_n_frametimes(),
            fail_fast: false,
            max_run_file_size: default_max_run_file_size(),
            output: OutputConfig::default(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Text,
            pretty_json: true,
        }
    }
}

// --- Validation and loading ---

impl Config {
    /// Load configuration from a YAML file.
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;

        Self::from_yaml_str(&data).with_context(|| format!("loading config file {}", path.display()))
    }

    /// Parse and validate configuration from YAML text.
    pub fn from_yaml_str(data: &str) -> Result<Self> {
        let cfg: Config = serde_yaml::from_str(data).context("parsing config")?;

        cfg.validate()?;

        Ok(cfg)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        if self.log_level.trim().is_empty() {
            bail!("log_level must not be empty");
        }

        if self.max_run_file_size == 0 {
            bail!("max_run_file_size must be positive");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_values() {
        let cfg = Config::default();
        assert_eq!(cfg.log_level, "info");
        assert_eq!(cfg.ignore_first_n_frametimes, 5);
        assert!(!cfg.fail_fast);
        assert_eq!(cfg.max_run_file_size, 256 * 1024 * 1024);
        assert_eq!(cfg.output.format, OutputFormat::Text);
        assert!(cfg.output.pretty_json);
    }

    #[test]
    fn test_empty_yaml_uses_defaults() {
        let cfg = Config::from_yaml_str("{}").expect("parse");
        assert_eq!(cfg.ignore_first_n_frametimes, 5);
        assert_eq!(cfg.output.format, OutputFormat::Text);
    }

    #[test]
    fn test_parse_full_yaml() {
        let yaml = r#"
log_level: debug
ignore_first_n_frametimes: 10
fail_fast: true
max_run_file_size: 1048576
output:
  format: json
  pretty_json: false
"#;
        let cfg = Config::from_yaml_str(yaml).expect("parse");
        assert_eq!(cfg.log_level, "debug");
        assert_eq!(cfg.ignore_first_n_frametimes, 10);
        assert!(cfg.fail_fast);
        assert_eq!(cfg.max_run_file_size, 1_048_576);
        assert_eq!(cfg.output.format, OutputFormat::Json);
        assert!(!cfg.output.pretty_json);
    }

    #[test]
    fn test_unknown_output_format_rejected() {
        let err = Config::from_yaml_str("output:\n  format: svg\n").unwrap_err();
        assert!(format!("{err:#}").contains("parsing config"));
    }

    #[test]
    fn test_validation_zero_file_size() {
        let err = Config::from_yaml_str("max_run_file_size: 0").unwrap_err();
        assert!(err.to_string().contains("max_run_file_size"));
    }

    #[test]
    fn test_validation_empty_log_level() {
        let cfg = Config {
            log_level: " ".to_string(),
            ..Default::default()
        };
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("log_level"));
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load(Path::new("/nonexistent/voltimeline.yaml")).unwrap_err();
        assert!(err.to_string().contains("reading config file"));
    }
}
