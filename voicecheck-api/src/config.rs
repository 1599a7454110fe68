//! Configuration resolution for voicecheck-api
//!
//! Sources, highest priority first: command line, environment (via clap
//! `env` fallbacks), TOML file, built-in defaults.

use std::path::{Path, PathBuf};

use clap::Parser;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use voicecheck_core::{Analyzer, Error, Result, RuleSet};

use crate::DEFAULT_MAX_BODY_BYTES;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_RULE_SET: &str = "advanced";
pub const DEFAULT_LOG_FILTER: &str = "voicecheck_api=info,voicecheck_core=info,tower_http=info";

/// Command-line arguments for voicecheck-api
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "voicecheck-api")]
#[command(about = "AI voice detection service")]
#[command(version)]
pub struct Args {
    /// TOML configuration file
    #[arg(short, long, env = "VOICECHECK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Address to bind
    #[arg(long, env = "VOICECHECK_HOST")]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "VOICECHECK_PORT")]
    pub port: Option<u16>,

    /// Shared secret expected in `Authorization: Bearer <key>`
    #[arg(long, env = "VOICECHECK_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Built-in rule table: advanced or basic
    #[arg(long, env = "VOICECHECK_RULE_SET")]
    pub rule_set: Option<String>,

    /// TOML rule table replacing the built-in one
    #[arg(long, env = "VOICECHECK_RULES_FILE")]
    pub rules_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. "debug" or "voicecheck_core=debug"
    pub level: Option<String>,
}

/// Contents of the TOML configuration file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub api_key: Option<String>,
    pub rule_set: Option<String>,
    pub rules_file: Option<PathBuf>,
    /// 0 keeps each clip's native rate
    pub target_sample_rate: Option<u32>,
    pub normalize: Option<bool>,
    pub max_body_bytes: Option<usize>,
    /// Longest clip analysed, in seconds
    pub max_duration_seconds: Option<f64>,
    pub logging: LoggingConfig,
}

impl TomlConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
    }

    /// File named by `--config`, or an empty table
    pub fn for_args(args: &Args) -> Result<Self> {
        match &args.config {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Log filter from `[logging] level`, or the default
    pub fn log_filter(&self) -> String {
        self.logging
            .level
            .clone()
            .filter(|l| !l.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string())
    }
}

/// Fully resolved service settings
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub host: String,
    pub port: u16,
    pub api_key: String,
    pub rule_set: String,
    pub rules_file: Option<PathBuf>,
    pub target_sample_rate: Option<u32>,
    pub normalize: Option<bool>,
    pub max_body_bytes: usize,
    pub max_duration_seconds: Option<f64>,
}

/// Validate API key (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}

/// Resolve the API key
///
/// **Priority:** command line / environment → TOML
pub fn resolve_api_key(cli_key: Option<&str>, toml_key: Option<&str>) -> Result<String> {
    let cli_key = cli_key.filter(|k| is_valid_key(k));
    let toml_key = toml_key.filter(|k| is_valid_key(k));

    if cli_key.is_some() && toml_key.is_some() {
        warn!("API key found in both command line/environment and TOML. Using command line/environment.");
    }

    if let Some(key) = cli_key {
        info!("API key loaded from command line/environment");
        return Ok(key.to_string());
    }
    if let Some(key) = toml_key {
        info!("API key loaded from TOML config");
        return Ok(key.to_string());
    }

    Err(Error::Config(
        "API key not configured. Set one of:\n\
         1. Command line: --api-key <key>\n\
         2. Environment: VOICECHECK_API_KEY=<key>\n\
         3. TOML config: api_key = \"<key>\""
            .to_string(),
    ))
}

impl ServiceConfig {
    /// Merge arguments over the TOML file
    pub fn resolve(args: &Args, toml: &TomlConfig) -> Result<Self> {
        let api_key = resolve_api_key(args.api_key.as_deref(), toml.api_key.as_deref())?;

        let max_body_bytes = toml.max_body_bytes.unwrap_or(DEFAULT_MAX_BODY_BYTES);
        if max_body_bytes == 0 {
            return Err(Error::Config("max_body_bytes must be positive".to_string()));
        }

        Ok(Self {
            host: args
                .host
                .clone()
                .or_else(|| toml.host.clone())
                .unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: args.port.or(toml.port).unwrap_or(DEFAULT_PORT),
            api_key,
            rule_set: args
                .rule_set
                .clone()
                .or_else(|| toml.rule_set.clone())
                .unwrap_or_else(|| DEFAULT_RULE_SET.to_string()),
            rules_file: args.rules_file.clone().or_else(|| toml.rules_file.clone()),
            target_sample_rate: toml.target_sample_rate,
            normalize: toml.normalize,
            max_body_bytes,
            max_duration_seconds: toml.max_duration_seconds,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Pipeline for the configured rule set and overrides
    pub fn build_analyzer(&self) -> Result<Analyzer> {
        let mut analyzer = Analyzer::for_rule_set(&self.rule_set)?;

        if let Some(path) = &self.rules_file {
            let rules = RuleSet::from_file(path)?;
            info!(
                "Loaded rule table '{}' ({} rules) from {}",
                rules.name,
                rules.rules.len(),
                path.display()
            );
            analyzer = analyzer.with_rules(rules)?;
        }
        if let Some(rate) = self.target_sample_rate {
            analyzer = analyzer.with_target_sample_rate((rate > 0).then_some(rate));
        }
        if let Some(normalize) = self.normalize {
            analyzer = analyzer.with_normalize(normalize);
        }
        if let Some(seconds) = self.max_duration_seconds {
            analyzer = analyzer.with_max_duration(seconds)?;
        }
        Ok(analyzer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_key_wins() {
        let key = resolve_api_key(Some("from-cli"), Some("from-toml")).unwrap();
        assert_eq!(key, "from-cli");
    }

    #[test]
    fn test_toml_key_fallback() {
        assert_eq!(resolve_api_key(None, Some("from-toml")).unwrap(), "from-toml");
        assert_eq!(resolve_api_key(Some("  "), Some("from-toml")).unwrap(), "from-toml");
    }

    #[test]
    fn test_missing_key_is_error() {
        assert!(matches!(resolve_api_key(None, None), Err(Error::Config(_))));
        assert!(resolve_api_key(Some(""), Some("\t")).is_err());
    }

    #[test]
    fn test_defaults() {
        let args = Args {
            api_key: Some("k".into()),
            ..Default::default()
        };
        let config = ServiceConfig::resolve(&args, &TomlConfig::default()).unwrap();
        assert_eq!(config.bind_addr(), "0.0.0.0:8000");
        assert_eq!(config.rule_set, "advanced");
        assert_eq!(config.max_body_bytes, DEFAULT_MAX_BODY_BYTES);
        assert_eq!(config.max_duration_seconds, None);

        let analyzer = config.build_analyzer().unwrap();
        assert_eq!(analyzer.extractor().config().max_duration_seconds, 300.0);
    }

    #[test]
    fn test_duration_limit_applied() {
        let args = Args {
            api_key: Some("k".into()),
            ..Default::default()
        };
        let toml = TomlConfig {
            max_duration_seconds: Some(30.0),
            ..Default::default()
        };
        let config = ServiceConfig::resolve(&args, &toml).unwrap();
        let analyzer = config.build_analyzer().unwrap();
        assert_eq!(analyzer.extractor().config().max_duration_seconds, 30.0);

        let toml = TomlConfig {
            max_duration_seconds: Some(-1.0),
            ..Default::default()
        };
        let config = ServiceConfig::resolve(&args, &toml).unwrap();
        assert!(config.build_analyzer().is_err());
    }

    #[test]
    fn test_log_filter() {
        assert_eq!(TomlConfig::default().log_filter(), DEFAULT_LOG_FILTER);
        let toml = TomlConfig {
            logging: LoggingConfig {
                level: Some("debug".into()),
            },
            ..Default::default()
        };
        assert_eq!(toml.log_filter(), "debug");
    }
}
