use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::contract::ContractVersion;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub classifier: ClassifierConfig,
    #[serde(default)]
    pub rename: RenameConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Roots of the records hierarchy.
#[derive(Debug, Deserialize, Clone)]
pub struct PathsConfig {
    #[serde(default = "default_deals_root")]
    pub deals_root: PathBuf,
    #[serde(default = "default_accounts_root")]
    pub accounts_root: PathBuf,
    /// Lookups made by `docsort file` before giving up; shares can lag
    /// behind the upstream record.
    #[serde(default = "default_resolve_attempts")]
    pub resolve_attempts: u32,
    /// Base delay between lookups; the n-th retry waits n times this.
    #[serde(default = "default_resolve_delay_secs")]
    pub resolve_delay_secs: u64,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            deals_root: default_deals_root(),
            accounts_root: default_accounts_root(),
            resolve_attempts: default_resolve_attempts(),
            resolve_delay_secs: default_resolve_delay_secs(),
        }
    }
}

fn default_deals_root() -> PathBuf {
    PathBuf::from("/srv/records/Deals")
}
fn default_accounts_root() -> PathBuf {
    PathBuf::from("/srv/records/Accounts")
}
fn default_resolve_attempts() -> u32 {
    3
}
fn default_resolve_delay_secs() -> u64 {
    10
}

#[derive(Debug, Deserialize, Clone)]
pub struct ClassifierConfig {
    #[serde(default = "default_engine")]
    pub engine: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default = "default_contract_version")]
    pub contract_version: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            engine: default_engine(),
            model: None,
            contract_version: default_contract_version(),
            max_tokens: default_max_tokens(),
            max_retries: default_max_retries(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_engine() -> String {
    "disabled".to_string()
}
fn default_contract_version() -> String {
    ContractVersion::LATEST.as_str().to_string()
}
fn default_max_tokens() -> u32 {
    1000
}
fn default_max_retries() -> u32 {
    5
}
fn default_timeout_secs() -> u64 {
    120
}

impl ClassifierConfig {
    pub fn is_enabled(&self) -> bool {
        self.engine != "disabled"
    }

    pub fn version(&self) -> Result<ContractVersion> {
        self.contract_version.parse()
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct RenameConfig {
    /// File names that must never be renamed.
    #[serde(default = "default_protected_names")]
    pub protected_names: Vec<String>,
    /// Extensions (without dot, lowercase) eligible for classification.
    #[serde(default = "default_allowed_extensions")]
    pub allowed_extensions: Vec<String>,
}

impl Default for RenameConfig {
    fn default() -> Self {
        Self {
            protected_names: default_protected_names(),
            allowed_extensions: default_allowed_extensions(),
        }
    }
}

fn default_protected_names() -> Vec<String> {
    vec![
        "Housing_Refund_Request.pdf".to_string(),
        "Housing_Refund_Modification.pdf".to_string(),
    ]
}
fn default_allowed_extensions() -> Vec<String> {
    ["pdf", "png", "jpg", "jpeg"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// When set, events are also written to a timestamped file here.
    #[serde(default)]
    pub directory: Option<PathBuf>,
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directory: None,
            level: default_level(),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

impl Config {
    /// Defaults for every section; used when no config file exists.
    pub fn minimal() -> Self {
        Self {
            paths: PathsConfig::default(),
            classifier: ClassifierConfig::default(),
            rename: RenameConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    validate(&config)?;
    Ok(config)
}

/// Load `path` if it exists, otherwise fall back to [`Config::minimal`].
pub fn load_or_minimal(path: &Path) -> Result<Config> {
    if path.exists() {
        load_config(path)
    } else {
        Ok(Config::minimal())
    }
}

fn validate(config: &Config) -> Result<()> {
    if config.paths.resolve_attempts == 0 {
        anyhow::bail!("paths.resolve_attempts must be >= 1");
    }

    // Validate classifier
    if config.classifier.max_tokens == 0 {
        anyhow::bail!("classifier.max_tokens must be > 0");
    }

    config
        .classifier
        .version()
        .with_context(|| "Invalid classifier.contract_version")?;

    match config.classifier.engine.as_str() {
        "disabled" | "anthropic" => {}
        other => anyhow::bail!(
            "Unknown classifier engine: '{}'. Must be disabled or anthropic.",
            other
        ),
    }

    if config.classifier.is_enabled() && config.classifier.model.is_none() {
        anyhow::bail!(
            "classifier.model must be specified when engine is '{}'",
            config.classifier.engine
        );
    }

    // Validate rename
    if config.rename.allowed_extensions.is_empty() {
        anyhow::bail!("rename.allowed_extensions must not be empty");
    }

    Ok(())
}
