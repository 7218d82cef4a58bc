use crate::application::account_rewriter::AccountIdsPolicy;
use crate::domain::dashboard::AccountId;
use config::builder::DefaultState;
use config::ConfigBuilder;
use serde::Deserialize;
use thiserror::Error;

pub const SOURCE_API_KEY_ENV: &str = "ENV_SOURCE_API_KEY";
pub const TARGET_API_KEY_ENV: &str = "ENV_TARGET_API_KEY";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{account} API key is required: set {account}.api_key or the {env} environment variable")]
    MissingApiKey {
        account: &'static str,
        env: &'static str,
    },

    #[error("invalid migration settings: {0}")]
    Invalid(#[from] config::ConfigError),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    #[default]
    Us,
    Eu,
}

impl Region {
    pub fn graphql_endpoint(&self) -> &'static str {
        match self {
            Region::Us => "https://api.newrelic.com/graphql",
            Region::Eu => "https://api.eu.newrelic.com/graphql",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Region::Us => "us",
            Region::Eu => "eu",
        }
    }
}

#[derive(Debug, Clone)]
pub struct MigrationConfig {
    pub from_file: String,
    pub source: AccountSettings,
    pub target: AccountSettings,
    pub account_ids_policy: AccountIdsPolicy,
    pub report_dir: String,
}

#[derive(Debug, Clone)]
pub struct AccountSettings {
    pub account_id: AccountId,
    pub api_key: String,
    pub region: Region,
}

impl AccountSettings {
    /// API key with everything but the last four characters masked.
    pub fn masked_api_key(&self) -> String {
        mask_api_key(&self.api_key)
    }
}

#[derive(Debug, Deserialize)]
struct RawMigrationConfig {
    from_file: String,
    source: RawAccountSettings,
    target: RawAccountSettings,
    #[serde(default)]
    account_ids_policy: AccountIdsPolicy,
    #[serde(default = "default_report_dir")]
    report_dir: String,
}

#[derive(Debug, Deserialize)]
struct RawAccountSettings {
    account_id: AccountId,
    #[serde(default)]
    api_key: Option<String>,
    #[serde(default)]
    region: Region,
}

fn default_report_dir() -> String {
    ".".to_string()
}

/// Loads `config/migration.{toml,...}` (optional) overlaid with
/// `MIGRATE__*` environment variables, e.g. `MIGRATE__SOURCE__ACCOUNT_ID`.
pub fn load_migration_config() -> Result<MigrationConfig, ConfigError> {
    let builder = config::Config::builder()
        .add_source(config::File::with_name("config/migration").required(false))
        .add_source(
            config::Environment::with_prefix("MIGRATE")
                .separator("__")
                .try_parsing(true),
        );

    build_migration_config(builder, |key| std::env::var(key).ok())
}

/// Builds the settings from `builder`, falling back to `env` for API keys.
pub fn build_migration_config(
    builder: ConfigBuilder<DefaultState>,
    env: impl Fn(&str) -> Option<String>,
) -> Result<MigrationConfig, ConfigError> {
    let raw: RawMigrationConfig = builder.build()?.try_deserialize()?;

    let source_key = resolve_api_key(raw.source.api_key, env(SOURCE_API_KEY_ENV)).ok_or(
        ConfigError::MissingApiKey {
            account: "source",
            env: SOURCE_API_KEY_ENV,
        },
    )?;
    let target_key = resolve_api_key(raw.target.api_key, env(TARGET_API_KEY_ENV)).ok_or(
        ConfigError::MissingApiKey {
            account: "target",
            env: TARGET_API_KEY_ENV,
        },
    )?;

    Ok(MigrationConfig {
        from_file: raw.from_file,
        source: AccountSettings {
            account_id: raw.source.account_id,
            api_key: source_key,
            region: raw.source.region,
        },
        target: AccountSettings {
            account_id: raw.target.account_id,
            api_key: target_key,
            region: raw.target.region,
        },
        account_ids_policy: raw.account_ids_policy,
        report_dir: raw.report_dir,
    })
}

/// Explicit setting first, then the environment; blank values count as unset.
fn resolve_api_key(configured: Option<String>, from_env: Option<String>) -> Option<String> {
    configured
        .into_iter()
        .chain(from_env)
        .map(|key| key.trim().to_string())
        .find(|key| !key.is_empty())
}

pub fn mask_api_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    let visible = chars.len().min(4);
    let masked = chars.len() - visible;
    let tail: String = chars[masked..].iter().collect();
    format!("{}{}", "*".repeat(masked), tail)
}
