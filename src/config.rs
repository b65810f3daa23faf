/*
 * Responsibility
 * - 環境変数 (.env 含む) から設定を読み込む
 * - 設定値のバリデーション (不正なら起動失敗)
 */
use std::fmt;

use crate::extractor::ExtractorSettings;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    fn parse(value: Option<&str>) -> Self {
        match value.unwrap_or("development").to_ascii_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone)]
pub struct Config {
    pub app_env: AppEnv,
    // Claim names used by the baseline extraction.
    pub extractor: ExtractorSettings,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (the process environment in production).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let app_env = AppEnv::parse(lookup("APP_ENV").as_deref());

        let defaults = ExtractorSettings::default();

        let username_claim = claim_name(&lookup, "CLAIMS_USERNAME_CLAIM")?
            .unwrap_or(defaults.username_claim);

        let client_id_claim = claim_name(&lookup, "CLAIMS_CLIENT_ID_CLAIM")?
            .unwrap_or(defaults.client_id_claim);

        let include_grant_type = match lookup("CLAIMS_INCLUDE_GRANT_TYPE") {
            None => defaults.include_grant_type,
            Some(v) => parse_bool(&v).ok_or(ConfigError::Invalid("CLAIMS_INCLUDE_GRANT_TYPE"))?,
        };

        Ok(Self {
            app_env,
            extractor: ExtractorSettings {
                username_claim,
                client_id_claim,
                include_grant_type,
            },
        })
    }
}

fn claim_name<F>(lookup: &F, key: &'static str) -> Result<Option<String>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(v) if v.trim().is_empty() => Err(ConfigError::Invalid(key)),
        Some(v) => Ok(Some(v.trim().to_string())),
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let config = config(&[]).unwrap();

        assert_eq!(config.app_env, AppEnv::Development);
        assert_eq!(config.extractor, ExtractorSettings::default());
    }

    #[test]
    fn reads_overrides() {
        let config = config(&[
            ("APP_ENV", "PROD"),
            ("CLAIMS_USERNAME_CLAIM", " preferred_username "),
            ("CLAIMS_CLIENT_ID_CLAIM", "azp"),
            ("CLAIMS_INCLUDE_GRANT_TYPE", "true"),
        ])
        .unwrap();

        assert!(config.app_env.is_production());
        assert_eq!(config.extractor.username_claim, "preferred_username");
        assert_eq!(config.extractor.client_id_claim, "azp");
        assert!(config.extractor.include_grant_type);
    }

    #[test]
    fn rejects_invalid_values() {
        assert_eq!(
            config(&[("CLAIMS_INCLUDE_GRANT_TYPE", "maybe")]).unwrap_err(),
            ConfigError::Invalid("CLAIMS_INCLUDE_GRANT_TYPE")
        );
        assert_eq!(
            config(&[("CLAIMS_USERNAME_CLAIM", "  ")]).unwrap_err(),
            ConfigError::Invalid("CLAIMS_USERNAME_CLAIM")
        );
    }
}
