use service_core::config as core_config;
use service_core::error::AppError;
use std::env;

#[derive(Debug, Clone)]
pub struct SpotConfig {
    pub common: core_config::Config,
    pub mongodb: MongoConfig,
    pub log_level: String,
    pub otlp_endpoint: Option<String>,
    pub cors_allowed_origins: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct MongoConfig {
    pub uri: String,
    pub database: String,
    pub collection: String,
    pub app_name: String,
}

impl SpotConfig {
    pub fn load() -> Result<Self, AppError> {
        // Load common config (handles .env, APP__ prefix and PORT)
        let common_config = core_config::Config::load()?;
        Self::from_lookup(common_config, |key| env::var(key).ok())
    }

    /// Builds the service settings from `lookup`, which resolves a variable
    /// name to its value.
    pub fn from_lookup<F>(common: core_config::Config, lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let is_prod = lookup("ENVIRONMENT").as_deref() == Some("prod");
        let get = |key: &str, default: Option<&str>| get_var(&lookup, key, default, is_prod);

        Ok(SpotConfig {
            common,
            mongodb: MongoConfig {
                uri: get("MONGO_URI", None)?,
                database: get("MONGO_DATABASE", Some("touristSpotDB"))?,
                collection: get("MONGO_COLLECTION", Some("spots"))?,
                app_name: get("MONGO_APP_NAME", Some("spot-service"))?,
            },
            log_level: get("LOG_LEVEL", Some("info"))?,
            otlp_endpoint: lookup("OTLP_ENDPOINT").filter(|v| !v.is_empty()),
            cors_allowed_origins: parse_origins(lookup("CORS_ALLOWED_ORIGINS").as_deref()),
        })
    }
}

fn parse_origins(raw: Option<&str>) -> Vec<String> {
    raw.map(|value| {
        value
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

fn get_var<F>(lookup: &F, key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(val) => Ok(val),
        None => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}
