use std::{env, fmt::Display, path::PathBuf, str::FromStr};

use tracing::{debug, info};

use crate::error::ConfigError;

pub const DEFAULT_STORE_PATH: &str = "eldercare-store.json";
pub const DEFAULT_VERIFICATION_CODE: &str = "123456";

/// Runtime settings, read from the environment. `.env` loading is left to the
/// binary so the library never touches the filesystem on its own.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub store_path: PathBuf,
    pub dataset_path: Option<PathBuf>,
    /// Only honoured by the mock auth service.
    pub verification_code: String,
    pub bcrypt_cost: u32,
    pub facility_type: Option<String>,
    pub search: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            store_path: PathBuf::from(DEFAULT_STORE_PATH),
            dataset_path: None,
            verification_code: DEFAULT_VERIFICATION_CODE.to_string(),
            bcrypt_cost: bcrypt::DEFAULT_COST,
            facility_type: None,
            search: None,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let bcrypt_cost: u32 = try_load("ELDERCARE_BCRYPT_COST", defaults.bcrypt_cost)?;
        if !(4..=31).contains(&bcrypt_cost) {
            return Err(ConfigError::Invalid {
                key: "ELDERCARE_BCRYPT_COST".to_string(),
                reason: format!("{bcrypt_cost} is outside 4..=31"),
            });
        }

        Ok(Self {
            store_path: optional("ELDERCARE_STORE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.store_path),
            dataset_path: optional("ELDERCARE_DATASET_PATH").map(PathBuf::from),
            verification_code: optional("ELDERCARE_VERIFICATION_CODE")
                .unwrap_or(defaults.verification_code),
            bcrypt_cost,
            facility_type: optional("FACILITY_TYPE"),
            search: optional("SEARCH"),
        })
    }
}

fn optional(key: &str) -> Option<String> {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => Some(value),
        _ => {
            debug!("{key} not set");
            None
        }
    }
}

fn try_load<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr + Display,
    T::Err: Display,
{
    match optional(key) {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key: key.to_string(),
            reason: e.to_string(),
        }),
        None => {
            info!("{key} not set, using default: {default}");
            Ok(default)
        }
    }
}
