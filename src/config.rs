use std::{env, path::PathBuf};

use crate::DEFAULT_TEMPLATE_PATH;

pub const BASE_URL_VAR: &str = "ADUANA_PY_BASE_URL";
pub const TEMPLATE_PATH_VAR: &str = "ADUANA_PY_PAYLOAD_TEMPLATE";

/// Runtime settings, read once at start-up.
#[derive(Debug, Clone)]
pub struct Config {
    /// Endpoint every page is POSTed to. Not validated, empty when unset.
    pub base_url: String,
    pub template_path: PathBuf,
}

impl Config {
    /// Loads `.env` (if there is one) and reads the settings from the environment.
    pub fn from_env() -> Self {
        // A missing .env file is fine, the variables can come from the shell.
        let _ = dotenv::dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let base_url = lookup(BASE_URL_VAR).unwrap_or_default();
        let template_path = lookup(TEMPLATE_PATH_VAR)
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| DEFAULT_TEMPLATE_PATH.to_string())
            .into();

        Config {
            base_url,
            template_path,
        }
    }
}
