//! Credential loading
//!
//! Values come from the process environment and an optional dotenv-style
//! secrets file. The process environment wins. The secrets file is parsed in
//! place and never exported into the environment.

use std::collections::HashMap;
use std::path::Path;

use contracts::{
    ContractError, Credentials, API_BASE_ENV, DEFAULT_API_BASE, DEFAULT_MODEL,
    INFERENCE_API_KEY_ENV, MODEL_NAME_ENV, SEARCH_API_KEY_ENV,
};

/// Credential loader
pub struct CredentialsLoader;

impl CredentialsLoader {
    /// Credentials from the process environment only
    pub fn from_env() -> Credentials {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Credentials from the process environment, falling back to `env_file`
    ///
    /// # Errors
    /// - secrets file missing or unreadable
    /// - malformed line in the secrets file
    pub fn load(env_file: &Path) -> Result<Credentials, ContractError> {
        let file_vars = Self::read_env_file(env_file)?;
        Ok(Self::from_lookup(|name| {
            std::env::var(name)
                .ok()
                .or_else(|| file_vars.get(name).cloned())
        }))
    }

    /// Build credentials from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Credentials
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        Credentials {
            inference_api_key: non_empty(INFERENCE_API_KEY_ENV),
            search_api_key: non_empty(SEARCH_API_KEY_ENV),
            model: non_empty(MODEL_NAME_ENV).unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            api_base: non_empty(API_BASE_ENV).unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
        }
    }

    fn read_env_file(path: &Path) -> Result<HashMap<String, String>, ContractError> {
        let iter = dotenvy::from_path_iter(path).map_err(|e| ContractError::ConfigParse {
            message: format!("cannot read secrets file {}: {e}", path.display()),
            source: Some(Box::new(e)),
        })?;

        let mut vars = HashMap::new();
        for item in iter {
            let (key, value) = item.map_err(|e| ContractError::ConfigParse {
                message: format!("malformed secrets file {}: {e}", path.display()),
                source: Some(Box::new(e)),
            })?;
            vars.insert(key, value);
        }
        Ok(vars)
    }
}
