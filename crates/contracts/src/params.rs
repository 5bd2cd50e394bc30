//! Run parameters and credentials

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::ContractError;

/// Environment variable holding the inference API key
pub const INFERENCE_API_KEY_ENV: &str = "OPENAI_API_KEY";
/// Environment variable holding the search API key
pub const SEARCH_API_KEY_ENV: &str = "SERPER_API_KEY";
/// Environment variable selecting the model
pub const MODEL_NAME_ENV: &str = "OPENAI_MODEL_NAME";
/// Environment variable overriding the inference endpoint
pub const API_BASE_ENV: &str = "OPENAI_API_BASE";

pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";

/// Placeholder values supplied for one run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunParameters(BTreeMap<String, String>);

impl RunParameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert; numbers are stored in their decimal form
    pub fn with(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl ToString) {
        self.0.insert(name.into(), value.to_string());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl<K: Into<String>, V: ToString> FromIterator<(K, V)> for RunParameters {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut params = RunParameters::new();
        for (name, value) in iter {
            params.insert(name, value);
        }
        params
    }
}

/// Secrets and endpoint settings for the real orchestrator
///
/// Debug output never shows key material.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub inference_api_key: Option<String>,
    pub search_api_key: Option<String>,
    pub model: String,
    pub api_base: String,
}

impl Default for Credentials {
    fn default() -> Self {
        Self {
            inference_api_key: None,
            search_api_key: None,
            model: DEFAULT_MODEL.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }
}

impl Credentials {
    pub fn require_inference_key(&self) -> Result<&str, ContractError> {
        self.inference_api_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| ContractError::missing_credential(INFERENCE_API_KEY_ENV))
    }

    pub fn require_search_key(&self) -> Result<&str, ContractError> {
        self.search_api_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| ContractError::missing_credential(SEARCH_API_KEY_ENV))
    }
}

fn redact(value: &Option<String>) -> &'static str {
    match value {
        Some(v) if !v.is_empty() => "<redacted>",
        _ => "<unset>",
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("inference_api_key", &redact(&self.inference_api_key))
            .field("search_api_key", &redact(&self.search_api_key))
            .field("model", &self.model)
            .field("api_base", &self.api_base)
            .finish()
    }
}
