//! Resolution of Azure OpenAI settings from explicit values and the environment.

use crate::error::AzureError;
use crate::types::{AzureConfig, DEFAULT_API_VERSION, DEFAULT_DEPLOYMENT};

/// Environment variable holding the resource endpoint.
pub const ENDPOINT_ENV_VAR: &str = "AZURE_OPENAI_ENDPOINT";
/// Environment variable holding the API key.
pub const API_KEY_ENV_VAR: &str = "AZURE_OPENAI_API_KEY";
/// Environment variable overriding the deployment name.
pub const DEPLOYMENT_ENV_VAR: &str = "AZURE_OPENAI_DEPLOYMENT";
/// Environment variable overriding the API version.
pub const API_VERSION_ENV_VAR: &str = "AZURE_OPENAI_API_VERSION";

/// Builds an [`AzureConfig`] from the process environment.
///
/// # Errors
///
/// Returns `AzureError::MissingConfig` when the endpoint or key is unset.
pub fn discover_config() -> Result<AzureConfig, AzureError> {
    resolve_config(|name| std::env::var(name).ok())
}

/// Builds an [`AzureConfig`] from an arbitrary variable lookup.
///
/// Resolution order for each setting:
/// 1. the value returned by `lookup` (empty values are ignored);
/// 2. the built-in default (deployment and API version only).
///
/// # Errors
///
/// Returns `AzureError::MissingConfig` when the endpoint or key is missing and
/// `AzureError::InvalidConfig` when the endpoint is not an http(s) URL.
pub fn resolve_config(
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<AzureConfig, AzureError> {
    let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

    let endpoint = get(ENDPOINT_ENV_VAR).ok_or(AzureError::MissingConfig(ENDPOINT_ENV_VAR))?;
    if !(endpoint.starts_with("https://") || endpoint.starts_with("http://")) {
        return Err(AzureError::InvalidConfig(format!(
            "{ENDPOINT_ENV_VAR} must be an http(s) URL, got '{endpoint}'"
        )));
    }
    let api_key = get(API_KEY_ENV_VAR).ok_or(AzureError::MissingConfig(API_KEY_ENV_VAR))?;

    Ok(AzureConfig::new(endpoint, api_key)
        .with_deployment(get(DEPLOYMENT_ENV_VAR).unwrap_or_else(|| DEFAULT_DEPLOYMENT.to_string()))
        .with_api_version(
            get(API_VERSION_ENV_VAR).unwrap_or_else(|| DEFAULT_API_VERSION.to_string()),
        ))
}
