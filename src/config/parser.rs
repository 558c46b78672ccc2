use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Environment variable overriding `output.database-path`
pub const DB_PATH_ENV: &str = "SCRAPE_N_SERVE_DB";

/// Environment variable overriding `crawler.target-website`
pub const TARGET_WEBSITE_ENV: &str = "TARGET_WEBSITE";

/// Loads and parses a configuration file from the given path
///
/// Environment overrides are applied after parsing and before validation.
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use scrape_n_serve::config::load_config;
///
/// let config = load_config(Path::new("config.toml")).unwrap();
/// println!("Max depth: {}", config.crawler.max_depth);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parses configuration from TOML text, then applies env overrides and validates
pub(crate) fn parse_config(content: &str) -> Result<Config, ConfigError> {
    let mut config: Config = toml::from_str(content)?;
    apply_env_overrides(&mut config);
    validate(&config)?;
    Ok(config)
}

/// Applies `SCRAPE_N_SERVE_DB` and `TARGET_WEBSITE` from the process environment
pub fn apply_env_overrides(config: &mut Config) {
    apply_overrides_from(config, |key| std::env::var(key).ok());
}

fn apply_overrides_from<F>(config: &mut Config, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(path) = lookup(DB_PATH_ENV).filter(|v| !v.trim().is_empty()) {
        tracing::debug!("Database path overridden by {}", DB_PATH_ENV);
        config.output.database_path = path;
    }

    if let Some(target) = lookup(TARGET_WEBSITE_ENV).filter(|v| !v.trim().is_empty()) {
        tracing::debug!("Target website overridden by {}", TARGET_WEBSITE_ENV);
        config.crawler.target_website = Some(target);
    }
}

/// Computes a SHA-256 hash of the configuration file content
///
/// This is recorded with every crawl session so runs with different
/// settings can be told apart.
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(String)` - Hex-encoded SHA-256 hash of the file content
/// * `Err(ConfigError)` - Failed to read the file
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    Ok(hash_config_content(&content))
}

/// Hex-encoded SHA-256 of arbitrary configuration text
pub fn hash_config_content(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}

/// Loads a configuration and returns both the config and its hash
///
/// Without a path the built-in defaults are used (with env overrides), and the
/// hash is taken over their TOML serialization.
pub fn load_config_with_hash(path: Option<&Path>) -> Result<(Config, String), ConfigError> {
    match path {
        Some(path) => {
            let config = load_config(path)?;
            let hash = compute_config_hash(path)?;
            Ok((config, hash))
        }
        None => {
            let mut config = Config::default();
            apply_env_overrides(&mut config);
            validate(&config)?;
            let rendered = toml::to_string(&config)
                .map_err(|e| ConfigError::Validation(format!("Cannot render config: {}", e)))?;
            Ok((config, hash_config_content(&rendered)))
        }
    }
}
