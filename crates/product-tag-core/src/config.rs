use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Disk cache configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Persist lookups to disk
    #[serde(default)]
    pub enabled: bool,

    /// Directory holding one entry per item id (created on first use)
    #[serde(default = "default_cache_dir")]
    pub directory: PathBuf,
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from(".amazon-cache")
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            directory: default_cache_dir(),
        }
    }
}

/// Parameters passed through to the catalog unchanged.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupOptions {
    /// Associate (affiliate) tag
    pub associate_tag: Option<String>,

    /// API access key
    pub access_key: Option<String>,

    /// API secret key
    pub secret_key: Option<String>,

    #[serde(default = "default_response_group")]
    pub response_group: String,

    /// Catalog country code
    #[serde(default = "default_country")]
    pub country: String,
}

fn default_response_group() -> String {
    "Images,ItemAttributes,ItemIds".to_string()
}

fn default_country() -> String {
    "en".to_string()
}

impl Default for LookupOptions {
    fn default() -> Self {
        Self {
            associate_tag: None,
            access_key: None,
            secret_key: None,
            response_group: default_response_group(),
            country: default_country(),
        }
    }
}

impl std::fmt::Debug for LookupOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LookupOptions")
            .field("associate_tag", &self.associate_tag)
            .field("access_key", &self.access_key)
            .field("secret_key", &self.secret_key.as_ref().map(|_| "<redacted>"))
            .field("response_group", &self.response_group)
            .field("country", &self.country)
            .finish()
    }
}

/// Retry behaviour for transient catalog failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Retries after the first attempt
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Fixed delay between attempts in milliseconds
    #[serde(default = "default_retry_delay_ms")]
    pub delay_ms: u64,
}

const fn default_max_retries() -> u32 {
    3
}

const fn default_retry_delay_ms() -> u64 {
    3000
}

impl RetryConfig {
    pub const fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            delay_ms: default_retry_delay_ms(),
        }
    }
}

/// HTTP catalog client configuration.
///
/// The endpoint receives one JSON request per item lookup and answers with
/// `{"items": [...]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Transport timeout for a single request
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_endpoint() -> String {
    "http://localhost:8080/items/lookup".to_string()
}

const fn default_timeout_secs() -> u64 {
    30
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Site configuration, supplied once before the first lookup
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteConfig {
    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub lookup: LookupOptions,

    #[serde(default)]
    pub retry: RetryConfig,

    #[serde(default)]
    pub catalog: CatalogConfig,
}

impl SiteConfig {
    /// Load configuration from file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, crate::error::Error> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            crate::error::Error::ConfigLoad(format!(
                "Failed to read config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;

        Self::from_toml(&content)
    }

    /// Parse and validate configuration from a TOML string
    pub fn from_toml(content: &str) -> Result<Self, crate::error::Error> {
        let config: Self = toml::from_str(content).map_err(|e| {
            crate::error::Error::ConfigLoad(format!("Failed to parse config: {e}"))
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), crate::error::Error> {
        if self.cache.enabled && self.cache.directory.as_os_str().is_empty() {
            return Err(crate::error::Error::ConfigInvalid {
                field: "cache.directory".to_string(),
                reason: "must not be empty when the cache is enabled".to_string(),
            });
        }
        if self.catalog.endpoint.trim().is_empty() {
            return Err(crate::error::Error::ConfigInvalid {
                field: "catalog.endpoint".to_string(),
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Load from default locations (~/.config/product-tag/config.toml, ./product-tag.toml)
    pub fn load() -> Self {
        // Try user config
        if let Some(config_dir) = crate::util::config_dir() {
            let user_config = config_dir.join("product-tag").join("config.toml");
            if user_config.exists() {
                match Self::from_file(&user_config) {
                    Ok(config) => {
                        tracing::debug!("Loaded config from {}", user_config.display());
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        // Try local config
        let local_config = PathBuf::from("product-tag.toml");
        if local_config.exists() {
            match Self::from_file(&local_config) {
                Ok(config) => {
                    tracing::debug!("Loaded config from ./product-tag.toml");
                    return config;
                }
                Err(e) => {
                    tracing::warn!("Failed to load ./product-tag.toml: {}", e);
                }
            }
        }

        tracing::debug!("No config file found, using defaults");
        Self::default()
    }
}
