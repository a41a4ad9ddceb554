//! Core configuration.
//!
//! # Invariants
//! - `page_size` is at least 1.
//! - `login_url` is an absolute path.

use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const DEFAULT_INDEX_CACHE_TTL_SECS: u64 = 20;
pub const DEFAULT_LOGIN_URL: &str = "/auth/login/";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// Posts per feed page.
    pub page_size: u32,
    /// Lifetime of a cached index page. Zero disables the cache.
    pub index_cache_ttl_secs: u64,
    /// Where anonymous writers are sent; `?next=` is appended.
    pub login_url: String,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            index_cache_ttl_secs: DEFAULT_INDEX_CACHE_TTL_SECS,
            login_url: DEFAULT_LOGIN_URL.to_string(),
        }
    }
}

impl CoreConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.page_size == 0 {
            return Err(ConfigError::InvalidPageSize);
        }
        if !self.login_url.starts_with('/') {
            return Err(ConfigError::InvalidLoginUrl(self.login_url.clone()));
        }
        Ok(())
    }

    pub fn index_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.index_cache_ttl_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidPageSize,
    InvalidLoginUrl(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidPageSize => write!(f, "page_size must be at least 1"),
            Self::InvalidLoginUrl(url) => {
                write!(f, "login_url must be an absolute path, got `{url}`")
            }
        }
    }
}

impl Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::{ConfigError, CoreConfig};

    #[test]
    fn defaults_match_site_behavior() {
        let config = CoreConfig::default();
        assert_eq!(config.page_size, 10);
        assert_eq!(config.index_cache_ttl().as_secs(), 20);
        assert_eq!(config.login_url, "/auth/login/");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_page_size_is_rejected() {
        let config = CoreConfig {
            page_size: 0,
            ..CoreConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::InvalidPageSize));
    }

    #[test]
    fn relative_login_url_is_rejected() {
        let config = CoreConfig {
            login_url: "auth/login/".to_string(),
            ..CoreConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidLoginUrl(_))
        ));
    }
}
