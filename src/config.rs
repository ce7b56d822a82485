//! Configuration Module
//!
//! Handles loading and managing pipeline configuration from environment variables.

use std::env;
use std::time::Duration;

use crate::cache::DEFAULT_TTL_SECS;
use crate::middleware::DEFAULT_SCHEME;

/// Pipeline configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Default TTL in seconds for cache entries without explicit TTL
    pub default_ttl: u64,
    /// Background cleanup task interval in seconds
    pub cleanup_interval: u64,
    /// TTL in seconds for cached user lookups
    pub user_cache_ttl: u64,
    /// Prefix an `Authorization` header must start with
    pub auth_scheme: String,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `DEFAULT_TTL` - Default cache TTL in seconds (default: 300)
    /// - `CLEANUP_INTERVAL` - Cleanup frequency in seconds, zero falls back to the default (default: 1)
    /// - `USER_CACHE_TTL` - TTL of cached user lookups in seconds (default: 60)
    /// - `AUTH_SCHEME` - Required credential prefix (default: "Bearer ")
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            default_ttl: parse_var("DEFAULT_TTL").unwrap_or(defaults.default_ttl),
            cleanup_interval: parse_var("CLEANUP_INTERVAL")
                .filter(|&secs| secs > 0)
                .unwrap_or(defaults.cleanup_interval),
            user_cache_ttl: parse_var("USER_CACHE_TTL").unwrap_or(defaults.user_cache_ttl),
            auth_scheme: env::var("AUTH_SCHEME").unwrap_or(defaults.auth_scheme),
        }
    }

    pub fn default_ttl(&self) -> Duration {
        Duration::from_secs(self.default_ttl)
    }

    /// Never shorter than one second.
    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval.max(1))
    }

    pub fn user_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.user_cache_ttl)
    }
}

fn parse_var(name: &str) -> Option<u64> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_ttl: DEFAULT_TTL_SECS,
            cleanup_interval: 1,
            user_cache_ttl: 60,
            auth_scheme: DEFAULT_SCHEME.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.default_ttl, 300);
        assert_eq!(config.cleanup_interval, 1);
        assert_eq!(config.user_cache_ttl, 60);
        assert_eq!(config.auth_scheme, "Bearer ");
    }

    #[test]
    fn test_zero_cleanup_interval_is_clamped() {
        let config = Config {
            cleanup_interval: 0,
            ..Config::default()
        };
        assert_eq!(config.cleanup_interval(), Duration::from_secs(1));
    }

    #[test]
    fn test_config_from_env() {
        // Single test touches the environment to avoid racing other tests
        env::remove_var("DEFAULT_TTL");
        env::remove_var("CLEANUP_INTERVAL");
        env::remove_var("AUTH_SCHEME");
        env::set_var("USER_CACHE_TTL", "not-a-number");

        let config = Config::from_env();
        assert_eq!(config.default_ttl, 300);
        assert_eq!(config.cleanup_interval, 1);
        assert_eq!(config.user_cache_ttl, 60);
        assert_eq!(config.auth_scheme, "Bearer ");

        env::set_var("USER_CACHE_TTL", "5");
        env::set_var("AUTH_SCHEME", "Token ");
        env::set_var("CLEANUP_INTERVAL", "0");
        let config = Config::from_env();
        assert_eq!(config.user_cache_ttl(), Duration::from_secs(5));
        assert_eq!(config.auth_scheme, "Token ");
        assert_eq!(config.cleanup_interval, 1);

        env::remove_var("CLEANUP_INTERVAL");
        env::remove_var("USER_CACHE_TTL");
        env::remove_var("AUTH_SCHEME");
    }
}
