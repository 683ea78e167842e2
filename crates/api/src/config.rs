//! Runtime configuration, read from environment variables.

use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

use storefront_catalog::DEFAULT_MAX_PAGE_SIZE;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },

    #[error("{0} must be set when STORE_BACKEND=postgres")]
    Missing(&'static str),
}

/// Which document store backs the API.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StoreBackend {
    /// In-memory store, optionally seeded from `SEED_FILE`.
    #[default]
    Memory,
    /// Postgres JSONB store at `DATABASE_URL` (needs the `postgres` feature).
    Postgres,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiConfig {
    pub bind_addr: SocketAddr,
    pub store_backend: StoreBackend,
    pub database_url: Option<String>,
    pub seed_file: Option<PathBuf>,
    pub max_page_size: usize,
    pub search_threshold: f64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            store_backend: StoreBackend::Memory,
            database_url: None,
            seed_file: None,
            max_page_size: DEFAULT_MAX_PAGE_SIZE,
            search_threshold: 0.3,
        }
    }
}

impl ApiConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup (environment, tests).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(raw) = get("BIND_ADDR") {
            config.bind_addr = raw.trim().parse().map_err(|_| ConfigError::Invalid {
                key: "BIND_ADDR",
                value: raw.clone(),
            })?;
        }

        if let Some(raw) = get("STORE_BACKEND") {
            config.store_backend = match raw.trim().to_ascii_lowercase().as_str() {
                "memory" => StoreBackend::Memory,
                "postgres" => StoreBackend::Postgres,
                _ => {
                    return Err(ConfigError::Invalid {
                        key: "STORE_BACKEND",
                        value: raw,
                    });
                }
            };
        }

        config.database_url = get("DATABASE_URL");
        if config.store_backend == StoreBackend::Postgres && config.database_url.is_none() {
            return Err(ConfigError::Missing("DATABASE_URL"));
        }

        config.seed_file = get("SEED_FILE").map(PathBuf::from);

        if let Some(raw) = get("PRODUCTS_MAX_PAGE_SIZE") {
            config.max_page_size = match raw.trim().parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(ConfigError::Invalid {
                        key: "PRODUCTS_MAX_PAGE_SIZE",
                        value: raw,
                    });
                }
            };
        }

        if let Some(raw) = get("SEARCH_THRESHOLD") {
            config.search_threshold = match raw.trim().parse::<f64>() {
                Ok(t) if (0.0..=1.0).contains(&t) => t,
                _ => {
                    return Err(ConfigError::Invalid {
                        key: "SEARCH_THRESHOLD",
                        value: raw,
                    });
                }
            };
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from_pairs(pairs: &[(&str, &str)]) -> Result<ApiConfig, ConfigError> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ApiConfig::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        assert_eq!(from_pairs(&[]).unwrap(), ApiConfig::default());
    }

    #[test]
    fn reads_all_settings() {
        let config = from_pairs(&[
            ("BIND_ADDR", "127.0.0.1:3000"),
            ("STORE_BACKEND", "Postgres"),
            ("DATABASE_URL", "postgres://localhost/catalog"),
            ("SEED_FILE", "seed.json"),
            ("PRODUCTS_MAX_PAGE_SIZE", "25"),
            ("SEARCH_THRESHOLD", "0.4"),
        ])
        .unwrap();

        assert_eq!(config.bind_addr, "127.0.0.1:3000".parse().unwrap());
        assert_eq!(config.store_backend, StoreBackend::Postgres);
        assert_eq!(config.database_url.as_deref(), Some("postgres://localhost/catalog"));
        assert_eq!(config.seed_file, Some(PathBuf::from("seed.json")));
        assert_eq!(config.max_page_size, 25);
        assert_eq!(config.search_threshold, 0.4);
    }

    #[test]
    fn postgres_requires_database_url() {
        assert_eq!(
            from_pairs(&[("STORE_BACKEND", "postgres")]).unwrap_err(),
            ConfigError::Missing("DATABASE_URL")
        );
    }

    #[test]
    fn rejects_invalid_values() {
        for (key, value) in [
            ("BIND_ADDR", "not-an-addr"),
            ("STORE_BACKEND", "mongo"),
            ("PRODUCTS_MAX_PAGE_SIZE", "0"),
            ("SEARCH_THRESHOLD", "1.5"),
        ] {
            let err = from_pairs(&[(key, value)]).unwrap_err();
            assert!(
                matches!(err, ConfigError::Invalid { key: k, .. } if k == key),
                "{key}={value} gave {err:?}"
            );
        }
    }
}
