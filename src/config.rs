//! Configuration Module
//!
//! Loads the process-wide cache configuration from environment variables and
//! turns it into per-namespace [`CachePolicy`] values.

use std::collections::BTreeMap;
use std::env;
use std::str::FromStr;

use crate::cache::CachePolicy;
use crate::error::Result;

/// Namespaces with their own built-in capacity and TTL.
///
/// Each entry is `(namespace, max_entries, default_ttl_seconds)`.
const BUILTIN_NAMESPACES: &[(&str, usize, u64)] = &[
    ("http", 1000, 300),
    ("llm", 500, 3600),
    ("prompt", 256, 3600),
];

/// Capacity and default TTL for one namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NamespaceConfig {
    /// Maximum number of entries held by the namespace's store
    pub max_entries: usize,
    /// TTL in seconds used when a caller does not override it
    pub default_ttl: u64,
}

/// Cache and server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Global caching switch; when false, callers bypass the cache entirely
    pub enabled: bool,
    /// Settings for namespaces without a dedicated entry
    pub defaults: NamespaceConfig,
    /// Per-namespace overrides
    pub namespaces: BTreeMap<String, NamespaceConfig>,
    /// HTTP server port
    pub server_port: u16,
    /// Expired-entry sweep interval in seconds, 0 disables the sweep
    pub sweep_interval: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_ENABLED` - Global caching switch (default: true)
    /// - `CACHE_MAX_ENTRIES` - Default capacity per namespace (default: 1000)
    /// - `CACHE_DEFAULT_TTL` - Default TTL in seconds (default: 300)
    /// - `CACHE_<NS>_MAX_ENTRIES` / `CACHE_<NS>_TTL` - Overrides for the
    ///   built-in `http`, `llm` and `prompt` namespaces
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `CACHE_SWEEP_INTERVAL` - Expired-entry sweep in seconds (default: 60)
    ///
    /// Unparseable values fall back to their defaults.
    pub fn from_env() -> Self {
        let defaults = NamespaceConfig {
            max_entries: env_or("CACHE_MAX_ENTRIES", 1000),
            default_ttl: env_or("CACHE_DEFAULT_TTL", 300),
        };

        let namespaces = BUILTIN_NAMESPACES
            .iter()
            .map(|&(name, max_entries, default_ttl)| {
                let prefix = format!("CACHE_{}", name.to_uppercase());
                let settings = NamespaceConfig {
                    max_entries: env_or(&format!("{prefix}_MAX_ENTRIES"), max_entries),
                    default_ttl: env_or(&format!("{prefix}_TTL"), default_ttl),
                };
                (name.to_string(), settings)
            })
            .collect();

        Self {
            enabled: env::var("CACHE_ENABLED")
                .map(|v| parse_flag(&v))
                .unwrap_or(true),
            defaults,
            namespaces,
            server_port: env_or("SERVER_PORT", 3000),
            sweep_interval: env_or("CACHE_SWEEP_INTERVAL", 60),
        }
    }

    /// Overrides the settings of a single namespace.
    pub fn with_namespace(
        mut self,
        namespace: impl Into<String>,
        max_entries: usize,
        default_ttl: u64,
    ) -> Self {
        self.namespaces.insert(
            namespace.into(),
            NamespaceConfig {
                max_entries,
                default_ttl,
            },
        );
        self
    }

    /// Sets the global caching switch.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    // == Policy Lookup ==
    /// Builds the policy for `namespace`, falling back to the defaults.
    pub fn policy_for(&self, namespace: &str) -> Result<CachePolicy> {
        let settings = self
            .namespaces
            .get(namespace)
            .copied()
            .unwrap_or(self.defaults);
        CachePolicy::new(namespace, settings.default_ttl, settings.max_entries)
    }

    // == Validate ==
    /// Checks the defaults and every configured namespace.
    pub fn validate(&self) -> Result<()> {
        CachePolicy::new("default", self.defaults.default_ttl, self.defaults.max_entries)?;
        for namespace in self.namespaces.keys() {
            self.policy_for(namespace)?;
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            enabled: true,
            defaults: NamespaceConfig {
                max_entries: 1000,
                default_ttl: 300,
            },
            namespaces: BUILTIN_NAMESPACES
                .iter()
                .map(|&(name, max_entries, default_ttl)| {
                    (
                        name.to_string(),
                        NamespaceConfig {
                            max_entries,
                            default_ttl,
                        },
                    )
                })
                .collect(),
            server_port: 3000,
            sweep_interval: 60,
        }
    }
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn parse_flag(value: &str) -> bool {
    !matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "0" | "false" | "no" | "off"
    )
}
