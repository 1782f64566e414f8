//! Cache Registry Module
//!
//! Maps namespace names to their [`Cache`], creating each one on first use.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use once_cell::sync::OnceCell;
use tracing::{error, info};

use crate::cache::Cache;
use crate::config::Config;
use crate::error::{CacheError, Result};

// == Cache Registry ==
/// Namespace → cache map sharing one configuration.
///
/// Caches live until [`clear`](Self::clear) is called; whole namespaces are
/// never evicted.
#[derive(Debug)]
pub struct CacheRegistry {
    config: Config,
    caches: Mutex<HashMap<String, Arc<Cache>>>,
}

impl CacheRegistry {
    /// Creates an empty registry after validating every policy in `config`.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            caches: Mutex::new(HashMap::new()),
        })
    }

    // == Get Cache ==
    /// Returns the cache for `namespace`, creating it on the first call.
    ///
    /// # Errors
    /// Returns [`CacheError::InvalidConfig`] for an empty namespace.
    pub fn get_cache(&self, namespace: &str) -> Result<Arc<Cache>> {
        let mut caches = self.lock();
        if let Some(cache) = caches.get(namespace) {
            return Ok(Arc::clone(cache));
        }

        let policy = self.config.policy_for(namespace)?;
        info!(
            namespace,
            max_entries = policy.max_entries(),
            default_ttl = policy.default_ttl(),
            "creating cache namespace"
        );
        let cache = Arc::new(Cache::new(policy)?);
        caches.insert(namespace.to_string(), Arc::clone(&cache));
        Ok(cache)
    }

    /// Whether callers should use the cache at all.
    ///
    /// The switch is advisory: [`Cache`] itself never consults it.
    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Names of the namespaces created so far, sorted.
    pub fn namespaces(&self) -> Vec<String> {
        let mut names: Vec<String> = self.lock().keys().cloned().collect();
        names.sort();
        names
    }

    /// Purges expired entries in every namespace, returning the total removed.
    pub fn purge_expired(&self) -> usize {
        let caches: Vec<Arc<Cache>> = self.lock().values().cloned().collect();
        caches.iter().map(|cache| cache.purge_expired()).sum()
    }

    /// Drops every namespace. Intended for test isolation.
    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Arc<Cache>>> {
        self.caches.lock().expect("cache registry mutex poisoned")
    }
}

// == Process-wide Registry ==
static GLOBAL_REGISTRY: OnceCell<Arc<CacheRegistry>> = OnceCell::new();

/// Installs the process-wide registry built from `config`.
///
/// # Errors
/// Fails if `config` is invalid or a registry is already installed.
pub fn init_global(config: Config) -> Result<Arc<CacheRegistry>> {
    let registry = Arc::new(CacheRegistry::new(config)?);
    GLOBAL_REGISTRY
        .set(Arc::clone(&registry))
        .map_err(|_| CacheError::InvalidConfig("cache registry already initialized".to_string()))?;
    Ok(registry)
}

/// The process-wide registry, built from the environment on first use.
///
/// An invalid environment configuration is logged and replaced by
/// [`Config::default`].
pub fn global() -> Arc<CacheRegistry> {
    let registry = GLOBAL_REGISTRY.get_or_init(|| {
        let registry = CacheRegistry::new(Config::from_env()).unwrap_or_else(|err| {
            error!(error = %err, "invalid cache configuration, using defaults");
            CacheRegistry {
                config: Config::default(),
                caches: Mutex::new(HashMap::new()),
            }
        });
        Arc::new(registry)
    });
    Arc::clone(registry)
}

/// Shorthand for `global().get_cache(namespace)`.
pub fn get_cache(namespace: &str) -> Result<Arc<Cache>> {
    global().get_cache(namespace)
}
