//! Backend factory registry.
//!
//! Maps a [`TargetType`] to a factory and caches one backend per
//! [`PredictorConfig`], so a thread pool is built once per config rather than
//! once per case.

use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;

use crate::backend::Backend;
use crate::devices::HostBackend;
use crate::error::{Result, UnsupportedTargetSnafu};
use crate::place::{PredictorConfig, TargetType};

/// Factory function that creates a backend for a predictor config.
pub type BackendFactory = Arc<dyn Fn(&PredictorConfig) -> Result<Arc<dyn Backend>> + Send + Sync>;

/// Registry of backend factories with per-config caching.
///
/// # Thread Safety
///
/// Uses `parking_lot::RwLock`; lookups of cached backends only take the read
/// lock, and creation re-checks the cache after taking the write lock.
pub struct BackendRegistry {
    backends: RwLock<HashMap<PredictorConfig, Arc<dyn Backend>>>,
    factories: RwLock<HashMap<TargetType, BackendFactory>>,
}

impl BackendRegistry {
    /// Create a registry with the built-in factories.
    ///
    /// `Host` and `X86` run on [`HostBackend`]; `Arm` has no factory.
    pub fn new() -> Self {
        let registry = Self::empty();
        let host: BackendFactory = Arc::new(|config| Ok(Arc::new(HostBackend::new(config)?) as Arc<dyn Backend>));
        registry.register_factory(TargetType::Host, Arc::clone(&host));
        registry.register_factory(TargetType::X86, host);
        registry
    }

    /// Create a registry with no factories.
    pub fn empty() -> Self {
        Self { backends: RwLock::new(HashMap::new()), factories: RwLock::new(HashMap::new()) }
    }

    /// Register (or replace) the factory for a target.
    ///
    /// Cached backends of that target are dropped.
    pub fn register_factory(&self, target: TargetType, factory: BackendFactory) {
        self.factories.write().insert(target, factory);
        self.backends.write().retain(|config, _| config.place().target() != target);
    }

    pub fn is_registered(&self, target: TargetType) -> bool {
        self.factories.read().contains_key(&target)
    }

    /// Get or create the backend for a config.
    pub fn backend(&self, config: &PredictorConfig) -> Result<Arc<dyn Backend>> {
        if let Some(backend) = self.backends.read().get(config) {
            return Ok(Arc::clone(backend));
        }

        let mut backends = self.backends.write();
        if let Some(backend) = backends.get(config) {
            return Ok(Arc::clone(backend));
        }

        let target = config.place().target();
        let factory =
            self.factories.read().get(&target).cloned().ok_or_else(|| UnsupportedTargetSnafu { target }.build())?;
        let backend = factory(config)?;
        backends.insert(*config, Arc::clone(&backend));
        Ok(backend)
    }
}

impl Default for BackendRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Global backend registry, lazily initialized with the built-in factories.
pub static BACKENDS: Lazy<BackendRegistry> = Lazy::new(BackendRegistry::new);
