//! The namespace registry.
//!
//! A [`Registry`] owns a tree of namespaces rooted at a single container and a
//! flattened cache from FQN to namespace. The tree is authoritative; the cache
//! only ever gains entries, and every cached entry is the same object a walk
//! from the root reaches.
//!
//! ```no_run
//! use nsregistry::config::RegistryConfig;
//! use nsregistry::registry::Registry;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = Registry::new(RegistryConfig::default())?;
//! let models = registry.create_namespace("App.Models")?;
//! let same = registry.package("App.Models", |ns| ns.clone())?;
//! assert!(models.ptr_eq(&same));
//! # Ok(())
//! # }
//! ```

pub mod dependency;
pub mod error;
pub mod export;
pub mod legacy;
pub mod wait;

use std::collections::BTreeMap;
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::Mutex;
use tracing::{debug, info};

use crate::InternalResult;
use crate::config::RegistryConfig;
use crate::fqn::Fqn;
use crate::value::{NamespaceRef, Value};

pub use dependency::Dependencies;
pub use error::{NamespaceError, NamespaceResult};
pub use export::Exports;
pub use legacy::LegacyNamespace;
pub use wait::{Condition, WaitHandle, WaitOutcome};

/// Member under which the registry publishes its include path.
pub const INCLUDE_MEMBER: &str = "INCLUDE";

#[derive(Clone)]
pub struct Registry {
    root: NamespaceRef,
    cache: Arc<DashMap<String, NamespaceRef>>,
    // serializes create steps across threads
    mutation: Arc<Mutex<()>>,
    config: RegistryConfig,
}

impl Registry {
    pub fn new(config: RegistryConfig) -> InternalResult<Self> {
        Self::with_root(NamespaceRef::root(), config)
    }

    /// Builds a registry over an existing tree. Nothing under `root` is cached
    /// until it is created or resolved through the registry.
    pub fn with_root(root: NamespaceRef, config: RegistryConfig) -> InternalResult<Self> {
        config.validate()?;
        let registry = Self {
            root,
            cache: Arc::new(DashMap::new()),
            mutation: Arc::new(Mutex::new(())),
            config,
        };
        registry.publish()?;
        Ok(registry)
    }

    pub fn root(&self) -> &NamespaceRef {
        &self.root
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    fn publish(&self) -> NamespaceResult<()> {
        if let Some(own) = &self.config.own_namespace {
            let ns = self.ensure(own)?;
            ns.set(INCLUDE_MEMBER, Value::data(self.config.include_path.clone()))?;
            debug!("Registry published at {}", own);
        }
        if let Some(legacy) = &self.config.legacy_namespace {
            self.ensure(legacy)?;
            debug!("Legacy namespace published at {}", legacy);
        }
        Ok(())
    }

    fn ensure(&self, fqn: &str) -> NamespaceResult<NamespaceRef> {
        match self.create_namespace(fqn) {
            Err(e) if e.is_already_exists() => self.resolve(fqn),
            other => other,
        }
    }

    /// Creates the namespace at `fqn` and every missing ancestor.
    ///
    /// # Errors
    /// * `Collision` if a segment on the path holds a function or data value
    /// * `AlreadyExists` if `fqn` itself is already defined
    #[tracing::instrument(skip(self), level = "debug")]
    pub fn create_namespace(&self, fqn: &str) -> NamespaceResult<NamespaceRef> {
        let path = Fqn::parse(fqn)?;
        let _guard = self.mutation.lock();

        if self.cache.contains_key(fqn) {
            return Err(NamespaceError::already_exists(fqn));
        }

        let last = path.len() - 1;
        let mut current = self.root.clone();
        for (i, segment) in path.segments().iter().enumerate() {
            let prefix = path.truncate(i);
            let (slot, created) =
                current.occupy_with(segment, || NamespaceRef::mapping(prefix.to_string()).into());
            let ns = match slot.as_namespace() {
                Some(ns) => ns.clone(),
                None => {
                    return Err(NamespaceError::Collision {
                        segment: segment.clone(),
                        fqn: fqn.to_string(),
                        occupant: slot.kind(),
                    });
                }
            };
            if !created && i == last {
                return Err(NamespaceError::already_exists(&prefix));
            }
            if created {
                debug!("Created namespace {}", prefix);
            }
            self.cache
                .entry(prefix.to_string())
                .or_insert_with(|| ns.clone());
            current = ns;
        }
        Ok(current)
    }

    /// Creates `fqn` and hands the new namespace to `init`, returning its result.
    pub fn create_namespace_with<R, F>(&self, fqn: &str, init: F) -> NamespaceResult<R>
    where
        F: FnOnce(&NamespaceRef) -> R,
    {
        let ns = self.create_namespace(fqn)?;
        Ok(init(&ns))
    }

    /// Get-or-create: runs `func` against the cached namespace, creating it first
    /// when it has not been seen.
    pub fn package<R, F>(&self, fqn: &str, func: F) -> NamespaceResult<R>
    where
        F: FnOnce(&NamespaceRef) -> R,
    {
        let cached = self.cache.get(fqn).map(|entry| entry.value().clone());
        match cached {
            Some(ns) => Ok(func(&ns)),
            None => self.create_namespace_with(fqn, func),
        }
    }

    /// Lookup with cache. Every namespace on the walked path is cached.
    ///
    /// # Errors
    /// * `NotFound` if a segment is missing or is not a namespace
    pub fn resolve(&self, fqn: &str) -> NamespaceResult<NamespaceRef> {
        if let Some(ns) = self.cache.get(fqn) {
            return Ok(ns.value().clone());
        }
        let path = Fqn::parse(fqn)?;
        let mut current = self.root.clone();
        for (i, segment) in path.segments().iter().enumerate() {
            let next = current
                .get(segment)
                .and_then(|value| value.as_namespace().cloned())
                .ok_or_else(|| NamespaceError::not_found(fqn))?;
            self.cache
                .entry(path.truncate(i).to_string())
                .or_insert_with(|| next.clone());
            current = next;
        }
        Ok(current)
    }

    /// Walks the tree from the root, bypassing the cache.
    pub fn walk(&self, fqn: &str) -> Option<Value> {
        let path = Fqn::parse(fqn).ok()?;
        let mut value = Value::Namespace(self.root.clone());
        for segment in path.segments() {
            value = value.as_namespace()?.get(segment)?;
        }
        Some(value)
    }

    pub fn is_cached(&self, fqn: &str) -> bool {
        self.cache.contains_key(fqn)
    }

    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    /// Cache contents keyed by FQN, for diagnostics.
    pub fn cache_snapshot(&self) -> BTreeMap<String, serde_json::Value> {
        self.cache
            .iter()
            .map(|entry| {
                (
                    entry.key().clone(),
                    Value::Namespace(entry.value().clone()).describe(),
                )
            })
            .collect()
    }

    /// Logs every cache entry. Does nothing unless INFO is enabled.
    pub fn dump_cache(&self) {
        if !tracing::enabled!(tracing::Level::INFO) {
            return;
        }
        for (fqn, entry) in self.cache_snapshot() {
            info!(fqn = %fqn, entry = %entry, "namespace cache");
        }
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("cached", &self.cache.len())
            .field("config", &self.config)
            .finish()
    }
}
