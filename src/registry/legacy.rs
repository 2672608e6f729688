//! Compatibility facade for callers written against the older namespace API,
//! where `create_namespace` silently reused an existing namespace.

use super::Registry;
use super::error::NamespaceResult;
use super::export::Exports;
use crate::value::NamespaceRef;

pub struct LegacyNamespace<'a> {
    registry: &'a Registry,
    namespace: NamespaceRef,
}

impl LegacyNamespace<'_> {
    /// The namespace the facade is published under.
    pub fn namespace(&self) -> &NamespaceRef {
        &self.namespace
    }

    /// Same as [`Registry::using`].
    pub fn create_namespace<R, F>(&self, fqn: &str, names: &[&str], func: F) -> NamespaceResult<R>
    where
        F: FnOnce(Exports) -> R,
    {
        self.registry.using(fqn, names, func)
    }
}

impl Registry {
    /// The legacy facade, if a legacy namespace is configured.
    pub fn legacy(&self) -> Option<LegacyNamespace<'_>> {
        let fqn = self.config.legacy_namespace.as_deref()?;
        let namespace = self.resolve(fqn).ok()?;
        Some(LegacyNamespace {
            registry: self,
            namespace,
        })
    }
}
