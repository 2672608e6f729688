//! Selective export of namespace members.
//!
//! Callers name the members they want up front. The registry pulls exactly
//! those members out of the resolved namespace, in the requested order, and
//! fails if any of them is missing.

use tracing::debug;

use super::Registry;
use super::error::{NamespaceError, NamespaceResult};
use crate::value::{NamespaceRef, Value};

/// What a `using` callback receives.
#[derive(Debug, Clone, PartialEq)]
pub enum Exports {
    /// No names were requested, or the namespace was just created.
    Whole(NamespaceRef),
    /// The requested members, in request order.
    Selected {
        from: NamespaceRef,
        members: Vec<(String, Value)>,
    },
}

impl Exports {
    /// The namespace the exports were taken from.
    pub fn namespace(&self) -> &NamespaceRef {
        match self {
            Exports::Whole(ns) => ns,
            Exports::Selected { from, .. } => from,
        }
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        match self {
            Exports::Whole(ns) => ns.get(name),
            Exports::Selected { members, .. } => members
                .iter()
                .find(|(member, _)| member == name)
                .map(|(_, value)| value.clone()),
        }
    }

    /// Positional arguments; empty for a whole namespace.
    pub fn values(&self) -> Vec<Value> {
        match self {
            Exports::Whole(_) => Vec::new(),
            Exports::Selected { members, .. } => {
                members.iter().map(|(_, value)| value.clone()).collect()
            }
        }
    }

    pub fn names(&self) -> Vec<String> {
        match self {
            Exports::Whole(ns) => ns.member_names(),
            Exports::Selected { members, .. } => {
                members.iter().map(|(name, _)| name.clone()).collect()
            }
        }
    }

    pub fn is_whole(&self) -> bool {
        matches!(self, Exports::Whole(_))
    }
}

impl Registry {
    /// Resolves `fqn` and extracts `names` from it. An empty `names` exports
    /// the whole namespace.
    ///
    /// # Errors
    /// * `NotFound` if `fqn` does not resolve
    /// * `Export` for the first requested name the namespace lacks
    pub fn export(&self, fqn: &str, names: &[&str]) -> NamespaceResult<Exports> {
        let ns = self.resolve(fqn)?;
        if names.is_empty() {
            return Ok(Exports::Whole(ns));
        }
        let members = names
            .iter()
            .map(|name| {
                ns.get(name)
                    .map(|value| (name.to_string(), value))
                    .ok_or_else(|| NamespaceError::Export {
                        name: name.to_string(),
                        fqn: fqn.to_string(),
                    })
            })
            .collect::<NamespaceResult<Vec<_>>>()?;
        Ok(Exports::Selected { from: ns, members })
    }

    /// Creates `fqn` and passes it whole to `func`; if it already exists,
    /// passes the requested members of the existing namespace instead.
    ///
    /// Errors other than `AlreadyExists` from the create step are returned
    /// unchanged.
    #[tracing::instrument(skip(self, func), level = "debug")]
    pub fn using<R, F>(&self, fqn: &str, names: &[&str], func: F) -> NamespaceResult<R>
    where
        F: FnOnce(Exports) -> R,
    {
        match self.create_namespace(fqn) {
            Ok(ns) => Ok(func(Exports::Whole(ns))),
            Err(e) if e.is_already_exists() => {
                debug!("{} exists, exporting {:?}", fqn, names);
                let exports = self.export(fqn, names)?;
                Ok(func(exports))
            }
            Err(e) => Err(e),
        }
    }
}
