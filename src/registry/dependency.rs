use tracing::warn;

use super::Registry;
use super::error::{NamespaceError, NamespaceResult};
use crate::value::NamespaceRef;

/// Resolved dependencies: a single namespace when exactly one was requested,
/// otherwise every namespace in request order.
#[derive(Debug, Clone, PartialEq)]
pub enum Dependencies {
    One(NamespaceRef),
    Many(Vec<NamespaceRef>),
}

impl Dependencies {
    pub fn len(&self) -> usize {
        match self {
            Dependencies::One(_) => 1,
            Dependencies::Many(all) => all.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn single(&self) -> Option<&NamespaceRef> {
        match self {
            Dependencies::One(ns) => Some(ns),
            Dependencies::Many(_) => None,
        }
    }

    pub fn into_vec(self) -> Vec<NamespaceRef> {
        match self {
            Dependencies::One(ns) => vec![ns],
            Dependencies::Many(all) => all,
        }
    }
}

impl Registry {
    /// Resolves every FQN in order. The first failure aborts the whole call.
    ///
    /// # Errors
    /// * `Dependency` carrying every requested FQN and the first failure
    pub fn depends<I, S>(&self, fqns: I) -> NamespaceResult<Dependencies>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let fqns: Vec<String> = fqns.into_iter().map(|f| f.as_ref().to_string()).collect();
        let mut resolved = Vec::with_capacity(fqns.len());
        for fqn in &fqns {
            match self.resolve(fqn) {
                Ok(ns) => resolved.push(ns),
                Err(e) => {
                    warn!("Dependency {} unresolved: {}", fqn, e);
                    return Err(NamespaceError::Dependency {
                        fqns: fqns.clone(),
                        source: Box::new(e),
                    });
                }
            }
        }
        match <[NamespaceRef; 1]>::try_from(resolved) {
            Ok([one]) => Ok(Dependencies::One(one)),
            Err(all) => Ok(Dependencies::Many(all)),
        }
    }

    /// [`Registry::depends`] with failure reported as `None`.
    pub fn is_loaded<I, S>(&self, fqns: I) -> Option<Dependencies>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.depends(fqns).ok()
    }
}
