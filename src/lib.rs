//! # nsregistry: hierarchical namespace registry
//!
//! Organizes shared objects under dot separated names (`App.Models.User`) in a
//! single tree, and lets independently loaded components find each other by
//! name.
//!
//! ## Building blocks
//!
//! - Names ([`fqn`]): validated dot separated paths
//! - Values ([`value`]): namespaces, functions and plain data stored in the tree
//! - Registry ([`registry`]): the tree, its lookup cache and every operation
//! - Configuration ([`config`]) and errors ([`error`])
//!
//! ## Operations
//!
//! | Operation | Behavior |
//! |-----------|----------|
//! | `create_namespace` | creates a name and its missing ancestors, fails if it exists |
//! | `package` | get-or-create, then run a callback against the namespace |
//! | `using` | create, or export named members from the existing namespace |
//! | `depends` / `is_loaded` | resolve several names at once |
//! | `wait` | run a callback once a name appears or a predicate holds |
//! | `dump_cache` | log the lookup cache |
//!
//! All operations except `wait` complete synchronously. A pending `wait` polls
//! on the tokio runtime and hands back a cancellation handle.

pub mod config;
pub mod error;
pub mod fqn;
pub mod registry;
pub mod value;

// Re-exports
pub use error::*;
pub use fqn::Fqn;
pub use registry::{NamespaceError, NamespaceResult, Registry};
pub use value::{Function, NamespaceRef, Value};
