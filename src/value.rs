//! Values stored in the namespace tree.
//!
//! A slot in the tree is either empty or holds a [`Value`]. Only
//! [`Value::Namespace`] can host further named children; functions and data
//! are leaves.

use std::collections::BTreeMap;
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::json;
use strum::{Display, EnumDiscriminants};

use crate::registry::error::{NamespaceError, NamespaceResult};

pub type NativeFn = dyn Fn(&[Value]) -> Value + Send + Sync;

/// A named callable member.
#[derive(Clone)]
pub struct Function {
    name: String,
    body: Arc<NativeFn>,
}

impl Function {
    pub fn new<F>(name: impl Into<String>, body: F) -> Self
    where
        F: Fn(&[Value]) -> Value + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            body: Arc::new(body),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn call(&self, args: &[Value]) -> Value {
        (self.body)(args)
    }

    pub fn ptr_eq(&self, other: &Function) -> bool {
        Arc::ptr_eq(&self.body, &other.body)
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Function({})", self.name)
    }
}

#[derive(Debug, Clone)]
pub enum NamespaceKind {
    /// Plain key-value container.
    Mapping,
    /// A type with an initializer that can also carry named children.
    Constructible { initializer: Function },
}

pub struct Namespace {
    self_fqn: Option<String>,
    kind: NamespaceKind,
    members: RwLock<BTreeMap<String, Value>>,
}

impl Namespace {
    /// The FQN this namespace was created under, if the registry created it.
    pub fn self_namespace(&self) -> Option<&str> {
        self.self_fqn.as_deref()
    }

    pub fn kind(&self) -> &NamespaceKind {
        &self.kind
    }

    pub fn is_constructible(&self) -> bool {
        matches!(self.kind, NamespaceKind::Constructible { .. })
    }

    /// Runs the initializer of a constructible namespace.
    pub fn initialize(&self, args: &[Value]) -> Option<Value> {
        match &self.kind {
            NamespaceKind::Constructible { initializer } => Some(initializer.call(args)),
            NamespaceKind::Mapping => None,
        }
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        self.members.read().get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.members.read().contains_key(name)
    }

    /// Stores a member, returning the value it replaced.
    ///
    /// A slot holding a namespace is never replaced: the registry may have
    /// cached it, and the cache must keep pointing at the live tree.
    ///
    /// # Errors
    /// * `AlreadyExists` if `name` currently holds a namespace
    pub fn set(
        &self,
        name: impl Into<String>,
        value: impl Into<Value>,
    ) -> NamespaceResult<Option<Value>> {
        let name = name.into();
        let mut members = self.members.write();
        if matches!(members.get(&name), Some(Value::Namespace(_))) {
            let fqn = match &self.self_fqn {
                Some(parent) => format!("{}.{}", parent, name),
                None => name,
            };
            return Err(NamespaceError::already_exists(fqn));
        }
        Ok(members.insert(name, value.into()))
    }

    pub fn member_names(&self) -> Vec<String> {
        self.members.read().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.members.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.read().is_empty()
    }

    /// Returns the current occupant of `name`, or installs `make()` there when
    /// the slot is empty. The flag is true when the value was just installed.
    pub(crate) fn occupy_with<F>(&self, name: &str, make: F) -> (Value, bool)
    where
        F: FnOnce() -> Value,
    {
        let mut members = self.members.write();
        match members.get(name) {
            Some(existing) => (existing.clone(), false),
            None => {
                let value = make();
                members.insert(name.to_string(), value.clone());
                (value, true)
            }
        }
    }
}

/// Shared handle to a namespace in the tree.
#[derive(Clone)]
pub struct NamespaceRef(Arc<Namespace>);

impl NamespaceRef {
    /// Empty mapping tagged with its own FQN.
    pub fn mapping(self_fqn: impl Into<String>) -> Self {
        Self::build(Some(self_fqn.into()), NamespaceKind::Mapping)
    }

    /// Untagged mapping, used as a tree root.
    pub fn root() -> Self {
        Self::build(None, NamespaceKind::Mapping)
    }

    pub fn constructible(initializer: Function) -> Self {
        Self::build(None, NamespaceKind::Constructible { initializer })
    }

    fn build(self_fqn: Option<String>, kind: NamespaceKind) -> Self {
        Self(Arc::new(Namespace {
            self_fqn,
            kind,
            members: RwLock::new(BTreeMap::new()),
        }))
    }

    pub fn ptr_eq(&self, other: &NamespaceRef) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Deref for NamespaceRef {
    type Target = Namespace;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl fmt::Debug for NamespaceRef {
    // member names only; values may point back up the tree
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Namespace")
            .field("self", &self.self_fqn)
            .field("constructible", &self.is_constructible())
            .field("members", &self.member_names())
            .finish()
    }
}

impl PartialEq for NamespaceRef {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

#[derive(Debug, Clone, EnumDiscriminants)]
#[strum_discriminants(name(ValueKind), derive(Display))]
pub enum Value {
    Namespace(NamespaceRef),
    Function(Function),
    Data(serde_json::Value),
}

impl Value {
    pub fn data(value: impl Into<serde_json::Value>) -> Self {
        Value::Data(value.into())
    }

    pub fn function<F>(name: impl Into<String>, body: F) -> Self
    where
        F: Fn(&[Value]) -> Value + Send + Sync + 'static,
    {
        Value::Function(Function::new(name, body))
    }

    pub fn kind(&self) -> ValueKind {
        ValueKind::from(self)
    }

    /// Only namespaces can host further named children.
    pub fn as_namespace(&self) -> Option<&NamespaceRef> {
        match self {
            Value::Namespace(ns) => Some(ns),
            Value::Function(_) | Value::Data(_) => None,
        }
    }

    pub fn as_data(&self) -> Option<&serde_json::Value> {
        match self {
            Value::Data(data) => Some(data),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&Function> {
        match self {
            Value::Function(func) => Some(func),
            _ => None,
        }
    }

    /// Short description for diagnostics.
    pub fn describe(&self) -> serde_json::Value {
        match self {
            Value::Namespace(ns) => json!({
                "namespace": ns.self_namespace(),
                "constructible": ns.is_constructible(),
                "members": ns.member_names(),
            }),
            Value::Function(func) => json!({ "function": func.name() }),
            Value::Data(data) => data.clone(),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Namespace(a), Value::Namespace(b)) => a.ptr_eq(b),
            (Value::Function(a), Value::Function(b)) => a.ptr_eq(b),
            (Value::Data(a), Value::Data(b)) => a == b,
            _ => false,
        }
    }
}

impl From<NamespaceRef> for Value {
    fn from(ns: NamespaceRef) -> Self {
        Value::Namespace(ns)
    }
}

impl From<Function> for Value {
    fn from(func: Function) -> Self {
        Value::Function(func)
    }
}

impl From<serde_json::Value> for Value {
    fn from(data: serde_json::Value) -> Self {
        Value::Data(data)
    }
}
