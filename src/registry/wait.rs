//! Deferred execution until a condition holds.
//!
//! A condition already true at call time runs the callback inline. Otherwise a
//! tokio task re-checks it every `poll_interval` and fires the callback once.
//! The returned [`WaitHandle`] can stop a pending wait.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

use tokio::task::JoinHandle;
use tracing::debug;
use uuid::Uuid;

use super::Registry;
use super::error::{NamespaceError, NamespaceResult};
use crate::fqn::Fqn;
use crate::value::Value;

pub type Predicate = dyn Fn() -> Option<Value> + Send + Sync;

// Wait lifecycle. Leaves PENDING exactly once, to whichever of firing and
// cancellation swaps first.
const PENDING: u8 = 0;
const FIRED: u8 = 1;
const CANCELLED: u8 = 2;

#[derive(Clone)]
pub enum Condition {
    /// Holds when the predicate yields a value.
    Predicate(Arc<Predicate>),
    /// Holds once the FQN resolves to a namespace.
    Namespace(String),
}

impl Condition {
    pub fn predicate<F>(predicate: F) -> Self
    where
        F: Fn() -> Option<Value> + Send + Sync + 'static,
    {
        Condition::Predicate(Arc::new(predicate))
    }

    /// Boolean predicate; the callback receives `true` as data.
    pub fn when<F>(check: F) -> Self
    where
        F: Fn() -> bool + Send + Sync + 'static,
    {
        Self::predicate(move || check().then(|| Value::data(true)))
    }

    pub fn namespace(fqn: impl Into<String>) -> Self {
        Condition::Namespace(fqn.into())
    }

    fn evaluate(&self, registry: &Registry) -> Option<Value> {
        match self {
            Condition::Predicate(predicate) => predicate(),
            Condition::Namespace(fqn) => registry.resolve(fqn).ok().map(Value::Namespace),
        }
    }
}

impl fmt::Debug for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Predicate(_) => f.write_str("Predicate"),
            Condition::Namespace(fqn) => write!(f, "Namespace({})", fqn),
        }
    }
}

impl From<&str> for Condition {
    fn from(fqn: &str) -> Self {
        Condition::namespace(fqn)
    }
}

impl From<String> for Condition {
    fn from(fqn: String) -> Self {
        Condition::namespace(fqn)
    }
}

#[derive(Debug)]
pub enum WaitOutcome {
    /// The condition held immediately and the callback already ran.
    Ready,
    /// Polling; the callback runs when the condition holds.
    Pending(WaitHandle),
}

impl WaitOutcome {
    pub fn is_ready(&self) -> bool {
        matches!(self, WaitOutcome::Ready)
    }

    pub fn into_handle(self) -> Option<WaitHandle> {
        match self {
            WaitOutcome::Ready => None,
            WaitOutcome::Pending(handle) => Some(handle),
        }
    }
}

/// Cancellation handle for a pending wait.
#[derive(Debug)]
pub struct WaitHandle {
    id: Uuid,
    state: Arc<AtomicU8>,
    task: JoinHandle<()>,
}

impl WaitHandle {
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Stops polling. Returns false if the callback already fired, in which
    /// case nothing changes.
    pub fn cancel(&self) -> bool {
        let won = self
            .state
            .compare_exchange(PENDING, CANCELLED, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok();
        if won {
            debug!("Wait {} cancelled", self.id);
            self.task.abort();
        }
        won
    }

    pub fn is_fired(&self) -> bool {
        self.state.load(Ordering::SeqCst) == FIRED
    }

    pub fn is_cancelled(&self) -> bool {
        self.state.load(Ordering::SeqCst) == CANCELLED
    }

    /// True once polling has ended, by firing or cancellation.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Waits for polling to end and reports whether the callback fired.
    pub async fn join(self) -> bool {
        let _ = self.task.await;
        self.state.load(Ordering::SeqCst) == FIRED
    }
}

impl Registry {
    /// Runs `func` once `condition` holds, passing it the value the condition
    /// produced.
    ///
    /// # Errors
    /// * `InvalidFqn` if a namespace condition names a malformed FQN
    /// * `Scheduler` if the condition does not hold yet and no tokio runtime
    ///   is available to poll on
    pub fn wait<C, F>(&self, condition: C, func: F) -> NamespaceResult<WaitOutcome>
    where
        C: Into<Condition>,
        F: FnOnce(Value) + Send + 'static,
    {
        let condition = condition.into();
        if let Condition::Namespace(fqn) = &condition {
            Fqn::parse(fqn)?;
        }
        if let Some(value) = condition.evaluate(self) {
            func(value);
            return Ok(WaitOutcome::Ready);
        }

        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| NamespaceError::Scheduler(e.to_string()))?;

        let id = Uuid::new_v4();
        let state = Arc::new(AtomicU8::new(PENDING));
        let registry = self.clone();
        let poll_interval = self.config.poll_interval;
        debug!("Wait {} pending on {:?}", id, condition);

        let task = {
            let state = state.clone();
            runtime.spawn(async move {
                let mut ticker = tokio::time::interval(poll_interval);
                // the first tick completes immediately
                ticker.tick().await;
                loop {
                    ticker.tick().await;
                    if state.load(Ordering::SeqCst) != PENDING {
                        return;
                    }
                    if let Some(value) = condition.evaluate(&registry) {
                        if state
                            .compare_exchange(PENDING, FIRED, Ordering::SeqCst, Ordering::SeqCst)
                            .is_err()
                        {
                            debug!("Wait {} satisfied after cancel, skipping", id);
                            return;
                        }
                        debug!("Wait {} satisfied", id);
                        func(value);
                        return;
                    }
                }
            })
        };

        Ok(WaitOutcome::Pending(WaitHandle {
            id,
            state,
            task,
        }))
    }
}
