use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;

use tracing::debug;

use crate::error::VenvError;

/// Opaque handle for a submitted background task. Ids are minted from a
/// monotonic counter owned by the supervisor, so a resubmitted operation can
/// never collide with a live registry entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TaskId(u64);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task-{}", self.0)
    }
}

/// Receives busy/idle transitions. `busy` fires on the submitting thread
/// before the worker starts; `idle` fires on the worker thread after every
/// completion, success or failure.
pub trait StatusObserver: Send + Sync {
    fn busy(&self, message: &str);
    fn idle(&self);
}

/// Runs operations on dedicated worker threads and guarantees exactly one
/// terminal callback (success XOR error) per submission. Callbacks run on
/// the worker thread; nothing here serializes concurrent operations against
/// the same environment path — that stays a caller responsibility, typically
/// by refusing destructive actions while `is_busy()`.
#[derive(Default)]
pub struct TaskSupervisor {
    tasks: Arc<Mutex<HashMap<u64, String>>>,
    next_id: AtomicU64,
    observer: Option<Arc<dyn StatusObserver>>,
}

impl TaskSupervisor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_observer(observer: Arc<dyn StatusObserver>) -> Self {
        Self {
            observer: Some(observer),
            ..Self::default()
        }
    }

    /// Starts `op` on its own thread. On completion the task leaves the
    /// live registry, the observer sees the idle transition, and exactly one
    /// of the two callbacks fires with the outcome.
    pub fn submit<T, F, S, E>(&self, label: impl Into<String>, op: F, on_success: S, on_error: E) -> TaskId
    where
        T: Send + 'static,
        F: FnOnce() -> Result<T, VenvError> + Send + 'static,
        S: FnOnce(T) + Send + 'static,
        E: FnOnce(VenvError) + Send + 'static,
    {
        let label = label.into();
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        lock_tasks(&self.tasks).insert(id, label.clone());
        if let Some(observer) = &self.observer {
            observer.busy(&label);
        }
        debug!(task = %TaskId(id), label, "starting background task");

        let tasks = Arc::clone(&self.tasks);
        let observer = self.observer.clone();
        thread::spawn(move || {
            let result = op();
            lock_tasks(&tasks).remove(&id);
            if let Some(observer) = &observer {
                observer.idle();
            }
            match result {
                Ok(value) => on_success(value),
                Err(err) => {
                    debug!(task = %TaskId(id), %err, "background task failed");
                    on_error(err);
                }
            }
        });

        TaskId(id)
    }

    /// True iff any submitted task has not yet completed.
    pub fn is_busy(&self) -> bool {
        !lock_tasks(&self.tasks).is_empty()
    }

    pub fn live_tasks(&self) -> usize {
        lock_tasks(&self.tasks).len()
    }
}

// A worker that panicked mid-callback poisons the registry; the map itself
// is still consistent, so recover the guard instead of propagating.
fn lock_tasks(tasks: &Mutex<HashMap<u64, String>>) -> MutexGuard<'_, HashMap<u64, String>> {
    tasks.lock().unwrap_or_else(PoisonError::into_inner)
}
