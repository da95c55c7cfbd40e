//! Request-scoped context carrying the executor.
//!
//! A [`Context`] is an immutable chain of typed values. Deriving a context
//! with [`attach`] or [`Context::with_value`] returns a new value that shares
//! its parent, so handing a context to a callee never lets it change what
//! the caller sees.

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

use crate::error::{Result, RowBindError};
use crate::traits::Executor;

struct Entry {
    key: TypeId,
    value: Box<dyn Any + Send + Sync>,
    parent: Option<Arc<Entry>>,
}

#[derive(Clone)]
struct BoundExecutor(Arc<dyn Executor>);

/// Point in time after which executors should abandon the statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadline(pub Instant);

/// Request-scoped values, most notably the executor used by generated
/// functions.
#[derive(Clone, Default)]
pub struct Context {
    head: Option<Arc<Entry>>,
}

impl Context {
    /// An empty context with no executor.
    pub fn background() -> Self {
        Self::default()
    }

    /// Derive a context carrying `value`. A value of the same type set on
    /// this context or its ancestors is shadowed, not replaced.
    pub fn with_value<T: Any + Send + Sync>(&self, value: T) -> Self {
        Self {
            head: Some(Arc::new(Entry {
                key: TypeId::of::<T>(),
                value: Box::new(value),
                parent: self.head.clone(),
            })),
        }
    }

    /// The nearest value of type `T` on this context chain.
    pub fn value<T: Any + Send + Sync>(&self) -> Option<&T> {
        let key = TypeId::of::<T>();
        let mut node = self.head.as_deref();
        while let Some(entry) = node {
            if entry.key == key {
                return entry.value.as_ref().downcast_ref::<T>();
            }
            node = entry.parent.as_deref();
        }
        None
    }

    /// Derive a context with `executor` attached.
    pub fn with_executor(&self, executor: Arc<dyn Executor>) -> Self {
        self.with_value(BoundExecutor(executor))
    }

    /// The executor attached to this context chain.
    pub fn executor(&self) -> Result<Arc<dyn Executor>> {
        self.value::<BoundExecutor>()
            .map(|bound| Arc::clone(&bound.0))
            .ok_or(RowBindError::NoExecutor)
    }

    /// Derive a context whose deadline is `timeout` from now. An earlier
    /// deadline already on the chain stays in effect.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Derive a context with an absolute deadline. An earlier deadline
    /// already on the chain stays in effect.
    pub fn with_deadline(&self, deadline: Instant) -> Self {
        match self.deadline() {
            Some(current) if current <= deadline => self.clone(),
            _ => self.with_value(Deadline(deadline)),
        }
    }

    /// The deadline executors should honour, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.value::<Deadline>().map(|d| d.0)
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("has_executor", &self.value::<BoundExecutor>().is_some())
            .field("deadline", &self.deadline())
            .finish()
    }
}

/// Returns a context derived from `parent` with `executor` attached.
pub fn attach(parent: &Context, executor: Arc<dyn Executor>) -> Context {
    parent.with_executor(executor)
}

/// Recovers the executor attached with [`attach`].
///
/// Fails with [`RowBindError::NoExecutor`] when nothing was attached on this
/// context chain.
pub fn resolve(ctx: &Context) -> Result<Arc<dyn Executor>> {
    ctx.executor()
}
