//! A single hook binding and the handler abstraction behind it.

use crate::error::HookError;
use crate::guard::run_guarded;
use serde::de::DeserializeOwned;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, error};

/// Payload handed to every hook of a fired event.
pub type HookPayload = serde_json::Value;

static NEXT_HOOK_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a registered hook. Two hooks never share an ID, even when
/// they bind the same event to the same callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HookId(u64);

impl HookId {
    fn next() -> Self {
        Self(NEXT_HOOK_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl std::fmt::Display for HookId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Something that can receive the payload of a fired event.
pub trait HookHandler: Send + Sync {
    fn handle(&self, payload: &HookPayload) -> Result<(), HookError>;
    fn handler_name(&self) -> &str;
}

/// Adapts a closure over a deserializable payload type into a [`HookHandler`].
pub struct TypedHookHandler<T, F>
where
    T: DeserializeOwned,
    F: Fn(T) -> Result<(), HookError> + Send + Sync,
{
    handler: F,
    name: String,
    _phantom: PhantomData<fn(T)>,
}

impl<T, F> TypedHookHandler<T, F>
where
    T: DeserializeOwned,
    F: Fn(T) -> Result<(), HookError> + Send + Sync,
{
    pub fn new(name: String, handler: F) -> Self {
        Self {
            handler,
            name,
            _phantom: PhantomData,
        }
    }
}

impl<T, F> HookHandler for TypedHookHandler<T, F>
where
    T: DeserializeOwned,
    F: Fn(T) -> Result<(), HookError> + Send + Sync,
{
    fn handle(&self, payload: &HookPayload) -> Result<(), HookError> {
        let event = T::deserialize(payload)?;
        (self.handler)(event)
    }

    fn handler_name(&self) -> &str {
        &self.name
    }
}

/// Registration options for a hook.
#[derive(Debug, Clone, Default)]
pub struct HookOptions {
    pub priority: i32,
    pub run_once: bool,
    pub name: Option<String>,
}

impl HookOptions {
    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn once(mut self) -> Self {
        self.run_once = true;
        self
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// A binding of an event name to a handler.
pub struct Hook {
    id: HookId,
    event: String,
    handler: Arc<dyn HookHandler>,
    priority: i32,
    run_once: bool,
    spent: AtomicBool,
    removed: AtomicBool,
}

impl Hook {
    pub(crate) fn new(
        event: String,
        handler: Arc<dyn HookHandler>,
        priority: i32,
        run_once: bool,
    ) -> Self {
        Self {
            id: HookId::next(),
            event,
            handler,
            priority,
            run_once,
            spent: AtomicBool::new(false),
            removed: AtomicBool::new(false),
        }
    }

    pub fn id(&self) -> HookId {
        self.id
    }

    pub fn event(&self) -> &str {
        &self.event
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    pub fn is_run_once(&self) -> bool {
        self.run_once
    }

    pub fn name(&self) -> &str {
        self.handler.handler_name()
    }

    /// Claims the single execution of a run-once hook. Returns `false` when
    /// the hook already ran.
    pub(crate) fn claim(&self) -> bool {
        !self.run_once || !self.spent.swap(true, Ordering::AcqRel)
    }

    /// Set once the hook leaves its registry; a dispatch already holding the
    /// hook in its snapshot skips it from then on.
    pub(crate) fn mark_removed(&self) {
        self.removed.store(true, Ordering::Release);
    }

    pub(crate) fn is_removed(&self) -> bool {
        self.removed.load(Ordering::Acquire)
    }

    /// Runs the handler with `payload`.
    ///
    /// Errors and panics are logged here and never reach the caller; the
    /// return value only reports whether the handler succeeded.
    pub fn execute(&self, payload: &HookPayload) -> bool {
        match run_guarded(|| self.handler.handle(payload), HookError::Panicked) {
            Ok(()) => {
                debug!(category = "Hook", hook = %self, "Execute: {}", self.name());
                true
            }
            Err(failure) => {
                error!(
                    category = "Hook ERROR",
                    hook = %self,
                    trace = %failure.trace,
                    "Execution of {} failed: {}",
                    self.name(),
                    failure.error
                );
                false
            }
        }
    }
}

impl std::fmt::Display for Hook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} -> {}", self.id, self.event, self.name())
    }
}

impl std::fmt::Debug for Hook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hook")
            .field("id", &self.id)
            .field("event", &self.event)
            .field("handler", &self.name())
            .field("priority", &self.priority)
            .field("run_once", &self.run_once)
            .finish()
    }
}
