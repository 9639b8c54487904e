//! Event name to hook registry.

use super::hook::{Hook, HookHandler, HookOptions, HookPayload, TypedHookHandler};
use crate::error::HookError;
use dashmap::DashMap;
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

/// Counters describing registry activity.
#[derive(Debug, Default, Clone)]
pub struct HookRegistryStats {
    pub total_hooks: usize,
    pub events_fired: u64,
    pub hooks_executed: u64,
    pub hook_failures: u64,
}

/// Outcome of a single [`HookRegistry::fire`] call.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FireSummary {
    /// Hooks whose handler was invoked
    pub dispatched: usize,
    /// Hooks whose handler returned an error or panicked
    pub failed: usize,
}

/// Owns every hook, grouped by event name.
///
/// Each event's hooks are kept sorted by descending priority; hooks with
/// equal priority keep their registration order. The per-event lock is only
/// held while the sequence is read or spliced, never while a handler runs,
/// so handlers may register or remove hooks (including their own).
#[derive(Default)]
pub struct HookRegistry {
    hooks: DashMap<String, Vec<Arc<Hook>>>,
    stats: RwLock<HookRegistryStats>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a closure for `event` with default options.
    pub fn add<T, F>(&self, event: &str, callback: F) -> Result<Arc<Hook>, HookError>
    where
        T: DeserializeOwned + 'static,
        F: Fn(T) -> Result<(), HookError> + Send + Sync + 'static,
    {
        self.add_with(event, HookOptions::default(), callback)
    }

    /// Registers a closure for `event`. The payload of every fire is decoded
    /// into `T` before the closure runs.
    pub fn add_with<T, F>(
        &self,
        event: &str,
        options: HookOptions,
        callback: F,
    ) -> Result<Arc<Hook>, HookError>
    where
        T: DeserializeOwned + 'static,
        F: Fn(T) -> Result<(), HookError> + Send + Sync + 'static,
    {
        let name = options
            .name
            .clone()
            .unwrap_or_else(|| format!("{}::{}", event, std::any::type_name::<T>()));
        let handler = TypedHookHandler::new(name, callback);
        self.add_handler(event, options, Arc::new(handler))
    }

    /// Registers a handler object for `event`.
    pub fn add_handler(
        &self,
        event: &str,
        options: HookOptions,
        handler: Arc<dyn HookHandler>,
    ) -> Result<Arc<Hook>, HookError> {
        if event.trim().is_empty() {
            return Err(HookError::InvalidEvent(event.to_string()));
        }

        let hook = Arc::new(Hook::new(
            event.to_string(),
            handler,
            options.priority,
            options.run_once,
        ));

        {
            let mut group = self.hooks.entry(event.to_string()).or_default();
            group.push(hook.clone());
            // Stable, so equal priorities keep insertion order
            group.sort_by(|a, b| b.priority().cmp(&a.priority()));
        }

        self.stats.write().total_hooks += 1;
        debug!(category = "Hook", "Added {}", hook);
        Ok(hook)
    }

    /// Removes `hook` by identity. Returns `false` if it was not registered.
    pub fn remove(&self, hook: &Hook) -> bool {
        let removed = match self.hooks.get_mut(hook.event()) {
            Some(mut group) => {
                let before = group.len();
                group.retain(|candidate| {
                    if candidate.id() == hook.id() {
                        candidate.mark_removed();
                        false
                    } else {
                        true
                    }
                });
                group.len() != before
            }
            None => false,
        };

        if removed {
            self.hooks.remove_if(hook.event(), |_, group| group.is_empty());
            let mut stats = self.stats.write();
            stats.total_hooks = stats.total_hooks.saturating_sub(1);
            debug!(category = "Hook", "Removed {}", hook);
        }
        removed
    }

    /// Dispatches `payload` to every hook registered for `event`, in stored
    /// order.
    ///
    /// A failing hook is logged and skipped; the rest still run. Run-once
    /// hooks are removed after their first execution whatever its outcome.
    /// A hook removed by an earlier hook of the same fire is skipped. Firing
    /// an event without hooks does nothing. The only error is a payload that
    /// cannot be serialized.
    pub fn fire<P>(&self, event: &str, payload: &P) -> Result<FireSummary, HookError>
    where
        P: Serialize + ?Sized,
    {
        let snapshot = match self.hooks.get(event) {
            Some(group) if !group.is_empty() => group.value().clone(),
            _ => return Ok(FireSummary::default()),
        };

        let payload: HookPayload = serde_json::to_value(payload)?;
        let mut summary = FireSummary::default();

        for hook in snapshot {
            if hook.is_removed() || !hook.claim() {
                continue;
            }

            summary.dispatched += 1;
            if !hook.execute(&payload) {
                summary.failed += 1;
            }

            if hook.is_run_once() {
                self.remove(&hook);
            }
        }

        let mut stats = self.stats.write();
        stats.events_fired += 1;
        stats.hooks_executed += summary.dispatched as u64;
        stats.hook_failures += summary.failed as u64;
        Ok(summary)
    }

    /// Hooks currently registered for `event`, in dispatch order.
    pub fn hooks(&self, event: &str) -> Vec<Arc<Hook>> {
        self.hooks
            .get(event)
            .map(|group| group.value().clone())
            .unwrap_or_default()
    }

    /// Names of all events with at least one hook.
    pub fn events(&self) -> Vec<String> {
        let mut events: Vec<String> = self.hooks.iter().map(|e| e.key().clone()).collect();
        events.sort();
        events
    }

    pub fn len(&self) -> usize {
        self.hooks.iter().map(|e| e.value().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> HookRegistryStats {
        self.stats.read().clone()
    }

    /// Logs a summary of the registry contents.
    pub fn log_summary(&self) {
        for event in self.events() {
            info!(category = "Hook", "{}: {} hook(s)", event, self.hooks(&event).len());
        }
    }
}

impl std::fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookRegistry")
            .field("events", &self.events())
            .field("hooks", &self.len())
            .finish()
    }
}
