//! The process-wide owner of the hook and command registries.

use crate::commands::{ChatCommand, ChatCommandRegistry, CommandContext, CommandOptions};
use crate::error::{CommandError, HookError};
use crate::hooks::{FireSummary, Hook, HookOptions, HookRegistry};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

/// Owns both registries. One instance is created at startup and shared by
/// reference with every module that registers or fires anything.
#[derive(Debug, Default)]
pub struct Dispatcher {
    hooks: HookRegistry,
    commands: ChatCommandRegistry,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes `callback` to `event` with priority 0.
    pub fn add_hook<T, F>(&self, event: &str, callback: F) -> Result<Arc<Hook>, HookError>
    where
        T: DeserializeOwned + 'static,
        F: Fn(T) -> Result<(), HookError> + Send + Sync + 'static,
    {
        self.hooks.add(event, callback)
    }

    pub fn add_hook_with<T, F>(
        &self,
        event: &str,
        options: HookOptions,
        callback: F,
    ) -> Result<Arc<Hook>, HookError>
    where
        T: DeserializeOwned + 'static,
        F: Fn(T) -> Result<(), HookError> + Send + Sync + 'static,
    {
        self.hooks.add_with(event, options, callback)
    }

    pub fn remove_hook(&self, hook: &Hook) -> bool {
        self.hooks.remove(hook)
    }

    /// Fires `event` with `payload`. See [`HookRegistry::fire`].
    pub fn fire_hook<P>(&self, event: &str, payload: &P) -> Result<FireSummary, HookError>
    where
        P: Serialize + ?Sized,
    {
        self.hooks.fire(event, payload)
    }

    pub fn add_command<F>(
        &self,
        name: &str,
        options: CommandOptions,
        callback: F,
    ) -> Result<Arc<ChatCommand>, CommandError>
    where
        F: Fn(&CommandContext) -> Result<(), CommandError> + Send + Sync + 'static,
    {
        self.commands.add(name, options, callback)
    }

    pub fn hooks(&self) -> &HookRegistry {
        &self.hooks
    }

    pub fn commands(&self) -> &ChatCommandRegistry {
        &self.commands
    }
}
