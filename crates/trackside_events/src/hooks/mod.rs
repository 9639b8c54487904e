//! Named server events and the hooks subscribed to them.

mod hook;
mod registry;

pub use hook::{Hook, HookHandler, HookId, HookOptions, HookPayload, TypedHookHandler};
pub use registry::{FireSummary, HookRegistry, HookRegistryStats};
