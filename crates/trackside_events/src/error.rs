//! Error types for the dispatch core.

use thiserror::Error;

/// Failure raised by a hook callback or by decoding its payload.
#[derive(Error, Debug)]
pub enum HookError {
    /// Hooks must be bound to a non-empty event name
    #[error("Invalid event name: '{0}'")]
    InvalidEvent(String),
    /// The payload could not be decoded into the type the hook expects
    #[error("Payload error: {0}")]
    Payload(#[from] serde_json::Error),
    /// The callback reported a failure
    #[error("Handler execution error: {0}")]
    HandlerExecution(String),
    /// The callback panicked
    #[error("Handler panicked: {0}")]
    Panicked(String),
}

/// Failure raised while registering or running a chat command.
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Command name must be a single non-empty word, got '{0}'")]
    InvalidName(String),
    #[error("Unknown command trigger: '{0}'")]
    UnknownTrigger(String),
    /// Another command already compiles to the same token
    #[error("Command '{0}' is already registered")]
    Duplicate(String),
    #[error("Missing argument: {0}")]
    MissingArgument(&'static str),
    #[error("Invalid argument '{value}': {reason}")]
    InvalidArgument { value: String, reason: String },
    #[error("Command execution error: {0}")]
    Execution(String),
    #[error("Command panicked: {0}")]
    Panicked(String),
}

/// Failure reported by the outbound chat transport.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Transport fault: {0}")]
    Fault(String),
    #[error("Transport I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure raised while bringing up the controller.
#[derive(Error, Debug)]
pub enum ControllerError {
    /// Manual chat routing could not be enabled; the caller must exit
    #[error("Chat routing unavailable: {0}")]
    Routing(#[source] TransportError),
    #[error(transparent)]
    Hook(#[from] HookError),
    #[error(transparent)]
    Command(#[from] CommandError),
    #[error("Plugin '{plugin}' failed to register: {source}")]
    Plugin {
        plugin: String,
        #[source]
        source: PluginError,
    },
}

/// Turns a caught panic payload into a printable message.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

/// Failure to resolve a player from a name typed in chat.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum PlayerLookupError {
    #[error("No player found matching '{0}'.")]
    NotFound(String),
    #[error("'{query}' matches {count} players, be more specific.")]
    Ambiguous { query: String, count: usize },
}

/// Failure raised by a plugin while registering with the dispatcher.
#[derive(Error, Debug)]
pub enum PluginError {
    #[error(transparent)]
    Hook(#[from] HookError),
    #[error(transparent)]
    Command(#[from] CommandError),
    #[error("Plugin initialization failed: {0}")]
    InitializationFailed(String),
}
