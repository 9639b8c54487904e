//! # Trackside Events
//!
//! The dispatch core of the Trackside dedicated-server controller: named
//! hooks that modules subscribe to, chat commands that players invoke by
//! typing a prefixed token, and the chat pipeline that decides whether a
//! line is a command, a malformed command, a muted sender or a broadcast.
//!
//! ## Core Features
//!
//! - **Failure isolation**: a failing or panicking hook never stops the
//!   other hooks of the same event, and a failing command never leaks into
//!   the chat loop
//! - **Priorities**: hooks run in descending priority, registration order
//!   breaking ties
//! - **Run-once hooks**: removed after their first execution, even when it fails
//! - **Typed payloads**: events are serialized once per fire and each hook
//!   deserializes the type it asks for
//! - **Access rights**: commands may name a right the caller must hold
//!
//! ## Quick Start Example
//!
//! ```rust
//! use std::sync::Arc;
//! use trackside_events::*;
//!
//! let transport = Arc::new(RecordingTransport::new());
//! let controller = Controller::new(transport.clone(), Arc::new(GroupAccess), ChatStyle::default());
//! controller.start()?;
//!
//! controller.dispatcher().add_hook(PLAYER_CONNECT, |event: PlayerConnectEvent| {
//!     println!("{} joined", event.player.nick_name);
//!     Ok(())
//! })?;
//!
//! controller.dispatcher().add_command(
//!     "hello",
//!     CommandOptions::default().description("Says hello"),
//!     |ctx: &CommandContext| {
//!         println!("hello from {}", ctx.caller);
//!         Ok(())
//!     },
//! )?;
//!
//! let player = Player::new("nadeo", "Nadeo", Group::default());
//! controller.on_player_connect(&player)?;
//! controller.on_player_chat(&player, "/hello")?;
//! assert!(transport.broadcasts().is_empty());
//! # Ok::<(), ControllerError>(())
//! ```
//!
//! ## Plugins
//!
//! A [`Plugin`] receives the shared [`ServerContext`] once at startup and
//! registers whatever hooks and commands it needs through the context's
//! [`Dispatcher`].

pub mod access;
pub mod chat;
pub mod commands;
pub mod context;
pub mod controller;
pub mod dispatcher;
pub mod error;
pub mod events;
mod guard;
pub mod hooks;
pub mod players;
pub mod types;

#[cfg(test)]
mod test_support;

pub use access::{AccessControl, GroupAccess, PLAYER_MUTE};
pub use chat::{
    escape_trailing_dollars, strip_styles, ChatController, ChatMessageFormatter, ChatOutcome,
    ChatStyle, ChatTransport, RecordingTransport,
};
pub use commands::{
    tokenize, ChatCommand, ChatCommandRegistry, CommandContext, CommandDispatch, CommandHandler,
    CommandOptions, CommandTrigger,
};
pub use context::{Plugin, ServerContext};
pub use controller::Controller;
pub use dispatcher::Dispatcher;
pub use error::{
    CommandError, ControllerError, HookError, PlayerLookupError, PluginError, TransportError,
};
pub use events::*;
pub use hooks::{
    FireSummary, Hook, HookHandler, HookId, HookOptions, HookPayload, HookRegistry,
    HookRegistryStats, TypedHookHandler,
};
pub use players::PlayerDirectory;
pub use types::{Group, Player, PlayerId};
