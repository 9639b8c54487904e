//! Shared services handed to the chat controller and to plugins.

use crate::access::AccessControl;
use crate::chat::{ChatMessageFormatter, ChatTransport};
use crate::dispatcher::Dispatcher;
use crate::players::PlayerDirectory;
use crate::types::Player;
use std::sync::Arc;
use tracing::warn;

/// Everything a module needs to take part in dispatch: the registries, the
/// outbound transport, access checks, the connected players and the chat
/// formatter.
///
/// Send failures are logged and dropped; nothing here retries.
pub struct ServerContext {
    dispatcher: Arc<Dispatcher>,
    transport: Arc<dyn ChatTransport>,
    access: Arc<dyn AccessControl>,
    players: Arc<PlayerDirectory>,
    formatter: ChatMessageFormatter,
}

impl ServerContext {
    pub fn new(
        dispatcher: Arc<Dispatcher>,
        transport: Arc<dyn ChatTransport>,
        access: Arc<dyn AccessControl>,
        players: Arc<PlayerDirectory>,
        formatter: ChatMessageFormatter,
    ) -> Self {
        Self {
            dispatcher,
            transport,
            access,
            players,
            formatter,
        }
    }

    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    pub fn transport(&self) -> &Arc<dyn ChatTransport> {
        &self.transport
    }

    pub fn access(&self) -> &dyn AccessControl {
        self.access.as_ref()
    }

    pub fn players(&self) -> &Arc<PlayerDirectory> {
        &self.players
    }

    pub fn formatter(&self) -> &ChatMessageFormatter {
        &self.formatter
    }

    pub fn has_access(&self, player: &Player, right: &str) -> bool {
        self.access.has_access(player, right)
    }

    pub fn broadcast(&self, text: &str) {
        if let Err(e) = self.transport.send_to_all(text) {
            warn!(category = "Transport", "Broadcast failed: {}", e);
        }
    }

    pub fn send_to(&self, player: &Player, text: &str) {
        if let Err(e) = self.transport.send_to(player, text) {
            warn!(category = "Transport", "Message to {} failed: {}", player, e);
        }
    }

    pub fn warn_player(&self, player: &Player, text: &str) {
        self.send_to(player, &self.formatter.warning(text));
    }

    pub fn inform_player(&self, player: &Player, text: &str) {
        self.send_to(player, &self.formatter.info(text));
    }

    pub fn inform_all(&self, text: &str) {
        self.broadcast(&self.formatter.info(text));
    }
}

impl std::fmt::Debug for ServerContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerContext")
            .field("dispatcher", &self.dispatcher)
            .field("players", &self.players.len())
            .finish()
    }
}

/// A module that subscribes to hooks and commands at startup.
pub trait Plugin: Send + Sync {
    fn name(&self) -> &str;

    fn version(&self) -> &str {
        "1.0.0"
    }

    /// Registers the plugin's hooks and commands.
    fn register(&self, context: &Arc<ServerContext>) -> Result<(), crate::error::PluginError>;
}
