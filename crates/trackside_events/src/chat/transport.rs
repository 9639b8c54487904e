//! Outbound chat transport.

use crate::error::TransportError;
use crate::types::{Player, PlayerId};
use parking_lot::Mutex;

/// The link to the game server's chat.
pub trait ChatTransport: Send + Sync {
    /// Routes all player chat through the controller instead of letting the
    /// game server broadcast it directly.
    fn enable_manual_routing(&self) -> Result<(), TransportError>;

    /// Sends one line to every connected player.
    fn send_to_all(&self, text: &str) -> Result<(), TransportError>;

    /// Sends one line to a single player.
    fn send_to(&self, player: &Player, text: &str) -> Result<(), TransportError>;
}

/// In-memory transport that records everything it is asked to send.
#[derive(Debug, Default)]
pub struct RecordingTransport {
    broadcasts: Mutex<Vec<String>>,
    private: Mutex<Vec<(PlayerId, String)>>,
    routing_enabled: Mutex<bool>,
    refuse_routing: bool,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// A transport whose routing call fails, as when another controller
    /// already owns the server.
    pub fn refusing_routing() -> Self {
        Self {
            refuse_routing: true,
            ..Self::default()
        }
    }

    pub fn broadcasts(&self) -> Vec<String> {
        self.broadcasts.lock().clone()
    }

    /// Messages sent privately to `player`, oldest first.
    pub fn messages_to(&self, player: PlayerId) -> Vec<String> {
        self.private
            .lock()
            .iter()
            .filter(|(id, _)| *id == player)
            .map(|(_, text)| text.clone())
            .collect()
    }

    pub fn private_count(&self) -> usize {
        self.private.lock().len()
    }

    pub fn routing_enabled(&self) -> bool {
        *self.routing_enabled.lock()
    }

    pub fn clear(&self) {
        self.broadcasts.lock().clear();
        self.private.lock().clear();
    }
}

impl ChatTransport for RecordingTransport {
    fn enable_manual_routing(&self) -> Result<(), TransportError> {
        if self.refuse_routing {
            return Err(TransportError::Fault(
                "manual routing is already enabled by another instance".to_string(),
            ));
        }
        *self.routing_enabled.lock() = true;
        Ok(())
    }

    fn send_to_all(&self, text: &str) -> Result<(), TransportError> {
        self.broadcasts.lock().push(text.to_string());
        Ok(())
    }

    fn send_to(&self, player: &Player, text: &str) -> Result<(), TransportError> {
        self.private.lock().push((player.id, text.to_string()));
        Ok(())
    }
}
