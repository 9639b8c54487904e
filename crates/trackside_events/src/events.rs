//! Names and payloads of the events the controller core fires itself.
//!
//! Other modules are free to fire and hook any event name; these are the
//! ones the core and the bundled plugins depend on.

use crate::types::Player;
use serde::{Deserialize, Serialize};

pub const PLAYER_CONNECT: &str = "PlayerConnect";
pub const PLAYER_DISCONNECT: &str = "PlayerDisconnect";
pub const PLAYER_CHAT: &str = "PlayerChat";
pub const PODIUM_START: &str = "Maniaplanet.Podium_Start";

/// A player joined the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerConnectEvent {
    pub player: Player,
    pub timestamp: u64,
}

/// A player left the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerDisconnectEvent {
    pub player: Player,
    pub timestamp: u64,
}

/// A raw chat line as received from the game server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerChatEvent {
    pub player: Player,
    pub text: String,
    pub timestamp: u64,
}

/// The podium sequence at the end of a match started.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PodiumStartEvent {
    pub timestamp: u64,
}

/// Returns the current Unix timestamp in seconds.
pub fn current_timestamp() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
