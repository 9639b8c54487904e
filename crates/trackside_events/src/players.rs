//! Directory of connected players.

use crate::chat::strip_styles;
use crate::error::PlayerLookupError;
use crate::types::{Player, PlayerId};
use dashmap::DashMap;

/// Connected players keyed by ID.
#[derive(Debug, Default)]
pub struct PlayerDirectory {
    players: DashMap<PlayerId, Player>,
}

impl PlayerDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a player.
    pub fn connect(&self, player: Player) {
        self.players.insert(player.id, player);
    }

    pub fn disconnect(&self, id: PlayerId) -> Option<Player> {
        self.players.remove(&id).map(|(_, player)| player)
    }

    pub fn get(&self, id: PlayerId) -> Option<Player> {
        self.players.get(&id).map(|p| p.value().clone())
    }

    pub fn by_login(&self, login: &str) -> Option<Player> {
        self.players
            .iter()
            .find(|p| p.login == login)
            .map(|p| p.value().clone())
    }

    /// Every connected player, ordered by login.
    pub fn all(&self) -> Vec<Player> {
        let mut players: Vec<Player> = self.players.iter().map(|p| p.value().clone()).collect();
        players.sort_by(|a, b| a.login.cmp(&b.login));
        players
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Resolves a name typed in chat.
    ///
    /// An exact login wins. Otherwise the query is matched, ignoring case
    /// and style codes, against nicknames: an exact nickname wins, then a
    /// single partial match.
    pub fn find_by_name(&self, query: &str) -> Result<Player, PlayerLookupError> {
        if let Some(player) = self.by_login(query) {
            return Ok(player);
        }

        let needle = strip_styles(query).to_lowercase();
        if needle.is_empty() {
            return Err(PlayerLookupError::NotFound(query.to_string()));
        }

        let mut candidates: Vec<(String, Player)> = self
            .all()
            .into_iter()
            .map(|p| (strip_styles(&p.nick_name).to_lowercase(), p))
            .filter(|(nick, _)| nick.contains(&needle))
            .collect();

        if let Some(pos) = candidates.iter().position(|(nick, _)| *nick == needle) {
            return Ok(candidates.swap_remove(pos).1);
        }

        match candidates.len() {
            0 => Err(PlayerLookupError::NotFound(query.to_string())),
            1 => Ok(candidates.remove(0).1),
            count => Err(PlayerLookupError::Ambiguous {
                query: query.to_string(),
                count,
            }),
        }
    }
}
