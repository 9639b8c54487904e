//! Player and group model shared by the hook and chat layers.
//!
//! The core never mutates a [`Player`]; players are passed by value into
//! hooks and commands and referenced by [`PlayerId`] everywhere else.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

/// Unique identifier for a connected player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerId(pub Uuid);

impl PlayerId {
    /// Creates a new random player ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parses a player ID from its hyphenated UUID form.
    pub fn from_str(s: &str) -> Result<Self, uuid::Error> {
        Uuid::parse_str(s).map(Self)
    }
}

impl Default for PlayerId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A player group. Groups carry the chat styling and the access rights of
/// their members.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub name: String,
    /// Three-digit style color without the leading `$`, e.g. `"0f0"`.
    #[serde(default)]
    pub color: Option<String>,
    /// Short tag printed in front of chat lines from this group.
    #[serde(default)]
    pub chat_prefix: Option<String>,
    #[serde(default)]
    pub access_rights: BTreeSet<String>,
    /// Members of an unrestricted group pass every access check.
    #[serde(default)]
    pub unrestricted: bool,
}

impl Group {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            color: None,
            chat_prefix: None,
            access_rights: BTreeSet::new(),
            unrestricted: false,
        }
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn with_chat_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.chat_prefix = Some(prefix.into());
        self
    }

    pub fn with_right(mut self, right: impl Into<String>) -> Self {
        self.access_rights.insert(right.into());
        self
    }

    pub fn unrestricted(mut self) -> Self {
        self.unrestricted = true;
        self
    }

    /// Returns the chat prefix if it is set and non-empty.
    pub fn prefix(&self) -> Option<&str> {
        self.chat_prefix.as_deref().filter(|p| !p.is_empty())
    }
}

impl Default for Group {
    fn default() -> Self {
        Self::new("Player")
    }
}

/// A player as seen by the controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub login: String,
    /// Display name, may contain style codes.
    pub nick_name: String,
    pub group: Group,
    #[serde(default)]
    pub spectator: bool,
}

impl Player {
    pub fn new(login: impl Into<String>, nick_name: impl Into<String>, group: Group) -> Self {
        Self {
            id: PlayerId::new(),
            login: login.into(),
            nick_name: nick_name.into(),
            group,
            spectator: false,
        }
    }

    pub fn as_spectator(mut self) -> Self {
        self.spectator = true;
        self
    }

    pub fn is_spectator(&self) -> bool {
        self.spectator
    }
}

impl std::fmt::Display for Player {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.login)
    }
}
