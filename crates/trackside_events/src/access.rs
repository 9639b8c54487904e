//! Access-right checks for gated commands.

use crate::types::Player;

/// Access right required to mute and unmute players.
pub const PLAYER_MUTE: &str = "player_mute";

/// Decides whether a player holds a named access right.
pub trait AccessControl: Send + Sync {
    fn has_access(&self, player: &Player, right: &str) -> bool;
}

/// Grants rights through the player's group.
#[derive(Debug, Default, Clone, Copy)]
pub struct GroupAccess;

impl AccessControl for GroupAccess {
    fn has_access(&self, player: &Player, right: &str) -> bool {
        player.group.unrestricted || player.group.access_rights.contains(right)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Group;

    #[test]
    fn group_rights_decide_access() {
        let admin = Player::new("admin", "Admin", Group::new("Admin").with_right(PLAYER_MUTE));
        let player = Player::new("player", "Player", Group::default());
        let master = Player::new("master", "Master", Group::new("Master").unrestricted());

        assert!(GroupAccess.has_access(&admin, PLAYER_MUTE));
        assert!(!GroupAccess.has_access(&admin, "manipulate_points"));
        assert!(!GroupAccess.has_access(&player, PLAYER_MUTE));
        assert!(GroupAccess.has_access(&master, "anything"));
    }
}
