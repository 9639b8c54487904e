//! A stdin/stdout stand-in for the game server connection.
//!
//! Outgoing chat is printed with style codes stripped. Input lines are
//! either `<login>: <text>` chat lines or `:`-prefixed server events.

use std::io::Write;
use trackside_events::{strip_styles, ChatTransport, Group, Player, TransportError};

/// One parsed line of console input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleInput {
    /// `:join <login> [group] [nickname...]`
    Join {
        login: String,
        group: Option<String>,
        nick_name: Option<String>,
    },
    /// `:spec <login>` joins or rejoins a player as spectator
    Spectate { login: String },
    /// `:leave <login>`
    Leave { login: String },
    /// `:podium`
    Podium,
    /// `:stats`
    Stats,
    /// `<login>: <text>`
    Chat { login: String, text: String },
}

impl ConsoleInput {
    pub fn parse(line: &str) -> Result<Self, String> {
        let line = line.trim_end_matches(['\r', '\n']);

        if let Some(event) = line.strip_prefix(':') {
            let mut parts = event.split_whitespace();
            let keyword = parts.next().unwrap_or_default();
            let login = parts.next().map(str::to_string);

            return match (keyword, login) {
                ("join", Some(login)) => {
                    let group = parts.next().map(str::to_string);
                    let nick: Vec<&str> = parts.collect();
                    Ok(ConsoleInput::Join {
                        login,
                        group,
                        nick_name: (!nick.is_empty()).then(|| nick.join(" ")),
                    })
                }
                ("spec", Some(login)) => Ok(ConsoleInput::Spectate { login }),
                ("leave", Some(login)) => Ok(ConsoleInput::Leave { login }),
                ("podium", None) => Ok(ConsoleInput::Podium),
                ("stats", None) => Ok(ConsoleInput::Stats),
                _ => Err(format!("Unknown console event: {line}")),
            };
        }

        match line.split_once(": ") {
            Some((login, text)) if !login.is_empty() && !login.contains(' ') => {
                Ok(ConsoleInput::Chat {
                    login: login.to_string(),
                    text: text.to_string(),
                })
            }
            _ => Err(format!("Expected '<login>: <text>', got: {line}")),
        }
    }
}

/// The player a `:join` line stands for.
///
/// A login that is already connected keeps its id, so the directory entry is
/// replaced instead of duplicated. The given group and nickname override the
/// stored ones and a spectator becomes a player again.
pub fn joined_player(
    existing: Option<Player>,
    login: String,
    nick_name: Option<String>,
    group: Option<Group>,
    default_group: impl FnOnce() -> Group,
) -> Player {
    match existing {
        Some(mut player) => {
            if let Some(nick_name) = nick_name {
                player.nick_name = nick_name;
            }
            if let Some(group) = group {
                player.group = group;
            }
            player.spectator = false;
            player
        }
        None => {
            let nick_name = nick_name.unwrap_or_else(|| login.clone());
            Player::new(login, nick_name, group.unwrap_or_else(default_group))
        }
    }
}

/// Prints outgoing chat to stdout.
#[derive(Debug, Default)]
pub struct ConsoleTransport;

impl ConsoleTransport {
    fn print(&self, target: &str, text: &str) -> Result<(), TransportError> {
        let mut out = std::io::stdout().lock();
        writeln!(out, "[{target}] {}", strip_styles(text))?;
        out.flush()?;
        Ok(())
    }
}

impl ChatTransport for ConsoleTransport {
    fn enable_manual_routing(&self) -> Result<(), TransportError> {
        Ok(())
    }

    fn send_to_all(&self, text: &str) -> Result<(), TransportError> {
        self.print("all", text)
    }

    fn send_to(&self, player: &Player, text: &str) -> Result<(), TransportError> {
        self.print(&player.login, text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trackside_events::PlayerDirectory;

    #[test]
    fn new_login_gets_defaults() {
        let player = joined_player(None, "bob".to_string(), None, None, Group::default);
        assert_eq!(player.nick_name, "bob");
        assert_eq!(player.group, Group::default());
        assert!(!player.is_spectator());
    }

    #[test]
    fn joining_twice_keeps_one_entry() {
        let directory = PlayerDirectory::new();
        let first = joined_player(None, "bob".to_string(), None, None, Group::default);
        directory.connect(first.clone());
        directory.connect(directory.by_login("bob").unwrap().as_spectator());

        let again = joined_player(
            directory.by_login("bob"),
            "bob".to_string(),
            Some("Big Bob".to_string()),
            Some(Group::new("Admin")),
            Group::default,
        );
        directory.connect(again.clone());

        assert_eq!(again.id, first.id);
        assert_eq!(directory.len(), 1);
        let stored = directory.by_login("bob").unwrap();
        assert_eq!(stored.nick_name, "Big Bob");
        assert_eq!(stored.group.name, "Admin");
        assert!(!stored.is_spectator());
    }

    #[test]
    fn rejoin_without_arguments_keeps_nick_and_group() {
        let first = Player::new("bob", "Big Bob", Group::new("Admin"));
        let again = joined_player(Some(first.clone()), "bob".to_string(), None, None, Group::default);
        assert_eq!(again.id, first.id);
        assert_eq!(again.nick_name, "Big Bob");
        assert_eq!(again.group.name, "Admin");
    }

    #[test]
    fn parses_chat_lines() {
        assert_eq!(
            ConsoleInput::parse("nadeo: gg wp\n"),
            Ok(ConsoleInput::Chat {
                login: "nadeo".to_string(),
                text: "gg wp".to_string()
            })
        );
        assert_eq!(
            ConsoleInput::parse("admin: //mute \"Big Name\""),
            Ok(ConsoleInput::Chat {
                login: "admin".to_string(),
                text: "//mute \"Big Name\"".to_string()
            })
        );
    }

    #[test]
    fn parses_events() {
        assert_eq!(
            ConsoleInput::parse(":join bob Admin $f00Big Bob"),
            Ok(ConsoleInput::Join {
                login: "bob".to_string(),
                group: Some("Admin".to_string()),
                nick_name: Some("$f00Big Bob".to_string()),
            })
        );
        assert_eq!(
            ConsoleInput::parse(":join bob"),
            Ok(ConsoleInput::Join {
                login: "bob".to_string(),
                group: None,
                nick_name: None,
            })
        );
        assert_eq!(
            ConsoleInput::parse(":leave bob"),
            Ok(ConsoleInput::Leave {
                login: "bob".to_string()
            })
        );
        assert_eq!(ConsoleInput::parse(":podium"), Ok(ConsoleInput::Podium));
    }

    #[test]
    fn rejects_garbage() {
        assert!(ConsoleInput::parse(":explode").is_err());
        assert!(ConsoleInput::parse(":leave").is_err());
        assert!(ConsoleInput::parse("no separator").is_err());
        assert!(ConsoleInput::parse("two words: hi").is_err());
    }
}
