//! Builds styled chat lines.
//!
//! Chat text uses `$` style codes: `$z` resets all styling, `$s` adds a
//! shadow, `$fff` sets a three-digit color and `$$` prints a dollar sign.

use crate::types::Player;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

static STYLE_CODE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$(\$|[0-9a-fA-F]{3}|[lLhHpP](\[[^\]]*\])?|[a-zA-Z])").expect("static regex")
});

/// Colors and decorations used for outgoing chat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatStyle {
    /// Color of the message body, and of the name when the group has none
    pub default_color: String,
    pub warning_color: String,
    pub info_color: String,
    /// Prepended to the display name of spectators
    pub spectator_glyph: String,
}

impl Default for ChatStyle {
    fn default() -> Self {
        Self {
            default_color: "fff".to_string(),
            warning_color: "f80".to_string(),
            info_color: "0cf".to_string(),
            spectator_glyph: "$eee📷 ".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ChatMessageFormatter {
    style: ChatStyle,
}

impl ChatMessageFormatter {
    pub fn new(style: ChatStyle) -> Self {
        Self { style }
    }

    pub fn style(&self) -> &ChatStyle {
        &self.style
    }

    /// Formats a chat line sent by `player`.
    ///
    /// The result is `$<color><prefix> $<color>[$z$s<name>$z$s$<color>] $<chat>$z$s<text>`,
    /// where the prefix part is omitted when the group has no chat prefix.
    pub fn player_line(&self, player: &Player, text: &str) -> String {
        let text = escape_trailing_dollars(text);
        let color = player
            .group
            .color
            .as_deref()
            .filter(|c| !c.is_empty())
            .unwrap_or(&self.style.default_color);

        let nick = if player.is_spectator() {
            format!("{}{}", self.style.spectator_glyph, player.nick_name)
        } else {
            player.nick_name.clone()
        };

        let line = format!(
            "${color}[$z$s{nick}$z$s${color}] ${chat}$z$s{text}",
            chat = self.style.default_color
        );

        match player.group.prefix() {
            Some(prefix) => format!("${color}{prefix} {line}"),
            None => line,
        }
    }

    pub fn warning(&self, text: &str) -> String {
        format!("${}{}", self.style.warning_color, text)
    }

    pub fn info(&self, text: &str) -> String {
        format!("${}{}", self.style.info_color, text)
    }
}

/// Doubles a trailing run of `$` so it cannot combine with styling that
/// follows the message.
pub fn escape_trailing_dollars(text: &str) -> String {
    let body = text.trim_end_matches('$');
    let run = &text[body.len()..];
    format!("{text}{run}")
}

/// Removes style codes, leaving the visible text.
pub fn strip_styles(text: &str) -> String {
    STYLE_CODE
        .replace_all(text, |caps: &Captures| {
            if &caps[1] == "$" {
                "$".to_string()
            } else {
                String::new()
            }
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Group;

    fn formatter() -> ChatMessageFormatter {
        ChatMessageFormatter::new(ChatStyle::default())
    }

    #[test]
    fn group_color_and_prefix_are_applied() {
        let group = Group::new("Admin").with_color("0f0").with_chat_prefix("#");
        let player = Player::new("login", "Name", group);

        assert_eq!(
            formatter().player_line(&player, "gg"),
            "$0f0#".to_string() + " $0f0[$z$sName$z$s$0f0] $fff$z$sgg"
        );
    }

    #[test]
    fn missing_color_and_prefix_fall_back() {
        let player = Player::new("login", "Name", Group::default());
        assert_eq!(
            formatter().player_line(&player, "hi"),
            "$fff[$z$sName$z$s$fff] $fff$z$shi"
        );

        let blank = Group::new("Odd").with_color("").with_chat_prefix("");
        let player = Player::new("login", "Name", blank);
        assert_eq!(
            formatter().player_line(&player, "hi"),
            "$fff[$z$sName$z$s$fff] $fff$z$shi"
        );
    }

    #[test]
    fn spectators_get_the_glyph() {
        let player = Player::new("login", "Name", Group::default()).as_spectator();
        assert_eq!(
            formatter().player_line(&player, "hi"),
            "$fff[$z$s$eee📷 Name$z$s$fff] $fff$z$shi"
        );
    }

    #[test]
    fn trailing_dollar_runs_are_doubled() {
        assert_eq!(escape_trailing_dollars("cost 5$"), "cost 5$$");
        assert_eq!(escape_trailing_dollars("$$$"), "$$$$$$");
        assert_eq!(escape_trailing_dollars("$fffwhite"), "$fffwhite");
        assert_eq!(escape_trailing_dollars(""), "");
    }

    #[test]
    fn styled_line_escapes_trailing_dollars() {
        let player = Player::new("login", "Name", Group::default());
        assert!(formatter().player_line(&player, "money$").ends_with("$z$smoney$$"));
    }

    #[test]
    fn warnings_and_info_use_their_colors() {
        assert_eq!(formatter().warning("You are muted."), "$f80You are muted.");
        assert_eq!(formatter().info("Done."), "$0cfDone.");
    }

    #[test]
    fn strip_styles_keeps_visible_text() {
        assert_eq!(strip_styles("$o$f00Red$z Name"), "Red Name");
        assert_eq!(strip_styles("Cash$$Man"), "Cash$Man");
        assert_eq!(strip_styles("$l[http://x.y]Link$l"), "Link");
    }
}
