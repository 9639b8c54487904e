//! Splits raw chat text into command tokens.
//!
//! Tokens are separated by single spaces. A double-quoted group is kept as
//! one token with its quotes removed, so `//mute "Big Name" spam` yields
//! `["//mute", "Big Name", "spam"]`. An unbalanced quote is left in place
//! and the text is split as usual.

use once_cell::sync::Lazy;
use regex::Regex;

static QUOTED: Lazy<Regex> = Lazy::new(|| Regex::new(r#""(.+?)""#).expect("static regex"));

/// Stands in for spaces inside quoted groups while the text is split.
const SPACE_PLACEHOLDER: &str = "\u{1f}";

pub fn tokenize(text: &str) -> Vec<String> {
    let mut protected = text.to_string();

    let groups: Vec<String> = QUOTED
        .captures_iter(text)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_string()))
        .collect();

    for group in groups {
        let joined = group.replace(' ', SPACE_PLACEHOLDER);
        protected = protected.replace(&format!("\"{group}\""), &joined);
    }

    protected
        .split(' ')
        .map(|token| token.replace(SPACE_PLACEHOLDER, " "))
        .collect()
}

/// First space-delimited word of `text`, without any quote handling.
pub fn first_word(text: &str) -> &str {
    text.split(' ').next().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quoted_group_becomes_one_token() {
        assert_eq!(
            tokenize(r#"//mute "Big Name" reason text"#),
            vec!["//mute", "Big Name", "reason", "text"]
        );
    }

    #[test]
    fn multiple_quoted_groups_are_protected_independently() {
        assert_eq!(
            tokenize(r#"/msg "First Player" "hello there" now"#),
            vec!["/msg", "First Player", "hello there", "now"]
        );
    }

    #[test]
    fn unbalanced_quote_is_split_as_plain_text() {
        assert_eq!(
            tokenize(r#"/say "hello world"#),
            vec!["/say", "\"hello", "world"]
        );
    }

    #[test]
    fn plain_text_splits_on_single_spaces() {
        assert_eq!(tokenize("//addpoints 10"), vec!["//addpoints", "10"]);
        assert_eq!(tokenize("a  b"), vec!["a", "", "b"]);
    }

    #[test]
    fn first_word_ignores_quotes() {
        assert_eq!(first_word("//mute \"Big Name\""), "//mute");
        assert_eq!(first_word(""), "");
    }
}
