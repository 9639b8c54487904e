//! A single chat command binding.

use crate::error::CommandError;
use crate::guard::{run_guarded, Failure};
use crate::types::Player;
use std::str::FromStr;
use std::sync::Arc;

/// Prefix that introduces a command and classifies its scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CommandTrigger {
    /// `/`, commands any player may type
    #[default]
    Player,
    /// `//`, administrative commands
    Admin,
    /// `##`, developer and maintenance commands
    Developer,
    /// `@`, commands driven by external tools
    External,
}

impl CommandTrigger {
    pub const ALL: [CommandTrigger; 4] = [
        CommandTrigger::Player,
        CommandTrigger::Admin,
        CommandTrigger::Developer,
        CommandTrigger::External,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CommandTrigger::Player => "/",
            CommandTrigger::Admin => "//",
            CommandTrigger::Developer => "##",
            CommandTrigger::External => "@",
        }
    }

    /// Whether `text` starts like a player, admin or developer command.
    /// Such text is never broadcast as plain chat.
    pub fn is_reserved_prefix(text: &str) -> bool {
        text.starts_with('/') || text.starts_with("##")
    }
}

impl FromStr for CommandTrigger {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|trigger| trigger.as_str() == s)
            .ok_or_else(|| CommandError::UnknownTrigger(s.to_string()))
    }
}

impl std::fmt::Display for CommandTrigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Arguments handed to a command callback.
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub caller: Player,
    /// Compiled token of the command being run, e.g. `//addpoints`
    pub command: String,
    /// Tokens after the command token
    pub args: Vec<String>,
}

impl CommandContext {
    pub fn arg(&self, index: usize) -> Option<&str> {
        self.args.get(index).map(String::as_str)
    }

    /// Returns argument `index` or a [`CommandError::MissingArgument`] naming it.
    pub fn require(&self, index: usize, name: &'static str) -> Result<&str, CommandError> {
        self.arg(index)
            .filter(|value| !value.is_empty())
            .ok_or(CommandError::MissingArgument(name))
    }

    /// All arguments from `index` on, joined by spaces.
    pub fn rest(&self, index: usize) -> String {
        self.args.get(index..).map(|a| a.join(" ")).unwrap_or_default()
    }
}

/// Callback behind a chat command.
pub trait CommandHandler: Send + Sync {
    fn run(&self, ctx: &CommandContext) -> Result<(), CommandError>;
}

impl<F> CommandHandler for F
where
    F: Fn(&CommandContext) -> Result<(), CommandError> + Send + Sync,
{
    fn run(&self, ctx: &CommandContext) -> Result<(), CommandError> {
        self(ctx)
    }
}

/// Registration options for a chat command.
#[derive(Debug, Clone)]
pub struct CommandOptions {
    pub description: String,
    pub trigger: CommandTrigger,
    pub access: Option<String>,
    pub hidden: bool,
}

impl Default for CommandOptions {
    fn default() -> Self {
        Self {
            description: "-".to_string(),
            trigger: CommandTrigger::Player,
            access: None,
            hidden: false,
        }
    }
}

impl CommandOptions {
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn trigger(mut self, trigger: CommandTrigger) -> Self {
        self.trigger = trigger;
        self
    }

    pub fn access(mut self, right: impl Into<String>) -> Self {
        self.access = Some(right.into());
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }
}

pub struct ChatCommand {
    trigger: CommandTrigger,
    name: String,
    description: String,
    access: Option<String>,
    hidden: bool,
    handler: Arc<dyn CommandHandler>,
}

impl ChatCommand {
    pub(crate) fn new(name: String, options: CommandOptions, handler: Arc<dyn CommandHandler>) -> Self {
        Self {
            trigger: options.trigger,
            name,
            description: options.description,
            access: options.access,
            hidden: options.hidden,
            handler,
        }
    }

    /// The token users type to run this command: trigger followed by name.
    pub fn compile(&self) -> String {
        format!("{}{}", self.trigger, self.name)
    }

    /// Case-insensitive comparison against a typed token.
    pub fn matches(&self, token: &str) -> bool {
        self.compile().eq_ignore_ascii_case(token)
    }

    pub fn trigger(&self) -> CommandTrigger {
        self.trigger
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn access(&self) -> Option<&str> {
        self.access.as_deref()
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    /// Runs the callback, turning a panic into [`CommandError::Panicked`].
    pub fn run(&self, ctx: &CommandContext) -> Result<(), CommandError> {
        self.run_traced(ctx).map_err(|failure| failure.error)
    }

    /// Like [`run`](Self::run), keeping the stack trace of the failure.
    pub(crate) fn run_traced(&self, ctx: &CommandContext) -> Result<(), Failure<CommandError>> {
        run_guarded(|| self.handler.run(ctx), CommandError::Panicked)
    }
}

impl std::fmt::Debug for ChatCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatCommand")
            .field("command", &self.compile())
            .field("access", &self.access)
            .field("hidden", &self.hidden)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Group;

    fn command(name: &str, trigger: CommandTrigger) -> ChatCommand {
        let handler: Arc<dyn CommandHandler> =
            Arc::new(|_: &CommandContext| -> Result<(), CommandError> { Ok(()) });
        ChatCommand::new(name.to_string(), CommandOptions::default().trigger(trigger), handler)
    }

    #[test]
    fn compile_joins_trigger_and_name() {
        assert_eq!(command("addpoints", CommandTrigger::Admin).compile(), "//addpoints");
        assert_eq!(command("add", CommandTrigger::External).compile(), "@add");
        assert_eq!(command("help", CommandTrigger::Player).compile(), "/help");
    }

    #[test]
    fn matching_ignores_case() {
        let cmd = command("addpoints", CommandTrigger::Admin);
        assert!(cmd.matches("//AddPoints"));
        assert!(!cmd.matches("/addpoints"));
    }

    #[test]
    fn trigger_parses_from_prefix() {
        assert_eq!("//".parse::<CommandTrigger>().unwrap(), CommandTrigger::Admin);
        assert!(matches!(
            "!".parse::<CommandTrigger>(),
            Err(CommandError::UnknownTrigger(_))
        ));
    }

    #[test]
    fn reserved_prefixes() {
        assert!(CommandTrigger::is_reserved_prefix("/unknowncmd"));
        assert!(CommandTrigger::is_reserved_prefix("//kick"));
        assert!(CommandTrigger::is_reserved_prefix("##debug"));
        assert!(!CommandTrigger::is_reserved_prefix("@add"));
        assert!(!CommandTrigger::is_reserved_prefix("gg /"));
    }

    #[test]
    fn run_turns_panics_into_errors() {
        let handler: Arc<dyn CommandHandler> =
            Arc::new(|_: &CommandContext| -> Result<(), CommandError> { panic!("bad") });
        let cmd = ChatCommand::new("boom".into(), CommandOptions::default(), handler);
        let ctx = CommandContext {
            caller: Player::new("login", "Nick", Group::default()),
            command: cmd.compile(),
            args: vec![],
        };
        assert!(matches!(cmd.run(&ctx), Err(CommandError::Panicked(msg)) if msg == "bad"));
    }

    #[test]
    fn context_argument_helpers() {
        let ctx = CommandContext {
            caller: Player::new("login", "Nick", Group::default()),
            command: "//mute".into(),
            args: vec!["Big Name".into(), "spam".into(), "again".into()],
        };
        assert_eq!(ctx.require(0, "name").unwrap(), "Big Name");
        assert!(matches!(ctx.require(5, "other"), Err(CommandError::MissingArgument("other"))));
        assert_eq!(ctx.rest(1), "spam again");
        assert_eq!(ctx.rest(9), "");
    }
}
