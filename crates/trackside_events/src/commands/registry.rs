//! Chat command registry and dispatch.

use super::command::{ChatCommand, CommandContext, CommandHandler, CommandOptions};
use super::tokenizer::{first_word, tokenize};
use crate::access::AccessControl;
use crate::error::CommandError;
use crate::types::Player;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, error, info};

/// What happened to a line of chat handed to [`ChatCommandRegistry::dispatch`].
#[derive(Debug, Clone)]
pub enum CommandDispatch {
    /// The first token does not name a registered command
    NotACommand,
    /// The caller lacks the command's access right; nothing ran
    Denied(Arc<ChatCommand>),
    /// The callback ran and returned `Ok`
    Completed(Arc<ChatCommand>),
    /// The callback ran and failed; the failure has been logged
    Failed(Arc<ChatCommand>),
}

impl CommandDispatch {
    /// Whether the text was a command attempt. Only plain chat returns `false`.
    pub fn is_command(&self) -> bool {
        !matches!(self, CommandDispatch::NotACommand)
    }

    pub fn command(&self) -> Option<&Arc<ChatCommand>> {
        match self {
            CommandDispatch::NotACommand => None,
            CommandDispatch::Denied(cmd)
            | CommandDispatch::Completed(cmd)
            | CommandDispatch::Failed(cmd) => Some(cmd),
        }
    }
}

/// Owns all chat commands in registration order.
///
/// Compiled tokens are unique ignoring ASCII case; registering a second
/// command that compiles to the same token fails with
/// [`CommandError::Duplicate`].
#[derive(Default)]
pub struct ChatCommandRegistry {
    commands: RwLock<Vec<Arc<ChatCommand>>>,
}

impl ChatCommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a closure as a chat command.
    pub fn add<F>(
        &self,
        name: &str,
        options: CommandOptions,
        callback: F,
    ) -> Result<Arc<ChatCommand>, CommandError>
    where
        F: Fn(&CommandContext) -> Result<(), CommandError> + Send + Sync + 'static,
    {
        self.add_handler(name, options, Arc::new(callback))
    }

    pub fn add_handler(
        &self,
        name: &str,
        options: CommandOptions,
        handler: Arc<dyn CommandHandler>,
    ) -> Result<Arc<ChatCommand>, CommandError> {
        if name.is_empty() || name.contains(char::is_whitespace) {
            return Err(CommandError::InvalidName(name.to_string()));
        }

        let command = Arc::new(ChatCommand::new(name.to_string(), options, handler));
        let compiled = command.compile();

        {
            let mut commands = self.commands.write();
            if commands.iter().any(|existing| existing.matches(&compiled)) {
                return Err(CommandError::Duplicate(compiled));
            }
            commands.push(command.clone());
        }

        info!(category = "ChatCommand", "Chat command added: {}", compiled);
        Ok(command)
    }

    /// Finds the command named by `tokens[0]`, ignoring case.
    pub fn resolve(&self, tokens: &[String]) -> Option<Arc<ChatCommand>> {
        let token = tokens.first()?;
        self.commands
            .read()
            .iter()
            .find(|command| command.matches(token))
            .cloned()
    }

    /// Cheap check on the first space-delimited word of raw chat text.
    pub fn is_command_token(&self, text: &str) -> bool {
        let word = first_word(text);
        !word.is_empty() && self.commands.read().iter().any(|c| c.matches(word))
    }

    /// Tokenizes `text`, resolves the command and runs it for `caller`.
    ///
    /// The registry lock is released before the callback runs. Callback
    /// errors and panics are logged and reported as
    /// [`CommandDispatch::Failed`]; they never propagate.
    pub fn dispatch(
        &self,
        caller: &Player,
        text: &str,
        access: &dyn AccessControl,
    ) -> CommandDispatch {
        let mut tokens = tokenize(text);
        let Some(command) = self.resolve(&tokens) else {
            return CommandDispatch::NotACommand;
        };

        if let Some(right) = command.access() {
            if !access.has_access(caller, right) {
                debug!(
                    category = "ChatCommand",
                    "{} denied {} (requires {})",
                    caller,
                    command.compile(),
                    right
                );
                return CommandDispatch::Denied(command);
            }
        }

        tokens.remove(0);
        let ctx = CommandContext {
            caller: caller.clone(),
            command: command.compile(),
            args: tokens,
        };

        match command.run_traced(&ctx) {
            Ok(()) => {
                debug!(category = "ChatCommand", "{} ran {}", caller, ctx.command);
                CommandDispatch::Completed(command)
            }
            Err(failure) => {
                error!(
                    category = "ChatController",
                    trace = %failure.trace,
                    "Failed to execute chat command {}: {}",
                    ctx.command,
                    failure.error
                );
                CommandDispatch::Failed(command)
            }
        }
    }

    /// Compiled tokens of every registered command.
    pub fn compiled(&self) -> Vec<String> {
        self.commands.read().iter().map(|c| c.compile()).collect()
    }

    /// Non-hidden commands in registration order.
    pub fn visible(&self) -> Vec<Arc<ChatCommand>> {
        self.commands
            .read()
            .iter()
            .filter(|c| !c.is_hidden())
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.commands.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for ChatCommandRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatCommandRegistry")
            .field("commands", &self.compiled())
            .finish()
    }
}
