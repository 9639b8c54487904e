use crate::access::PLAYER_MUTE;
use crate::chat::strip_styles;
use crate::commands::{CommandContext, CommandDispatch, CommandOptions, CommandTrigger};
use crate::context::ServerContext;
use crate::error::{CommandError, ControllerError};
use crate::events::{PlayerChatEvent, PLAYER_CHAT};
use crate::types::{Player, PlayerId};
use parking_lot::RwLock;
use std::collections::HashSet;
use std::sync::{Arc, Weak};
use tracing::{debug, error, info};

const NOT_ALLOWED: &str = "Sorry, you are not allowed to do that.";
const INVALID_COMMAND: &str = "Invalid chat command entered.";
const MUTED: &str = "You are muted.";

/// How a chat line was handled.
#[derive(Debug, Clone)]
pub enum ChatOutcome {
    /// The line named a registered command
    Command(CommandDispatch),
    /// The line looked like a command but named none
    InvalidCommand,
    /// The sender is muted; only they were told
    Muted,
    /// The formatted line sent to everyone
    Broadcast(String),
}

impl ChatOutcome {
    pub fn is_broadcast(&self) -> bool {
        matches!(self, ChatOutcome::Broadcast(_))
    }
}

/// Routes every chat line: commands first, then malformed commands, then
/// muted senders, and finally a styled broadcast.
pub struct ChatController {
    context: Arc<ServerContext>,
    muted: RwLock<HashSet<PlayerId>>,
}

impl ChatController {
    pub fn new(context: Arc<ServerContext>) -> Arc<Self> {
        Arc::new(Self {
            context,
            muted: RwLock::new(HashSet::new()),
        })
    }

    /// Takes over chat routing from the game server and registers the chat
    /// hook plus the mute and listing commands.
    ///
    /// A routing failure is returned as [`ControllerError::Routing`]; the
    /// process cannot run correctly without it.
    pub fn init(self: &Arc<Self>) -> Result<(), ControllerError> {
        if let Err(e) = self.context.transport().enable_manual_routing() {
            error!(
                category = "ChatController",
                "{} There might already be a running instance of the controller.", e
            );
            return Err(ControllerError::Routing(e));
        }

        let dispatcher = self.context.dispatcher();

        let weak = Arc::downgrade(self);
        dispatcher.add_hook(PLAYER_CHAT, move |event: PlayerChatEvent| {
            if let Some(controller) = weak.upgrade() {
                controller.player_chat(&event.player, &event.text);
            }
            Ok(())
        })?;

        let weak = Arc::downgrade(self);
        dispatcher.add_command(
            "mute",
            CommandOptions::default()
                .description("Mutes a player by given nickname")
                .trigger(CommandTrigger::Admin)
                .access(PLAYER_MUTE),
            move |ctx| with_controller(&weak, |c| c.mute_command(ctx)),
        )?;

        let weak = Arc::downgrade(self);
        dispatcher.add_command(
            "unmute",
            CommandOptions::default()
                .description("Unmutes a player by given nickname")
                .trigger(CommandTrigger::Admin)
                .access(PLAYER_MUTE),
            move |ctx| with_controller(&weak, |c| c.unmute_command(ctx)),
        )?;

        let weak = Arc::downgrade(self);
        dispatcher.add_command(
            "commands",
            CommandOptions::default().description("Lists the chat commands you can use"),
            move |ctx| with_controller(&weak, |c| c.list_commands(ctx)),
        )?;

        info!(category = "ChatController", "Chat routing enabled");
        Ok(())
    }

    pub fn context(&self) -> &Arc<ServerContext> {
        &self.context
    }

    /// Handles one raw chat line from `caller`.
    pub fn player_chat(&self, caller: &Player, text: &str) -> ChatOutcome {
        let commands = self.context.dispatcher().commands();

        if commands.is_command_token(text) {
            let dispatch = commands.dispatch(caller, text, self.context.access());
            if let CommandDispatch::Denied(_) = dispatch {
                self.context.warn_player(caller, NOT_ALLOWED);
            }
            if dispatch.is_command() {
                return ChatOutcome::Command(dispatch);
            }
        }

        if CommandTrigger::is_reserved_prefix(text) {
            self.context.warn_player(caller, INVALID_COMMAND);
            return ChatOutcome::InvalidCommand;
        }

        if self.is_muted(caller.id) {
            self.context.warn_player(caller, MUTED);
            return ChatOutcome::Muted;
        }

        debug!(category = "Chat", "[{}] {}", caller, text);
        let line = self.context.formatter().player_line(caller, text);
        self.context.broadcast(&line);
        ChatOutcome::Broadcast(line)
    }

    /// Adds `player` to the muted set. Returns `false` if already muted.
    pub fn mute(&self, player: &Player) -> bool {
        self.muted.write().insert(player.id)
    }

    /// Returns `false` if `player` was not muted.
    pub fn unmute(&self, player: &Player) -> bool {
        self.muted.write().remove(&player.id)
    }

    pub fn is_muted(&self, id: PlayerId) -> bool {
        self.muted.read().contains(&id)
    }

    pub fn muted_players(&self) -> Vec<PlayerId> {
        self.muted.read().iter().copied().collect()
    }

    /// Looks up a player by name for `caller`, warning them when the name
    /// matches nobody or more than one player.
    pub fn find_player(&self, caller: &Player, query: &str) -> Option<Player> {
        match self.context.players().find_by_name(query) {
            Ok(player) => Some(player),
            Err(e) => {
                self.context.warn_player(caller, &e.to_string());
                None
            }
        }
    }

    fn mute_command(&self, ctx: &CommandContext) -> Result<(), CommandError> {
        let Some(target) = self.command_target(ctx) else {
            return Ok(());
        };
        let name = strip_styles(&target.nick_name);

        if self.mute(&target) {
            info!(category = "ChatController", "{} muted {}", ctx.caller, target);
            self.context
                .inform_player(&ctx.caller, &format!("{name} has been muted."));
        } else {
            self.context
                .warn_player(&ctx.caller, &format!("{name} is already muted."));
        }
        Ok(())
    }

    fn unmute_command(&self, ctx: &CommandContext) -> Result<(), CommandError> {
        let Some(target) = self.command_target(ctx) else {
            return Ok(());
        };
        let name = strip_styles(&target.nick_name);

        if self.unmute(&target) {
            info!(category = "ChatController", "{} unmuted {}", ctx.caller, target);
            self.context
                .inform_player(&ctx.caller, &format!("{name} has been unmuted."));
        } else {
            self.context
                .warn_player(&ctx.caller, &format!("{name} is not muted."));
        }
        Ok(())
    }

    fn command_target(&self, ctx: &CommandContext) -> Option<Player> {
        match ctx.arg(0) {
            Some(query) => self.find_player(&ctx.caller, query),
            None => {
                self.context
                    .warn_player(&ctx.caller, &format!("Usage: {} <name>", ctx.command));
                None
            }
        }
    }

    fn list_commands(&self, ctx: &CommandContext) -> Result<(), CommandError> {
        let lines: Vec<String> = self
            .context
            .dispatcher()
            .commands()
            .visible()
            .iter()
            .filter(|cmd| {
                cmd.access()
                    .map_or(true, |right| self.context.has_access(&ctx.caller, right))
            })
            .map(|cmd| format!("{} {}", cmd.compile(), cmd.description()))
            .collect();

        self.context
            .inform_player(&ctx.caller, &format!("Commands: {}", lines.join(", ")));
        Ok(())
    }
}

impl std::fmt::Debug for ChatController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatController")
            .field("muted", &self.muted.read().len())
            .finish()
    }
}

fn with_controller<F>(weak: &Weak<ChatController>, f: F) -> Result<(), CommandError>
where
    F: FnOnce(&ChatController) -> Result<(), CommandError>,
{
    match weak.upgrade() {
        Some(controller) => f(&controller),
        None => Err(CommandError::Execution("chat controller is gone".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::GroupAccess;
    use crate::chat::{ChatMessageFormatter, RecordingTransport};
    use crate::dispatcher::Dispatcher;
    use crate::players::PlayerDirectory;
    use crate::types::Group;

    fn setup() -> (Arc<ChatController>, Arc<RecordingTransport>) {
        let transport = Arc::new(RecordingTransport::new());
        let context = Arc::new(ServerContext::new(
            Arc::new(Dispatcher::new()),
            transport.clone(),
            Arc::new(GroupAccess),
            Arc::new(PlayerDirectory::new()),
            ChatMessageFormatter::default(),
        ));
        let controller = ChatController::new(context);
        controller.init().unwrap();
        (controller, transport)
    }

    fn admin() -> Player {
        Player::new("admin", "Admin", Group::new("Admin").with_right(PLAYER_MUTE))
    }

    #[test]
    fn init_enables_routing_and_registers_commands() {
        let (controller, transport) = setup();
        assert!(transport.routing_enabled());
        assert_eq!(
            controller.context().dispatcher().commands().compiled(),
            vec!["//mute", "//unmute", "/commands"]
        );
    }

    #[test]
    fn spectator_line_carries_glyph() {
        let (controller, transport) = setup();
        let spectator = Player::new("spec", "Spec", Group::default()).as_spectator();

        let outcome = controller.player_chat(&spectator, "hi");

        assert!(outcome.is_broadcast());
        assert_eq!(
            transport.broadcasts(),
            vec!["$fff[$z$s$eee📷 Spec$z$s$fff] $fff$z$shi".to_string()]
        );
    }

    #[test]
    fn mute_without_argument_warns_usage() {
        let (controller, transport) = setup();
        let admin = admin();

        controller.player_chat(&admin, "//mute");

        assert_eq!(
            transport.messages_to(admin.id),
            vec!["$f80Usage: //mute <name>".to_string()]
        );
        assert!(controller.muted_players().is_empty());
    }

    #[test]
    fn mute_unknown_name_warns_caller() {
        let (controller, transport) = setup();
        let admin = admin();

        controller.player_chat(&admin, "//mute ghost");

        assert_eq!(
            transport.messages_to(admin.id),
            vec!["$f80No player found matching 'ghost'.".to_string()]
        );
    }

    #[test]
    fn command_listing_respects_access() {
        let (controller, transport) = setup();
        let player = Player::new("player", "Player", Group::default());

        controller.player_chat(&player, "/commands");

        let messages = transport.messages_to(player.id);
        assert_eq!(messages.len(), 1);
        assert!(messages[0].contains("/commands"));
        assert!(!messages[0].contains("//mute"));
        assert!(transport.broadcasts().is_empty());
    }
}
