//! Wires the registries, chat routing, player tracking and plugins together
//! and exposes the ingestion API used by the game-server connection.

use crate::access::AccessControl;
use crate::chat::{ChatController, ChatMessageFormatter, ChatStyle, ChatTransport};
use crate::context::{Plugin, ServerContext};
use crate::dispatcher::Dispatcher;
use crate::error::ControllerError;
use crate::events::{
    current_timestamp, PlayerChatEvent, PlayerConnectEvent, PlayerDisconnectEvent,
    PodiumStartEvent, PLAYER_CHAT, PLAYER_CONNECT, PLAYER_DISCONNECT, PODIUM_START,
};
use crate::hooks::{FireSummary, HookOptions};
use crate::players::PlayerDirectory;
use crate::types::Player;
use std::sync::Arc;
use tracing::{error, info};

/// Directory bookkeeping runs before any other connect hook and after any
/// other disconnect hook, so plugins always see the player as connected.
const DIRECTORY_PRIORITY: i32 = 1000;

/// The assembled controller.
///
/// ```rust
/// use std::sync::Arc;
/// use trackside_events::{ChatStyle, Controller, GroupAccess, Player, Group, RecordingTransport};
///
/// let transport = Arc::new(RecordingTransport::new());
/// let controller = Controller::new(transport.clone(), Arc::new(GroupAccess), ChatStyle::default());
/// controller.start().unwrap();
///
/// let player = Player::new("nadeo", "Nadeo", Group::default());
/// controller.on_player_connect(&player).unwrap();
/// controller.on_player_chat(&player, "gg").unwrap();
/// assert_eq!(transport.broadcasts().len(), 1);
/// ```
pub struct Controller {
    context: Arc<ServerContext>,
    chat: Arc<ChatController>,
    plugins: parking_lot::Mutex<Vec<String>>,
}

impl Controller {
    pub fn new(
        transport: Arc<dyn ChatTransport>,
        access: Arc<dyn AccessControl>,
        style: ChatStyle,
    ) -> Self {
        let context = Arc::new(ServerContext::new(
            Arc::new(Dispatcher::new()),
            transport,
            access,
            Arc::new(PlayerDirectory::new()),
            ChatMessageFormatter::new(style),
        ));
        let chat = ChatController::new(context.clone());

        Self {
            context,
            chat,
            plugins: parking_lot::Mutex::new(Vec::new()),
        }
    }

    /// Enables chat routing and registers the core hooks.
    ///
    /// Fails with [`ControllerError::Routing`] when the game server refuses
    /// manual routing.
    pub fn start(&self) -> Result<(), ControllerError> {
        self.chat.init()?;

        let dispatcher = self.context.dispatcher();

        let players = Arc::downgrade(self.context.players());
        dispatcher.add_hook_with(
            PLAYER_CONNECT,
            HookOptions::default()
                .priority(DIRECTORY_PRIORITY)
                .named("player directory: connect"),
            move |event: PlayerConnectEvent| {
                if let Some(players) = players.upgrade() {
                    players.connect(event.player);
                }
                Ok(())
            },
        )?;

        let players = Arc::downgrade(self.context.players());
        dispatcher.add_hook_with(
            PLAYER_DISCONNECT,
            HookOptions::default()
                .priority(-DIRECTORY_PRIORITY)
                .named("player directory: disconnect"),
            move |event: PlayerDisconnectEvent| {
                if let Some(players) = players.upgrade() {
                    players.disconnect(event.player.id);
                }
                Ok(())
            },
        )?;

        info!(category = "Controller", "Controller started");
        Ok(())
    }

    /// Lets `plugin` register its hooks and commands.
    pub fn register_plugin(&self, plugin: &dyn Plugin) -> Result<(), ControllerError> {
        if let Err(source) = plugin.register(&self.context) {
            error!(
                category = "Controller",
                "Plugin {} failed to register: {}",
                plugin.name(),
                source
            );
            return Err(ControllerError::Plugin {
                plugin: plugin.name().to_string(),
                source,
            });
        }

        info!(
            category = "Controller",
            "Plugin {} v{} registered",
            plugin.name(),
            plugin.version()
        );
        self.plugins.lock().push(plugin.name().to_string());
        Ok(())
    }

    pub fn on_player_connect(&self, player: &Player) -> Result<FireSummary, ControllerError> {
        let event = PlayerConnectEvent {
            player: player.clone(),
            timestamp: current_timestamp(),
        };
        Ok(self.context.dispatcher().fire_hook(PLAYER_CONNECT, &event)?)
    }

    pub fn on_player_disconnect(&self, player: &Player) -> Result<FireSummary, ControllerError> {
        let event = PlayerDisconnectEvent {
            player: player.clone(),
            timestamp: current_timestamp(),
        };
        Ok(self.context.dispatcher().fire_hook(PLAYER_DISCONNECT, &event)?)
    }

    /// Entry point for every chat line received from the game server.
    pub fn on_player_chat(&self, player: &Player, text: &str) -> Result<FireSummary, ControllerError> {
        let event = PlayerChatEvent {
            player: player.clone(),
            text: text.to_string(),
            timestamp: current_timestamp(),
        };
        Ok(self.context.dispatcher().fire_hook(PLAYER_CHAT, &event)?)
    }

    pub fn on_podium_start(&self) -> Result<FireSummary, ControllerError> {
        let event = PodiumStartEvent {
            timestamp: current_timestamp(),
        };
        Ok(self.context.dispatcher().fire_hook(PODIUM_START, &event)?)
    }

    pub fn context(&self) -> &Arc<ServerContext> {
        &self.context
    }

    pub fn chat(&self) -> &Arc<ChatController> {
        &self.chat
    }

    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        self.context.dispatcher()
    }

    pub fn players(&self) -> &Arc<PlayerDirectory> {
        self.context.players()
    }

    /// Names of the plugins registered so far.
    pub fn plugins(&self) -> Vec<String> {
        self.plugins.lock().clone()
    }

    /// Logs registry contents and dispatch counters.
    pub fn log_summary(&self) {
        let hooks = self.dispatcher().hooks();
        let stats = hooks.stats();
        hooks.log_summary();
        info!(
            category = "Controller",
            "{} hooks, {} events fired, {} hook runs, {} failures, {} commands",
            stats.total_hooks,
            stats.events_fired,
            stats.hooks_executed,
            stats.hook_failures,
            self.dispatcher().commands().len()
        );
    }
}

impl std::fmt::Debug for Controller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Controller")
            .field("context", &self.context)
            .field("chat", &self.chat)
            .field("plugins", &self.plugins())
            .finish()
    }
}
