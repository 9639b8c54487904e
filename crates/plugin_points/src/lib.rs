//! Points-limit management for round-based modes.
//!
//! Admins holding [`MANIPULATE_POINTS`] raise the limit with
//! `//addpoints <n>`; the original limit comes back when the podium starts.

mod settings;

pub use settings::{InMemoryModeSettings, ModeSettings, PointsError, POINTS_LIMIT};

use parking_lot::{Mutex, RwLock};
use std::sync::{Arc, Weak};
use tracing::{info, warn};
use trackside_events::{
    strip_styles, CommandContext, CommandError, CommandOptions, CommandTrigger, Plugin,
    PlayerConnectEvent, PluginError, PodiumStartEvent, ServerContext, PLAYER_CONNECT,
    PODIUM_START,
};

pub const MANIPULATE_POINTS: &str = "manipulate_points";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Limits {
    original: i64,
    current: i64,
}

/// Tracks the original and current points limit and keeps the mode
/// settings in step.
pub struct PointsController {
    context: Arc<ServerContext>,
    settings: Arc<dyn ModeSettings>,
    limits: Mutex<Limits>,
}

impl PointsController {
    fn new(context: Arc<ServerContext>, settings: Arc<dyn ModeSettings>, limit: i64) -> Self {
        Self {
            context,
            settings,
            limits: Mutex::new(Limits {
                original: limit,
                current: limit,
            }),
        }
    }

    pub fn original_limit(&self) -> i64 {
        self.limits.lock().original
    }

    pub fn current_limit(&self) -> i64 {
        self.limits.lock().current
    }

    /// Raises the limit by `points` and announces the new value.
    pub fn increase(&self, points: i64) -> Result<i64, PointsError> {
        let base = self
            .settings
            .points_limit()?
            .ok_or(PointsError::MissingSetting(POINTS_LIMIT))?;
        let limit = base.saturating_add(points);
        self.settings.set_points_limit(limit)?;
        self.limits.lock().current = limit;

        info!(category = "Points", "Increased points-limit to {}", limit);
        self.context.inform_all(&format!("Points limit: {limit}"));
        Ok(limit)
    }

    /// Restores the limit the mode started with.
    pub fn reset(&self) -> Result<(), PointsError> {
        let original = self.original_limit();
        self.settings.set_points_limit(original)?;
        self.limits.lock().current = original;

        info!(category = "Points", "Points-limit reset to {}", original);
        self.context.inform_all(&format!("Points limit: {original}"));
        Ok(())
    }

    fn add_points(&self, ctx: &CommandContext) -> Result<(), CommandError> {
        let value = ctx.require(0, "points")?;
        let points: i64 = value.parse().map_err(|_| CommandError::InvalidArgument {
            value: value.to_string(),
            reason: "points must be a whole number".to_string(),
        })?;

        self.increase(points)
            .map_err(|e| CommandError::Execution(e.to_string()))?;

        self.context.inform_all(&format!(
            "{} increased the points-limit by {} points",
            strip_styles(&ctx.caller.nick_name),
            points
        ));
        Ok(())
    }
}

impl std::fmt::Debug for PointsController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PointsController")
            .field("limits", &*self.limits.lock())
            .finish()
    }
}

/// Registers the points controller when the running mode has a points limit.
pub struct PointsPlugin {
    settings: Arc<dyn ModeSettings>,
    controller: RwLock<Option<Arc<PointsController>>>,
}

impl PointsPlugin {
    pub fn new(settings: Arc<dyn ModeSettings>) -> Self {
        Self {
            settings,
            controller: RwLock::new(None),
        }
    }

    /// The running controller, or `None` before registration or when the
    /// mode has no points limit.
    pub fn controller(&self) -> Option<Arc<PointsController>> {
        self.controller.read().clone()
    }
}

impl Plugin for PointsPlugin {
    fn name(&self) -> &str {
        "points"
    }

    fn register(&self, context: &Arc<ServerContext>) -> Result<(), PluginError> {
        let limit = self
            .settings
            .points_limit()
            .map_err(|e| PluginError::InitializationFailed(e.to_string()))?;
        let Some(limit) = limit else {
            info!(category = "Points", "Mode has no points limit, skipping");
            return Ok(());
        };

        let controller = Arc::new(PointsController::new(
            context.clone(),
            self.settings.clone(),
            limit,
        ));
        let dispatcher = context.dispatcher();

        let weak = Arc::downgrade(&controller);
        dispatcher.add_hook(PLAYER_CONNECT, move |event: PlayerConnectEvent| {
            if let Some(points) = weak.upgrade() {
                points.context.inform_player(
                    &event.player,
                    &format!("Points limit: {}", points.current_limit()),
                );
            }
            Ok(())
        })?;

        let weak = Arc::downgrade(&controller);
        dispatcher.add_hook(PODIUM_START, move |_event: PodiumStartEvent| {
            if let Some(points) = weak.upgrade() {
                if let Err(e) = points.reset() {
                    warn!(category = "Points", "Failed to reset points-limit: {}", e);
                }
            }
            Ok(())
        })?;

        let weak: Weak<PointsController> = Arc::downgrade(&controller);
        dispatcher.add_command(
            "addpoints",
            CommandOptions::default()
                .description("Add points to the points-limit.")
                .trigger(CommandTrigger::Admin)
                .access(MANIPULATE_POINTS),
            move |ctx| match weak.upgrade() {
                Some(points) => points.add_points(ctx),
                None => Err(CommandError::Execution("points controller is gone".to_string())),
            },
        )?;

        *self.controller.write() = Some(controller);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trackside_events::{ChatStyle, Controller, Group, GroupAccess, Player, RecordingTransport};

    fn start(settings: Arc<InMemoryModeSettings>) -> (Controller, PointsPlugin, Arc<RecordingTransport>) {
        let transport = Arc::new(RecordingTransport::new());
        let controller = Controller::new(transport.clone(), Arc::new(GroupAccess), ChatStyle::default());
        controller.start().unwrap();
        let plugin = PointsPlugin::new(settings);
        controller.register_plugin(&plugin).unwrap();
        (controller, plugin, transport)
    }

    #[test]
    fn time_attack_registers_nothing() {
        let (controller, plugin, _) = start(Arc::new(InMemoryModeSettings::new()));
        assert!(plugin.controller().is_none());
        assert!(!controller.dispatcher().commands().is_command_token("//addpoints 5"));
    }

    #[test]
    fn connecting_player_is_told_the_limit() {
        let (controller, _plugin, transport) = start(Arc::new(InMemoryModeSettings::with_points_limit(100)));
        let player = Player::new("player", "Player", Group::default());

        controller.on_player_connect(&player).unwrap();

        assert_eq!(
            transport.messages_to(player.id),
            vec!["$0cfPoints limit: 100".to_string()]
        );
    }

    #[test]
    fn podium_restores_original_limit() {
        let settings = Arc::new(InMemoryModeSettings::with_points_limit(100));
        let (controller, plugin, _) = start(settings.clone());
        let points = plugin.controller().unwrap();

        points.increase(20).unwrap();
        assert_eq!(points.current_limit(), 120);

        controller.on_podium_start().unwrap();

        assert_eq!(points.current_limit(), 100);
        assert_eq!(points.original_limit(), 100);
        assert_eq!(settings.points_limit().unwrap(), Some(100));
    }
}
