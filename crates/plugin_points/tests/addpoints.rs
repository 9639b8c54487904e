use plugin_points::{InMemoryModeSettings, ModeSettings, PointsPlugin, MANIPULATE_POINTS};
use std::sync::Arc;
use trackside_events::{ChatStyle, Controller, Group, GroupAccess, Player, RecordingTransport};

struct Server {
    controller: Controller,
    plugin: PointsPlugin,
    settings: Arc<InMemoryModeSettings>,
    transport: Arc<RecordingTransport>,
}

fn server() -> Server {
    let transport = Arc::new(RecordingTransport::new());
    let settings = Arc::new(InMemoryModeSettings::with_points_limit(50));
    let controller = Controller::new(transport.clone(), Arc::new(GroupAccess), ChatStyle::default());
    controller.start().unwrap();
    let plugin = PointsPlugin::new(settings.clone());
    controller.register_plugin(&plugin).unwrap();
    assert_eq!(controller.plugins(), vec!["points".to_string()]);

    Server {
        controller,
        plugin,
        settings,
        transport,
    }
}

#[test]
fn unauthorized_addpoints_only_warns() {
    let s = server();
    let player = Player::new("player", "Player", Group::default());
    s.controller.on_player_connect(&player).unwrap();
    s.transport.clear();

    s.controller.on_player_chat(&player, "//addpoints 10").unwrap();

    assert_eq!(
        s.transport.messages_to(player.id),
        vec!["$f80Sorry, you are not allowed to do that.".to_string()]
    );
    assert_eq!(s.plugin.controller().unwrap().current_limit(), 50);
    assert_eq!(s.settings.points_limit().unwrap(), Some(50));
    assert!(s.transport.broadcasts().is_empty());
}

#[test]
fn authorized_addpoints_raises_limit() {
    let s = server();
    let admin = Player::new("admin", "$0f0Admin", Group::new("Admin").with_right(MANIPULATE_POINTS));
    s.controller.on_player_connect(&admin).unwrap();

    s.controller.on_player_chat(&admin, "//addpoints 10").unwrap();

    assert_eq!(s.plugin.controller().unwrap().current_limit(), 60);
    assert_eq!(s.settings.points_limit().unwrap(), Some(60));
    assert_eq!(
        s.transport.broadcasts(),
        vec![
            "$0cfPoints limit: 60".to_string(),
            "$0cfAdmin increased the points-limit by 10 points".to_string(),
        ]
    );
}

#[test]
fn non_numeric_points_leave_limit_untouched() {
    let s = server();
    let admin = Player::new("admin", "Admin", Group::new("Admin").unrestricted());

    s.controller.on_player_chat(&admin, "//addpoints many").unwrap();
    s.controller.on_player_chat(&admin, "//addpoints").unwrap();

    assert_eq!(s.plugin.controller().unwrap().current_limit(), 50);
    assert!(s.transport.broadcasts().is_empty());
}
