//! Trackside controller entry point.
//!
//! Loads configuration, sets up logging, starts the controller with the
//! points plugin and feeds it console input until stdin closes or a
//! shutdown signal arrives.

mod cli;
mod config;
mod console;
mod logging;
mod signals;

use anyhow::anyhow;
use cli::CliArgs;
use config::AppConfig;
use console::{joined_player, ConsoleInput, ConsoleTransport};
use plugin_points::{InMemoryModeSettings, PointsPlugin};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};
use trackside_events::{Controller, ControllerError, GroupAccess, Player};

/// Exit status when chat routing cannot be taken over.
const ROUTING_EXIT_CODE: i32 = 2;

struct Application {
    config: AppConfig,
    controller: Controller,
}

impl Application {
    async fn new(args: CliArgs) -> anyhow::Result<Self> {
        let mut config = AppConfig::load_from_file(&args.config_path).await?;

        if let Some(log_level) = args.log_level {
            config.logging.level = log_level;
        }
        if args.json_logs {
            config.logging.json_format = true;
        }

        config
            .validate()
            .map_err(|e| anyhow!("Configuration validation failed: {e}"))?;

        logging::setup_logging(&config.logging)?;

        let controller = Controller::new(
            Arc::new(ConsoleTransport),
            Arc::new(GroupAccess),
            config.chat.clone(),
        );

        info!(
            "Trackside v{} for '{}' | Config: {}",
            env!("CARGO_PKG_VERSION"),
            config.server.name,
            args.config_path.display()
        );

        Ok(Self { config, controller })
    }

    fn start(&self) -> Result<(), ControllerError> {
        self.controller.start()?;

        let settings = Arc::new(InMemoryModeSettings::new());
        if let Some(limit) = self.config.mode.points_limit {
            settings.set(plugin_points::POINTS_LIMIT, limit.to_string());
        }
        self.controller.register_plugin(&PointsPlugin::new(settings))?;

        self.controller.log_summary();
        Ok(())
    }

    async fn run(&self) -> anyhow::Result<()> {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let shutdown = signals::wait_for_shutdown();
        tokio::pin!(shutdown);
        info!("Reading console input, press Ctrl+C to stop");

        loop {
            tokio::select! {
                line = lines.next_line() => match line? {
                    Some(line) if line.trim().is_empty() => {}
                    Some(line) => self.handle_line(&line)?,
                    None => {
                        info!("Console input closed");
                        break;
                    }
                },
                received = &mut shutdown => {
                    info!("Received {} signal, stopping", received?);
                    break;
                }
            }
        }

        self.controller.log_summary();
        info!("Trackside shutdown complete");
        Ok(())
    }

    fn handle_line(&self, line: &str) -> Result<(), ControllerError> {
        let input = match ConsoleInput::parse(line) {
            Ok(input) => input,
            Err(e) => {
                warn!(category = "Console", "{}", e);
                return Ok(());
            }
        };

        match input {
            ConsoleInput::Join {
                login,
                group,
                nick_name,
            } => {
                let group = group.and_then(|name| {
                    let found = self.config.group(&name);
                    if found.is_none() {
                        warn!(category = "Console", "Unknown group {}, ignored", name);
                    }
                    found
                });
                let existing = self.controller.players().by_login(&login);
                let player = joined_player(existing, login, nick_name, group, || {
                    self.config.default_group()
                });
                self.controller.on_player_connect(&player)?;
            }
            ConsoleInput::Spectate { login } => {
                let player = self
                    .controller
                    .players()
                    .by_login(&login)
                    .unwrap_or_else(|| {
                        Player::new(login.clone(), login.clone(), self.config.default_group())
                    })
                    .as_spectator();
                self.controller.on_player_connect(&player)?;
            }
            ConsoleInput::Leave { login } => match self.controller.players().by_login(&login) {
                Some(player) => {
                    self.controller.on_player_disconnect(&player)?;
                }
                None => warn!(category = "Console", "{} is not connected", login),
            },
            ConsoleInput::Podium => {
                self.controller.on_podium_start()?;
            }
            ConsoleInput::Stats => self.controller.log_summary(),
            ConsoleInput::Chat { login, text } => {
                match self.controller.players().by_login(&login) {
                    Some(player) => {
                        self.controller.on_player_chat(&player, &text)?;
                    }
                    None => warn!(
                        category = "Console",
                        "{} is not connected, use ':join {}' first", login, login
                    ),
                }
            }
        }
        Ok(())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    let app = match Application::new(args).await {
        Ok(app) => app,
        Err(e) => {
            eprintln!("Failed to start Trackside: {e:#}");
            std::process::exit(1);
        }
    };

    match app.start() {
        Ok(()) => {}
        Err(ControllerError::Routing(e)) => {
            error!("{}", e);
            std::process::exit(ROUTING_EXIT_CODE);
        }
        Err(e) => return Err(e.into()),
    }

    if let Err(e) = app.run().await {
        error!("Application error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}
