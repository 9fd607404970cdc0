use std::sync::Arc;

mod backend_bridge;
mod controller;
mod ui;

use clap::Parser;
use client_core::{load_settings, BattleClient, TurnMode};
use crossbeam_channel::bounded;
use eframe::egui;
use tracing_subscriber::EnvFilter;

use crate::backend_bridge::{commands::BackendCommand, runtime};
use crate::controller::events::{UiError, UiErrorContext, UiEvent};
use crate::ui::{load_persisted_settings, BattleGuiApp, StartupConfig};

#[derive(Debug, Parser)]
#[command(name = "battle_gui", about = "Desktop client for the agent battle server")]
struct Args {
    /// Base URL of the battle server.
    #[arg(long)]
    server_url: Option<String>,
    /// `server` lets the server pick agent 2's action, `ai` asks for it first.
    #[arg(long)]
    turn_mode: Option<TurnMode>,
}

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let mut settings = load_settings();
    if let Some(server_url) = args.server_url {
        settings.server_url = server_url;
    }
    let mode_forced = args.turn_mode.is_some();
    if let Some(mode) = args.turn_mode {
        settings.turn_mode = mode;
    }
    tracing::info!(server_url = %settings.server_url, turn_mode = %settings.turn_mode, "starting battle gui");

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(64);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(256);
    match BattleClient::from_settings(&settings) {
        Ok(client) => runtime::launch(Arc::new(client), cmd_rx, ui_tx),
        Err(err) => {
            tracing::error!("cannot create battle client: {err}");
            drop(cmd_rx);
            let _ = ui_tx.try_send(UiEvent::Error(UiError::from_client_error(
                UiErrorContext::BackendStartup,
                &err,
            )));
        }
    }

    let startup = StartupConfig {
        agent1_name: settings.agent1_name,
        agent2_name: settings.agent2_name,
        turn_mode: settings.turn_mode,
    };
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Agent Battle Simulator")
            .with_inner_size([1100.0, 760.0])
            .with_min_inner_size([820.0, 600.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Agent Battle Simulator",
        options,
        Box::new(move |cc| {
            let startup = startup.merged(load_persisted_settings(cc.storage), mode_forced);
            Ok(Box::new(BattleGuiApp::new(cmd_tx, ui_rx, startup)))
        }),
    )
}
