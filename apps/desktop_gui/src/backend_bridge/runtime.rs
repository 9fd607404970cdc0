//! Backend worker: owns a tokio runtime on its own thread and turns queued
//! UI commands into HTTP calls, one at a time.

use std::{sync::Arc, thread};

use client_core::{load_catalog, play_turn, BattleApi};
use crossbeam_channel::{Receiver, Sender};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::{
    events::{UiError, UiErrorContext, UiEvent},
    view::skin_labels,
};

pub fn launch(api: Arc<dyn BattleApi>, cmd_rx: Receiver<BackendCommand>, ui_tx: Sender<UiEvent>) {
    thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                    UiErrorContext::BackendStartup,
                    format!("backend worker startup failure: failed to build runtime: {err}"),
                )));
                tracing::error!("failed to build backend runtime: {err}");
                return;
            }
        };

        runtime.block_on(async move {
            tracing::info!("backend worker ready");
            while let Ok(cmd) = cmd_rx.recv() {
                let name = cmd.name();
                let event = handle_command(api.as_ref(), cmd).await;
                if ui_tx.send(event).is_err() {
                    tracing::debug!(command = name, "ui gone; stopping backend worker");
                    break;
                }
            }
            tracing::info!("backend worker stopped");
        });
    });
}

pub(crate) async fn handle_command(api: &dyn BattleApi, cmd: BackendCommand) -> UiEvent {
    match cmd {
        BackendCommand::LoadCatalog => UiEvent::CatalogLoaded(load_catalog(api).await),
        BackendCommand::StartBattle {
            generation,
            request,
        } => match api.start_battle(&request).await {
            Ok(battle) => UiEvent::BattleStarted {
                generation,
                bots: [request.agent1_bot, request.agent2_bot],
                battle,
            },
            Err(err) => {
                tracing::warn!("start battle failed: {err}");
                UiEvent::RequestFailed {
                    generation,
                    error: UiError::from_client_error(UiErrorContext::StartBattle, &err),
                }
            }
        },
        BackendCommand::ExecuteTurn {
            generation,
            battle_id,
            action_id,
            mode,
        } => match play_turn(api, mode, &battle_id, action_id).await {
            Ok(result) => UiEvent::TurnResolved {
                generation,
                battle_id,
                result,
            },
            Err(err) => {
                tracing::warn!(%battle_id, %action_id, "turn failed: {err}");
                UiEvent::RequestFailed {
                    generation,
                    error: UiError::from_client_error(UiErrorContext::ExecuteTurn, &err),
                }
            }
        },
        BackendCommand::LoadUnlockedSkins {
            generation,
            bot_id,
            level,
        } => {
            let skins = match api.unlocked_skins(&bot_id, level).await {
                Ok(skins) => skin_labels(&skins),
                Err(err) => {
                    tracing::warn!(%bot_id, level, "failed to load unlocked skins: {err}");
                    Vec::new()
                }
            };
            UiEvent::UnlockedSkinsLoaded { generation, skins }
        }
    }
}
