//! The eframe application shell: drains backend events, advances playback,
//! renders the active screen and applies the user's intent.

use std::time::{Duration, Instant};

use client_core::TurnMode;
use crossbeam_channel::{Receiver, Sender};
use eframe::egui;
use serde::{Deserialize, Serialize};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::{
    events::{UiEvent, UiIntent},
    orchestration::dispatch_backend_command,
    reducer::ViewState,
};
use crate::ui::{
    panels::{self, AgentNames},
    theme,
};

pub const SETTINGS_STORAGE_KEY: &str = "battle_gui.settings";
const IDLE_REPAINT: Duration = Duration::from_millis(100);

/// Persisted between launches through eframe storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedSettings {
    pub agent1_name: String,
    pub agent2_name: String,
    pub turn_mode: TurnMode,
}

/// Starting values resolved from config and command line.
#[derive(Debug, Clone)]
pub struct StartupConfig {
    pub agent1_name: String,
    pub agent2_name: String,
    pub turn_mode: TurnMode,
}

impl StartupConfig {
    /// Stored settings win over config for names; an explicit command-line
    /// mode wins over both.
    pub fn merged(self, persisted: Option<PersistedSettings>, mode_forced: bool) -> Self {
        match persisted {
            Some(saved) => Self {
                agent1_name: saved.agent1_name,
                agent2_name: saved.agent2_name,
                turn_mode: if mode_forced {
                    self.turn_mode
                } else {
                    saved.turn_mode
                },
            },
            None => self,
        }
    }
}

pub struct BattleGuiApp {
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,
    state: ViewState,
    names: AgentNames,
    status: String,
}

impl BattleGuiApp {
    pub fn new(
        cmd_tx: Sender<BackendCommand>,
        ui_rx: Receiver<UiEvent>,
        startup: StartupConfig,
    ) -> Self {
        let mut app = Self {
            cmd_tx,
            ui_rx,
            state: ViewState::new(startup.turn_mode),
            names: AgentNames {
                agent1: startup.agent1_name,
                agent2: startup.agent2_name,
            },
            status: String::new(),
        };
        let _ = app.dispatch(BackendCommand::LoadCatalog);
        app
    }

    /// Returns whether the worker queue accepted `cmd`.
    fn dispatch(&mut self, cmd: BackendCommand) -> bool {
        let queued = dispatch_backend_command(&self.cmd_tx, cmd, &mut self.status);
        if queued {
            self.status.clear();
        }
        queued
    }

    fn process_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            match event {
                UiEvent::CatalogLoaded(catalog) => self.state.catalog_loaded(catalog),
                UiEvent::BattleStarted {
                    generation,
                    bots,
                    battle,
                } => {
                    self.state.battle_started(generation, bots, battle);
                }
                UiEvent::UnlockedSkinsLoaded { generation, skins } => {
                    self.state.unlocked_skins_loaded(generation, skins);
                }
                UiEvent::TurnResolved {
                    generation,
                    battle_id,
                    result,
                } => {
                    self.state
                        .turn_resolved(generation, &battle_id, result, Instant::now());
                }
                UiEvent::RequestFailed { generation, error } => {
                    tracing::error!(
                        category = ?error.category(),
                        context = ?error.context(),
                        "{}",
                        error.message()
                    );
                    self.state.request_failed(generation, &error);
                }
                UiEvent::Error(error) => {
                    tracing::error!(context = ?error.context(), "{}", error.message());
                    self.status = error.message().to_string();
                    self.state.show_alert(&error);
                }
            }
        }
    }

    fn apply_intent(&mut self, intent: UiIntent) {
        match intent {
            UiIntent::SelectBot { slot, bot_id } => {
                self.state.select_bot(slot, &bot_id);
            }
            UiIntent::SetTurnMode(mode) => self.state.set_mode(mode),
            UiIntent::ConfirmSelection => {
                if let Some(cmd) = self
                    .state
                    .confirm_selection(&self.names.agent1, &self.names.agent2)
                {
                    let _ = self.dispatch(cmd);
                }
            }
            UiIntent::ExecuteAction(action_id) => {
                if let Some(cmd) = self.state.request_turn(action_id) {
                    if !self.dispatch(cmd) {
                        self.state.turn_not_sent();
                    }
                }
            }
            UiIntent::NewBattle => self.state.reset(),
            UiIntent::DismissAlert => self.state.dismiss_alert(),
        }
    }
}

impl eframe::App for BattleGuiApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events();
        let now = Instant::now();
        if let Some(cmd) = self.state.tick(now) {
            let _ = self.dispatch(cmd);
        }

        let mut intent = None;
        if !self.status.is_empty() {
            egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
                ui.small(egui::RichText::new(&self.status).weak());
            });
        }
        egui::CentralPanel::default()
            .frame(
                egui::Frame::central_panel(&ctx.style())
                    .fill(theme::ARENA_BG)
                    .inner_margin(egui::Margin::same(16)),
            )
            .show(ctx, |ui| {
                intent = panels::show_screen(ui, &self.state, &mut self.names);
            });

        if let Some(text) = self.state.alert() {
            // The modal blocks the panels underneath, so its answer wins.
            if let Some(alert_intent) = panels::show_alert(ctx, text) {
                intent = Some(alert_intent);
            }
        }

        if let Some(intent) = intent {
            self.apply_intent(intent);
            ctx.request_repaint();
        }

        let wait = self
            .state
            .next_wakeup()
            .map(|at| at.saturating_duration_since(now).min(IDLE_REPAINT))
            .unwrap_or(IDLE_REPAINT);
        ctx.request_repaint_after(wait);
    }

    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        let settings = PersistedSettings {
            agent1_name: self.names.agent1.clone(),
            agent2_name: self.names.agent2.clone(),
            turn_mode: self.state.mode(),
        };
        if let Ok(serialized) = serde_json::to_string(&settings) {
            storage.set_string(SETTINGS_STORAGE_KEY, serialized);
        }
    }
}

pub fn load_persisted_settings(storage: Option<&dyn eframe::Storage>) -> Option<PersistedSettings> {
    storage.and_then(|storage| {
        storage
            .get_string(SETTINGS_STORAGE_KEY)
            .and_then(|text| serde_json::from_str::<PersistedSettings>(&text).ok())
    })
}
