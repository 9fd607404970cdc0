//! One render function per screen. Each only reads the view state and
//! returns what the user asked for this frame.

use client_core::TurnMode;
use eframe::egui;

use crate::controller::{
    events::UiIntent,
    reducer::{Screen, Slot, ViewState},
};
use crate::ui::{theme, widgets};

/// Name fields on the selection screen. Kept outside the view state since
/// they are raw text edits, not battle data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentNames {
    pub agent1: String,
    pub agent2: String,
}

pub fn show_screen(ui: &mut egui::Ui, state: &ViewState, names: &mut AgentNames) -> Option<UiIntent> {
    match state.screen() {
        Screen::Selection => show_selection(ui, state, names),
        Screen::Battle => show_battle(ui, state),
        Screen::Victory => show_victory(ui, state),
    }
}

pub fn show_selection(
    ui: &mut egui::Ui,
    state: &ViewState,
    names: &mut AgentNames,
) -> Option<UiIntent> {
    let mut intent = None;

    ui.vertical_centered(|ui| {
        ui.heading(egui::RichText::new("⚔️ Agent Battle Simulator").size(26.0));
    });
    ui.add_space(8.0);

    if state.catalog().bots.is_empty() {
        ui.label(egui::RichText::new("Keine Bots geladen.").weak());
    }

    egui::ScrollArea::vertical().show(ui, |ui| {
        for (slot, title, name) in [
            (Slot::First, "Agent 1", &mut names.agent1),
            (Slot::Second, "Agent 2", &mut names.agent2),
        ] {
            ui.horizontal(|ui| {
                ui.label(egui::RichText::new(title).strong().size(18.0));
                ui.add(
                    egui::TextEdit::singleline(name)
                        .id_salt(title)
                        .hint_text(match slot {
                            Slot::First => shared::protocol::DEFAULT_AGENT1_NAME,
                            Slot::Second => shared::protocol::DEFAULT_AGENT2_NAME,
                        })
                        .desired_width(220.0),
                );
            });
            ui.horizontal_wrapped(|ui| {
                for bot in &state.catalog().bots {
                    let selected = state.selected(slot) == Some(&bot.id);
                    if widgets::bot_card(ui, bot, selected) {
                        intent = Some(UiIntent::SelectBot {
                            slot,
                            bot_id: bot.id.clone(),
                        });
                    }
                }
            });
            ui.add_space(12.0);
        }

        ui.horizontal(|ui| {
            ui.label(egui::RichText::new("Modus").strong());
            let mut mode = state.mode();
            ui.radio_value(&mut mode, TurnMode::ServerDecides, "Server wählt Gegneraktion");
            ui.radio_value(&mut mode, TurnMode::AiAssisted, "KI wählt Gegneraktion");
            if mode != state.mode() {
                intent = Some(UiIntent::SetTurnMode(mode));
            }
        });
        ui.add_space(12.0);

        ui.vertical_centered(|ui| {
            let start = egui::Button::new(egui::RichText::new("Kampf starten!").strong().size(18.0))
                .min_size(egui::vec2(220.0, 40.0));
            if ui.add(start).clicked() {
                intent = Some(UiIntent::ConfirmSelection);
            }
        });
    });

    intent
}

pub fn show_battle(ui: &mut egui::Ui, state: &ViewState) -> Option<UiIntent> {
    let mut intent = None;

    ui.horizontal(|ui| {
        let round = state.round().unwrap_or(1);
        ui.heading(format!("Runde {round}"));
        if state.is_busy() {
            ui.spinner();
        }
    });
    ui.separator();

    if let Some((agent1, agent2)) = state.agent_views() {
        ui.columns(2, |columns| {
            widgets::agent_panel(&mut columns[0], &agent1);
            widgets::agent_panel(&mut columns[1], &agent2);
        });
    }
    ui.add_space(8.0);

    ui.label(egui::RichText::new("Aktionen").strong());
    ui.horizontal_wrapped(|ui| {
        for button in state.action_buttons() {
            if widgets::action_button(ui, &button) {
                intent = Some(UiIntent::ExecuteAction(button.action_id));
            }
        }
    });
    ui.add_space(8.0);

    ui.label(egui::RichText::new("Kampflog").strong());
    egui::Frame::NONE
        .fill(theme::ARENA_BG)
        .corner_radius(6.0)
        .inner_margin(egui::Margin::symmetric(8, 6))
        .show(ui, |ui| {
            egui::ScrollArea::vertical()
                .stick_to_bottom(true)
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    for entry in state.combat_log() {
                        ui.horizontal_wrapped(|ui| {
                            ui.label(
                                egui::RichText::new(entry.at.format("%H:%M:%S").to_string())
                                    .monospace()
                                    .weak(),
                            );
                            ui.label(egui::RichText::new(&entry.text).color(theme::LOG_TEXT));
                        });
                    }
                });
        });

    intent
}

pub fn show_victory(ui: &mut egui::Ui, state: &ViewState) -> Option<UiIntent> {
    let mut intent = None;
    ui.vertical_centered(|ui| {
        ui.add_space(40.0);
        ui.label(egui::RichText::new("🏆").size(64.0));
        if let Some(victory) = state.victory() {
            ui.heading(
                egui::RichText::new(format!("{} gewinnt!", victory.winner))
                    .size(28.0)
                    .color(theme::ACCENT),
            );
            ui.add_space(12.0);
            for line in &victory.stats {
                ui.label(line);
            }
            if !victory.unlocked_skins.is_empty() {
                ui.add_space(12.0);
                ui.label(egui::RichText::new("Freigeschaltete Skins").strong());
                ui.horizontal_wrapped(|ui| {
                    for skin in &victory.unlocked_skins {
                        widgets::skin_chip(ui, skin);
                    }
                });
            }
        }
        ui.add_space(20.0);
        if ui
            .add(egui::Button::new("Neuer Kampf").min_size(egui::vec2(180.0, 36.0)))
            .clicked()
        {
            intent = Some(UiIntent::NewBattle);
        }
    });
    intent
}

/// Blocking alert; nothing else is clickable until it is dismissed.
pub fn show_alert(ctx: &egui::Context, text: &str) -> Option<UiIntent> {
    let response = egui::Modal::new(egui::Id::new("battle_alert")).show(ctx, |ui| {
        ui.set_width(320.0);
        ui.label(egui::RichText::new("⚠️").size(24.0));
        ui.label(text);
        ui.add_space(8.0);
        ui.button("OK").clicked()
    });
    (response.inner || response.should_close()).then_some(UiIntent::DismissAlert)
}
