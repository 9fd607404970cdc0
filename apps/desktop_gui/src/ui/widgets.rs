//! Small reusable pieces drawn by the panels.

use eframe::egui;
use shared::domain::BotDescriptor;

use crate::controller::view::{ActionButtonView, AgentView, BadgeKind, EffectBadge, Gauge};
use crate::ui::theme;

pub fn gauge_bar(ui: &mut egui::Ui, label: &str, gauge: &Gauge, fill: egui::Color32) {
    ui.horizontal(|ui| {
        ui.label(egui::RichText::new(label).strong());
        ui.add(
            egui::ProgressBar::new(gauge.fraction())
                .fill(fill)
                .text(gauge.text.as_str())
                .desired_width(ui.available_width()),
        );
    });
}

pub fn badge(ui: &mut egui::Ui, badge: &EffectBadge) {
    let fill = match badge.kind {
        BadgeKind::Buff => theme::BUFF_FILL,
        BadgeKind::Debuff => theme::DEBUFF_FILL,
    };
    egui::Frame::NONE
        .fill(fill)
        .corner_radius(6.0)
        .inner_margin(egui::Margin::symmetric(6, 2))
        .show(ui, |ui| {
            ui.label(egui::RichText::new(&badge.label).small().color(egui::Color32::WHITE));
        });
}

pub fn skin_chip(ui: &mut egui::Ui, label: &str) {
    egui::Frame::NONE
        .fill(theme::CARD_SELECTED_BG)
        .stroke(egui::Stroke::new(1.0, theme::ACCENT))
        .corner_radius(6.0)
        .inner_margin(egui::Margin::symmetric(8, 3))
        .show(ui, |ui| {
            ui.label(label);
        });
}

/// A selectable bot card. Returns true when clicked.
pub fn bot_card(ui: &mut egui::Ui, bot: &BotDescriptor, selected: bool) -> bool {
    let color = theme::color_or_accent(&bot.color);
    let stroke_width = if selected { 3.0 } else { 1.0 };
    let response = egui::Frame::NONE
        .fill(if selected {
            theme::CARD_SELECTED_BG
        } else {
            theme::CARD_BG
        })
        .stroke(egui::Stroke::new(stroke_width, color))
        .corner_radius(8.0)
        .inner_margin(egui::Margin::symmetric(10, 8))
        .show(ui, |ui| {
            ui.set_width(180.0);
            ui.vertical(|ui| {
                ui.label(egui::RichText::new(&bot.avatar).size(32.0));
                ui.label(egui::RichText::new(&bot.name).strong().color(color));
                ui.label(egui::RichText::new(&bot.title).italics().weak());
                ui.separator();
                ui.label(format!("HP: +{}", bot.stats.hp_bonus));
                ui.label(format!("ATK: +{}", bot.stats.attack_bonus));
                ui.label(format!("DEF: +{}", bot.stats.defense_bonus));
                ui.label(format!("STA: +{}", bot.stats.stamina_bonus));
                if !bot.special.is_empty() {
                    ui.small(&bot.special);
                }
            });
        })
        .response
        .interact(egui::Sense::click());
    response.clicked()
}

pub fn agent_panel(ui: &mut egui::Ui, agent: &AgentView) {
    let color = theme::color_or_accent(&agent.color);
    egui::Frame::NONE
        .fill(theme::CARD_BG)
        .stroke(egui::Stroke::new(2.0, color))
        .corner_radius(8.0)
        .inner_margin(egui::Margin::symmetric(12, 10))
        .show(ui, |ui| {
            ui.horizontal(|ui| {
                ui.label(egui::RichText::new(&agent.avatar).size(36.0));
                ui.vertical(|ui| {
                    ui.label(egui::RichText::new(&agent.name).strong().size(18.0).color(color));
                    ui.label(format!("Level {}", agent.level));
                });
            });
            gauge_bar(ui, "HP", &agent.hp, theme::HP_FILL);
            gauge_bar(ui, "STA", &agent.stamina, theme::STAMINA_FILL);
            gauge_bar(ui, "XP", &agent.xp, theme::XP_FILL);
            ui.horizontal(|ui| {
                ui.label(format!("⚔️ {}", agent.attack));
                ui.label(format!("🛡️ {}", agent.defense));
            });
            ui.horizontal_wrapped(|ui| {
                for entry in &agent.badges {
                    badge(ui, entry);
                }
            });
        });
}

/// Returns true when the enabled button was clicked.
pub fn action_button(ui: &mut egui::Ui, view: &ActionButtonView) -> bool {
    let text = format!(
        "{}. {}\n{}  {}",
        view.number, view.title, view.cost_label, view.damage_label
    );
    let response = ui.add_enabled(view.enabled, egui::Button::new(text).min_size(egui::vec2(150.0, 48.0)));
    let response = if view.description.is_empty() {
        response
    } else {
        response.on_hover_text(&view.description)
    };
    response.clicked()
}
